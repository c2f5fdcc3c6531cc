// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pageable menu with several viewers.
//!
//! The first viewer drives the menu's own view, later viewers each get a mirror on their own page.
//! Navigation is debounced per view, and content changes reach every view that shows them.
//!
//! Run:
//! - `cargo run -p gridmenu_demos --example pageable_mirrors`

use std::rc::Rc;

use gridmenu::{ClickKind, Interaction, Item, Menus, MenuOptions, Step};
use gridmenu_host::headless::{HeadlessHost, TickScheduler};
use gridmenu_host::{Icon, ViewerId};
use tracing_subscriber::EnvFilter;

fn page_of(menu: &gridmenu::PageableMenu<String>, viewer: ViewerId) -> Vec<String> {
    menu.reserved_slots()
        .into_iter()
        .filter_map(|slot| menu.displayed_for(viewer, slot))
        .map(|icon| icon.get().clone())
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridmenu=debug")),
        )
        .init();

    let host = Rc::new(HeadlessHost::<String>::new());
    let ticks = Rc::new(TickScheduler::new());
    let menus = Menus::new(host.clone(), ticks.clone())
        .with_options(MenuOptions::default().with_nav_debounce(3));

    // Two rows: the top row and the left of the bottom row hold warps, the rest is chrome.
    let warps = menus.create_pageable_menu("Warps", 2, 0..13).unwrap();
    warps.set_pageable_items((0..30).map(|n| Item::new(Icon::new(format!("warp {n}")))));
    warps.set_previous_page_item(Icon::new("<".to_owned()), 15).unwrap();
    warps.set_next_page_item(Icon::new(">".to_owned()), 17).unwrap();
    warps
        .add_item(16, Item::new(Icon::new("close".to_owned())))
        .unwrap();
    println!("{} warps on {} pages", warps.pageable_len(), warps.page_count());

    let (alice, bob, carol) = (ViewerId(1), ViewerId(2), ViewerId(3));
    warps.open(alice, 0);
    warps.open(bob, 1);
    warps.open(carol, 9);
    ticks.tick();
    println!("mirrors: {}", warps.mirror_count());
    for viewer in [alice, bob, carol] {
        println!("{viewer} on page {}: {:?}", warps.current_page(viewer), page_of(&warps, viewer));
    }

    // Alice clicks "next" twice in a row; the second click lands inside the debounce window.
    let alice_view = host.showing(alice).unwrap();
    for _ in 0..2 {
        menus.handle_click(alice_view, Interaction::new(alice, 17, ClickKind::Primary));
    }
    ticks.tick();
    println!("alice after a double click: page {}", warps.current_page(alice));

    ticks.advance(5);
    assert!(warps.navigate(alice, Step::Previous), "the debounce has elapsed");
    ticks.tick();
    println!("alice back on page {}", warps.current_page(alice));

    // Renaming a warp redraws it wherever it is on screen.
    let renamed = warps.pageable_ids()[14];
    warps.modify_pageable_item(renamed, |item| {
        item.set_icon(Icon::new("warp 14 (renamed)".to_owned()));
    });
    ticks.tick();
    println!("bob sees: {:?}", page_of(&warps, bob));

    // Removing items shrinks the page count and pulls viewers back into range.
    for id in warps.pageable_ids().into_iter().skip(10) {
        warps.remove_pageable_item(id);
    }
    ticks.tick();
    println!(
        "{} pages left, carol now on page {}",
        warps.page_count(),
        warps.current_page(carol)
    );

    let bob_view = host.showing(bob).unwrap();
    menus.handle_close(bob_view, bob);
    menus.handle_close(host.showing(carol).unwrap(), carol);
    println!("mirrors after bob and carol leave: {}", warps.mirror_count());
}
