// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Menu basics.
//!
//! Build a three-row shop with a spinning item, open it, click around, close it,
//! change it while nobody looks, and reopen it.
//!
//! Run:
//! - `cargo run -p gridmenu_demos --example menu_basics`

use std::cell::Cell;
use std::rc::Rc;

use gridmenu::{ClickKind, Interaction, Item, Menus};
use gridmenu_host::headless::{HeadlessHost, TickScheduler};
use gridmenu_host::{Icon, ViewerId};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridmenu=debug")),
        )
        .init();

    let host = Rc::new(HeadlessHost::<&'static str>::new());
    let ticks = Rc::new(TickScheduler::new());
    let menus = Menus::new(host.clone(), ticks.clone());

    let shop = menus.create_menu("Shop", 3).unwrap();
    let coins = Rc::new(Cell::new(10_u32));

    let wallet = coins.clone();
    shop.add_item(
        10,
        Item::new(Icon::new("apple")).on(ClickKind::Primary, move |click| {
            if wallet.get() >= 3 {
                wallet.set(wallet.get() - 3);
                tracing::info!(viewer = %click.viewer(), left = wallet.get(), "bought an apple");
            } else {
                click.menu().remove_item(click.slot()).unwrap();
            }
        }),
    )
    .unwrap();
    let frames = vec![Icon::new("star"), Icon::new("star*"), Icon::new("star**")];
    shop.add_item(13, Item::cycling(frames, 2).unwrap()).unwrap();
    shop.on_click(ClickKind::Secondary, |click| {
        println!("right click on slot {}", click.slot());
    });
    shop.on_open(|menu, viewer| println!("{viewer} opened {}", menu.title()));
    shop.on_close(|menu, viewer| println!("{viewer} closed {}", menu.title()));

    let alice = ViewerId(1);
    shop.open(alice);
    ticks.tick();
    let view = shop.view().unwrap();
    println!("occupied after open: {:?}", host.occupied(view));

    // Watch the star spin for a few ticks.
    for _ in 0..6 {
        ticks.tick();
        let star = host.cell(view, 13).map(|i| *i.get());
        println!("tick {}: {:?}", ticks.now(), star);
    }

    for _ in 0..4 {
        let verdict = menus.handle_click(view, Interaction::new(alice, 10, ClickKind::Primary));
        assert!(verdict.is_intercepted(), "clicks inside the grid are always claimed");
    }
    ticks.tick();
    assert!(host.cell(view, 10).is_none(), "the apple runs out once coins do");

    // Clicks on the viewer's own inventory pass unless they could pull items out.
    let own = Interaction::new(alice, 40, ClickKind::Primary);
    println!("own inventory primary: {:?}", menus.handle_click(view, own));
    let collect = Interaction::new(alice, 40, ClickKind::Double);
    println!("own inventory double: {:?}", menus.handle_click(view, collect));

    menus.handle_close(view, alice);
    ticks.tick();
    assert!(!shop.is_ticking(), "the driver stops once nobody looks");

    host.take_writes();
    shop.add_item(0, Item::new(Icon::new("bread"))).unwrap();
    shop.add_item(1, Item::new(Icon::new("milk"))).unwrap();
    ticks.advance(3);
    println!("writes while closed: {}", host.write_count(view));

    shop.open(ViewerId(2));
    ticks.tick();
    println!(
        "writes on reopen: {}, occupied: {:?}",
        host.write_count(view),
        host.occupied(view)
    );
}
