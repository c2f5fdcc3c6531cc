// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use gridmenu::{Click, ClickKind, Interaction, Item, Menus, PageableMenu, Step, Verdict};
use gridmenu_host::headless::{HeadlessHost, TickScheduler};
use gridmenu_host::{Icon, ViewerId};

struct Rig {
    host: Rc<HeadlessHost<u32>>,
    ticks: Rc<TickScheduler>,
    menus: Menus<u32>,
}

fn rig() -> Rig {
    let host = Rc::new(HeadlessHost::<u32>::new());
    let ticks = Rc::new(TickScheduler::new());
    let menus = Menus::new(host.clone(), ticks.clone());
    Rig { host, ticks, menus }
}

fn filled_menu(rig: &Rig, rows: u8) -> gridmenu::Menu<u32> {
    let menu = rig.menus.create_menu("bench", rows).unwrap();
    let items = (0..menu.slot_count())
        .map(|s| (s, Item::new(Icon::new(u32::try_from(s).unwrap()))));
    menu.set_items(items).unwrap();
    menu
}

fn pageable(rig: &Rig, items: u32) -> PageableMenu<u32> {
    let menu = rig.menus.create_pageable_menu("bench", 6, 0..45).unwrap();
    menu.set_pageable_items((0..items).map(|n| Item::new(Icon::new(n))));
    menu.set_next_page_item(Icon::new(u32::MAX), 53).unwrap();
    menu.set_previous_page_item(Icon::new(u32::MAX - 1), 45).unwrap();
    menu
}

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");
    for rows in [1_u8, 3, 6] {
        let slots = usize::from(rows) * 9;
        group.throughput(Throughput::Elements(slots as u64));
        group.bench_function(format!("first_open_rows{}", rows), |b| {
            b.iter_batched(
                || {
                    let rig = rig();
                    let menu = filled_menu(&rig, rows);
                    (rig, menu)
                },
                |(rig, menu)| {
                    menu.open(ViewerId(1));
                    rig.ticks.tick();
                    black_box(rig.host.write_count(menu.view().unwrap()));
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("redraw_all_rows{}", rows), |b| {
            let rig = rig();
            let menu = filled_menu(&rig, rows);
            menu.open(ViewerId(1));
            rig.ticks.tick();
            let mut n = 0_u32;
            b.iter(|| {
                n = n.wrapping_add(1);
                for slot in 0..slots {
                    menu.modify_item(slot, |item| item.set_icon(Icon::new(n)));
                }
                rig.ticks.tick();
                rig.host.take_writes();
            });
        });
        group.bench_function(format!("unchanged_flush_rows{}", rows), |b| {
            let rig = rig();
            let menu = filled_menu(&rig, rows);
            menu.open(ViewerId(1));
            rig.ticks.tick();
            b.iter(|| {
                menu.require_update(gridmenu::Target::All);
                rig.ticks.tick();
            });
        });
    }
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let rig = rig();
    let menu = filled_menu(&rig, 6);
    let hits = Rc::new(std::cell::Cell::new(0_u64));
    let h = hits.clone();
    menu.on_any_click(move |_| h.set(h.get() + 1));
    for slot in 0..menu.slot_count() {
        menu.modify_item(slot, |item| {
            item.set_handler(ClickKind::Primary, Rc::new(|click: &Click<u32>| {
                black_box(click.slot());
            }));
        });
    }
    menu.open(ViewerId(1));
    rig.ticks.tick();
    let view = menu.view().unwrap();

    group.bench_function("inside_grid", |b| {
        let mut slot = 0;
        b.iter(|| {
            slot = (slot + 1) % 54;
            let ix = Interaction::new(ViewerId(1), slot, ClickKind::Primary);
            assert_eq!(rig.menus.handle_click(view, ix), Verdict::Intercepted);
        });
    });
    group.bench_function("outside_grid", |b| {
        b.iter(|| {
            let ix = Interaction::new(ViewerId(1), black_box(70), ClickKind::Secondary);
            black_box(rig.menus.handle_click(view, ix));
        });
    });
    group.finish();
    black_box(hits.get());
}

fn bench_pages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pages");
    for viewers in [1_u64, 8, 32] {
        group.throughput(Throughput::Elements(viewers));
        group.bench_function(format!("turn_all_viewers{}", viewers), |b| {
            let rig = rig();
            let menu = pageable(&rig, 1_000);
            for v in 0..viewers {
                menu.open(ViewerId(v), 0);
            }
            rig.ticks.tick();
            b.iter(|| {
                for v in 0..viewers {
                    menu.navigate(ViewerId(v), Step::Next);
                }
                // Covers the turn and the unlock that follows it.
                rig.ticks.advance(8);
                rig.host.take_writes();
            });
        });
    }
    group.bench_function("open_close_mirror", |b| {
        let rig = rig();
        let menu = pageable(&rig, 200);
        menu.open(ViewerId(0), 0);
        rig.ticks.tick();
        b.iter(|| {
            menu.open(ViewerId(1), 3);
            rig.ticks.tick();
            menu.handle_close(ViewerId(1));
        });
    });
    group.finish();
}

criterion_group!(benches, bench_flush, bench_dispatch, bench_pages);
criterion_main!(benches);
