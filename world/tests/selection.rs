use std::time::Duration;

use glam::Vec2;
use pathguard_core::{Command, Event, LevelConfig, PadIndex, Selection, TowerKind};
use pathguard_world::{self as world, query, World};

fn demo_world() -> World {
    World::new(LevelConfig::demo(), 0).expect("demo level is valid")
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tick(world: &mut World) -> Vec<Event> {
    run(
        world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
    )
}

fn click_at(world: &mut World, position: Vec2) -> Vec<Event> {
    let _ = run(world, Command::MovePointer { position });
    let _ = run(world, Command::Click);
    tick(world)
}

fn selection_events(events: &[Event]) -> Vec<Selection> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::SelectionChanged { selection } => Some(*selection),
            _ => None,
        })
        .collect()
}

#[test]
fn clicking_pads_and_towers_updates_the_selection() {
    let mut world = demo_world();

    let events = click_at(&mut world, Vec2::new(170.0, 360.0));
    assert_eq!(selection_events(&events), vec![Selection::Pad(PadIndex::new(0))]);

    let _ = run(
        &mut world,
        Command::BuildTower {
            pad: PadIndex::new(1),
            kind: TowerKind::Mage,
        },
    );
    assert_eq!(query::selection(&world), Selection::Tower(PadIndex::new(1)));

    let events = click_at(&mut world, Vec2::new(260.0, 250.0));
    assert!(
        selection_events(&events).is_empty(),
        "re-selecting the same tower is not a change"
    );

    let events = click_at(&mut world, Vec2::new(5.0, 5.0));
    assert_eq!(selection_events(&events), vec![Selection::None]);
}

#[test]
fn hover_reaches_slightly_beyond_the_pad() {
    let mut world = demo_world();

    let _ = run(
        &mut world,
        Command::MovePointer {
            position: Vec2::new(195.0, 360.0),
        },
    );
    let _ = tick(&mut world);
    assert_eq!(query::hovered_pad(&world), Some(PadIndex::new(0)));

    let _ = run(
        &mut world,
        Command::MovePointer {
            position: Vec2::new(197.0, 360.0),
        },
    );
    let _ = tick(&mut world);
    assert_eq!(query::hovered_pad(&world), None);
}

#[test]
fn click_latch_waits_for_the_next_step() {
    let mut world = demo_world();
    let _ = run(
        &mut world,
        Command::MovePointer {
            position: Vec2::new(320.0, 95.0),
        },
    );
    let _ = run(&mut world, Command::Click);
    let _ = run(&mut world, Command::Click);
    assert_eq!(query::selection(&world), Selection::None);

    let events = tick(&mut world);
    assert_eq!(selection_events(&events), vec![Selection::Pad(PadIndex::new(2))]);

    let _ = run(
        &mut world,
        Command::MovePointer {
            position: Vec2::new(5.0, 5.0),
        },
    );
    let events = tick(&mut world);
    assert!(
        selection_events(&events).is_empty(),
        "a consumed click must not fire again"
    );
}

#[test]
fn paused_world_still_processes_clicks() {
    let mut world = demo_world();
    let _ = run(&mut world, Command::TogglePause);
    assert!(query::is_paused(&world));

    let events = click_at(&mut world, Vec2::new(455.0, 120.0));
    assert_eq!(selection_events(&events), vec![Selection::Pad(PadIndex::new(3))]);

    assert_eq!(
        run(&mut world, Command::TogglePause),
        vec![Event::PauseToggled { paused: false }]
    );
}

#[test]
fn selling_selects_the_freed_pad() {
    let mut world = demo_world();
    let pad = PadIndex::new(6);
    let _ = run(
        &mut world,
        Command::BuildTower {
            pad,
            kind: TowerKind::Archer,
        },
    );
    let _ = run(&mut world, Command::SellTower { pad });

    assert_eq!(query::selection(&world), Selection::Pad(pad));
    assert_eq!(query::selection(&world).pad(), Some(pad));
}
