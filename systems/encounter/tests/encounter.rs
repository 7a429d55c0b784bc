use mine_crawl_core::{Command, Event, RoomId, Vec2};
use mine_crawl_system_encounter::{Config, Encounter, Tuning};
use mine_crawl_world::{self as world, query, World, WorldConfig};

fn world() -> World {
    World::new(&WorldConfig {
        tree_height: 2,
        room_width: 800.0,
        room_height: 600.0,
        seed: 21,
        starting_keys: Vec::new(),
    })
    .expect("world")
}

fn encounter(seed: u64) -> Encounter {
    Encounter::new(Config::new(Tuning::default(), seed))
}

#[test]
fn entering_an_empty_leaf_spawns_a_wave() {
    let mut world = world();
    let mut encounter = encounter(9);
    let mut events = Vec::new();
    world::apply(&mut world, Command::BeginSession, &mut events);

    let mut commands = Vec::new();
    encounter.handle(&events, &mut commands);
    let room = query::current_room(&world).expect("current");
    match commands.as_slice() {
        [Command::SpawnWave { room: target, enemies }] => {
            assert_eq!(*target, room);
            assert_eq!(enemies.len(), 15, "leaves receive the base amount");
        }
        other => panic!("unexpected commands: {other:?}"),
    }

    let mut spawned = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut spawned);
    }
    assert_eq!(spawned, vec![Event::WaveSpawned { room, count: 15 }]);
    assert!(query::rosters(&world).has_living(room));
}

#[test]
fn entering_the_root_spawns_a_single_boss() {
    let mut world = world();
    let mut encounter = encounter(9);
    let root = RoomId::new(0);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::EnterRoom {
            room: root,
            spawn: Vec2::new(400.0, 80.0),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    encounter.handle(&events, &mut commands);
    assert_eq!(
        commands,
        vec![Command::SpawnBoss {
            room: root,
            position: Vec2::new(400.0, 300.0),
        }]
    );
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    events.clear();
    world::apply(
        &mut world,
        Command::EnterRoom {
            room: root,
            spawn: Vec2::new(400.0, 80.0),
        },
        &mut events,
    );
    let mut commands = Vec::new();
    encounter.handle(&events, &mut commands);
    assert!(commands.is_empty(), "a living boss suppresses respawns");
}

#[test]
fn root_vacancy_with_a_boss_is_ignored() {
    let world = world();
    let site = query::encounter_site(&world, RoomId::new(0)).expect("root site");
    let mut encounter = encounter(9);
    let mut commands = Vec::new();
    encounter.handle(
        &[Event::RoomVacated {
            site,
            boss_present: true,
        }],
        &mut commands,
    );
    assert!(commands.is_empty());

    encounter.handle(
        &[Event::RoomVacated {
            site,
            boss_present: false,
        }],
        &mut commands,
    );
    assert_eq!(commands.len(), 1);
}

#[test]
fn repeated_clears_grow_the_next_wave() {
    let world = world();
    let mut site = query::encounter_site(&world, RoomId::new(1)).expect("site");
    let mut encounter = encounter(3);
    let mut sizes = Vec::new();

    for clear_count in 0..3 {
        site.clear_count = clear_count;
        let mut commands = Vec::new();
        encounter.handle(
            &[Event::RoomVacated {
                site,
                boss_present: false,
            }],
            &mut commands,
        );
        match commands.as_slice() {
            [Command::SpawnWave { enemies, .. }] => sizes.push(enemies.len()),
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    assert_eq!(sizes, vec![24, 36, 48]);
}

#[test]
fn identical_seeds_produce_identical_waves() {
    let world = world();
    let site = query::encounter_site(&world, RoomId::new(2)).expect("site");
    let events = [Event::RoomVacated {
        site,
        boss_present: false,
    }];

    let mut first = Vec::new();
    encounter(77).handle(&events, &mut first);
    let mut second = Vec::new();
    encounter(77).handle(&events, &mut second);
    let mut other = Vec::new();
    encounter(78).handle(&events, &mut other);

    assert_eq!(first, second);
    assert_ne!(first, other);
}
