use std::time::Duration;

use mine_crawl_core::{Command, Event, Rect, RoomId, Vec2};
use mine_crawl_system_transition::{
    find_mirror, resolve_arrival, rooms_involved, Transition, EDGE_MARGIN,
};
use mine_crawl_world::{self as world, query, World, WorldConfig};

fn world(tree_height: i32) -> World {
    World::new(&WorldConfig {
        tree_height,
        room_width: 950.0,
        room_height: 650.0,
        seed: 5,
        starting_keys: Vec::new(),
    })
    .expect("world")
}

fn pump(world: &mut World, transition: &mut Transition, command: Command) -> Vec<Event> {
    let mut log = Vec::new();
    let mut events = Vec::new();
    world::apply(world, command, &mut events);

    while !events.is_empty() {
        log.extend(events.iter().cloned());
        let layouts = query::room_layouts(world, &rooms_involved(&events));
        let mut commands = Vec::new();
        transition.handle(&events, &layouts, &mut commands);
        events.clear();
        for command in commands {
            world::apply(world, command, &mut events);
        }
    }
    log
}

#[test]
fn mirror_resolution_is_symmetric() {
    let world = world(3);
    let layouts = query::room_layouts(&world, &query::graph(&world).room_ids());

    for origin in layouts.iter() {
        for door in origin.doors.iter().filter(|door| !door.is_win()) {
            let destination = layouts
                .get(door.destination().expect("passage destination"))
                .expect("destination layout");
            let mirror = find_mirror(destination, origin.id).expect("mirror");
            assert_eq!(find_mirror(origin, destination.id), Some(door));
            assert_eq!(mirror.destination(), Some(origin.id));
        }
    }
}

#[test]
fn arrivals_stay_inside_and_clear_of_doors() {
    let world = world(3);
    let layouts = query::room_layouts(&world, &query::graph(&world).room_ids());

    for origin in layouts.iter() {
        for door in origin.doors.iter().filter(|door| !door.is_win()) {
            let destination = layouts
                .get(door.destination().expect("passage destination"))
                .expect("destination layout");
            let spawn = resolve_arrival(origin.id, Some(origin), door, destination);

            assert!(spawn.x >= EDGE_MARGIN && spawn.x <= destination.width - EDGE_MARGIN);
            assert!(spawn.y >= EDGE_MARGIN && spawn.y <= destination.height - EDGE_MARGIN);
            let bounds = Rect::centered(spawn, 20.0, 20.0);
            assert!(
                destination
                    .doors
                    .iter()
                    .all(|candidate| !bounds.intersects(candidate.area())),
                "arrival {spawn:?} in {:?} touches a door",
                destination.id
            );
        }
    }
}

#[test]
fn walking_through_a_door_changes_rooms() {
    let mut world = world(1);
    let mut transition = Transition::new();
    let root = RoomId::new(0);
    let _ = pump(
        &mut world,
        &mut transition,
        Command::EnterRoom {
            room: root,
            spawn: Vec2::new(395.0, 626.0),
        },
    );

    let log = pump(
        &mut world,
        &mut transition,
        Command::Tick {
            dt: Duration::from_millis(16),
            movement: Vec2::ZERO,
        },
    );

    assert!(log
        .iter()
        .any(|event| matches!(event, Event::DoorReached { room, .. } if *room == root)));
    assert_eq!(query::current_room(&world), Some(RoomId::new(1)));
    assert_eq!(
        query::player(&world).position(),
        Vec2::new(475.0, 52.0)
    );
}

#[test]
fn losing_every_room_leaves_no_current_room() {
    let mut world = world(0);
    let mut transition = Transition::new();
    let log = pump(
        &mut world,
        &mut transition,
        Command::CollapseRoom { room: RoomId::new(0) },
    );

    assert!(log.contains(&Event::CurrentRoomCollapsed { fallback: None }));
    assert_eq!(query::current_room(&world), None);
}

#[test]
fn collapse_relocates_to_a_remaining_leaf() {
    let mut world = world(1);
    let mut transition = Transition::new();
    let current = query::current_room(&world).expect("current");
    let _ = pump(&mut world, &mut transition, Command::CollapseRoom { room: current });

    let relocated = query::current_room(&world).expect("relocated");
    assert_ne!(relocated, current);
    assert!(query::graph(&world).children(relocated).is_empty());
    assert_eq!(query::player(&world).position(), Vec2::new(475.0, 325.0));
}
