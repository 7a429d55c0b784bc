use std::time::{Duration, Instant};

use mine_crawl_core::{Event, FrameSnapshot, InputFrame, Notice, Outcome, RoomId, Vec2};
use mine_crawl_simulation::{Session, SessionConfig, TickReport};
use mine_crawl_world::{query, GOLDEN_KEY, MAX_TREE_HEIGHT};

const TICK: Duration = Duration::from_millis(16);

fn config(seed: u64) -> SessionConfig {
    SessionConfig {
        seed,
        tree_height: 2,
        room_width: 800.0,
        room_height: 600.0,
        ..SessionConfig::default()
    }
}

#[test]
fn session_start_populates_the_first_room() {
    let session = Session::new(&config(1)).expect("session");
    let frame = session.frame();
    assert!(frame.room.is_some());
    assert_eq!(frame.enemies.len(), 15, "deepest leaves receive the base wave");
    assert!(frame
        .enemies
        .iter()
        .all(|enemy| (1..=1).contains(&enemy.level)));
}

#[test]
fn invalid_configuration_is_reported() {
    let error = Session::new(&SessionConfig {
        tree_height: -2,
        ..SessionConfig::default()
    })
    .expect_err("negative height");
    assert!(error.to_string().contains("-2"));
}

#[test]
fn paused_sessions_do_not_advance() {
    let mut session = Session::new(&config(2)).expect("session");
    let mut notices = Vec::new();

    session.set_paused(true, &mut notices);
    session.set_paused(true, &mut notices);
    let report = session.tick(TICK, &InputFrame::default(), &mut notices);
    assert!(report.events.is_empty());
    assert_eq!(query::tick_index(session.world()), 0);

    session.set_paused(false, &mut notices);
    let report = session.tick(TICK, &InputFrame::default(), &mut notices);
    assert!(matches!(report.events.first(), Some(Event::TimeAdvanced { .. })));
    assert_eq!(notices, vec![Notice::Paused, Notice::Resumed]);
}

#[test]
fn collapsing_the_current_room_relocates_the_player() {
    let mut session = Session::new(&config(3)).expect("session");
    let current = query::current_room(session.world()).expect("current");

    let events = session.collapse(current);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::CurrentRoomCollapsed { fallback: Some(_) })));

    let relocated = query::current_room(session.world()).expect("relocated");
    assert_ne!(relocated, current);
    assert!(query::graph(session.world()).children(relocated).is_empty());
    assert!(
        !session.frame().enemies.is_empty(),
        "entering the fallback leaf spawns its wave"
    );
}

#[test]
fn walking_through_the_open_exit_wins_once() {
    let mut session = Session::new(&SessionConfig {
        seed: 5,
        tree_height: 0,
        room_width: 800.0,
        room_height: 600.0,
        starting_keys: vec![GOLDEN_KEY.to_owned()],
        ..SessionConfig::default()
    })
    .expect("session");
    assert_eq!(query::current_room(session.world()), Some(RoomId::new(0)));
    let frame = session.frame();
    let exit = frame
        .room
        .as_ref()
        .and_then(|room| room.doors.iter().find(|door| door.is_win()))
        .expect("exit door");
    assert!(!exit.is_locked());
    assert_eq!(frame.enemies.len(), 1, "the guardian waits in the root");

    let waypoints = [Vec2::new(740.0, 540.0), Vec2::new(740.0, 26.0)];
    let mut leg = 0;
    let mut notices = Vec::new();
    let mut outcome = None;
    for _ in 0..1_000 {
        let position = query::player(session.world()).position();
        if leg == 0 && position.distance(waypoints[0]) < 4.0 {
            leg = 1;
        }
        let input = InputFrame {
            movement: (waypoints[leg] - position).normalize_or_zero(),
            selection: None,
        };
        let report = session.tick(TICK, &input, &mut notices);
        if report.outcome.is_some() {
            assert!(report
                .events
                .iter()
                .any(|event| matches!(event, Event::DoorReached { .. })));
            outcome = report.outcome;
            break;
        }
    }

    assert_eq!(outcome, Some(Outcome::Win));
    assert_eq!(session.outcome(), Some(Outcome::Win));
    assert_eq!(notices, vec![Notice::Win]);

    let after = session.tick(TICK, &InputFrame::default(), &mut notices);
    assert_eq!(after, TickReport::default());
    assert_eq!(notices, vec![Notice::Win]);
}

#[test]
fn deepest_dungeons_tick_without_rescanning_rooms() {
    let mut session = Session::new(&SessionConfig {
        seed: 9,
        tree_height: MAX_TREE_HEIGHT,
        ..SessionConfig::default()
    })
    .expect("session");
    assert_eq!(query::graph(session.world()).len(), (1 << 17) - 1);

    let mut notices = Vec::new();
    let started = Instant::now();
    for _ in 0..120 {
        let _ = session.tick(TICK, &InputFrame::default(), &mut notices);
    }
    let elapsed = started.elapsed();
    assert!(
        elapsed < Duration::from_secs(2),
        "120 ticks took {elapsed:?} in a {}-room dungeon",
        (1 << 17) - 1
    );
    assert_eq!(query::tick_index(session.world()), 120);
}

#[test]
fn deterministic_replay_produces_identical_sessions() {
    let first = replay(17);
    let second = replay(17);
    assert_eq!(first, second, "replay diverged between runs");

    let other = replay(18);
    assert_ne!(first, other, "different seeds should diverge");
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    frame: FrameSnapshot,
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut session = Session::new(&config(seed)).expect("session");
    let mut notices = Vec::new();
    let mut events = Vec::new();

    for step in 0..600_u32 {
        let angle = step as f32 * 0.05;
        let input = InputFrame {
            movement: Vec2::new(angle.cos(), angle.sin()),
            selection: Some(0),
        };
        let report = session.tick(TICK, &input, &mut notices);
        events.extend(report.events);
        if report.outcome.is_some() {
            break;
        }
    }

    ReplayOutcome {
        events,
        frame: session.frame(),
    }
}
