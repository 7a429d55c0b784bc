#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Door transition system that moves the player between rooms.

use mine_crawl_core::{
    Command, Door, Event, Outcome, RoomId, RoomLayout, RoomLayoutView, Side, Vec2,
};
use tracing::{debug, info, warn};

/// Minimum distance kept between an arriving player and the room walls.
pub const EDGE_MARGIN: f32 = 16.0;

/// Distance an arriving player is placed inward from the mirror door's wall.
pub const ARRIVAL_OFFSET: f32 = 36.0;

/// Pure system that resolves door contacts and collapse fallbacks into room entries.
#[derive(Debug, Default)]
pub struct Transition;

impl Transition {
    /// Creates a new transition system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and emits room entry or conclusion commands.
    pub fn handle(&mut self, events: &[Event], layouts: &RoomLayoutView, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::DoorReached { room, door, .. } => {
                    if let Some(command) = resolve_door(*room, door, layouts) {
                        out.push(command);
                    }
                }
                Event::CurrentRoomCollapsed { fallback } => {
                    if let Some(command) = on_collapse_fallback(*fallback, layouts) {
                        out.push(command);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Rooms whose layouts [`Transition::handle`] reads for the provided events.
///
/// Empty when no event in the batch concerns a transition.
#[must_use]
pub fn rooms_involved(events: &[Event]) -> Vec<RoomId> {
    let mut rooms = Vec::new();
    for event in events {
        match event {
            Event::DoorReached { room, door, .. } => {
                rooms.push(*room);
                rooms.extend(door.destination());
            }
            Event::CurrentRoomCollapsed { fallback } => rooms.extend(*fallback),
            _ => {}
        }
    }
    rooms
}

fn resolve_door(origin: RoomId, door: &Door, layouts: &RoomLayoutView) -> Option<Command> {
    if door.is_locked() {
        return None;
    }
    if door.is_win() {
        info!(room = origin.get(), "exit door reached");
        return Some(Command::Conclude {
            outcome: Outcome::Win,
        });
    }

    let destination = layouts.get(door.destination()?)?;
    let spawn = resolve_arrival(origin, layouts.get(origin), door, destination);
    debug!(
        from = origin.get(),
        to = destination.id.get(),
        x = spawn.x,
        y = spawn.y,
        "door transition"
    );
    Some(Command::EnterRoom {
        room: destination.id,
        spawn,
    })
}

/// Finds the door in `destination` that leads back to `origin`.
#[must_use]
pub fn find_mirror(destination: &RoomLayout, origin: RoomId) -> Option<&Door> {
    destination
        .doors
        .iter()
        .find(|door| door.destination() == Some(origin))
}

/// Computes where the player appears in `destination` after using `door`.
///
/// The player lands just inside the wall hosting the mirror door. Without a
/// mirror the wall is inferred from the side of the origin room the door sits
/// on, and the player is centred along it.
#[must_use]
pub fn resolve_arrival(
    origin: RoomId,
    origin_layout: Option<&RoomLayout>,
    door: &Door,
    destination: &RoomLayout,
) -> Vec2 {
    let (width, height) = (destination.width, destination.height);

    if let Some(mirror) = find_mirror(destination, origin) {
        let center = mirror.area().center();
        let inset = EDGE_MARGIN + ARRIVAL_OFFSET;
        let along_x = clamp_axis(center.x, width);
        let along_y = clamp_axis(center.y, height);
        return match rounded_nearest_side(center, width, height) {
            Side::Left => Vec2::new(inset.min(width - EDGE_MARGIN), along_y),
            Side::Right => Vec2::new((width - inset).max(EDGE_MARGIN), along_y),
            Side::Top => Vec2::new(along_x, inset.min(height - EDGE_MARGIN)),
            Side::Bottom => Vec2::new(along_x, (height - inset).max(EDGE_MARGIN)),
        };
    }

    warn!(
        from = origin.get(),
        to = destination.id.get(),
        "destination has no mirror door"
    );
    let Some(origin_layout) = origin_layout else {
        return Vec2::new(clamp_axis(door.spawn().x, width), clamp_axis(door.spawn().y, height));
    };

    let inset = EDGE_MARGIN.max(ARRIVAL_OFFSET);
    let mid_x = clamp_axis(width / 2.0, width);
    let mid_y = clamp_axis(height / 2.0, height);
    match rounded_nearest_side(door.area().center(), origin_layout.width, origin_layout.height) {
        Side::Left => Vec2::new(inset, mid_y),
        Side::Right => Vec2::new(width - inset, mid_y),
        Side::Top => Vec2::new(mid_x, inset),
        Side::Bottom => Vec2::new(mid_x, height - inset),
    }
}

/// Enters the fallback leaf chosen after the current room collapsed.
///
/// Returns `None` when no room remains, leaving the session without a room.
#[must_use]
pub fn on_collapse_fallback(fallback: Option<RoomId>, layouts: &RoomLayoutView) -> Option<Command> {
    let layout = layouts.get(fallback?)?;
    info!(room = layout.id.get(), "relocating after collapse");
    Some(Command::EnterRoom {
        room: layout.id,
        spawn: Vec2::new(layout.width / 2.0, layout.height / 2.0),
    })
}

fn rounded_nearest_side(point: Vec2, width: f32, height: f32) -> Side {
    Side::nearest(
        Vec2::new(point.x.round(), point.y.round()),
        width.round(),
        height.round(),
    )
}

fn clamp_axis(value: f32, extent: f32) -> f32 {
    value.max(EDGE_MARGIN).min(extent - EDGE_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mine_crawl_core::Rect;

    fn layout(id: u32, doors: Vec<Door>) -> RoomLayout {
        RoomLayout {
            id: RoomId::new(id),
            level: id,
            width: 800.0,
            height: 600.0,
            doors,
        }
    }

    fn passage(x: f32, y: f32, destination: u32) -> Door {
        Door::passage(
            Rect::new(x, y, 80.0, 28.0),
            RoomId::new(destination),
            Vec2::new(400.0, 80.0),
            destination.to_string(),
        )
    }

    #[test]
    fn arrival_sits_inside_the_mirror_wall() {
        let origin = layout(0, vec![passage(280.0, 562.0, 1)]);
        let destination = layout(1, vec![passage(360.0, 10.0, 0)]);

        let spawn = resolve_arrival(
            origin.id,
            Some(&origin),
            &origin.doors[0],
            &destination,
        );
        assert_eq!(spawn, Vec2::new(400.0, 52.0));

        let back = resolve_arrival(
            destination.id,
            Some(&destination),
            &destination.doors[0],
            &origin,
        );
        assert_eq!(back, Vec2::new(320.0, 548.0));
    }

    #[test]
    fn side_mirrors_clamp_along_the_wall() {
        let origin = layout(0, vec![passage(280.0, 562.0, 1)]);
        let destination = layout(1, vec![passage(-38.0, 575.0, 0)]);
        let spawn = resolve_arrival(origin.id, Some(&origin), &origin.doors[0], &destination);
        assert_eq!(spawn, Vec2::new(52.0, 584.0));
    }

    #[test]
    fn missing_mirror_uses_the_origin_wall() {
        let origin = layout(0, vec![passage(280.0, 562.0, 1)]);
        let destination = layout(1, Vec::new());
        let spawn = resolve_arrival(origin.id, Some(&origin), &origin.doors[0], &destination);
        assert_eq!(spawn, Vec2::new(400.0, 564.0));
    }

    #[test]
    fn missing_origin_falls_back_to_the_door_spawn() {
        let origin = layout(0, vec![passage(280.0, 562.0, 1)]);
        let destination = layout(1, Vec::new());
        let spawn = resolve_arrival(origin.id, None, &origin.doors[0], &destination);
        assert_eq!(spawn, Vec2::new(400.0, 80.0));
    }

    #[test]
    fn unlocked_exit_concludes_with_a_win() {
        let mut exit = Door::exit(Rect::new(690.0, 10.0, 100.0, 32.0));
        exit.set_locked(false);
        let layouts = RoomLayoutView::from_layouts(vec![layout(0, vec![exit.clone()])]);

        let mut commands = Vec::new();
        Transition::new().handle(
            &[Event::DoorReached {
                room: RoomId::new(0),
                index: 0,
                door: exit,
            }],
            &layouts,
            &mut commands,
        );
        assert_eq!(
            commands,
            vec![Command::Conclude {
                outcome: Outcome::Win
            }]
        );
    }

    #[test]
    fn only_transition_events_involve_rooms() {
        let events = [
            Event::TimeAdvanced {
                dt: std::time::Duration::from_millis(16),
            },
            Event::DoorReached {
                room: RoomId::new(3),
                index: 0,
                door: passage(360.0, 10.0, 1),
            },
            Event::DoorReached {
                room: RoomId::new(0),
                index: 2,
                door: Door::exit(Rect::new(690.0, 10.0, 100.0, 32.0)),
            },
            Event::CurrentRoomCollapsed {
                fallback: Some(RoomId::new(6)),
            },
            Event::CurrentRoomCollapsed { fallback: None },
        ];
        assert_eq!(
            rooms_involved(&events),
            vec![
                RoomId::new(3),
                RoomId::new(1),
                RoomId::new(0),
                RoomId::new(6)
            ]
        );
        assert!(rooms_involved(&events[..1]).is_empty());
    }

    #[test]
    fn collapse_fallback_enters_the_leaf_centre() {
        let layouts = RoomLayoutView::from_layouts(vec![layout(4, Vec::new())]);
        assert_eq!(
            on_collapse_fallback(Some(RoomId::new(4)), &layouts),
            Some(Command::EnterRoom {
                room: RoomId::new(4),
                spawn: Vec2::new(400.0, 300.0),
            })
        );
        assert_eq!(on_collapse_fallback(None, &layouts), None);
        assert_eq!(on_collapse_fallback(Some(RoomId::new(9)), &layouts), None);
    }
}
