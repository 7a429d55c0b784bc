//! Input source that explores the mine without a human at the keyboard.

use mine_crawl_core::{FrameSnapshot, InputFrame, InputSource, Pickup, RoomId, Vec2};

const ENGAGE_RADIUS: f32 = 220.0;

/// Chases pickups, fights nearby enemies and otherwise walks to a door.
#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    last_room: Option<RoomId>,
    rooms_entered: usize,
}

impl InputSource for Autopilot {
    fn poll(&mut self, frame: &FrameSnapshot) -> InputFrame {
        if !frame.offer.is_empty() {
            return InputFrame {
                movement: Vec2::ZERO,
                selection: Some(0),
            };
        }
        let (Some(room), Some(player)) = (&frame.room, &frame.player) else {
            return InputFrame::default();
        };
        if self.last_room != Some(room.id) {
            self.last_room = Some(room.id);
            self.rooms_entered += 1;
        }

        let origin = player.position;
        let pickup = closest(
            origin,
            frame.pickups.iter().map(|pickup| match pickup {
                Pickup::Crystal { position, .. } | Pickup::Key { position, .. } => *position,
            }),
        );
        let enemy = closest(origin, frame.enemies.iter().map(|enemy| enemy.position))
            .filter(|position| position.distance(origin) <= ENGAGE_RADIUS);
        let door = room
            .doors
            .iter()
            .find(|door| door.is_win() && !door.is_locked())
            .or_else(|| {
                let passages: Vec<_> = room.doors.iter().filter(|door| !door.is_win()).collect();
                passages
                    .get(self.rooms_entered % passages.len().max(1))
                    .copied()
            })
            .map(|door| door.area().center());

        let movement = pickup
            .or(enemy)
            .or(door)
            .map_or(Vec2::ZERO, |target| (target - origin).normalize_or_zero());
        InputFrame {
            movement,
            selection: None,
        }
    }
}

fn closest(origin: Vec2, points: impl Iterator<Item = Vec2>) -> Option<Vec2> {
    points.min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mine_crawl_core::{Choice, ChoiceKind, Door, PlayerSnapshot, Rect, RoomLayout};

    fn frame(pickups: Vec<Pickup>) -> FrameSnapshot {
        FrameSnapshot {
            room: Some(RoomLayout {
                id: RoomId::new(1),
                level: 1,
                width: 800.0,
                height: 600.0,
                doors: vec![Door::passage(
                    Rect::new(360.0, 10.0, 80.0, 28.0),
                    RoomId::new(0),
                    Vec2::new(400.0, 550.0),
                    "0".to_owned(),
                )],
            }),
            pickups,
            player: Some(PlayerSnapshot {
                position: Vec2::new(400.0, 300.0),
                facing: Vec2::new(0.0, -1.0),
                hp: 100,
                max_hp: 100,
                level: 1,
                current_xp: 0,
                xp_to_next: 80,
                keys: Vec::new(),
                anim_tick: 0,
            }),
            ..FrameSnapshot::default()
        }
    }

    #[test]
    fn open_offers_pick_the_first_choice() {
        let mut frame = frame(Vec::new());
        frame.offer = vec![Choice {
            kind: ChoiceKind::Passive,
            id: "miner_greed".to_owned(),
            name: "Miner Greed".to_owned(),
            description: String::new(),
        }];
        let input = Autopilot::default().poll(&frame);
        assert_eq!(input.selection, Some(0));
        assert_eq!(input.movement, Vec2::ZERO);
    }

    #[test]
    fn pickups_take_priority_over_doors() {
        let input = Autopilot::default().poll(&frame(vec![Pickup::Crystal {
            position: Vec2::new(500.0, 300.0),
            value: 1,
        }]));
        assert_eq!(input.movement, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn empty_rooms_head_for_a_door() {
        let input = Autopilot::default().poll(&frame(Vec::new()));
        assert_eq!(input.movement, Vec2::new(0.0, -1.0));
    }
}
