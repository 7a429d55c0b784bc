//! Per-tick simulation stages for the occupied room.

use std::time::Duration;

use mine_crawl_core::{EnemyClass, Event, Outcome, Rect, RoomId, Vec2};
use rand::Rng;
use tracing::{debug, info};

use crate::graph::{Crystal, KeyPickup};
use crate::ordnance::{self, Field};
use crate::{Enemy, World, GOLDEN_KEY};

const PLAYER_EXTENT: f32 = 20.0;
const PICKUP_RADIUS: f32 = 20.0;
const ENEMY_SPACING: f32 = 18.0;
const SPACING_EPSILON: f32 = 1e-6;
const CONTACT_PUSH: f32 = 60.0;
const CONTACT_RECOIL: f32 = 30.0;
const CONTACT_SEPARATION: f32 = 1.5;
const SCRAP_SPREAD: f32 = 40.0;
const REWARD_SPREAD: f32 = 30.0;
const BONUS_SPREAD: f32 = 48.0;
const DROP_MARGIN: f32 = 8.0;
const KEY_MARGIN: f32 = 60.0;

impl World {
    /// Advances the occupied room by `dt`, steering the player by `movement`.
    pub(crate) fn tick(&mut self, dt: Duration, movement: Vec2, out_events: &mut Vec<Event>) {
        let Some(room) = self.current else {
            return;
        };
        let Some((width, height)) = self
            .graph
            .room(room)
            .map(|hosted| (hosted.width(), hosted.height()))
        else {
            return;
        };

        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });
        let seconds = dt.as_secs_f32();

        if self.offer.is_some() {
            self.ordnance.retain_mut(|piece| piece.fade(seconds));
            return;
        }

        // Doors are tested at the post-move position, so a step into a door is taken this tick.
        self.player.steer(movement, seconds, width, height);
        if self.check_doors(room, out_events) {
            return;
        }

        self.advance_ordnance(room, seconds);
        self.reap(room, out_events);

        let target = self.player.position();
        for enemy in self.rosters.enemies_mut(room) {
            enemy.advance(seconds, target, width, height);
        }
        self.separate_enemies(room);
        self.resolve_contacts(room, out_events);

        self.player.advance(seconds, width, height);
        let aim = ordnance::nearest(self.rosters.enemies(room), self.player.position())
            .map(Enemy::id);
        let orbs = self.ordnance.iter().filter(|piece| piece.is_orb()).count();
        self.player
            .fire_weapons(&self.catalog, aim, orbs, &mut self.ordnance);

        if !self.player.is_alive() {
            self.conclude(Outcome::GameOver, out_events);
            return;
        }

        self.collect_pickups(room, out_events);
        self.settle_vacancy(room, out_events);
    }

    fn check_doors(&self, room: RoomId, out_events: &mut Vec<Event>) -> bool {
        let Some(hosted) = self.graph.room(room) else {
            return false;
        };
        let bounds = Rect::centered(self.player.position(), PLAYER_EXTENT, PLAYER_EXTENT);

        for (index, door) in hosted.doors().iter().enumerate() {
            if !bounds.intersects(door.area()) {
                continue;
            }
            if door.is_locked() {
                out_events.push(Event::DoorLocked { room, index });
                continue;
            }
            debug!(room = room.get(), index, label = door.label(), "door reached");
            out_events.push(Event::DoorReached {
                room,
                index,
                door: door.clone(),
            });
            return true;
        }
        false
    }

    fn advance_ordnance(&mut self, room: RoomId, seconds: f32) {
        let mut field = Field {
            enemies: self.rosters.enemies_mut(room),
            player: self.player.position(),
            spawned: Vec::new(),
        };
        self.ordnance
            .retain_mut(|piece| piece.advance(seconds, &mut field));
        let spawned = field.spawned;
        self.ordnance.extend(spawned);
    }

    fn reap(&mut self, room: RoomId, out_events: &mut Vec<Event>) {
        for enemy in self.rosters.reap(room) {
            self.drop_rewards(room, &enemy);
            if enemy.class() == EnemyClass::Boss {
                self.drop_golden_key();
            }
            debug!(
                room = room.get(),
                enemy = enemy.id().get(),
                level = enemy.level(),
                "enemy killed"
            );
            out_events.push(Event::EnemyKilled {
                enemy: enemy.id(),
                room,
                class: enemy.class(),
                level: enemy.level(),
            });
        }
    }

    fn drop_rewards(&mut self, room: RoomId, enemy: &Enemy) {
        let Some(hosted) = self.graph.room_mut(room) else {
            return;
        };
        let origin = enemy.position();
        let level = enemy.level();
        let clear_count = hosted.clear_count();

        let scraps = self.rng.gen_range(1..=3);
        for _ in 0..scraps {
            let position =
                hosted.clamp_point(origin + jitter(&mut self.rng, SCRAP_SPREAD), DROP_MARGIN);
            hosted.crystals_mut().push(Crystal::new(position, 1));
        }

        let count = (4 * level * (1 + clear_count) / 2).max(1);
        for _ in 0..count {
            let value = (4 + 2 * level.saturating_sub(1) + self.rng.gen_range(0..=2)).max(1);
            let position = origin + jitter(&mut self.rng, REWARD_SPREAD);
            hosted.crystals_mut().push(Crystal::new(position, value));
        }
    }

    fn drop_golden_key(&mut self) {
        let Some(host) = self
            .graph
            .pick_random_non_root(&mut self.rng)
            .or(self.graph.root())
        else {
            return;
        };
        let Some(hosted) = self.graph.room_mut(host) else {
            return;
        };
        let span_x = (hosted.width() - 2.0 * KEY_MARGIN).max(0.0);
        let span_y = (hosted.height() - 2.0 * KEY_MARGIN).max(0.0);
        let position = hosted.clamp_point(
            Vec2::new(
                KEY_MARGIN + self.rng.gen::<f32>() * span_x,
                KEY_MARGIN + self.rng.gen::<f32>() * span_y,
            ),
            DROP_MARGIN,
        );
        hosted.keys_mut().push(KeyPickup::new(position, GOLDEN_KEY));
        info!(room = host.get(), "golden key dropped");
    }

    fn separate_enemies(&mut self, room: RoomId) {
        let enemies = self.rosters.enemies_mut(room);
        for first in 0..enemies.len() {
            for second in first + 1..enemies.len() {
                if !enemies[first].is_alive() || !enemies[second].is_alive() {
                    continue;
                }
                let offset = enemies[second].position() - enemies[first].position();
                let distance_sq = offset.length_squared();
                if distance_sq <= 0.0 || distance_sq >= ENEMY_SPACING * ENEMY_SPACING {
                    continue;
                }
                let distance = distance_sq.sqrt();
                let normal = offset / (distance + SPACING_EPSILON);
                let push = normal * (0.5 * (ENEMY_SPACING - distance));
                enemies[first].translate(-push);
                enemies[second].translate(push);
            }
        }
    }

    fn resolve_contacts(&mut self, room: RoomId, out_events: &mut Vec<Event>) {
        for enemy in self.rosters.enemies_mut(room) {
            if !enemy.is_alive() || !enemy.touches(self.player.position()) {
                continue;
            }

            let amount = enemy.contact_damage();
            if self.player.receive_damage(amount) {
                debug!(amount, hp = self.player.hp(), "player damaged");
                out_events.push(Event::PlayerDamaged {
                    amount,
                    hp: self.player.hp(),
                });
            }

            let mut offset = self.player.position() - enemy.position();
            if offset.length_squared() < SPACING_EPSILON {
                offset = Vec2::new(0.5, 0.5);
            }
            let normal = offset.normalize();
            let level = enemy.level() as f32;
            self.player
                .apply_knockback(normal * CONTACT_PUSH * (1.0 - 0.12 * level).max(0.0));
            enemy.apply_knockback(-normal * CONTACT_RECOIL * (1.0 - 0.08 * level).max(0.0));
            self.player.nudge(normal * CONTACT_SEPARATION);
            enemy.translate(-normal * CONTACT_SEPARATION);
        }
    }

    fn collect_pickups(&mut self, room: RoomId, out_events: &mut Vec<Event>) {
        let Some(hosted) = self.graph.room_mut(room) else {
            return;
        };
        let position = self.player.position();
        let within = |point: Vec2| point.distance_squared(position) < PICKUP_RADIUS * PICKUP_RADIUS;

        let mut gathered = Vec::new();
        hosted.crystals_mut().retain(|crystal| {
            let near = within(crystal.position());
            if near {
                gathered.push(crystal.value());
            }
            !near
        });
        let mut keys = Vec::new();
        hosted.keys_mut().retain(|key| {
            let near = within(key.position());
            if near {
                keys.push(key.id().to_owned());
            }
            !near
        });

        let before = self.player.level();
        for value in gathered {
            let xp = self.player.add_xp(value);
            out_events.push(Event::CrystalCollected { value, xp });
        }
        let after = self.player.level();
        if after > before {
            self.queue_level_ups(before, after, out_events);
        }

        for key in keys {
            if self.player.add_key(&key) {
                info!(key = %key, "key collected");
            }
            let golden = key == GOLDEN_KEY;
            out_events.push(Event::KeyCollected { key });
            if golden {
                self.unlock_exit(out_events);
            }
        }
    }

    pub(crate) fn unlock_exit(&mut self, out_events: &mut Vec<Event>) {
        let Some(root) = self.graph.root() else {
            return;
        };
        let Some(hosted) = self.graph.room_mut(root) else {
            return;
        };
        let mut unlocked = false;
        for door in hosted.doors_mut() {
            if door.is_win() && door.is_locked() {
                door.set_locked(false);
                unlocked = true;
            }
        }
        if unlocked {
            info!(room = root.get(), "exit unlocked");
            out_events.push(Event::WinDoorUnlocked { room: root });
        }
    }

    fn settle_vacancy(&mut self, room: RoomId, out_events: &mut Vec<Event>) {
        let vacant = !self.rosters.has_living(room);
        let Some(hosted) = self.graph.room_mut(room) else {
            return;
        };
        if !vacant {
            hosted.mark_occupied();
            return;
        }

        if hosted.mark_cleared() {
            let clear_count = hosted.clear_count();
            let center = hosted.center();
            for _ in 0..2 + clear_count / 2 {
                let value = 4 + self.rng.gen_range(0..=2) + clear_count;
                let position = center + jitter(&mut self.rng, BONUS_SPREAD);
                hosted.crystals_mut().push(Crystal::new(position, value));
            }
            debug!(room = room.get(), clear_count, "room cleared");
            out_events.push(Event::RoomCleared { room, clear_count });
        }

        if let Some(site) = self.encounter_site(room) {
            out_events.push(Event::RoomVacated {
                site,
                boss_present: self.rosters.has_living_boss(room),
            });
        }
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> Vec2 {
    Vec2::new(
        (rng.gen::<f32>() - 0.5) * spread,
        (rng.gen::<f32>() - 0.5) * spread,
    )
}
