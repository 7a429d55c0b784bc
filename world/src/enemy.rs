//! Enemies and the per-room rosters that own them.

use mine_crawl_core::{EnemyClass, EnemyId, EnemySnapshot, RoomId, Vec2};

use crate::registry::NodeRegistry;

const WALL_MARGIN: f32 = 8.0;
const CONTACT_RADIUS: f32 = 14.0;
const SEEK_EPSILON: f32 = 0.0001;
const ROAR_COOLDOWN: f32 = 3.0;

/// Behaviour state selected by the enemy class.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Behaviour {
    Grunt,
    Boss { roar_timer: f32, radius: f32 },
}

/// Hostile creature bound to a single room.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    room: RoomId,
    position: Vec2,
    velocity: Vec2,
    speed: f32,
    hp: u32,
    max_hp: u32,
    level: u32,
    contact_damage: u32,
    knockback_resistance: f32,
    alive: bool,
    facing_left: bool,
    anim_tick: u32,
    behaviour: Behaviour,
}

impl Enemy {
    fn from_base(
        id: EnemyId,
        room: RoomId,
        position: Vec2,
        base_hp: u32,
        base_speed: f32,
        level: u32,
    ) -> Self {
        let level = level.max(1);
        let steps = level - 1;
        let max_hp = base_hp.saturating_add(steps * 12).max(1);
        Self {
            id,
            room,
            position,
            velocity: Vec2::ZERO,
            speed: base_speed + 20.0 + steps as f32 * 6.0,
            hp: max_hp,
            max_hp,
            level,
            contact_damage: 6 + steps * 4,
            knockback_resistance: (0.2 + 0.15 * steps as f32).min(0.9),
            alive: true,
            facing_left: true,
            anim_tick: 0,
            behaviour: Behaviour::Grunt,
        }
    }

    /// Creates a regular wave enemy of the provided level.
    #[must_use]
    pub fn grunt(id: EnemyId, room: RoomId, position: Vec2, level: u32) -> Self {
        let level = level.max(1);
        Self::from_base(
            id,
            room,
            position,
            20 + level * 8,
            20.0 + level as f32 * 4.0,
            level,
        )
    }

    /// Creates the root guardian.
    #[must_use]
    pub fn boss(id: EnemyId, room: RoomId, position: Vec2) -> Self {
        let base = Self::from_base(id, room, position, 1, 1.0, 1);
        let level = base.level;
        let hp = base.hp.max(1 + (level - 1) * 40 + 800);
        let contact_damage = (base.contact_damage + level * 8).max(20);
        Self {
            hp,
            max_hp: hp,
            behaviour: Behaviour::Boss {
                roar_timer: 0.0,
                radius: 28.0 + level as f32 * 6.0,
            },
            ..base
        }
        .with_knockback_resistance((0.6 + 0.05 * level as f32).min(0.98))
        .with_contact_damage(contact_damage)
    }

    /// Overrides the damage dealt on contact with the player.
    #[must_use]
    pub fn with_contact_damage(mut self, contact_damage: u32) -> Self {
        self.contact_damage = contact_damage;
        self
    }

    /// Overrides the share of knockback the enemy ignores.
    #[must_use]
    pub fn with_knockback_resistance(mut self, resistance: f32) -> Self {
        self.knockback_resistance = resistance.clamp(0.0, 0.99);
        self
    }

    /// Identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Room that owns the enemy.
    #[must_use]
    pub const fn room(&self) -> RoomId {
        self.room
    }

    /// Behaviour class of the enemy.
    #[must_use]
    pub const fn class(&self) -> EnemyClass {
        match self.behaviour {
            Behaviour::Grunt => EnemyClass::Grunt,
            Behaviour::Boss { .. } => EnemyClass::Boss,
        }
    }

    /// Room-local position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Level of the enemy.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Damage dealt to the player on contact.
    #[must_use]
    pub const fn contact_damage(&self) -> u32 {
        self.contact_damage
    }

    /// Reports whether the enemy still fights.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive && self.hp > 0
    }

    /// Reports whether the enemy touches a player standing at `point`.
    #[must_use]
    pub fn touches(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= CONTACT_RADIUS * CONTACT_RADIUS
    }

    /// Adds a knockback impulse scaled by the enemy's resistance.
    pub fn apply_knockback(&mut self, impulse: Vec2) {
        self.velocity += impulse * (1.0 - self.knockback_resistance);
    }

    /// Deals damage, returning `true` when the hit was fatal.
    pub fn damage(&mut self, amount: u32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        if self.hp == 0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Shifts the enemy without affecting its velocity.
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Advances pursuit of a player standing at `target`.
    pub fn advance(&mut self, dt: f32, target: Vec2, width: f32, height: f32) {
        if !self.is_alive() {
            self.position += self.velocity * dt;
            self.velocity *= (1.0 - 6.0 * dt).max(0.0);
            return;
        }

        self.seek(dt, target, self.speed, 6.0);
        self.clamp_into(width, height);
        self.anim_tick = self.anim_tick.wrapping_add(1);

        let Behaviour::Boss { roar_timer, radius } = self.behaviour else {
            return;
        };
        let mut roar_timer = roar_timer - dt;
        let roaring = roar_timer <= 0.0;
        if roaring {
            roar_timer = ROAR_COOLDOWN;
        }
        self.behaviour = Behaviour::Boss { roar_timer, radius };

        let toward = target - self.position;
        if roaring && toward.length_squared() > SEEK_EPSILON {
            let burst = 1.8 + self.level as f32 * 0.05;
            let impulse = toward.normalize() * burst * 120.0 * (1.0 - self.knockback_resistance);
            self.apply_knockback(impulse);
        }

        let pursuit = (self.speed * 0.6).max(12.0);
        self.seek(dt, target, pursuit, 4.0);
        self.clamp_into(width, height);
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            class: self.class(),
            position: self.position,
            hp: self.hp,
            max_hp: self.max_hp,
            level: self.level,
            facing_left: self.facing_left,
            anim_tick: self.anim_tick,
            boss_radius: match self.behaviour {
                Behaviour::Grunt => None,
                Behaviour::Boss { radius, .. } => Some(radius),
            },
        }
    }

    fn seek(&mut self, dt: f32, target: Vec2, speed: f32, damping: f32) {
        let toward = target - self.position;
        if toward.length_squared() > SEEK_EPSILON {
            let direction = toward.normalize();
            self.position += (direction * speed + self.velocity) * dt;
            self.facing_left = direction.x < 0.0;
        } else {
            self.position += self.velocity * dt;
        }
        self.velocity *= (1.0 - damping * dt).max(0.0);
    }

    fn clamp_into(&mut self, width: f32, height: f32) {
        self.position.x = self.position.x.max(WALL_MARGIN).min(width - WALL_MARGIN);
        self.position.y = self.position.y.max(WALL_MARGIN).min(height - WALL_MARGIN);
    }
}

/// Live enemies grouped per room.
///
/// A room appears at most once and rooms without enemies have no entry.
#[derive(Clone, Debug, Default)]
pub struct Rosters {
    rooms: NodeRegistry<RoomId, Vec<Enemy>>,
}

impl Rosters {
    /// Enemies bound to a room, empty when the room has no roster.
    #[must_use]
    pub fn enemies(&self, room: RoomId) -> &[Enemy] {
        self.rooms.get(&room).map(Vec::as_slice).unwrap_or_default()
    }

    /// Reports whether the room has no roster.
    #[must_use]
    pub fn is_empty(&self, room: RoomId) -> bool {
        !self.rooms.contains(&room)
    }

    /// Reports whether the room holds a living boss.
    #[must_use]
    pub fn has_living_boss(&self, room: RoomId) -> bool {
        self.enemies(room)
            .iter()
            .any(|enemy| enemy.class() == EnemyClass::Boss && enemy.is_alive())
    }

    /// Reports whether the room holds any living enemy.
    #[must_use]
    pub fn has_living(&self, room: RoomId) -> bool {
        self.enemies(room).iter().any(Enemy::is_alive)
    }

    pub(crate) fn enemies_mut(&mut self, room: RoomId) -> &mut [Enemy] {
        self.rooms
            .get_mut(&room)
            .map(Vec::as_mut_slice)
            .unwrap_or_default()
    }

    pub(crate) fn add(&mut self, enemy: Enemy) {
        let room = enemy.room();
        match self.rooms.get_mut(&room) {
            Some(roster) => roster.push(enemy),
            None => {
                let _ = self.rooms.bind(room, vec![enemy]);
            }
        }
    }

    /// Removes dead enemies from a room, pruning the roster when it empties.
    pub(crate) fn reap(&mut self, room: RoomId) -> Vec<Enemy> {
        let Some(roster) = self.rooms.get_mut(&room) else {
            return Vec::new();
        };
        let (dead, living): (Vec<Enemy>, Vec<Enemy>) =
            roster.drain(..).partition(|enemy| !enemy.is_alive());
        *roster = living;
        if roster.is_empty() {
            let _ = self.rooms.unbind(&room);
        }
        dead
    }

    pub(crate) fn clear(&mut self, room: RoomId) -> Vec<Enemy> {
        self.rooms.unbind(&room).unwrap_or_default()
    }
}
