//! Player state, progression and weapon loadout.

use mine_crawl_core::{Choice, ChoiceKind, EnemyId, PlayerSnapshot, Vec2};

use crate::{
    ordnance::Ordnance,
    perks::{PerkCatalog, Shooter, PICKAXE},
    registry::NodeRegistry,
};

/// Maximum health before passive bonuses.
pub const BASE_MAX_HP: u32 = 100;

const HURT_COOLDOWN: f32 = 0.8;
const MOVE_SPEED: f32 = 140.0;
const WALL_MARGIN: f32 = 8.0;
const VELOCITY_DAMPING: f32 = 6.0;
const FACING_EPSILON: f32 = 1e-4;
const XP_CURVE_BASE: f64 = 80.0;
const XP_CURVE_EXPONENT: f64 = 1.35;
const XP_CURVE_FLOOR: u32 = 20;

/// Multipliers and bonuses recomputed from passive stacks.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedStats {
    /// Multiplier applied to weapon damage.
    pub damage_multiplier: f32,
    /// Multiplier applied to weapon cooldowns.
    pub attack_cooldown_multiplier: f32,
    /// Multiplier applied to walking speed.
    pub move_speed_multiplier: f32,
    /// Multiplier applied to crystal experience.
    pub crystal_xp_multiplier: f32,
    /// Flat experience added to every crystal.
    pub flat_crystal_bonus: i32,
    /// Health regenerated per second.
    pub hp_regen_per_sec: f32,
    /// Maximum health added on top of the base.
    pub bonus_max_hp: u32,
}

impl Default for DerivedStats {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            attack_cooldown_multiplier: 1.0,
            move_speed_multiplier: 1.0,
            crystal_xp_multiplier: 1.0,
            flat_crystal_bonus: 0,
            hp_regen_per_sec: 0.0,
            bonus_max_hp: 0,
        }
    }
}

/// Miner controlled by the input source.
#[derive(Clone, Debug)]
pub struct Player {
    position: Vec2,
    velocity: Vec2,
    facing: Vec2,
    hp: u32,
    max_hp: u32,
    hurt_timer: f32,
    regen_carry: f32,
    level: u32,
    current_xp: u32,
    xp_to_next: u32,
    total_xp: u32,
    stats: DerivedStats,
    keys: Vec<String>,
    weapon_levels: NodeRegistry<String, u32>,
    weapon_cooldowns: NodeRegistry<String, u32>,
    passive_stacks: NodeRegistry<String, u32>,
    anim_tick: u32,
}

impl Player {
    /// Creates a level one player holding a ready pickaxe.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        let mut weapon_levels = NodeRegistry::new();
        let mut weapon_cooldowns = NodeRegistry::new();
        let _ = weapon_levels.bind(PICKAXE.to_owned(), 1);
        let _ = weapon_cooldowns.bind(PICKAXE.to_owned(), 0);

        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Vec2::new(0.0, -1.0),
            hp: BASE_MAX_HP,
            max_hp: BASE_MAX_HP,
            hurt_timer: 0.0,
            regen_carry: 0.0,
            level: 1,
            current_xp: 0,
            xp_to_next: Self::xp_for_level(1),
            total_xp: 0,
            stats: DerivedStats::default(),
            keys: Vec::new(),
            weapon_levels,
            weapon_cooldowns,
            passive_stacks: NodeRegistry::new(),
            anim_tick: 0,
        }
    }

    /// Experience required to advance past the provided level.
    #[must_use]
    pub fn xp_for_level(level: u32) -> u32 {
        let required = (XP_CURVE_BASE * f64::from(level).powf(XP_CURVE_EXPONENT)).round();
        (required as u32).max(XP_CURVE_FLOOR)
    }

    /// Room-local position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Remaining health.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Reports whether the player still stands.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience accumulated toward the next level.
    #[must_use]
    pub const fn current_xp(&self) -> u32 {
        self.current_xp
    }

    /// Experience required to reach the next level.
    #[must_use]
    pub const fn xp_to_next(&self) -> u32 {
        self.xp_to_next
    }

    /// Experience gained over the whole session.
    #[must_use]
    pub const fn total_xp(&self) -> u32 {
        self.total_xp
    }

    /// Level of a weapon, zero when not owned.
    #[must_use]
    pub fn weapon_level(&self, id: &str) -> u32 {
        self.weapon_levels.get(id).copied().unwrap_or(0)
    }

    /// Remaining cooldown of a weapon in milliseconds.
    #[must_use]
    pub fn weapon_cooldown(&self, id: &str) -> Option<u32> {
        self.weapon_cooldowns.get(id).copied()
    }

    /// Stacks of a passive, zero when not owned.
    #[must_use]
    pub fn passive_stacks(&self, id: &str) -> u32 {
        self.passive_stacks.get(id).copied().unwrap_or(0)
    }

    /// Reports whether the player owns a key.
    #[must_use]
    pub fn has_key(&self, id: &str) -> bool {
        self.keys.iter().any(|key| key == id)
    }

    /// Adds a key to the inventory, returning `false` if it was already owned.
    pub fn add_key(&mut self, id: &str) -> bool {
        if self.has_key(id) {
            return false;
        }
        self.keys.push(id.to_owned());
        true
    }

    /// Grants experience for a crystal, returning the amount gained.
    ///
    /// Every threshold crossed raises the level once.
    pub fn add_xp(&mut self, raw: u32) -> u32 {
        if raw == 0 {
            return 0;
        }
        let scaled = (raw as f32 * self.stats.crystal_xp_multiplier).round() as i64;
        let gained = (scaled + i64::from(self.stats.flat_crystal_bonus)).max(0) as u32;
        self.current_xp = self.current_xp.saturating_add(gained);
        self.total_xp = self.total_xp.saturating_add(gained);
        while self.current_xp >= self.xp_to_next {
            self.current_xp -= self.xp_to_next;
            self.level += 1;
            self.xp_to_next = Self::xp_for_level(self.level);
        }
        gained
    }

    /// Deals contact damage unless the hurt cooldown is running.
    ///
    /// Returns `true` when the damage landed.
    pub fn receive_damage(&mut self, amount: u32) -> bool {
        if !self.is_alive() || self.hurt_timer > 0.0 {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        self.hurt_timer = HURT_COOLDOWN;
        true
    }

    /// Adds a knockback impulse.
    pub fn apply_knockback(&mut self, impulse: Vec2) {
        self.velocity += impulse;
    }

    /// Walks according to the movement intent and updates facing.
    pub fn steer(&mut self, intent: Vec2, dt: f32, width: f32, height: f32) {
        let intent = intent.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        let speed = MOVE_SPEED * self.stats.move_speed_multiplier;
        self.position += intent * speed * dt;
        self.clamp_into(width, height);
        if intent.length() > FACING_EPSILON {
            self.facing = intent.normalize();
        }
    }

    /// Advances timers, regeneration and knockback drift.
    pub fn advance(&mut self, dt: f32, width: f32, height: f32) {
        if !self.is_alive() {
            return;
        }
        self.hurt_timer = (self.hurt_timer - dt).max(0.0);

        if self.hp < self.max_hp && self.stats.hp_regen_per_sec > 0.0 {
            self.regen_carry += self.stats.hp_regen_per_sec * dt;
            let whole = self.regen_carry.floor();
            self.regen_carry -= whole;
            self.hp = self.hp.saturating_add(whole as u32).min(self.max_hp);
        } else {
            self.regen_carry = 0.0;
        }

        self.position += self.velocity * dt;
        self.velocity *= (1.0 - VELOCITY_DAMPING * dt).max(0.0);
        self.clamp_into(width, height);

        self.weapon_cooldowns.decay((dt * 1000.0).round() as u32);
        self.anim_tick = self.anim_tick.wrapping_add(1);
    }

    /// Applies a level-up choice.
    pub fn apply_choice(&mut self, choice: &Choice, catalog: &PerkCatalog) {
        match choice.kind {
            ChoiceKind::Weapon => {
                let next = self.weapon_level(&choice.id) + 1;
                let _ = self.weapon_levels.bind(choice.id.clone(), next);
                if !self.weapon_cooldowns.contains(choice.id.as_str()) {
                    let _ = self.weapon_cooldowns.bind(choice.id.clone(), 0);
                }
            }
            ChoiceKind::Passive => {
                let _ = self.passive_stacks.increment(choice.id.clone(), 1);
                self.recompute(catalog);
            }
        }
    }

    /// Recomputes derived stats from passive stacks.
    ///
    /// Current health grows by any increase of maximum health.
    pub fn recompute(&mut self, catalog: &PerkCatalog) {
        let mut stats = DerivedStats::default();
        for (id, stacks) in self.passive_stacks.entries() {
            if let Some(passive) = catalog.passive(id) {
                passive.apply_to(&mut stats, *stacks);
            }
        }
        let previous_max = self.max_hp;
        self.max_hp = BASE_MAX_HP.saturating_add(stats.bonus_max_hp);
        if self.max_hp > previous_max {
            self.hp = self.hp.saturating_add(self.max_hp - previous_max);
        }
        self.hp = self.hp.min(self.max_hp);
        self.stats = stats;
    }

    pub(crate) fn fire_weapons(
        &mut self,
        catalog: &PerkCatalog,
        target: Option<EnemyId>,
        orbs: usize,
        out: &mut Vec<Ordnance>,
    ) {
        let shooter = Shooter {
            position: self.position,
            facing: self.facing,
            velocity: self.velocity,
            damage_multiplier: self.stats.damage_multiplier,
            target,
            orbs,
        };
        let loadout: Vec<(String, u32)> = self
            .weapon_levels
            .entries()
            .map(|(id, level)| (id.clone(), *level))
            .collect();

        for (id, level) in loadout {
            let Some(weapon) = catalog.weapon(&id) else {
                continue;
            };
            if self.weapon_cooldown(&id).unwrap_or(0) > 0 {
                continue;
            }
            weapon.fire(level, &shooter, out);
            let cooldown = weapon.cooldown_ms(level, self.stats.attack_cooldown_multiplier);
            let _ = self.weapon_cooldowns.bind(id, cooldown);
        }
    }

    pub(crate) fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
    }

    pub(crate) fn nudge(&mut self, offset: Vec2) {
        self.position += offset;
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            facing: self.facing,
            hp: self.hp,
            max_hp: self.max_hp,
            level: self.level,
            current_xp: self.current_xp,
            xp_to_next: self.xp_to_next,
            keys: self.keys.clone(),
            anim_tick: self.anim_tick,
        }
    }

    fn clamp_into(&mut self, width: f32, height: f32) {
        self.position.x = self.position.x.max(WALL_MARGIN).min(width - WALL_MARGIN);
        self.position.y = self.position.y.max(WALL_MARGIN).min(height - WALL_MARGIN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(kind: ChoiceKind, id: &str) -> Choice {
        Choice {
            kind,
            id: id.to_owned(),
            name: id.to_owned(),
            description: String::new(),
        }
    }

    #[test]
    fn experience_curve_matches_thresholds() {
        assert_eq!(Player::xp_for_level(1), 80);
        assert_eq!(Player::xp_for_level(2), (80.0 * 2_f64.powf(1.35)).round() as u32);
    }

    #[test]
    fn crossing_a_threshold_levels_up_once() {
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        assert_eq!(player.add_xp(100), 100);
        assert_eq!(player.level(), 2);
        assert_eq!(player.current_xp(), 20);
        assert_eq!(player.xp_to_next(), Player::xp_for_level(2));
        assert_eq!(player.total_xp(), 100);
    }

    #[test]
    fn large_gains_cross_several_thresholds() {
        let mut player = Player::new(Vec2::ZERO);
        let _ = player.add_xp(80 + Player::xp_for_level(2) + 1);
        assert_eq!(player.level(), 3);
        assert_eq!(player.current_xp(), 1);
    }

    #[test]
    fn hurt_cooldown_blocks_repeated_contact() {
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        assert!(player.receive_damage(10));
        assert!(!player.receive_damage(10));
        assert_eq!(player.hp(), 90);
        player.advance(0.8, 800.0, 600.0);
        assert!(player.receive_damage(10));
        assert_eq!(player.hp(), 80);
    }

    #[test]
    fn endurance_grows_current_health_once_per_stack() {
        let catalog = PerkCatalog::standard();
        let mut player = Player::new(Vec2::ZERO);
        assert!(player.receive_damage(30));
        player.apply_choice(&choice(ChoiceKind::Passive, "dwarven_endurance"), &catalog);
        assert_eq!(player.max_hp(), 120);
        assert_eq!(player.hp(), 90);

        player.recompute(&catalog);
        assert_eq!(player.hp(), 90);
    }

    #[test]
    fn regeneration_accumulates_fractions() {
        let catalog = PerkCatalog::standard();
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        player.apply_choice(&choice(ChoiceKind::Passive, "hearth_regeneration"), &catalog);
        assert!(player.receive_damage(10));
        for _ in 0..6 {
            player.advance(0.25, 800.0, 600.0);
        }
        assert_eq!(player.hp(), 91);
    }

    #[test]
    fn new_weapons_start_ready() {
        let catalog = PerkCatalog::standard();
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        player.apply_choice(&choice(ChoiceKind::Weapon, "lantern"), &catalog);
        assert_eq!(player.weapon_level("lantern"), 1);
        assert_eq!(player.weapon_cooldown("lantern"), Some(0));

        let mut out = Vec::new();
        player.fire_weapons(&catalog, None, 0, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(player.weapon_cooldown(PICKAXE), Some(160));
        assert_eq!(player.weapon_cooldown("lantern"), Some(1200));

        out.clear();
        player.fire_weapons(&catalog, None, 0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn steering_clamps_to_room_and_updates_facing() {
        let mut player = Player::new(Vec2::new(10.0, 300.0));
        player.steer(Vec2::new(-1.0, 0.0), 1.0, 800.0, 600.0);
        assert_eq!(player.position(), Vec2::new(8.0, 300.0));
        assert_eq!(player.facing, Vec2::new(-1.0, 0.0));
    }
}
