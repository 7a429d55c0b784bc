//! Weapons and passives that can be offered on level-up.

use std::f32::consts::TAU;

use mine_crawl_core::{Choice, ChoiceKind, EnemyId, Vec2};

use crate::{ordnance::Ordnance, player::DerivedStats};

/// Identifier of the weapon every player starts with.
pub const PICKAXE: &str = "pickaxe";

const MIN_COOLDOWN_SECONDS: f32 = 0.02;
const COOLDOWN_DECAY_PER_LEVEL: f32 = 0.95;
const DIRECTION_EPSILON: f32 = 1e-4;

/// Firing behaviour of a weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeaponPattern {
    /// Melee cone in the facing direction.
    Slash,
    /// Slow charge toward the nearest enemy that detonates.
    Charge,
    /// Orbs circling the player.
    Orbit,
    /// Projectile steering toward the nearest enemy.
    Homing,
}

/// Immutable description of a weapon.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponDef {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    base_cooldown: f32,
    pattern: WeaponPattern,
}

/// State of the player that weapons read when firing.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Shooter {
    pub(crate) position: Vec2,
    pub(crate) facing: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) damage_multiplier: f32,
    pub(crate) target: Option<EnemyId>,
    pub(crate) orbs: usize,
}

impl WeaponDef {
    /// Stable identifier of the weapon.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Display name of the weapon.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Cooldown in milliseconds applied after firing at the provided level.
    #[must_use]
    pub fn cooldown_ms(&self, level: u32, cooldown_multiplier: f32) -> u32 {
        let steps = level.max(1) - 1;
        let level_factor = COOLDOWN_DECAY_PER_LEVEL.powi(steps as i32);
        let seconds =
            (self.base_cooldown * cooldown_multiplier * level_factor).max(MIN_COOLDOWN_SECONDS);
        (seconds * 1000.0).round() as u32
    }

    /// Level-up choice that grants or upgrades the weapon.
    #[must_use]
    pub fn choice(&self) -> Choice {
        Choice {
            kind: ChoiceKind::Weapon,
            id: self.id.to_owned(),
            name: self.name.to_owned(),
            description: self.description.to_owned(),
        }
    }

    pub(crate) fn fire(&self, level: u32, shooter: &Shooter, out: &mut Vec<Ordnance>) {
        let level = level.max(1);
        let steps = level - 1;
        match self.pattern {
            WeaponPattern::Slash => {
                let range = 48.0 + steps as f32 * 6.0;
                let damage = ((8 + steps * 3) as f32 * shooter.damage_multiplier).round() as u32;
                out.push(Ordnance::slash(
                    shooter.position,
                    slash_direction(shooter),
                    range,
                    damage,
                ));
            }
            WeaponPattern::Charge => {
                let damage = (60.0 + level as f32 * 18.0 * shooter.damage_multiplier) as u32;
                let radius = 48.0 + level as f32 * 6.0;
                out.push(Ordnance::charge(
                    shooter.position,
                    shooter.target,
                    damage,
                    radius,
                ));
            }
            WeaponPattern::Orbit => {
                let desired = 1 + steps as usize / 2;
                let missing = desired.saturating_sub(shooter.orbs);
                let total = shooter.orbs + missing;
                let orbit_radius = 24.0 + (level as f32 * 3.0).min(40.0);
                let angular_speed = 3.0 + level as f32 * 0.25;
                let damage = 10 + level * 4;
                let life = 6.0 + level as f32 * 1.2;
                for slot in shooter.orbs..total {
                    let angle = slot as f32 * TAU / total.max(1) as f32;
                    out.push(Ordnance::orb(
                        shooter.position,
                        angle,
                        orbit_radius,
                        angular_speed,
                        damage,
                        life,
                    ));
                }
            }
            WeaponPattern::Homing => {
                out.push(Ordnance::homing(
                    shooter.position,
                    160.0 + level as f32 * 6.0,
                    18 + level * 6,
                ));
            }
        }
    }
}

fn slash_direction(shooter: &Shooter) -> Vec2 {
    [shooter.facing, shooter.velocity]
        .into_iter()
        .find(|direction| direction.length() >= DIRECTION_EPSILON)
        .map_or(Vec2::new(0.0, -1.0), Vec2::normalize)
}

/// Stat modifier granted per passive stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PassiveEffect {
    /// Adds maximum health per stack.
    MaxHp(u32),
    /// Multiplies crystal experience per stack.
    CrystalXp(f32),
    /// Multiplies weapon damage per stack.
    Damage(f32),
    /// Adds health regenerated per second per stack.
    Regeneration(f32),
}

/// Immutable description of a passive.
#[derive(Clone, Debug, PartialEq)]
pub struct PassiveDef {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    effect: PassiveEffect,
}

impl PassiveDef {
    /// Stable identifier of the passive.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Display name of the passive.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Applies `stacks` stacks of the passive to the derived stats.
    pub fn apply_to(&self, stats: &mut DerivedStats, stacks: u32) {
        match self.effect {
            PassiveEffect::MaxHp(per_stack) => {
                stats.bonus_max_hp = stats.bonus_max_hp.saturating_add(per_stack * stacks);
            }
            PassiveEffect::CrystalXp(factor) => {
                stats.crystal_xp_multiplier *= factor.powi(stacks as i32);
            }
            PassiveEffect::Damage(factor) => {
                stats.damage_multiplier *= factor.powi(stacks as i32);
            }
            PassiveEffect::Regeneration(per_stack) => {
                stats.hp_regen_per_sec += per_stack * stacks as f32;
            }
        }
    }

    /// Level-up choice that adds a stack of the passive.
    #[must_use]
    pub fn choice(&self) -> Choice {
        Choice {
            kind: ChoiceKind::Passive,
            id: self.id.to_owned(),
            name: self.name.to_owned(),
            description: self.description.to_owned(),
        }
    }
}

const fn weapon(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    base_cooldown: f32,
    pattern: WeaponPattern,
) -> WeaponDef {
    WeaponDef {
        id,
        name,
        description,
        base_cooldown,
        pattern,
    }
}

const fn passive(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    effect: PassiveEffect,
) -> PassiveDef {
    PassiveDef {
        id,
        name,
        description,
        effect,
    }
}

/// Registry of every weapon and passive resolvable by identifier.
#[derive(Clone, Debug)]
pub struct PerkCatalog {
    weapons: Vec<WeaponDef>,
    passives: Vec<PassiveDef>,
}

impl PerkCatalog {
    /// Creates the catalog shipped with the game.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            weapons: vec![
                weapon(
                    PICKAXE,
                    "Pickaxe",
                    "Swings at enemies in front of the player.",
                    0.16,
                    WeaponPattern::Slash,
                ),
                weapon(
                    "dynamite",
                    "Dynamite",
                    "Throws slow charges that explode in an area.",
                    1.6,
                    WeaponPattern::Charge,
                ),
                weapon(
                    "coal_orb",
                    "Coal Orb",
                    "Orbs circle the player and burn what they touch.",
                    0.9,
                    WeaponPattern::Orbit,
                ),
                weapon(
                    "lantern",
                    "Lantern",
                    "Fires a wisp that chases the nearest enemy.",
                    1.2,
                    WeaponPattern::Homing,
                ),
            ],
            passives: vec![
                passive(
                    "dwarven_endurance",
                    "Dwarven Endurance",
                    "+20 maximum health per stack.",
                    PassiveEffect::MaxHp(20),
                ),
                passive(
                    "miner_greed",
                    "Miner's Greed",
                    "+10% crystal experience per stack.",
                    PassiveEffect::CrystalXp(1.1),
                ),
                passive(
                    "forge_tempering",
                    "Forge Tempering",
                    "+10% weapon damage per stack.",
                    PassiveEffect::Damage(1.1),
                ),
                passive(
                    "hearth_regeneration",
                    "Hearth Regeneration",
                    "+1 health per second per stack.",
                    PassiveEffect::Regeneration(1.0),
                ),
            ],
        }
    }

    /// Looks up a weapon by identifier.
    #[must_use]
    pub fn weapon(&self, id: &str) -> Option<&WeaponDef> {
        self.weapons.iter().find(|weapon| weapon.id == id)
    }

    /// Looks up a passive by identifier.
    #[must_use]
    pub fn passive(&self, id: &str) -> Option<&PassiveDef> {
        self.passives.iter().find(|passive| passive.id == id)
    }

    /// Weapons in registration order.
    #[must_use]
    pub fn weapons(&self) -> &[WeaponDef] {
        &self.weapons
    }

    /// Passives in registration order.
    #[must_use]
    pub fn passives(&self) -> &[PassiveDef] {
        &self.passives
    }

    /// Every perk as a level-up choice, weapons first.
    #[must_use]
    pub fn choices(&self) -> Vec<Choice> {
        self.weapons
            .iter()
            .map(WeaponDef::choice)
            .chain(self.passives.iter().map(PassiveDef::choice))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_shrinks_with_level_and_respects_floor() {
        let catalog = PerkCatalog::standard();
        let pickaxe = catalog.weapon(PICKAXE).expect("pickaxe");
        assert_eq!(pickaxe.cooldown_ms(1, 1.0), 160);
        assert_eq!(pickaxe.cooldown_ms(2, 1.0), 152);
        assert_eq!(pickaxe.cooldown_ms(1, 0.05), 20);

        let dynamite = catalog.weapon("dynamite").expect("dynamite");
        assert_eq!(dynamite.cooldown_ms(3, 1.0), 1444);
    }

    #[test]
    fn passives_compound_per_stack() {
        let catalog = PerkCatalog::standard();
        let mut stats = DerivedStats::default();
        catalog
            .passive("forge_tempering")
            .expect("forge")
            .apply_to(&mut stats, 2);
        catalog
            .passive("dwarven_endurance")
            .expect("endurance")
            .apply_to(&mut stats, 3);
        catalog
            .passive("hearth_regeneration")
            .expect("regen")
            .apply_to(&mut stats, 2);

        assert!((stats.damage_multiplier - 1.21).abs() < 1e-5);
        assert_eq!(stats.bonus_max_hp, 60);
        assert_eq!(stats.hp_regen_per_sec, 2.0);
    }

    #[test]
    fn orbit_tops_up_missing_orbs() {
        let catalog = PerkCatalog::standard();
        let orb = catalog.weapon("coal_orb").expect("orb");
        let mut shooter = Shooter {
            position: Vec2::new(100.0, 100.0),
            facing: Vec2::new(0.0, -1.0),
            velocity: Vec2::ZERO,
            damage_multiplier: 1.0,
            target: None,
            orbs: 1,
        };
        let mut out = Vec::new();
        orb.fire(5, &shooter, &mut out);
        assert_eq!(out.len(), 2);

        out.clear();
        shooter.orbs = 3;
        orb.fire(5, &shooter, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn choices_list_weapons_before_passives() {
        let choices = PerkCatalog::standard().choices();
        assert_eq!(choices.len(), 8);
        assert_eq!(choices[0].kind, ChoiceKind::Weapon);
        assert_eq!(choices[7].kind, ChoiceKind::Passive);
        assert_eq!(choices[7].id, "hearth_regeneration");
    }
}
