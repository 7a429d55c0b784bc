//! Projectiles and effects spawned by weapons.

use mine_crawl_core::{EnemyId, OrdnanceKind, OrdnanceSnapshot, Vec2};

use crate::enemy::Enemy;

const SLASH_LIFE: f32 = 0.12;
const SLASH_CONE_DEGREES: f32 = 70.0;
const SLASH_KNOCKBACK: f32 = 60.0;
const CHARGE_SPEED: f32 = 120.0;
const CHARGE_LIFE: f32 = 4.0;
const CHARGE_TRIGGER: f32 = 14.0;
const CONTACT_BLAST_LIFE: f32 = 0.6;
const FUSE_BLAST_LIFE: f32 = 0.8;
const BLAST_CORE: f32 = 0.6;
const BLAST_SURGE: f32 = 0.1;
const BLAST_KNOCKBACK: f32 = 80.0;
const ORB_REACH: f32 = 12.0;
const ORB_INTERVAL: f32 = 0.12;
const ORB_KNOCKBACK: f32 = 30.0;
const HOMING_LIFE: f32 = 4.0;
const HOMING_TURN_RATE: f32 = 8.0;
const HOMING_REACH: f32 = 2.0;
const HOMING_KNOCKBACK: f32 = 40.0;

#[derive(Clone, Debug, PartialEq)]
enum Payload {
    Slash {
        direction: Vec2,
        range: f32,
        struck: bool,
    },
    Charge {
        target: Option<EnemyId>,
        velocity: Option<Vec2>,
        blast_radius: f32,
    },
    Blast {
        max_radius: f32,
    },
    Orb {
        angle: f32,
        orbit_radius: f32,
        angular_speed: f32,
        cooldown: f32,
    },
    Homing {
        target: Option<EnemyId>,
        velocity: Vec2,
        speed: f32,
    },
}

/// Surroundings an ordnance piece interacts with during a tick.
pub(crate) struct Field<'a> {
    pub(crate) enemies: &'a mut [Enemy],
    pub(crate) player: Vec2,
    pub(crate) spawned: Vec<Ordnance>,
}

/// Projectile or effect living in the current room.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Ordnance {
    payload: Payload,
    position: Vec2,
    damage: u32,
    age: f32,
    life: f32,
}

impl Ordnance {
    fn new(payload: Payload, position: Vec2, damage: u32, life: f32) -> Self {
        Self {
            payload,
            position,
            damage,
            age: 0.0,
            life,
        }
    }

    pub(crate) fn slash(origin: Vec2, direction: Vec2, range: f32, damage: u32) -> Self {
        Self::new(
            Payload::Slash {
                direction,
                range,
                struck: false,
            },
            origin,
            damage,
            SLASH_LIFE,
        )
    }

    pub(crate) fn charge(
        origin: Vec2,
        target: Option<EnemyId>,
        damage: u32,
        blast_radius: f32,
    ) -> Self {
        Self::new(
            Payload::Charge {
                target,
                velocity: None,
                blast_radius,
            },
            origin,
            damage,
            CHARGE_LIFE,
        )
    }

    pub(crate) fn orb(
        owner: Vec2,
        angle: f32,
        orbit_radius: f32,
        angular_speed: f32,
        damage: u32,
        life: f32,
    ) -> Self {
        Self::new(
            Payload::Orb {
                angle,
                orbit_radius,
                angular_speed,
                cooldown: 0.0,
            },
            owner + Vec2::from_angle(angle) * orbit_radius,
            damage,
            life,
        )
    }

    pub(crate) fn homing(origin: Vec2, speed: f32, damage: u32) -> Self {
        Self::new(
            Payload::Homing {
                target: None,
                velocity: Vec2::ZERO,
                speed,
            },
            origin,
            damage,
            HOMING_LIFE,
        )
    }

    /// Creates an explosion, immediately hitting enemies near its core.
    fn detonate(
        position: Vec2,
        max_radius: f32,
        damage: u32,
        life: f32,
        enemies: &mut [Enemy],
    ) -> Self {
        strike(enemies, position, max_radius * BLAST_CORE, damage, BLAST_KNOCKBACK);
        Self::new(Payload::Blast { max_radius }, position, damage, life)
    }

    pub(crate) fn is_orb(&self) -> bool {
        matches!(self.payload, Payload::Orb { .. })
    }

    /// Advances the ordnance, returning `false` once it expired.
    pub(crate) fn advance(&mut self, dt: f32, field: &mut Field<'_>) -> bool {
        match &mut self.payload {
            Payload::Slash {
                direction,
                range,
                struck,
            } => {
                if !*struck {
                    slash(field.enemies, self.position, *direction, *range, self.damage);
                    *struck = true;
                }
                self.age += dt;
                self.age < self.life
            }
            Payload::Charge {
                target,
                velocity,
                blast_radius,
            } => {
                let velocity = *velocity.get_or_insert_with(|| {
                    let aim = target
                        .and_then(|id| living(field.enemies, id))
                        .map_or(field.player, Enemy::position);
                    let toward = aim - self.position;
                    if toward.length() > 0.001 {
                        toward.normalize() * CHARGE_SPEED
                    } else {
                        Vec2::ZERO
                    }
                });
                self.position += velocity * dt;

                let touching = field.enemies.iter().any(|enemy| {
                    enemy.is_alive()
                        && enemy.position().distance_squared(self.position)
                            <= CHARGE_TRIGGER * CHARGE_TRIGGER
                });
                if touching {
                    field.spawned.push(Self::detonate(
                        self.position,
                        *blast_radius,
                        self.damage,
                        CONTACT_BLAST_LIFE,
                        field.enemies,
                    ));
                    return false;
                }

                self.age += dt;
                if self.age >= self.life {
                    field.spawned.push(Self::detonate(
                        self.position,
                        *blast_radius,
                        self.damage,
                        FUSE_BLAST_LIFE,
                        field.enemies,
                    ));
                    return false;
                }
                true
            }
            Payload::Blast { max_radius } => {
                self.age += dt;
                if self.age >= self.life {
                    return false;
                }
                if self.age < BLAST_SURGE {
                    let radius = *max_radius * self.age / self.life;
                    strike(
                        field.enemies,
                        self.position,
                        radius,
                        self.damage / 2,
                        BLAST_KNOCKBACK,
                    );
                }
                true
            }
            Payload::Orb {
                angle,
                orbit_radius,
                angular_speed,
                cooldown,
            } => {
                *angle += *angular_speed * dt;
                self.position = field.player + Vec2::from_angle(*angle) * *orbit_radius;
                *cooldown -= dt;
                if *cooldown <= 0.0 {
                    strike(
                        field.enemies,
                        self.position,
                        ORB_REACH,
                        self.damage,
                        ORB_KNOCKBACK,
                    );
                    *cooldown = ORB_INTERVAL;
                }
                self.age += dt;
                self.age < self.life
            }
            Payload::Homing {
                target,
                velocity,
                speed,
            } => {
                if target.and_then(|id| living(field.enemies, id)).is_none() {
                    *target = nearest(field.enemies, self.position).map(Enemy::id);
                }

                match *target {
                    Some(id) => {
                        let Some(enemy) = field
                            .enemies
                            .iter_mut()
                            .find(|enemy| enemy.id() == id)
                        else {
                            return false;
                        };
                        let offset = enemy.position() - self.position;
                        let distance = offset.length();
                        if distance < HOMING_REACH {
                            let _ = enemy.damage(self.damage);
                            enemy.apply_knockback(push_direction(offset) * HOMING_KNOCKBACK);
                            return false;
                        }
                        let direction = offset / (distance + 1e-6);
                        let blend = (HOMING_TURN_RATE * dt).min(1.0);
                        *velocity += (direction * *speed - *velocity) * blend;
                        if velocity.length() > 0.001 {
                            *velocity = velocity.normalize() * *speed;
                        }
                    }
                    None if *velocity == Vec2::ZERO => return false,
                    None => {}
                }

                self.age += dt;
                if self.age >= self.life {
                    return false;
                }
                self.position += *velocity * dt;
                true
            }
        }
    }

    /// Ages the ordnance without touching enemies.
    pub(crate) fn fade(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.age < self.life
    }

    pub(crate) fn snapshot(&self) -> OrdnanceSnapshot {
        let progress = if self.life > 0.0 {
            (self.age / self.life).min(1.0)
        } else {
            1.0
        };
        let (kind, radius) = match self.payload {
            Payload::Slash { range, .. } => (OrdnanceKind::Slash, range),
            Payload::Charge { .. } => (OrdnanceKind::Charge, 5.0),
            Payload::Blast { max_radius } => {
                (OrdnanceKind::Blast, max_radius * (0.3 + 0.7 * progress))
            }
            Payload::Orb { .. } => (OrdnanceKind::Orb, 5.0),
            Payload::Homing { .. } => (OrdnanceKind::Homing, 4.0),
        };
        OrdnanceSnapshot {
            kind,
            position: self.position,
            radius,
            progress,
        }
    }
}

/// Living enemy closest to `from`.
pub(crate) fn nearest(enemies: &[Enemy], from: Vec2) -> Option<&Enemy> {
    enemies
        .iter()
        .filter(|enemy| enemy.is_alive())
        .min_by(|a, b| {
            a.position()
                .distance_squared(from)
                .total_cmp(&b.position().distance_squared(from))
        })
}

fn living(enemies: &[Enemy], id: EnemyId) -> Option<&Enemy> {
    enemies
        .iter()
        .find(|enemy| enemy.id() == id && enemy.is_alive())
}

fn push_direction(offset: Vec2) -> Vec2 {
    let distance = offset.length();
    if distance > 0.001 {
        offset / distance
    } else {
        Vec2::new(0.0, -1.0)
    }
}

fn strike(enemies: &mut [Enemy], center: Vec2, radius: f32, damage: u32, knockback: f32) {
    for enemy in enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
        let offset = enemy.position() - center;
        if offset.length_squared() > radius * radius {
            continue;
        }
        let _ = enemy.damage(damage);
        enemy.apply_knockback(push_direction(offset) * knockback);
    }
}

fn slash(enemies: &mut [Enemy], origin: Vec2, direction: Vec2, range: f32, damage: u32) {
    let cone_cos = (SLASH_CONE_DEGREES.to_radians() * 0.5).cos();
    for enemy in enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
        let offset = enemy.position() - origin;
        let distance_squared = offset.length_squared();
        if distance_squared > range * range {
            continue;
        }
        let normal = offset / (distance_squared.sqrt() + 1e-6);
        if normal.dot(direction) >= cone_cos {
            let _ = enemy.damage(damage);
            enemy.apply_knockback(normal * SLASH_KNOCKBACK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mine_crawl_core::RoomId;

    fn enemy_at(id: u32, x: f32, y: f32) -> Enemy {
        Enemy::grunt(EnemyId::new(id), RoomId::new(0), Vec2::new(x, y), 1)
    }

    fn field(enemies: &mut [Enemy]) -> Field<'_> {
        Field {
            enemies,
            player: Vec2::new(100.0, 100.0),
            spawned: Vec::new(),
        }
    }

    #[test]
    fn slash_hits_only_inside_the_cone() {
        let mut enemies = vec![enemy_at(1, 100.0, 70.0), enemy_at(2, 100.0, 130.0)];
        let mut slash = Ordnance::slash(Vec2::new(100.0, 100.0), Vec2::new(0.0, -1.0), 48.0, 8);
        let mut field = field(&mut enemies);

        assert!(slash.advance(0.05, &mut field));
        assert!(!slash.advance(0.1, &mut field));
        assert_eq!(enemies[0].snapshot().hp, enemies[0].snapshot().max_hp - 8);
        assert_eq!(enemies[1].snapshot().hp, enemies[1].snapshot().max_hp);
    }

    #[test]
    fn charge_detonates_on_contact() {
        let mut enemies = vec![enemy_at(1, 110.0, 100.0)];
        let mut charge = Ordnance::charge(Vec2::new(100.0, 100.0), Some(EnemyId::new(1)), 10, 54.0);
        let mut field = field(&mut enemies);

        assert!(!charge.advance(0.016, &mut field));
        assert_eq!(field.spawned.len(), 1);
        assert_eq!(field.spawned[0].snapshot().kind, OrdnanceKind::Blast);
        assert_eq!(enemies[0].snapshot().hp, enemies[0].snapshot().max_hp - 10);
    }

    #[test]
    fn homing_expires_without_targets() {
        let mut enemies: Vec<Enemy> = Vec::new();
        let mut wisp = Ordnance::homing(Vec2::new(100.0, 100.0), 166.0, 24);
        let mut field = field(&mut enemies);
        assert!(!wisp.advance(0.016, &mut field));
    }

    #[test]
    fn orb_follows_the_player() {
        let mut enemies: Vec<Enemy> = Vec::new();
        let mut orb = Ordnance::orb(Vec2::new(100.0, 100.0), 0.0, 30.0, 0.0, 14, 7.2);
        let mut field = field(&mut enemies);
        field.player = Vec2::new(200.0, 200.0);
        assert!(orb.advance(0.016, &mut field));
        let position = orb.snapshot().position;
        assert!((position - Vec2::new(230.0, 200.0)).length() < 1e-3);
        assert!(orb.is_orb());
    }

    #[test]
    fn fading_never_outlives_the_effect() {
        let mut slash = Ordnance::slash(Vec2::ZERO, Vec2::X, 48.0, 8);
        assert!(slash.fade(0.1));
        assert!(!slash.fade(0.1));
    }
}
