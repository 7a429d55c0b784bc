#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Encounter scaling system that populates rooms with the root boss and enemy waves.

use mine_crawl_core::{Command, EncounterSite, EnemySpawn, Event, Rect, Side, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

const TWO_PI: f32 = std::f32::consts::PI * 2.0;
const MIN_RING_RADIUS: f32 = 48.0;
const RING_JITTER_MIN: f32 = 0.8;
const RING_JITTER_SPAN: f32 = 0.4;
const PAD_FACTOR: f32 = 0.4;
const MIN_PAD: f32 = 40.0;
const MAX_PAD: f32 = 120.0;
const WAVE_DISTANCE_FACTOR: f32 = 0.9;

/// Tunable parameters of the spawn curve.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Enemies every fresh wave receives regardless of depth.
    pub base_spawn: u32,
    /// Extra enemies granted at the root, shrinking linearly with depth.
    pub max_extra: u32,
    /// Fractional growth of a wave per previous clear of the room.
    pub scale_per_clear: f32,
    /// Lower bound of the wave size cap.
    pub min_wave_cap: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_spawn: 15,
            max_extra: 18,
            scale_per_clear: 0.5,
            min_wave_cap: 30,
        }
    }
}

impl Tuning {
    /// Size of a fresh wave for a room at `depth` in a tree of `tree_height`.
    ///
    /// Shallow rooms receive more enemies than deep ones.
    #[must_use]
    pub fn spawn_amount(&self, depth: u32, tree_height: u32) -> u32 {
        let ratio = depth as f32 / tree_height.max(1) as f32;
        let extra = (self.max_extra as f32 * (1.0 - ratio)).round().max(0.0);
        self.base_spawn.saturating_add(extra as u32)
    }

    /// Grows `amount` by the number of times the room was already cleared.
    #[must_use]
    pub fn scaled_amount(&self, amount: u32, clear_count: u32) -> u32 {
        let cap = self.min_wave_cap.max(amount.saturating_mul(3));
        let growth = (amount as f32 * self.scale_per_clear * clear_count as f32)
            .round()
            .max(0.0);
        amount.saturating_add(growth as u32).min(cap)
    }
}

/// Places `amount` enemies on a ring around the room centre.
///
/// Samples that land inside the room are pushed out past the nearest edge so
/// that every enemy walks in from outside.
pub fn place_batch<R: Rng + ?Sized>(
    site: &EncounterSite,
    amount: u32,
    spawn_distance: f32,
    rng: &mut R,
) -> Vec<EnemySpawn> {
    let (width, height) = (site.width, site.height);
    let center = site.center();
    let distance = spawn_distance.min(width.max(height)).max(MIN_RING_RADIUS);
    let pad = (distance * PAD_FACTOR).clamp(MIN_PAD, MAX_PAD);
    let bounds = Rect::new(0.0, 0.0, width, height);
    let max_level = site.subtree_height.saturating_add(1).max(1);

    (0..amount)
        .map(|_| {
            let angle = rng.gen::<f32>() * TWO_PI;
            let radius = distance * (RING_JITTER_MIN + rng.gen::<f32>() * RING_JITTER_SPAN);
            let mut position = center + Vec2::new(angle.cos(), angle.sin()) * radius;

            if bounds.contains(position) {
                match Side::nearest(position, width, height) {
                    Side::Left => position.x = -pad,
                    Side::Right => position.x = width + pad,
                    Side::Top => position.y = -pad,
                    Side::Bottom => position.y = height + pad,
                }
            }

            EnemySpawn {
                position,
                level: rng.gen_range(1..=max_level),
            }
        })
        .collect()
}

/// Configuration parameters required to construct the encounter system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    tuning: Tuning,
    seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn curve and seed.
    #[must_use]
    pub const fn new(tuning: Tuning, seed: u64) -> Self {
        Self { tuning, seed }
    }
}

/// Pure system that answers room entries and vacancies with spawn commands.
#[derive(Debug)]
pub struct Encounter {
    tuning: Tuning,
    seed: u64,
    batches: u64,
}

impl Encounter {
    /// Creates a new encounter system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tuning: config.tuning,
            seed: config.seed,
            batches: 0,
        }
    }

    /// Consumes world events and emits boss and wave spawn commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RoomEntered {
                    site,
                    boss_present,
                    roster_empty,
                } => {
                    if site.is_root {
                        if !boss_present {
                            out.push(Command::SpawnBoss {
                                room: site.room,
                                position: site.center(),
                            });
                        }
                    } else if *roster_empty {
                        self.spawn_wave(site, out);
                    }
                }
                Event::RoomVacated { site, boss_present } => {
                    if site.is_root && *boss_present {
                        continue;
                    }
                    self.spawn_wave(site, out);
                }
                _ => {}
            }
        }
    }

    fn spawn_wave(&mut self, site: &EncounterSite, out: &mut Vec<Command>) {
        let base = self.tuning.spawn_amount(site.depth, site.tree_height);
        let amount = self.tuning.scaled_amount(base, site.clear_count);
        let mut rng = ChaCha8Rng::seed_from_u64(derive_batch_seed(self.seed, site, self.batches));
        self.batches = self.batches.wrapping_add(1);

        let spawn_distance = site.width.max(site.height) * WAVE_DISTANCE_FACTOR;
        let enemies = place_batch(site, amount, spawn_distance, &mut rng);
        debug!(
            room = site.room.get(),
            depth = site.depth,
            clear_count = site.clear_count,
            amount,
            "wave scheduled"
        );
        out.push(Command::SpawnWave {
            room: site.room,
            enemies,
        });
    }
}

fn derive_batch_seed(seed: u64, site: &EncounterSite, batch: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(site.room.get().to_le_bytes());
    hasher.update(site.clear_count.to_le_bytes());
    hasher.update(batch.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
