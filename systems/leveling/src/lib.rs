#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level-up system that draws perk offers from the catalog.

use mine_crawl_core::{Choice, ChoiceKind, Command, Event};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Number of choices shown by every level-up offer.
pub const OFFER_SIZE: usize = 3;

/// Pure system that answers level-up requests with perk offers.
#[derive(Debug)]
pub struct Leveling {
    rng: ChaCha8Rng,
}

impl Leveling {
    /// Creates a new leveling system drawing from the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Consumes world events and emits perk offers drawn from `pool`.
    pub fn handle(&mut self, events: &[Event], pool: &[Choice], out: &mut Vec<Command>) {
        for event in events {
            if let Event::PerkChoiceNeeded { level } = event {
                let choices = self.pick_options(OFFER_SIZE, pool);
                debug!(level, count = choices.len(), "perk offer drawn");
                out.push(Command::OfferPerks { choices });
            }
        }
    }

    /// Draws up to `count` distinct choices from `pool`.
    ///
    /// Each slot flips a fair coin between weapons and passives and falls back
    /// to the other pool once one runs dry.
    pub fn pick_options(&mut self, count: usize, pool: &[Choice]) -> Vec<Choice> {
        let (mut weapons, mut passives): (Vec<&Choice>, Vec<&Choice>) = pool
            .iter()
            .partition(|choice| choice.kind == ChoiceKind::Weapon);
        let mut picked: Vec<Choice> = Vec::with_capacity(count);

        while picked.len() < count && !(weapons.is_empty() && passives.is_empty()) {
            let wants_weapon = self.rng.gen_bool(0.5);
            let source = if (wants_weapon && !weapons.is_empty()) || passives.is_empty() {
                &mut weapons
            } else {
                &mut passives
            };
            let index = self.rng.gen_range(0..source.len());
            let chosen = source.remove(index);
            if picked.iter().all(|existing| existing.id != chosen.id) {
                picked.push(chosen.clone());
            }
        }
        picked
    }
}
