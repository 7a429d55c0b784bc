#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestrator that drives the Mine Crawl world and its systems.

mod config;

use std::collections::VecDeque;
use std::time::Duration;

use mine_crawl_core::{
    Command, Event, EventSink, FrameSnapshot, InputFrame, Notice, Outcome, Renderer, RoomId,
};
use mine_crawl_system_encounter::{Config as EncounterConfig, Encounter};
use mine_crawl_system_leveling::Leveling;
use mine_crawl_system_transition::{self as transition, Transition};
use mine_crawl_world::{self as world, query, World};
use sha2::{Digest, Sha256};
use tracing::info;

pub use config::{ConfigError, SessionConfig};

const WORLD_STREAM: &str = "world";
const ENCOUNTER_STREAM: &str = "encounter";
const LEVELING_STREAM: &str = "leveling";

/// Events produced by a single [`Session::tick`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Every event the world emitted during the tick, in order.
    pub events: Vec<Event>,
    /// Terminal outcome reached during the tick, if any.
    pub outcome: Option<Outcome>,
}

/// A running Mine Crawl session.
#[derive(Debug)]
pub struct Session {
    world: World,
    encounter: Encounter,
    transition: Transition,
    leveling: Leveling,
    paused: bool,
}

impl Session {
    /// Builds the dungeon described by `config` and announces the start room.
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        let world_seed = derive_stream_seed(config.seed, WORLD_STREAM);
        let world = World::new(&config.world_config(world_seed))?;
        let encounter = Encounter::new(EncounterConfig::new(
            config.encounter,
            derive_stream_seed(config.seed, ENCOUNTER_STREAM),
        ));
        let leveling = Leveling::new(derive_stream_seed(config.seed, LEVELING_STREAM));

        let mut session = Self {
            world,
            encounter,
            transition: Transition::new(),
            leveling,
            paused: false,
        };
        let _ = session.pump(Command::BeginSession);
        info!(
            seed = config.seed,
            rooms = query::graph(&session.world).len(),
            "{}",
            query::welcome_banner(&session.world)
        );
        Ok(session)
    }

    /// Advances the session by `dt` using the sampled input.
    ///
    /// Paused and concluded sessions ignore the call. A pending perk selection
    /// is applied before the world advances.
    pub fn tick(
        &mut self,
        dt: Duration,
        input: &InputFrame,
        sink: &mut dyn EventSink,
    ) -> TickReport {
        if self.paused || self.outcome().is_some() {
            return TickReport::default();
        }

        let mut report = TickReport::default();
        if let Some(index) = input.selection {
            if query::open_offer(&self.world).is_some() {
                self.dispatch(Command::SelectPerk { index }, sink, &mut report);
            }
        }
        self.dispatch(
            Command::Tick {
                dt,
                movement: input.movement,
            },
            sink,
            &mut report,
        );
        report
    }

    /// Pauses or resumes the session, notifying the sink on every change.
    pub fn set_paused(&mut self, paused: bool, sink: &mut dyn EventSink) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        sink.notify(if paused {
            Notice::Paused
        } else {
            Notice::Resumed
        });
    }

    /// Collapses `room` and its subtree, relocating the player when needed.
    pub fn collapse(&mut self, room: RoomId) -> Vec<Event> {
        self.pump(Command::CollapseRoom { room })
    }

    /// Terminal outcome reached by the session, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        query::outcome(&self.world)
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Captures the current frame.
    #[must_use]
    pub fn frame(&self) -> FrameSnapshot {
        query::frame(&self.world)
    }

    /// Hands the current frame to a renderer.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.render(&self.frame());
    }

    fn dispatch(&mut self, command: Command, sink: &mut dyn EventSink, report: &mut TickReport) {
        let events = self.pump(command);
        for event in &events {
            if let Event::SessionConcluded { outcome } = event {
                if report.outcome.is_none() {
                    report.outcome = Some(*outcome);
                    sink.notify(Notice::from(*outcome));
                }
            }
        }
        report.events.extend(events);
    }

    fn pump(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = VecDeque::from([command]);

        while let Some(command) = pending.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            if events.is_empty() {
                continue;
            }

            let mut commands = Vec::new();
            self.encounter.handle(&events, &mut commands);
            let rooms = transition::rooms_involved(&events);
            if !rooms.is_empty() {
                let layouts = query::room_layouts(&self.world, &rooms);
                self.transition.handle(&events, &layouts, &mut commands);
            }
            if events
                .iter()
                .any(|event| matches!(event, Event::PerkChoiceNeeded { .. }))
            {
                let pool = query::perk_choices(&self.world);
                self.leveling.handle(&events, &pool, &mut commands);
            }

            pending.extend(commands);
            log.extend(events);
        }
        log
    }
}

fn derive_stream_seed(seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(&SessionConfig {
            seed: 11,
            tree_height: 1,
            ..SessionConfig::default()
        })
        .expect("session")
    }

    #[test]
    fn conclusions_notify_the_sink_once() {
        let mut session = session();
        let mut notices = Vec::new();
        let mut report = TickReport::default();
        session.dispatch(
            Command::Conclude {
                outcome: Outcome::Win,
            },
            &mut notices,
            &mut report,
        );
        session.dispatch(
            Command::Conclude {
                outcome: Outcome::GameOver,
            },
            &mut notices,
            &mut report,
        );

        assert_eq!(notices, vec![Notice::Win]);
        assert_eq!(report.outcome, Some(Outcome::Win));
        assert_eq!(session.outcome(), Some(Outcome::Win));

        let after = session.tick(Duration::from_millis(16), &InputFrame::default(), &mut notices);
        assert_eq!(after, TickReport::default());
    }

    #[test]
    fn stream_seeds_differ_per_label() {
        assert_ne!(
            derive_stream_seed(1, WORLD_STREAM),
            derive_stream_seed(1, ENCOUNTER_STREAM)
        );
        assert_eq!(
            derive_stream_seed(9, LEVELING_STREAM),
            derive_stream_seed(9, LEVELING_STREAM)
        );
    }
}
