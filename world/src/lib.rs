#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Mine Crawl.

mod doors;
mod enemy;
mod error;
mod graph;
mod ordnance;
mod perks;
mod player;
mod registry;
mod tick;

use std::collections::VecDeque;

use mine_crawl_core::{
    Choice, Command, EncounterSite, EnemyId, Event, Outcome, RoomId, Vec2, WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

pub use enemy::{Enemy, Rosters};
pub use error::{BuildError, MAX_TREE_HEIGHT, MIN_ROOM_EXTENT};
pub use graph::{Crystal, KeyPickup, Room, WorldGraph};
pub use perks::{PassiveDef, PassiveEffect, PerkCatalog, WeaponDef, WeaponPattern, PICKAXE};
pub use player::{DerivedStats, Player, BASE_MAX_HP};
pub use registry::NodeRegistry;

use ordnance::Ordnance;

/// Identifier of the key dropped by the root guardian.
pub const GOLDEN_KEY: &str = "golden-key";

const START_INSET: f32 = 60.0;
const SPAWN_MARGIN: f32 = 8.0;

/// Parameters used to build a fresh world.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Height of the complete binary room tree.
    pub tree_height: i32,
    /// Width shared by every room.
    pub room_width: f32,
    /// Height shared by every room.
    pub room_height: f32,
    /// Seed for the world's random number generator.
    pub seed: u64,
    /// Keys the player holds from the start; the golden key opens the exit.
    pub starting_keys: Vec<String>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tree_height: 3,
            room_width: 950.0,
            room_height: 650.0,
            seed: 0,
            starting_keys: Vec::new(),
        }
    }
}

/// Level-up offer waiting for the player's selection.
#[derive(Clone, Debug)]
struct Offer {
    level: u32,
    choices: Vec<Choice>,
}

/// Represents the authoritative Mine Crawl world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    graph: WorldGraph,
    current: Option<RoomId>,
    player: Player,
    rosters: Rosters,
    ordnance: Vec<Ordnance>,
    catalog: PerkCatalog,
    pending_levels: VecDeque<u32>,
    offer: Option<Offer>,
    rng: ChaCha8Rng,
    next_enemy: u32,
    tick_index: u64,
    outcome: Option<Outcome>,
}

impl World {
    /// Builds the dungeon and places the player in a random leaf room.
    pub fn new(config: &WorldConfig) -> Result<Self, BuildError> {
        let graph = WorldGraph::build(config.tree_height, config.room_width, config.room_height)?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let current = graph.pick_random_leaf(&mut rng);
        let start = Vec2::new(config.room_width / 2.0, config.room_height - START_INSET);

        info!(
            rooms = graph.len(),
            start = ?current.map(|room| room.get()),
            "dungeon built"
        );

        let mut world = Self {
            banner: WELCOME_BANNER,
            graph,
            current,
            player: Player::new(start),
            rosters: Rosters::default(),
            ordnance: Vec::new(),
            catalog: PerkCatalog::standard(),
            pending_levels: VecDeque::new(),
            offer: None,
            rng,
            next_enemy: 1,
            tick_index: 0,
            outcome: None,
        };
        let mut unlocked = Vec::new();
        for key in &config.starting_keys {
            let _ = world.player.add_key(key);
            if key == GOLDEN_KEY {
                world.unlock_exit(&mut unlocked);
            }
        }
        Ok(world)
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy);
        self.next_enemy = self.next_enemy.wrapping_add(1);
        id
    }

    fn encounter_site(&self, room: RoomId) -> Option<EncounterSite> {
        let hosted = self.graph.room(room)?;
        Some(EncounterSite {
            room,
            depth: self.graph.node_depth(room)?,
            tree_height: self.graph.tree_height(),
            subtree_height: self.graph.subtree_height(room)?,
            clear_count: hosted.clear_count(),
            width: hosted.width(),
            height: hosted.height(),
            is_root: self.graph.is_root(room),
        })
    }

    fn announce_entry(&self, room: RoomId, out_events: &mut Vec<Event>) {
        if let Some(site) = self.encounter_site(room) {
            out_events.push(Event::RoomEntered {
                site,
                boss_present: self.rosters.has_living_boss(room),
                roster_empty: self.rosters.is_empty(room),
            });
        }
    }

    fn queue_level_ups(&mut self, before: u32, after: u32, out_events: &mut Vec<Event>) {
        for level in before.saturating_add(1)..=after {
            info!(level, "player leveled up");
            out_events.push(Event::PlayerLeveledUp { level });
            self.pending_levels.push_back(level);
        }
        if self.offer.is_none() {
            self.open_next_offer(out_events);
        }
    }

    fn open_next_offer(&mut self, out_events: &mut Vec<Event>) {
        if let Some(level) = self.pending_levels.pop_front() {
            self.offer = Some(Offer {
                level,
                choices: Vec::new(),
            });
            out_events.push(Event::PerkChoiceNeeded { level });
        }
    }

    fn conclude(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        info!(?outcome, ticks = self.tick_index, "session concluded");
        out_events.push(Event::SessionConcluded { outcome });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_some() {
        return;
    }

    match command {
        Command::BeginSession => {
            if let Some(room) = world.current {
                info!(room = room.get(), "session started");
                world.announce_entry(room, out_events);
            }
        }
        Command::Tick { dt, movement } => world.tick(dt, movement, out_events),
        Command::EnterRoom { room, spawn } => {
            if world.graph.built_room(room).is_some_and(Room::is_collapsed) {
                warn!(room = room.get(), "ignoring entry into a collapsed room");
                return;
            }
            let Some(destination) = world.graph.room(room) else {
                return;
            };
            let spawn = destination.clamp_point(spawn, SPAWN_MARGIN);
            world.current = Some(room);
            world.player.teleport(spawn);
            world.ordnance.clear();
            info!(room = room.get(), x = spawn.x, y = spawn.y, "room entered");
            world.announce_entry(room, out_events);
        }
        Command::SpawnBoss { room, position } => {
            if world.graph.room(room).is_none() || world.rosters.has_living_boss(room) {
                return;
            }
            let enemy = world.allocate_enemy_id();
            world.rosters.add(Enemy::boss(enemy, room, position));
            info!(room = room.get(), enemy = enemy.get(), "boss spawned");
            out_events.push(Event::BossSpawned { enemy, room });
        }
        Command::SpawnWave { room, enemies } => {
            if world.graph.room(room).is_none() || enemies.is_empty() {
                return;
            }
            for spawn in &enemies {
                let id = world.allocate_enemy_id();
                world
                    .rosters
                    .add(Enemy::grunt(id, room, spawn.position, spawn.level));
            }
            debug!(room = room.get(), count = enemies.len(), "wave spawned");
            out_events.push(Event::WaveSpawned {
                room,
                count: enemies.len(),
            });
        }
        Command::OfferPerks { choices } => {
            let Some(offer) = world.offer.as_mut() else {
                return;
            };
            if !offer.choices.is_empty() {
                return;
            }
            if choices.is_empty() {
                world.offer = None;
                world.open_next_offer(out_events);
            } else {
                debug!(level = offer.level, count = choices.len(), "perks offered");
                offer.choices = choices;
            }
        }
        Command::SelectPerk { index } => {
            let Some(choice) = world
                .offer
                .as_ref()
                .and_then(|offer| offer.choices.get(index))
                .cloned()
            else {
                return;
            };
            world.player.apply_choice(&choice, &world.catalog);
            world.offer = None;
            info!(perk = %choice.id, "perk applied");
            out_events.push(Event::PerkApplied { choice });
            world.open_next_offer(out_events);
        }
        Command::CollapseRoom { room } => {
            let removed = world.graph.collapse(room);
            if removed.is_empty() {
                return;
            }
            for gone in &removed {
                let _ = world.rosters.clear(*gone);
            }
            info!(room = room.get(), removed = removed.len(), "room collapsed");
            out_events.push(Event::RoomCollapsed {
                room,
                removed: removed.len(),
            });

            if world
                .current
                .is_some_and(|current| removed.contains(&current))
            {
                world.current = None;
                world.ordnance.clear();
                let fallback = world.graph.pick_random_leaf(&mut world.rng);
                out_events.push(Event::CurrentRoomCollapsed { fallback });
            }
        }
        Command::Conclude { outcome } => world.conclude(outcome, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use mine_crawl_core::{
        Choice, EncounterSite, FrameSnapshot, Outcome, Pickup, RoomId, RoomLayout, RoomLayoutView,
    };

    use super::{PerkCatalog, Player, Room, Rosters, World, WorldGraph};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the dungeon tree.
    #[must_use]
    pub fn graph(world: &World) -> &WorldGraph {
        &world.graph
    }

    /// Room the player currently occupies, if any remains.
    #[must_use]
    pub fn current_room(world: &World) -> Option<RoomId> {
        world.current
    }

    /// Provides read-only access to the player.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Provides read-only access to the per-room enemy rosters.
    #[must_use]
    pub fn rosters(world: &World) -> &Rosters {
        &world.rosters
    }

    /// Provides read-only access to the perk catalog.
    #[must_use]
    pub fn catalog(world: &World) -> &PerkCatalog {
        &world.catalog
    }

    /// Every perk the catalog can offer.
    #[must_use]
    pub fn perk_choices(world: &World) -> Vec<Choice> {
        world.catalog.choices()
    }

    /// Choices of the open level-up offer, or `None` when no offer is open.
    #[must_use]
    pub fn open_offer(world: &World) -> Option<&[Choice]> {
        world.offer.as_ref().map(|offer| offer.choices.as_slice())
    }

    /// Terminal outcome reached by the session, if any.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Number of ticks the world has simulated.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Standing of a room within the dungeon tree.
    #[must_use]
    pub fn encounter_site(world: &World, room: RoomId) -> Option<EncounterSite> {
        world.encounter_site(room)
    }

    /// Captures the layouts of the provided rooms, skipping collapsed ones.
    #[must_use]
    pub fn room_layouts(world: &World, rooms: &[RoomId]) -> RoomLayoutView {
        RoomLayoutView::from_layouts(
            rooms
                .iter()
                .filter_map(|room| world.graph.room(*room))
                .map(layout_of)
                .collect(),
        )
    }

    /// Captures everything a renderer needs to draw the current room.
    #[must_use]
    pub fn frame(world: &World) -> FrameSnapshot {
        let room = world.current.and_then(|room| world.graph.room(room));
        let pickups = room
            .map(|room| {
                room.crystals()
                    .iter()
                    .map(|crystal| Pickup::Crystal {
                        position: crystal.position(),
                        value: crystal.value(),
                    })
                    .chain(room.keys().iter().map(|key| Pickup::Key {
                        position: key.position(),
                        id: key.id().to_owned(),
                    }))
                    .collect()
            })
            .unwrap_or_default();
        let enemies = room
            .map(|room| {
                world
                    .rosters
                    .enemies(room.id())
                    .iter()
                    .map(|enemy| enemy.snapshot())
                    .collect()
            })
            .unwrap_or_default();

        FrameSnapshot {
            room: room.map(layout_of),
            pickups,
            enemies,
            player: Some(world.player.snapshot()),
            ordnance: world.ordnance.iter().map(|piece| piece.snapshot()).collect(),
            offer: open_offer(world).map(<[Choice]>::to_vec).unwrap_or_default(),
        }
    }

    fn layout_of(room: &Room) -> RoomLayout {
        RoomLayout {
            id: room.id(),
            level: room.level(),
            width: room.width(),
            height: room.height(),
            doors: room.doors().to_vec(),
        }
    }
}
