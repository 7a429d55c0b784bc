#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mine Crawl simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable snapshots, and
//! respond exclusively with new command batches.

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when a session boots.
pub const WELCOME_BANNER: &str = "Welcome to the Mine.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Announces the starting room so that its on-enter hooks run.
    BeginSession,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
        /// Raw movement intent supplied by the input source for this tick.
        movement: Vec2,
    },
    /// Moves the player into a room, placing them at the provided point.
    EnterRoom {
        /// Room that becomes the current room.
        room: RoomId,
        /// Room-local coordinates at which the player reappears.
        spawn: Vec2,
    },
    /// Requests that a boss be spawned into a room.
    SpawnBoss {
        /// Room receiving the boss.
        room: RoomId,
        /// Room-local position of the boss.
        position: Vec2,
    },
    /// Requests that a batch of regular enemies be spawned into a room.
    SpawnWave {
        /// Room receiving the wave.
        room: RoomId,
        /// Placement and level of every enemy in the batch.
        enemies: Vec<EnemySpawn>,
    },
    /// Supplies the choices shown by the currently open level-up offer.
    OfferPerks {
        /// Choices available to the player, in display order.
        choices: Vec<Choice>,
    },
    /// Applies one of the offered perk choices.
    SelectPerk {
        /// Zero-based index into the offered choices.
        index: usize,
    },
    /// Permanently removes a room and its subtree from play.
    CollapseRoom {
        /// Room at the top of the removed subtree.
        room: RoomId,
    },
    /// Ends the session with the provided outcome.
    Conclude {
        /// Terminal outcome of the session.
        outcome: Outcome,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the player entered a room.
    RoomEntered {
        /// Standing of the room within the dungeon tree.
        site: EncounterSite,
        /// Indicates whether a living boss already occupies the room.
        boss_present: bool,
        /// Indicates whether the room currently has no roster.
        roster_empty: bool,
    },
    /// Reports that the player touched an unlocked door.
    DoorReached {
        /// Room the door belongs to.
        room: RoomId,
        /// Position of the door within the room's door list.
        index: usize,
        /// Copy of the door that was touched.
        door: Door,
    },
    /// Reports that the player touched a locked door, which has no effect.
    DoorLocked {
        /// Room the door belongs to.
        room: RoomId,
        /// Position of the door within the room's door list.
        index: usize,
    },
    /// Confirms that a room went from occupied to vacant.
    RoomCleared {
        /// Room that was cleared.
        room: RoomId,
        /// Number of times the room has now been cleared.
        clear_count: u32,
    },
    /// Reports that the current room holds no living enemies after a tick.
    RoomVacated {
        /// Standing of the vacant room within the dungeon tree.
        site: EncounterSite,
        /// Indicates whether a living boss occupies the room.
        boss_present: bool,
    },
    /// Confirms that a boss entered a room.
    BossSpawned {
        /// Identifier allocated to the boss.
        enemy: EnemyId,
        /// Room the boss occupies.
        room: RoomId,
    },
    /// Confirms that a wave of regular enemies entered a room.
    WaveSpawned {
        /// Room the wave occupies.
        room: RoomId,
        /// Number of enemies in the wave.
        count: usize,
    },
    /// Reports that an enemy died and was removed from its roster.
    EnemyKilled {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Room the enemy belonged to.
        room: RoomId,
        /// Behaviour class of the enemy.
        class: EnemyClass,
        /// Level of the enemy.
        level: u32,
    },
    /// Reports that the player lost health through enemy contact.
    PlayerDamaged {
        /// Damage dealt by the contact.
        amount: u32,
        /// Remaining player health.
        hp: u32,
    },
    /// Reports that the player collected a crystal.
    CrystalCollected {
        /// Raw crystal value.
        value: u32,
        /// Experience granted after multipliers.
        xp: u32,
    },
    /// Reports that the player collected a key.
    KeyCollected {
        /// Identifier of the collected key.
        key: String,
    },
    /// Reports that a win door was unlocked.
    WinDoorUnlocked {
        /// Room hosting the win door.
        room: RoomId,
    },
    /// Reports that the player reached a new level.
    PlayerLeveledUp {
        /// Level the player reached.
        level: u32,
    },
    /// Requests perk choices for the level-up offer that just opened.
    PerkChoiceNeeded {
        /// Level the offer belongs to.
        level: u32,
    },
    /// Confirms that a perk choice was applied to the player.
    PerkApplied {
        /// Choice that was applied.
        choice: Choice,
    },
    /// Confirms that a room and its subtree were removed from play.
    RoomCollapsed {
        /// Room at the top of the removed subtree.
        room: RoomId,
        /// Number of rooms removed, including the top room.
        removed: usize,
    },
    /// Reports that the current room was collapsed underneath the player.
    CurrentRoomCollapsed {
        /// Leaf selected as a replacement, if any room remains.
        fallback: Option<RoomId>,
    },
    /// Announces the terminal outcome of the session.
    SessionConcluded {
        /// Outcome reached.
        outcome: Outcome,
    },
}

/// Terminal outcomes of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The player walked through the unlocked exit.
    Win,
    /// The player's health reached zero.
    GameOver,
}

/// Notifications delivered to an [`EventSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Notice {
    /// The session was won.
    Win,
    /// The session was lost.
    GameOver,
    /// The session was paused.
    Paused,
    /// The session was resumed.
    Resumed,
}

impl From<Outcome> for Notice {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => Self::Win,
            Outcome::GameOver => Self::GameOver,
        }
    }
}

/// Unique handle assigned to a room of the dungeon tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u32);

impl RoomId {
    /// Creates a new room handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behaviour classes available to enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyClass {
    /// Regular wave enemy.
    Grunt,
    /// Root guardian that drops the golden key.
    Boss,
}

/// Axis-aligned rectangle expressed in room-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle from its upper-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle of the provided size centered on a point.
    #[must_use]
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Horizontal extent of the rectangle.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the rectangle.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Reports whether two rectangles overlap with a non-empty intersection.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 || other.width <= 0.0 || other.height <= 0.0 {
            return false;
        }

        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Reports whether the point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Edges of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Edge at `x = 0`.
    Left,
    /// Edge at `x = width`.
    Right,
    /// Edge at `y = 0`.
    Top,
    /// Edge at `y = height`.
    Bottom,
}

impl Side {
    /// Selects the room edge nearest to a point.
    ///
    /// Distances are absolute, so points outside the room resolve to the edge
    /// they lie beyond. Ties resolve in the order left, right, top, bottom.
    #[must_use]
    pub fn nearest(point: Vec2, width: f32, height: f32) -> Side {
        let candidates = [
            (Side::Left, point.x.abs()),
            (Side::Right, (point.x - width).abs()),
            (Side::Top, point.y.abs()),
            (Side::Bottom, (point.y - height).abs()),
        ];

        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1 < best.1 {
                best = *candidate;
            }
        }
        best.0
    }
}

/// Trigger rectangle that leads to another room or out of the dungeon.
#[derive(Clone, Debug, PartialEq)]
pub struct Door {
    area: Rect,
    destination: Option<RoomId>,
    spawn: Vec2,
    locked: bool,
    is_win: bool,
    label: String,
}

impl Door {
    /// Creates an unlocked door leading to another room.
    #[must_use]
    pub fn passage(area: Rect, destination: RoomId, spawn: Vec2, label: String) -> Self {
        Self {
            area,
            destination: Some(destination),
            spawn,
            locked: false,
            is_win: false,
            label,
        }
    }

    /// Creates a locked exit door without a destination.
    #[must_use]
    pub fn exit(area: Rect) -> Self {
        Self {
            area,
            destination: None,
            spawn: Vec2::new(-1.0, -1.0),
            locked: true,
            is_win: true,
            label: "Exit".to_owned(),
        }
    }

    /// Trigger rectangle in the coordinates of the room hosting the door.
    #[must_use]
    pub const fn area(&self) -> &Rect {
        &self.area
    }

    /// Room the door leads to, or `None` for the exit.
    #[must_use]
    pub const fn destination(&self) -> Option<RoomId> {
        self.destination
    }

    /// Default arrival point inside the destination room.
    #[must_use]
    pub const fn spawn(&self) -> Vec2 {
        self.spawn
    }

    /// Reports whether the door currently refuses passage.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Reports whether walking through the door wins the session.
    #[must_use]
    pub const fn is_win(&self) -> bool {
        self.is_win
    }

    /// Label displayed next to the door.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Locks or unlocks the door.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}

/// Standing of a room within the dungeon tree, as needed to size encounters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncounterSite {
    /// Room the site describes.
    pub room: RoomId,
    /// Depth of the room measured from the root.
    pub depth: u32,
    /// Depth of the deepest remaining leaf.
    pub tree_height: u32,
    /// Height of the subtree rooted at the room.
    pub subtree_height: u32,
    /// Number of times the room has been cleared.
    pub clear_count: u32,
    /// Width of the room.
    pub width: f32,
    /// Height of the room.
    pub height: f32,
    /// Indicates whether the room is the root of the tree.
    pub is_root: bool,
}

impl EncounterSite {
    /// Center point of the room.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Placement and level of a single enemy within a spawn batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySpawn {
    /// Room-local spawn position, usually outside the playable area.
    pub position: Vec2,
    /// Level assigned to the enemy.
    pub level: u32,
}

/// Families of perks offered on level-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceKind {
    /// Weapon that fires automatically on its cooldown.
    Weapon,
    /// Passive that modifies derived player stats per stack.
    Passive,
}

/// Perk presented to the player during a level-up offer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    /// Family of the perk.
    pub kind: ChoiceKind,
    /// Stable identifier used for bindings.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
}

/// Per-tick input produced by an [`InputSource`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    /// Movement intent; each axis is expected within `[-1, 1]`.
    pub movement: Vec2,
    /// Perk selected while a level-up offer is open.
    pub selection: Option<usize>,
}

/// Static layout of a room used for door resolution and rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomLayout {
    /// Room the layout describes.
    pub id: RoomId,
    /// Depth of the room at construction time.
    pub level: u32,
    /// Width of the room.
    pub width: f32,
    /// Height of the room.
    pub height: f32,
    /// Doors hosted by the room.
    pub doors: Vec<Door>,
}

/// Read-only collection of room layouts ordered by room handle.
#[derive(Clone, Debug, Default)]
pub struct RoomLayoutView {
    layouts: Vec<RoomLayout>,
}

impl RoomLayoutView {
    /// Creates a new view from the provided layouts.
    #[must_use]
    pub fn from_layouts(mut layouts: Vec<RoomLayout>) -> Self {
        layouts.sort_by_key(|layout| layout.id);
        Self { layouts }
    }

    /// Looks up the layout of a room.
    #[must_use]
    pub fn get(&self, room: RoomId) -> Option<&RoomLayout> {
        self.layouts
            .binary_search_by_key(&room, |layout| layout.id)
            .ok()
            .map(|index| &self.layouts[index])
    }

    /// Iterator over the captured layouts in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &RoomLayout> {
        self.layouts.iter()
    }
}

/// Immutable representation of a single enemy used for rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Behaviour class of the enemy.
    pub class: EnemyClass,
    /// Room-local position.
    pub position: Vec2,
    /// Remaining health.
    pub hp: u32,
    /// Maximum health.
    pub max_hp: u32,
    /// Level of the enemy.
    pub level: u32,
    /// Indicates whether the sprite faces left.
    pub facing_left: bool,
    /// Animation frame counter.
    pub anim_tick: u32,
    /// Drawing radius of a boss; grunts use the renderer's default size.
    pub boss_radius: Option<f32>,
}

/// Immutable representation of the player used for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Room-local position.
    pub position: Vec2,
    /// Normalised facing direction.
    pub facing: Vec2,
    /// Remaining health.
    pub hp: u32,
    /// Maximum health.
    pub max_hp: u32,
    /// Current level.
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub current_xp: u32,
    /// Experience required to reach the next level.
    pub xp_to_next: u32,
    /// Keys the player owns.
    pub keys: Vec<String>,
    /// Animation frame counter.
    pub anim_tick: u32,
}

/// Collectible resting on the floor of a room.
#[derive(Clone, Debug, PartialEq)]
pub enum Pickup {
    /// Experience crystal.
    Crystal {
        /// Room-local position.
        position: Vec2,
        /// Raw experience value.
        value: u32,
    },
    /// Key that may unlock doors.
    Key {
        /// Room-local position.
        position: Vec2,
        /// Identifier of the key.
        id: String,
    },
}

/// Families of weapon projectiles and effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrdnanceKind {
    /// Melee cone swing.
    Slash,
    /// Slow charge that detonates.
    Charge,
    /// Area explosion.
    Blast,
    /// Orb circling the player.
    Orb,
    /// Projectile steering toward the nearest enemy.
    Homing,
}

/// Immutable representation of a projectile or effect used for rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrdnanceSnapshot {
    /// Family of the ordnance.
    pub kind: OrdnanceKind,
    /// Room-local position.
    pub position: Vec2,
    /// Visual radius.
    pub radius: f32,
    /// Normalised age in `[0, 1]`.
    pub progress: f32,
}

/// Complete read-only picture of the current room handed to renderers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameSnapshot {
    /// Layout of the current room, if the player occupies one.
    pub room: Option<RoomLayout>,
    /// Pickups resting in the current room.
    pub pickups: Vec<Pickup>,
    /// Enemies bound to the current room.
    pub enemies: Vec<EnemySnapshot>,
    /// Player state, absent only before the world exists.
    pub player: Option<PlayerSnapshot>,
    /// Active projectiles and effects in the current room.
    pub ordnance: Vec<OrdnanceSnapshot>,
    /// Choices of the open level-up offer, empty when none is open.
    pub offer: Vec<Choice>,
}

/// Produces a frame from read-only simulation snapshots.
pub trait Renderer {
    /// Draws the provided frame.
    fn render(&mut self, frame: &FrameSnapshot);
}

/// Produces per-tick movement intent and discrete selections.
pub trait InputSource {
    /// Samples input for the upcoming tick.
    fn poll(&mut self, frame: &FrameSnapshot) -> InputFrame;
}

/// Receives terminal outcomes and pause toggles.
///
/// Implementations must tolerate repeated delivery of the same notice.
pub trait EventSink {
    /// Delivers a notice.
    fn notify(&mut self, notice: Notice);
}

impl EventSink for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}
