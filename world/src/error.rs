//! Errors raised while constructing the dungeon.

use thiserror::Error;

/// Smallest room extent accepted along either axis.
pub const MIN_ROOM_EXTENT: f32 = 128.0;

/// Deepest dungeon tree accepted by the builder.
pub const MAX_TREE_HEIGHT: i32 = 16;

/// Reasons the dungeon graph could not be built.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum BuildError {
    /// The requested tree height was negative.
    #[error("tree height must not be negative, got {height}")]
    NegativeHeight {
        /// Height that was requested.
        height: i32,
    },
    /// The requested tree height exceeds the supported maximum.
    #[error("tree height {height} exceeds the supported maximum of {max}")]
    HeightTooLarge {
        /// Height that was requested.
        height: i32,
        /// Largest accepted height.
        max: i32,
    },
    /// The requested room dimensions cannot host doors and spawns.
    #[error("room size {width}x{height} is invalid, both sides must be at least {min}")]
    InvalidRoomSize {
        /// Requested room width.
        width: f32,
        /// Requested room height.
        height: f32,
        /// Smallest accepted extent.
        min: f32,
    },
}
