//! Door placement for parent/child edges and the dungeon exit.

use mine_crawl_core::{Door, Rect, RoomId, Vec2};

const DOOR_WIDTH: f32 = 80.0;
const DOOR_HEIGHT: f32 = 28.0;
const DOOR_TOP: f32 = 10.0;
const DOOR_BOTTOM_INSET: f32 = 38.0;
const BRANCH_OFFSET: f32 = 80.0;
const BRANCH_MARGIN: f32 = 60.0;
const ARRIVAL_INSET: f32 = 80.0;
const EXIT_WIDTH: f32 = 100.0;
const EXIT_HEIGHT: f32 = 32.0;
const EXIT_INSET: f32 = 110.0;

/// Which child slot of its parent a room occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Branch {
    Left,
    Right,
}

/// Dimensions and identity of one end of an edge.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RoomFrame {
    pub(crate) id: RoomId,
    pub(crate) level: u32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

/// Creates the two doors joining a parent and child room.
///
/// Returns the door hosted by the parent followed by the door hosted by the
/// child. Each names the other room as its destination.
pub(crate) fn door_pair(parent: RoomFrame, child: RoomFrame, branch: Branch) -> (Door, Door) {
    let offset = match branch {
        Branch::Left => -BRANCH_OFFSET,
        Branch::Right => BRANCH_OFFSET,
    };
    let center_x = (parent.width / 2.0 + offset)
        .max(BRANCH_MARGIN)
        .min(parent.width - BRANCH_MARGIN);

    let downward = Door::passage(
        Rect::new(
            center_x - DOOR_WIDTH / 2.0,
            parent.height - DOOR_BOTTOM_INSET,
            DOOR_WIDTH,
            DOOR_HEIGHT,
        ),
        child.id,
        Vec2::new(child.width / 2.0, ARRIVAL_INSET),
        child.level.to_string(),
    );

    let upward = Door::passage(
        Rect::new(
            child.width / 2.0 - DOOR_WIDTH / 2.0,
            DOOR_TOP,
            DOOR_WIDTH,
            DOOR_HEIGHT,
        ),
        parent.id,
        Vec2::new(parent.width / 2.0, parent.height - ARRIVAL_INSET),
        parent.level.to_string(),
    );

    (downward, upward)
}

/// Creates the locked exit hosted by the root room.
pub(crate) fn exit_door(root_width: f32) -> Door {
    Door::exit(Rect::new(
        root_width - EXIT_INSET,
        DOOR_TOP,
        EXIT_WIDTH,
        EXIT_HEIGHT,
    ))
}
