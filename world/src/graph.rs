//! Complete binary tree of rooms that forms the dungeon.

use std::collections::VecDeque;

use mine_crawl_core::{Door, RoomId, Vec2};
use rand::{seq::SliceRandom, Rng};

use crate::{
    doors::{self, Branch, RoomFrame},
    error::{BuildError, MAX_TREE_HEIGHT, MIN_ROOM_EXTENT},
};

/// Experience crystal resting on the floor of a room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crystal {
    position: Vec2,
    value: u32,
}

impl Crystal {
    /// Creates a crystal worth `value` experience at the provided position.
    #[must_use]
    pub const fn new(position: Vec2, value: u32) -> Self {
        Self { position, value }
    }

    /// Room-local position of the crystal.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Raw experience value of the crystal.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }
}

/// Key resting on the floor of a room.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyPickup {
    position: Vec2,
    id: String,
}

impl KeyPickup {
    /// Creates a key with the provided identifier.
    #[must_use]
    pub fn new(position: Vec2, id: impl Into<String>) -> Self {
        Self {
            position,
            id: id.into(),
        }
    }

    /// Room-local position of the key.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Identifier of the key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Single room of the dungeon.
#[derive(Clone, Debug)]
pub struct Room {
    id: RoomId,
    level: u32,
    width: f32,
    height: f32,
    doors: Vec<Door>,
    crystals: Vec<Crystal>,
    keys: Vec<KeyPickup>,
    clear_count: u32,
    was_cleared: bool,
    collapsed: bool,
}

impl Room {
    fn new(id: RoomId, level: u32, width: f32, height: f32) -> Self {
        Self {
            id,
            level,
            width,
            height,
            doors: Vec::new(),
            crystals: Vec::new(),
            keys: Vec::new(),
            clear_count: 0,
            was_cleared: false,
            collapsed: false,
        }
    }

    fn frame(&self) -> RoomFrame {
        RoomFrame {
            id: self.id,
            level: self.level,
            width: self.width,
            height: self.height,
        }
    }

    /// Handle of the room.
    #[must_use]
    pub const fn id(&self) -> RoomId {
        self.id
    }

    /// Depth of the room when the dungeon was built.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Width of the room.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the room.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Center point of the room.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Doors hosted by the room, in trigger evaluation order.
    #[must_use]
    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// Crystals resting on the floor.
    #[must_use]
    pub fn crystals(&self) -> &[Crystal] {
        &self.crystals
    }

    /// Keys resting on the floor.
    #[must_use]
    pub fn keys(&self) -> &[KeyPickup] {
        &self.keys
    }

    /// Number of times the room went from occupied to vacant.
    #[must_use]
    pub const fn clear_count(&self) -> u32 {
        self.clear_count
    }

    /// Reports whether the room was removed from the dungeon.
    #[must_use]
    pub const fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Clamps a point into the room, keeping `margin` units from every wall.
    #[must_use]
    pub fn clamp_point(&self, point: Vec2, margin: f32) -> Vec2 {
        Vec2::new(
            point.x.max(margin).min(self.width - margin),
            point.y.max(margin).min(self.height - margin),
        )
    }

    pub(crate) fn doors_mut(&mut self) -> &mut Vec<Door> {
        &mut self.doors
    }

    pub(crate) fn crystals_mut(&mut self) -> &mut Vec<Crystal> {
        &mut self.crystals
    }

    pub(crate) fn keys_mut(&mut self) -> &mut Vec<KeyPickup> {
        &mut self.keys
    }

    /// Counts a vacancy once, returning whether it was newly counted.
    pub(crate) fn mark_cleared(&mut self) -> bool {
        if self.was_cleared {
            return false;
        }
        self.was_cleared = true;
        self.clear_count = self.clear_count.saturating_add(1);
        true
    }

    pub(crate) fn mark_occupied(&mut self) {
        self.was_cleared = false;
    }
}

#[derive(Clone, Debug)]
struct Node {
    room: Room,
    children: Vec<RoomId>,
    height: u32,
    attached: bool,
}

/// Dungeon tree owning every room.
///
/// Rooms live in an arena indexed by their handle in heap order, so nodes
/// hold no parent pointers and depth is found by walking the ancestor chain.
/// Subtree heights are cached and refreshed along the ancestors of a
/// collapsed room.
#[derive(Clone, Debug)]
pub struct WorldGraph {
    nodes: Vec<Node>,
    root: Option<RoomId>,
    attached: usize,
}

impl WorldGraph {
    /// Builds a complete binary tree of rooms linked by door pairs.
    ///
    /// The tree holds `2^(height+1) - 1` rooms and the root hosts the locked
    /// exit.
    pub fn build(height: i32, room_width: f32, room_height: f32) -> Result<Self, BuildError> {
        if height < 0 {
            return Err(BuildError::NegativeHeight { height });
        }
        if height > MAX_TREE_HEIGHT {
            return Err(BuildError::HeightTooLarge {
                height,
                max: MAX_TREE_HEIGHT,
            });
        }
        let valid_extent = |extent: f32| extent.is_finite() && extent >= MIN_ROOM_EXTENT;
        if !valid_extent(room_width) || !valid_extent(room_height) {
            return Err(BuildError::InvalidRoomSize {
                width: room_width,
                height: room_height,
                min: MIN_ROOM_EXTENT,
            });
        }

        let count = (1_usize << (height as u32 + 1)) - 1;
        let mut nodes: Vec<Node> = (0..count)
            .map(|index| {
                let level = (index + 1).ilog2();
                Node {
                    room: Room::new(RoomId::new(index as u32), level, room_width, room_height),
                    children: Vec::new(),
                    height: height as u32 - level,
                    attached: true,
                }
            })
            .collect();

        for parent in 0..count {
            for (child, branch) in [
                (2 * parent + 1, Branch::Left),
                (2 * parent + 2, Branch::Right),
            ] {
                if child >= count {
                    continue;
                }
                let (downward, upward) =
                    doors::door_pair(nodes[parent].room.frame(), nodes[child].room.frame(), branch);
                nodes[parent].room.doors.push(downward);
                nodes[parent].children.push(RoomId::new(child as u32));
                nodes[child].room.doors.push(upward);
            }
        }
        nodes[0].room.doors.push(doors::exit_door(room_width));

        Ok(Self {
            nodes,
            root: Some(RoomId::new(0)),
            attached: count,
        })
    }

    /// Handle of the root room, if it has not collapsed.
    #[must_use]
    pub const fn root(&self) -> Option<RoomId> {
        self.root
    }

    /// Reports whether the provided room is the root.
    #[must_use]
    pub fn is_root(&self, room: RoomId) -> bool {
        self.root == Some(room)
    }

    /// Looks up an attached room.
    #[must_use]
    pub fn room(&self, room: RoomId) -> Option<&Room> {
        self.node(room).map(|node| &node.room)
    }

    pub(crate) fn room_mut(&mut self, room: RoomId) -> Option<&mut Room> {
        let index = room.get() as usize;
        self.nodes
            .get_mut(index)
            .filter(|node| node.attached)
            .map(|node| &mut node.room)
    }

    /// Looks up any room created at build time, including collapsed ones.
    #[must_use]
    pub fn built_room(&self, room: RoomId) -> Option<&Room> {
        self.nodes.get(room.get() as usize).map(|node| &node.room)
    }

    /// Children of an attached room; empty for leaves and unknown handles.
    #[must_use]
    pub fn children(&self, room: RoomId) -> &[RoomId] {
        self.node(room)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Handles of every attached room in breadth-first order.
    #[must_use]
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.walk().into_iter().map(|(room, _)| room).collect()
    }

    /// Number of attached rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attached
    }

    /// Reports whether every room has collapsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Depth of an attached room, counted from the root.
    #[must_use]
    pub fn node_depth(&self, room: RoomId) -> Option<u32> {
        let _ = self.node(room)?;
        let mut depth = 0;
        let mut cursor = room;
        while let Some(parent) = self.parent(cursor) {
            depth += 1;
            cursor = parent;
        }
        Some(depth)
    }

    /// Depth of the deepest remaining leaf, or zero when empty.
    #[must_use]
    pub fn tree_height(&self) -> u32 {
        self.root
            .and_then(|root| self.subtree_height(root))
            .unwrap_or(0)
    }

    /// Height of the subtree rooted at an attached room.
    #[must_use]
    pub fn subtree_height(&self, room: RoomId) -> Option<u32> {
        self.node(room).map(|node| node.height)
    }

    /// Attached rooms without children.
    #[must_use]
    pub fn leaves(&self) -> Vec<RoomId> {
        self.room_ids()
            .into_iter()
            .filter(|room| self.children(*room).is_empty())
            .collect()
    }

    /// Picks a leaf uniformly at random.
    pub fn pick_random_leaf<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<RoomId> {
        self.leaves().choose(rng).copied()
    }

    /// Picks a non-root room uniformly at random.
    pub fn pick_random_non_root<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<RoomId> {
        let candidates: Vec<RoomId> = self
            .room_ids()
            .into_iter()
            .filter(|room| !self.is_root(*room))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Removes a room and its subtree from the dungeon.
    ///
    /// Every removed room is marked collapsed and the parent's door into the
    /// room disappears with it. Returns the removed handles in breadth-first
    /// order; unknown or already collapsed rooms yield an empty list.
    pub fn collapse(&mut self, room: RoomId) -> Vec<RoomId> {
        if self.node(room).is_none() {
            return Vec::new();
        }

        let parent = self.parent(room);
        if self.is_root(room) {
            self.root = None;
        } else if let Some(parent) = parent {
            let parent_node = &mut self.nodes[parent.get() as usize];
            parent_node.children.retain(|child| *child != room);
            parent_node
                .room
                .doors
                .retain(|door| door.destination() != Some(room));
        }

        let mut removed = Vec::new();
        let mut queue = VecDeque::from([room]);
        while let Some(current) = queue.pop_front() {
            let node = &mut self.nodes[current.get() as usize];
            node.attached = false;
            node.room.collapsed = true;
            queue.extend(node.children.iter().copied());
            removed.push(current);
        }
        self.attached -= removed.len();
        if let Some(parent) = parent {
            self.refresh_heights(parent);
        }
        removed
    }

    fn refresh_heights(&mut self, from: RoomId) {
        let mut cursor = Some(from);
        while let Some(room) = cursor {
            let height = self
                .children(room)
                .iter()
                .map(|child| self.nodes[child.get() as usize].height + 1)
                .max()
                .unwrap_or(0);
            let node = &mut self.nodes[room.get() as usize];
            if node.height == height {
                return;
            }
            node.height = height;
            cursor = self.parent(room);
        }
    }

    fn node(&self, room: RoomId) -> Option<&Node> {
        self.nodes
            .get(room.get() as usize)
            .filter(|node| node.attached)
    }

    fn parent(&self, room: RoomId) -> Option<RoomId> {
        let index = room.get() as usize;
        if index == 0 || self.node(room).is_none() {
            return None;
        }
        Some(RoomId::new(((index - 1) / 2) as u32))
    }

    fn walk(&self) -> Vec<(RoomId, u32)> {
        let mut visited = Vec::new();
        let Some(root) = self.root else {
            return visited;
        };
        let mut queue = VecDeque::from([(root, 0_u32)]);
        while let Some((room, depth)) = queue.pop_front() {
            visited.push((room, depth));
            for child in self.children(room) {
                queue.push_back((*child, depth + 1));
            }
        }
        visited
    }
}
