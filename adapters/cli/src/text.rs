//! Plain-text presentation of frames and terminal notices.

use mine_crawl_core::{EventSink, FrameSnapshot, Notice, Outcome, Renderer};
use mine_crawl_world::{PerkCatalog, Player};
use tracing::info;

/// Prints a one-line status summary every `every` frames.
#[derive(Debug)]
pub(crate) struct TextRenderer {
    every: u32,
    frames: u32,
}

impl TextRenderer {
    pub(crate) fn new(every: u32) -> Self {
        Self { every, frames: 0 }
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, frame: &FrameSnapshot) {
        self.frames = self.frames.wrapping_add(1);
        if self.every == 0 || self.frames % self.every != 0 {
            return;
        }
        if let Some(line) = status_line(self.frames, frame) {
            println!("{line}");
        }
    }
}

fn status_line(index: u32, frame: &FrameSnapshot) -> Option<String> {
    let room = frame.room.as_ref()?;
    let player = frame.player.as_ref()?;
    let mut line = format!(
        "[{index:>6}] room {:>2} (depth {}) | hp {:>3}/{:<3} | lvl {:>2} xp {}/{} | enemies {:>3} | pickups {:>3}",
        room.id.get(),
        room.level,
        player.hp,
        player.max_hp,
        player.level,
        player.current_xp,
        player.xp_to_next,
        frame.enemies.len(),
        frame.pickups.len(),
    );
    if !player.keys.is_empty() {
        line.push_str(&format!(" | keys {}", player.keys.join(",")));
    }
    if !frame.offer.is_empty() {
        let names: Vec<&str> = frame.offer.iter().map(|choice| choice.name.as_str()).collect();
        line.push_str(&format!(" | offer: {}", names.join(" / ")));
    }
    Some(line)
}

/// Human readable label of a terminal outcome.
pub(crate) fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "Escaped the mine",
        Outcome::GameOver => "Game over",
    }
}

/// Owned weapons with their levels followed by passive stacks.
pub(crate) fn loadout(player: &Player, catalog: &PerkCatalog) -> String {
    let weapons = catalog.weapons().iter().filter_map(|weapon| {
        let level = player.weapon_level(weapon.id());
        (level > 0).then(|| format!("{} {level}", weapon.name()))
    });
    let passives = catalog.passives().iter().filter_map(|passive| {
        let stacks = player.passive_stacks(passive.id());
        (stacks > 0).then(|| format!("{} x{stacks}", passive.name()))
    });
    weapons.chain(passives).collect::<Vec<_>>().join(", ")
}

/// Logs every notice and keeps them for the final summary.
#[derive(Debug, Default)]
pub(crate) struct ConsoleSink {
    notices: Vec<Notice>,
}

impl ConsoleSink {
    pub(crate) fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

impl EventSink for ConsoleSink {
    fn notify(&mut self, notice: Notice) {
        info!(?notice, "session notice");
        self.notices.push(notice);
    }
}
