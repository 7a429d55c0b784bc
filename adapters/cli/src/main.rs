#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Mine Crawl session.

mod autopilot;
mod text;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use mine_crawl_core::InputSource;
use mine_crawl_simulation::{Session, SessionConfig};
use mine_crawl_world::query;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use autopilot::Autopilot;
use text::{ConsoleSink, TextRenderer};

/// Headless Mine Crawl session runner.
#[derive(Debug, Parser)]
#[command(name = "mine-crawl", about = "Runs a Mine Crawl session on autopilot")]
struct Args {
    /// TOML session configuration; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the configured dungeon tree height.
    #[arg(long)]
    height: Option<i32>,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Prints a status line every this many ticks; zero disables it.
    #[arg(long, default_value_t = 60)]
    report_every: u32,
}

/// Entry point for the Mine Crawl command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;

    let mut session = Session::new(&config).context("failed to start session")?;
    let mut autopilot = Autopilot::default();
    let mut renderer = TextRenderer::new(args.report_every);
    let mut sink = ConsoleSink::default();
    let dt = Duration::from_millis(args.tick_ms.max(1));

    let mut ticks = 0;
    while ticks < args.ticks {
        let input = autopilot.poll(&session.frame());
        let report = session.tick(dt, &input, &mut sink);
        session.render(&mut renderer);
        ticks += 1;

        if report.outcome.is_some() {
            break;
        }
        if query::current_room(session.world()).is_none() {
            warn!("no rooms remain, stopping");
            break;
        }
    }

    let player = query::player(session.world());
    info!(
        ticks,
        outcome = ?session.outcome(),
        level = player.level(),
        total_xp = player.total_xp(),
        hp = player.hp(),
        notices = sink.notices().len(),
        "session finished"
    );
    println!(
        "{} after {ticks} ticks (level {}, hp {}/{})",
        session
            .outcome()
            .map_or("unfinished", text::outcome_label),
        player.level(),
        player.hp(),
        player.max_hp()
    );
    println!(
        "loadout: {}",
        text::loadout(player, query::catalog(session.world()))
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(height) = args.height {
        config.tree_height = height;
    }
    Ok(config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
