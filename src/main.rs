//! Ink Duel headless runner
//!
//! Plays the built-in AI against the autopilot and logs the event stream.
//!
//! Usage: `ink-duel [settings.json] [--difficulty NAME] [--seed N] [--max-ticks N]`

use std::path::PathBuf;

use clap::Parser;
use ink_duel::Settings;
use ink_duel::consts::TICK_MS;
use ink_duel::sim::{Authority, Difficulty, DuelState, EventKind, MatchPhase, TickInput, tick};

/// One hour of simulated time
const DEFAULT_MAX_TICKS: u64 = 225_000;

#[derive(Parser, Debug)]
#[command(name = "ink-duel")]
#[command(about = "Run a headless AI-vs-autopilot duel", long_about = None)]
struct Cli {
    /// Settings JSON file
    settings: Option<PathBuf>,

    /// Difficulty override (novice, duelist, grandmaster, inferno)
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    /// Seed override for the AI brains
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks without a winner
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u64,
}

fn parse_difficulty(value: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(value).ok_or_else(|| format!("unknown difficulty '{}'", value))
}

fn main() {
    env_logger::init();
    let args = Cli::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if settings.authority.is_remote() {
        log::warn!("Headless runner has no transport, using local AI authority");
        settings.authority = Authority::LocalAi;
    }

    log::info!(
        "Ink Duel (headless) starting: {} seed={}",
        settings.difficulty.as_str(),
        settings.seed
    );

    let mut state = DuelState::new(&settings);
    state.start_match();

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let mut parries = 0u32;
    let mut clashes = 0u32;

    while state.time_ticks < args.max_ticks && !state.match_over() {
        tick(&mut state, &input);
        for event in state.drain_events() {
            match event.kind {
                EventKind::ParrySuccess => parries += 1,
                EventKind::Clash => clashes += 1,
                _ => {}
            }
            log::debug!(
                "[{:>8.0} ms] {:?} {:?} at ({:.0}, {:.0})",
                state.clock_ms,
                event.side,
                event.kind,
                event.pos.x,
                event.pos.y
            );
        }
    }

    let seconds = state.time_ticks as f32 * TICK_MS / 1000.0;
    match state.phase {
        MatchPhase::MatchEnded { winner } => log::info!(
            "{:?} wins {}-{} after {:.1}s ({} parries, {} clashes)",
            winner,
            state.score.player,
            state.score.counterpart,
            seconds,
            parries,
            clashes
        ),
        _ => log::info!(
            "No winner after {:.1}s, score {}-{}",
            seconds,
            state.score.player,
            state.score.counterpart
        ),
    }
}
