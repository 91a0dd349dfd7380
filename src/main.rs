//! Lane Runner headless runner
//!
//! Runs the simulation at the fixed timestep without a renderer, driven by
//! the autopilot, and prints each run's summary and the leaderboard.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use lane_runner::consts::SIM_DT;
use lane_runner::sim::{GameEvent, GamePhase, GameState, RunSummary, SpawnMode, TickInput, tick};
use lane_runner::{HighScores, Tuning};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Random,
    TypeBased,
    PatternBased,
    Mixed,
}

impl From<Mode> for SpawnMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Random => SpawnMode::Random,
            Mode::TypeBased => SpawnMode::TypeBased,
            Mode::PatternBased => SpawnMode::PatternBased,
            Mode::Mixed => SpawnMode::Mixed,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Simulated seconds per run (countdown included)
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,
    /// Obstacle spawn strategy (overrides the config file)
    #[arg(long, value_enum)]
    mode: Option<Mode>,
    /// Insert gaps in the track
    #[arg(long)]
    gaps: bool,
    /// JSON tuning file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of runs
    #[arg(long, default_value_t = 3)]
    runs: u32,
    /// Start runs but give no input
    #[arg(long)]
    no_autopilot: bool,
    /// Print the final leaderboard as JSON
    #[arg(long)]
    json: bool,
}

fn load_tuning(cli: &Cli) -> Result<Tuning, Box<dyn Error>> {
    let mut tuning = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            log::info!("tuning loaded from {}", path.display());
            Tuning::from_json(&text)?
        }
        None => Tuning::default(),
    };
    if let Some(mode) = cli.mode {
        tuning.obstacles.mode = mode.into();
    }
    if cli.gaps {
        tuning.track.enable_gaps = true;
    }
    Ok(tuning)
}

/// Tick until the run ends or the time budget is spent
fn play(state: &mut GameState, cli: &Cli) -> RunSummary {
    let budget = (cli.seconds.max(0.0) / SIM_DT).ceil() as u64;
    let input = TickInput {
        start: true,
        autopilot: !cli.no_autopilot,
        ..Default::default()
    };

    let mut pickups = 0;
    for _ in 0..budget {
        tick(state, &input, SIM_DT);
        for event in state.drain_events() {
            match event {
                GameEvent::ItemCollected { .. } => pickups += 1,
                GameEvent::PowerUpActivated { kind, .. } => log::debug!("{:?} on", kind),
                _ => {}
            }
        }
        if state.phase() == GamePhase::GameOver {
            break;
        }
    }
    log::debug!("{} pickups", pickups);

    state
        .session
        .summary
        .clone()
        .unwrap_or_else(|| state.session.run_summary(None))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let tuning = load_tuning(&cli)?;
    let mut state = GameState::with_tuning(cli.seed, tuning);
    let mut scores = HighScores::new();

    for run in 0..cli.runs {
        if run > 0 {
            if state.phase() == GamePhase::GameOver {
                state.restart();
            } else {
                // Time ran out mid-run: begin a fresh game on the next seed
                let seed = cli.seed.wrapping_add(u64::from(run));
                state = GameState::with_tuning(seed, state.tuning.clone());
            }
        }

        let summary = play(&mut state, &cli);
        let ending = match summary.cause {
            Some(cause) => format!("{:?}", cause),
            None => "time limit".to_string(),
        };
        println!(
            "run {:>2}: score {:>6}  distance {:>8.1}  time {:>6.1}s  coins {:>3}  ({})",
            run + 1,
            summary.score,
            summary.distance,
            summary.play_time,
            summary.coins,
            ending
        );
        if let Some(rank) = scores.add_run(summary) {
            log::info!("new high score, rank {}", rank);
        }
    }

    if cli.json {
        println!("{}", scores.to_json()?);
    } else {
        println!("\nLeaderboard:");
        for (i, entry) in scores.entries.iter().enumerate() {
            println!("{:>2}. {:>6}  ({:.1} m)", i + 1, entry.score, entry.distance);
        }
    }

    Ok(())
}
