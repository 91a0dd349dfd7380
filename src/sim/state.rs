//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in [`GameState`]; collaborators
//! read [`Snapshot`]s and drain [`GameEvent`]s.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::items::Item;
use super::obstacles::Obstacle;
use super::player::{DeathCause, Player};
use super::powerups::{ActiveEffect, PowerUpKind, PowerUps};
use super::session::{GamePhase, RunSummary, Session};
use super::tables::ItemKind;
use super::track::TrackSegment;
use super::world::World;
use crate::tuning::Tuning;

/// Observable happenings, drained once per frame by presentation/audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    CountdownStep { label: String },
    LaneChanged { from: usize, to: usize },
    /// Swipe toward the edge from the outermost lane
    LaneBlocked { lane: usize },
    Jumped { air: bool },
    Landed,
    SlideStarted,
    SlideEnded,
    GlideStarted,
    GlideEnded,
    Died { cause: DeathCause },
    ItemSpawned { id: u32, kind: ItemKind, lane: usize },
    ItemCollected {
        id: u32,
        kind: ItemKind,
        sound: Option<String>,
    },
    PowerUpActivated { kind: PowerUpKind, duration: f32 },
    PowerUpRefreshed { kind: PowerUpKind, duration: f32 },
    PowerUpExpired { kind: PowerUpKind },
    GapCreated { start: f32, length: f32 },
    RunFinished { summary: RunSummary },
}

/// Read-only player view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub lane: usize,
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub grounded: bool,
    pub sliding: bool,
    pub gliding: bool,
    pub alive: bool,
    pub invincible: bool,
    pub flying: bool,
}

/// Read-only session view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: GamePhase,
    pub score: u64,
    pub distance: f64,
    pub play_time: f64,
    pub coins: u32,
    pub countdown: Option<String>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub player: PlayerView,
    pub session: SessionView,
    pub power_ups: Vec<ActiveEffect>,
    pub obstacles: Vec<Obstacle>,
    pub items: Vec<Item>,
    pub segments: Vec<TrackSegment>,
}

fn unseeded_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game state (deterministic given seed, tuning and inputs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Sanitized tuning in effect
    pub tuning: Tuning,
    pub session: Session,
    pub player: Player,
    pub world: World,
    pub power_ups: PowerUps,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Completed restarts
    pub runs: u32,
    /// Events since the last drain
    #[serde(default)]
    pub events: Vec<GameEvent>,
    /// Single RNG stream for all spawning; continues across restarts
    #[serde(skip, default = "unseeded_rng")]
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a new game state; `tuning` is clamped into safe ranges first
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let mut state = Self {
            seed,
            session: Session::new(tuning.session.clone()),
            player: Player::new(&tuning),
            world: World::new(&tuning),
            power_ups: PowerUps::default(),
            time_ticks: 0,
            runs: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            tuning,
        };
        state.prefill_world();
        log::info!(
            "new game: seed {} mode {:?} gaps {}",
            seed,
            state.tuning.obstacles.mode,
            state.tuning.track.enable_gaps
        );
        state
    }

    /// Stream the opening window so there is something to show before Playing
    fn prefill_world(&mut self) {
        self.world
            .update(0.0, &self.tuning, &mut self.rng, &mut self.events);
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    /// Full reinitialization after GameOver; the RNG stream carries on
    pub fn restart(&mut self) -> bool {
        if !self.session.transition(GamePhase::Ready, &mut self.events) {
            return false;
        }
        self.power_ups
            .cancel_all(&mut self.player, &self.tuning.power_ups);
        self.session = Session::new(self.tuning.session.clone());
        self.player = Player::new(&self.tuning);
        self.world = World::new(&self.tuning);
        self.prefill_world();
        self.runs += 1;
        log::info!("restart #{}", self.runs);
        true
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        let p = &self.player;
        let s = &self.session;
        Snapshot {
            tick: self.time_ticks,
            player: PlayerView {
                lane: p.lane,
                x: p.x,
                y: p.y,
                speed: p.current_speed(),
                grounded: p.grounded,
                sliding: p.sliding,
                gliding: p.gliding,
                alive: p.alive,
                invincible: p.invincible,
                flying: p.flying,
            },
            session: SessionView {
                phase: s.phase,
                score: s.score,
                distance: s.distance,
                play_time: s.play_time,
                coins: s.coins,
                countdown: s.countdown_label().map(str::to_owned),
            },
            power_ups: self.power_ups.active.clone(),
            obstacles: self.world.obstacles.obstacles.clone(),
            items: self.world.items.items.clone(),
            segments: self.world.track.segments.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_ready_with_content() {
        let state = GameState::new(1);
        assert_eq!(state.phase(), GamePhase::Ready);
        assert!(state.player.alive);
        assert!(!state.world.track.segments.is_empty());
        assert!(state.world.obstacles.obstacles.iter().all(|o| o.z >= 100.0));
    }

    #[test]
    fn test_restart_only_from_game_over() {
        let mut state = GameState::new(1);
        assert!(!state.restart());
        assert_eq!(state.runs, 0);

        state.session.phase = GamePhase::GameOver;
        state.player.alive = false;
        state.player.lane = 0;
        assert!(state.restart());
        assert_eq!(state.phase(), GamePhase::Ready);
        assert!(state.player.alive);
        assert_eq!(state.player.lane, 1);
        assert_eq!(state.runs, 1);
    }

    #[test]
    fn test_invalid_tuning_is_clamped() {
        let mut tuning = Tuning::default();
        tuning.lanes.count = 0;
        tuning.player.forward_speed = -5.0;
        let state = GameState::with_tuning(3, tuning);
        assert_eq!(state.tuning.lanes.count, 1);
        assert_eq!(state.player.lane, 0);
        assert_eq!(state.player.forward_speed, 0.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = GameState::new(9);
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Ready\""));
        assert!(state.drain_events().iter().all(|e| !matches!(e, GameEvent::Died { .. })));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = GameState::new(42);
        let b = GameState::new(42);
        let layout = |s: &GameState| {
            s.world
                .obstacles
                .obstacles
                .iter()
                .map(|o| (o.lane, o.z.to_bits()))
                .collect::<Vec<_>>()
        };
        assert_eq!(layout(&a), layout(&b));
    }
}
