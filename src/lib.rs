//! Lane Runner - simulation core for a three-lane endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, world streaming, session state)
//! - `tuning`: Data-driven game balance
//! - `highscores`: In-memory run leaderboard

pub mod highscores;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Height of the track surface
    pub const GROUND_Y: f32 = 0.0;
    /// Vertical velocity held while standing on the track
    pub const STICK_VELOCITY: f32 = -2.0;

    /// Player collider defaults (standing)
    pub const PLAYER_HEIGHT: f32 = 2.0;
    pub const PLAYER_RADIUS: f32 = 0.5;
    /// Capsule radius shrink factor for precise collision checks
    pub const COLLIDER_SHRINK: f32 = 0.9;

    /// Hard cap on content emitted by one streamer in one tick
    pub const MAX_SPAWNS_PER_TICK: u32 = 50;
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(delta)
    }
}

/// Lateral (x) position of a lane's center; lanes are centered on x = 0
#[inline]
pub fn lane_to_x(lane: usize, lane_count: usize, lane_offset: f32) -> f32 {
    let half = (lane_count.max(1) - 1) as f32 * 0.5;
    (lane as f32 - half) * lane_offset
}
