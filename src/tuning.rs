//! Data-driven game balance
//!
//! Every tunable lives here so hosts can ship JSON overrides without a
//! rebuild. All fields default, so partial documents load. Values that
//! would break the simulation are clamped by [`Tuning::sanitized`]
//! instead of rejected.

use serde::{Deserialize, Serialize};

use crate::sim::obstacles::{RandomProfile, SpawnMode};
use crate::sim::tables::SpawnTables;

/// Lane layout shared by the player and every spawner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneTuning {
    pub count: usize,
    /// Lateral distance between lane centers
    pub offset: f32,
}

impl Default for LaneTuning {
    fn default() -> Self {
        Self {
            count: 3,
            offset: 2.0,
        }
    }
}

/// Player kinematics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Lane the player starts in (clamped to the lane count)
    pub start_lane: usize,
    pub forward_speed: f32,
    pub max_speed: f32,
    /// Forward speed gained per second
    pub speed_increase_rate: f32,
    /// Maximum lateral speed while changing lanes
    pub lane_change_speed: f32,
    /// Falling below this height is fatal
    pub death_height: f32,

    pub jump_height: f32,
    /// Vertical acceleration (negative = down)
    pub gravity: f32,
    pub max_air_jumps: u32,
    pub air_jump_height_multiplier: f32,
    /// Gravity scale while gliding (0..1)
    pub glide_gravity_multiplier: f32,

    pub slide_duration: f32,
    /// Collider height scale while sliding
    pub slide_height_scale: f32,
    /// Extra clearance above the sliding collider that still counts as "slid under"
    pub slide_clearance_margin: f32,
    /// Absolute low-height cutoff that also counts as slidable (legacy rule, off by default)
    pub legacy_slide_cutoff: Option<f32>,

    pub collider_height: f32,
    pub collider_radius: f32,

    /// Altitude held while flying
    pub rocket_altitude: f32,
    /// Vertical speed while climbing or descending to the rocket altitude
    pub rocket_climb_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_lane: 1,
            forward_speed: 12.0,
            max_speed: 50.0,
            speed_increase_rate: 0.1,
            lane_change_speed: 18.0,
            death_height: -10.0,
            jump_height: 2.0,
            gravity: -24.0,
            max_air_jumps: 1,
            air_jump_height_multiplier: 1.0,
            glide_gravity_multiplier: 0.2,
            slide_duration: 0.7,
            slide_height_scale: 0.5,
            slide_clearance_margin: 0.3,
            legacy_slide_cutoff: None,
            collider_height: crate::consts::PLAYER_HEIGHT,
            collider_radius: crate::consts::PLAYER_RADIUS,
            rocket_altitude: 10.0,
            rocket_climb_speed: 30.0,
        }
    }
}

impl PlayerTuning {
    /// Collider height while sliding
    pub fn slide_height(&self) -> f32 {
        self.collider_height * self.slide_height_scale
    }

    /// Tallest obstacle that can be slid under
    pub fn slide_clearance(&self) -> f32 {
        self.slide_height() + self.slide_clearance_margin
    }
}

/// Track segment streaming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackTuning {
    pub segment_length: f32,
    pub spawn_ahead_distance: f32,
    pub despawn_behind_distance: f32,
    /// Segments laid behind the start line
    pub initial_segments_behind: u32,

    pub enable_gaps: bool,
    /// Chance per candidate slot (0..1)
    pub gap_chance: f32,
    pub min_gap_length: f32,
    pub max_gap_length: f32,
    pub min_segments_between_gaps: u32,
    /// No gap starts closer than this ahead of the player
    pub gap_safe_zone_distance: f32,
}

impl Default for TrackTuning {
    fn default() -> Self {
        Self {
            segment_length: 5.0,
            spawn_ahead_distance: 100.0,
            despawn_behind_distance: 50.0,
            initial_segments_behind: 10,
            enable_gaps: false,
            gap_chance: 0.12,
            min_gap_length: 4.0,
            max_gap_length: 7.0,
            min_segments_between_gaps: 2,
            gap_safe_zone_distance: 40.0,
        }
    }
}

/// Obstacle streaming and strategy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub mode: SpawnMode,
    pub random_profile: RandomProfile,

    pub spawn_ahead_distance: f32,
    pub despawn_behind_distance: f32,
    /// Gap rolled between spawn events
    pub min_gap: f32,
    pub max_gap: f32,
    /// Offset of the first spawn event (clear runway before it)
    pub first_spawn_offset: f32,

    pub min_height: f32,
    pub max_height: f32,
    pub min_width: f32,
    pub max_width: f32,
    /// Lowest height rolled for low obstacles
    pub low_min_height: f32,
    /// Height threshold separating low from high obstacles
    pub max_slideable_height: f32,

    /// Overhead bar dimensions (the slide-only variant)
    pub bar_height: f32,
    pub bar_center_y: f32,
    pub bar_depth: f32,
    /// Bar width as a multiple of the lane offset
    pub bar_width_factor: f32,

    /// Mixed mode: chance per spawn event to use a pattern
    pub pattern_spawn_chance: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            mode: SpawnMode::Mixed,
            random_profile: RandomProfile::Split,
            spawn_ahead_distance: 500.0,
            despawn_behind_distance: 50.0,
            min_gap: 5.0,
            max_gap: 10.0,
            first_spawn_offset: 100.0,
            min_height: 0.8,
            max_height: 2.5,
            min_width: 1.0,
            max_width: 1.8,
            low_min_height: 0.6,
            max_slideable_height: 1.3,
            bar_height: 2.0,
            bar_center_y: 2.5,
            bar_depth: 0.5,
            bar_width_factor: 1.2,
            pattern_spawn_chance: 0.3,
        }
    }
}

/// Item spawning and pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemTuning {
    /// Chance per spawn event to place an item instead of an obstacle
    pub spawn_chance: f32,
    /// Height items float above the track
    pub item_height: f32,
    pub pickup_radius: f32,
}

impl Default for ItemTuning {
    fn default() -> Self {
        Self {
            spawn_chance: 0.2,
            item_height: 1.0,
            pickup_radius: 0.6,
        }
    }
}

/// Power-up strengths and durations (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub speed_boost_multiplier: f32,
    pub speed_boost_duration: f32,
    pub slowdown_multiplier: f32,
    pub slowdown_duration: f32,
    pub invincible_duration: f32,
    pub rocket_duration: f32,
    /// Score bonus per coin
    pub coin_bonus: u64,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            speed_boost_multiplier: 1.5,
            speed_boost_duration: 5.0,
            slowdown_multiplier: 0.5,
            slowdown_duration: 5.0,
            invincible_duration: 5.0,
            rocket_duration: 5.0,
            coin_bonus: 10,
        }
    }
}

/// Session flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    /// Labels shown in order before play begins
    pub countdown_steps: Vec<String>,
    pub countdown_step_secs: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            countdown_steps: ["3", "2", "1", "Go!"].map(String::from).to_vec(),
            countdown_step_secs: 1.0,
        }
    }
}

/// Complete tuning document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub lanes: LaneTuning,
    pub player: PlayerTuning,
    pub track: TrackTuning,
    pub obstacles: ObstacleTuning,
    pub items: ItemTuning,
    pub power_ups: PowerUpTuning,
    pub session: SessionTuning,
    pub tables: SpawnTables,
}

fn clamp_min(name: &str, value: &mut f32, min: f32) {
    if value.is_nan() || *value < min {
        log::warn!("tuning: {} = {} clamped to {}", name, value, min);
        *value = min;
    }
}

fn clamp_unit(name: &str, value: &mut f32) {
    if value.is_nan() || !(0.0..=1.0).contains(&*value) {
        let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        log::warn!("tuning: {} = {} clamped to {}", name, value, clamped);
        *value = clamped;
    }
}

fn order_range(name: &str, lo: &mut f32, hi: &mut f32) {
    if *lo > *hi {
        log::warn!("tuning: {} range {}..{} swapped", name, lo, hi);
        std::mem::swap(lo, hi);
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Copy with every value clamped into its safe range
    pub fn sanitized(mut self) -> Self {
        if self.lanes.count == 0 {
            log::warn!("tuning: lanes.count = 0 clamped to 1");
            self.lanes.count = 1;
        }
        clamp_min("lanes.offset", &mut self.lanes.offset, 0.0);

        let p = &mut self.player;
        if p.start_lane >= self.lanes.count {
            log::warn!("tuning: player.start_lane = {} clamped", p.start_lane);
            p.start_lane = self.lanes.count - 1;
        }
        clamp_min("player.forward_speed", &mut p.forward_speed, 0.0);
        clamp_min("player.max_speed", &mut p.max_speed, p.forward_speed);
        clamp_min("player.speed_increase_rate", &mut p.speed_increase_rate, 0.0);
        clamp_min("player.lane_change_speed", &mut p.lane_change_speed, 0.0);
        clamp_min("player.jump_height", &mut p.jump_height, 0.0);
        if p.gravity.is_nan() || p.gravity > 0.0 {
            log::warn!("tuning: player.gravity = {} must point down, negated", p.gravity);
            p.gravity = if p.gravity.is_nan() { -24.0 } else { -p.gravity };
        }
        clamp_min("player.air_jump_height_multiplier", &mut p.air_jump_height_multiplier, 0.0);
        clamp_unit("player.glide_gravity_multiplier", &mut p.glide_gravity_multiplier);
        clamp_min("player.slide_duration", &mut p.slide_duration, 0.0);
        if p.slide_height_scale.is_nan() || p.slide_height_scale <= 0.0 {
            log::warn!("tuning: player.slide_height_scale = {} reset to 0.5", p.slide_height_scale);
            p.slide_height_scale = 0.5;
        }
        clamp_min("player.slide_clearance_margin", &mut p.slide_clearance_margin, 0.0);
        clamp_min("player.collider_height", &mut p.collider_height, 0.1);
        clamp_min("player.collider_radius", &mut p.collider_radius, 0.01);
        clamp_min("player.rocket_climb_speed", &mut p.rocket_climb_speed, 0.0);

        let t = &mut self.track;
        clamp_min("track.segment_length", &mut t.segment_length, 0.1);
        clamp_min("track.spawn_ahead_distance", &mut t.spawn_ahead_distance, 0.0);
        clamp_min("track.despawn_behind_distance", &mut t.despawn_behind_distance, 0.0);
        clamp_unit("track.gap_chance", &mut t.gap_chance);
        clamp_min("track.min_gap_length", &mut t.min_gap_length, 0.1);
        clamp_min("track.max_gap_length", &mut t.max_gap_length, 0.1);
        order_range("track.gap_length", &mut t.min_gap_length, &mut t.max_gap_length);
        clamp_min("track.gap_safe_zone_distance", &mut t.gap_safe_zone_distance, 0.0);

        let o = &mut self.obstacles;
        clamp_min("obstacles.spawn_ahead_distance", &mut o.spawn_ahead_distance, 0.0);
        clamp_min("obstacles.despawn_behind_distance", &mut o.despawn_behind_distance, 0.0);
        clamp_min("obstacles.min_gap", &mut o.min_gap, 0.1);
        clamp_min("obstacles.max_gap", &mut o.max_gap, 0.1);
        order_range("obstacles.gap", &mut o.min_gap, &mut o.max_gap);
        clamp_min("obstacles.min_height", &mut o.min_height, 0.01);
        order_range("obstacles.height", &mut o.min_height, &mut o.max_height);
        clamp_min("obstacles.min_width", &mut o.min_width, 0.01);
        order_range("obstacles.width", &mut o.min_width, &mut o.max_width);
        clamp_unit("obstacles.pattern_spawn_chance", &mut o.pattern_spawn_chance);

        clamp_unit("items.spawn_chance", &mut self.items.spawn_chance);
        clamp_min("items.pickup_radius", &mut self.items.pickup_radius, 0.0);

        let u = &mut self.power_ups;
        clamp_min("power_ups.speed_boost_multiplier", &mut u.speed_boost_multiplier, 0.0);
        clamp_min("power_ups.slowdown_multiplier", &mut u.slowdown_multiplier, 0.0);
        clamp_min("power_ups.speed_boost_duration", &mut u.speed_boost_duration, 0.0);
        clamp_min("power_ups.slowdown_duration", &mut u.slowdown_duration, 0.0);
        clamp_min("power_ups.invincible_duration", &mut u.invincible_duration, 0.0);
        clamp_min("power_ups.rocket_duration", &mut u.rocket_duration, 0.0);

        clamp_min("session.countdown_step_secs", &mut self.session.countdown_step_secs, 0.0);

        self
    }
}
