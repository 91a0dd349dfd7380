//! Obstacle streaming
//!
//! Spawn strategies are pure functions of (spawn offset, virtual distance,
//! tuning, RNG) returning a [`SpawnPlan`]; the streamer turns plans into
//! obstacles, advances its cursor, and recycles what fell behind.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::items::ItemStreamer;
use super::state::GameEvent;
use super::tables::{ObstacleType, pick_weighted, roll_lane, roll_range};
use super::world::EntityIds;
use crate::consts::MAX_SPAWNS_PER_TICK;
use crate::lane_to_x;
use crate::tuning::Tuning;

/// Obstacle spawn strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnMode {
    /// Sampled sizes, uniform lane
    Random,
    /// Weighted choice from the obstacle type table
    TypeBased,
    /// Weighted choice from patterns eligible at the current distance
    PatternBased,
    /// Per event: pattern with `pattern_spawn_chance`, otherwise type-based
    #[default]
    Mixed,
}

/// How the Random strategy shapes its obstacles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RandomProfile {
    /// 40% low block, 30% high block, 30% overhead bar
    #[default]
    Split,
    /// Height and width sampled from the configured ranges
    Uniform,
}

/// Slideability classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleClass {
    /// Short enough to jump over (or slide through)
    Low,
    /// Must be avoided by changing lanes
    High,
    /// Elevated bar, only passable by sliding under it
    HighSlidable,
}

impl ObstacleClass {
    pub fn classify(height: f32, elevation: f32, max_slideable_height: f32) -> Self {
        if elevation > 0.0 {
            ObstacleClass::HighSlidable
        } else if height <= max_slideable_height {
            ObstacleClass::Low
        } else {
            ObstacleClass::High
        }
    }
}

/// A spawned obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Virtual-distance offset of the obstacle's center
    pub z: f32,
    pub lane: usize,
    /// Lateral center
    pub x: f32,
    /// Underside height above the track
    pub base_y: f32,
    /// Width, height, depth
    pub size: Vec3,
    pub class: ObstacleClass,
    pub type_index: Option<usize>,
    /// Set once this obstacle has killed the player
    #[serde(default)]
    pub spent: bool,
}

impl Obstacle {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_base(self.x, self.base_y, self.z, self.size)
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Nearest face toward the player
    #[inline]
    pub fn front_z(&self) -> f32 {
        self.z - self.size.z * 0.5
    }

    #[inline]
    pub fn back_z(&self) -> f32 {
        self.z + self.size.z * 0.5
    }
}

/// Obstacle descriptor produced by a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub z: f32,
    pub lane: usize,
    pub base_y: f32,
    pub size: Vec3,
    pub class: ObstacleClass,
    pub type_index: Option<usize>,
}

/// How the spawn cursor moves after a plan is emitted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Advance {
    /// Roll the regular gap range
    Roll,
    /// Jump the cursor to an absolute offset (patterns)
    To(f32),
}

/// Output of one spawn event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPlan {
    pub obstacles: Vec<ObstacleSpec>,
    pub advance: Advance,
    /// Strategy that actually produced the plan after fallbacks
    pub strategy: SpawnMode,
}

/// Plan one spawn event at offset `z`
pub fn plan_spawn<R: Rng + ?Sized>(
    mode: SpawnMode,
    z: f32,
    distance: f32,
    tuning: &Tuning,
    rng: &mut R,
) -> SpawnPlan {
    match mode {
        SpawnMode::Random => plan_random(z, tuning, rng),
        SpawnMode::TypeBased => plan_typed(z, tuning, rng),
        SpawnMode::PatternBased => plan_pattern(z, distance, tuning, rng),
        SpawnMode::Mixed => {
            if rng.random::<f32>() < tuning.obstacles.pattern_spawn_chance {
                plan_pattern(z, distance, tuning, rng)
            } else {
                plan_typed(z, tuning, rng)
            }
        }
    }
}

fn plan_random<R: Rng + ?Sized>(z: f32, tuning: &Tuning, rng: &mut R) -> SpawnPlan {
    let o = &tuning.obstacles;
    let lane = roll_lane(rng, tuning.lanes.count);

    let (size, base_y) = match o.random_profile {
        RandomProfile::Split => {
            let roll = rng.random::<f32>();
            if roll < 0.4 {
                let height = roll_range(rng, o.low_min_height, o.max_slideable_height);
                let width = roll_range(rng, o.min_width, o.max_width);
                (Vec3::new(width, height, width), 0.0)
            } else if roll < 0.7 {
                let height = roll_range(rng, o.max_slideable_height + 0.2, o.max_height);
                let width = roll_range(rng, o.min_width, o.max_width);
                (Vec3::new(width, height, width), 0.0)
            } else {
                let size = Vec3::new(
                    tuning.lanes.offset * o.bar_width_factor,
                    o.bar_height,
                    o.bar_depth,
                );
                (size, (o.bar_center_y - o.bar_height * 0.5).max(0.0))
            }
        }
        RandomProfile::Uniform => {
            let height = roll_range(rng, o.min_height, o.max_height);
            let width = roll_range(rng, o.min_width, o.max_width);
            (Vec3::new(width, height, width), 0.0)
        }
    };

    SpawnPlan {
        obstacles: vec![ObstacleSpec {
            z,
            lane,
            base_y,
            size,
            class: ObstacleClass::classify(size.y, base_y, o.max_slideable_height),
            type_index: None,
        }],
        advance: Advance::Roll,
        strategy: SpawnMode::Random,
    }
}

fn spec_from_type(
    z: f32,
    lane: usize,
    index: usize,
    kind: &ObstacleType,
    tuning: &Tuning,
) -> ObstacleSpec {
    ObstacleSpec {
        z,
        lane,
        base_y: kind.elevation.max(0.0),
        size: kind.size,
        class: ObstacleClass::classify(
            kind.size.y,
            kind.elevation,
            tuning.obstacles.max_slideable_height,
        ),
        type_index: Some(index),
    }
}

fn plan_typed<R: Rng + ?Sized>(z: f32, tuning: &Tuning, rng: &mut R) -> SpawnPlan {
    let types = &tuning.tables.obstacle_types;
    let Some(kind) = pick_weighted(rng, types, |t| t.spawn_weight) else {
        return plan_random(z, tuning, rng);
    };
    let index = types
        .iter()
        .position(|t| std::ptr::eq(t, kind))
        .unwrap_or_default();

    let lanes: Vec<usize> = kind
        .allowed_lanes
        .iter()
        .copied()
        .filter(|&l| l < tuning.lanes.count)
        .collect();
    let lane = if lanes.is_empty() {
        roll_lane(rng, tuning.lanes.count)
    } else {
        lanes[roll_lane(rng, lanes.len())]
    };

    SpawnPlan {
        obstacles: vec![spec_from_type(z, lane, index, kind, tuning)],
        advance: Advance::Roll,
        strategy: SpawnMode::TypeBased,
    }
}

fn plan_pattern<R: Rng + ?Sized>(z: f32, distance: f32, tuning: &Tuning, rng: &mut R) -> SpawnPlan {
    let eligible: Vec<_> = tuning
        .tables
        .patterns
        .iter()
        .filter(|p| p.in_window(distance))
        .collect();
    let Some(pattern) = pick_weighted(rng, &eligible, |p| p.spawn_weight) else {
        return plan_typed(z, tuning, rng);
    };

    let max_lane = tuning.lanes.count.saturating_sub(1);
    let obstacles = pattern
        .entries
        .iter()
        .map(|entry| {
            let lane = entry.lane.min(max_lane);
            let at = z + entry.relative_z;
            match tuning.tables.obstacle_types.get(entry.type_index) {
                Some(kind) => spec_from_type(at, lane, entry.type_index, kind, tuning),
                None => ObstacleSpec {
                    z: at,
                    lane,
                    base_y: 0.0,
                    size: Vec3::ONE,
                    class: ObstacleClass::Low,
                    type_index: None,
                },
            }
        })
        .collect();

    log::debug!("pattern '{}' at {:.1}", pattern.name, z);
    SpawnPlan {
        obstacles,
        advance: Advance::To(z + pattern.length),
        strategy: SpawnMode::PatternBased,
    }
}

/// Obstacle sub-streamer: owns the obstacle list and the shared content cursor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleStreamer {
    pub obstacles: Vec<Obstacle>,
    pub next_spawn_offset: f32,
}

impl ObstacleStreamer {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            obstacles: Vec::new(),
            next_spawn_offset: tuning.obstacles.first_spawn_offset,
        }
    }

    /// Fill the window ahead of `distance`. Each spawn event is either an
    /// item (handed to the item streamer) or an obstacle plan.
    /// Returns the number of spawn events run.
    pub fn maintain<R: Rng + ?Sized>(
        &mut self,
        distance: f32,
        tuning: &Tuning,
        rng: &mut R,
        ids: &mut EntityIds,
        items: &mut ItemStreamer,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        let o = &tuning.obstacles;
        let target = distance + o.spawn_ahead_distance;
        let mut spawned = 0;

        while self.next_spawn_offset < target && spawned < MAX_SPAWNS_PER_TICK {
            let z = self.next_spawn_offset;
            let item_slot = !tuning.tables.items.is_empty()
                && rng.random::<f32>() < tuning.items.spawn_chance;

            let advance = if item_slot {
                items.spawn_at(z, tuning, rng, ids, events);
                Advance::Roll
            } else {
                let plan = plan_spawn(o.mode, z, distance, tuning, rng);
                for spec in plan.obstacles {
                    self.push(spec, tuning, ids);
                }
                plan.advance
            };

            self.next_spawn_offset = match advance {
                Advance::To(next) if next > z => next,
                _ => z + roll_range(rng, o.min_gap, o.max_gap),
            };
            spawned += 1;
        }

        spawned
    }

    fn push(&mut self, spec: ObstacleSpec, tuning: &Tuning, ids: &mut EntityIds) {
        let obstacle = Obstacle {
            id: ids.next(),
            z: spec.z,
            lane: spec.lane,
            x: lane_to_x(spec.lane, tuning.lanes.count, tuning.lanes.offset),
            base_y: spec.base_y,
            size: spec.size,
            class: spec.class,
            type_index: spec.type_index,
            spent: false,
        };
        log::debug!(
            "obstacle {} lane {} at {:.1} ({:?}, h={:.2})",
            obstacle.id,
            obstacle.lane,
            obstacle.z,
            obstacle.class,
            obstacle.height()
        );
        self.obstacles.push(obstacle);
    }

    /// Drop obstacles more than `behind` units behind `distance`
    pub fn recycle(&mut self, distance: f32, behind: f32) -> usize {
        let before = self.obstacles.len();
        let min_z = distance - behind;
        self.obstacles.retain(|o| o.z >= min_z);
        before - self.obstacles.len()
    }

    pub fn mark_spent(&mut self, id: u32) {
        if let Some(o) = self.obstacles.iter_mut().find(|o| o.id == id) {
            o.spent = true;
        }
    }

    /// Obstacles that can still collide
    pub fn live(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter().filter(|o| !o.spent)
    }
}
