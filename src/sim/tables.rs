//! Spawn tables: obstacle types, obstacle patterns and spawnable items
//!
//! Pure data plus the cumulative-weight selection used by every spawner.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Collectible item types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Flat score bonus
    Coin,
    /// Attraction hook (no gameplay effect yet)
    Magnet,
    Invincible,
    SpeedBoost,
    /// Timed flight at a fixed altitude
    Rocket,
    Slowdown,
}

/// A discrete obstacle type with its spawn rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleType {
    pub name: String,
    /// Width (x), height (y), depth (z)
    pub size: Vec3,
    /// Height of the obstacle's underside above the track (0 = standing on it)
    #[serde(default)]
    pub elevation: f32,
    /// Lanes this type may occupy
    pub allowed_lanes: Vec<usize>,
    #[serde(default)]
    pub can_slide_under: bool,
    #[serde(default = "default_true")]
    pub can_jump_over: bool,
    #[serde(default = "default_weight")]
    pub spawn_weight: f32,
}

/// One obstacle inside a pattern, relative to the pattern start
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PatternEntry {
    pub relative_z: f32,
    pub lane: usize,
    /// Index into the obstacle type table
    pub type_index: usize,
}

/// A pre-authored group of obstacles spawned atomically
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstaclePattern {
    pub name: String,
    /// Forward distance the pattern consumes
    pub length: f32,
    pub entries: Vec<PatternEntry>,
    #[serde(default = "default_weight")]
    pub spawn_weight: f32,
    /// Virtual distance window in which the pattern may appear
    #[serde(default)]
    pub min_difficulty: f32,
    #[serde(default = "default_max_difficulty")]
    pub max_difficulty: f32,
}

impl ObstaclePattern {
    /// Whether the pattern is eligible at the given virtual distance
    pub fn in_window(&self, distance: f32) -> bool {
        distance >= self.min_difficulty && distance <= self.max_difficulty
    }
}

/// An item and its relative spawn weight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnableItem {
    pub kind: ItemKind,
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Feedback sound tag forwarded with the pickup event
    #[serde(default)]
    pub sound: Option<String>,
}

/// All weighted-choice data consumed by the world streamer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTables {
    #[serde(default)]
    pub obstacle_types: Vec<ObstacleType>,
    #[serde(default)]
    pub patterns: Vec<ObstaclePattern>,
    #[serde(default)]
    pub items: Vec<SpawnableItem>,
}

fn default_true() -> bool {
    true
}

fn default_weight() -> f32 {
    1.0
}

fn default_max_difficulty() -> f32 {
    f32::MAX
}

/// Type indices of the default table
pub const CRATE: usize = 0;
pub const HURDLE: usize = 1;
pub const WALL: usize = 2;
pub const BAR: usize = 3;

impl Default for SpawnTables {
    fn default() -> Self {
        let all_lanes = vec![0, 1, 2];
        let obstacle_types = vec![
            ObstacleType {
                name: "Crate".into(),
                size: Vec3::new(1.2, 1.0, 1.2),
                elevation: 0.0,
                allowed_lanes: all_lanes.clone(),
                can_slide_under: true,
                can_jump_over: true,
                spawn_weight: 3.0,
            },
            ObstacleType {
                name: "Hurdle".into(),
                size: Vec3::new(1.6, 0.6, 0.6),
                elevation: 0.0,
                allowed_lanes: all_lanes.clone(),
                can_slide_under: true,
                can_jump_over: true,
                spawn_weight: 2.0,
            },
            ObstacleType {
                name: "Wall".into(),
                size: Vec3::new(1.6, 2.4, 1.0),
                elevation: 0.0,
                allowed_lanes: all_lanes.clone(),
                can_slide_under: false,
                can_jump_over: false,
                spawn_weight: 1.5,
            },
            ObstacleType {
                name: "Bar".into(),
                size: Vec3::new(2.4, 2.0, 0.5),
                elevation: 1.5,
                allowed_lanes: all_lanes,
                can_slide_under: true,
                can_jump_over: false,
                spawn_weight: 1.5,
            },
        ];

        let entry = |relative_z: f32, lane: usize, type_index: usize| PatternEntry {
            relative_z,
            lane,
            type_index,
        };
        let patterns = vec![
            ObstaclePattern {
                name: "Slalom".into(),
                length: 30.0,
                entries: vec![
                    entry(0.0, 0, WALL),
                    entry(0.0, 1, WALL),
                    entry(14.0, 1, WALL),
                    entry(14.0, 2, WALL),
                ],
                spawn_weight: 2.0,
                min_difficulty: 0.0,
                max_difficulty: f32::MAX,
            },
            ObstaclePattern {
                name: "Hurdle Row".into(),
                length: 20.0,
                entries: vec![entry(0.0, 0, HURDLE), entry(0.0, 1, HURDLE), entry(0.0, 2, HURDLE)],
                spawn_weight: 1.5,
                min_difficulty: 0.0,
                max_difficulty: f32::MAX,
            },
            ObstaclePattern {
                name: "Bar Row".into(),
                length: 20.0,
                entries: vec![entry(0.0, 0, BAR), entry(0.0, 1, BAR), entry(0.0, 2, BAR)],
                spawn_weight: 1.0,
                min_difficulty: 200.0,
                max_difficulty: f32::MAX,
            },
            ObstaclePattern {
                name: "Gauntlet".into(),
                length: 36.0,
                entries: vec![
                    entry(0.0, 1, CRATE),
                    entry(0.0, 2, WALL),
                    entry(12.0, 0, BAR),
                    entry(12.0, 1, BAR),
                    entry(24.0, 0, WALL),
                    entry(24.0, 2, CRATE),
                ],
                spawn_weight: 1.0,
                min_difficulty: 500.0,
                max_difficulty: f32::MAX,
            },
        ];

        let item = |kind: ItemKind, weight: f32, sound: &str| SpawnableItem {
            kind,
            weight,
            sound: Some(sound.to_string()),
        };
        let items = vec![
            item(ItemKind::Coin, 60.0, "coin"),
            item(ItemKind::SpeedBoost, 10.0, "boost"),
            item(ItemKind::Slowdown, 8.0, "slowdown"),
            item(ItemKind::Invincible, 8.0, "shield"),
            item(ItemKind::Magnet, 8.0, "magnet"),
            item(ItemKind::Rocket, 6.0, "rocket"),
        ];

        Self {
            obstacle_types,
            patterns,
            items,
        }
    }
}

impl SpawnTables {
    /// Tables with nothing in them; every strategy degrades to Random
    pub fn empty() -> Self {
        Self {
            obstacle_types: Vec::new(),
            patterns: Vec::new(),
            items: Vec::new(),
        }
    }
}

/// Cumulative-weight walk: returns the first index whose running weight
/// total is >= `draw`. Negative weights count as zero. Falls back to the
/// first entry when the draw exceeds the total (float rounding).
pub fn weighted_index<I>(weights: I, draw: f32) -> Option<usize>
where
    I: IntoIterator<Item = f32>,
{
    let mut running = 0.0;
    let mut seen = false;
    for (i, w) in weights.into_iter().enumerate() {
        seen = true;
        running += w.max(0.0);
        if draw <= running {
            return Some(i);
        }
    }
    seen.then_some(0)
}

/// Pick an entry by weight: draw uniformly in `[0, total)` and walk the
/// cumulative sums.
pub fn pick_weighted<'a, T, R, F>(rng: &mut R, entries: &'a [T], weight: F) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f32,
{
    if entries.is_empty() {
        return None;
    }
    let total: f32 = entries.iter().map(|e| weight(e).max(0.0)).sum();
    let draw = rng.random::<f32>() * total;
    weighted_index(entries.iter().map(&weight), draw).map(|i| &entries[i])
}

/// Uniform float in `[lo, hi)`; returns `lo` for empty or inverted ranges
pub fn roll_range<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

/// Uniform lane index in `[0, lane_count)`
pub fn roll_lane<R: Rng + ?Sized>(rng: &mut R, lane_count: usize) -> usize {
    if lane_count <= 1 {
        0
    } else {
        rng.random_range(0..lane_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_weighted_index_walks_cumulative_sums() {
        let weights = [1.0, 1.0, 2.0];
        assert_eq!(weighted_index(weights, 0.0), Some(0));
        assert_eq!(weighted_index(weights, 1.0), Some(0));
        assert_eq!(weighted_index(weights, 1.5), Some(1));
        assert_eq!(weighted_index(weights, 2.0), Some(1));
        assert_eq!(weighted_index(weights, 2.01), Some(2));
        assert_eq!(weighted_index(weights, 4.0), Some(2));
        // Past the total (rounding) falls back to the first entry
        assert_eq!(weighted_index(weights, 4.5), Some(0));
        assert_eq!(weighted_index(std::iter::empty::<f32>(), 0.5), None);
    }

    #[test]
    fn test_weighted_selection_is_reproducible_under_fixed_rng() {
        let weights = [1.0_f32, 1.0, 2.0];

        let mut rng = Pcg32::seed_from_u64(42);
        let picks: Vec<usize> = (0..4)
            .map(|_| {
                let w = pick_weighted(&mut rng, &weights, |w| *w).unwrap();
                weights.iter().position(|x| std::ptr::eq(x, w)).unwrap()
            })
            .collect();

        // Replay the same raw draws and walk the cumulative weights by hand
        let mut replay = Pcg32::seed_from_u64(42);
        let draws: Vec<f32> = (0..4).map(|_| replay.random::<f32>() * 4.0).collect();
        let fourth = draws[3];
        let expected = if fourth <= 1.0 {
            0
        } else if fourth <= 2.0 {
            1
        } else {
            2
        };
        assert_eq!(picks[3], expected);

        // And a second run with the same seed agrees on every pick
        let mut again = Pcg32::seed_from_u64(42);
        for &pick in &picks {
            let w = pick_weighted(&mut again, &weights, |w| *w).unwrap();
            assert_eq!(weights.iter().position(|x| std::ptr::eq(x, w)).unwrap(), pick);
        }
    }

    #[test]
    fn test_zero_weight_entries_are_never_picked() {
        let weights = [0.0_f32, 5.0, 0.0];
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let w = pick_weighted(&mut rng, &weights, |w| *w).unwrap();
            assert_eq!(*w, 5.0);
        }
    }

    #[test]
    fn test_roll_range_handles_degenerate_ranges() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(roll_range(&mut rng, 3.0, 3.0), 3.0);
        assert_eq!(roll_range(&mut rng, 5.0, 2.0), 5.0);
        let v = roll_range(&mut rng, 5.0, 10.0);
        assert!((5.0..10.0).contains(&v));
        assert_eq!(roll_lane(&mut rng, 1), 0);
    }

    #[test]
    fn test_default_tables_are_consistent() {
        let tables = SpawnTables::default();
        for pattern in &tables.patterns {
            assert!(pattern.length > 0.0);
            for entry in &pattern.entries {
                assert!(entry.type_index < tables.obstacle_types.len());
                assert!(entry.relative_z < pattern.length);
            }
        }
        assert!(tables.patterns[0].in_window(0.0));
        assert!(!tables.patterns[2].in_window(100.0));
    }
}
