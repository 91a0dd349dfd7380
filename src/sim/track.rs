//! Track segment streaming with optional gaps

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::GameEvent;
use super::tables::roll_range;
use super::world::EntityIds;
use crate::consts::MAX_SPAWNS_PER_TICK;
use crate::tuning::TrackTuning;

/// A span of ground `[z, z + length)`, or a deliberate hole in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    pub id: u32,
    pub z: f32,
    pub length: f32,
    pub is_gap: bool,
}

impl TrackSegment {
    #[inline]
    pub fn end(&self) -> f32 {
        self.z + self.length
    }

    #[inline]
    pub fn contains(&self, z: f32) -> bool {
        z >= self.z && z <= self.end()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackStreamer {
    pub segments: Vec<TrackSegment>,
    pub next_spawn_offset: f32,
    /// Solid segments placed since the last gap
    pub segments_since_gap: u32,
}

impl TrackStreamer {
    pub fn new(params: &TrackTuning) -> Self {
        Self {
            segments: Vec::new(),
            next_spawn_offset: -params.segment_length * params.initial_segments_behind as f32,
            segments_since_gap: 0,
        }
    }

    /// Extend the ribbon to `distance + spawn_ahead_distance`.
    /// Returns the number of segments and gaps placed.
    pub fn maintain<R: Rng + ?Sized>(
        &mut self,
        distance: f32,
        params: &TrackTuning,
        rng: &mut R,
        ids: &mut EntityIds,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        let target = distance + params.spawn_ahead_distance;
        let mut placed = 0;

        while self.next_spawn_offset < target && placed < MAX_SPAWNS_PER_TICK {
            let z = self.next_spawn_offset;
            if self.gap_allowed(z, distance, params) && rng.random::<f32>() < params.gap_chance {
                let length = roll_range(rng, params.min_gap_length, params.max_gap_length);
                let id = ids.next();
                self.segments.push(TrackSegment {
                    id,
                    z,
                    length,
                    is_gap: true,
                });
                log::info!("gap {} at {:.1} length {:.1}", id, z, length);
                events.push(GameEvent::GapCreated { start: z, length });
                self.segments_since_gap = 0;
                self.next_spawn_offset = z + length;
            } else {
                self.segments.push(TrackSegment {
                    id: ids.next(),
                    z,
                    length: params.segment_length,
                    is_gap: false,
                });
                self.segments_since_gap = self.segments_since_gap.saturating_add(1);
                self.next_spawn_offset = z + params.segment_length;
            }
            placed += 1;
        }

        placed
    }

    fn gap_allowed(&self, z: f32, distance: f32, params: &TrackTuning) -> bool {
        params.enable_gaps
            && z >= distance + params.gap_safe_zone_distance
            && self.segments_since_gap >= params.min_segments_between_gaps
    }

    /// Whether solid ground exists under offset `z`
    pub fn is_solid_at(&self, z: f32) -> bool {
        self.segments.iter().any(|s| !s.is_gap && s.contains(z))
    }

    /// The first gap that starts at or after `z`, if streamed
    pub fn next_gap_after(&self, z: f32) -> Option<&TrackSegment> {
        self.segments
            .iter()
            .filter(|s| s.is_gap && s.end() > z)
            .min_by(|a, b| a.z.total_cmp(&b.z))
    }

    pub fn recycle(&mut self, distance: f32, behind: f32) -> usize {
        let before = self.segments.len();
        let min_z = distance - behind;
        self.segments.retain(|s| s.z >= min_z);
        before - self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    fn gappy() -> TrackTuning {
        TrackTuning {
            enable_gaps: true,
            gap_chance: 0.5,
            ..TrackTuning::default()
        }
    }

    #[test]
    fn test_initial_ribbon_is_contiguous_and_solid() {
        let params = TrackTuning::default();
        let mut track = TrackStreamer::new(&params);
        let mut rng = Pcg32::seed_from_u64(0);
        track.maintain(0.0, &params, &mut rng, &mut EntityIds::default(), &mut Vec::new());

        assert_eq!(track.segments[0].z, -50.0);
        assert!(track.next_spawn_offset >= 100.0);
        assert!(track.segments.windows(2).all(|w| w[0].end() == w[1].z));
        assert!(track.segments.iter().all(|s| !s.is_gap));
        assert!(track.is_solid_at(0.0));
        assert!(track.is_solid_at(99.0));
    }

    #[test]
    fn test_gaps_leave_holes_in_the_ground() {
        let params = gappy();
        let mut track = TrackStreamer::new(&params);
        let mut rng = Pcg32::seed_from_u64(12);
        let mut events = Vec::new();
        for step in 0..40 {
            track.maintain(step as f32 * 25.0, &params, &mut rng, &mut EntityIds::default(), &mut events);
        }
        let gap = track
            .segments
            .iter()
            .find(|s| s.is_gap)
            .cloned()
            .expect("a gap at 50% chance");
        assert!(!track.is_solid_at(gap.z + gap.length * 0.5));
        assert!(gap.length >= params.min_gap_length && gap.length <= params.max_gap_length);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GapCreated { .. })));
        assert!(track.next_gap_after(gap.z - 1.0).is_some());
    }

    #[test]
    fn test_disabled_gaps_never_roll() {
        let params = TrackTuning::default();
        let mut track = TrackStreamer::new(&params);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut untouched = Pcg32::seed_from_u64(1);
        track.maintain(0.0, &params, &mut rng, &mut EntityIds::default(), &mut Vec::new());
        assert_eq!(rng.random::<u32>(), untouched.random::<u32>());
    }

    #[test]
    fn test_recycle_drops_segments_behind() {
        let params = TrackTuning::default();
        let mut track = TrackStreamer::new(&params);
        let mut rng = Pcg32::seed_from_u64(0);
        track.maintain(0.0, &params, &mut rng, &mut EntityIds::default(), &mut Vec::new());
        let removed = track.recycle(10.0, params.despawn_behind_distance);
        // Segments starting at -50 and -45 fall behind 10 - 50
        assert_eq!(removed, 2);
        assert!(track.segments.iter().all(|s| s.z >= -40.0));
    }

    proptest! {
        #[test]
        fn prop_gaps_respect_safe_zone_and_spacing(
            seed in any::<u64>(),
            chance in 0.0f32..=1.0,
            min_between in 0u32..5,
            safe_zone in 0.0f32..80.0,
            speed in 1.0f32..40.0,
        ) {
            let params = TrackTuning {
                enable_gaps: true,
                gap_chance: chance,
                min_segments_between_gaps: min_between,
                gap_safe_zone_distance: safe_zone,
                ..TrackTuning::default()
            };
            let mut track = TrackStreamer::new(&params);
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut ids = EntityIds::default();
            let mut distance = 0.0;
            for _ in 0..60 {
                let mut events = Vec::new();
                track.maintain(distance, &params, &mut rng, &mut ids, &mut events);
                for e in &events {
                    if let GameEvent::GapCreated { start, .. } = e {
                        prop_assert!(*start >= distance + safe_zone);
                    }
                }
                distance += speed * 0.25;
            }

            let mut solid_run = u32::MAX;
            for s in &track.segments {
                if s.is_gap {
                    prop_assert!(solid_run >= min_between);
                    solid_run = 0;
                } else {
                    solid_run = solid_run.saturating_add(1);
                }
            }
        }
    }
}
