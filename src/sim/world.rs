//! World streamer: track, obstacles and items driven by one distance clock

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::items::ItemStreamer;
use super::obstacles::ObstacleStreamer;
use super::state::GameEvent;
use super::track::TrackStreamer;
use crate::tuning::Tuning;

/// Monotonic id source shared by every spawned entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl EntityIds {
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Per-tick streaming counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub segments: u32,
    pub spawn_events: u32,
    pub recycled: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub track: TrackStreamer,
    pub obstacles: ObstacleStreamer,
    pub items: ItemStreamer,
    pub ids: EntityIds,
}

impl World {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            track: TrackStreamer::new(&tuning.track),
            obstacles: ObstacleStreamer::new(tuning),
            items: ItemStreamer::default(),
            ids: EntityIds::default(),
        }
    }

    /// Spawn ahead of and recycle behind `distance`
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        distance: f32,
        tuning: &Tuning,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) -> StreamStats {
        let segments = self
            .track
            .maintain(distance, &tuning.track, rng, &mut self.ids, events);
        let spawn_events = self.obstacles.maintain(
            distance,
            tuning,
            rng,
            &mut self.ids,
            &mut self.items,
            events,
        );

        let behind = tuning.obstacles.despawn_behind_distance;
        let recycled = self.track.recycle(distance, tuning.track.despawn_behind_distance)
            + self.obstacles.recycle(distance, behind)
            + self.items.recycle(distance, behind);

        StreamStats {
            segments,
            spawn_events,
            recycled,
        }
    }
}
