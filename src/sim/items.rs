//! Collectible items: spawned into obstacle slots, picked up on contact

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Capsule;
use super::state::GameEvent;
use super::tables::{ItemKind, pick_weighted, roll_lane};
use super::world::EntityIds;
use crate::lane_to_x;
use crate::tuning::Tuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub lane: usize,
    pub position: Vec3,
    /// Feedback tag carried into the pickup event
    #[serde(default)]
    pub sound: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemStreamer {
    pub items: Vec<Item>,
}

impl ItemStreamer {
    /// Place one weighted-random item at offset `z`. Returns its id, or
    /// `None` when the item table is empty.
    pub fn spawn_at<R: Rng + ?Sized>(
        &mut self,
        z: f32,
        tuning: &Tuning,
        rng: &mut R,
        ids: &mut EntityIds,
        events: &mut Vec<GameEvent>,
    ) -> Option<u32> {
        let entry = pick_weighted(rng, &tuning.tables.items, |i| i.weight)?;
        let lane = roll_lane(rng, tuning.lanes.count);
        let item = Item {
            id: ids.next(),
            kind: entry.kind,
            lane,
            position: Vec3::new(
                lane_to_x(lane, tuning.lanes.count, tuning.lanes.offset),
                tuning.items.item_height,
                z,
            ),
            sound: entry.sound.clone(),
        };
        log::debug!("item {} {:?} lane {} at {:.1}", item.id, item.kind, lane, z);
        events.push(GameEvent::ItemSpawned {
            id: item.id,
            kind: item.kind,
            lane,
        });
        let id = item.id;
        self.items.push(item);
        Some(id)
    }

    /// Remove and return every item whose pickup sphere touches `capsule`
    pub fn collect(&mut self, capsule: &Capsule, pickup_radius: f32) -> Vec<Item> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| capsule.overlaps_sphere(item.position, pickup_radius));
        self.items = kept;
        taken
    }

    pub fn recycle(&mut self, distance: f32, behind: f32) -> usize {
        let before = self.items.len();
        let min_z = distance - behind;
        self.items.retain(|i| i.position.z >= min_z);
        before - self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tables::{SpawnTables, SpawnableItem};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_uses_item_table() {
        let mut tuning = Tuning::default();
        tuning.tables.items = vec![SpawnableItem {
            kind: ItemKind::Rocket,
            weight: 1.0,
            sound: Some("rocket".into()),
        }];
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ids = EntityIds::default();
        let mut events = Vec::new();
        let mut streamer = ItemStreamer::default();

        let id = streamer.spawn_at(42.0, &tuning, &mut rng, &mut ids, &mut events);
        assert!(id.is_some());
        let item = &streamer.items[0];
        assert_eq!(item.kind, ItemKind::Rocket);
        assert_eq!(item.position.z, 42.0);
        assert_eq!(item.position.y, 1.0);
        assert_eq!(item.sound.as_deref(), Some("rocket"));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_empty_table_spawns_nothing() {
        let mut tuning = Tuning::default();
        tuning.tables = SpawnTables::empty();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut streamer = ItemStreamer::default();
        let id = streamer.spawn_at(0.0, &tuning, &mut rng, &mut EntityIds::default(), &mut Vec::new());
        assert_eq!(id, None);
        assert!(streamer.items.is_empty());
    }

    #[test]
    fn test_collect_removes_touched_items_only() {
        let mut streamer = ItemStreamer::default();
        for (id, x, z) in [(1, 0.0, 10.0), (2, 2.0, 10.0), (3, 0.0, 20.0)] {
            streamer.items.push(Item {
                id,
                kind: ItemKind::Coin,
                lane: 1,
                position: Vec3::new(x, 1.0, z),
                sound: None,
            });
        }
        let capsule = Capsule::upright(Vec3::new(0.0, 0.0, 10.0), 2.0, 0.45);
        let taken = streamer.collect(&capsule, 0.6);
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].id, 1);
        assert_eq!(streamer.items.len(), 2);
    }
}
