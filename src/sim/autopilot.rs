//! Autopilot: plays the game through ordinary input events
//!
//! Looks at the nearest obstacle in the current lane and either dodges to
//! a free neighbouring lane, slides under a bar, or jumps. Also hops gaps.

use super::obstacles::{Obstacle, ObstacleClass};
use super::player::InputEvent;
use super::session::GamePhase;
use super::state::GameState;
use super::tick::TickInput;

/// Seconds of travel the autopilot looks ahead
const LOOKAHEAD_SECS: f32 = 0.9;
/// Time to contact at which to start a slide
const SLIDE_TTC: f32 = 0.25;
/// Time to contact at which to jump
const JUMP_TTC: f32 = 0.22;
/// Seconds ahead of a gap edge at which to jump
const GAP_TTC: f32 = 0.2;

/// Inputs the autopilot would give for the next tick
pub fn plan(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    match state.phase() {
        GamePhase::Ready => input.start = true,
        GamePhase::Playing if state.player.alive => input.events = steer(state),
        _ => {}
    }
    input
}

fn steer(state: &GameState) -> Vec<InputEvent> {
    let player = &state.player;
    let z = state.session.distance as f32;
    let speed = player.current_speed().max(1.0);
    let reach = player.params.collider_radius;
    let lookahead = speed * LOOKAHEAD_SECS + reach;

    let mut events = Vec::new();

    if let Some(threat) = nearest_in_lane(state, player.lane, z, lookahead) {
        let settled = (player.x - player.target_x()).abs() < 0.05;
        let clear_until = threat.back_z() + speed * 0.3;

        if settled {
            if let Some(lane) = free_neighbour(state, z, clear_until) {
                events.push(if lane < player.lane {
                    InputEvent::SwipeLeft
                } else {
                    InputEvent::SwipeRight
                });
                return events;
            }
        }

        let ttc = (threat.front_z() - z - reach) / speed;
        match evasion(state, threat) {
            Evade::Slide => {
                if ttc <= SLIDE_TTC && !player.sliding && player.grounded {
                    events.push(InputEvent::SwipeDown);
                }
            }
            Evade::Jump => {
                if player.grounded && ttc <= JUMP_TTC {
                    events.push(InputEvent::SwipeUp);
                } else if !player.grounded
                    && player.air_jumps_left > 0
                    && player.vertical_velocity < 0.0
                    && player.y < threat.height()
                    && ttc <= JUMP_TTC
                {
                    events.push(InputEvent::SwipeUp);
                }
            }
        }
    }

    if events.is_empty() && player.grounded && !player.flying {
        if let Some(gap) = state.world.track.next_gap_after(z) {
            let ahead = gap.z - z;
            if ahead > 0.0 && ahead <= speed * GAP_TTC {
                events.push(InputEvent::SwipeUp);
            }
        }
    }

    events
}

enum Evade {
    Slide,
    Jump,
}

/// Typed obstacles answer with their own flags; untyped ones by class
fn evasion(state: &GameState, threat: &Obstacle) -> Evade {
    let kind = threat
        .type_index
        .and_then(|i| state.tuning.tables.obstacle_types.get(i));
    match kind {
        Some(t) if t.can_slide_under && !t.can_jump_over => Evade::Slide,
        Some(t) if t.can_jump_over && !t.can_slide_under => Evade::Jump,
        _ if threat.class == ObstacleClass::HighSlidable => Evade::Slide,
        _ => Evade::Jump,
    }
}

fn nearest_in_lane(state: &GameState, lane: usize, z: f32, lookahead: f32) -> Option<&Obstacle> {
    let reach = state.player.params.collider_radius;
    state
        .world
        .obstacles
        .live()
        .filter(|o| o.lane == lane && o.back_z() >= z - reach && o.front_z() - z <= lookahead)
        .min_by(|a, b| a.front_z().total_cmp(&b.front_z()))
}

fn lane_clear(state: &GameState, lane: usize, from: f32, to: f32) -> bool {
    !state
        .world
        .obstacles
        .live()
        .any(|o| o.lane == lane && o.back_z() >= from && o.front_z() <= to)
}

/// A neighbouring lane with nothing in it up to `until`, preferring the
/// one nearer the middle
fn free_neighbour(state: &GameState, z: f32, until: f32) -> Option<usize> {
    let lane = state.player.lane;
    let count = state.player.lane_count;
    let middle = (count.saturating_sub(1)) as f32 * 0.5;
    let from = z - state.player.params.collider_radius * 2.0;

    let mut options: Vec<usize> = [lane.checked_sub(1), Some(lane + 1)]
        .into_iter()
        .flatten()
        .filter(|&l| l < count)
        .collect();
    options.sort_by(|a, b| {
        (*a as f32 - middle)
            .abs()
            .total_cmp(&(*b as f32 - middle).abs())
    });
    options
        .into_iter()
        .find(|&l| lane_clear(state, l, from, until))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lane_to_x;
    use crate::sim::tables::{BAR, SpawnTables};
    use crate::tuning::Tuning;
    use glam::Vec3;

    fn playing_state() -> GameState {
        let mut tuning = Tuning::default();
        tuning.tables = SpawnTables::empty();
        tuning.obstacles.first_spawn_offset = 1.0e6;
        let mut state = GameState::with_tuning(1, tuning);
        state.session.phase = GamePhase::Playing;
        state
    }

    fn put(state: &mut GameState, lane: usize, z: f32, size: Vec3, base_y: f32, class: ObstacleClass) {
        let id = state.world.ids.next();
        state.world.obstacles.obstacles.push(Obstacle {
            id,
            z,
            lane,
            x: lane_to_x(lane, 3, 2.0),
            base_y,
            size,
            class,
            type_index: None,
            spent: false,
        });
    }

    #[test]
    fn test_starts_from_ready() {
        let state = GameState::new(1);
        assert!(plan(&state).start);
    }

    #[test]
    fn test_dodges_to_free_lane() {
        let mut state = playing_state();
        put(&mut state, 1, 8.0, Vec3::new(1.6, 2.4, 1.0), 0.0, ObstacleClass::High);
        let events = plan(&state).events;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], InputEvent::SwipeLeft | InputEvent::SwipeRight));
    }

    #[test]
    fn test_slides_under_bar_when_boxed_in() {
        let mut state = playing_state();
        let bar = Vec3::new(2.4, 2.0, 0.5);
        for lane in 0..3 {
            put(&mut state, lane, 3.0, bar, 1.5, ObstacleClass::HighSlidable);
        }
        assert_eq!(plan(&state).events, vec![InputEvent::SwipeDown]);
    }

    #[test]
    fn test_jumps_when_boxed_in_by_hurdles() {
        let mut state = playing_state();
        let hurdle = Vec3::new(1.6, 0.6, 0.6);
        for lane in 0..3 {
            put(&mut state, lane, 2.5, hurdle, 0.0, ObstacleClass::Low);
        }
        assert_eq!(plan(&state).events, vec![InputEvent::SwipeUp]);
    }

    #[test]
    fn test_type_flags_override_class() {
        let mut state = playing_state();
        state.tuning.tables.obstacle_types = SpawnTables::default().obstacle_types;
        let bar = Vec3::new(2.4, 2.0, 0.5);
        for lane in 0..3 {
            put(&mut state, lane, 3.0, bar, 1.5, ObstacleClass::High);
            if let Some(o) = state.world.obstacles.obstacles.last_mut() {
                o.type_index = Some(BAR);
            }
        }
        assert_eq!(plan(&state).events, vec![InputEvent::SwipeDown]);

        for o in &mut state.world.obstacles.obstacles {
            o.type_index = None;
        }
        assert_eq!(plan(&state).events, vec![InputEvent::SwipeUp]);
    }

    #[test]
    fn test_waits_until_close_enough() {
        let mut state = playing_state();
        let hurdle = Vec3::new(1.6, 0.6, 0.6);
        for lane in 0..3 {
            put(&mut state, lane, 9.0, hurdle, 0.0, ObstacleClass::Low);
        }
        assert!(plan(&state).events.is_empty());
    }
}
