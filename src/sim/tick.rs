//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::autopilot;
use super::player::InputEvent;
use super::powerups::PowerUpKind;
use super::session::GamePhase;
use super::state::{GameEvent, GameState};
use super::tables::ItemKind;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player input events, applied in order
    pub events: Vec<InputEvent>,
    /// Start command (Ready -> Countdown)
    pub start: bool,
    /// Restart command (GameOver -> Ready)
    pub restart: bool,
    /// Let the autopilot add its own inputs
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let mut input = input.clone();
    if input.autopilot {
        let auto = autopilot::plan(state);
        input.start |= auto.start;
        input.events.extend(auto.events);
    }

    if input.restart {
        state.restart();
    }

    match state.phase() {
        GamePhase::Ready => {
            if input.start {
                state.session.start(&mut state.events);
            }
        }
        GamePhase::Countdown => state.session.update_countdown(dt, &mut state.events),
        GamePhase::Playing => playing_tick(state, &input.events, dt),
        GamePhase::GameOver => {}
    }

    state.time_ticks += 1;
}

fn playing_tick(state: &mut GameState, inputs: &[InputEvent], dt: f32) {
    let now = state.session.now();

    for &event in inputs {
        state.player.handle_input(event, now, &mut state.events);
    }

    state.power_ups.update(
        now,
        &mut state.player,
        &state.tuning.power_ups,
        &mut state.events,
    );

    // Player physics at the current virtual distance
    let z = state.session.distance as f32;
    let ground = state.world.track.is_solid_at(z);
    state.player.integrate(dt, ground, &mut state.events);

    if let Some(id) =
        state
            .player
            .resolve_collisions(z, state.world.obstacles.live(), &mut state.events)
    {
        state.world.obstacles.mark_spent(id);
    }
    state.player.expire_slide(now, &mut state.events);

    if state.player.alive {
        collect_items(state, z, now);
    }

    state
        .session
        .advance(state.player.current_speed(), dt, state.player.alive);

    let distance = state.session.distance as f32;
    state
        .world
        .update(distance, &state.tuning, &mut state.rng, &mut state.events);

    if !state.player.alive {
        state.session.game_over(state.player.death, &mut state.events);
    }
}

fn collect_items(state: &mut GameState, z: f32, now: f32) {
    let capsule = state.player.capsule(z);
    let taken = state
        .world
        .items
        .collect(&capsule, state.tuning.items.pickup_radius);

    for item in taken {
        log::debug!("collected {:?} ({})", item.kind, item.id);
        state.events.push(GameEvent::ItemCollected {
            id: item.id,
            kind: item.kind,
            sound: item.sound,
        });
        apply_item(state, item.kind, now);
    }
}

fn apply_item(state: &mut GameState, kind: ItemKind, now: f32) {
    match kind {
        ItemKind::Coin => state.session.add_coin(state.tuning.power_ups.coin_bonus),
        // Attraction is left to the presentation layer
        ItemKind::Magnet => {}
        other => {
            if let Some(kind) = PowerUpKind::from_item(other) {
                state.power_ups.activate(
                    kind,
                    now,
                    &mut state.player,
                    &state.tuning.power_ups,
                    &mut state.events,
                );
            }
        }
    }
}

/// Run as many fixed ticks as `frame_dt` covers (capped), carrying the
/// remainder in `accumulator`. One-shot input is delivered on the first
/// substep only. Returns the number of ticks run.
pub fn run_frame(
    state: &mut GameState,
    input: &TickInput,
    frame_dt: f32,
    accumulator: &mut f32,
) -> u32 {
    *accumulator += frame_dt.clamp(0.0, 0.1);

    let mut input = input.clone();
    let mut substeps = 0;
    while *accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
        tick(state, &input, SIM_DT);
        *accumulator -= SIM_DT;
        substeps += 1;

        // Clear one-shot inputs after processing
        input.events.clear();
        input.start = false;
        input.restart = false;
    }
    substeps
}
