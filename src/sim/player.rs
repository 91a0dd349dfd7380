//! Player controller: lane changes, jump/slide/glide, physics and collisions

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Capsule;
use super::obstacles::Obstacle;
use super::state::GameEvent;
use crate::consts::{COLLIDER_SHRINK, GROUND_Y, STICK_VELOCITY};
use crate::tuning::{PlayerTuning, Tuning};
use crate::{lane_to_x, move_towards};

/// How far below the surface the feet may be and still snap back onto it
const LANDING_TOLERANCE: f32 = 0.25;

/// Abstract input events delivered by an input adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    HoldStart,
    HoldEnd,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Obstacle { id: u32 },
    Fall,
}

/// Player state; the z coordinate is always the session's virtual distance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub lane: usize,
    pub lane_count: usize,
    pub lane_offset: f32,
    pub x: f32,
    pub y: f32,
    pub vertical_velocity: f32,
    pub forward_speed: f32,
    /// Product of active speed power-up factors
    pub speed_multiplier: f32,
    pub sliding: bool,
    pub slide_ends_at: f32,
    pub gliding: bool,
    pub grounded: bool,
    pub air_jumps_left: u32,
    pub alive: bool,
    pub death: Option<DeathCause>,
    pub invincible: bool,
    pub flying: bool,
    /// Current collider height (reduced while sliding)
    pub collider_height: f32,
    pub params: PlayerTuning,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let params = tuning.player.clone();
        let lane = params.start_lane.min(tuning.lanes.count.saturating_sub(1));
        Self {
            lane,
            lane_count: tuning.lanes.count,
            lane_offset: tuning.lanes.offset,
            x: lane_to_x(lane, tuning.lanes.count, tuning.lanes.offset),
            y: GROUND_Y,
            vertical_velocity: STICK_VELOCITY,
            forward_speed: params.forward_speed,
            speed_multiplier: 1.0,
            sliding: false,
            slide_ends_at: 0.0,
            gliding: false,
            grounded: true,
            air_jumps_left: params.max_air_jumps,
            alive: true,
            death: None,
            invincible: false,
            flying: false,
            collider_height: params.collider_height,
            params,
        }
    }

    /// Effective forward speed including power-ups
    #[inline]
    pub fn current_speed(&self) -> f32 {
        self.forward_speed * self.speed_multiplier
    }

    /// Lateral position of the lane the player is heading for
    #[inline]
    pub fn target_x(&self) -> f32 {
        lane_to_x(self.lane, self.lane_count, self.lane_offset)
    }

    /// Apply one input event. Dead players ignore input.
    pub fn handle_input(&mut self, event: InputEvent, now: f32, events: &mut Vec<GameEvent>) {
        if !self.alive {
            return;
        }
        match event {
            InputEvent::SwipeLeft => {
                self.end_glide(events);
                self.shift_lane(-1, events);
            }
            InputEvent::SwipeRight => {
                self.end_glide(events);
                self.shift_lane(1, events);
            }
            InputEvent::SwipeUp => {
                self.end_glide(events);
                self.jump(events);
            }
            InputEvent::SwipeDown => {
                self.end_glide(events);
                if !self.sliding {
                    self.start_slide(now, events);
                }
            }
            InputEvent::HoldStart => {
                if !self.grounded && !self.sliding && !self.gliding {
                    self.gliding = true;
                    events.push(GameEvent::GlideStarted);
                }
            }
            InputEvent::HoldEnd => self.end_glide(events),
        }
    }

    fn shift_lane(&mut self, dir: isize, events: &mut Vec<GameEvent>) {
        let from = self.lane;
        let max = self.lane_count.saturating_sub(1);
        let to = if dir < 0 {
            from.saturating_sub(1)
        } else {
            (from + 1).min(max)
        };
        if to == from {
            events.push(GameEvent::LaneBlocked { lane: from });
        } else {
            self.lane = to;
            events.push(GameEvent::LaneChanged { from, to });
        }
    }

    /// Launch speed reaching `height` under the configured gravity
    pub fn jump_velocity(&self, height: f32) -> f32 {
        (2.0 * self.params.gravity.abs() * height.max(0.0)).sqrt()
    }

    fn jump(&mut self, events: &mut Vec<GameEvent>) {
        let air = if self.grounded {
            false
        } else if self.air_jumps_left > 0 {
            self.air_jumps_left -= 1;
            true
        } else {
            return;
        };

        let height = if air {
            self.params.jump_height * self.params.air_jump_height_multiplier
        } else {
            self.params.jump_height
        };
        self.vertical_velocity = self.jump_velocity(height);
        self.grounded = false;
        if self.sliding {
            self.end_slide(events);
        }
        events.push(GameEvent::Jumped { air });
    }

    fn start_slide(&mut self, now: f32, events: &mut Vec<GameEvent>) {
        self.sliding = true;
        self.slide_ends_at = now + self.params.slide_duration;
        self.collider_height = self.params.slide_height();
        events.push(GameEvent::SlideStarted);
    }

    fn end_slide(&mut self, events: &mut Vec<GameEvent>) {
        self.sliding = false;
        self.collider_height = self.params.collider_height;
        events.push(GameEvent::SlideEnded);
    }

    fn end_glide(&mut self, events: &mut Vec<GameEvent>) {
        if self.gliding {
            self.gliding = false;
            events.push(GameEvent::GlideEnded);
        }
    }

    pub fn expire_slide(&mut self, now: f32, events: &mut Vec<GameEvent>) {
        if self.sliding && now >= self.slide_ends_at {
            self.end_slide(events);
        }
    }

    /// Advance speed, lateral and vertical motion by `dt`.
    /// `ground_below` reports whether the track is solid under the player.
    pub fn integrate(&mut self, dt: f32, ground_below: bool, events: &mut Vec<GameEvent>) {
        if !self.alive {
            return;
        }
        let p = &self.params;

        if self.forward_speed < p.max_speed {
            self.forward_speed = (self.forward_speed + p.speed_increase_rate * dt).min(p.max_speed);
        }

        self.x = move_towards(self.x, self.target_x(), p.lane_change_speed * dt);

        if self.flying {
            self.y = move_towards(self.y, p.rocket_altitude, p.rocket_climb_speed * dt);
            self.vertical_velocity = 0.0;
            self.grounded = false;
        } else {
            if self.grounded && self.vertical_velocity < 0.0 {
                self.vertical_velocity = STICK_VELOCITY;
            }
            let gravity = if self.gliding {
                p.gravity * p.glide_gravity_multiplier
            } else {
                p.gravity
            };
            let prev_y = self.y;
            self.vertical_velocity += gravity * dt;
            self.y += self.vertical_velocity * dt;

            let on_surface = self.y <= GROUND_Y && prev_y >= GROUND_Y - LANDING_TOLERANCE;
            if ground_below && on_surface && self.vertical_velocity <= 0.0 {
                self.land(events);
            } else {
                self.grounded = false;
            }
        }

        if self.y < self.params.death_height {
            self.die(DeathCause::Fall, events);
        }
    }

    fn land(&mut self, events: &mut Vec<GameEvent>) {
        let was_airborne = !self.grounded;
        self.y = GROUND_Y;
        self.vertical_velocity = STICK_VELOCITY;
        self.grounded = true;
        self.air_jumps_left = self.params.max_air_jumps;
        self.end_glide(events);
        if was_airborne {
            events.push(GameEvent::Landed);
        }
    }

    /// Collision envelope at virtual distance `z`
    pub fn capsule(&self, z: f32) -> Capsule {
        Capsule::upright(
            Vec3::new(self.x, self.y, z),
            self.collider_height,
            self.params.collider_radius * COLLIDER_SHRINK,
        )
    }

    /// Whether an obstacle of `height` can be passed while sliding
    pub fn can_slide_under(&self, height: f32) -> bool {
        height <= self.params.slide_clearance()
            || self.params.legacy_slide_cutoff.is_some_and(|cutoff| height <= cutoff)
    }

    /// Resolve the nearest confirmed overlap. Returns the id of the obstacle
    /// that killed the player, if any.
    pub fn resolve_collisions<'a, I>(
        &mut self,
        z: f32,
        obstacles: I,
        events: &mut Vec<GameEvent>,
    ) -> Option<u32>
    where
        I: IntoIterator<Item = &'a Obstacle>,
    {
        if !self.alive {
            return None;
        }
        let capsule = self.capsule(z);
        let hit = obstacles
            .into_iter()
            .filter(|o| capsule.overlaps_aabb(&o.bounds()))
            .min_by(|a, b| (a.z - z).abs().total_cmp(&(b.z - z).abs()))?;

        if self.invincible {
            log::debug!("obstacle {} ignored (invincible)", hit.id);
            return None;
        }
        if self.sliding && self.can_slide_under(hit.height()) {
            log::debug!("slid under obstacle {} (h={:.2})", hit.id, hit.height());
            return None;
        }

        let id = hit.id;
        self.die(DeathCause::Obstacle { id }, events);
        Some(id)
    }

    /// Alive is write-once false
    pub fn die(&mut self, cause: DeathCause, events: &mut Vec<GameEvent>) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.death = Some(cause);
        log::info!("player died: {:?} at lane {}", cause, self.lane);
        events.push(GameEvent::Died { cause });
    }
}
