//! Timed power-up effects
//!
//! One expiry entry per kind. Activating a kind that is already running
//! reverts the old entry before installing the new one, so each inverse
//! mutation runs exactly once per activation.

use serde::{Deserialize, Serialize};

use super::player::Player;
use super::state::GameEvent;
use super::tables::ItemKind;
use crate::tuning::PowerUpTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    Slowdown,
    Invincible,
    Rocket,
}

impl PowerUpKind {
    /// Timed effect carried by an item, if any
    pub fn from_item(kind: ItemKind) -> Option<Self> {
        match kind {
            ItemKind::SpeedBoost => Some(PowerUpKind::SpeedBoost),
            ItemKind::Slowdown => Some(PowerUpKind::Slowdown),
            ItemKind::Invincible => Some(PowerUpKind::Invincible),
            ItemKind::Rocket => Some(PowerUpKind::Rocket),
            ItemKind::Coin | ItemKind::Magnet => None,
        }
    }

    pub fn duration(self, params: &PowerUpTuning) -> f32 {
        match self {
            PowerUpKind::SpeedBoost => params.speed_boost_duration,
            PowerUpKind::Slowdown => params.slowdown_duration,
            PowerUpKind::Invincible => params.invincible_duration,
            PowerUpKind::Rocket => params.rocket_duration,
        }
    }

    /// Speed factor while active (1.0 for non-speed effects)
    pub fn speed_factor(self, params: &PowerUpTuning) -> f32 {
        match self {
            PowerUpKind::SpeedBoost => params.speed_boost_multiplier,
            PowerUpKind::Slowdown => params.slowdown_multiplier,
            PowerUpKind::Invincible | PowerUpKind::Rocket => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub expires_at: f32,
}

/// Expiry table of running effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUps {
    pub active: Vec<ActiveEffect>,
}

impl PowerUps {
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.iter().any(|e| e.kind == kind)
    }

    /// Seconds left on `kind` at `now`
    pub fn remaining(&self, kind: PowerUpKind, now: f32) -> Option<f32> {
        self.active
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| (e.expires_at - now).max(0.0))
    }

    /// Start (or restart) an effect
    pub fn activate(
        &mut self,
        kind: PowerUpKind,
        now: f32,
        player: &mut Player,
        params: &PowerUpTuning,
        events: &mut Vec<GameEvent>,
    ) {
        let duration = kind.duration(params);
        let refreshed = if let Some(pos) = self.active.iter().position(|e| e.kind == kind) {
            self.active.remove(pos);
            self.revert(kind, player, params);
            true
        } else {
            false
        };

        self.active.push(ActiveEffect {
            kind,
            expires_at: now + duration,
        });
        self.apply(kind, player, params);

        if refreshed {
            log::debug!("power-up {:?} refreshed ({:.1}s)", kind, duration);
            events.push(GameEvent::PowerUpRefreshed { kind, duration });
        } else {
            log::info!("power-up {:?} activated ({:.1}s)", kind, duration);
            events.push(GameEvent::PowerUpActivated { kind, duration });
        }
    }

    /// Expire every effect whose timer has run out
    pub fn update(
        &mut self,
        now: f32,
        player: &mut Player,
        params: &PowerUpTuning,
        events: &mut Vec<GameEvent>,
    ) {
        let (expired, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|e| now >= e.expires_at);
        self.active = running;

        for effect in expired {
            self.revert(effect.kind, player, params);
            log::info!("power-up {:?} expired", effect.kind);
            events.push(GameEvent::PowerUpExpired { kind: effect.kind });
        }
    }

    /// Revert everything without emitting expiry events
    pub fn cancel_all(&mut self, player: &mut Player, params: &PowerUpTuning) {
        for effect in std::mem::take(&mut self.active) {
            self.revert(effect.kind, player, params);
        }
    }

    fn apply(&self, kind: PowerUpKind, player: &mut Player, params: &PowerUpTuning) {
        match kind {
            PowerUpKind::SpeedBoost | PowerUpKind::Slowdown => {
                player.speed_multiplier = self.speed_multiplier(params);
            }
            PowerUpKind::Invincible => player.invincible = true,
            PowerUpKind::Rocket => player.flying = true,
        }
    }

    /// Inverse of `apply`; `kind` must already be gone from the table
    fn revert(&self, kind: PowerUpKind, player: &mut Player, params: &PowerUpTuning) {
        match kind {
            PowerUpKind::SpeedBoost | PowerUpKind::Slowdown => {
                player.speed_multiplier = self.speed_multiplier(params);
            }
            PowerUpKind::Invincible => player.invincible = false,
            PowerUpKind::Rocket => player.flying = false,
        }
    }

    /// Product of the speed factors of running effects
    pub fn speed_multiplier(&self, params: &PowerUpTuning) -> f32 {
        self.active
            .iter()
            .map(|e| e.kind.speed_factor(params))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn setup() -> (PowerUps, Player, PowerUpTuning) {
        let tuning = Tuning::default();
        (PowerUps::default(), Player::new(&tuning), tuning.power_ups)
    }

    fn expired_count(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::PowerUpExpired { .. }))
            .count()
    }

    #[test]
    fn test_speed_boost_applies_and_reverts() {
        let (mut ups, mut player, params) = setup();
        let mut events = Vec::new();
        ups.activate(PowerUpKind::SpeedBoost, 0.0, &mut player, &params, &mut events);
        assert_eq!(player.speed_multiplier, 1.5);
        assert_eq!(player.current_speed(), 18.0);

        ups.update(4.9, &mut player, &params, &mut events);
        assert_eq!(player.speed_multiplier, 1.5);
        ups.update(5.0, &mut player, &params, &mut events);
        assert_eq!(player.speed_multiplier, 1.0);
        assert_eq!(expired_count(&events), 1);
    }

    #[test]
    fn test_restart_fires_single_inverse_at_second_expiry() {
        let (mut ups, mut player, params) = setup();
        let mut events = Vec::new();
        ups.activate(PowerUpKind::SpeedBoost, 0.0, &mut player, &params, &mut events);
        ups.update(3.0, &mut player, &params, &mut events);
        ups.activate(PowerUpKind::SpeedBoost, 3.0, &mut player, &params, &mut events);
        assert_eq!(player.speed_multiplier, 1.5);
        assert!(events.contains(&GameEvent::PowerUpRefreshed {
            kind: PowerUpKind::SpeedBoost,
            duration: 5.0
        }));

        // First activation's expiry passes without a restore
        ups.update(5.5, &mut player, &params, &mut events);
        assert_eq!(player.speed_multiplier, 1.5);
        assert_eq!(expired_count(&events), 0);

        ups.update(8.0, &mut player, &params, &mut events);
        assert_eq!(player.speed_multiplier, 1.0);
        assert_eq!(expired_count(&events), 1);

        ups.update(20.0, &mut player, &params, &mut events);
        assert_eq!(expired_count(&events), 1);
    }

    #[test]
    fn test_boost_and_slowdown_compose_exactly() {
        let (mut ups, mut player, params) = setup();
        let mut events = Vec::new();
        ups.activate(PowerUpKind::SpeedBoost, 0.0, &mut player, &params, &mut events);
        ups.activate(PowerUpKind::Slowdown, 1.0, &mut player, &params, &mut events);
        assert_eq!(player.speed_multiplier, 0.75);
        ups.update(5.0, &mut player, &params, &mut events);
        assert_eq!(player.speed_multiplier, 0.5);
        ups.update(6.0, &mut player, &params, &mut events);
        assert_eq!(player.speed_multiplier, 1.0);
    }

    #[test]
    fn test_flag_effects_toggle() {
        let (mut ups, mut player, params) = setup();
        let mut events = Vec::new();
        ups.activate(PowerUpKind::Invincible, 0.0, &mut player, &params, &mut events);
        ups.activate(PowerUpKind::Rocket, 0.0, &mut player, &params, &mut events);
        assert!(player.invincible && player.flying);
        assert_eq!(ups.remaining(PowerUpKind::Rocket, 2.0), Some(3.0));

        ups.cancel_all(&mut player, &params);
        assert!(!player.invincible && !player.flying);
        assert!(ups.active.is_empty());
    }

    #[test]
    fn test_items_map_to_effects() {
        assert_eq!(PowerUpKind::from_item(ItemKind::Coin), None);
        assert_eq!(PowerUpKind::from_item(ItemKind::Magnet), None);
        assert_eq!(
            PowerUpKind::from_item(ItemKind::Rocket),
            Some(PowerUpKind::Rocket)
        );
    }
}
