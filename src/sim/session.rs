//! Session state machine: Ready -> Countdown -> Playing -> GameOver
//!
//! Owns the score, virtual distance and play clock. Distance and play
//! time accumulate in f64 so long runs floor to the expected score.

use serde::{Deserialize, Serialize};

use super::player::DeathCause;
use super::state::GameEvent;
use crate::tuning::SessionTuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start command
    Ready,
    /// Presentational countdown before the run
    Countdown,
    /// Active run
    Playing,
    /// Run ended; only a restart leaves this phase
    GameOver,
}

impl GamePhase {
    /// The only legal edges of the state machine
    pub fn can_transition_to(self, next: GamePhase) -> bool {
        matches!(
            (self, next),
            (GamePhase::Ready, GamePhase::Countdown)
                | (GamePhase::Countdown, GamePhase::Playing)
                | (GamePhase::Playing, GamePhase::GameOver)
                | (GamePhase::GameOver, GamePhase::Ready)
        )
    }
}

/// Final numbers of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub distance: f64,
    pub play_time: f64,
    pub coins: u32,
    pub cause: Option<DeathCause>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub phase: GamePhase,
    pub score: u64,
    /// Flat bonuses from pickups
    pub bonus: u64,
    pub coins: u32,
    /// Virtual distance travelled this run
    pub distance: f64,
    /// Seconds spent in Playing
    pub play_time: f64,
    /// Index of the countdown label being shown
    pub countdown_step: usize,
    pub countdown_timer: f32,
    pub summary: Option<RunSummary>,
    pub params: SessionTuning,
}

impl Session {
    pub fn new(params: SessionTuning) -> Self {
        Self {
            phase: GamePhase::Ready,
            score: 0,
            bonus: 0,
            coins: 0,
            distance: 0.0,
            play_time: 0.0,
            countdown_step: 0,
            countdown_timer: 0.0,
            summary: None,
            params,
        }
    }

    /// Session clock used for timers
    #[inline]
    pub fn now(&self) -> f32 {
        self.play_time as f32
    }

    /// Move to `next` if the edge is legal
    pub fn transition(&mut self, next: GamePhase, events: &mut Vec<GameEvent>) -> bool {
        if !self.phase.can_transition_to(next) {
            log::warn!("rejected phase change {:?} -> {:?}", self.phase, next);
            return false;
        }
        log::info!("phase {:?} -> {:?}", self.phase, next);
        events.push(GameEvent::PhaseChanged {
            from: self.phase,
            to: next,
        });
        self.phase = next;
        true
    }

    /// Ready -> Countdown
    pub fn start(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if !self.transition(GamePhase::Countdown, events) {
            return false;
        }
        self.countdown_step = 0;
        self.countdown_timer = 0.0;
        if let Some(label) = self.params.countdown_steps.first() {
            events.push(GameEvent::CountdownStep {
                label: label.clone(),
            });
        }
        true
    }

    /// Label currently shown, if counting down
    pub fn countdown_label(&self) -> Option<&str> {
        if self.phase != GamePhase::Countdown {
            return None;
        }
        self.params
            .countdown_steps
            .get(self.countdown_step)
            .map(String::as_str)
    }

    /// Advance the countdown; enters Playing after the last step
    pub fn update_countdown(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        if self.phase != GamePhase::Countdown {
            return;
        }
        let steps = self.params.countdown_steps.len();
        let step_secs = self.params.countdown_step_secs;
        self.countdown_timer += dt;

        while self.countdown_step < steps
            && (step_secs <= 0.0 || self.countdown_timer >= step_secs)
        {
            self.countdown_timer = (self.countdown_timer - step_secs).max(0.0);
            self.countdown_step += 1;
            if let Some(label) = self.params.countdown_steps.get(self.countdown_step) {
                events.push(GameEvent::CountdownStep {
                    label: label.clone(),
                });
            }
        }

        if self.countdown_step >= steps {
            self.begin_playing(events);
        }
    }

    fn begin_playing(&mut self, events: &mut Vec<GameEvent>) {
        if self.transition(GamePhase::Playing, events) {
            self.score = 0;
            self.bonus = 0;
            self.coins = 0;
            self.distance = 0.0;
            self.play_time = 0.0;
        }
    }

    /// Accumulate distance and recompute the score
    pub fn advance(&mut self, speed: f32, dt: f32, alive: bool) {
        if self.phase != GamePhase::Playing || !alive {
            return;
        }
        self.distance += f64::from(speed) * f64::from(dt);
        self.play_time += f64::from(dt);
        self.recompute_score();
    }

    fn recompute_score(&mut self) {
        self.score = self.distance.floor().max(0.0) as u64 + self.bonus;
    }

    pub fn add_bonus(&mut self, points: u64) {
        self.bonus += points;
        self.recompute_score();
    }

    pub fn add_coin(&mut self, points: u64) {
        self.coins += 1;
        self.add_bonus(points);
    }

    /// Numbers of the run so far
    pub fn run_summary(&self, cause: Option<DeathCause>) -> RunSummary {
        RunSummary {
            score: self.score,
            distance: self.distance,
            play_time: self.play_time,
            coins: self.coins,
            cause,
        }
    }

    /// Playing -> GameOver, producing the run summary
    pub fn game_over(
        &mut self,
        cause: Option<DeathCause>,
        events: &mut Vec<GameEvent>,
    ) -> Option<RunSummary> {
        if !self.transition(GamePhase::GameOver, events) {
            return None;
        }
        let summary = self.run_summary(cause);
        log::info!(
            "run over: score {} distance {:.1} time {:.1}s coins {} ({:?})",
            summary.score,
            summary.distance,
            summary.play_time,
            summary.coins,
            summary.cause
        );
        events.push(GameEvent::RunFinished {
            summary: summary.clone(),
        });
        self.summary = Some(summary.clone());
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn session() -> Session {
        Session::new(SessionTuning::default())
    }

    #[test]
    fn test_only_legal_transitions() {
        use GamePhase::*;
        let all = [Ready, Countdown, Playing, GameOver];
        let legal = [
            (Ready, Countdown),
            (Countdown, Playing),
            (Playing, GameOver),
            (GameOver, Ready),
        ];
        for from in all {
            for to in all {
                assert_eq!(from.can_transition_to(to), legal.contains(&(from, to)));
            }
        }

        let mut s = session();
        let mut events = Vec::new();
        assert!(!s.transition(Playing, &mut events));
        assert_eq!(s.phase, Ready);
        assert!(events.is_empty());
    }

    #[test]
    fn test_countdown_sequence_then_playing() {
        let mut s = session();
        let mut events = Vec::new();
        assert!(s.start(&mut events));
        assert_eq!(s.countdown_label(), Some("3"));

        for _ in 0..59 {
            s.update_countdown(SIM_DT, &mut events);
        }
        assert_eq!(s.phase, GamePhase::Countdown);

        for _ in 0..300 {
            s.update_countdown(SIM_DT, &mut events);
        }
        assert_eq!(s.phase, GamePhase::Playing);

        let labels: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::CountdownStep { label } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["3", "2", "1", "Go!"]);
    }

    #[test]
    fn test_empty_countdown_goes_straight_to_playing() {
        let mut s = Session::new(SessionTuning {
            countdown_steps: Vec::new(),
            countdown_step_secs: 1.0,
        });
        let mut events = Vec::new();
        s.start(&mut events);
        s.update_countdown(SIM_DT, &mut events);
        assert_eq!(s.phase, GamePhase::Playing);
    }

    #[test]
    fn test_score_is_floor_of_distance_plus_bonus() {
        let mut s = session();
        s.phase = GamePhase::Playing;
        s.advance(10.0, 0.25, true);
        assert_eq!(s.score, 2);
        s.add_coin(10);
        assert_eq!(s.score, 12);
        assert_eq!(s.coins, 1);

        s.advance(10.0, 1.0, false);
        assert_eq!(s.distance, 2.5);
    }

    #[test]
    fn test_game_over_summary() {
        let mut s = session();
        s.phase = GamePhase::Playing;
        s.advance(12.0, 1.0, true);
        let mut events = Vec::new();
        let summary = s.game_over(Some(DeathCause::Fall), &mut events).unwrap();
        assert_eq!(summary.score, 12);
        assert_eq!(summary.cause, Some(DeathCause::Fall));
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(s.game_over(None, &mut events).is_none());
    }
}
