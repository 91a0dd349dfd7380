//! High score leaderboard
//!
//! Keeps the top 10 runs in memory. Hosts persist it through the JSON
//! helpers.

use serde::{Deserialize, Serialize};

use crate::sim::RunSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<RunSummary>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a finished run (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add_run(&mut self, run: RunSummary) -> Option<usize> {
        let rank = self.potential_rank(run.score)?;
        self.entries.insert(rank - 1, run);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored leaderboard, re-sorting and trimming it
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::DeathCause;

    fn run(score: u64) -> RunSummary {
        RunSummary {
            score,
            distance: score as f64,
            play_time: 1.0,
            coins: 0,
            cause: Some(DeathCause::Fall),
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.potential_rank(0), None);
    }

    #[test]
    fn test_sorted_and_capped() {
        let mut scores = HighScores::new();
        for s in [50, 10, 90, 30, 70, 20, 60, 80, 40, 100, 5] {
            scores.add_run(run(s));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(100));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(10));
        assert!(scores.entries.windows(2).all(|w| w[0].score >= w[1].score));

        assert!(!scores.qualifies(10));
        assert_eq!(scores.add_run(run(95)), Some(2));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_ties_rank_after_existing() {
        let mut scores = HighScores::new();
        scores.add_run(run(50));
        assert_eq!(scores.potential_rank(50), Some(2));
    }

    #[test]
    fn test_json_round_trip_resorts() {
        let json = r#"{"entries":[
            {"score":5,"distance":5.0,"play_time":1.0,"coins":0,"cause":null},
            {"score":9,"distance":9.0,"play_time":2.0,"coins":1,"cause":"Fall"}
        ]}"#;
        let scores = HighScores::from_json(json).unwrap();
        assert_eq!(scores.top_score(), Some(9));
        assert_eq!(scores.entries[0].cause, Some(DeathCause::Fall));

        let again = HighScores::from_json(&scores.to_json().unwrap()).unwrap();
        assert_eq!(again.entries, scores.entries);
        assert!(HighScores::from_json("not json").is_err());
    }
}
