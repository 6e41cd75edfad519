//! Session high score leaderboard
//!
//! Runs are banked here when the player is caught. Lives only as long as the
//! engine does.

use serde::{Deserialize, Serialize};

/// Runs kept per session
pub const MAX_HIGH_SCORES: usize = 10;

/// A single banked run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Simulation tick at which the run ended
    pub tick: u64,
}

/// Banked runs of this session, best first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A run earns a slot when it scored at all and either the table has room
    /// or it beats the weakest banked run
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0
            && (self.entries.len() < MAX_HIGH_SCORES
                || self.entries.last().is_some_and(|weakest| score > weakest.score))
    }

    /// Bank a finished run. Returns its 1-based rank, or None when it did not
    /// make the table.
    pub fn add_score(&mut self, score: u64, level: u32, tick: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        // Equal scores rank behind the runs banked before them
        let slot = self.entries.partition_point(|e| e.score >= score);
        self.entries.insert(slot, HighScoreEntry { score, level, tick });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(slot + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best banked score, or 0 before any run has scored
    pub fn top_score(&self) -> u64 {
        self.entries.first().map_or(0, |e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_score_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(0, 1, 100), None);
        assert!(scores.is_empty());
        assert_eq!(scores.top_score(), 0);
    }

    #[test]
    fn test_sorted_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(3, 1, 10), Some(1));
        assert_eq!(scores.add_score(12, 3, 20), Some(1));
        assert_eq!(scores.add_score(7, 2, 30), Some(2));
        let ordered: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ordered, vec![12, 7, 3]);
        assert_eq!(scores.top_score(), 12);
    }

    #[test]
    fn test_truncates_to_max() {
        let mut scores = HighScores::new();
        for s in 1..=(MAX_HIGH_SCORES as u64 + 5) {
            scores.add_score(s, 1, s);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(1));
        assert_eq!(scores.top_score(), MAX_HIGH_SCORES as u64 + 5);
    }

    #[test]
    fn test_tied_run_ranks_behind_earlier_one() {
        let mut scores = HighScores::new();
        scores.add_score(5, 2, 100);
        assert_eq!(scores.add_score(5, 2, 200), Some(2));
        assert_eq!(scores.entries[0].tick, 100);
        assert_eq!(scores.entries[1].tick, 200);
    }
}
