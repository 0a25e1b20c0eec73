//! Shared score arithmetic: percentage rounding, leaderboard ordering and
//! per-session statistics.
//!
//! Every percentage shown or persisted goes through [`percentage`], which
//! rounds half away from zero (`1/8 = 12.5% -> 13`).

use std::cmp::Ordering;

use crate::model::{LeaderboardEntry, ScoreRecord};

/// Integer division rounded half away from zero. Returns 0 when `denominator` is 0.
#[must_use]
pub fn round_ratio(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    (numerator * 2 + denominator) / (denominator * 2)
}

/// `round(100 * score / total)`; 0 when `total` is 0.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    let rounded = round_ratio(u64::from(score) * 100, u64::from(total));
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Leaderboard order: percentage desc, then raw score desc, then most recent first.
#[must_use]
pub fn leaderboard_order(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    b.percentage
        .cmp(&a.percentage)
        .then_with(|| b.score.cmp(&a.score))
        .then_with(|| b.timestamp.cmp(&a.timestamp))
}

/// Sort `records` into leaderboard order and keep the first `limit`.
#[must_use]
pub fn top_scores(mut records: Vec<ScoreRecord>, limit: usize) -> Vec<ScoreRecord> {
    records.sort_by(leaderboard_order);
    records.truncate(limit);
    records
}

/// Number already-ordered records from rank 1.
#[must_use]
pub fn rank(records: &[ScoreRecord]) -> Vec<LeaderboardEntry> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| LeaderboardEntry {
            rank: i + 1,
            user_name: r.user_name.clone(),
            score: r.score,
            percentage: r.percentage,
            timestamp: r.timestamp,
            session_id: r.session_id.clone(),
        })
        .collect()
}

/// Aggregate statistics over a set of attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreStats {
    pub total_attempts: usize,
    pub average_percentage: u32,
    pub highest_percentage: u32,
    pub lowest_percentage: u32,
}

impl ScoreStats {
    #[must_use]
    pub fn from_records(records: &[ScoreRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        Self {
            total_attempts: records.len(),
            average_percentage: average_percentage(records),
            highest_percentage: records.iter().map(|r| r.percentage).max().unwrap_or(0),
            lowest_percentage: records.iter().map(|r| r.percentage).min().unwrap_or(0),
        }
    }
}

/// Mean percentage across `records`, rounded with the shared rule.
#[must_use]
pub fn average_percentage(records: &[ScoreRecord]) -> u32 {
    let sum: u64 = records.iter().map(|r| u64::from(r.percentage)).sum();
    let count = u64::try_from(records.len()).unwrap_or(u64::MAX);
    u32::try_from(round_ratio(sum, count)).unwrap_or(u32::MAX)
}
