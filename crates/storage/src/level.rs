//! Level progression from the cumulative score

use serde::{Deserialize, Serialize};

/// Score needed per squared level
const SCORE_PER_LEVEL_SQUARED: u64 = 100;

/// Current level and progress toward the next one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u32,
    /// Percent of the way from the current level threshold to the next
    pub progress: f64,
    pub current: u64,
    /// Score at which the next level starts
    pub next_required: u64,
}

impl LevelInfo {
    /// Level is the smallest `L` with `score < L² × 100`
    ///
    /// The top level's threshold lies past `u64::MAX`; `next_required`
    /// saturates there.
    pub fn from_total(score: u64) -> Self {
        // score < 100k exactly when score / 100 < k
        let level = isqrt(score / SCORE_PER_LEVEL_SQUARED) + 1;

        let prev_required = required(level - 1);
        let next_required = required(level);
        let progress = (u128::from(score) - prev_required) as f64
            / (next_required - prev_required) as f64
            * 100.0;

        Self {
            level: u32::try_from(level).unwrap_or(u32::MAX),
            progress,
            current: score,
            next_required: u64::try_from(next_required).unwrap_or(u64::MAX),
        }
    }
}

fn required(level: u64) -> u128 {
    let level = u128::from(level);
    level * level * u128::from(SCORE_PER_LEVEL_SQUARED)
}

/// Floor square root
fn isqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    while u128::from(root) * u128::from(root) > u128::from(n) {
        root -= 1;
    }
    while u128::from(root + 1) * u128::from(root + 1) <= u128::from(n) {
        root += 1;
    }
    root
}
