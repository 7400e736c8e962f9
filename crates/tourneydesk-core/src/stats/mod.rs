//! Statistics derived from raw match counters.
//!
//! Ratios are always computed from counters, never stored. Missing counters
//! count as zero and zero denominators are guarded.

pub mod ratios;
pub mod summary;

pub use ratios::{compute_kda, compute_win_rate, kda_ratio, win_rate_percent};
pub use summary::{leaderboard, summarize_players, PlayerSummary, TeamRecord};
