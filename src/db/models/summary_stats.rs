use clickhouse::Row;
use serde::{Deserialize, Serialize};

/// Whole-range staking statistics.
///
/// Query Pattern: one row, delegate-side reductions cross joined with the
/// undelegate transaction count. Only succeeded transactions count.
///
/// Averages are `None` when there is nothing to average over.
/// `avg_stakes_per_user` has no decimals, `avg_staked_per_user` has two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Row)]
pub struct SummaryStats {
    pub stake_count: u64,
    pub staker_count: u64,
    pub avg_staked_per_txn: Option<f64>,
    pub avg_stakes_per_user: Option<f64>,
    pub avg_staked_per_user: Option<f64>,
    pub unstake_count: u64,
}
