use clickhouse::Row;
use serde::{Deserialize, Serialize};

/// Staked, unstaked and net staked AXL over the selected range.
///
/// All three are rounded to 2 decimals. An empty range yields zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Row)]
pub struct PeriodTotals {
    pub total_staked: f64,
    pub total_unstaked: f64,
    pub total_net_staked: f64,
}
