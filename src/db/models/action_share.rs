use serde::{Deserialize, Serialize};

use super::ActionType;

/// Whole-range totals for one action label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionShare {
    pub action_type: ActionType,
    pub txn_count: u64,
    pub user_count: u64,
    /// Summed AXL, rounded to 2 decimals.
    pub volume: f64,
}
