use serde::{Deserialize, Serialize};
use time::Date;

use super::ActionType;

/// Distinct transactions and delegators for one (week, action label).
///
/// Counts include failed transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyActivity {
    pub week: Date,
    pub action_type: ActionType,
    pub txn_count: u64,
    pub user_count: u64,
}
