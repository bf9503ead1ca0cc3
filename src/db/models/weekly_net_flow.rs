use serde::{Deserialize, Serialize};
use time::Date;

/// Staking flow for one week.
///
/// `unstaked_amount` is negated (zero or below) so that
/// `net_amount = staked_amount + unstaked_amount`. A week with activity on
/// one side only carries 0 for the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyNetFlow {
    pub week: Date,
    pub staked_amount: f64,
    pub unstaked_amount: f64,
    pub net_amount: f64,
}
