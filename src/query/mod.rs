//! Query parameters and the aggregation query set.
//!
//! - [`params`] - resolves the user's date pickers into query bounds
//! - [`sql`] - ClickHouse text of the five aggregation queries

pub mod params;
pub mod sql;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use params::DateRange;
pub use sql::RangeSql;

/// Identifies one of the five aggregation queries.
///
/// Part of the result cache key, so two queries over the same range never
/// share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Totals,
    SummaryStats,
    WeeklyActivity,
    WeeklyNetFlow,
    ActionShare,
}

impl QueryKind {
    pub const ALL: [QueryKind; 5] = [
        QueryKind::Totals,
        QueryKind::SummaryStats,
        QueryKind::WeeklyActivity,
        QueryKind::WeeklyNetFlow,
        QueryKind::ActionShare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Totals => "totals",
            QueryKind::SummaryStats => "summary_stats",
            QueryKind::WeeklyActivity => "weekly_activity",
            QueryKind::WeeklyNetFlow => "weekly_net_flow",
            QueryKind::ActionShare => "action_share",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
