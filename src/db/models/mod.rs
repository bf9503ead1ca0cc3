mod action_share;
mod period_totals;
mod staking_event;
mod summary_stats;
mod weekly_activity;
mod weekly_net_flow;

pub use action_share::ActionShare;
pub use period_totals::PeriodTotals;
pub use staking_event::{ActionType, StakeAction, StakingEvent};
pub use summary_stats::SummaryStats;
pub use weekly_activity::WeeklyActivity;
pub use weekly_net_flow::WeeklyNetFlow;
