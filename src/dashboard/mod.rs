//! Presentation mapping.
//!
//! Turns the five derived results for one date range into headline metrics,
//! chart specs and percentage shares. Rendering is pure and cannot fail:
//! empty results produce zero or blank metrics and empty charts.

pub mod charts;
pub mod metrics;
pub mod shares;

use std::{sync::Arc, time::Instant};

use log::info;
use serde::Serialize;

use crate::{
    cache::{CachePolicy, QueryCache},
    db::{ActionShare, PeriodTotals, SummaryStats, WeeklyActivity, WeeklyNetFlow},
    query::DateRange,
};

pub use charts::{ChartKind, ChartSpec};
pub use metrics::Metric;
pub use shares::{share_percentages, ShareRow};

/// The five derived results for one date range.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub range: DateRange,
    pub totals: PeriodTotals,
    pub summary: SummaryStats,
    pub weekly_activity: Arc<Vec<WeeklyActivity>>,
    pub weekly_net_flow: Arc<Vec<WeeklyNetFlow>>,
    pub action_share: Arc<Vec<ActionShare>>,
}

impl DashboardData {
    /// Run all five queries concurrently through the cache.
    pub async fn load(
        cache: &QueryCache,
        range: DateRange,
        policy: CachePolicy,
    ) -> anyhow::Result<Self> {
        let start = Instant::now();

        let (totals, summary, weekly_activity, weekly_net_flow, action_share) = futures::try_join!(
            cache.period_totals(&range, policy),
            cache.summary_stats(&range, policy),
            cache.weekly_activity(&range, policy),
            cache.weekly_net_flow(&range, policy),
            cache.action_share(&range, policy),
        )?;

        info!("Loaded staking dashboard for {} in {:?}", range, start.elapsed());

        Ok(Self {
            range,
            totals,
            summary,
            weekly_activity,
            weekly_net_flow,
            action_share,
        })
    }
}

/// Everything the UI draws for one date range.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub range: DateRange,
    pub metrics: Vec<Metric>,
    pub charts: Vec<ChartSpec>,
    pub shares: Vec<ShareRow>,
}

impl Dashboard {
    pub fn render(data: &DashboardData, token_symbol: &str) -> Self {
        let shares = share_percentages(&data.action_share);

        let charts = vec![
            charts::weekly_transactions(&data.weekly_activity),
            charts::weekly_users(&data.weekly_activity),
            charts::weekly_net_flow(&data.weekly_net_flow, token_symbol),
            charts::transaction_share(&shares),
            charts::volume_share(&shares),
            charts::user_share(&shares),
        ];

        Self {
            range: data.range,
            metrics: render_metrics(&data.totals, &data.summary, token_symbol),
            charts,
            shares,
        }
    }
}

fn render_metrics(totals: &PeriodTotals, summary: &SummaryStats, token_symbol: &str) -> Vec<Metric> {
    vec![
        Metric::new(
            "total_staked",
            "Total Amount Staked",
            Some(totals.total_staked),
            token_symbol,
            2,
        ),
        Metric::new(
            "total_unstaked",
            "Total Amount UnStaked",
            Some(totals.total_unstaked),
            token_symbol,
            2,
        ),
        Metric::new(
            "total_net_staked",
            "Total Amount Net Staked",
            Some(totals.total_net_staked),
            token_symbol,
            2,
        ),
        Metric::count("stake_count", "Number of Stake Transactions", summary.stake_count, "Txns"),
        Metric::count("staker_count", "Number of Stakers", summary.staker_count, "Wallets"),
        Metric::count(
            "unstake_count",
            "Number of UnStake Transactions",
            summary.unstake_count,
            "Txns",
        ),
        Metric::new(
            "avg_staked_per_txn",
            "Average Amount Staked per Transaction",
            summary.avg_staked_per_txn,
            token_symbol,
            2,
        ),
        Metric::new(
            "avg_stakes_per_user",
            "Average Number of Stakes per User",
            summary.avg_stakes_per_user,
            "Txns",
            0,
        ),
        Metric::new(
            "avg_staked_per_user",
            "Average Amount Staked per User",
            summary.avg_staked_per_user,
            token_symbol,
            2,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ActionType, FixtureWarehouse, StakeAction, StakingEvent};
    use time::macros::{date, datetime};

    fn event(tx_id: &str, day: u8, action: StakeAction, amount: u64, who: &str) -> StakingEvent {
        StakingEvent {
            tx_id: tx_id.to_string(),
            block_timestamp: datetime!(2022-02-01 12:00 UTC)
                .replace_day(day)
                .unwrap(),
            action,
            amount,
            delegator_address: who.to_string(),
            tx_succeeded: true,
        }
    }

    fn cache_with(events: Vec<StakingEvent>) -> QueryCache {
        QueryCache::new(Arc::new(FixtureWarehouse::new(events)))
    }

    #[tokio::test]
    async fn test_empty_range_renders_without_error() {
        let cache = cache_with(Vec::new());
        let range = DateRange::new(date!(2022 - 01 - 01), date!(2022 - 01 - 31));

        let data = DashboardData::load(&cache, range, CachePolicy::UseCached).await.unwrap();
        let dashboard = Dashboard::render(&data, "AXL");

        assert_eq!(dashboard.metrics.len(), 9);
        let staked = &dashboard.metrics[0];
        assert_eq!(staked.value, Some(0.0));
        assert_eq!(staked.display, "0.00 AXL");

        let averages: Vec<&Metric> =
            dashboard.metrics.iter().filter(|m| m.id.starts_with("avg_")).collect();
        assert_eq!(averages.len(), 3);
        assert!(averages.iter().all(|m| m.value.is_none() && m.display.is_empty()));

        assert_eq!(dashboard.charts.len(), 6);
        assert!(dashboard
            .charts
            .iter()
            .all(|c| c.series.iter().all(|s| s.points.is_empty()) && c.slices.is_empty()));
        assert!(dashboard.shares.is_empty());

        // Must serialize for the UI too
        serde_json::to_string(&dashboard).unwrap();
    }

    #[tokio::test]
    async fn test_populated_dashboard_maps_every_result() {
        let cache = cache_with(vec![
            event("d1", 7, StakeAction::Delegate, 3_000_000, "a"),
            event("d2", 8, StakeAction::Delegate, 1_000_000, "b"),
            event("u1", 9, StakeAction::Undelegate, 1_000_000, "a"),
            event("d3", 15, StakeAction::Delegate, 4_000_000, "a"),
        ]);
        let range = DateRange::new(date!(2022 - 02 - 01), date!(2022 - 02 - 28));

        let data = DashboardData::load(&cache, range, CachePolicy::UseCached).await.unwrap();
        let dashboard = Dashboard::render(&data, "AXL");

        let metric = |id: &str| dashboard.metrics.iter().find(|m| m.id == id).unwrap().clone();
        assert_eq!(metric("total_staked").value, Some(8.0));
        assert_eq!(metric("total_net_staked").display, "7.00 AXL");
        assert_eq!(metric("stake_count").display, "3 Txns");
        assert_eq!(metric("avg_stakes_per_user").value, Some(2.0));
        assert_eq!(metric("avg_staked_per_user").value, Some(4.0));

        let net_flow = dashboard.charts.iter().find(|c| c.id == "weekly_net_flow").unwrap();
        assert_eq!(net_flow.kind, ChartKind::DualAxis);
        assert_eq!(net_flow.series.len(), 3);
        assert_eq!(net_flow.series[2].points.len(), 2);
        assert_eq!(net_flow.series[2].points[0].value, 3.0);

        let txns = dashboard.charts.iter().find(|c| c.id == "weekly_transactions").unwrap();
        let names: Vec<&str> = txns.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Stake", "UnStake"]);

        let donut = dashboard.charts.iter().find(|c| c.id == "transaction_share").unwrap();
        assert_eq!(donut.kind, ChartKind::Donut);
        assert_eq!(donut.slices[0].label, "Stake");
        assert_eq!(donut.slices[0].percent, 75.0);

        assert_eq!(dashboard.shares[0].action_type, ActionType::Stake);
        assert_eq!(dashboard.shares[1].volume_pct, 11.11);
    }
}
