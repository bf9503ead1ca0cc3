use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use time::Date;

use crate::{
    db::{
        clickhouse::ClickhouseWarehouse,
        models::{ActionShare, ActionType, PeriodTotals, SummaryStats, WeeklyActivity, WeeklyNetFlow},
        StakingSource,
    },
    query::{sql, DateRange, QueryKind},
};

#[async_trait]
impl StakingSource for ClickhouseWarehouse {
    fn name(&self) -> &'static str {
        "clickhouse"
    }

    async fn period_totals(&self, range: &DateRange) -> anyhow::Result<PeriodTotals> {
        let sql = sql::totals(&self.fact_table);
        let started = Instant::now();
        let result = self.range_query(&sql, range).fetch_all::<PeriodTotals>().await;
        Self::log_outcome(QueryKind::Totals, range, started, &result);

        // A global aggregate always yields one row; fall back to zeros anyway
        let totals = result
            .context("Failed to load staking totals")?
            .into_iter()
            .next()
            .unwrap_or_default();
        Ok(totals)
    }

    async fn summary_stats(&self, range: &DateRange) -> anyhow::Result<SummaryStats> {
        let sql = sql::summary_stats(&self.fact_table);
        let started = Instant::now();
        let result = self.range_query(&sql, range).fetch_all::<SummaryStats>().await;
        Self::log_outcome(QueryKind::SummaryStats, range, started, &result);

        let stats = result
            .context("Failed to load staking summary stats")?
            .into_iter()
            .next()
            .unwrap_or_default();
        Ok(stats)
    }

    async fn weekly_activity(&self, range: &DateRange) -> anyhow::Result<Vec<WeeklyActivity>> {
        let sql = sql::weekly_activity(&self.fact_table);
        let started = Instant::now();
        let result = self.range_query(&sql, range).fetch_all::<WeeklyActivityRow>().await;
        Self::log_outcome(QueryKind::WeeklyActivity, range, started, &result);

        let rows = result.context("Failed to load weekly staking activity")?;
        Ok(rows
            .into_iter()
            .map(|row| WeeklyActivity {
                week: row.week,
                action_type: ActionType::from_label(&row.action_type),
                txn_count: row.txn_count,
                user_count: row.user_count,
            })
            .collect())
    }

    async fn weekly_net_flow(&self, range: &DateRange) -> anyhow::Result<Vec<WeeklyNetFlow>> {
        let sql = sql::weekly_net_flow(&self.fact_table);
        let started = Instant::now();
        let result = self.range_query(&sql, range).fetch_all::<WeeklyNetFlowRow>().await;
        Self::log_outcome(QueryKind::WeeklyNetFlow, range, started, &result);

        let rows = result.context("Failed to load weekly net staking flow")?;
        Ok(rows
            .into_iter()
            .map(|row| WeeklyNetFlow {
                week: row.week,
                staked_amount: row.staked_amount,
                unstaked_amount: row.unstaked_amount,
                net_amount: row.net_amount,
            })
            .collect())
    }

    async fn action_share(&self, range: &DateRange) -> anyhow::Result<Vec<ActionShare>> {
        let sql = sql::action_share(&self.fact_table);
        let started = Instant::now();
        let result = self.range_query(&sql, range).fetch_all::<ActionShareRow>().await;
        Self::log_outcome(QueryKind::ActionShare, range, started, &result);

        let rows = result.context("Failed to load staking action share")?;
        Ok(rows
            .into_iter()
            .map(|row| ActionShare {
                action_type: ActionType::from_label(&row.action_type),
                txn_count: row.txn_count,
                user_count: row.user_count,
                volume: row.volume,
            })
            .collect())
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        self.ping().await
    }
}

#[derive(Debug, clickhouse::Row, Deserialize)]
struct WeeklyActivityRow {
    #[serde(with = "clickhouse::serde::time::date")]
    week: Date,
    action_type: String,
    txn_count: u64,
    user_count: u64,
}

#[derive(Debug, clickhouse::Row, Deserialize)]
struct WeeklyNetFlowRow {
    #[serde(with = "clickhouse::serde::time::date")]
    week: Date,
    staked_amount: f64,
    unstaked_amount: f64,
    net_amount: f64,
}

#[derive(Debug, clickhouse::Row, Deserialize)]
struct ActionShareRow {
    action_type: String,
    txn_count: u64,
    user_count: u64,
    volume: f64,
}
