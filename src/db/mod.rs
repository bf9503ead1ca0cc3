use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use log::info;

use crate::{
    config::{WarehouseBackend, WarehouseSettings},
    query::DateRange,
};

pub mod clickhouse;
pub mod fixture;
pub mod models;

pub use self::clickhouse::ClickhouseWarehouse;
pub use fixture::FixtureWarehouse;
pub use models::{
    ActionShare, ActionType, PeriodTotals, StakeAction, StakingEvent, SummaryStats,
    WeeklyActivity, WeeklyNetFlow,
};

/// Read-only access to the staking fact table.
///
/// Each method is one aggregation query: a pure function of the date range
/// and the events stored in the warehouse. Implementations hold the
/// connection handle; callers thread it explicitly instead of sharing
/// global state.
#[async_trait]
pub trait StakingSource: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    async fn period_totals(&self, range: &DateRange) -> anyhow::Result<PeriodTotals>;

    async fn summary_stats(&self, range: &DateRange) -> anyhow::Result<SummaryStats>;

    async fn weekly_activity(&self, range: &DateRange) -> anyhow::Result<Vec<WeeklyActivity>>;

    async fn weekly_net_flow(&self, range: &DateRange) -> anyhow::Result<Vec<WeeklyNetFlow>>;

    async fn action_share(&self, range: &DateRange) -> anyhow::Result<Vec<ActionShare>>;

    /// Verify the warehouse is still reachable.
    async fn health_check(&self) -> anyhow::Result<()>;
}

/// Open the configured warehouse.
///
/// Called once at startup. Any failure here is fatal for the process.
pub async fn connect(settings: &WarehouseSettings) -> anyhow::Result<Arc<dyn StakingSource>> {
    match settings.backend {
        WarehouseBackend::Clickhouse => {
            let warehouse = ClickhouseWarehouse::new(settings.clone()).await?;
            Ok(Arc::new(warehouse))
        },
        WarehouseBackend::Fixture => {
            let path = settings
                .fixture_path
                .as_deref()
                .context("warehouse.fixture_path is required for the fixture backend")?;
            let warehouse = FixtureWarehouse::from_json_file(path).await?;
            info!(
                "Loaded {} staking events from fixture {}",
                warehouse.event_count(),
                path
            );
            Ok(Arc::new(warehouse))
        },
    }
}
