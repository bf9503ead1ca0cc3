use std::time::{Duration, Instant};

use anyhow::Context;
use clickhouse::{query::Query, Client};
use log::{debug, error, info};
use url::Url;

use crate::{
    config::WarehouseSettings,
    query::{DateRange, QueryKind, RangeSql},
};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Exponential backoff from 200ms, capped at [`MAX_RETRY_DELAY`].
fn retry_delay(attempt: u32) -> Duration {
    let millis = 2_u64.saturating_pow(attempt).saturating_mul(100);
    Duration::from_millis(millis).min(MAX_RETRY_DELAY)
}

/// ClickHouse connection handle for the staking fact table.
///
/// Read-only: the only statements issued are the five aggregation queries
/// and `SELECT 1` probes.
pub struct ClickhouseWarehouse {
    pub client: Client,
    pub fact_table: String,
}

impl ClickhouseWarehouse {
    pub async fn new(settings: WarehouseSettings) -> anyhow::Result<Self> {
        let url = Url::parse(&settings.url)
            .with_context(|| format!("Invalid warehouse url '{}'", settings.url))?;
        let user = settings
            .user
            .clone()
            .context("warehouse.user is required for the clickhouse backend")?;
        let password = settings
            .password
            .clone()
            .context("warehouse.password is required for the clickhouse backend")?;

        info!("Connecting to ClickHouse at {}", url.host_str().unwrap_or("<unknown>"));

        let client = Client::default()
            .with_url(url.as_str())
            .with_user(user)
            .with_password(password)
            .with_database(settings.database.clone())
            .with_validation(false);

        let mut retries = 0;
        let max_retries = settings.connect_retries.max(1);

        loop {
            match client.query("SELECT 1").fetch_one::<u8>().await {
                Ok(_) => {
                    info!("Successfully connected to ClickHouse");
                    break;
                },
                Err(e) => {
                    retries += 1;

                    if retries >= max_retries {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to ClickHouse after {} attempts: {}",
                            max_retries,
                            e
                        ));
                    }

                    let delay = retry_delay(retries);
                    log::warn!(
                        "Failed to connect to ClickHouse (attempt {}/{}), retrying in {:?}... Error: {}",
                        retries,
                        max_retries,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                },
            }
        }

        Ok(Self {
            client,
            fact_table: settings.fact_table,
        })
    }

    /// Build a query with every range filter bound to (start, end).
    pub(crate) fn range_query(&self, sql: &RangeSql, range: &DateRange) -> Query {
        let (start, end) = range.bounds();
        let mut query = self.client.query(&sql.text);
        for _ in 0..sql.range_filters {
            query = query.bind(start.as_str()).bind(end.as_str());
        }
        query
    }

    /// Log the outcome of one aggregation query.
    pub(crate) fn log_outcome<T>(
        kind: QueryKind,
        range: &DateRange,
        started: Instant,
        result: &clickhouse::error::Result<Vec<T>>,
    ) {
        let duration_ms = started.elapsed().as_millis();
        match result {
            Ok(rows) => debug!(
                "ClickHouse {} query for {} returned {} rows in {}ms",
                kind,
                range,
                rows.len(),
                duration_ms
            ),
            Err(e) => error!(
                "ClickHouse {} query for {} failed after {}ms: {}",
                kind, range, duration_ms, e
            ),
        }
    }

    /// Health check - verify connection is still alive
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.client
            .query("SELECT 1")
            .fetch_one::<u8>()
            .await
            .context("ClickHouse health check failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles() {
        assert_eq!(retry_delay(1), Duration::from_millis(200));
        assert_eq!(retry_delay(2), Duration::from_millis(400));
        assert_eq!(retry_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn test_retry_delay_is_capped_for_large_retry_counts() {
        assert_eq!(retry_delay(9), MAX_RETRY_DELAY);
        assert_eq!(retry_delay(58), MAX_RETRY_DELAY);
        assert_eq!(retry_delay(u32::MAX), MAX_RETRY_DELAY);
    }
}
