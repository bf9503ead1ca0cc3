//! Result cache in front of the warehouse.
//!
//! Maps (query kind, start, end) to the derived result for the lifetime of
//! the process. There is no TTL, no capacity bound and no automatic
//! invalidation: results go stale if the warehouse changes underneath, until
//! a caller refreshes an entry or clears the cache.
//!
//! A warm entry is served without touching the warehouse. Two cold requests
//! for the same key racing each other may both query the warehouse; the
//! later insert wins and both values are equal.

use std::sync::Arc;

use anyhow::bail;
use log::debug;
use moka::future::Cache;

use crate::{
    db::{ActionShare, PeriodTotals, StakingSource, SummaryStats, WeeklyActivity, WeeklyNetFlow},
    query::{DateRange, QueryKind},
};

/// Cache key: which query, over which range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: QueryKind,
    pub range: DateRange,
}

/// A cached derived entity. Sequences are shared so a hit is a refcount bump.
#[derive(Debug, Clone)]
pub enum CachedResult {
    Totals(PeriodTotals),
    SummaryStats(SummaryStats),
    WeeklyActivity(Arc<Vec<WeeklyActivity>>),
    WeeklyNetFlow(Arc<Vec<WeeklyNetFlow>>),
    ActionShare(Arc<Vec<ActionShare>>),
}

impl CachedResult {
    pub fn kind(&self) -> QueryKind {
        match self {
            CachedResult::Totals(_) => QueryKind::Totals,
            CachedResult::SummaryStats(_) => QueryKind::SummaryStats,
            CachedResult::WeeklyActivity(_) => QueryKind::WeeklyActivity,
            CachedResult::WeeklyNetFlow(_) => QueryKind::WeeklyNetFlow,
            CachedResult::ActionShare(_) => QueryKind::ActionShare,
        }
    }
}

/// How a lookup treats an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Serve a cached value when present.
    #[default]
    UseCached,
    /// Skip the cached value, query the warehouse and overwrite the entry.
    Refresh,
}

/// The five aggregation queries, memoized.
#[derive(Clone)]
pub struct QueryCache {
    source: Arc<dyn StakingSource>,
    results: Cache<CacheKey, CachedResult>,
}

impl QueryCache {
    pub fn new(source: Arc<dyn StakingSource>) -> Self {
        // Unbounded and without expiry: entries live until cleared
        let results = Cache::builder().name("staking-query-results").build();

        Self {
            source,
            results,
        }
    }

    /// The warehouse handle behind the cache.
    pub fn source(&self) -> &Arc<dyn StakingSource> {
        &self.source
    }

    pub async fn period_totals(
        &self,
        range: &DateRange,
        policy: CachePolicy,
    ) -> anyhow::Result<PeriodTotals> {
        match self.load(QueryKind::Totals, range, policy).await? {
            CachedResult::Totals(totals) => Ok(totals),
            other => mismatch(QueryKind::Totals, &other),
        }
    }

    pub async fn summary_stats(
        &self,
        range: &DateRange,
        policy: CachePolicy,
    ) -> anyhow::Result<SummaryStats> {
        match self.load(QueryKind::SummaryStats, range, policy).await? {
            CachedResult::SummaryStats(stats) => Ok(stats),
            other => mismatch(QueryKind::SummaryStats, &other),
        }
    }

    pub async fn weekly_activity(
        &self,
        range: &DateRange,
        policy: CachePolicy,
    ) -> anyhow::Result<Arc<Vec<WeeklyActivity>>> {
        match self.load(QueryKind::WeeklyActivity, range, policy).await? {
            CachedResult::WeeklyActivity(rows) => Ok(rows),
            other => mismatch(QueryKind::WeeklyActivity, &other),
        }
    }

    pub async fn weekly_net_flow(
        &self,
        range: &DateRange,
        policy: CachePolicy,
    ) -> anyhow::Result<Arc<Vec<WeeklyNetFlow>>> {
        match self.load(QueryKind::WeeklyNetFlow, range, policy).await? {
            CachedResult::WeeklyNetFlow(rows) => Ok(rows),
            other => mismatch(QueryKind::WeeklyNetFlow, &other),
        }
    }

    pub async fn action_share(
        &self,
        range: &DateRange,
        policy: CachePolicy,
    ) -> anyhow::Result<Arc<Vec<ActionShare>>> {
        match self.load(QueryKind::ActionShare, range, policy).await? {
            CachedResult::ActionShare(rows) => Ok(rows),
            other => mismatch(QueryKind::ActionShare, &other),
        }
    }

    /// Drop every cached result.
    pub fn invalidate_all(&self) {
        self.results.invalidate_all();
        debug!("Cleared staking query cache");
    }

    /// Drop one cached result.
    pub async fn invalidate(&self, kind: QueryKind, range: &DateRange) {
        self.results
            .invalidate(&CacheKey {
                kind,
                range: *range,
            })
            .await;
    }

    /// Number of cached results, once pending inserts are applied.
    pub async fn entry_count(&self) -> u64 {
        self.results.run_pending_tasks().await;
        self.results.entry_count()
    }

    async fn load(
        &self,
        kind: QueryKind,
        range: &DateRange,
        policy: CachePolicy,
    ) -> anyhow::Result<CachedResult> {
        let key = CacheKey {
            kind,
            range: *range,
        };

        if policy == CachePolicy::UseCached {
            if let Some(hit) = self.results.get(&key).await {
                debug!("Cache hit for {} {}", kind, range);
                return Ok(hit);
            }
        }

        debug!(
            "Cache {} for {} {}, querying {}",
            if policy == CachePolicy::Refresh { "refresh" } else { "miss" },
            kind,
            range,
            self.source.name()
        );

        let value = match kind {
            QueryKind::Totals => CachedResult::Totals(self.source.period_totals(range).await?),
            QueryKind::SummaryStats => {
                CachedResult::SummaryStats(self.source.summary_stats(range).await?)
            },
            QueryKind::WeeklyActivity => {
                CachedResult::WeeklyActivity(Arc::new(self.source.weekly_activity(range).await?))
            },
            QueryKind::WeeklyNetFlow => {
                CachedResult::WeeklyNetFlow(Arc::new(self.source.weekly_net_flow(range).await?))
            },
            QueryKind::ActionShare => {
                CachedResult::ActionShare(Arc::new(self.source.action_share(range).await?))
            },
        };

        // Failed queries return above and are never cached
        self.results.insert(key, value.clone()).await;
        Ok(value)
    }
}

fn mismatch<T>(expected: QueryKind, found: &CachedResult) -> anyhow::Result<T> {
    bail!(
        "Cache entry for {} holds a {} result",
        expected,
        found.kind()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FixtureWarehouse, StakeAction, StakingEvent};
    use time::macros::{date, datetime};

    fn warehouse() -> Arc<FixtureWarehouse> {
        let events = vec![
            StakingEvent {
                tx_id: "d1".to_string(),
                block_timestamp: datetime!(2022-01-05 14:00 UTC),
                action: StakeAction::Delegate,
                amount: 5_000_000,
                delegator_address: "axelar1a".to_string(),
                tx_succeeded: true,
            },
            StakingEvent {
                tx_id: "u1".to_string(),
                block_timestamp: datetime!(2022-01-12 14:00 UTC),
                action: StakeAction::Undelegate,
                amount: 2_000_000,
                delegator_address: "axelar1a".to_string(),
                tx_succeeded: true,
            },
        ];
        Arc::new(FixtureWarehouse::new(events))
    }

    fn january() -> DateRange {
        DateRange::new(date!(2022 - 01 - 01), date!(2022 - 01 - 31))
    }

    #[tokio::test]
    async fn test_repeated_query_is_served_from_cache() {
        let fixture = warehouse();
        let cache = QueryCache::new(fixture.clone());
        let range = january();

        let first = cache.period_totals(&range, CachePolicy::UseCached).await.unwrap();
        let second = cache.period_totals(&range, CachePolicy::UseCached).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fixture.round_trips(), 1);
    }

    #[tokio::test]
    async fn test_every_query_kind_is_memoized() {
        let fixture = warehouse();
        let cache = QueryCache::new(fixture.clone());
        let range = january();

        for _ in 0..2 {
            cache.period_totals(&range, CachePolicy::UseCached).await.unwrap();
            cache.summary_stats(&range, CachePolicy::UseCached).await.unwrap();
            cache.weekly_activity(&range, CachePolicy::UseCached).await.unwrap();
            cache.weekly_net_flow(&range, CachePolicy::UseCached).await.unwrap();
            cache.action_share(&range, CachePolicy::UseCached).await.unwrap();
        }

        assert_eq!(fixture.round_trips(), 5);
        assert_eq!(cache.entry_count().await, 5);
    }

    #[tokio::test]
    async fn test_cached_sequences_are_deep_equal() {
        let fixture = warehouse();
        let cache = QueryCache::new(fixture.clone());
        let range = january();

        let first = cache.weekly_net_flow(&range, CachePolicy::UseCached).await.unwrap();
        let second = cache.weekly_net_flow(&range, CachePolicy::UseCached).await.unwrap();

        assert_eq!(*first, *second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn test_different_range_misses() {
        let fixture = warehouse();
        let cache = QueryCache::new(fixture.clone());

        cache.period_totals(&january(), CachePolicy::UseCached).await.unwrap();
        let first_week = DateRange::new(date!(2022 - 01 - 01), date!(2022 - 01 - 08));
        let totals = cache.period_totals(&first_week, CachePolicy::UseCached).await.unwrap();

        assert_eq!(totals.total_unstaked, 0.0);
        assert_eq!(fixture.round_trips(), 2);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_and_overwrites() {
        let fixture = warehouse();
        let cache = QueryCache::new(fixture.clone());
        let range = january();

        cache.action_share(&range, CachePolicy::UseCached).await.unwrap();
        cache.action_share(&range, CachePolicy::Refresh).await.unwrap();
        assert_eq!(fixture.round_trips(), 2);
        assert_eq!(cache.entry_count().await, 1);

        cache.action_share(&range, CachePolicy::UseCached).await.unwrap();
        assert_eq!(fixture.round_trips(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_requery() {
        let fixture = warehouse();
        let cache = QueryCache::new(fixture.clone());
        let range = january();

        cache.summary_stats(&range, CachePolicy::UseCached).await.unwrap();
        assert_eq!(cache.entry_count().await, 1);
        cache.invalidate_all();
        cache.summary_stats(&range, CachePolicy::UseCached).await.unwrap();

        assert_eq!(fixture.round_trips(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_single_entry() {
        let fixture = warehouse();
        let cache = QueryCache::new(fixture.clone());
        let range = january();

        cache.period_totals(&range, CachePolicy::UseCached).await.unwrap();
        cache.summary_stats(&range, CachePolicy::UseCached).await.unwrap();
        cache.invalidate(QueryKind::Totals, &range).await;

        cache.period_totals(&range, CachePolicy::UseCached).await.unwrap();
        cache.summary_stats(&range, CachePolicy::UseCached).await.unwrap();
        assert_eq!(fixture.round_trips(), 3);
    }

    #[tokio::test]
    async fn test_warm_concurrent_requests_skip_warehouse() {
        let fixture = warehouse();
        let cache = QueryCache::new(fixture.clone());
        let range = january();

        cache.weekly_activity(&range, CachePolicy::UseCached).await.unwrap();

        let lookups = (0..16).map(|_| cache.weekly_activity(&range, CachePolicy::UseCached));
        let results = futures::future::try_join_all(lookups).await.unwrap();

        assert_eq!(results.len(), 16);
        assert_eq!(fixture.round_trips(), 1);
    }
}
