//! In-memory staking warehouse.
//!
//! Holds a fixed set of [`StakingEvent`]s and answers the five aggregation
//! queries with the same semantics as the ClickHouse statements in
//! [`crate::query::sql`]: inclusive calendar-date bounds, Monday week
//! buckets, success filtering on amount-based queries only, zero-filled
//! outer joins and 2-decimal rounding. Used for offline demos and tests.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use anyhow::Context;
use async_trait::async_trait;
use log::debug;
use rustc_hash::FxHashSet;
use time::Date;

use crate::{
    db::{
        models::{
            ActionShare, ActionType, PeriodTotals, StakeAction, StakingEvent, SummaryStats,
            WeeklyActivity, WeeklyNetFlow,
        },
        StakingSource,
    },
    query::{DateRange, QueryKind},
    utils::{scaled_round, AXL_DECIMALS},
};

pub struct FixtureWarehouse {
    events: Vec<StakingEvent>,
    /// Number of aggregation queries answered so far.
    round_trips: AtomicU64,
}

/// Distinct transactions and delegators seen in one group.
#[derive(Default)]
struct DistinctCounts<'a> {
    txns: FxHashSet<&'a str>,
    users: FxHashSet<&'a str>,
    /// Raw amount sum.
    volume: i128,
}

impl<'a> DistinctCounts<'a> {
    fn add(&mut self, event: &'a StakingEvent) {
        self.txns.insert(event.tx_id.as_str());
        self.users.insert(event.delegator_address.as_str());
        self.volume += event.amount as i128;
    }
}

/// Per-week raw delegate and undelegate sums, both unsigned.
#[derive(Default, Clone, Copy)]
struct WeekFlow {
    staked: i128,
    unstaked: i128,
}

/// Raw amount (or raw sum divided by `divisor`) in AXL at 2 decimals.
fn axl(raw: i128, divisor: u64) -> f64 {
    scaled_round(raw, AXL_DECIMALS, divisor, 2)
}

impl FixtureWarehouse {
    pub fn new(events: Vec<StakingEvent>) -> Self {
        Self {
            events,
            round_trips: AtomicU64::new(0),
        }
    }

    /// Load events from a JSON array file.
    pub async fn from_json_file(path: &str) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read fixture {}", path))?;
        let events: Vec<StakingEvent> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse fixture {}", path))?;
        Ok(Self::new(events))
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::Relaxed)
    }

    fn record_round_trip(&self, kind: QueryKind, range: &DateRange) {
        let n = self.round_trips.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Fixture {} query for {} (round trip #{})", kind, range, n);
    }

    fn in_range<'a>(&'a self, range: &'a DateRange) -> impl Iterator<Item = &'a StakingEvent> + 'a {
        self.events.iter().filter(move |e| range.contains(e.date()))
    }

    fn succeeded_in_range<'a>(
        &'a self,
        range: &'a DateRange,
    ) -> impl Iterator<Item = &'a StakingEvent> + 'a {
        self.in_range(range).filter(|e| e.tx_succeeded)
    }

    /// Succeeded delegate/undelegate sums per week. A week appears if either
    /// side has activity; the missing side stays 0.
    fn weekly_flows(&self, range: &DateRange) -> BTreeMap<Date, WeekFlow> {
        let mut weeks: BTreeMap<Date, WeekFlow> = BTreeMap::new();
        for event in self.succeeded_in_range(range) {
            match event.action {
                StakeAction::Delegate => {
                    weeks.entry(event.week()).or_default().staked += event.amount as i128;
                },
                StakeAction::Undelegate => {
                    weeks.entry(event.week()).or_default().unstaked += event.amount as i128;
                },
                StakeAction::Other => {},
            }
        }
        weeks
    }
}

#[async_trait]
impl StakingSource for FixtureWarehouse {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn period_totals(&self, range: &DateRange) -> anyhow::Result<PeriodTotals> {
        self.record_round_trip(QueryKind::Totals, range);

        let (staked, unstaked, net) = self.weekly_flows(range).values().fold(
            (0i128, 0i128, 0i128),
            |(staked, unstaked, net), week| {
                (
                    staked + week.staked,
                    unstaked + week.unstaked,
                    net + (week.staked - week.unstaked),
                )
            },
        );

        Ok(PeriodTotals {
            total_staked: axl(staked, 1),
            total_unstaked: axl(unstaked, 1),
            total_net_staked: axl(net, 1),
        })
    }

    async fn summary_stats(&self, range: &DateRange) -> anyhow::Result<SummaryStats> {
        self.record_round_trip(QueryKind::SummaryStats, range);

        let mut stakes = DistinctCounts::default();
        let mut stake_rows = 0u64;
        let mut unstake_txns: FxHashSet<&str> = FxHashSet::default();

        for event in self.succeeded_in_range(range) {
            match event.action {
                StakeAction::Delegate => {
                    stakes.add(event);
                    stake_rows += 1;
                },
                StakeAction::Undelegate => {
                    unstake_txns.insert(event.tx_id.as_str());
                },
                StakeAction::Other => {},
            }
        }

        let stake_count = stakes.txns.len() as u64;
        let staker_count = stakes.users.len() as u64;

        let avg_staked_per_txn = (stake_rows > 0).then(|| axl(stakes.volume, stake_rows));
        let avg_stakes_per_user = (staker_count > 0)
            .then(|| scaled_round(stake_count as i128, 0, staker_count, 0));
        let avg_staked_per_user = (staker_count > 0).then(|| axl(stakes.volume, staker_count));

        Ok(SummaryStats {
            stake_count,
            staker_count,
            avg_staked_per_txn,
            avg_stakes_per_user,
            avg_staked_per_user,
            unstake_count: unstake_txns.len() as u64,
        })
    }

    async fn weekly_activity(&self, range: &DateRange) -> anyhow::Result<Vec<WeeklyActivity>> {
        self.record_round_trip(QueryKind::WeeklyActivity, range);

        // Every status counts here, unlike the amount-based queries
        let mut groups: BTreeMap<(Date, ActionType), DistinctCounts> = BTreeMap::new();
        for event in self.in_range(range) {
            groups
                .entry((event.week(), ActionType::from(event.action)))
                .or_default()
                .add(event);
        }

        Ok(groups
            .into_iter()
            .map(|((week, action_type), counts)| WeeklyActivity {
                week,
                action_type,
                txn_count: counts.txns.len() as u64,
                user_count: counts.users.len() as u64,
            })
            .collect())
    }

    async fn weekly_net_flow(&self, range: &DateRange) -> anyhow::Result<Vec<WeeklyNetFlow>> {
        self.record_round_trip(QueryKind::WeeklyNetFlow, range);

        Ok(self
            .weekly_flows(range)
            .into_iter()
            .map(|(week, flow)| {
                let unstaked = -flow.unstaked;
                WeeklyNetFlow {
                    week,
                    staked_amount: axl(flow.staked, 1),
                    unstaked_amount: axl(unstaked, 1),
                    net_amount: axl(flow.staked + unstaked, 1),
                }
            })
            .collect())
    }

    async fn action_share(&self, range: &DateRange) -> anyhow::Result<Vec<ActionShare>> {
        self.record_round_trip(QueryKind::ActionShare, range);

        let mut groups: BTreeMap<ActionType, DistinctCounts> = BTreeMap::new();
        for event in self.succeeded_in_range(range) {
            groups.entry(ActionType::from(event.action)).or_default().add(event);
        }

        Ok(groups
            .into_iter()
            .map(|(action_type, counts)| ActionShare {
                action_type,
                txn_count: counts.txns.len() as u64,
                user_count: counts.users.len() as u64,
                volume: axl(counts.volume, 1),
            })
            .collect())
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
