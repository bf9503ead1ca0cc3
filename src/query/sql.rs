//! ClickHouse text of the aggregation query set.
//!
//! Every statement reads the staking fact table only. Date bounds are `?`
//! placeholders bound at execution time, always as (start, end) pairs in the
//! order the range filters appear in the text.
//!
//! Amount-based statements keep only `tx_succeeded = true` rows. Weekly
//! activity counts every row regardless of status.
//!
//! Amounts stay Decimal until the final `toFloat64`: Decimal `round` breaks
//! ties away from zero, Float64 `round` does not. Dates and weeks are taken
//! in UTC whatever the server timezone.

use super::QueryKind;

/// Event UTC calendar date within the inclusive [start, end] bounds.
const RANGE_FILTER: &str = "toDate(block_timestamp, 'UTC') >= toDate(?) \
     AND toDate(block_timestamp, 'UTC') <= toDate(?)";

/// Monday of the event's UTC week.
const WEEK: &str = "toMonday(block_timestamp, 'UTC')";

/// Raw 6-decimal amount scaled to AXL, exact.
const SCALED_AMOUNT: &str = "toDecimal128(amount, 6) / 1000000";

/// Display label for the raw action column.
const ACTION_LABEL: &str =
    "multiIf(action = 'delegate', 'Stake', action = 'undelegate', 'UnStake', 'Other')";

/// A statement plus the number of range filters it contains.
#[derive(Debug, Clone)]
pub struct RangeSql {
    pub text: String,
    /// Each filter takes two binds: start then end.
    pub range_filters: usize,
}

pub fn for_kind(kind: QueryKind, table: &str) -> RangeSql {
    match kind {
        QueryKind::Totals => totals(table),
        QueryKind::SummaryStats => summary_stats(table),
        QueryKind::WeeklyActivity => weekly_activity(table),
        QueryKind::WeeklyNetFlow => weekly_net_flow(table),
        QueryKind::ActionShare => action_share(table),
    }
}

/// Per-week succeeded amount for one raw action, optionally negated.
fn weekly_amount_cte(name: &str, table: &str, action: &str, column: &str, sign: &str) -> String {
    format!(
        r#"{name} AS (
            SELECT
                {WEEK} AS week,
                {sign}sum({SCALED_AMOUNT}) AS {column}
            FROM {table}
            WHERE action = '{action}'
              AND tx_succeeded = true
              AND {RANGE_FILTER}
            GROUP BY week
        )"#
    )
}

/// Staked, unstaked and net totals over the whole range.
///
/// Weeks present on only one side survive the full join with the other
/// side coalesced to 0, whatever `join_use_nulls` says.
pub fn totals(table: &str) -> RangeSql {
    let delegate = weekly_amount_cte("delegate", table, "delegate", "amount_staked", "");
    let undelegate = weekly_amount_cte("undelegate", table, "undelegate", "amount_unstaked", "");

    let text = format!(
        r#"
        WITH {delegate},
        {undelegate},
        weekly AS (
            SELECT
                week,
                coalesce(amount_staked, 0) AS staked,
                coalesce(amount_unstaked, 0) AS unstaked,
                staked - unstaked AS net
            FROM delegate
            FULL OUTER JOIN undelegate USING (week)
        )
        SELECT
            toFloat64(round(sum(staked), 2)) AS total_staked,
            toFloat64(round(sum(unstaked), 2)) AS total_unstaked,
            toFloat64(round(sum(net), 2)) AS total_net_staked
        FROM weekly
    "#
    );

    RangeSql {
        text,
        range_filters: 2,
    }
}

/// Delegate-side counts and averages cross joined with the undelegate count.
pub fn summary_stats(table: &str) -> RangeSql {
    let text = format!(
        r#"
        SELECT
            s.stake_count AS stake_count,
            s.staker_count AS staker_count,
            s.avg_staked_per_txn AS avg_staked_per_txn,
            s.avg_stakes_per_user AS avg_stakes_per_user,
            s.avg_staked_per_user AS avg_staked_per_user,
            u.unstake_count AS unstake_count
        FROM (
            SELECT
                uniqExact(tx_id) AS stake_count,
                uniqExact(delegator_address) AS staker_count,
                if(count() = 0, NULL, toFloat64(round(sum({SCALED_AMOUNT}) / count(), 2))) AS avg_staked_per_txn,
                if(staker_count = 0, NULL, toFloat64(intDiv(2 * stake_count + staker_count, 2 * staker_count))) AS avg_stakes_per_user,
                if(staker_count = 0, NULL, toFloat64(round(sum({SCALED_AMOUNT}) / staker_count, 2))) AS avg_staked_per_user
            FROM {table}
            WHERE action = 'delegate'
              AND tx_succeeded = true
              AND {RANGE_FILTER}
        ) AS s
        CROSS JOIN (
            SELECT
                uniqExact(tx_id) AS unstake_count
            FROM {table}
            WHERE action = 'undelegate'
              AND tx_succeeded = true
              AND {RANGE_FILTER}
        ) AS u
    "#
    );

    RangeSql {
        text,
        range_filters: 2,
    }
}

/// Weekly distinct transactions and delegators per action label, all statuses.
pub fn weekly_activity(table: &str) -> RangeSql {
    let text = format!(
        r#"
        SELECT
            {WEEK} AS week,
            {ACTION_LABEL} AS action_type,
            uniqExact(tx_id) AS txn_count,
            uniqExact(delegator_address) AS user_count
        FROM {table}
        WHERE {RANGE_FILTER}
        GROUP BY week, action_type
        ORDER BY week ASC, action_type ASC
    "#
    );

    RangeSql {
        text,
        range_filters: 1,
    }
}

/// Weekly staked, negated unstaked and net amounts.
pub fn weekly_net_flow(table: &str) -> RangeSql {
    let delegate = weekly_amount_cte("delegate", table, "delegate", "amount_staked", "");
    let undelegate =
        weekly_amount_cte("undelegate", table, "undelegate", "amount_unstaked", "-");

    let text = format!(
        r#"
        WITH {delegate},
        {undelegate}
        SELECT
            week,
            toFloat64(round(coalesce(amount_staked, 0), 2)) AS staked_amount,
            toFloat64(round(coalesce(amount_unstaked, 0), 2)) AS unstaked_amount,
            toFloat64(round(coalesce(amount_staked, 0) + coalesce(amount_unstaked, 0), 2)) AS net_amount
        FROM delegate
        FULL OUTER JOIN undelegate USING (week)
        ORDER BY week ASC
    "#
    );

    RangeSql {
        text,
        range_filters: 2,
    }
}

/// Whole-range breakdown per action label.
pub fn action_share(table: &str) -> RangeSql {
    let text = format!(
        r#"
        SELECT
            {ACTION_LABEL} AS action_type,
            uniqExact(tx_id) AS txn_count,
            uniqExact(delegator_address) AS user_count,
            toFloat64(round(sum({SCALED_AMOUNT}), 2)) AS volume
        FROM {table}
        WHERE tx_succeeded = true
          AND {RANGE_FILTER}
        GROUP BY action_type
        ORDER BY action_type ASC
    "#
    );

    RangeSql {
        text,
        range_filters: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "axelar.fact_staking";

    #[test]
    fn test_placeholders_match_declared_range_filters() {
        for kind in QueryKind::ALL {
            let sql = for_kind(kind, TABLE);
            assert_eq!(
                sql.text.matches('?').count(),
                sql.range_filters * 2,
                "placeholder count mismatch for {}",
                kind
            );
        }
    }

    #[test]
    fn test_weekly_activity_ignores_success_flag() {
        let sql = weekly_activity(TABLE);
        assert!(!sql.text.contains("tx_succeeded"));
    }

    #[test]
    fn test_amount_queries_filter_on_success() {
        for sql in [totals(TABLE), summary_stats(TABLE), weekly_net_flow(TABLE)] {
            assert_eq!(sql.text.matches("tx_succeeded = true").count(), 2);
        }
        assert_eq!(action_share(TABLE).text.matches("tx_succeeded = true").count(), 1);
    }

    #[test]
    fn test_net_flow_negates_unstaked_side_only() {
        let sql = weekly_net_flow(TABLE);
        assert_eq!(sql.text.matches("-sum(").count(), 1);
        assert!(sql.text.contains("-sum(toDecimal128(amount, 6) / 1000000) AS amount_unstaked"));
        assert!(sql.text.contains("FULL OUTER JOIN undelegate USING (week)"));
        assert!(sql.text.contains("coalesce(amount_staked, 0)"));
        assert!(sql.text.contains("coalesce(amount_unstaked, 0)"));
    }

    #[test]
    fn test_totals_zero_fill_missing_side() {
        let sql = totals(TABLE);
        assert!(sql.text.contains("coalesce(amount_staked, 0) AS staked"));
        assert!(sql.text.contains("coalesce(amount_unstaked, 0) AS unstaked"));
        assert!(sql.text.contains("staked - unstaked AS net"));
    }

    #[test]
    fn test_amounts_round_as_decimal() {
        for kind in QueryKind::ALL {
            let text = for_kind(kind, TABLE).text;
            assert!(!text.contains("pow(10"), "{} scales through Float64", kind);
            // Every rounding happens before the Float64 cast
            assert_eq!(
                text.matches("round(").count(),
                text.matches("toFloat64(round(").count(),
                "{} rounds a Float64",
                kind
            );
        }
        assert!(summary_stats(TABLE)
            .text
            .contains("intDiv(2 * stake_count + staker_count, 2 * staker_count)"));
    }

    #[test]
    fn test_dates_and_weeks_are_utc() {
        for kind in QueryKind::ALL {
            let text = for_kind(kind, TABLE).text;
            assert!(!text.contains("toDate(block_timestamp)"));
            assert!(!text.contains("toMonday(block_timestamp)"));
        }
        assert!(weekly_activity(TABLE).text.contains("toMonday(block_timestamp, 'UTC') AS week"));
        assert!(totals(TABLE).text.contains("toDate(block_timestamp, 'UTC') >= toDate(?)"));
    }

    #[test]
    fn test_table_location_is_configurable() {
        for kind in QueryKind::ALL {
            let sql = for_kind(kind, "warehouse.staking_events");
            assert!(sql.text.contains("FROM warehouse.staking_events"));
            assert!(!sql.text.contains(TABLE));
        }
    }
}
