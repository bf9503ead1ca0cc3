//! Chart specifications handed to the UI.
//!
//! Specs only describe data and chart shape; drawing is the front end's job.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use super::shares::ShareRow;
use crate::db::{ActionType, WeeklyActivity, WeeklyNetFlow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    /// Bars on the primary axis, lines on the secondary axis.
    DualAxis,
    Donut,
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub week: Date,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    pub axis: Axis,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: &'static str,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Cartesian charts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<Series>,
    /// Donut and pie charts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub slices: Vec<Slice>,
}

/// One series per action label, taking `metric` from each weekly row.
fn activity_series(
    rows: &[WeeklyActivity],
    kind: SeriesKind,
    metric: impl Fn(&WeeklyActivity) -> u64,
) -> Vec<Series> {
    let mut by_action: BTreeMap<ActionType, Vec<Point>> = BTreeMap::new();
    for row in rows {
        by_action.entry(row.action_type).or_default().push(Point {
            week: row.week,
            value: metric(row) as f64,
        });
    }

    by_action
        .into_iter()
        .map(|(action, points)| Series {
            name: action.to_string(),
            kind,
            axis: Axis::Primary,
            points,
        })
        .collect()
}

/// Weekly transaction counts, stacked bars per action label.
pub fn weekly_transactions(rows: &[WeeklyActivity]) -> ChartSpec {
    ChartSpec {
        id: "weekly_transactions",
        title: "Weekly Staking Transactions by Action Type".to_string(),
        kind: ChartKind::Bar,
        x_label: Some("Week".to_string()),
        y_label: Some("Txns count".to_string()),
        series: activity_series(rows, SeriesKind::Bar, |r| r.txn_count),
        slices: Vec::new(),
    }
}

/// Weekly distinct delegators, one line per action label.
pub fn weekly_users(rows: &[WeeklyActivity]) -> ChartSpec {
    ChartSpec {
        id: "weekly_users",
        title: "Weekly Staking Users by Action Type".to_string(),
        kind: ChartKind::Line,
        x_label: Some("Week".to_string()),
        y_label: Some("Wallets count".to_string()),
        series: activity_series(rows, SeriesKind::Line, |r| r.user_count),
        slices: Vec::new(),
    }
}

/// Staked and unstaked bars with the net flow line on a second axis.
pub fn weekly_net_flow(rows: &[WeeklyNetFlow], token_symbol: &str) -> ChartSpec {
    let points = |value: fn(&WeeklyNetFlow) -> f64| -> Vec<Point> {
        rows.iter()
            .map(|row| Point {
                week: row.week,
                value: value(row),
            })
            .collect()
    };

    ChartSpec {
        id: "weekly_net_flow",
        title: "Weekly Staked, Unstaked and Net Staked Amount".to_string(),
        kind: ChartKind::DualAxis,
        x_label: Some("Week".to_string()),
        y_label: Some(format!("Amount ({})", token_symbol)),
        series: vec![
            Series {
                name: "Staked".to_string(),
                kind: SeriesKind::Bar,
                axis: Axis::Primary,
                points: points(|r| r.staked_amount),
            },
            Series {
                name: "UnStaked".to_string(),
                kind: SeriesKind::Bar,
                axis: Axis::Primary,
                points: points(|r| r.unstaked_amount),
            },
            Series {
                name: "Net Staked".to_string(),
                kind: SeriesKind::Line,
                axis: Axis::Secondary,
                points: points(|r| r.net_amount),
            },
        ],
        slices: Vec::new(),
    }
}

fn share_slices(rows: &[ShareRow], pick: fn(&ShareRow) -> (f64, f64)) -> Vec<Slice> {
    rows.iter()
        .map(|row| {
            let (value, percent) = pick(row);
            Slice {
                label: row.action_type.to_string(),
                value,
                percent,
            }
        })
        .collect()
}

fn share_chart(id: &'static str, title: &str, kind: ChartKind, slices: Vec<Slice>) -> ChartSpec {
    ChartSpec {
        id,
        title: title.to_string(),
        kind,
        x_label: None,
        y_label: None,
        series: Vec::new(),
        slices,
    }
}

pub fn transaction_share(rows: &[ShareRow]) -> ChartSpec {
    share_chart(
        "transaction_share",
        "Share of Transactions by Action Type",
        ChartKind::Donut,
        share_slices(rows, |r| (r.txn_count as f64, r.txn_pct)),
    )
}

pub fn volume_share(rows: &[ShareRow]) -> ChartSpec {
    share_chart(
        "volume_share",
        "Share of Volume by Action Type",
        ChartKind::Pie,
        share_slices(rows, |r| (r.volume, r.volume_pct)),
    )
}

pub fn user_share(rows: &[ShareRow]) -> ChartSpec {
    share_chart(
        "user_share",
        "Share of Users by Action Type",
        ChartKind::Pie,
        share_slices(rows, |r| (r.user_count as f64, r.user_pct)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ActionShare;
    use crate::dashboard::shares::share_percentages;
    use time::macros::date;

    fn activity(week: Date, action_type: ActionType, txns: u64, users: u64) -> WeeklyActivity {
        WeeklyActivity {
            week,
            action_type,
            txn_count: txns,
            user_count: users,
        }
    }

    #[test]
    fn test_activity_series_split_by_label() {
        let rows = vec![
            activity(date!(2022 - 01 - 03), ActionType::Stake, 4, 2),
            activity(date!(2022 - 01 - 03), ActionType::UnStake, 1, 1),
            activity(date!(2022 - 01 - 10), ActionType::Stake, 6, 3),
        ];

        let txns = weekly_transactions(&rows);
        assert_eq!(txns.kind, ChartKind::Bar);
        assert_eq!(txns.series.len(), 2);
        assert_eq!(txns.series[0].name, "Stake");
        assert_eq!(txns.series[0].points.len(), 2);
        assert_eq!(txns.series[0].points[1].value, 6.0);
        assert_eq!(txns.series[1].name, "UnStake");

        let users = weekly_users(&rows);
        assert_eq!(users.kind, ChartKind::Line);
        assert_eq!(users.series[0].points[0].value, 2.0);
        assert!(users.slices.is_empty());
    }

    #[test]
    fn test_net_flow_uses_secondary_axis_for_net() {
        let rows = vec![WeeklyNetFlow {
            week: date!(2022 - 01 - 03),
            staked_amount: 10.0,
            unstaked_amount: -4.0,
            net_amount: 6.0,
        }];

        let chart = weekly_net_flow(&rows, "AXL");
        assert_eq!(chart.kind, ChartKind::DualAxis);
        assert_eq!(chart.y_label.as_deref(), Some("Amount (AXL)"));

        let net = &chart.series[2];
        assert_eq!(net.kind, SeriesKind::Line);
        assert_eq!(net.axis, Axis::Secondary);
        assert_eq!(net.points[0].value, 6.0);
        assert_eq!(chart.series[1].points[0].value, -4.0);
    }

    #[test]
    fn test_share_charts() {
        let shares = share_percentages(&[
            ActionShare {
                action_type: ActionType::Stake,
                txn_count: 3,
                user_count: 1,
                volume: 30.0,
            },
            ActionShare {
                action_type: ActionType::UnStake,
                txn_count: 1,
                user_count: 1,
                volume: 10.0,
            },
        ]);

        let donut = transaction_share(&shares);
        assert_eq!(donut.kind, ChartKind::Donut);
        assert_eq!(donut.slices[0].label, "Stake");
        assert_eq!(donut.slices[0].percent, 75.0);

        assert_eq!(volume_share(&shares).slices[1].value, 10.0);
        assert_eq!(user_share(&shares).slices[1].percent, 50.0);
        assert!(user_share(&shares).series.is_empty());
    }
}
