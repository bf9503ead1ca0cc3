use serde::Serialize;

use crate::{
    db::{ActionShare, ActionType},
    utils::round_to,
};

/// An [`ActionShare`] row with its percentage of each whole-range total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub action_type: ActionType,
    pub txn_count: u64,
    pub txn_pct: f64,
    pub user_count: u64,
    pub user_pct: f64,
    pub volume: f64,
    pub volume_pct: f64,
}

/// Percentage shares per action label, 2 decimals.
///
/// Each column is normalized on its own; a zero column yields 0% everywhere.
pub fn share_percentages(rows: &[ActionShare]) -> Vec<ShareRow> {
    let txns: u64 = rows.iter().map(|r| r.txn_count).sum();
    let users: u64 = rows.iter().map(|r| r.user_count).sum();
    let volume: f64 = rows.iter().map(|r| r.volume).sum();

    rows.iter()
        .map(|row| ShareRow {
            action_type: row.action_type,
            txn_count: row.txn_count,
            txn_pct: percent(row.txn_count as f64, txns as f64),
            user_count: row.user_count,
            user_pct: percent(row.user_count as f64, users as f64),
            volume: row.volume,
            volume_pct: percent(row.volume, volume),
        })
        .collect()
}

fn percent(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        round_to(part * 100.0 / total, 2)
    }
}
