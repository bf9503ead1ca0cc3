use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};

use crate::utils::week_start;

/// One on-chain staking action (warehouse fact table row).
///
/// Owned by the external indexing pipeline and never written here.
/// `tx_id` is not unique: several rows may share a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakingEvent {
    pub tx_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub block_timestamp: OffsetDateTime,
    pub action: StakeAction,
    /// Raw amount at 6-decimal fixed-point scale.
    pub amount: u64,
    pub delegator_address: String,
    pub tx_succeeded: bool,
}

impl StakingEvent {
    /// UTC calendar date of the block timestamp.
    pub fn date(&self) -> Date {
        self.block_timestamp.to_offset(UtcOffset::UTC).date()
    }

    pub fn week(&self) -> Date {
        week_start(self.date())
    }
}

/// Raw `action` column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum StakeAction {
    Delegate,
    Undelegate,
    Other,
}

impl From<String> for StakeAction {
    fn from(raw: String) -> Self {
        Self::from_raw(&raw)
    }
}

impl StakeAction {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "delegate" => StakeAction::Delegate,
            "undelegate" => StakeAction::Undelegate,
            _ => StakeAction::Other,
        }
    }
}

/// Display label an action is grouped under.
///
/// Variant order follows the labels' string order, which is how the
/// warehouse sorts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Other,
    Stake,
    UnStake,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Stake => "Stake",
            ActionType::UnStake => "UnStake",
            ActionType::Other => "Other",
        }
    }

    /// Parse a label produced by the warehouse. Unknown labels fold into `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Stake" => ActionType::Stake,
            "UnStake" => ActionType::UnStake,
            _ => ActionType::Other,
        }
    }
}

impl From<StakeAction> for ActionType {
    fn from(action: StakeAction) -> Self {
        match action {
            StakeAction::Delegate => ActionType::Stake,
            StakeAction::Undelegate => ActionType::UnStake,
            StakeAction::Other => ActionType::Other,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
