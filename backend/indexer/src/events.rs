//! Event types emitted by the PensionFund contract, as seen by the indexer.
//!
//! These mirror the contract events in `contracts/pension_fund/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the PensionFund contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The fund was configured (`init` topic).
    FundInitialized,
    /// A deposit or top-up (`invested` topic).
    InvestmentCreated,
    /// A payout (`withdrawn` topic).
    InvestmentWithdrawn,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "init" => Self::FundInitialized,
            "invested" => Self::InvestmentCreated,
            "withdrawn" => Self::InvestmentWithdrawn,
            _ => Self::Unknown,
        }
    }

    /// Identifier stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FundInitialized => "fund_initialized",
            Self::InvestmentCreated => "investment_created",
            Self::InvestmentWithdrawn => "investment_withdrawn",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(value: &str) -> Self {
        match value {
            "fund_initialized" => Self::FundInitialized,
            "investment_created" => Self::InvestmentCreated,
            "investment_withdrawn" => Self::InvestmentWithdrawn,
            _ => Self::Unknown,
        }
    }
}

/// A decoded PensionFund event, ready to be stored.
///
/// Amounts are `i128` on-chain and kept as decimal strings here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundEvent {
    /// RPC event id (`<toid>-<index>`); unique per emitted event.
    pub event_id: String,
    pub event_type: String,
    pub participant: Option<String>,
    pub amount: Option<String>,
    pub stablecoin_percentage: Option<i64>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// An event row as read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub participant: Option<String>,
    pub amount: Option<String>,
    pub stablecoin_percentage: Option<i64>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

impl EventRecord {
    pub fn kind(&self) -> EventKind {
        EventKind::from_stored(&self.event_type)
    }
}
