//! Fund snapshot rebuilt from indexed events.
//!
//! Replays `investment_created` / `investment_withdrawn` rows in ledger order
//! with the contract's arithmetic: stablecoin share `amount * pct / 100`
//! (truncated), growing-assets share the remainder, percentage overwritten on
//! every deposit. A complete event history therefore reproduces the on-chain
//! accumulators exactly.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, EventRecord};

const FULL_ALLOCATION: u32 = 100;

fn as_string<S: Serializer>(value: &i128, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Replayed state of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    #[serde(serialize_with = "as_string")]
    pub amount: i128,
    pub stablecoin_percentage: u32,
    pub growing_assets_percentage: u32,
    /// Close time of the ledger holding the last deposit.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FundSnapshot {
    #[serde(serialize_with = "as_string")]
    pub stablecoin_pool: i128,
    #[serde(serialize_with = "as_string")]
    pub growing_assets_pool: i128,
    #[serde(serialize_with = "as_string")]
    pub total_funds: i128,
    pub minimum_investment: Option<String>,
    /// Last ledger folded into this snapshot.
    pub ledger: i64,
    #[serde(skip)]
    pub positions: BTreeMap<String, Position>,
}

impl FundSnapshot {
    /// Fold `events` (oldest first) into a snapshot.
    pub fn replay(events: &[EventRecord]) -> Result<Self> {
        let mut snapshot = Self::default();
        for event in events {
            snapshot.apply(event)?;
        }
        Ok(snapshot)
    }

    pub fn position(&self, participant: &str) -> Option<&Position> {
        self.positions.get(participant)
    }

    pub fn participant_count(&self) -> usize {
        self.positions.values().filter(|p| p.amount > 0).count()
    }

    fn apply(&mut self, event: &EventRecord) -> Result<()> {
        match event.kind() {
            EventKind::FundInitialized => {
                self.minimum_investment = event.amount.clone();
            }
            EventKind::InvestmentCreated => {
                let participant = participant_of(event)?;
                let amount = amount_of(event)?;
                let pct = event
                    .stablecoin_percentage
                    .and_then(|p| u32::try_from(p).ok())
                    .filter(|p| *p <= FULL_ALLOCATION)
                    .ok_or_else(|| {
                        IndexerError::EventParse(format!(
                            "event {} has no valid stablecoin_percentage",
                            event.id
                        ))
                    })?;
                let (stable, growing) = split(amount, pct, event.id)?;

                let position = self.positions.entry(participant).or_insert(Position {
                    amount: 0,
                    stablecoin_percentage: 0,
                    growing_assets_percentage: FULL_ALLOCATION,
                    timestamp: 0,
                });
                position.amount = add(position.amount, amount, event.id)?;
                position.stablecoin_percentage = pct;
                position.growing_assets_percentage = FULL_ALLOCATION - pct;
                position.timestamp = event.timestamp;

                self.stablecoin_pool = add(self.stablecoin_pool, stable, event.id)?;
                self.growing_assets_pool = add(self.growing_assets_pool, growing, event.id)?;
                self.total_funds = add(self.total_funds, amount, event.id)?;
            }
            EventKind::InvestmentWithdrawn => {
                let participant = participant_of(event)?;
                let amount = amount_of(event)?;
                let position = self
                    .positions
                    .get_mut(&participant)
                    .filter(|p| p.amount >= amount)
                    .ok_or_else(|| {
                        IndexerError::Replay(format!(
                            "event {}: withdrawal of {amount} exceeds replayed position of {participant}",
                            event.id
                        ))
                    })?;
                let (stable, growing) = split(amount, position.stablecoin_percentage, event.id)?;
                if stable > self.stablecoin_pool || growing > self.growing_assets_pool {
                    return Err(IndexerError::Replay(format!(
                        "event {}: withdrawal exceeds pool liquidity",
                        event.id
                    )));
                }

                position.amount -= amount;
                self.stablecoin_pool -= stable;
                self.growing_assets_pool -= growing;
                self.total_funds -= amount;
            }
            EventKind::Unknown => return Ok(()),
        }
        self.ledger = self.ledger.max(event.ledger);
        Ok(())
    }
}

fn participant_of(event: &EventRecord) -> Result<String> {
    event
        .participant
        .clone()
        .ok_or_else(|| IndexerError::EventParse(format!("event {} has no participant", event.id)))
}

fn amount_of(event: &EventRecord) -> Result<i128> {
    event
        .amount
        .as_deref()
        .and_then(|a| a.parse::<i128>().ok())
        .filter(|a| *a >= 0)
        .ok_or_else(|| {
            IndexerError::EventParse(format!("event {} has invalid amount {:?}", event.id, event.amount))
        })
}

fn split(amount: i128, pct: u32, id: i64) -> Result<(i128, i128)> {
    let stable = amount
        .checked_mul(pct as i128)
        .ok_or_else(|| IndexerError::Replay(format!("event {id}: amount overflow")))?
        / FULL_ALLOCATION as i128;
    Ok((stable, amount - stable))
}

fn add(a: i128, b: i128, id: i64) -> Result<i128> {
    a.checked_add(b)
        .ok_or_else(|| IndexerError::Replay(format!("event {id}: accumulator overflow")))
}
