//! # Types
//!
//! Data structures shared by the PensionFund entry points and storage layer.
//!
//! ## Stored position / public record split
//!
//! A participant's investment is persisted as a [`Position`] holding only the
//! independent fields. `growing_assets_percentage` is derived, so it is never
//! written to the ledger; the public [`Investment`] is reconstructed on read
//! with [`Position::to_investment`].
//!
//! ## Record lifecycle
//!
//! ```text
//! (none) ──invest──► active (amount > 0) ──withdraw all──► inactive (amount == 0)
//!                        ▲   │ invest / partial withdraw        │
//!                        │   └──────────────┘                   │
//!                        └──────────────invest──────────────────┘
//! ```
//!
//! Records are never removed; an inactive record stays queryable.

use soroban_sdk::contracttype;

/// Percentage points that make up a full allocation.
pub const FULL_ALLOCATION: u32 = 100;

/// Persisted per-participant state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub amount: i128,
    pub stablecoin_percentage: u32,
    pub timestamp: u64,
}

impl Position {
    pub fn to_investment(&self) -> Investment {
        Investment {
            amount: self.amount,
            stablecoin_percentage: self.stablecoin_percentage,
            growing_assets_percentage: FULL_ALLOCATION - self.stablecoin_percentage,
            timestamp: self.timestamp,
        }
    }
}

/// Investment record as returned by `investments`.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Investment {
    /// Deposited and not yet withdrawn, in the token's smallest unit.
    pub amount: i128,
    /// Share of the holding allocated to the stablecoin pool, in [0, 100].
    pub stablecoin_percentage: u32,
    /// Always `100 - stablecoin_percentage` for a known participant.
    pub growing_assets_percentage: u32,
    /// Ledger timestamp of the last deposit.
    pub timestamp: u64,
}
