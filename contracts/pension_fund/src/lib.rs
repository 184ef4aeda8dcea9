//! # PensionFund Contract
//!
//! Root crate of the **BluPension** on-chain ledger. It exposes the single
//! Soroban contract `PensionFund`, which keeps one investment record per
//! participant and two pooled balances (stablecoin and growing assets) that
//! every deposit and withdrawal splits into by percentage.
//!
//! | Phase      | Entry Point(s)                                                   |
//! |------------|------------------------------------------------------------------|
//! | Bootstrap  | [`PensionFund::init`]                                            |
//! | Deposits   | [`PensionFund::invest`]                                          |
//! | Payouts    | [`PensionFund::withdraw`]                                        |
//! | Queries    | `investments`, `stablecoin_pool`, `growing_assets_pool`, `total_funds`, `minimum_investment`, `owner`, `token` |
//!
//! ## Architecture
//!
//! Storage access is delegated to [`storage`], the percentage arithmetic to
//! [`allocation`], and event shapes to [`events`]. This file holds the entry
//! points and their validation order.
//!
//! ## Atomicity
//!
//! Entry points return `Result<_, Error>`; the host discards every storage
//! write and event of an invocation that ends in `Err`. `withdraw` commits
//! its ledger updates before paying out and reports a failed payout as
//! [`Error::TransferFailed`], which therefore rolls the whole call back.

#![no_std]

#[cfg(test)]
extern crate std;

use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env};

pub mod allocation;
pub mod events;
mod storage;
mod types;

#[cfg(test)]
mod fuzz_test;
#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use types::{Investment, Position};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    InvestmentTooLow      = 1,
    InvalidPercentage     = 2,
    NoInvestmentFound     = 3,
    InsufficientFunds     = 4,
    TransferFailed        = 5,
    AlreadyInitialized    = 6,
    NotInitialized        = 7,
    InvalidAmount         = 8,
    InsufficientLiquidity = 9,
    ArithmeticOverflow    = 10,
}

#[contract]
pub struct PensionFund;

#[contractimpl]
impl PensionFund {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Configure the fund. Callable exactly once.
    ///
    /// - `owner` must sign.
    /// - `token` is the currency participants deposit and are paid out in.
    /// - `minimum_investment` is the smallest accepted single deposit and
    ///   must be positive. It cannot be changed afterwards.
    pub fn init(
        env: Env,
        owner: Address,
        token: Address,
        minimum_investment: i128,
    ) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        owner.require_auth();

        if minimum_investment <= 0 {
            return Err(Error::InvalidAmount);
        }

        storage::init_fund(&env, &owner, &token, minimum_investment);
        events::emit_fund_initialized(&env, owner, token, minimum_investment);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Mutating entry points
    // ─────────────────────────────────────────────────────────

    /// Deposit `amount` and (re)set the participant's stablecoin allocation.
    ///
    /// A top-up replaces the previous percentage outright; it is not blended
    /// with the earlier split. Only the newly deposited `amount` is split
    /// across the pools.
    pub fn invest(
        env: Env,
        participant: Address,
        stablecoin_percentage: u32,
        amount: i128,
    ) -> Result<(), Error> {
        participant.require_auth();

        let minimum_investment = storage::get_minimum_investment(&env)?;
        if amount < minimum_investment {
            return Err(Error::InvestmentTooLow);
        }
        if stablecoin_percentage > types::FULL_ALLOCATION {
            return Err(Error::InvalidPercentage);
        }

        let share = allocation::split(amount, stablecoin_percentage)?;
        let mut pools = storage::load_pools(&env)?;
        pools.stablecoin = checked_add(pools.stablecoin, share.stablecoin)?;
        pools.growing_assets = checked_add(pools.growing_assets, share.growing_assets)?;
        pools.total_funds = checked_add(pools.total_funds, amount)?;

        let held = storage::load_position(&env, &participant)
            .map(|p| p.amount)
            .unwrap_or(0);
        let position = Position {
            amount: checked_add(held, amount)?,
            stablecoin_percentage,
            timestamp: env.ledger().timestamp(),
        };

        let token = storage::get_token(&env)?;
        transfer(&env, &token, &participant, &env.current_contract_address(), amount)?;

        storage::save_position(&env, &participant, &position);
        storage::save_pools(&env, &pools);

        events::emit_investment_created(&env, participant, amount, stablecoin_percentage);
        Ok(())
    }

    /// Withdraw `amount` back to the participant.
    ///
    /// The pools are reduced using the record's current percentage. All
    /// ledger state is written before the payout transfer.
    pub fn withdraw(env: Env, participant: Address, amount: i128) -> Result<(), Error> {
        participant.require_auth();

        if amount < 0 {
            return Err(Error::InvalidAmount);
        }

        let mut pools = storage::load_pools(&env)?;
        let mut position = match storage::load_position(&env, &participant) {
            Some(p) if p.amount > 0 => p,
            _ => return Err(Error::NoInvestmentFound),
        };
        if amount > position.amount {
            return Err(Error::InsufficientFunds);
        }

        let share = allocation::split(amount, position.stablecoin_percentage)?;
        if share.stablecoin > pools.stablecoin || share.growing_assets > pools.growing_assets {
            return Err(Error::InsufficientLiquidity);
        }

        // Effects.
        pools.stablecoin -= share.stablecoin;
        pools.growing_assets -= share.growing_assets;
        pools.total_funds -= amount;
        position.amount -= amount;
        storage::save_pools(&env, &pools);
        storage::save_position(&env, &participant, &position);

        // Interaction.
        let token = storage::get_token(&env)?;
        transfer(&env, &token, &env.current_contract_address(), &participant, amount)?;

        events::emit_investment_withdrawn(
            &env,
            participant,
            amount,
            share.stablecoin,
            share.growing_assets,
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Investment record of `participant`; all zeros if they never invested.
    pub fn investments(env: Env, participant: Address) -> Investment {
        storage::load_position(&env, &participant)
            .map(|p| p.to_investment())
            .unwrap_or_default()
    }

    pub fn stablecoin_pool(env: Env) -> Result<i128, Error> {
        Ok(storage::load_pools(&env)?.stablecoin)
    }

    pub fn growing_assets_pool(env: Env) -> Result<i128, Error> {
        Ok(storage::load_pools(&env)?.growing_assets)
    }

    /// Sum of every participant's outstanding `amount`.
    pub fn total_funds(env: Env) -> Result<i128, Error> {
        Ok(storage::load_pools(&env)?.total_funds)
    }

    pub fn minimum_investment(env: Env) -> Result<i128, Error> {
        storage::get_minimum_investment(&env)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        storage::get_owner(&env)
    }

    pub fn token(env: Env) -> Result<Address, Error> {
        storage::get_token(&env)
    }
}

fn checked_add(a: i128, b: i128) -> Result<i128, Error> {
    a.checked_add(b).ok_or(Error::ArithmeticOverflow)
}

/// Move `amount` of `token`, surfacing any failure of the token contract as
/// [`Error::TransferFailed`] instead of trapping.
fn transfer(
    env: &Env,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), Error> {
    let client = token::Client::new(env, token);
    match client.try_transfer(from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}
