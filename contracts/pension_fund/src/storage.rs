//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by the fund.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key                 | Type      | Description                          |
//! |---------------------|-----------|--------------------------------------|
//! | `Owner`             | `Address` | Account that initialised the fund    |
//! | `Token`             | `Address` | Currency token (SAC) contract        |
//! | `MinimumInvestment` | `i128`    | Smallest accepted single deposit     |
//! | `StablecoinPool`    | `i128`    | Stablecoin pool accumulator          |
//! | `GrowingAssetsPool` | `i128`    | Growing-assets pool accumulator      |
//! | `TotalFunds`        | `i128`    | Sum of every participant's `amount`  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                 | Type       | Description                   |
//! |---------------------|------------|-------------------------------|
//! | `Investment(addr)`  | `Position` | Per-participant position      |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::Position;
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Owner,
    Token,
    MinimumInvestment,
    StablecoinPool,
    GrowingAssetsPool,
    TotalFunds,
    /// Per-participant position (Persistent).
    Investment(Address),
}

/// The three fund-wide accumulators, read and written together.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Pools {
    pub stablecoin: i128,
    pub growing_assets: i128,
    pub total_funds: i128,
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::MinimumInvestment)
}

/// Write the immutable fund configuration and zeroed accumulators.
pub fn init_fund(env: &Env, owner: &Address, token: &Address, minimum_investment: i128) {
    let instance = env.storage().instance();
    instance.set(&DataKey::Owner, owner);
    instance.set(&DataKey::Token, token);
    instance.set(&DataKey::MinimumInvestment, &minimum_investment);
    save_pools(env, &Pools::default());
}

fn read_instance<V>(env: &Env, key: &DataKey) -> Result<V, Error>
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    bump_instance(env);
    env.storage()
        .instance()
        .get(key)
        .ok_or(Error::NotInitialized)
}

pub fn get_owner(env: &Env) -> Result<Address, Error> {
    read_instance(env, &DataKey::Owner)
}

pub fn get_token(env: &Env) -> Result<Address, Error> {
    read_instance(env, &DataKey::Token)
}

pub fn get_minimum_investment(env: &Env) -> Result<i128, Error> {
    read_instance(env, &DataKey::MinimumInvestment)
}

pub fn load_pools(env: &Env) -> Result<Pools, Error> {
    Ok(Pools {
        stablecoin: read_instance(env, &DataKey::StablecoinPool)?,
        growing_assets: read_instance(env, &DataKey::GrowingAssetsPool)?,
        total_funds: read_instance(env, &DataKey::TotalFunds)?,
    })
}

pub fn save_pools(env: &Env, pools: &Pools) {
    let instance = env.storage().instance();
    instance.set(&DataKey::StablecoinPool, &pools.stablecoin);
    instance.set(&DataKey::GrowingAssetsPool, &pools.growing_assets);
    instance.set(&DataKey::TotalFunds, &pools.total_funds);
    bump_instance(env);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Load a participant's position, or `None` if they never invested.
pub fn load_position(env: &Env, participant: &Address) -> Option<Position> {
    let key = DataKey::Investment(participant.clone());
    let position: Option<Position> = env.storage().persistent().get(&key);
    if position.is_some() {
        bump_persistent(env, &key);
    }
    position
}

pub fn save_position(env: &Env, participant: &Address, position: &Position) {
    let key = DataKey::Investment(participant.clone());
    env.storage().persistent().set(&key, position);
    bump_persistent(env, &key);
}
