//! Contract events consumed by the off-chain indexer and the dashboard.
//!
//! | Topics                      | Data                   |
//! |-----------------------------|------------------------|
//! | `("init",)`                 | [`FundInitialized`]    |
//! | `("invested", participant)` | [`InvestmentCreated`]  |
//! | `("withdrawn", participant)`| [`InvestmentWithdrawn`]|

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundInitialized {
    pub owner: Address,
    pub token: Address,
    pub minimum_investment: i128,
}

/// Emitted on every successful `invest`, top-ups included.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvestmentCreated {
    pub participant: Address,
    /// Amount deposited by this call only.
    pub amount: i128,
    pub stablecoin_percentage: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvestmentWithdrawn {
    pub participant: Address,
    pub amount: i128,
    pub stablecoin_share: i128,
    pub growing_assets_share: i128,
}

pub fn emit_fund_initialized(env: &Env, owner: Address, token: Address, minimum_investment: i128) {
    env.events().publish(
        (symbol_short!("init"),),
        FundInitialized {
            owner,
            token,
            minimum_investment,
        },
    );
}

pub fn emit_investment_created(
    env: &Env,
    participant: Address,
    amount: i128,
    stablecoin_percentage: u32,
) {
    env.events().publish(
        (symbol_short!("invested"), participant.clone()),
        InvestmentCreated {
            participant,
            amount,
            stablecoin_percentage,
        },
    );
}

pub fn emit_investment_withdrawn(
    env: &Env,
    participant: Address,
    amount: i128,
    stablecoin_share: i128,
    growing_assets_share: i128,
) {
    env.events().publish(
        (symbol_short!("withdrawn"), participant.clone()),
        InvestmentWithdrawn {
            participant,
            amount,
            stablecoin_share,
            growing_assets_share,
        },
    );
}
