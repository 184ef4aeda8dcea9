#![allow(dead_code)]

use soroban_sdk::Address;

use crate::types::{Investment, FULL_ALLOCATION};
use crate::PensionFundClient;

/// INV-1: a known participant's allocation always adds up to 100.
pub fn assert_allocation_complete(investment: &Investment) {
    assert_eq!(
        investment.stablecoin_percentage + investment.growing_assets_percentage,
        FULL_ALLOCATION,
        "INV-1 violated: allocation {} + {} != 100",
        investment.stablecoin_percentage,
        investment.growing_assets_percentage
    );
}

/// INV-2: recorded amounts are never negative.
pub fn assert_amount_non_negative(investment: &Investment) {
    assert!(
        investment.amount >= 0,
        "INV-2 violated: negative amount {}",
        investment.amount
    );
}

/// INV-3: both pools stay non-negative.
pub fn assert_pools_non_negative(stablecoin_pool: i128, growing_assets_pool: i128) {
    assert!(
        stablecoin_pool >= 0 && growing_assets_pool >= 0,
        "INV-3 violated: pools ({}, {})",
        stablecoin_pool,
        growing_assets_pool
    );
}

/// INV-4: the pools together hold exactly the participants' funds.
pub fn assert_pools_cover_funds(stablecoin_pool: i128, growing_assets_pool: i128, total: i128) {
    assert_eq!(
        stablecoin_pool + growing_assets_pool,
        total,
        "INV-4 violated: {} + {} != {}",
        stablecoin_pool,
        growing_assets_pool,
        total
    );
}

/// INV-5: a rejected call leaves the record and accumulators untouched.
pub fn assert_unchanged(before: &FundView, after: &FundView) {
    assert_eq!(before, after, "INV-5 violated: rejected call mutated state");
}

/// Everything observable about the fund for a fixed set of participants.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundView {
    pub investments: std::vec::Vec<Investment>,
    pub stablecoin_pool: i128,
    pub growing_assets_pool: i128,
    pub total_funds: i128,
}

pub fn snapshot(client: &PensionFundClient, participants: &[Address]) -> FundView {
    FundView {
        investments: participants.iter().map(|p| client.investments(p)).collect(),
        stablecoin_pool: client.stablecoin_pool(),
        growing_assets_pool: client.growing_assets_pool(),
        total_funds: client.total_funds(),
    }
}

/// Run every invariant over the fund and the given participants.
pub fn assert_all_fund_invariants(client: &PensionFundClient, participants: &[Address]) {
    let view = snapshot(client, participants);
    let mut sum = 0i128;
    for investment in view.investments.iter() {
        assert_amount_non_negative(investment);
        if *investment != Investment::default() {
            assert_allocation_complete(investment);
        }
        sum += investment.amount;
    }
    assert_pools_non_negative(view.stablecoin_pool, view.growing_assets_pool);
    assert_pools_cover_funds(view.stablecoin_pool, view.growing_assets_pool, view.total_funds);
    assert_eq!(sum, view.total_funds, "INV-4 violated: participant sum != total_funds");
}
