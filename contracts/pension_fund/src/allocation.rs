//! Percentage split of an amount across the two pools.
//!
//! Every split truncates: the stablecoin share is `amount * pct / 100` and the
//! growing-assets share takes the remainder, so the two shares always sum to
//! `amount` exactly. Existing deployments depend on this rounding.

use crate::types::FULL_ALLOCATION;
use crate::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Split {
    pub stablecoin: i128,
    pub growing_assets: i128,
}

pub fn split(amount: i128, stablecoin_percentage: u32) -> Result<Split, Error> {
    let stablecoin = amount
        .checked_mul(stablecoin_percentage as i128)
        .ok_or(Error::ArithmeticOverflow)?
        / FULL_ALLOCATION as i128;
    Ok(Split {
        stablecoin,
        growing_assets: amount - stablecoin,
    })
}
