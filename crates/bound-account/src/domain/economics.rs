//! # Sync Economics
//!
//! Pure arithmetic behind the synchronization bounty and the fee guards.
//! All arithmetic saturates: an overflowing cost is treated as unaffordable.

use crate::config::FeeBounds;
use crate::domain::entities::{FeeBoundViolation, Request, SyncEconomics};
use crate::domain::value_objects::U256;

/// Gas the caller of `synchronize_and_refund` pays for, priced at `gas_price`.
///
/// With `coordinator_exempt` only `sync_gas_cost` is charged.
#[must_use]
pub fn sync_cost(economics: &SyncEconomics, gas_price: U256, coordinator_exempt: bool) -> U256 {
    let gas = if coordinator_exempt {
        U256::from(economics.sync_gas_cost)
    } else {
        U256::from(economics.sync_gas_cost).saturating_add(U256::from(economics.refund_gas_cost))
    };
    gas_price.saturating_mul(gas)
}

/// `sync_refund - cost`, or `None` when the bounty does not cover the cost.
#[must_use]
pub fn refund_profit(
    economics: &SyncEconomics,
    gas_price: U256,
    coordinator_exempt: bool,
) -> Option<U256> {
    let cost = sync_cost(economics, gas_price, coordinator_exempt);
    economics.sync_refund.checked_sub(cost)
}

/// Worst-case fee a request can consume.
///
/// `(pre_verification + verification * multiplier + call) * max_fee_per_gas`,
/// where `multiplier` applies only when a sponsorship is attached.
#[must_use]
pub fn required_prefund(request: &Request, sponsored_multiplier: u64) -> U256 {
    let multiplier = if request.is_sponsored() {
        sponsored_multiplier
    } else {
        1
    };
    let gas = U256::from(request.pre_verification_gas)
        .saturating_add(U256::from(request.verification_gas_limit).saturating_mul(U256::from(multiplier)))
        .saturating_add(U256::from(request.call_gas_limit));
    gas.saturating_mul(request.max_fee_per_gas)
}

/// Checks the request's fee fields against the configured bounds.
///
/// # Errors
///
/// Returns the first field found out of bounds.
pub fn check_fee_bounds(request: &Request, bounds: &FeeBounds) -> Result<(), FeeBoundViolation> {
    if request.max_fee_per_gas > bounds.max_fee_per_gas {
        return Err(FeeBoundViolation::MaxFeePerGas);
    }
    if request.max_priority_fee_per_gas > bounds.max_priority_fee_per_gas {
        return Err(FeeBoundViolation::MaxPriorityFeePerGas);
    }
    if request.pre_verification_gas > bounds.max_pre_verification_gas {
        return Err(FeeBoundViolation::PreVerificationGas);
    }
    if !(bounds.min_verification_gas..=bounds.max_verification_gas)
        .contains(&request.verification_gas_limit)
    {
        return Err(FeeBoundViolation::VerificationGasLimit);
    }
    if !(bounds.min_call_gas..=bounds.max_call_gas).contains(&request.call_gas_limit) {
        return Err(FeeBoundViolation::CallGasLimit);
    }
    Ok(())
}
