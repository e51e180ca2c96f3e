//! Rebase accounting engine
//!
//! Pure arithmetic over raw on-chain supply triples. Everything here is
//! U256 fixed-point with 18 decimal places of scale and integer floor
//! division, mirroring the token contract's own credit math. No I/O.

use primitive_types::U256;

/// 1e18, the fixed-point scale of credits-per-token.
pub fn credits_scale() -> U256 {
    U256::exp10(18)
}

fn basis_point_divisor() -> U256 {
    U256::from(10_000u64)
}

/// Result of one rebase calculation. Immutable; the supply triple is echoed
/// back alongside the derived fields so callers persist one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebaseCalculation {
    pub total_supply: U256,
    pub rebasing_supply: U256,
    pub non_rebasing_supply: U256,
    pub credits_per_token: U256,
    pub rebase_yield: U256,
    pub fees: U256,
}

/// `floor(total_supply * 1e18 / rebasing_supply)`, or 0 when nothing
/// rebases.
pub fn credits_per_token(total_supply: U256, rebasing_supply: U256) -> U256 {
    if rebasing_supply.is_zero() {
        return U256::zero();
    }
    total_supply.saturating_mul(credits_scale()) / rebasing_supply
}

/// Supply growth since the previous rebase point. Rebases that shrink
/// supply report zero, never a negative value.
pub fn rebase_yield(total_supply: U256, previous_total_supply: U256) -> U256 {
    total_supply.saturating_sub(previous_total_supply)
}

/// Protocol fee taken from the yield, `fee_bps` in basis points.
pub fn rebase_fees(rebase_yield: U256, fee_bps: U256) -> U256 {
    if fee_bps.is_zero() {
        return U256::zero();
    }
    rebase_yield.saturating_mul(fee_bps) / basis_point_divisor()
}

/// Compute the full rebase result from an event's reported supply triple.
pub fn calculate_rebase(
    total_supply: U256,
    rebasing_supply: U256,
    non_rebasing_supply: U256,
    previous_total_supply: U256,
    fee_bps: U256,
) -> RebaseCalculation {
    let credits_per_token = credits_per_token(total_supply, rebasing_supply);
    let rebase_yield = rebase_yield(total_supply, previous_total_supply);
    let fees = rebase_fees(rebase_yield, fee_bps);

    RebaseCalculation {
        total_supply,
        rebasing_supply,
        non_rebasing_supply,
        credits_per_token,
        rebase_yield,
        fees,
    }
}

/// `floor(credits * credits_per_token / 1e18)`; 0 when the ratio is unset.
pub fn balance_from_credits(credits: U256, credits_per_token: U256) -> U256 {
    if credits_per_token.is_zero() {
        return U256::zero();
    }
    credits.saturating_mul(credits_per_token) / credits_scale()
}

/// `floor(balance * 1e18 / credits_per_token)`; 0 when the ratio is unset.
pub fn credits_from_balance(balance: U256, credits_per_token: U256) -> U256 {
    if credits_per_token.is_zero() {
        return U256::zero();
    }
    balance.saturating_mul(credits_scale()) / credits_per_token
}
