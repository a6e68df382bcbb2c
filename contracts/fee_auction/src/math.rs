//! Fixed-point helpers shared by the trigger and the auction engine.
//!
//! Prices and rates are `Decimal` (18 fractional digits, u128 atomics).
//! Intermediate products are widened to 256 bits so no step rounds except the
//! final conversion back to an integer amount, whose direction is explicit in
//! the function name.

use cosmwasm_std::{Decimal, Decimal256, Uint128, Uint256};

use crate::error::Fault;

/// `floor(amount / price)`, saturating at `Uint128::MAX`. Callers cap the
/// result by a real supply.
pub fn div_floor(amount: Uint128, price: Decimal) -> Result<Uint128, Fault> {
    let numerator = amount.full_mul(Decimal::one().atomics());
    let quotient = numerator
        .checked_div(Uint256::from(price.atomics()))
        .map_err(|_| Fault::Overflow {
            context: "amount / price",
        })?;
    Ok(Uint128::try_from(quotient).unwrap_or(Uint128::MAX))
}

/// `ceil(amount * price)`.
pub fn mul_ceil(amount: Uint128, price: Decimal) -> Result<Uint128, Fault> {
    let overflow = Fault::Overflow {
        context: "amount * price",
    };
    let product = amount.full_mul(price.atomics());
    let fractional = Uint256::from(Decimal::one().atomics());
    let mut quotient = product / fractional;
    if !(product % fractional).is_zero() {
        quotient += Uint256::one();
    }
    Uint128::try_from(quotient).map_err(|_| overflow)
}

/// Exact `amount * price`, wide enough that no balance can overflow it.
pub fn usd_value(amount: Uint128, usd_price: Decimal) -> Result<Decimal256, Fault> {
    Decimal256::from_atomics(amount, 0)
        .ok()
        .and_then(|amount| amount.checked_mul(Decimal256::from(usd_price)).ok())
        .ok_or(Fault::Overflow {
            context: "usd value",
        })
}

/// One decay step: `price * (1 - rate)`, truncated, never below the smallest
/// representable positive price.
pub fn decay(price: Decimal, rate: Decimal) -> Result<Decimal, Fault> {
    let next = Decimal::one()
        .checked_sub(rate)
        .ok()
        .and_then(|factor| price.checked_mul(factor).ok())
        .ok_or(Fault::Overflow {
            context: "price decay",
        })?;
    Ok(next.max(Decimal::raw(1)))
}
