use serde::Serialize;
use thiserror::Error;

use super::money::dollars;
use super::{Cents, cents_from_units, units_from_cents};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmiError {
    #[error("principal must be greater than 0, got {}", dollars(.0))]
    InvalidPrincipal(Cents),

    #[error("annual interest rate must be a non-negative number, got {0}")]
    InvalidRate(f64),

    #[error("loan term must be at least one month, got {0}")]
    InvalidTerm(i64),

    #[error("repayment amount is too large to represent")]
    OutOfRange,
}

/// Repayment plan for a fixed-rate loan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmiQuote {
    pub principal: Cents,
    /// Annual rate in percent, e.g. 10.0 for 10%.
    pub annual_rate: f64,
    pub months: i64,
    pub installment: Cents,
    pub total_payable: Cents,
    pub total_interest: Cents,
}

/// Equated monthly installment, rounded to the nearest cent.
///
/// With monthly rate `r = R / 12 / 100`:
/// `EMI = P * r * (1 + r)^N / ((1 + r)^N - 1)`, evaluated as
/// `P * r / (1 - (1 + r)^-N)` through `ln_1p`/`exp_m1` so that tiny rates
/// and long terms keep their precision.
/// At a zero rate the formula degenerates, and the installment is `P / N`.
pub fn monthly_installment(
    principal: Cents,
    annual_rate: f64,
    months: i64,
) -> Result<Cents, EmiError> {
    if months <= 0 {
        return Err(EmiError::InvalidTerm(months));
    }
    if principal <= 0 {
        return Err(EmiError::InvalidPrincipal(principal));
    }
    if !annual_rate.is_finite() || annual_rate < 0.0 {
        return Err(EmiError::InvalidRate(annual_rate));
    }

    let p = units_from_cents(principal);
    let n = months as f64;

    let installment = if annual_rate == 0.0 {
        p / n
    } else {
        let r = annual_rate / 12.0 / 100.0;
        p * r / -(-n * r.ln_1p()).exp_m1()
    };
    to_cents(installment)
}

fn to_cents(units: f64) -> Result<Cents, EmiError> {
    let cents = (units * 100.0).round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if !cents.is_finite() || cents < 0.0 || cents >= Cents::MAX as f64 {
        return Err(EmiError::OutOfRange);
    }
    Ok(cents_from_units(units))
}

/// Installment plus totals over the whole term.
pub fn quote(principal: Cents, annual_rate: f64, months: i64) -> Result<EmiQuote, EmiError> {
    let installment = monthly_installment(principal, annual_rate, months)?;
    let total_payable = installment
        .checked_mul(months)
        .ok_or(EmiError::OutOfRange)?;
    let total_interest = total_payable
        .checked_sub(principal)
        .ok_or(EmiError::OutOfRange)?;
    Ok(EmiQuote {
        principal,
        annual_rate,
        months,
        installment,
        total_payable,
        total_interest,
    })
}
