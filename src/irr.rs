//! Internal Rate of Return (IRR) and discounting helpers
//!
//! Used for exit scenarios and the horizon-wide return of a projection

use crate::rounding::round2;
use log::warn;

/// Starting rate for Newton-Raphson (decimal)
pub const IRR_INITIAL_GUESS: f64 = 0.10;
pub const IRR_MAX_ITERATIONS: u32 = 100;
pub const IRR_TOLERANCE: f64 = 1e-6;

/// Calculate the Internal Rate of Return for a series of yearly cash flows
/// using the Newton-Raphson method.
///
/// # Arguments
/// * `cashflows` - Cash flows C[0..n], C[0] usually the (negative) investment
///
/// # Returns
/// * Annual IRR in percent, rounded to 2 decimals. Returns 0 when the
///   iteration does not converge within the budget; there is no separate
///   failure signal and no bracketing fallback.
pub fn calculate_irr(cashflows: &[f64]) -> f64 {
    if cashflows.len() < 2 {
        return 0.0;
    }

    let mut rate = IRR_INITIAL_GUESS;

    for _ in 0..IRR_MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv == 0.0 || !dnpv.is_finite() {
            break;
        }

        let new_rate = rate - npv / dnpv;
        if !new_rate.is_finite() {
            break;
        }

        if (new_rate - rate).abs() < IRR_TOLERANCE {
            return round2(new_rate * 100.0);
        }

        rate = new_rate;
    }

    warn!("IRR did not converge for {} cash flows, reporting 0", cashflows.len());
    0.0
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / ((1.0 + rate).powi(t as i32 + 1));
        }
    }

    (npv, dnpv)
}

/// Calculate NPV at a given decimal rate, C[0] undiscounted
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Present value of a single amount received `years` from now, rate in percent
pub fn discount(amount: f64, annual_rate_pct: f64, years: u32) -> f64 {
    amount / (1.0 + annual_rate_pct / 100.0).powi(years as i32)
}
