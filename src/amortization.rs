//! Year-indexed mortgage amortization schedule
//!
//! Payments are simulated period by period at the loan's payment frequency
//! and summed into yearly rows. Only the yearly aggregates are rounded, so
//! rounding error does not compound across periods.

use crate::inputs::PaymentFrequency;
use crate::rounding::round2;
use serde::{Deserialize, Serialize};

/// Remaining balance below this is treated as paid off
const PAID_OFF_EPSILON: f64 = 0.005;

/// One year of loan activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub year: u32,
    /// Total paid during the year
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    /// Balance at year end
    pub balance: f64,
}

/// Number of scheduled payments, `None` when the term is too long to count
pub fn total_payments(amortization_years: u32, frequency: PaymentFrequency) -> Option<u32> {
    amortization_years
        .checked_mul(frequency.payments_per_year())
        .filter(|&n| n <= i32::MAX as u32)
}

/// Level periodic payment for a fully amortizing loan
///
/// `annual_rate` is in percent. A zero rate spreads the principal evenly.
/// A term too long to count never amortizes and pays interest only.
pub fn periodic_payment(
    loan_amount: f64,
    annual_rate: f64,
    amortization_years: u32,
    frequency: PaymentFrequency,
) -> f64 {
    let periods_per_year = frequency.payments_per_year();
    let rate = annual_rate / 100.0 / periods_per_year as f64;
    if loan_amount <= 0.0 || amortization_years == 0 {
        return 0.0;
    }

    let Some(total_payments) = total_payments(amortization_years, frequency) else {
        return loan_amount * rate;
    };
    if rate.abs() < 1e-12 {
        return loan_amount / total_payments as f64;
    }

    let growth = (1.0 + rate).powi(total_payments as i32);
    if !growth.is_finite() {
        return loan_amount * rate;
    }
    loan_amount * rate * growth / (growth - 1.0)
}

/// Build one row per projection year
///
/// `projection_years` may exceed the amortization term; rows after payoff
/// carry zero payment and zero balance.
pub fn build_schedule(
    loan_amount: f64,
    annual_rate: f64,
    amortization_years: u32,
    frequency: PaymentFrequency,
    projection_years: u32,
) -> Vec<AmortizationRow> {
    let periods_per_year = frequency.payments_per_year();
    let total_payments = total_payments(amortization_years, frequency).unwrap_or(u32::MAX);
    let rate = annual_rate / 100.0 / periods_per_year as f64;
    let payment = periodic_payment(loan_amount, annual_rate, amortization_years, frequency);

    let mut balance = loan_amount.max(0.0);
    let mut opening_balance = round2(balance);
    let mut period = 0u32;
    let mut schedule = Vec::with_capacity(projection_years as usize);

    for year in 1..=projection_years {
        let mut year_payment = 0.0;
        let mut year_interest = 0.0;

        for _ in 0..periods_per_year {
            if balance <= 0.0 || period >= total_payments {
                break;
            }
            period += 1;

            let interest = balance * rate;
            // Final scheduled payment retires whatever float residue is left
            let principal = if period == total_payments {
                balance
            } else {
                (payment - interest).min(balance)
            };

            balance -= principal;
            if balance < PAID_OFF_EPSILON {
                balance = 0.0;
            }

            year_payment += principal + interest;
            year_interest += interest;
        }

        let closing_balance = round2(balance);
        schedule.push(AmortizationRow {
            year,
            payment: round2(year_payment),
            // Derived from rounded balances so yearly principal telescopes to the loan amount
            principal: round2(opening_balance - closing_balance),
            interest: round2(year_interest),
            balance: closing_balance,
        });
        opening_balance = closing_balance;
    }

    schedule
}
