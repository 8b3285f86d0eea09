//! Single-year KPI snapshot
//!
//! A pure function of the inputs. Projections read year-1 revenue, loan size
//! and invested capital from it; sensitivity sweeps evaluate it repeatedly.

use crate::amortization::periodic_payment;
use crate::error::{ForecastError, Result};
use crate::expenses::{total_expenses, ExpenseContext};
use crate::inputs::ProjectInputs;
use crate::rounding::round2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DSCR reported when there is no debt service to cover
pub const DSCR_UNCONSTRAINED: f64 = 999.0;

/// First-year operating and financing figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiResults {
    pub loan_amount: f64,
    /// Down payment plus acquisition fees
    pub total_investment: f64,
    pub nights_booked: f64,
    pub gross_revenue: f64,
    pub total_expenses: f64,
    pub noi: f64,
    pub periodic_payment: f64,
    pub annual_debt_service: f64,
    pub annual_cashflow: f64,
    pub monthly_cashflow: f64,
    pub cap_rate: f64,
    pub gross_yield: f64,
    pub cash_on_cash: f64,
    pub dscr: f64,
    pub ltv: f64,
}

/// Evaluate the year-1 KPIs of a property
pub fn calculate_kpis(inputs: &ProjectInputs) -> KpiResults {
    let financing = &inputs.financing;
    let purchase_price = financing.purchase_price.value();
    let down_payment = financing.down_payment.value();

    let loan_amount = round2(purchase_price - down_payment);
    let total_investment = round2(down_payment + inputs.acquisition_fees.value());

    let nights_booked = inputs.revenue.days_per_year.value() * inputs.revenue.occupancy_rate.value() / 100.0;
    let gross_revenue = round2(inputs.revenue.average_daily_rate.value() * nights_booked);

    let expenses = total_expenses(
        &inputs.expenses,
        &ExpenseContext {
            year: 1,
            revenue: gross_revenue,
            property_value: purchase_price,
            escalation_rate: inputs.projection_settings.expense_escalation_rate.value(),
        },
    );
    let noi = round2(gross_revenue - expenses);

    let frequency = financing.payment_frequency;
    let payment = periodic_payment(
        loan_amount,
        financing.interest_rate.value(),
        financing.amortization_term(),
        frequency,
    );
    let annual_debt_service = round2(payment * frequency.payments_per_year() as f64);
    let annual_cashflow = round2(noi - annual_debt_service);

    KpiResults {
        loan_amount,
        total_investment,
        nights_booked: round2(nights_booked),
        gross_revenue,
        total_expenses: expenses,
        noi,
        periodic_payment: round2(payment),
        annual_debt_service,
        annual_cashflow,
        monthly_cashflow: round2(annual_cashflow / 12.0),
        cap_rate: percent_of(noi, purchase_price),
        gross_yield: percent_of(gross_revenue, purchase_price),
        cash_on_cash: percent_of(annual_cashflow, total_investment),
        dscr: if annual_debt_service > 0.0 {
            round2(noi / annual_debt_service)
        } else {
            DSCR_UNCONSTRAINED
        },
        ltv: percent_of(loan_amount, purchase_price),
    }
}

/// `part / whole` in percent, 0 when the base is not positive
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round2(part / whole * 100.0)
    } else {
        0.0
    }
}

/// KPI output a sensitivity sweep measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Objective {
    AnnualCashflow,
    MonthlyCashflow,
    Noi,
    CapRate,
    CashOnCash,
    Dscr,
    GrossRevenue,
    TotalExpenses,
}

impl Objective {
    pub const ALL: [Objective; 8] = [
        Objective::AnnualCashflow,
        Objective::MonthlyCashflow,
        Objective::Noi,
        Objective::CapRate,
        Objective::CashOnCash,
        Objective::Dscr,
        Objective::GrossRevenue,
        Objective::TotalExpenses,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Objective::AnnualCashflow => "annualCashflow",
            Objective::MonthlyCashflow => "monthlyCashflow",
            Objective::Noi => "noi",
            Objective::CapRate => "capRate",
            Objective::CashOnCash => "cashOnCash",
            Objective::Dscr => "dscr",
            Objective::GrossRevenue => "grossRevenue",
            Objective::TotalExpenses => "totalExpenses",
        }
    }

    /// Read this objective out of a KPI snapshot
    pub fn extract(&self, kpis: &KpiResults) -> f64 {
        match self {
            Objective::AnnualCashflow => kpis.annual_cashflow,
            Objective::MonthlyCashflow => kpis.monthly_cashflow,
            Objective::Noi => kpis.noi,
            Objective::CapRate => kpis.cap_rate,
            Objective::CashOnCash => kpis.cash_on_cash,
            Objective::Dscr => kpis.dscr,
            Objective::GrossRevenue => kpis.gross_revenue,
            Objective::TotalExpenses => kpis.total_expenses,
        }
    }

    /// Evaluate the KPIs for `inputs` and read this objective
    pub fn evaluate(&self, inputs: &ProjectInputs) -> f64 {
        self.extract(&calculate_kpis(inputs))
    }
}

impl Default for Objective {
    fn default() -> Self {
        Objective::AnnualCashflow
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Objective {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Objective::ALL
            .iter()
            .copied()
            .find(|objective| objective.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ForecastError::InvalidInputs(format!("Unknown objective: {}", s)))
    }
}
