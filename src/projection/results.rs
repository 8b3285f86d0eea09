//! Output structures for multi-year projections

use serde::{Deserialize, Serialize};

/// Forecast for one year of ownership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearProjection {
    pub year: u32,

    // Operations
    pub revenue: f64,
    pub expenses: f64,
    pub capex: f64,
    pub noi: f64,

    // Financing
    pub debt_service: f64,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub cashflow: f64,
    pub cumulative_cashflow: f64,
    pub cumulative_principal_paid: f64,
    pub mortgage_balance: f64,

    // Value
    pub property_value: f64,
    pub equity: f64,
    pub dscr: f64,
    /// Percent
    pub ltv: f64,
    pub appreciation: f64,
    pub cumulative_appreciation: f64,

    // Returns
    /// Cashflow + principal paid + appreciation
    pub total_profit: f64,
    pub cumulative_total_profit: f64,
    pub roi_cashflow: f64,
    pub roi_total: f64,
    pub roe: f64,
    /// This year's cashflow discounted to purchase date (not a running total)
    pub npv: f64,
}

/// Outcome of selling the property at the end of a given year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitScenario {
    pub year: u32,
    pub property_value: f64,
    /// Property value net of sale costs
    pub sale_price: f64,
    pub mortgage_balance: f64,
    pub net_proceeds: f64,
    /// Initial investment plus capex spent through the exit year
    pub total_invested: f64,
    pub net_profit: f64,
    /// net_profit / total_invested
    pub moic: f64,
    /// Percent
    pub irr: f64,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    /// Year rows, chronological
    pub years: Vec<YearProjection>,

    pub exit_scenarios: Vec<ExitScenario>,

    /// Down payment plus acquisition fees
    pub initial_investment: f64,
    pub loan_amount: f64,

    /// Horizon-wide IRR in percent, selling at the final exit year
    pub irr: f64,

    /// First year with positive cumulative cashflow
    pub payback_period_cashflow: Option<u32>,

    /// First year whose cumulative total profit exceeds the initial investment
    pub payback_period_total: Option<u32>,

    pub min_dscr: f64,
    pub max_ltv: f64,
    pub average_roe: f64,
}

impl ProjectionResult {
    /// Exit scenario for a given year, if one was computed
    pub fn exit_scenario(&self, year: u32) -> Option<&ExitScenario> {
        self.exit_scenarios.iter().find(|s| s.year == year)
    }

    /// Year row by 1-based year
    pub fn year(&self, year: u32) -> Option<&YearProjection> {
        year.checked_sub(1).and_then(|i| self.years.get(i as usize))
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_cashflow: f64 = self.years.iter().map(|r| r.cashflow).sum();
        let total_capex: f64 = self.years.iter().map(|r| r.capex).sum();
        let total_npv: f64 = self.years.iter().map(|r| r.npv).sum();

        let last = self.years.last();

        ProjectionSummary {
            total_years: self.years.len() as u32,
            total_cashflow,
            total_capex,
            total_principal_paid: last.map(|r| r.cumulative_principal_paid).unwrap_or(0.0),
            total_appreciation: last.map(|r| r.cumulative_appreciation).unwrap_or(0.0),
            total_npv,
            final_property_value: last.map(|r| r.property_value).unwrap_or(0.0),
            final_mortgage_balance: last.map(|r| r.mortgage_balance).unwrap_or(0.0),
            final_equity: last.map(|r| r.equity).unwrap_or(0.0),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub total_cashflow: f64,
    pub total_capex: f64,
    pub total_principal_paid: f64,
    pub total_appreciation: f64,
    pub total_npv: f64,
    pub final_property_value: f64,
    pub final_mortgage_balance: f64,
    pub final_equity: f64,
}
