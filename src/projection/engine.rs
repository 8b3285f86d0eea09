//! Core projection engine for yearly property forecasts and exit scenarios

use super::results::{ExitScenario, ProjectionResult, YearProjection};
use super::state::ProjectionState;
use crate::amortization::{build_schedule, AmortizationRow};
use crate::expenses::{total_expenses, ExpenseContext};
use crate::inputs::ProjectInputs;
use crate::irr::{calculate_irr, discount};
use crate::kpi::{calculate_kpis, KpiResults, DSCR_UNCONSTRAINED};
use crate::rounding::round2;
use log::debug;

/// Years at which a sale is evaluated; the final year is always added
pub const DEFAULT_EXIT_YEARS: [u32; 4] = [5, 10, 15, 20];

/// Upper bound callers should clamp requested horizons to
pub const MAX_PROJECTION_YEARS: u32 = 50;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Number of years to project
    pub projection_years: u32,

    /// Candidate exit years; filtered to the horizon at run time
    pub exit_years: Vec<u32>,
}

impl ProjectionConfig {
    pub fn with_years(projection_years: u32) -> Self {
        Self {
            projection_years,
            ..Default::default()
        }
    }

    /// Exit years within [1, N], always including N, sorted and unique
    pub fn resolved_exit_years(&self) -> Vec<u32> {
        let horizon = self.projection_years;
        let mut years: Vec<u32> = self
            .exit_years
            .iter()
            .copied()
            .chain(std::iter::once(horizon))
            .filter(|&y| y >= 1 && y <= horizon)
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            projection_years: 10,
            exit_years: DEFAULT_EXIT_YEARS.to_vec(),
        }
    }
}

/// Rates used by a projection, resolved once from the inputs (all percent)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRates {
    pub appreciation: f64,
    pub revenue_escalation: f64,
    pub expense_escalation: f64,
    pub capex: f64,
    pub discount: f64,
    pub sale_costs: f64,
}

impl ResolvedRates {
    pub fn from_inputs(inputs: &ProjectInputs) -> Self {
        let settings = &inputs.projection_settings;
        Self {
            appreciation: inputs.financing.annual_appreciation_rate.value(),
            revenue_escalation: settings.revenue_escalation_rate.value(),
            expense_escalation: settings.expense_escalation_rate.value(),
            capex: settings.capex_rate.value(),
            discount: settings.discount_rate.value(),
            sale_costs: settings.sale_costs_rate.value(),
        }
    }

    /// Revenue growth factor for a 1-based year: (1 + rate)^(year - 1)
    pub fn revenue_factor(&self, year: u32) -> f64 {
        (1.0 + self.revenue_escalation / 100.0).powi(year.saturating_sub(1) as i32)
    }

    /// Property value at the end of `year`, compounding from the purchase price
    pub fn property_value(&self, purchase_price: f64, year: u32) -> f64 {
        purchase_price * (1.0 + self.appreciation / 100.0).powi(year as i32)
    }
}

/// Main projection engine
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given config
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Run the yearly projection, exit scenarios and aggregates
    pub fn project(&self, inputs: &ProjectInputs) -> ProjectionResult {
        let rates = ResolvedRates::from_inputs(inputs);
        let kpis = calculate_kpis(inputs);
        let purchase_price = inputs.financing.purchase_price.value();
        let horizon = self.config.projection_years;

        debug!(
            "Projecting {} years: loan {:.2}, investment {:.2}, year-1 revenue {:.2}",
            horizon, kpis.loan_amount, kpis.total_investment, kpis.gross_revenue
        );

        let schedule = build_schedule(
            kpis.loan_amount,
            inputs.financing.interest_rate.value(),
            inputs.financing.amortization_term(),
            inputs.financing.payment_frequency,
            horizon,
        );

        let mut state = ProjectionState::at_purchase(purchase_price);
        let years: Vec<YearProjection> = schedule
            .iter()
            .map(|loan_row| self.project_year(inputs, &rates, &kpis, loan_row, &mut state))
            .collect();

        let initial_investment = kpis.total_investment;
        let exit_scenarios: Vec<ExitScenario> = self
            .config
            .resolved_exit_years()
            .into_iter()
            .map(|year| exit_scenario(&years[..year as usize], initial_investment, &rates))
            .collect();

        // Horizon-wide IRR sells at the last exit scenario's proceeds
        let irr = match exit_scenarios.last() {
            Some(last) => calculate_irr(&irr_series(&years, initial_investment, last.net_proceeds)),
            None => 0.0,
        };

        ProjectionResult {
            payback_period_cashflow: years
                .iter()
                .find(|r| r.cumulative_cashflow > 0.0)
                .map(|r| r.year),
            payback_period_total: years
                .iter()
                .find(|r| r.cumulative_total_profit > initial_investment)
                .map(|r| r.year),
            min_dscr: years.iter().map(|r| r.dscr).reduce(f64::min).unwrap_or(0.0),
            max_ltv: years.iter().map(|r| r.ltv).reduce(f64::max).unwrap_or(0.0),
            average_roe: if years.is_empty() {
                0.0
            } else {
                round2(years.iter().map(|r| r.roe).sum::<f64>() / years.len() as f64)
            },
            irr,
            initial_investment,
            loan_amount: kpis.loan_amount,
            exit_scenarios,
            years,
        }
    }

    /// Calculate one forecast year and roll the running totals forward
    fn project_year(
        &self,
        inputs: &ProjectInputs,
        rates: &ResolvedRates,
        kpis: &KpiResults,
        loan_row: &AmortizationRow,
        state: &mut ProjectionState,
    ) -> YearProjection {
        let year = state.advance_year();
        let purchase_price = inputs.financing.purchase_price.value();
        let initial_investment = kpis.total_investment;

        let property_value = round2(rates.property_value(purchase_price, year));
        let revenue = round2(kpis.gross_revenue * rates.revenue_factor(year));
        let expenses = total_expenses(
            &inputs.expenses,
            &ExpenseContext {
                year,
                revenue,
                property_value,
                escalation_rate: rates.expense_escalation,
            },
        );
        let capex = round2(property_value * rates.capex / 100.0);
        let noi = round2(revenue - expenses);

        let debt_service = loan_row.payment;
        let cashflow = round2(noi - debt_service - capex);
        state.cumulative_cashflow = round2(state.cumulative_cashflow + cashflow);

        state.cumulative_principal_paid = round2(state.cumulative_principal_paid + loan_row.principal);

        let appreciation = round2(property_value - state.property_value);
        state.cumulative_appreciation = round2(state.cumulative_appreciation + appreciation);
        state.property_value = property_value;

        let balance = loan_row.balance;
        let equity = round2(property_value - balance);

        let total_profit = round2(cashflow + loan_row.principal + appreciation);
        state.cumulative_total_profit = round2(state.cumulative_total_profit + total_profit);

        YearProjection {
            year,
            revenue,
            expenses,
            capex,
            noi,
            debt_service,
            interest_paid: loan_row.interest,
            principal_paid: loan_row.principal,
            cashflow,
            cumulative_cashflow: state.cumulative_cashflow,
            cumulative_principal_paid: state.cumulative_principal_paid,
            mortgage_balance: balance,
            property_value,
            equity,
            dscr: if debt_service > 0.0 {
                round2(noi / debt_service)
            } else {
                DSCR_UNCONSTRAINED
            },
            ltv: if property_value > 0.0 {
                round2(balance / property_value * 100.0)
            } else {
                0.0
            },
            appreciation,
            cumulative_appreciation: state.cumulative_appreciation,
            total_profit,
            cumulative_total_profit: state.cumulative_total_profit,
            roi_cashflow: percent_of_investment(state.cumulative_cashflow, initial_investment),
            roi_total: percent_of_investment(state.cumulative_total_profit, initial_investment),
            roe: if equity > 0.0 {
                round2(total_profit / equity * 100.0)
            } else {
                0.0
            },
            npv: round2(discount(cashflow, rates.discount, year)),
        }
    }
}

/// Run a projection with default exit years
///
/// `number_of_years` is expected to be clamped by the caller.
pub fn calculate_projections(inputs: &ProjectInputs, number_of_years: u32) -> ProjectionResult {
    ProjectionEngine::new(ProjectionConfig::with_years(number_of_years)).project(inputs)
}

fn percent_of_investment(amount: f64, initial_investment: f64) -> f64 {
    if initial_investment > 0.0 {
        round2(amount / initial_investment * 100.0)
    } else {
        0.0
    }
}

/// Sale at the end of the last year in `years`
fn exit_scenario(years: &[YearProjection], initial_investment: f64, rates: &ResolvedRates) -> ExitScenario {
    let last = &years[years.len() - 1];

    let sale_price = round2(last.property_value * (1.0 - rates.sale_costs / 100.0));
    let net_proceeds = round2(sale_price - last.mortgage_balance);
    let cumulative_capex: f64 = years.iter().map(|r| r.capex).sum();
    let total_invested = round2(initial_investment + cumulative_capex);
    let net_profit = round2(net_proceeds - total_invested + last.cumulative_cashflow);

    ExitScenario {
        year: last.year,
        property_value: last.property_value,
        sale_price,
        mortgage_balance: last.mortgage_balance,
        net_proceeds,
        total_invested,
        net_profit,
        moic: if total_invested > 0.0 {
            round2(net_profit / total_invested)
        } else {
            0.0
        },
        irr: calculate_irr(&irr_series(years, initial_investment, net_proceeds)),
    }
}

/// `[-investment, cashflow - capex per year...]` with the sale proceeds added to the final year
fn irr_series(years: &[YearProjection], initial_investment: f64, net_proceeds: f64) -> Vec<f64> {
    let mut series = Vec::with_capacity(years.len() + 1);
    series.push(-initial_investment);
    series.extend(years.iter().map(|r| r.cashflow - r.capex));
    if !years.is_empty() {
        if let Some(last) = series.last_mut() {
            *last += net_proceeds;
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::fixtures::{mixed_expense_inputs, reference_inputs};
    use crate::inputs::Scalar;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reference_scenario() {
        let result = calculate_projections(&reference_inputs(), 10);

        assert_eq!(result.years.len(), 10);
        assert_eq!(result.loan_amount, 225_000.0);
        assert_eq!(result.initial_investment, 75_000.0);
        assert!(result.years[0].mortgage_balance < 225_000.0);

        let year10 = &result.years[9];
        assert_abs_diff_eq!(year10.property_value, 300_000.0 * 1.03_f64.powi(10), epsilon = 0.006);
        assert_abs_diff_eq!(year10.equity, year10.property_value - year10.mortgage_balance, epsilon = 1e-6);

        let years: Vec<u32> = result.exit_scenarios.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![5, 10]);
        for scenario in &result.exit_scenarios {
            assert_abs_diff_eq!(scenario.moic, scenario.net_profit / scenario.total_invested, epsilon = 0.006);
        }
    }

    #[test]
    fn test_year_invariants() {
        let inputs = mixed_expense_inputs();
        let result = calculate_projections(&inputs, 30);

        let mut previous_balance = result.loan_amount;
        let mut previous_value = 300_000.0;
        for row in &result.years {
            assert!(row.mortgage_balance <= previous_balance);
            assert_abs_diff_eq!(row.property_value, 300_000.0 * 1.03_f64.powi(row.year as i32), epsilon = 0.006);
            assert_abs_diff_eq!(row.equity, row.property_value - row.mortgage_balance, epsilon = 1e-6);
            assert_abs_diff_eq!(row.appreciation, row.property_value - previous_value, epsilon = 1e-6);
            assert_abs_diff_eq!(row.noi, row.revenue - row.expenses, epsilon = 1e-6);
            assert_abs_diff_eq!(row.cashflow, row.noi - row.debt_service - row.capex, epsilon = 1e-6);
            previous_balance = row.mortgage_balance;
            previous_value = row.property_value;
        }

        // Loan fully repaid after its 25 year term
        assert_eq!(result.years[24].mortgage_balance, 0.0);
        assert_eq!(result.years[29].debt_service, 0.0);
        assert_eq!(result.years[29].dscr, DSCR_UNCONSTRAINED);
    }

    #[test]
    fn test_escalation_by_expense_type() {
        let inputs = mixed_expense_inputs();
        let result = calculate_projections(&inputs, 3);
        let year3 = &result.years[2];

        // Revenue escalates 2%/yr from year 1
        assert_abs_diff_eq!(year3.revenue, 43_800.0 * 1.02_f64.powi(2), epsilon = 0.006);

        // Fixed lines escalate 3%/yr; percentage lines track their bases
        let expected = 2_400.0 * 1.03_f64.powi(2)
            + 350.0 * 12.0 * 1.03_f64.powi(2)
            + year3.revenue * 0.15
            + year3.property_value * 0.012;
        assert_abs_diff_eq!(year3.expenses, expected, epsilon = 0.01);

        // Capex follows the year's property value
        assert_abs_diff_eq!(year3.capex, year3.property_value * 0.01, epsilon = 0.006);
    }

    #[test]
    fn test_cumulative_totals_and_returns() {
        let result = calculate_projections(&mixed_expense_inputs(), 10);
        let investment = result.initial_investment;

        let mut cumulative_cashflow = 0.0;
        let mut cumulative_profit = 0.0;
        for row in &result.years {
            cumulative_cashflow += row.cashflow;
            cumulative_profit += row.total_profit;
            assert_abs_diff_eq!(row.cumulative_cashflow, cumulative_cashflow, epsilon = 1e-6);
            assert_abs_diff_eq!(row.cumulative_total_profit, cumulative_profit, epsilon = 1e-6);
            assert_abs_diff_eq!(row.total_profit, row.cashflow + row.principal_paid + row.appreciation, epsilon = 1e-6);
            assert_abs_diff_eq!(row.roi_cashflow, row.cumulative_cashflow / investment * 100.0, epsilon = 0.006);
            assert_abs_diff_eq!(row.roe, row.total_profit / row.equity * 100.0, epsilon = 0.006);
            assert_abs_diff_eq!(row.npv, row.cashflow / 1.08_f64.powi(row.year as i32), epsilon = 0.006);
        }
    }

    #[test]
    fn test_exit_scenario_arithmetic() {
        let inputs = mixed_expense_inputs();
        let result = calculate_projections(&inputs, 12);
        let exit = result.exit_scenario(10).unwrap();
        let year10 = result.year(10).unwrap();

        assert_abs_diff_eq!(exit.sale_price, year10.property_value * 0.94, epsilon = 0.006);
        assert_abs_diff_eq!(exit.net_proceeds, exit.sale_price - year10.mortgage_balance, epsilon = 1e-6);

        let capex: f64 = result.years[..10].iter().map(|r| r.capex).sum();
        assert_abs_diff_eq!(exit.total_invested, result.initial_investment + capex, epsilon = 0.006);
        assert_abs_diff_eq!(
            exit.net_profit,
            exit.net_proceeds - exit.total_invested + year10.cumulative_cashflow,
            epsilon = 0.006
        );

        let mut series = vec![-result.initial_investment];
        series.extend(result.years[..10].iter().map(|r| r.cashflow - r.capex));
        *series.last_mut().unwrap() += exit.net_proceeds;
        assert_eq!(exit.irr, calculate_irr(&series));
    }

    #[test]
    fn test_exit_years_selection() {
        let config = ProjectionConfig::with_years(7);
        assert_eq!(config.resolved_exit_years(), vec![5, 7]);
        assert_eq!(ProjectionConfig::with_years(3).resolved_exit_years(), vec![3]);
        assert_eq!(ProjectionConfig::with_years(20).resolved_exit_years(), vec![5, 10, 15, 20]);
        assert_eq!(ProjectionConfig::with_years(25).resolved_exit_years(), vec![5, 10, 15, 20, 25]);
    }

    #[test]
    fn test_global_irr_matches_final_exit() {
        let result = calculate_projections(&mixed_expense_inputs(), 15);
        assert_eq!(result.irr, result.exit_scenarios.last().unwrap().irr);
    }

    #[test]
    fn test_aggregates() {
        let result = calculate_projections(&reference_inputs(), 10);

        let min_dscr = result.years.iter().map(|r| r.dscr).fold(f64::INFINITY, f64::min);
        let max_ltv = result.years.iter().map(|r| r.ltv).fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(result.min_dscr, min_dscr);
        assert_eq!(result.max_ltv, max_ltv);

        // LTV falls as the loan amortizes and value grows
        assert_eq!(result.max_ltv, result.years[0].ltv);

        let mean_roe = result.years.iter().map(|r| r.roe).sum::<f64>() / 10.0;
        assert_abs_diff_eq!(result.average_roe, mean_roe, epsilon = 0.006);
    }

    #[test]
    fn test_payback_periods() {
        let result = calculate_projections(&reference_inputs(), 10);

        // Year-1 cashflow is positive in the reference case
        assert!(result.years[0].cashflow > 0.0);
        assert_eq!(result.payback_period_cashflow, Some(1));

        let expected_total = result
            .years
            .iter()
            .find(|r| r.cumulative_total_profit > result.initial_investment)
            .map(|r| r.year);
        assert_eq!(result.payback_period_total, expected_total);
    }

    #[test]
    fn test_payback_never_reached() {
        let mut inputs = reference_inputs();
        inputs.revenue.occupancy_rate = Scalar::Fixed(10.0);
        let result = calculate_projections(&inputs, 5);

        assert!(result.years.iter().all(|r| r.cumulative_cashflow < 0.0));
        assert_eq!(result.payback_period_cashflow, None);
    }

    #[test]
    fn test_negative_equity_has_zero_roe() {
        let mut inputs = reference_inputs();
        inputs.financing.down_payment = Scalar::Fixed(0.0);
        inputs.financing.annual_appreciation_rate = Scalar::Fixed(-20.0);
        let result = calculate_projections(&inputs, 3);

        for row in &result.years {
            assert!(row.equity <= 0.0);
            assert_eq!(row.roe, 0.0);
        }
        // No cash invested: investment-relative returns fall back to 0
        assert_eq!(result.years[0].roi_cashflow, 0.0);
    }

    #[test]
    fn test_summary_totals() {
        let result = calculate_projections(&mixed_expense_inputs(), 12);
        let summary = result.summary();
        let last = result.years.last().unwrap();

        assert_eq!(summary.total_years, 12);
        let total_cashflow: f64 = result.years.iter().map(|r| r.cashflow).sum();
        let total_capex: f64 = result.years.iter().map(|r| r.capex).sum();
        let total_npv: f64 = result.years.iter().map(|r| r.npv).sum();
        assert_abs_diff_eq!(summary.total_cashflow, total_cashflow, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.total_capex, total_capex, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.total_npv, total_npv, epsilon = 1e-9);

        // Running totals on the final row agree with the yearly sums
        assert_abs_diff_eq!(summary.total_cashflow, last.cumulative_cashflow, epsilon = 1e-6);
        assert_eq!(summary.total_principal_paid, last.cumulative_principal_paid);
        assert_eq!(summary.total_appreciation, last.cumulative_appreciation);
        assert_eq!(summary.final_property_value, last.property_value);
        assert_eq!(summary.final_mortgage_balance, last.mortgage_balance);
        assert_eq!(summary.final_equity, last.equity);

        // Appreciation since purchase is the whole value gain
        assert_abs_diff_eq!(summary.total_appreciation, last.property_value - 300_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let inputs = mixed_expense_inputs();
        let first = calculate_projections(&inputs, 20);
        let second = calculate_projections(&inputs, 20);
        assert_eq!(first, second);
    }
}
