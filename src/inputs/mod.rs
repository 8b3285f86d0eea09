//! Property purchase description: financing, revenue, expense lines and projection settings

mod scalar;
mod parameter;
pub mod loader;

pub use scalar::Scalar;
pub use parameter::{Parameter, ParameterRange, DEFAULT_SWEEP_STEPS};
pub use loader::{load_inputs, load_inputs_from_reader, load_expense_lines, DEFAULT_INPUTS_PATH};

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Mortgage payment frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentFrequency {
    Monthly,
    BiWeekly,
    Weekly,
    Annual,
}

impl PaymentFrequency {
    pub fn payments_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::BiWeekly => 26,
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Annual => 1,
        }
    }
}

impl Default for PaymentFrequency {
    fn default() -> Self {
        PaymentFrequency::Monthly
    }
}

/// How an expense line's amount is interpreted, which also fixes its escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseType {
    /// Amount per year, escalated by the expense escalation rate
    FixedAnnual,
    /// Amount per month, escalated by the expense escalation rate
    FixedMonthly,
    /// Percent of the year's (already escalated) revenue
    PercentageRevenue,
    /// Percent of the year's property value
    PercentagePropertyValue,
}

/// One operating expense line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub name: String,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub amount: Scalar,
}

impl ExpenseLine {
    pub fn new(name: impl Into<String>, expense_type: ExpenseType, amount: f64) -> Self {
        Self {
            name: name.into(),
            expense_type,
            amount: Scalar::Fixed(amount),
        }
    }
}

/// Purchase and mortgage terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financing {
    pub purchase_price: Scalar,
    pub down_payment: Scalar,
    /// Annual nominal rate, percent
    pub interest_rate: Scalar,
    pub amortization_years: Scalar,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    /// Annual appreciation, percent
    #[serde(default)]
    pub annual_appreciation_rate: Scalar,
}

impl Financing {
    pub fn loan_amount(&self) -> f64 {
        self.purchase_price.value() - self.down_payment.value()
    }

    /// Amortization term in whole years
    pub fn amortization_term(&self) -> u32 {
        self.amortization_years.value().round().max(0.0) as u32
    }
}

/// Longest amortization term accepted on load
pub const MAX_AMORTIZATION_YEARS: u32 = 100;

/// Short-term rental revenue assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub average_daily_rate: Scalar,
    /// Percent of available days booked
    pub occupancy_rate: Scalar,
    #[serde(default = "default_days_per_year")]
    pub days_per_year: Scalar,
}

fn default_days_per_year() -> Scalar {
    Scalar::Fixed(365.0)
}

/// Multi-year projection rates, all in percent
///
/// Every field falls back to its own default when absent from the input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSettings {
    #[serde(default = "defaults::revenue_escalation")]
    pub revenue_escalation_rate: Scalar,
    #[serde(default = "defaults::expense_escalation")]
    pub expense_escalation_rate: Scalar,
    #[serde(default = "defaults::capex")]
    pub capex_rate: Scalar,
    #[serde(default = "defaults::discount")]
    pub discount_rate: Scalar,
    #[serde(default = "defaults::sale_costs")]
    pub sale_costs_rate: Scalar,
}

mod defaults {
    use super::Scalar;

    pub const REVENUE_ESCALATION_RATE: f64 = 2.0;
    pub const EXPENSE_ESCALATION_RATE: f64 = 2.5;
    pub const CAPEX_RATE: f64 = 1.0;
    pub const DISCOUNT_RATE: f64 = 8.0;
    pub const SALE_COSTS_RATE: f64 = 6.0;

    pub fn revenue_escalation() -> Scalar {
        Scalar::Fixed(REVENUE_ESCALATION_RATE)
    }
    pub fn expense_escalation() -> Scalar {
        Scalar::Fixed(EXPENSE_ESCALATION_RATE)
    }
    pub fn capex() -> Scalar {
        Scalar::Fixed(CAPEX_RATE)
    }
    pub fn discount() -> Scalar {
        Scalar::Fixed(DISCOUNT_RATE)
    }
    pub fn sale_costs() -> Scalar {
        Scalar::Fixed(SALE_COSTS_RATE)
    }
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            revenue_escalation_rate: defaults::revenue_escalation(),
            expense_escalation_rate: defaults::expense_escalation(),
            capex_rate: defaults::capex(),
            discount_rate: defaults::discount(),
            sale_costs_rate: defaults::sale_costs(),
        }
    }
}

/// Complete, immutable description of one property investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInputs {
    pub financing: Financing,
    pub revenue: Revenue,
    #[serde(default)]
    pub expenses: Vec<ExpenseLine>,
    #[serde(default)]
    pub projection_settings: ProjectionSettings,
    #[serde(default)]
    pub acquisition_fees: Scalar,
}

impl ProjectInputs {
    /// Check the ranges the engines assume; called by the loader
    pub fn validate(&self) -> Result<()> {
        let f = &self.financing;
        let price = f.purchase_price.value();
        let down = f.down_payment.value();

        if !(price > 0.0) {
            return Err(invalid("purchasePrice must be positive"));
        }
        if down < 0.0 || down > price {
            return Err(invalid("downPayment must lie between 0 and purchasePrice"));
        }
        if f.interest_rate.value() < 0.0 {
            return Err(invalid("interestRate must not be negative"));
        }
        let term = f.amortization_term();
        if !(1..=MAX_AMORTIZATION_YEARS).contains(&term) {
            return Err(invalid("amortizationYears must be between 1 and 100"));
        }

        let r = &self.revenue;
        let days = r.days_per_year.value();
        if !(days > 0.0 && days <= 366.0) {
            return Err(invalid("daysPerYear must be in (0, 366]"));
        }
        let occupancy = r.occupancy_rate.value();
        if !(0.0..=100.0).contains(&occupancy) {
            return Err(invalid("occupancyRate must be in [0, 100]"));
        }
        if r.average_daily_rate.value() < 0.0 {
            return Err(invalid("averageDailyRate must not be negative"));
        }
        if self.acquisition_fees.value() < 0.0 {
            return Err(invalid("acquisitionFees must not be negative"));
        }
        Ok(())
    }

    /// Sweep ranges for every scalar whose range is switched on
    pub fn ranged_parameters(&self, steps: u32) -> Vec<ParameterRange> {
        Parameter::all_for(self)
            .into_iter()
            .filter_map(|parameter| {
                let scalar = parameter.scalar(self)?;
                let (min, max) = scalar.active_range()?;
                Some(ParameterRange {
                    label: parameter.label(self),
                    parameter,
                    min,
                    base: scalar.value(),
                    max,
                    steps,
                })
            })
            .collect()
    }
}

fn invalid(reason: &str) -> ForecastError {
    ForecastError::InvalidInputs(reason.to_string())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// 300k purchase, 25% down, 5% over 25 years monthly, 3% appreciation,
    /// $200 ADR at 60% occupancy, one $20k fixed annual expense, no escalation
    pub fn reference_inputs() -> ProjectInputs {
        ProjectInputs {
            financing: Financing {
                purchase_price: Scalar::Fixed(300_000.0),
                down_payment: Scalar::Fixed(75_000.0),
                interest_rate: Scalar::Fixed(5.0),
                amortization_years: Scalar::Fixed(25.0),
                payment_frequency: PaymentFrequency::Monthly,
                annual_appreciation_rate: Scalar::Fixed(3.0),
            },
            revenue: Revenue {
                average_daily_rate: Scalar::Fixed(200.0),
                occupancy_rate: Scalar::Fixed(60.0),
                days_per_year: Scalar::Fixed(365.0),
            },
            expenses: vec![ExpenseLine::new("Operations", ExpenseType::FixedAnnual, 20_000.0)],
            projection_settings: ProjectionSettings {
                revenue_escalation_rate: Scalar::Fixed(0.0),
                expense_escalation_rate: Scalar::Fixed(0.0),
                capex_rate: Scalar::Fixed(0.0),
                discount_rate: Scalar::Fixed(8.0),
                sale_costs_rate: Scalar::Fixed(6.0),
            },
            acquisition_fees: Scalar::Fixed(0.0),
        }
    }

    /// Reference inputs with a mix of expense line types and non-zero escalation
    pub fn mixed_expense_inputs() -> ProjectInputs {
        let mut inputs = reference_inputs();
        inputs.expenses = vec![
            ExpenseLine::new("Insurance", ExpenseType::FixedAnnual, 2_400.0),
            ExpenseLine::new("Utilities", ExpenseType::FixedMonthly, 350.0),
            ExpenseLine::new("Platform fees", ExpenseType::PercentageRevenue, 15.0),
            ExpenseLine::new("Property tax", ExpenseType::PercentagePropertyValue, 1.2),
        ];
        inputs.projection_settings.revenue_escalation_rate = Scalar::Fixed(2.0);
        inputs.projection_settings.expense_escalation_rate = Scalar::Fixed(3.0);
        inputs.projection_settings.capex_rate = Scalar::Fixed(1.0);
        inputs.acquisition_fees = Scalar::Fixed(9_000.0);
        inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payments_per_year() {
        assert_eq!(PaymentFrequency::Monthly.payments_per_year(), 12);
        assert_eq!(PaymentFrequency::BiWeekly.payments_per_year(), 26);
        assert_eq!(PaymentFrequency::Weekly.payments_per_year(), 52);
        assert_eq!(PaymentFrequency::Annual.payments_per_year(), 1);
    }

    #[test]
    fn test_reference_inputs_are_valid() {
        let inputs = fixtures::reference_inputs();
        assert!(inputs.validate().is_ok());
        assert_eq!(inputs.financing.loan_amount(), 225_000.0);
    }

    #[test]
    fn test_validation_rejects_oversized_down_payment() {
        let mut inputs = fixtures::reference_inputs();
        inputs.financing.down_payment = Scalar::Fixed(400_000.0);
        assert!(matches!(inputs.validate(), Err(ForecastError::InvalidInputs(_))));
    }

    fn assert_rejected(inputs: &ProjectInputs, field: &str) {
        match inputs.validate() {
            Err(ForecastError::InvalidInputs(reason)) => {
                assert!(reason.contains(field), "unexpected reason: {}", reason)
            }
            other => panic!("expected {} to be rejected, got {:?}", field, other),
        }
    }

    #[test]
    fn test_validation_rejects_non_positive_price() {
        let mut inputs = fixtures::reference_inputs();
        inputs.financing.purchase_price = Scalar::Fixed(0.0);
        assert_rejected(&inputs, "purchasePrice");
    }

    #[test]
    fn test_validation_rejects_negative_interest_rate() {
        let mut inputs = fixtures::reference_inputs();
        inputs.financing.interest_rate = Scalar::Fixed(-0.5);
        assert_rejected(&inputs, "interestRate");
    }

    #[test]
    fn test_validation_rejects_amortization_term_out_of_bounds() {
        let mut inputs = fixtures::reference_inputs();
        inputs.financing.amortization_years = Scalar::Fixed(0.0);
        assert_rejected(&inputs, "amortizationYears");

        inputs.financing.amortization_years = Scalar::Fixed(101.0);
        assert_rejected(&inputs, "amortizationYears");

        inputs.financing.amortization_years = Scalar::Fixed(400_000_000.0);
        assert_rejected(&inputs, "amortizationYears");

        inputs.financing.amortization_years = Scalar::Fixed(100.0);
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_days_per_year_out_of_bounds() {
        let mut inputs = fixtures::reference_inputs();
        inputs.revenue.days_per_year = Scalar::Fixed(0.0);
        assert_rejected(&inputs, "daysPerYear");

        inputs.revenue.days_per_year = Scalar::Fixed(367.0);
        assert_rejected(&inputs, "daysPerYear");

        inputs.revenue.days_per_year = Scalar::Fixed(366.0);
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_negative_adr() {
        let mut inputs = fixtures::reference_inputs();
        inputs.revenue.average_daily_rate = Scalar::Fixed(-1.0);
        assert_rejected(&inputs, "averageDailyRate");
    }

    #[test]
    fn test_validation_rejects_negative_acquisition_fees() {
        let mut inputs = fixtures::reference_inputs();
        inputs.acquisition_fees = Scalar::Fixed(-100.0);
        assert_rejected(&inputs, "acquisitionFees");
    }

    #[test]
    fn test_validation_rejects_occupancy_above_100() {
        let mut inputs = fixtures::reference_inputs();
        inputs.revenue.occupancy_rate = Scalar::Fixed(120.0);
        assert_rejected(&inputs, "occupancyRate");
    }

    #[test]
    fn test_ranged_parameters_only_lists_enabled_ranges() {
        let mut inputs = fixtures::reference_inputs();
        inputs.revenue.occupancy_rate = Scalar::Ranged {
            value: 60.0,
            min: 40.0,
            max: 80.0,
            default: 60.0,
            enabled: true,
        };
        inputs.financing.interest_rate = Scalar::Ranged {
            value: 5.0,
            min: 3.0,
            max: 7.0,
            default: 5.0,
            enabled: false,
        };

        let ranges = inputs.ranged_parameters(8);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].parameter, Parameter::OccupancyRate);
        assert_eq!(ranges[0].min, 40.0);
        assert_eq!(ranges[0].base, 60.0);
        assert_eq!(ranges[0].steps, 8);
    }
}
