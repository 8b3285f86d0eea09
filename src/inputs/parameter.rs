//! Addressable input leaves and sweep ranges
//!
//! Every numeric leaf of [`ProjectInputs`] has a [`Parameter`] variant with a
//! typed getter and a non-mutating setter. The dotted path form
//! (`financing.interestRate`, `expenses[2].amount`) is kept for display and
//! for parsing command-line arguments.

use super::{ProjectInputs, Scalar};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of sweep intervals when none is given
pub const DEFAULT_SWEEP_STEPS: u32 = 10;

/// A sweepable input leaf, serialized as its dotted path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Parameter {
    PurchasePrice,
    DownPayment,
    InterestRate,
    AmortizationYears,
    AppreciationRate,
    AverageDailyRate,
    OccupancyRate,
    DaysPerYear,
    /// Amount of the expense line at this index
    ExpenseAmount(usize),
    RevenueEscalationRate,
    ExpenseEscalationRate,
    CapexRate,
    DiscountRate,
    SaleCostsRate,
    AcquisitionFees,
}

const FIXED_PATHS: [(Parameter, &str); 14] = [
    (Parameter::PurchasePrice, "financing.purchasePrice"),
    (Parameter::DownPayment, "financing.downPayment"),
    (Parameter::InterestRate, "financing.interestRate"),
    (Parameter::AmortizationYears, "financing.amortizationYears"),
    (Parameter::AppreciationRate, "financing.annualAppreciationRate"),
    (Parameter::AverageDailyRate, "revenue.averageDailyRate"),
    (Parameter::OccupancyRate, "revenue.occupancyRate"),
    (Parameter::DaysPerYear, "revenue.daysPerYear"),
    (Parameter::RevenueEscalationRate, "projectionSettings.revenueEscalationRate"),
    (Parameter::ExpenseEscalationRate, "projectionSettings.expenseEscalationRate"),
    (Parameter::CapexRate, "projectionSettings.capexRate"),
    (Parameter::DiscountRate, "projectionSettings.discountRate"),
    (Parameter::SaleCostsRate, "projectionSettings.saleCostsRate"),
    (Parameter::AcquisitionFees, "acquisitionFees"),
];

impl Parameter {
    /// Every addressable leaf of these inputs, expense lines included
    pub fn all_for(inputs: &ProjectInputs) -> Vec<Parameter> {
        let mut parameters: Vec<Parameter> = FIXED_PATHS.iter().map(|(p, _)| *p).collect();
        parameters.extend((0..inputs.expenses.len()).map(Parameter::ExpenseAmount));
        parameters
    }

    /// Dotted path of this leaf
    pub fn path(&self) -> String {
        match self {
            Parameter::ExpenseAmount(index) => format!("expenses[{}].amount", index),
            other => FIXED_PATHS
                .iter()
                .find(|(p, _)| p == other)
                .map(|(_, path)| path.to_string())
                .unwrap_or_default(),
        }
    }

    /// Human readable name; expense lines use their own name
    pub fn label(&self, inputs: &ProjectInputs) -> String {
        match self {
            Parameter::PurchasePrice => "Purchase price".to_string(),
            Parameter::DownPayment => "Down payment".to_string(),
            Parameter::InterestRate => "Interest rate".to_string(),
            Parameter::AmortizationYears => "Amortization period".to_string(),
            Parameter::AppreciationRate => "Appreciation rate".to_string(),
            Parameter::AverageDailyRate => "Average daily rate".to_string(),
            Parameter::OccupancyRate => "Occupancy rate".to_string(),
            Parameter::DaysPerYear => "Days available per year".to_string(),
            Parameter::ExpenseAmount(index) => inputs
                .expenses
                .get(*index)
                .map(|line| line.name.clone())
                .unwrap_or_else(|| format!("Expense #{}", index)),
            Parameter::RevenueEscalationRate => "Revenue escalation".to_string(),
            Parameter::ExpenseEscalationRate => "Expense escalation".to_string(),
            Parameter::CapexRate => "Capex rate".to_string(),
            Parameter::DiscountRate => "Discount rate".to_string(),
            Parameter::SaleCostsRate => "Sale costs".to_string(),
            Parameter::AcquisitionFees => "Acquisition fees".to_string(),
        }
    }

    /// The scalar behind this leaf, if it exists in these inputs
    pub fn scalar<'a>(&self, inputs: &'a ProjectInputs) -> Option<&'a Scalar> {
        let settings = &inputs.projection_settings;
        Some(match self {
            Parameter::PurchasePrice => &inputs.financing.purchase_price,
            Parameter::DownPayment => &inputs.financing.down_payment,
            Parameter::InterestRate => &inputs.financing.interest_rate,
            Parameter::AmortizationYears => &inputs.financing.amortization_years,
            Parameter::AppreciationRate => &inputs.financing.annual_appreciation_rate,
            Parameter::AverageDailyRate => &inputs.revenue.average_daily_rate,
            Parameter::OccupancyRate => &inputs.revenue.occupancy_rate,
            Parameter::DaysPerYear => &inputs.revenue.days_per_year,
            Parameter::ExpenseAmount(index) => &inputs.expenses.get(*index)?.amount,
            Parameter::RevenueEscalationRate => &settings.revenue_escalation_rate,
            Parameter::ExpenseEscalationRate => &settings.expense_escalation_rate,
            Parameter::CapexRate => &settings.capex_rate,
            Parameter::DiscountRate => &settings.discount_rate,
            Parameter::SaleCostsRate => &settings.sale_costs_rate,
            Parameter::AcquisitionFees => &inputs.acquisition_fees,
        })
    }

    fn scalar_mut<'a>(&self, inputs: &'a mut ProjectInputs) -> Result<&'a mut Scalar> {
        let len = inputs.expenses.len();
        Ok(match self {
            Parameter::PurchasePrice => &mut inputs.financing.purchase_price,
            Parameter::DownPayment => &mut inputs.financing.down_payment,
            Parameter::InterestRate => &mut inputs.financing.interest_rate,
            Parameter::AmortizationYears => &mut inputs.financing.amortization_years,
            Parameter::AppreciationRate => &mut inputs.financing.annual_appreciation_rate,
            Parameter::AverageDailyRate => &mut inputs.revenue.average_daily_rate,
            Parameter::OccupancyRate => &mut inputs.revenue.occupancy_rate,
            Parameter::DaysPerYear => &mut inputs.revenue.days_per_year,
            Parameter::ExpenseAmount(index) => {
                &mut inputs
                    .expenses
                    .get_mut(*index)
                    .ok_or(ForecastError::MissingExpenseLine { index: *index, len })?
                    .amount
            }
            Parameter::RevenueEscalationRate => &mut inputs.projection_settings.revenue_escalation_rate,
            Parameter::ExpenseEscalationRate => &mut inputs.projection_settings.expense_escalation_rate,
            Parameter::CapexRate => &mut inputs.projection_settings.capex_rate,
            Parameter::DiscountRate => &mut inputs.projection_settings.discount_rate,
            Parameter::SaleCostsRate => &mut inputs.projection_settings.sale_costs_rate,
            Parameter::AcquisitionFees => &mut inputs.acquisition_fees,
        })
    }

    /// Current value of this leaf
    pub fn get(&self, inputs: &ProjectInputs) -> Option<f64> {
        self.scalar(inputs).map(Scalar::value)
    }

    /// Copy of `inputs` with this leaf set to `value`; the original is untouched
    pub fn apply(&self, inputs: &ProjectInputs, value: f64) -> Result<ProjectInputs> {
        let mut updated = inputs.clone();
        let scalar = self.scalar_mut(&mut updated)?;
        *scalar = scalar.with_value(value);
        Ok(updated)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl FromStr for Parameter {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let path = s.trim();
        let path = path.strip_suffix(".value").unwrap_or(path);

        if let Some((parameter, _)) = FIXED_PATHS.iter().find(|(_, p)| *p == path) {
            return Ok(*parameter);
        }

        path.strip_prefix("expenses[")
            .and_then(|rest| rest.strip_suffix("].amount"))
            .and_then(|index| index.parse::<usize>().ok())
            .map(Parameter::ExpenseAmount)
            .ok_or_else(|| ForecastError::UnknownParameter(s.to_string()))
    }
}

impl TryFrom<String> for Parameter {
    type Error = ForecastError;

    fn try_from(path: String) -> Result<Self> {
        path.parse()
    }
}

impl From<Parameter> for String {
    fn from(parameter: Parameter) -> Self {
        parameter.path()
    }
}

/// Sweep definition for one parameter
///
/// `min`, `max` and `steps` drive the sweep; `base` is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub parameter: Parameter,
    pub label: String,
    pub min: f64,
    pub base: f64,
    pub max: f64,
    pub steps: u32,
}

impl ParameterRange {
    /// Range of `base ± spread_pct%` around the current value of `parameter`
    pub fn around(
        parameter: Parameter,
        inputs: &ProjectInputs,
        spread_pct: f64,
        steps: u32,
    ) -> Result<Self> {
        let base = parameter
            .get(inputs)
            .ok_or_else(|| ForecastError::UnknownParameter(parameter.path()))?;
        let delta = (base * spread_pct / 100.0).abs();
        Ok(Self {
            parameter,
            label: parameter.label(inputs),
            min: base - delta,
            base,
            max: base + delta,
            steps,
        })
    }

    /// Reject ranges that would produce an empty or inverted sweep
    pub fn validate(&self) -> Result<()> {
        let reason = if self.steps < 1 {
            Some("steps must be at least 1".to_string())
        } else if !self.min.is_finite() || !self.max.is_finite() {
            Some("bounds must be finite".to_string())
        } else if self.min > self.max {
            Some(format!("min {} exceeds max {}", self.min, self.max))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ForecastError::InvalidRange {
                parameter: self.parameter.path(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// `steps + 1` evenly spaced values from min to max inclusive
    pub fn values(&self) -> Vec<f64> {
        let steps = self.steps.max(1);
        let width = self.max - self.min;
        (0..=steps)
            .map(|i| {
                if i == steps {
                    self.max
                } else {
                    self.min + width * i as f64 / steps as f64
                }
            })
            .collect()
    }
}
