//! JSON input loader, plus CSV loading of expense lines
//!
//! Inputs live in `data/inputs.json` by default. Expense lines may instead be
//! kept in a `name,type,amount` CSV file.

use super::{ExpenseLine, ExpenseType, ProjectInputs, Scalar};
use crate::error::{ForecastError, Result};
use csv::Reader;
use log::info;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Default path to the inputs file
pub const DEFAULT_INPUTS_PATH: &str = "data/inputs.json";

/// Load and validate inputs from a JSON file
pub fn load_inputs<P: AsRef<Path>>(path: P) -> Result<ProjectInputs> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let inputs = load_inputs_from_reader(BufReader::new(file))?;
    info!(
        "Loaded inputs from {} ({} expense lines)",
        path.display(),
        inputs.expenses.len()
    );
    Ok(inputs)
}

/// Load and validate inputs from any reader
pub fn load_inputs_from_reader<R: Read>(reader: R) -> Result<ProjectInputs> {
    let inputs: ProjectInputs = serde_json::from_reader(reader)?;
    inputs.validate()?;
    Ok(inputs)
}

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    name: String,
    #[serde(rename = "type")]
    expense_type: String,
    amount: f64,
}

impl CsvRow {
    fn to_line(self) -> Result<ExpenseLine> {
        let expense_type = match self.expense_type.trim() {
            "FIXED_ANNUAL" => ExpenseType::FixedAnnual,
            "FIXED_MONTHLY" => ExpenseType::FixedMonthly,
            "PERCENTAGE_REVENUE" => ExpenseType::PercentageRevenue,
            "PERCENTAGE_PROPERTY_VALUE" => ExpenseType::PercentagePropertyValue,
            other => {
                return Err(ForecastError::InvalidInputs(format!(
                    "Unknown expense type for '{}': {}",
                    self.name, other
                )))
            }
        };

        Ok(ExpenseLine {
            name: self.name,
            expense_type,
            amount: Scalar::Fixed(self.amount),
        })
    }
}

/// Load expense lines from a CSV file with `name,type,amount` columns
pub fn load_expense_lines<P: AsRef<Path>>(path: P) -> Result<Vec<ExpenseLine>> {
    load_expense_lines_from_reader(File::open(path)?)
}

/// Load expense lines from any CSV reader
pub fn load_expense_lines_from_reader<R: Read>(reader: R) -> Result<Vec<ExpenseLine>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut lines = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        lines.push(row.to_line()?);
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::PaymentFrequency;

    const INPUTS_JSON: &str = r#"{
        "financing": {
            "purchasePrice": 300000,
            "downPayment": 75000,
            "interestRate": {"value": 5, "range": {"min": 3, "max": 7, "default": 5, "useRange": true}},
            "amortizationYears": 25,
            "paymentFrequency": "BI_WEEKLY",
            "annualAppreciationRate": 3
        },
        "revenue": {
            "averageDailyRate": 200,
            "occupancyRate": 60
        },
        "expenses": [
            {"name": "Cleaning", "type": "PERCENTAGE_REVENUE", "amount": 10},
            {"name": "Insurance", "type": "FIXED_ANNUAL", "amount": {"value": 2400}}
        ],
        "projectionSettings": {
            "discountRate": 7
        }
    }"#;

    #[test]
    fn test_load_inputs_from_json() {
        let inputs = load_inputs_from_reader(INPUTS_JSON.as_bytes()).unwrap();

        assert_eq!(inputs.financing.payment_frequency, PaymentFrequency::BiWeekly);
        assert_eq!(inputs.financing.interest_rate.active_range(), Some((3.0, 7.0)));
        assert_eq!(inputs.revenue.days_per_year.value(), 365.0);
        assert_eq!(inputs.expenses.len(), 2);
        assert_eq!(inputs.expenses[0].expense_type, ExpenseType::PercentageRevenue);
        assert_eq!(inputs.expenses[1].amount.value(), 2400.0);

        // Missing settings fall back individually
        assert_eq!(inputs.projection_settings.discount_rate.value(), 7.0);
        assert_eq!(inputs.projection_settings.sale_costs_rate.value(), 6.0);
        assert_eq!(inputs.acquisition_fees.value(), 0.0);
    }

    #[test]
    fn test_load_rejects_invalid_inputs() {
        let json = INPUTS_JSON.replace("\"downPayment\": 75000", "\"downPayment\": 500000");
        let err = load_inputs_from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInputs(_)));
    }

    #[test]
    fn test_load_rejects_overlong_amortization() {
        let json = INPUTS_JSON.replace("\"amortizationYears\": 25", "\"amortizationYears\": 400000000");
        let err = load_inputs_from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInputs(_)));
    }

    #[test]
    fn test_load_expense_lines_csv() {
        let csv = "name,type,amount\nCleaning,PERCENTAGE_REVENUE,12\nUtilities,FIXED_MONTHLY,300\n";
        let lines = load_expense_lines_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].name, "Utilities");
        assert_eq!(lines[1].expense_type, ExpenseType::FixedMonthly);
        assert_eq!(lines[1].amount.value(), 300.0);
    }

    #[test]
    fn test_load_expense_lines_unknown_type() {
        let csv = "name,type,amount\nMystery,WEEKLY,5\n";
        assert!(load_expense_lines_from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_load_default_inputs() {
        let inputs = load_inputs(DEFAULT_INPUTS_PATH).expect("Failed to load inputs");
        assert_eq!(inputs.expenses.len(), 4);
        assert_eq!(inputs.acquisition_fees.value(), 9000.0);

        // Interest rate, ADR and occupancy carry enabled ranges
        assert_eq!(inputs.ranged_parameters(10).len(), 3);
    }

    #[test]
    fn test_load_default_expense_csv() {
        let lines = load_expense_lines("data/expenses.csv").expect("Failed to load expenses");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4].expense_type, ExpenseType::PercentagePropertyValue);
    }
}
