//! Yearly operating expense recalculation
//!
//! Fixed lines escalate with the expense escalation rate. Percentage lines
//! follow their base (revenue or property value), which already carries its
//! own growth, so they are not escalated a second time.

use crate::inputs::{ExpenseLine, ExpenseType};
use crate::rounding::round2;

/// Figures an expense line can depend on for one forecast year
#[derive(Debug, Clone, Copy)]
pub struct ExpenseContext {
    /// Forecast year, 1-based
    pub year: u32,
    /// That year's revenue, already escalated
    pub revenue: f64,
    /// That year's property value
    pub property_value: f64,
    /// Annual expense escalation, percent
    pub escalation_rate: f64,
}

impl ExpenseContext {
    /// Compounded escalation factor for this year: (1 + rate)^(year - 1)
    pub fn escalation_factor(&self) -> f64 {
        (1.0 + self.escalation_rate / 100.0).powi(self.year.saturating_sub(1) as i32)
    }
}

/// Unrounded amount of a single line for the given year
pub fn line_amount(line: &ExpenseLine, ctx: &ExpenseContext) -> f64 {
    let amount = line.amount.value();
    match line.expense_type {
        ExpenseType::FixedAnnual => amount * ctx.escalation_factor(),
        ExpenseType::FixedMonthly => amount * 12.0 * ctx.escalation_factor(),
        ExpenseType::PercentageRevenue => ctx.revenue * amount / 100.0,
        ExpenseType::PercentagePropertyValue => ctx.property_value * amount / 100.0,
    }
}

/// Total expenses for the year, rounded to cents
pub fn total_expenses(lines: &[ExpenseLine], ctx: &ExpenseContext) -> f64 {
    round2(lines.iter().map(|line| line_amount(line, ctx)).sum())
}
