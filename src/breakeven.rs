//! Break-even occupancy
//!
//! Closed form: the occupancy at which year-1 revenue covers the costs
//! measured at the plan's nominal occupancy. Revenue-linked expense lines stay
//! at their nominal-occupancy value; this is not solved to a fixed point.

use crate::inputs::ProjectInputs;
use crate::kpi::{calculate_kpis, KpiResults};
use crate::rounding::round2;
use serde::{Deserialize, Serialize};

/// Break-even figures for one set of inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEven {
    /// Operating expenses plus debt service, at nominal occupancy
    pub total_annual_costs: f64,
    pub required_revenue: f64,
    pub required_nights: f64,
    /// Percent, clamped to [0, 100]
    pub occupancy_rate: f64,
}

/// Minimum occupancy (percent) that zeroes the year-1 cashflow
pub fn break_even_occupancy(inputs: &ProjectInputs) -> f64 {
    break_even(inputs).occupancy_rate
}

/// Full break-even breakdown
pub fn break_even(inputs: &ProjectInputs) -> BreakEven {
    let kpis = calculate_kpis(inputs);
    break_even_from_kpis(inputs, &kpis)
}

/// Break-even breakdown from an already evaluated baseline
pub fn break_even_from_kpis(inputs: &ProjectInputs, baseline: &KpiResults) -> BreakEven {
    let total_annual_costs = round2(baseline.total_expenses + baseline.annual_debt_service);
    let required_revenue = total_annual_costs;

    let adr = inputs.revenue.average_daily_rate.value();
    let days = inputs.revenue.days_per_year.value();

    // Without a nightly rate no occupancy covers costs; report every available night
    let required_nights = if adr > 0.0 { required_revenue / adr } else { days };
    let occupancy_rate = if days > 0.0 {
        (required_nights / days * 100.0).clamp(0.0, 100.0)
    } else {
        100.0
    };

    BreakEven {
        total_annual_costs,
        required_revenue,
        required_nights: round2(required_nights),
        occupancy_rate: round2(occupancy_rate),
    }
}
