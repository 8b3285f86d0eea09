//! Running totals carried from one projection year to the next

/// State of the investment between projection years
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Last completed year (0 at purchase)
    pub year: u32,

    /// Property value at the end of the last completed year
    pub property_value: f64,

    pub cumulative_cashflow: f64,
    pub cumulative_principal_paid: f64,
    pub cumulative_appreciation: f64,
    pub cumulative_total_profit: f64,
}

impl ProjectionState {
    /// State on the purchase date
    pub fn at_purchase(purchase_price: f64) -> Self {
        Self {
            year: 0,
            property_value: purchase_price,
            cumulative_cashflow: 0.0,
            cumulative_principal_paid: 0.0,
            cumulative_appreciation: 0.0,
            cumulative_total_profit: 0.0,
        }
    }

    /// Move to the next year and return it
    pub fn advance_year(&mut self) -> u32 {
        self.year += 1;
        self.year
    }
}
