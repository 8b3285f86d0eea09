//! Property Projection CLI
//!
//! Command-line interface for KPIs, multi-year projections and sensitivity sweeps

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use property_projection::breakeven::break_even_from_kpis;
use property_projection::inputs::{load_expense_lines, load_inputs, DEFAULT_INPUTS_PATH, DEFAULT_SWEEP_STEPS};
use property_projection::projection::MAX_PROJECTION_YEARS;
use property_projection::sensitivity::{run_sensitivity_analysis_1d, run_sensitivity_analysis_2d};
use property_projection::{calculate_kpis, calculate_projections, Objective, Parameter, ParameterRange, ProjectInputs};
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "property_projection")]
#[command(about = "Forecast, exit valuation and sensitivity analysis for a rental property")]
struct Args {
    /// Inputs JSON file
    #[arg(short, long, default_value = DEFAULT_INPUTS_PATH)]
    inputs: PathBuf,

    /// Replace the expense lines with those from a name,type,amount CSV file
    #[arg(long)]
    expenses_csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Year-1 KPIs and break-even occupancy
    Kpis,

    /// Year-by-year projection with exit scenarios
    Project {
        /// Projection horizon in years
        #[arg(short, long, default_value_t = 10)]
        years: u32,

        /// Write the yearly rows to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the full result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// One-at-a-time sensitivity of a KPI to each parameter
    Sweep {
        /// Parameter path, e.g. revenue.occupancyRate or expenses[0].amount (repeatable).
        /// Defaults to every input with an enabled range.
        #[arg(short, long = "param")]
        params: Vec<Parameter>,

        /// Sweep +/- this percent around the current value
        #[arg(long, default_value_t = 20.0)]
        spread: f64,

        #[arg(long, default_value_t = DEFAULT_SWEEP_STEPS)]
        steps: u32,

        #[arg(short, long, default_value_t = Objective::AnnualCashflow)]
        objective: Objective,
    },

    /// Two-parameter sensitivity grid
    Grid {
        #[arg(short = 'x', long)]
        x: Parameter,

        #[arg(short = 'y', long)]
        y: Parameter,

        #[arg(long, default_value_t = 20.0)]
        spread: f64,

        #[arg(long, default_value_t = DEFAULT_SWEEP_STEPS)]
        steps: u32,

        #[arg(short, long, default_value_t = Objective::AnnualCashflow)]
        objective: Objective,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut inputs = load_inputs(&args.inputs)
        .with_context(|| format!("Failed to load inputs from {}", args.inputs.display()))?;

    if let Some(path) = &args.expenses_csv {
        inputs.expenses = load_expense_lines(path)
            .with_context(|| format!("Failed to load expense lines from {}", path.display()))?;
    }

    match args.command {
        Command::Kpis => print_kpis(&inputs),
        Command::Project { years, csv, json } => project(&inputs, years, csv, json)?,
        Command::Sweep { params, spread, steps, objective } => sweep(&inputs, params, spread, steps, objective)?,
        Command::Grid { x, y, spread, steps, objective, json } => grid(&inputs, x, y, spread, steps, objective, json)?,
    }

    Ok(())
}

fn print_kpis(inputs: &ProjectInputs) {
    let kpis = calculate_kpis(inputs);
    let break_even = break_even_from_kpis(inputs, &kpis);

    println!("Year-1 KPIs");
    println!("===========\n");
    println!("  Loan Amount:          ${:>12.2}", kpis.loan_amount);
    println!("  Total Investment:     ${:>12.2}", kpis.total_investment);
    println!("  Nights Booked:         {:>12.2}", kpis.nights_booked);
    println!("  Gross Revenue:        ${:>12.2}", kpis.gross_revenue);
    println!("  Total Expenses:       ${:>12.2}", kpis.total_expenses);
    println!("  NOI:                  ${:>12.2}", kpis.noi);
    println!("  Periodic Payment:     ${:>12.2}", kpis.periodic_payment);
    println!("  Annual Debt Service:  ${:>12.2}", kpis.annual_debt_service);
    println!("  Annual Cashflow:      ${:>12.2}", kpis.annual_cashflow);
    println!("  Monthly Cashflow:     ${:>12.2}", kpis.monthly_cashflow);
    println!("  Cap Rate:              {:>11.2}%", kpis.cap_rate);
    println!("  Gross Yield:           {:>11.2}%", kpis.gross_yield);
    println!("  Cash on Cash:          {:>11.2}%", kpis.cash_on_cash);
    println!("  DSCR:                  {:>12.2}", kpis.dscr);
    println!("  LTV:                   {:>11.2}%", kpis.ltv);
    println!();
    println!("  Break-even Occupancy:  {:>11.2}%", break_even.occupancy_rate);
    println!("  Required Nights:       {:>12.2}", break_even.required_nights);
}

fn project(inputs: &ProjectInputs, years: u32, csv_path: Option<PathBuf>, json: bool) -> Result<()> {
    let years = years.clamp(1, MAX_PROJECTION_YEARS);
    let result = calculate_projections(inputs, years);

    if let Some(path) = csv_path {
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        for row in &result.years {
            writer.serialize(row)?;
        }
        writer.flush()?;
        println!("Yearly rows written to: {}", path.display());
    }

    if json {
        serde_json::to_writer_pretty(BufWriter::new(std::io::stdout()), &result)?;
        println!();
        return Ok(());
    }

    println!("Projection Results ({} years):", result.years.len());
    println!(
        "{:>4} {:>12} {:>12} {:>12} {:>12} {:>12} {:>14} {:>14} {:>8} {:>8}",
        "Year", "Revenue", "Expenses", "NOI", "DebtSvc", "Cashflow", "Balance", "Value", "DSCR", "ROE%"
    );
    println!("{}", "-".repeat(118));
    for row in &result.years {
        println!(
            "{:>4} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:>14.2} {:>8.2} {:>8.2}",
            row.year,
            row.revenue,
            row.expenses,
            row.noi,
            row.debt_service,
            row.cashflow,
            row.mortgage_balance,
            row.property_value,
            row.dscr,
            row.roe,
        );
    }

    println!("\nExit Scenarios:");
    println!(
        "{:>4} {:>14} {:>14} {:>14} {:>14} {:>8} {:>8}",
        "Year", "SalePrice", "NetProceeds", "Invested", "NetProfit", "MOIC", "IRR%"
    );
    for exit in &result.exit_scenarios {
        println!(
            "{:>4} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>8.2} {:>8.2}",
            exit.year, exit.sale_price, exit.net_proceeds, exit.total_invested, exit.net_profit, exit.moic, exit.irr
        );
    }

    let summary = result.summary();
    let payback = |p: Option<u32>| p.map(|y| format!("year {}", y)).unwrap_or_else(|| "not reached".to_string());
    println!("\nSummary:");
    println!("  IRR:                   {:.2}%", result.irr);
    println!("  Payback (cashflow):    {}", payback(result.payback_period_cashflow));
    println!("  Payback (total):       {}", payback(result.payback_period_total));
    println!("  Min DSCR:              {:.2}", result.min_dscr);
    println!("  Max LTV:               {:.2}%", result.max_ltv);
    println!("  Average ROE:           {:.2}%", result.average_roe);
    println!("  Total Cashflow:        ${:.2}", summary.total_cashflow);
    println!("  Final Equity:          ${:.2}", summary.final_equity);

    Ok(())
}

fn sweep(inputs: &ProjectInputs, params: Vec<Parameter>, spread: f64, steps: u32, objective: Objective) -> Result<()> {
    let ranges: Vec<ParameterRange> = if params.is_empty() {
        inputs.ranged_parameters(steps)
    } else {
        params
            .into_iter()
            .map(|p| ParameterRange::around(p, inputs, spread, steps))
            .collect::<Result<_, _>>()?
    };

    if ranges.is_empty() {
        bail!("No parameters to sweep: pass --param or enable a range in the inputs file");
    }

    let analysis = run_sensitivity_analysis_1d(inputs, &ranges, objective)?;

    println!("Sensitivity of {} (base {:.2})", objective, analysis.base_value);
    println!("{:<32} {:>14} {:>14} {:>14}", "Parameter", "Low", "High", "Impact");
    println!("{}", "-".repeat(77));
    for impact in &analysis.impacts {
        println!(
            "{:<32} {:>14.2} {:>14.2} {:>14.2}",
            impact.label, impact.impact_low, impact.impact_high, impact.relative_impact
        );
    }
    Ok(())
}

fn grid(
    inputs: &ProjectInputs,
    x: Parameter,
    y: Parameter,
    spread: f64,
    steps: u32,
    objective: Objective,
    json: bool,
) -> Result<()> {
    let x_range = ParameterRange::around(x, inputs, spread, steps)?;
    let y_range = ParameterRange::around(y, inputs, spread, steps)?;
    let analysis = run_sensitivity_analysis_2d(inputs, &x_range, &y_range, objective)?;

    if json {
        serde_json::to_writer_pretty(BufWriter::new(std::io::stdout()), &analysis)?;
        println!();
        return Ok(());
    }

    println!("{} by {} (rows) x {} (columns)", objective, y_range.label, x_range.label);
    print!("{:>12}", "");
    for x_value in &analysis.x_values {
        print!(" {:>12.2}", x_value);
    }
    println!();
    for (y_value, row) in analysis.y_values.iter().zip(&analysis.grid) {
        print!("{:>12.2}", y_value);
        for cell in row {
            print!(" {:>12.2}", cell);
        }
        println!();
    }
    Ok(())
}
