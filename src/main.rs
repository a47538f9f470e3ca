//! Debt Planner CLI
//!
//! Command-line interface for running repayment plans and comparisons

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use debt_planner::debt::load_debts;
use debt_planner::repayment::{PaymentStrategy, RepaymentConfig, RepaymentPlan, DEFAULT_MAX_MONTHS};
use debt_planner::scenario::{Scenario, ScenarioRunner};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "debt_planner", version, about = "Simulate debt repayment plans")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate one repayment plan
    Plan {
        /// CSV (id,name,kind,balance,interest_rate,minimum_payment) or JSON file
        #[arg(long)]
        debts: PathBuf,

        /// Total monthly budget across all debts
        #[arg(long)]
        budget: f64,

        /// avalanche, snowball, equal or custom
        #[arg(long, default_value = "avalanche")]
        strategy: String,

        /// Debt ids in priority order (custom strategy)
        #[arg(long, value_delimiter = ',')]
        order: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_MAX_MONTHS)]
        max_months: u32,

        /// First payment month (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Months to print in the table
        #[arg(long, default_value_t = 24)]
        rows: usize,

        /// Print the full plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare strategies across extra payment amounts
    Compare {
        #[arg(long)]
        debts: PathBuf,

        /// Extra amounts above the minimum payments
        #[arg(long, value_delimiter = ',', default_values_t = [0.0, 100.0, 300.0])]
        extra: Vec<f64>,

        #[arg(long, default_value_t = DEFAULT_MAX_MONTHS)]
        max_months: u32,

        #[arg(long)]
        json: bool,
    },
}

fn parse_strategy(name: &str, order: Vec<String>) -> Result<PaymentStrategy> {
    if name.eq_ignore_ascii_case("custom") {
        anyhow::ensure!(!order.is_empty(), "custom strategy needs --order");
        return Ok(PaymentStrategy::Custom(order));
    }
    Ok(name.parse()?)
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Plan { debts, budget, strategy, order, max_months, start_date, rows, json } => {
            let strategy = parse_strategy(&strategy, order)?;
            let debts = load_debts(&debts)
                .with_context(|| format!("loading debts from {}", debts.display()))?;

            let runner = ScenarioRunner::with_config(RepaymentConfig { max_months, start_date });
            let plan = runner.engine().calculate_payment_plan(&debts, budget, &strategy);

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan, rows);
            }
        }
        Command::Compare { debts, extra, max_months, json } => {
            let debts = load_debts(&debts)
                .with_context(|| format!("loading debts from {}", debts.display()))?;

            let scenarios: Vec<Scenario> = extra
                .iter()
                .flat_map(|&amount| {
                    PaymentStrategy::standard().into_iter().map(move |strategy| {
                        Scenario::new(
                            format!("{}-{}", strategy, amount),
                            format!("{} +{:.2}", strategy, amount),
                            amount,
                            strategy,
                        )
                    })
                })
                .collect();

            let runner = ScenarioRunner::with_config(RepaymentConfig { max_months, start_date: None });
            let results = runner.compare(&debts, &scenarios);

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
                return Ok(());
            }

            println!("{:<24} {:>12} {:>8} {:>14} {:>14} {:>8}",
                "Scenario", "Budget", "Months", "Interest", "Int. Saved", "Saved");
            println!("{}", "-".repeat(86));
            for row in &results {
                println!("{:<24} {:>12.2} {:>8} {:>14.2} {:>14} {:>8}",
                    row.scenario_name,
                    row.monthly_budget,
                    fmt_months(row.total_months),
                    row.total_interest_paid,
                    row.interest_saved.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".into()),
                    row.months_saved.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
                );
            }
        }
    }

    Ok(())
}

fn fmt_months(months: Option<u32>) -> String {
    months.map(|m| m.to_string()).unwrap_or_else(|| "never".into())
}

fn print_plan(plan: &RepaymentPlan, rows: usize) {
    println!("Strategy: {}  Budget: {:.2}", plan.strategy, plan.monthly_budget);

    if let Some(message) = &plan.insufficient_budget_message {
        println!("\nThis plan is not possible as configured: {}", message);
        return;
    }

    println!("\nThis month:");
    for alloc in &plan.monthly_allocation {
        println!("  {:<20} {:<12} min {:>10.2}  extra {:>10.2}  total {:>10.2}",
            alloc.name, alloc.kind, alloc.min_payment, alloc.extra_payment, alloc.total_payment);
    }

    println!("\n{:>5} {:>12} {:>12} {:>14} {:>14}", "Month", "Paid", "Remaining", "Cum. Interest", "Cum. Paid");
    println!("{}", "-".repeat(61));
    for month in plan.timeline.iter().take(rows) {
        println!("{:>5} {:>12.2} {:>12.2} {:>14.2} {:>14.2}",
            month.month, month.total_payment, month.total_remaining, month.total_interest_paid, month.total_paid);
    }
    if plan.timeline.len() > rows {
        println!("... ({} more months)", plan.timeline.len() - rows);
    }

    let summary = plan.summary();
    println!("\nSummary:");
    println!("  Debt free in: {} months", fmt_months(summary.total_months));
    println!("  Total interest: {:.2}", summary.total_interest_paid);
    println!("  Total paid: {:.2}", summary.total_paid);
    if let Some(month) = summary.credit_card_free_month {
        println!("  Credit cards cleared: month {}", month);
    }
    if let Some(date) = summary.payoff_date {
        println!("  Final payment: {}", date.format("%Y-%m"));
    }

    println!("\nPayoff order:");
    let mut payoffs: Vec<_> = plan.payoffs.iter().filter(|p| p.payoff_month != Some(0)).collect();
    payoffs.sort_by_key(|p| p.payoff_month.unwrap_or(u32::MAX));
    for payoff in payoffs {
        println!("  {:<20} {}", payoff.name, fmt_months(payoff.payoff_month));
    }
}
