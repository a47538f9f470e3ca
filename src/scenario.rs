//! Scenario runner for comparing repayment configurations
//!
//! Every comparison is repeated invocation of the repayment engine against a
//! baseline plan: minimum payments only, avalanche ordering.

use chrono::{Months, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::debt::{annuity_payment, Debt};
use crate::error::{PlanError, Result};
use crate::repayment::{PaymentStrategy, RepaymentConfig, RepaymentEngine, RepaymentPlan};

/// A named what-if: extra money on top of the minimums, with a strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,

    /// Monthly amount paid above the total minimum payments
    pub extra_monthly_payment: f64,

    pub strategy: PaymentStrategy,
}

impl Scenario {
    pub fn new(id: impl Into<String>, name: impl Into<String>, extra_monthly_payment: f64, strategy: PaymentStrategy) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra_monthly_payment,
            strategy,
        }
    }
}

/// Outcome of one scenario next to the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub scenario_id: String,
    pub scenario_name: String,
    pub strategy: PaymentStrategy,
    pub monthly_budget: f64,
    pub is_viable: bool,
    pub total_months: Option<u32>,
    pub total_interest_paid: f64,
    pub total_paid: f64,

    /// Savings against the baseline; `None` when either plan never completes
    pub months_saved: Option<i64>,
    pub interest_saved: Option<f64>,
    pub money_saved: Option<f64>,
}

/// Effect of a one-time lump sum against a single debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPaymentImpact {
    pub debt_id: String,
    pub amount: f64,
    pub months_saved: Option<i64>,
    pub interest_saved: Option<f64>,
    pub original_total_interest: f64,
    pub new_total_interest: f64,
    pub new_payoff_date: Option<NaiveDate>,
}

/// A consolidation loan on offer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationOffer {
    pub name: String,

    /// APR in whole percent
    pub interest_rate: f64,

    pub term_months: u32,
}

/// A consolidation loan evaluated against the baseline plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationOption {
    pub id: String,
    pub name: String,
    pub interest_rate: f64,
    pub term_months: u32,
    pub monthly_payment: f64,
    pub total_interest_paid: f64,
    pub total_paid: f64,
    pub interest_saved: Option<f64>,
    pub money_saved: Option<f64>,
    pub months_saved: Option<i64>,
    pub payoff_date: Option<NaiveDate>,
}

/// Pre-configured runner for batches of repayment scenarios
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let scenarios = vec![
///     Scenario::new("min", "Minimums", 0.0, PaymentStrategy::Avalanche),
///     Scenario::new("plus", "+300", 300.0, PaymentStrategy::Snowball),
/// ];
/// for row in runner.compare(&debts, &scenarios) {
///     println!("{}: {:?} months", row.scenario_name, row.total_months);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: RepaymentEngine,
}

impl ScenarioRunner {
    /// Create runner with the default engine configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RepaymentConfig) -> Self {
        Self {
            engine: RepaymentEngine::new(config),
        }
    }

    pub fn engine(&self) -> &RepaymentEngine {
        &self.engine
    }

    /// Plan for a single scenario
    pub fn run(&self, debts: &[Debt], scenario: &Scenario) -> RepaymentPlan {
        let budget = minimum_payment_total(debts) + scenario.extra_monthly_payment;
        self.engine.calculate_payment_plan(debts, budget, &scenario.strategy)
    }

    /// Minimum payments only, avalanche ordering
    pub fn baseline(&self, debts: &[Debt]) -> RepaymentPlan {
        self.engine
            .calculate_payment_plan(debts, minimum_payment_total(debts), &PaymentStrategy::Avalanche)
    }

    /// One plan per strategy for the same budget
    pub fn run_strategies(&self, debts: &[Debt], monthly_budget: f64, strategies: &[PaymentStrategy]) -> Vec<RepaymentPlan> {
        strategies
            .par_iter()
            .map(|strategy| self.engine.calculate_payment_plan(debts, monthly_budget, strategy))
            .collect()
    }

    /// Compare scenarios against the baseline; output order matches input
    pub fn compare(&self, debts: &[Debt], scenarios: &[Scenario]) -> Vec<ScenarioComparison> {
        let baseline = self.baseline(debts);

        scenarios
            .par_iter()
            .map(|scenario| {
                let plan = self.run(debts, scenario);
                if !plan.is_viable {
                    log::warn!(
                        "scenario {} is not viable: {}",
                        scenario.name,
                        plan.insufficient_budget_message.as_deref().unwrap_or("insufficient budget")
                    );
                }

                ScenarioComparison {
                    scenario_id: scenario.id.clone(),
                    scenario_name: scenario.name.clone(),
                    strategy: scenario.strategy.clone(),
                    monthly_budget: plan.monthly_budget,
                    is_viable: plan.is_viable,
                    total_months: plan.total_months,
                    total_interest_paid: plan.total_interest_paid,
                    total_paid: plan.total_paid,
                    months_saved: months_between(baseline.total_months, plan.total_months),
                    interest_saved: finite_difference(baseline.total_interest_paid, plan.total_interest_paid, &baseline, &plan),
                    money_saved: finite_difference(baseline.total_paid, plan.total_paid, &baseline, &plan),
                }
            })
            .collect()
    }

    /// Apply `amount` to one debt's balance today and compare minimum-payment plans
    pub fn extra_payment_impact(
        &self,
        debts: &[Debt],
        amount: f64,
        debt_id: &str,
        strategy: &PaymentStrategy,
    ) -> Result<ExtraPaymentImpact> {
        if !debts.iter().any(|d| d.id == debt_id) {
            return Err(PlanError::UnknownDebt(debt_id.to_string()));
        }

        let budget = minimum_payment_total(debts);
        let original = self.engine.calculate_payment_plan(debts, budget, strategy);

        let modified: Vec<Debt> = debts
            .iter()
            .map(|d| {
                let mut d = d.clone();
                if d.id == debt_id {
                    d.balance = (d.balance - amount.max(0.0)).max(0.0);
                }
                d
            })
            .collect();
        let updated = self.engine.calculate_payment_plan(&modified, budget, strategy);

        Ok(ExtraPaymentImpact {
            debt_id: debt_id.to_string(),
            amount,
            months_saved: months_between(original.total_months, updated.total_months),
            interest_saved: finite_difference(original.total_interest_paid, updated.total_interest_paid, &original, &updated),
            original_total_interest: original.total_interest_paid,
            new_total_interest: updated.total_interest_paid,
            new_payoff_date: updated.payoff_date,
        })
    }

    /// Evaluate consolidation loans that would replace every open debt
    ///
    /// Offers with a zero-month term are skipped.
    pub fn consolidation_options(&self, debts: &[Debt], offers: &[ConsolidationOffer]) -> Vec<ConsolidationOption> {
        let total_balance: f64 = debts.iter().map(|d| d.sanitized().balance).sum();
        let baseline = self.baseline(debts);
        let baseline_done = baseline.is_viable && baseline.is_complete;

        offers
            .iter()
            .filter(|offer| {
                if offer.term_months == 0 {
                    log::warn!("skipping consolidation offer {} with no term", offer.name);
                }
                offer.term_months > 0
            })
            .map(|offer| {
                let monthly_payment = annuity_payment(total_balance, offer.interest_rate, offer.term_months);
                let total_paid = monthly_payment * offer.term_months as f64;
                let total_interest_paid = total_paid - total_balance;

                ConsolidationOption {
                    id: format!("consolidation-{}", slug(&offer.name)),
                    name: offer.name.clone(),
                    interest_rate: offer.interest_rate,
                    term_months: offer.term_months,
                    monthly_payment,
                    total_interest_paid,
                    total_paid,
                    interest_saved: baseline_done.then(|| baseline.total_interest_paid - total_interest_paid),
                    money_saved: baseline_done.then(|| baseline.total_paid - total_paid),
                    months_saved: baseline
                        .total_months
                        .map(|m| m as i64 - offer.term_months as i64),
                    payoff_date: self.engine.config().start_date.and_then(|start| {
                        start.checked_add_months(Months::new(offer.term_months.saturating_sub(1)))
                    }),
                }
            })
            .collect()
    }
}

/// Run every scenario with the default engine configuration
pub fn compare_scenarios(debts: &[Debt], scenarios: &[Scenario]) -> Vec<ScenarioComparison> {
    ScenarioRunner::new().compare(debts, scenarios)
}

/// Sum of minimum payments over debts that still carry a balance
pub fn minimum_payment_total(debts: &[Debt]) -> f64 {
    debts
        .iter()
        .map(Debt::sanitized)
        .filter(Debt::is_open)
        .map(|d| d.minimum_payment)
        .sum()
}

fn months_between(baseline: Option<u32>, other: Option<u32>) -> Option<i64> {
    Some(baseline? as i64 - other? as i64)
}

fn finite_difference(baseline: f64, other: f64, a: &RepaymentPlan, b: &RepaymentPlan) -> Option<f64> {
    let complete = a.is_viable && a.is_complete && b.is_viable && b.is_complete;
    complete.then(|| baseline - other)
}

fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
