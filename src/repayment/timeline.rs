//! Output structures for repayment simulations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::strategy::PaymentStrategy;
use crate::debt::DebtKind;

/// One debt's figures for one simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtMonth {
    pub debt_id: String,
    pub name: String,

    /// Minimum payment actually made (capped at the payoff amount)
    pub min_payment: f64,

    /// Payment above the minimum
    pub extra_payment: f64,

    /// min_payment + extra_payment
    pub total_payment: f64,

    /// Interest accrued this month, charged whether or not the payment covers it
    pub interest_paid: f64,

    /// Portion of the payment that reduced principal
    pub principal_paid: f64,

    /// Balance at end of month, never negative
    pub remaining_balance: f64,
}

impl DebtMonth {
    /// Row for a debt that is already closed
    pub fn closed(debt_id: &str, name: &str) -> Self {
        Self {
            debt_id: debt_id.to_string(),
            name: name.to_string(),
            min_payment: 0.0,
            extra_payment: 0.0,
            total_payment: 0.0,
            interest_paid: 0.0,
            principal_paid: 0.0,
            remaining_balance: 0.0,
        }
    }
}

/// A single simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPlan {
    /// Month number (1-indexed)
    pub month: u32,

    /// One row per input debt, in input order
    pub debts: Vec<DebtMonth>,

    /// Paid across all debts this month
    pub total_payment: f64,

    /// Sum of remaining balances at end of month
    pub total_remaining: f64,

    /// Cumulative interest to date
    pub total_interest_paid: f64,

    /// Cumulative payments to date
    pub total_paid: f64,

    /// Ids of debts paid off this month
    pub debts_completed: Vec<String>,
}

impl MonthlyPlan {
    pub fn new(month: u32) -> Self {
        Self {
            month,
            debts: Vec::new(),
            total_payment: 0.0,
            total_remaining: 0.0,
            total_interest_paid: 0.0,
            total_paid: 0.0,
            debts_completed: Vec::new(),
        }
    }

    pub fn debt(&self, debt_id: &str) -> Option<&DebtMonth> {
        self.debts.iter().find(|d| d.debt_id == debt_id)
    }
}

/// Recommended payment for one debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtAllocation {
    pub debt_id: String,
    pub name: String,
    pub kind: DebtKind,
    pub min_payment: f64,
    pub extra_payment: f64,
    pub total_payment: f64,
}

/// When a debt is cleared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayoff {
    pub debt_id: String,
    pub name: String,
    pub kind: DebtKind,

    /// Month the balance reached zero; `None` if never within the cap
    pub payoff_month: Option<u32>,
}

/// Why a budget cannot produce a viable plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum BudgetShortfall {
    /// Budget is NaN or infinite
    InvalidBudget,
    /// Budget is below the sum of minimum payments
    BelowMinimumPayments { budget: f64, required: f64 },
    /// Budget does not exceed one month of interest accrual
    BelowMonthlyInterest { budget: f64, monthly_interest: f64 },
}

impl fmt::Display for BudgetShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetShortfall::InvalidBudget => {
                write!(f, "Budget must be a finite amount")
            }
            BudgetShortfall::BelowMinimumPayments { budget, required } => write!(
                f,
                "Budget is insufficient: {:.2} does not cover minimum payments of {:.2}",
                budget, required
            ),
            BudgetShortfall::BelowMonthlyInterest { budget, monthly_interest } => write!(
                f,
                "Budget is insufficient: {:.2} does not exceed monthly interest of {:.2}",
                budget, monthly_interest
            ),
        }
    }
}

/// Complete result of a repayment simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentPlan {
    pub strategy: PaymentStrategy,
    pub monthly_budget: f64,

    /// False when the budget cannot cover minimums or interest
    pub is_viable: bool,

    /// True when every debt reached zero within the iteration cap
    pub is_complete: bool,

    /// Months until debt free; `None` if not viable or never paid off
    pub total_months: Option<u32>,

    /// Infinite when the plan never completes
    pub total_interest_paid: f64,

    /// Infinite when the plan never completes
    pub total_paid: f64,

    /// First month's payment per debt
    pub monthly_allocation: Vec<DebtAllocation>,

    pub timeline: Vec<MonthlyPlan>,

    /// Month all credit cards are cleared
    pub credit_card_free_month: Option<u32>,

    pub payoffs: Vec<DebtPayoff>,

    pub shortfall: Option<BudgetShortfall>,
    pub insufficient_budget_message: Option<String>,

    /// Calendar month of the final payment, when a start date is configured
    pub payoff_date: Option<NaiveDate>,
}

impl RepaymentPlan {
    pub fn new(strategy: PaymentStrategy, monthly_budget: f64) -> Self {
        Self {
            strategy,
            monthly_budget,
            is_viable: true,
            is_complete: false,
            total_months: None,
            total_interest_paid: 0.0,
            total_paid: 0.0,
            monthly_allocation: Vec::new(),
            timeline: Vec::new(),
            credit_card_free_month: None,
            payoffs: Vec::new(),
            shortfall: None,
            insufficient_budget_message: None,
            payoff_date: None,
        }
    }

    /// Record a shortfall and mark the plan not viable
    ///
    /// Totals become infinite, the same as a plan that never finishes.
    pub fn reject(&mut self, shortfall: BudgetShortfall) {
        self.is_viable = false;
        self.is_complete = false;
        self.total_months = None;
        self.total_interest_paid = f64::INFINITY;
        self.total_paid = f64::INFINITY;
        self.insufficient_budget_message = Some(shortfall.to_string());
        self.shortfall = Some(shortfall);
    }

    pub fn add_month(&mut self, month: MonthlyPlan) {
        self.timeline.push(month);
    }

    pub fn months_simulated(&self) -> u32 {
        self.timeline.len() as u32
    }

    pub fn payoff_month(&self, debt_id: &str) -> Option<u32> {
        self.payoffs
            .iter()
            .find(|p| p.debt_id == debt_id)
            .and_then(|p| p.payoff_month)
    }

    /// Get summary statistics
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            strategy: self.strategy.name().to_string(),
            is_viable: self.is_viable,
            is_complete: self.is_complete,
            total_months: self.total_months,
            total_interest_paid: self.total_interest_paid,
            total_paid: self.total_paid,
            first_month_payment: self.timeline.first().map(|m| m.total_payment).unwrap_or(0.0),
            credit_card_free_month: self.credit_card_free_month,
            payoff_date: self.payoff_date,
        }
    }
}

/// Headline figures of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub strategy: String,
    pub is_viable: bool,
    pub is_complete: bool,
    pub total_months: Option<u32>,
    pub total_interest_paid: f64,
    pub total_paid: f64,
    pub first_month_payment: f64,
    pub credit_card_free_month: Option<u32>,
    pub payoff_date: Option<NaiveDate>,
}
