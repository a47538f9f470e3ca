//! Debt Planner - month-by-month debt repayment simulation
//!
//! This library provides:
//! - Normalized debt records plus loan and credit card payment helpers
//! - Avalanche, snowball, equal-distribution and custom payoff ordering
//! - Repayment plans with timelines, totals and viability checks
//! - Scenario comparison, lump-sum impact and consolidation analysis

pub mod error;
pub mod debt;
pub mod repayment;
pub mod scenario;

// Re-export commonly used types
pub use error::PlanError;
pub use debt::{Debt, DebtKind, Loan, CreditCard};
pub use repayment::{
    calculate_payment_plan, PaymentStrategy, RepaymentConfig, RepaymentEngine, RepaymentPlan, MonthlyPlan,
};
pub use scenario::{compare_scenarios, Scenario, ScenarioComparison, ScenarioRunner};
