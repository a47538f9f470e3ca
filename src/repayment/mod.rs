//! Repayment simulator: strategy ordering and month-by-month amortization

mod state;
mod engine;
mod strategy;
mod timeline;

pub use state::RepaymentState;
pub use engine::{RepaymentEngine, RepaymentConfig, calculate_payment_plan, DEFAULT_MAX_MONTHS};
pub use strategy::{PaymentStrategy, order_debts};
pub use timeline::{
    BudgetShortfall, DebtAllocation, DebtMonth, DebtPayoff, MonthlyPlan, PlanSummary, RepaymentPlan,
};
