//! Error types for input loading and parsing
//!
//! Budget problems are not errors: they are reported on the
//! [`RepaymentPlan`](crate::repayment::RepaymentPlan) itself.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Unknown payment strategy: {0}")]
    UnknownStrategy(String),
    #[error("Unknown debt kind: {0}")]
    UnknownDebtKind(String),
    #[error("Unknown loan repayment type: {0}")]
    UnknownLoanType(String),
    #[error("Debt not found: {0}")]
    UnknownDebt(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
