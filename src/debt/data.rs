//! Normalized debt record consumed by the repayment simulator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PlanError;

/// Kind of liability behind a debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DebtKind {
    /// Amortizing installment loan
    Loan,
    /// Revolving credit card balance
    CreditCard,
}

impl DebtKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtKind::Loan => "loan",
            DebtKind::CreditCard => "credit-card",
        }
    }

    pub fn is_revolving(&self) -> bool {
        matches!(self, DebtKind::CreditCard)
    }
}

impl fmt::Display for DebtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebtKind {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loan" => Ok(DebtKind::Loan),
            "credit-card" | "credit_card" | "creditcard" | "card" => Ok(DebtKind::CreditCard),
            other => Err(PlanError::UnknownDebtKind(other.to_string())),
        }
    }
}

/// A single amortizing liability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// Unique, stable identifier
    pub id: String,

    /// Display label
    pub name: String,

    /// Loan or credit card
    pub kind: DebtKind,

    /// Principal currently owed
    pub balance: f64,

    /// Annual percentage rate in whole percent (18.5 = 18.5%/year)
    pub interest_rate: f64,

    /// Contractual minimum monthly payment
    pub minimum_payment: f64,
}

impl Debt {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: DebtKind,
        balance: f64,
        interest_rate: f64,
        minimum_payment: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            balance,
            interest_rate,
            minimum_payment,
        }
    }

    pub fn loan(id: impl Into<String>, balance: f64, interest_rate: f64, minimum_payment: f64) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, DebtKind::Loan, balance, interest_rate, minimum_payment)
    }

    pub fn credit_card(id: impl Into<String>, balance: f64, interest_rate: f64, minimum_payment: f64) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, DebtKind::CreditCard, balance, interest_rate, minimum_payment)
    }

    /// Monthly rate as a decimal (APR / 100 / 12)
    pub fn monthly_rate(&self) -> f64 {
        monthly_rate(self.interest_rate)
    }

    /// Interest accrued over one month on the current balance
    pub fn monthly_interest(&self) -> f64 {
        monthly_interest(self.balance, self.interest_rate)
    }

    pub fn is_open(&self) -> bool {
        self.balance > 0.0
    }

    /// Copy with NaN and negative amounts clamped to zero
    pub fn sanitized(&self) -> Self {
        Self {
            balance: non_negative(self.balance),
            interest_rate: non_negative(self.interest_rate),
            minimum_payment: non_negative(self.minimum_payment),
            ..self.clone()
        }
    }
}

/// Convert an APR in whole percent to a monthly decimal rate
pub fn monthly_rate(annual_percent: f64) -> f64 {
    annual_percent / 100.0 / 12.0
}

/// One month of simple monthly-compounded interest
pub fn monthly_interest(balance: f64, annual_percent: f64) -> f64 {
    balance * monthly_rate(annual_percent)
}

/// Clamp NaN, infinities and negatives to zero
fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
