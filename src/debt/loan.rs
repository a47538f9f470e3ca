//! Installment loan records and their payment calculations

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::data::monthly_rate;
use crate::error::PlanError;

/// Percentage points added to the contract rate for Euribor-linked loans
pub const EURIBOR_MARGIN: f64 = 1.0;

/// Longest term honored in calculations
pub const MAX_TERM_YEARS: u32 = 100;

/// How a loan is repaid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepaymentType {
    /// Equal monthly payments (annuity formula)
    Annuity,
    /// Equal principal each month, interest on top
    EqualPrincipal,
    /// Flat total interest spread evenly over the term
    FixedInstallment,
    /// Borrower-chosen payment, never below the first month's interest
    CustomPayment,
}

impl FromStr for RepaymentType {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annuity" => Ok(RepaymentType::Annuity),
            "equal-principal" => Ok(RepaymentType::EqualPrincipal),
            "fixed-installment" => Ok(RepaymentType::FixedInstallment),
            "custom-payment" => Ok(RepaymentType::CustomPayment),
            other => Err(PlanError::UnknownLoanType(other.to_string())),
        }
    }
}

/// Interest rate basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterestType {
    #[default]
    Fixed,
    /// Variable rate tracking Euribor
    VariableEuribor,
}

/// A loan as entered by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub name: String,

    /// Outstanding principal
    pub amount: f64,

    /// Contract APR in whole percent
    pub interest_rate: f64,

    /// Remaining term in years
    pub term_years: u32,

    pub repayment_type: RepaymentType,

    #[serde(default)]
    pub interest_type: InterestType,

    /// Monthly payment for `CustomPayment` loans
    #[serde(default)]
    pub custom_payment: Option<f64>,

    pub is_active: bool,
}

impl Loan {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: f64,
        interest_rate: f64,
        term_years: u32,
        repayment_type: RepaymentType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            interest_rate,
            term_years,
            repayment_type,
            interest_type: InterestType::Fixed,
            custom_payment: None,
            is_active: true,
        }
    }

    /// APR used for calculations, including the Euribor margin when variable
    pub fn effective_rate(&self) -> f64 {
        match self.interest_type {
            InterestType::Fixed => self.interest_rate,
            InterestType::VariableEuribor => self.interest_rate + EURIBOR_MARGIN,
        }
    }

    /// Term in months; terms beyond [`MAX_TERM_YEARS`] are clamped
    pub fn term_months(&self) -> u32 {
        self.term_years.min(MAX_TERM_YEARS) * 12
    }
}

/// One month of a loan's amortization table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub principal: f64,
    pub interest: f64,
}

/// Payment figures for a loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanCalculation {
    /// Monthly payment (first month's for equal-principal loans)
    pub monthly_payment: f64,

    /// Interest over the whole term
    pub total_interest: f64,

    /// Principal portion of the first payment
    pub first_principal: f64,

    /// Interest portion of the first payment
    pub first_interest: f64,

    /// Principal and interest for every month of the term
    pub monthly_breakdown: Vec<AmortizationRow>,
}

/// Calculate payment figures according to the loan's repayment type
pub fn calculate_loan(loan: &Loan) -> LoanCalculation {
    let rate = loan.effective_rate();
    let months = loan.term_months();

    match loan.repayment_type {
        RepaymentType::Annuity => annuity(loan.amount, rate, months),
        RepaymentType::EqualPrincipal => equal_principal(loan.amount, rate, months),
        RepaymentType::FixedInstallment => fixed_installment(loan.amount, rate, months),
        RepaymentType::CustomPayment => {
            let payment = loan
                .custom_payment
                .unwrap_or_else(|| loan.amount / months.max(1) as f64);
            custom_payment(loan.amount, rate, months, payment)
        }
    }
}

/// Level payment that amortizes `principal` over `months`
///
/// A zero rate falls back to straight division.
pub fn annuity_payment(principal: f64, annual_percent: f64, months: u32) -> f64 {
    if months == 0 {
        return principal;
    }
    let r = monthly_rate(annual_percent);
    if r == 0.0 {
        return principal / months as f64;
    }
    let exponent = i32::try_from(months).unwrap_or(i32::MAX);
    let growth = (1.0 + r).powi(exponent);
    if growth.is_infinite() {
        // Interest-only in the limit of an endless term
        return principal * r;
    }
    principal * r * growth / (growth - 1.0)
}

fn annuity(principal: f64, annual_percent: f64, months: u32) -> LoanCalculation {
    let r = monthly_rate(annual_percent);
    let payment = annuity_payment(principal, annual_percent, months);

    let mut balance = principal;
    let mut total_interest = 0.0;
    let mut monthly_breakdown = Vec::with_capacity(months as usize);
    for _ in 0..months {
        let interest = balance * r;
        total_interest += interest;
        balance -= payment - interest;
        monthly_breakdown.push(AmortizationRow { principal: payment - interest, interest });
    }

    LoanCalculation {
        monthly_payment: payment,
        total_interest,
        first_principal: payment - principal * r,
        first_interest: principal * r,
        monthly_breakdown,
    }
}

fn equal_principal(principal: f64, annual_percent: f64, months: u32) -> LoanCalculation {
    let r = monthly_rate(annual_percent);
    let monthly_principal = principal / months.max(1) as f64;

    let mut balance = principal;
    let mut total_interest = 0.0;
    let mut monthly_breakdown = Vec::with_capacity(months as usize);
    for _ in 0..months {
        let interest = balance * r;
        total_interest += interest;
        balance -= monthly_principal;
        monthly_breakdown.push(AmortizationRow { principal: monthly_principal, interest });
    }

    LoanCalculation {
        monthly_payment: monthly_principal + principal * r,
        total_interest,
        first_principal: monthly_principal,
        first_interest: principal * r,
        monthly_breakdown,
    }
}

/// Flat interest on the original principal for the whole term
fn fixed_installment(principal: f64, annual_percent: f64, months: u32) -> LoanCalculation {
    let r = monthly_rate(annual_percent);
    let total_interest = principal * annual_percent * (months as f64 / 12.0) / 100.0;
    let payment = (principal + total_interest) / months.max(1) as f64;

    let mut balance = principal;
    let mut monthly_breakdown = Vec::with_capacity(months as usize);
    for _ in 0..months {
        let interest = balance * r;
        balance -= payment - interest;
        monthly_breakdown.push(AmortizationRow { principal: payment - interest, interest });
    }

    LoanCalculation {
        monthly_payment: payment,
        total_interest,
        first_principal: payment - principal * r,
        first_interest: principal * r,
        monthly_breakdown,
    }
}

fn custom_payment(principal: f64, annual_percent: f64, months: u32, payment: f64) -> LoanCalculation {
    let r = monthly_rate(annual_percent);
    let payment = payment.max(principal * r);

    let mut balance = principal;
    let mut total_interest = 0.0;
    let mut monthly_breakdown = Vec::new();
    for _ in 0..months {
        let interest = balance * r;
        let principal_paid = (payment - interest).min(balance);
        total_interest += interest;
        balance -= principal_paid;
        monthly_breakdown.push(AmortizationRow { principal: principal_paid, interest });
        if balance <= 0.0 {
            break;
        }
    }

    LoanCalculation {
        monthly_payment: payment,
        total_interest,
        first_principal: payment - principal * r,
        first_interest: principal * r,
        monthly_breakdown,
    }
}

/// This month's payment split across all active loans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanPaymentTotals {
    pub total_payment: f64,
    pub total_principal: f64,
    pub total_interest: f64,
}

/// Sum of first-month payment, principal and interest over active loans
pub fn total_monthly_payment(loans: &[Loan]) -> LoanPaymentTotals {
    loans
        .iter()
        .filter(|l| l.is_active)
        .map(calculate_loan)
        .fold(LoanPaymentTotals::default(), |mut acc, calc| {
            acc.total_payment += calc.monthly_payment;
            acc.total_principal += calc.first_principal;
            acc.total_interest += calc.first_interest;
            acc
        })
}

/// Loans worth paying down first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanRecommendations {
    /// Active loans sharing the highest contract rate
    pub highest_rate: Vec<Loan>,

    /// Active loans sharing the highest lifetime interest
    pub highest_total_interest: Vec<Loan>,

    /// Loans in both groups
    pub top_priority: Vec<Loan>,
}

/// Flag the most expensive active loans by rate and by lifetime interest
pub fn loan_recommendations(loans: &[Loan]) -> LoanRecommendations {
    let active: Vec<(&Loan, f64)> = loans
        .iter()
        .filter(|l| l.is_active)
        .map(|l| (l, calculate_loan(l).total_interest))
        .collect();
    if active.is_empty() {
        return LoanRecommendations::default();
    }

    let max_rate = active.iter().map(|(l, _)| l.interest_rate).fold(f64::NEG_INFINITY, f64::max);
    let max_interest = active.iter().map(|&(_, i)| i).fold(f64::NEG_INFINITY, f64::max);

    let highest_rate: Vec<Loan> = active
        .iter()
        .filter(|(l, _)| l.interest_rate == max_rate)
        .map(|(l, _)| (*l).clone())
        .collect();
    let highest_total_interest: Vec<Loan> = active
        .iter()
        .filter(|&&(_, i)| i == max_interest)
        .map(|(l, _)| (*l).clone())
        .collect();
    let top_priority = highest_rate
        .iter()
        .filter(|l| highest_total_interest.iter().any(|h| h.id == l.id))
        .cloned()
        .collect();

    LoanRecommendations {
        highest_rate,
        highest_total_interest,
        top_priority,
    }
}
