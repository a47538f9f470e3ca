//! Debt records, loan and credit card helpers, and CSV loading

mod data;
mod convert;
pub mod loan;
pub mod credit_card;
pub mod loader;

pub use data::{Debt, DebtKind, monthly_rate, monthly_interest};
pub use convert::{loans_to_debts, credit_cards_to_debts, combine_debts};
pub use loan::{
    Loan, LoanCalculation, AmortizationRow, LoanPaymentTotals, LoanRecommendations, RepaymentType, InterestType,
    calculate_loan, annuity_payment, total_monthly_payment, loan_recommendations,
};
pub use credit_card::{CreditCard, CreditCardSummary, effective_min_payment, summarize_cards};
pub use loader::{load_debts, load_debts_from_reader, load_debts_json};
