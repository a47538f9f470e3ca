//! Conversion of loans and credit cards into normalized [`Debt`] records
//!
//! Minimum-payment rules for each debt type are resolved here so the
//! simulator only ever sees a fixed `minimum_payment`.

use super::credit_card::CreditCard;
use super::data::{Debt, DebtKind};
use super::loan::{calculate_loan, Loan};

impl From<&Loan> for Debt {
    fn from(loan: &Loan) -> Self {
        let calculation = calculate_loan(loan);
        Debt::new(
            loan.id.clone(),
            loan.name.clone(),
            DebtKind::Loan,
            loan.amount,
            loan.interest_rate,
            calculation.monthly_payment,
        )
    }
}

impl From<&CreditCard> for Debt {
    fn from(card: &CreditCard) -> Self {
        Debt::new(
            card.id.clone(),
            card.name.clone(),
            DebtKind::CreditCard,
            card.balance,
            card.apr,
            card.effective_payment(),
        )
    }
}

/// Active loans as debts
pub fn loans_to_debts(loans: &[Loan]) -> Vec<Debt> {
    loans.iter().filter(|l| l.is_active).map(Debt::from).collect()
}

/// Active cards as debts
pub fn credit_cards_to_debts(cards: &[CreditCard]) -> Vec<Debt> {
    cards.iter().filter(|c| c.is_active).map(Debt::from).collect()
}

/// Loans first, then cards
pub fn combine_debts(loans: &[Loan], cards: &[CreditCard]) -> Vec<Debt> {
    let mut debts = loans_to_debts(loans);
    debts.extend(credit_cards_to_debts(cards));
    debts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::loan::RepaymentType;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_combine_skips_inactive() {
        let mut old_loan = Loan::new("old", "Paid car", 5000.0, 5.0, 3, RepaymentType::Annuity);
        old_loan.is_active = false;
        let loans = vec![
            Loan::new("car", "Car", 10_000.0, 6.0, 5, RepaymentType::Annuity),
            old_loan,
        ];
        let cards = vec![CreditCard::new("visa", "Visa", 2000.0, 5000.0, 18.0, 25.0, 3.0)];

        let debts = combine_debts(&loans, &cards);
        assert_eq!(debts.len(), 2);
        assert_eq!(debts[0].id, "car");
        assert_eq!(debts[0].kind, DebtKind::Loan);
        assert_abs_diff_eq!(debts[0].minimum_payment, 193.33, epsilon = 0.01);
        assert_eq!(debts[1].kind, DebtKind::CreditCard);
        assert_abs_diff_eq!(debts[1].minimum_payment, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_loan_keeps_contract_rate() {
        let mut loan = Loan::new("v", "Variable", 10_000.0, 3.0, 10, RepaymentType::Annuity);
        loan.interest_type = crate::debt::loan::InterestType::VariableEuribor;
        let debt = Debt::from(&loan);
        // Margin raises the payment but the debt carries the contract rate
        assert_eq!(debt.interest_rate, 3.0);
        assert!(debt.minimum_payment > crate::debt::loan::annuity_payment(10_000.0, 3.0, 120));
    }
}
