//! Working state of a repayment simulation

use crate::debt::Debt;

/// Mutable simulation state; owns private copies of the caller's debts
#[derive(Debug, Clone)]
pub struct RepaymentState {
    /// Current simulation month (1-indexed once advanced)
    pub month: u32,

    /// Working debts with balances as of the start of the month
    pub debts: Vec<Debt>,

    /// Balances before the first month
    pub initial_balances: Vec<f64>,

    /// Month each debt reached zero; `Some(0)` for debts that started closed
    pub payoff_months: Vec<Option<u32>>,

    /// Cumulative interest accrued
    pub total_interest: f64,

    /// Cumulative payments made
    pub total_paid: f64,
}

impl RepaymentState {
    /// Initialize from caller debts, clamping invalid amounts to zero
    pub fn from_debts(debts: &[Debt]) -> Self {
        let debts: Vec<Debt> = debts.iter().map(Debt::sanitized).collect();
        let initial_balances = debts.iter().map(|d| d.balance).collect();
        let payoff_months = debts
            .iter()
            .map(|d| if d.is_open() { None } else { Some(0) })
            .collect();

        Self {
            month: 0,
            debts,
            initial_balances,
            payoff_months,
            total_interest: 0.0,
            total_paid: 0.0,
        }
    }

    pub fn advance_month(&mut self) {
        self.month += 1;
    }

    pub fn has_open_debts(&self) -> bool {
        self.debts.iter().any(Debt::is_open)
    }

    /// Whether the debt had a balance before the first month
    pub fn started_open(&self, index: usize) -> bool {
        self.initial_balances[index] > 0.0
    }

    /// Sum of minimum payments over open debts
    pub fn total_minimum_payments(&self) -> f64 {
        self.debts.iter().filter(|d| d.is_open()).map(|d| d.minimum_payment).sum()
    }

    /// Interest one month would accrue on current balances
    pub fn total_monthly_interest(&self) -> f64 {
        self.debts.iter().filter(|d| d.is_open()).map(Debt::monthly_interest).sum()
    }

    pub fn total_remaining(&self) -> f64 {
        self.debts.iter().map(|d| d.balance).sum()
    }

    pub fn total_initial_balance(&self) -> f64 {
        self.initial_balances.iter().sum()
    }

    /// Record a new end-of-month balance
    pub fn set_balance(&mut self, index: usize, balance: f64) {
        self.debts[index].balance = balance;
        if balance <= 0.0 && self.payoff_months[index].is_none() {
            self.payoff_months[index] = Some(self.month);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_debts() {
        let caller = vec![
            Debt::credit_card("card", 5000.0, 18.0, 150.0),
            Debt::loan("done", 0.0, 4.0, 280.0),
            Debt::loan("bad", f64::NAN, -3.0, 50.0),
        ];
        let state = RepaymentState::from_debts(&caller);

        assert_eq!(state.payoff_months, vec![None, Some(0), Some(0)]);
        assert_eq!(state.total_minimum_payments(), 150.0);
        assert!((state.total_monthly_interest() - 75.0).abs() < 1e-9);
        assert!(state.has_open_debts());
        // Caller records are untouched
        assert!(caller[2].balance.is_nan());
    }

    #[test]
    fn test_set_balance_records_payoff_month() {
        let mut state = RepaymentState::from_debts(&[Debt::loan("a", 100.0, 0.0, 100.0)]);
        state.advance_month();
        state.set_balance(0, 0.0);
        assert_eq!(state.payoff_months[0], Some(1));
        assert!(!state.has_open_debts());
    }
}
