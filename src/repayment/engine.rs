//! Month-by-month repayment simulation

use chrono::{Months, NaiveDate};

use super::state::RepaymentState;
use super::strategy::{order_debts, PaymentStrategy};
use super::timeline::{
    BudgetShortfall, DebtAllocation, DebtMonth, DebtPayoff, MonthlyPlan, RepaymentPlan,
};
use crate::debt::Debt;

/// Default iteration cap: 100 years of monthly payments
pub const DEFAULT_MAX_MONTHS: u32 = 1200;

/// Shortfalls in a payoff amount smaller than this count as paid in full
const PAYOFF_TOLERANCE: f64 = 1e-9;

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct RepaymentConfig {
    /// Upper bound on simulated months
    pub max_months: u32,

    /// First payment month, used to date the payoff
    pub start_date: Option<NaiveDate>,
}

impl Default for RepaymentConfig {
    fn default() -> Self {
        Self {
            max_months: DEFAULT_MAX_MONTHS,
            start_date: None,
        }
    }
}

/// Main repayment engine
#[derive(Debug, Clone, Default)]
pub struct RepaymentEngine {
    config: RepaymentConfig,
}

/// Per-debt working figures for the month being simulated
struct MonthWork {
    interest: Vec<f64>,
    min_paid: Vec<f64>,
    extra: Vec<f64>,
}

impl MonthWork {
    fn new(len: usize) -> Self {
        Self {
            interest: vec![0.0; len],
            min_paid: vec![0.0; len],
            extra: vec![0.0; len],
        }
    }

    /// Balance plus interest still unpaid after minimum and extra so far
    fn room(&self, state: &RepaymentState, i: usize) -> f64 {
        (state.debts[i].balance + self.interest[i] - self.min_paid[i] - self.extra[i]).max(0.0)
    }
}

impl RepaymentEngine {
    pub fn new(config: RepaymentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RepaymentConfig {
        &self.config
    }

    /// Simulate paying down `debts` with a fixed monthly budget
    ///
    /// Never fails: an insufficient budget yields a plan with
    /// `is_viable == false`, and hitting the month cap yields a plan with
    /// `is_complete == false`. Both carry infinite totals.
    pub fn calculate_payment_plan(
        &self,
        debts: &[Debt],
        monthly_budget: f64,
        strategy: &PaymentStrategy,
    ) -> RepaymentPlan {
        let mut plan = RepaymentPlan::new(strategy.clone(), monthly_budget);
        let mut state = RepaymentState::from_debts(debts);

        if !state.has_open_debts() {
            self.finish(&mut plan, &state);
            return plan;
        }

        if let Some(shortfall) = Self::check_budget(&state, monthly_budget) {
            log::debug!("plan not viable: {}", shortfall);
            plan.reject(shortfall);
            plan.payoffs = Self::payoffs(&state, debts);
            return plan;
        }

        log::debug!(
            "simulating {} debts totalling {:.2}, budget {:.2}, strategy {}",
            debts.len(),
            state.total_initial_balance(),
            monthly_budget,
            strategy
        );

        while state.has_open_debts() && state.month < self.config.max_months {
            state.advance_month();
            let month = self.simulate_month(&mut state, monthly_budget, strategy);
            plan.add_month(month);
        }

        self.finish(&mut plan, &state);
        plan
    }

    /// Analytic viability check, run before any simulation
    fn check_budget(state: &RepaymentState, budget: f64) -> Option<BudgetShortfall> {
        if !budget.is_finite() {
            return Some(BudgetShortfall::InvalidBudget);
        }

        let required = state.total_minimum_payments();
        if budget < required {
            return Some(BudgetShortfall::BelowMinimumPayments { budget, required });
        }

        let monthly_interest = state.total_monthly_interest();
        if budget <= monthly_interest {
            return Some(BudgetShortfall::BelowMonthlyInterest { budget, monthly_interest });
        }

        None
    }

    /// Simulate a single month and advance balances
    fn simulate_month(
        &self,
        state: &mut RepaymentState,
        budget: f64,
        strategy: &PaymentStrategy,
    ) -> MonthlyPlan {
        let order = order_debts(&state.debts, strategy);
        let mut work = MonthWork::new(state.debts.len());

        // Accrue interest and pay minimums
        for &i in &order {
            let debt = &state.debts[i];
            work.interest[i] = debt.monthly_interest();
            work.min_paid[i] = debt.minimum_payment.min(debt.balance + work.interest[i]);
        }

        let minimums: f64 = work.min_paid.iter().sum();
        let leftover = (budget - minimums).max(0.0);

        if strategy.is_proportional() {
            Self::allocate_proportional(state, &mut work, &order, leftover);
        } else {
            Self::allocate_in_order(state, &mut work, &order, leftover);
        }

        self.record_month(state, &work)
    }

    /// Leftover goes to debts in priority order, cascading within the month
    fn allocate_in_order(state: &RepaymentState, work: &mut MonthWork, order: &[usize], mut leftover: f64) {
        for &i in order {
            if leftover <= 0.0 {
                break;
            }
            let extra = leftover.min(work.room(state, i));
            work.extra[i] += extra;
            leftover -= extra;
        }
    }

    /// Leftover split by balance share; capped shares overflow in `order`
    fn allocate_proportional(state: &RepaymentState, work: &mut MonthWork, order: &[usize], leftover: f64) {
        let total_balance: f64 = order.iter().map(|&i| state.debts[i].balance).sum();
        if total_balance <= 0.0 || leftover <= 0.0 {
            return;
        }

        let mut allocated = 0.0;
        for &i in order {
            let share = leftover * state.debts[i].balance / total_balance;
            let extra = share.min(work.room(state, i));
            work.extra[i] += extra;
            allocated += extra;
        }

        let overflow = leftover - allocated;
        if overflow > PAYOFF_TOLERANCE {
            Self::allocate_in_order(state, work, order, overflow);
        }
    }

    /// Apply payments, update balances and build the timeline entry
    fn record_month(&self, state: &mut RepaymentState, work: &MonthWork) -> MonthlyPlan {
        let mut month = MonthlyPlan::new(state.month);

        for i in 0..state.debts.len() {
            let debt = &state.debts[i];
            if !debt.is_open() {
                month.debts.push(DebtMonth::closed(&debt.id, &debt.name));
                continue;
            }

            let interest = work.interest[i];
            let payment = work.min_paid[i] + work.extra[i];
            let payoff_amount = debt.balance + interest;
            let remaining = if payment >= payoff_amount - PAYOFF_TOLERANCE {
                0.0
            } else {
                (payoff_amount - payment).max(0.0)
            };

            month.debts.push(DebtMonth {
                debt_id: debt.id.clone(),
                name: debt.name.clone(),
                min_payment: work.min_paid[i],
                extra_payment: work.extra[i],
                total_payment: payment,
                interest_paid: interest,
                principal_paid: (payment - interest).max(0.0),
                remaining_balance: remaining,
            });

            if remaining == 0.0 {
                month.debts_completed.push(debt.id.clone());
            }

            month.total_payment += payment;
            state.total_interest += interest;
            state.total_paid += payment;
            state.set_balance(i, remaining);
        }

        month.total_remaining = state.total_remaining();
        month.total_interest_paid = state.total_interest;
        month.total_paid = state.total_paid;
        month
    }

    /// Fill in totals, payoffs and dates once the loop has ended
    fn finish(&self, plan: &mut RepaymentPlan, state: &RepaymentState) {
        plan.is_complete = !state.has_open_debts();
        plan.payoffs = Self::payoffs(state, &state.debts);
        plan.monthly_allocation = Self::first_allocation(plan, state);

        if plan.is_complete {
            plan.total_months = Some(state.month);
            plan.total_interest_paid = state.total_interest;
            plan.total_paid = state.total_paid;
            plan.payoff_date = self.config.start_date.and_then(|start| {
                start.checked_add_months(Months::new(state.month.saturating_sub(1)))
            });
        } else {
            log::warn!(
                "repayment plan hit the {} month limit with {:.2} still owed",
                self.config.max_months,
                state.total_remaining()
            );
            plan.total_months = None;
            plan.total_interest_paid = f64::INFINITY;
            plan.total_paid = f64::INFINITY;
        }

        plan.credit_card_free_month = Self::credit_card_free_month(state);
    }

    fn payoffs(state: &RepaymentState, debts: &[Debt]) -> Vec<DebtPayoff> {
        debts
            .iter()
            .zip(&state.payoff_months)
            .map(|(debt, &payoff_month)| DebtPayoff {
                debt_id: debt.id.clone(),
                name: debt.name.clone(),
                kind: debt.kind,
                payoff_month,
            })
            .collect()
    }

    /// Month-one payment for every debt that started with a balance
    fn first_allocation(plan: &RepaymentPlan, state: &RepaymentState) -> Vec<DebtAllocation> {
        let Some(first) = plan.timeline.first() else {
            return Vec::new();
        };

        first
            .debts
            .iter()
            .enumerate()
            .filter(|(i, _)| state.started_open(*i))
            .map(|(i, row)| DebtAllocation {
                debt_id: row.debt_id.clone(),
                name: row.name.clone(),
                kind: state.debts[i].kind,
                min_payment: row.min_payment,
                extra_payment: row.extra_payment,
                total_payment: row.total_payment,
            })
            .collect()
    }

    /// Latest payoff month among cards that started with a balance
    fn credit_card_free_month(state: &RepaymentState) -> Option<u32> {
        let mut cards = (0..state.debts.len())
            .filter(|&i| state.debts[i].kind.is_revolving() && state.started_open(i))
            .peekable();
        cards.peek()?;

        cards
            .map(|i| state.payoff_months[i])
            .try_fold(0, |latest, month| month.map(|m| latest.max(m)))
    }
}

/// Simulate with the default configuration
pub fn calculate_payment_plan(
    debts: &[Debt],
    monthly_budget: f64,
    strategy: &PaymentStrategy,
) -> RepaymentPlan {
    RepaymentEngine::default().calculate_payment_plan(debts, monthly_budget, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::monthly_interest;
    use approx::assert_abs_diff_eq;

    fn card_and_loan(card_balance: f64, loan_balance: f64) -> Vec<Debt> {
        vec![
            Debt::credit_card("card", card_balance, 18.0, 150.0),
            Debt::loan("loan", loan_balance, 4.0, 280.0),
        ]
    }

    fn assert_plan_invariants(plan: &RepaymentPlan) {
        for (t, month) in plan.timeline.iter().enumerate() {
            let sum: f64 = month.debts.iter().map(|d| d.min_payment + d.extra_payment).sum();
            assert_abs_diff_eq!(month.total_payment, sum, epsilon = 1e-6);
            assert!(month.total_payment <= plan.monthly_budget + 1e-9, "month {} overspends", t + 1);

            for debt in &month.debts {
                assert!(debt.remaining_balance >= 0.0);
                if t > 0 {
                    let prior = plan.timeline[t - 1].debt(&debt.debt_id).unwrap();
                    assert!(
                        debt.remaining_balance <= prior.remaining_balance + 1e-9,
                        "{} grew in month {}",
                        debt.debt_id,
                        t + 1
                    );
                }
            }
        }
    }

    #[test]
    fn test_avalanche_first_month() {
        let plan = calculate_payment_plan(&card_and_loan(5000.0, 15_000.0), 730.0, &PaymentStrategy::Avalanche);
        assert!(plan.is_viable && plan.is_complete);

        let first = &plan.timeline[0];
        let card = first.debt("card").unwrap();
        assert_abs_diff_eq!(card.interest_paid, 75.0, epsilon = 1e-9);
        assert_abs_diff_eq!(card.min_payment, 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(card.extra_payment, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(card.total_payment, 450.0, epsilon = 1e-9);
        assert_abs_diff_eq!(card.remaining_balance, 4625.0, epsilon = 1e-9);

        let loan = first.debt("loan").unwrap();
        assert_abs_diff_eq!(loan.extra_payment, 0.0);
        assert_abs_diff_eq!(loan.total_payment, 280.0, epsilon = 1e-9);

        assert_eq!(plan.monthly_allocation.len(), 2);
        assert_abs_diff_eq!(plan.monthly_allocation[0].total_payment, 450.0, epsilon = 1e-9);
        assert_plan_invariants(&plan);
    }

    #[test]
    fn test_snowball_and_avalanche_diverge() {
        // Card: large balance, high APR. Loan: small balance, low APR.
        let debts = card_and_loan(15_000.0, 5000.0);

        let avalanche = calculate_payment_plan(&debts, 730.0, &PaymentStrategy::Avalanche);
        let snowball = calculate_payment_plan(&debts, 730.0, &PaymentStrategy::Snowball);

        assert_abs_diff_eq!(avalanche.timeline[0].debt("card").unwrap().extra_payment, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(avalanche.timeline[0].debt("loan").unwrap().extra_payment, 0.0);
        assert_abs_diff_eq!(snowball.timeline[0].debt("loan").unwrap().extra_payment, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(snowball.timeline[0].debt("card").unwrap().extra_payment, 0.0);

        // Paying the expensive debt first never costs more interest
        assert!(avalanche.total_interest_paid <= snowball.total_interest_paid);
        assert!(snowball.payoff_month("loan").unwrap() < avalanche.payoff_month("loan").unwrap());
        assert_plan_invariants(&avalanche);
        assert_plan_invariants(&snowball);
    }

    #[test]
    fn test_avalanche_holds_priority_until_paid() {
        let debts = vec![
            Debt::loan("a", 3000.0, 20.0, 60.0),
            Debt::loan("b", 1000.0, 10.0, 30.0),
        ];
        let plan = calculate_payment_plan(&debts, 300.0, &PaymentStrategy::Avalanche);
        let a_paid = plan.payoff_month("a").unwrap();

        for month in plan.timeline.iter().filter(|m| m.month < a_paid) {
            assert_abs_diff_eq!(month.debt("b").unwrap().extra_payment, 0.0);
            assert_abs_diff_eq!(month.debt("a").unwrap().extra_payment, 210.0, epsilon = 1e-9);
        }
        assert_plan_invariants(&plan);
    }

    #[test]
    fn test_cascade_within_month() {
        // Small debt is cleared in month 1 and the rest spills to the next one
        let debts = vec![
            Debt::loan("small", 100.0, 0.0, 10.0),
            Debt::loan("big", 1000.0, 0.0, 10.0),
        ];
        let plan = calculate_payment_plan(&debts, 500.0, &PaymentStrategy::Snowball);
        let first = &plan.timeline[0];

        assert_abs_diff_eq!(first.debt("small").unwrap().total_payment, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.debt("big").unwrap().total_payment, 400.0, epsilon = 1e-9);
        assert_eq!(first.debts_completed, vec!["small".to_string()]);
        assert_eq!(plan.total_months, Some(3));
        assert_abs_diff_eq!(plan.total_paid, 1100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(plan.total_interest_paid, 0.0);
    }

    #[test]
    fn test_equal_distribution_proportional() {
        let debts = vec![
            Debt::loan("a", 1000.0, 0.0, 50.0),
            Debt::loan("b", 2000.0, 0.0, 50.0),
            Debt::loan("c", 3000.0, 0.0, 50.0),
        ];
        let plan = calculate_payment_plan(&debts, 210.0, &PaymentStrategy::Equal);
        let first = &plan.timeline[0];

        assert_abs_diff_eq!(first.debt("a").unwrap().extra_payment, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.debt("b").unwrap().extra_payment, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.debt("c").unwrap().extra_payment, 30.0, epsilon = 1e-9);
        assert_plan_invariants(&plan);
    }

    #[test]
    fn test_equal_distribution_overflow_goes_to_largest() {
        // a's proportional share (1000 * 100/1100 ≈ 90.9) exceeds its 80 of room
        let debts = vec![
            Debt::loan("a", 100.0, 0.0, 20.0),
            Debt::loan("b", 1000.0, 0.0, 20.0),
        ];
        let plan = calculate_payment_plan(&debts, 1040.0, &PaymentStrategy::Equal);
        let first = &plan.timeline[0];

        let a = first.debt("a").unwrap();
        let b = first.debt("b").unwrap();
        assert_abs_diff_eq!(a.total_payment, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.remaining_balance, 0.0);
        assert_abs_diff_eq!(b.total_payment, 940.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.total_payment, 1040.0, epsilon = 1e-9);
    }

    #[test]
    fn test_viability_boundary() {
        let interest = monthly_interest(1000.0, 24.0);
        let debts = vec![Debt::loan("d", 1000.0, 24.0, 15.0)];

        let at_interest = calculate_payment_plan(&debts, interest, &PaymentStrategy::Avalanche);
        assert!(!at_interest.is_viable);
        assert!(at_interest.timeline.is_empty());
        assert!(matches!(at_interest.shortfall, Some(BudgetShortfall::BelowMonthlyInterest { .. })));

        let just_above = calculate_payment_plan(&debts, interest + 0.01, &PaymentStrategy::Avalanche);
        assert!(just_above.is_viable);
        assert!(just_above.is_complete);
        let months = just_above.total_months.unwrap();
        assert!(months > 300 && months < DEFAULT_MAX_MONTHS);
        assert_plan_invariants(&just_above);
    }

    #[test]
    fn test_budget_below_minimums() {
        let plan = calculate_payment_plan(&card_and_loan(5000.0, 15_000.0), 400.0, &PaymentStrategy::Snowball);
        assert!(!plan.is_viable);
        assert_eq!(plan.total_months, None);
        assert_eq!(
            plan.shortfall,
            Some(BudgetShortfall::BelowMinimumPayments { budget: 400.0, required: 430.0 })
        );
        assert!(plan.insufficient_budget_message.is_some());
        // Never reads as a cheap plan
        assert_eq!(plan.total_interest_paid, f64::INFINITY);
        assert_eq!(plan.total_paid, f64::INFINITY);
        assert!(plan.timeline.is_empty());
    }

    #[test]
    fn test_minimum_capped_at_payoff_amount() {
        let debts = vec![Debt::loan("small", 50.0, 12.0, 100.0)];
        let plan = calculate_payment_plan(&debts, 100.0, &PaymentStrategy::Avalanche);

        let first = plan.timeline[0].debt("small").unwrap();
        assert_abs_diff_eq!(first.min_payment, 50.5, epsilon = 1e-9);
        assert_abs_diff_eq!(first.extra_payment, 0.0);
        assert_abs_diff_eq!(first.total_payment, 50.5, epsilon = 1e-9);
        assert_eq!(plan.total_months, Some(1));
        assert_abs_diff_eq!(plan.total_paid, 50.5, epsilon = 1e-9);
    }

    #[test]
    fn test_custom_order_overrides_rate() {
        let debts = vec![
            Debt::loan("a", 1000.0, 20.0, 50.0),
            Debt::loan("b", 1000.0, 5.0, 50.0),
        ];
        let plan = calculate_payment_plan(&debts, 300.0, &PaymentStrategy::Custom(vec!["b".into()]));
        let first = &plan.timeline[0];

        assert_abs_diff_eq!(first.debt("b").unwrap().extra_payment, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.debt("a").unwrap().extra_payment, 0.0);
        assert!(plan.payoff_month("b").unwrap() < plan.payoff_month("a").unwrap());
        assert!(plan.is_complete);
        assert_plan_invariants(&plan);
    }

    #[test]
    fn test_nan_budget_is_rejected() {
        let plan = calculate_payment_plan(&card_and_loan(5000.0, 15_000.0), f64::NAN, &PaymentStrategy::Avalanche);
        assert!(!plan.is_viable);
        assert_eq!(plan.shortfall, Some(BudgetShortfall::InvalidBudget));
    }

    #[test]
    fn test_iteration_cap_flags_incomplete() {
        let engine = RepaymentEngine::new(RepaymentConfig { max_months: 12, start_date: None });
        let plan = engine.calculate_payment_plan(&card_and_loan(5000.0, 15_000.0), 730.0, &PaymentStrategy::Avalanche);

        assert!(plan.is_viable);
        assert!(!plan.is_complete);
        assert_eq!(plan.total_months, None);
        assert_eq!(plan.months_simulated(), 12);
        assert!(plan.total_interest_paid.is_infinite());
        assert_eq!(plan.payoff_month("loan"), None);
        assert_eq!(plan.credit_card_free_month, None);
    }

    #[test]
    fn test_empty_and_paid_debts() {
        let empty = calculate_payment_plan(&[], 500.0, &PaymentStrategy::Avalanche);
        assert!(empty.is_viable && empty.is_complete);
        assert_eq!(empty.total_months, Some(0));
        assert!(empty.timeline.is_empty());
        assert_eq!(empty.total_paid, 0.0);

        let debts = vec![Debt::loan("done", 0.0, 5.0, 100.0), Debt::loan("open", 500.0, 0.0, 100.0)];
        let plan = calculate_payment_plan(&debts, 100.0, &PaymentStrategy::Avalanche);
        assert_eq!(plan.total_months, Some(5));
        // Paid debts stay in the timeline at zero
        assert!(plan.timeline.iter().all(|m| m.debts.len() == 2));
        assert_eq!(plan.timeline[0].debt("done").unwrap().total_payment, 0.0);
        assert_eq!(plan.payoff_month("done"), Some(0));
        assert_eq!(plan.monthly_allocation.len(), 1);
    }

    #[test]
    fn test_deterministic() {
        let a = calculate_payment_plan(&card_and_loan(5000.0, 15_000.0), 730.0, &PaymentStrategy::Equal);
        let b = calculate_payment_plan(&card_and_loan(5000.0, 15_000.0), 730.0, &PaymentStrategy::Equal);
        assert_eq!(a, b);
    }

    #[test]
    fn test_conservation_of_totals() {
        let debts = card_and_loan(5000.0, 15_000.0);
        for strategy in PaymentStrategy::standard() {
            let plan = calculate_payment_plan(&debts, 730.0, &strategy);
            assert!(plan.is_complete);
            assert_abs_diff_eq!(plan.total_paid, 20_000.0 + plan.total_interest_paid, epsilon = 1e-6);

            let last = plan.timeline.last().unwrap();
            assert_abs_diff_eq!(last.total_remaining, 0.0);
            assert_abs_diff_eq!(last.total_paid, plan.total_paid, epsilon = 1e-9);
            assert_plan_invariants(&plan);
        }
    }

    #[test]
    fn test_credit_card_free_month_and_payoff_date() {
        let engine = RepaymentEngine::new(RepaymentConfig {
            max_months: DEFAULT_MAX_MONTHS,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        });
        let debts = card_and_loan(5000.0, 15_000.0);
        let plan = engine.calculate_payment_plan(&debts, 730.0, &PaymentStrategy::Avalanche);

        let card_month = plan.payoff_month("card").unwrap();
        assert_eq!(plan.credit_card_free_month, Some(card_month));
        assert!(card_month < plan.total_months.unwrap());

        let expected = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .checked_add_months(Months::new(plan.total_months.unwrap() - 1));
        assert_eq!(plan.payoff_date, expected);
    }

    #[test]
    fn test_does_not_mutate_input() {
        let debts = card_and_loan(5000.0, 15_000.0);
        let before = debts.clone();
        let _ = calculate_payment_plan(&debts, 730.0, &PaymentStrategy::Snowball);
        assert_eq!(debts, before);
    }
}
