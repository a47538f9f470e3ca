//! Credit card records and minimum-payment calculations

use serde::{Deserialize, Serialize};

use super::data::{monthly_interest, monthly_rate};

/// Safety limit for standalone minimum-payment payoff loops (100 years)
pub const MAX_PAYOFF_MONTHS: u32 = 1200;

/// Balances at or below this are treated as cleared in payoff loops
const CLEARED_BALANCE: f64 = 1.0;

/// A credit card as entered by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: String,
    pub name: String,

    /// Current statement balance
    pub balance: f64,

    /// Credit limit
    pub limit: f64,

    /// APR in whole percent
    pub apr: f64,

    /// Fixed minimum payment
    pub min_payment: f64,

    /// Minimum payment as percent of balance
    pub min_payment_percent: f64,

    /// Balance is cleared in full every month
    #[serde(default)]
    pub full_payment: bool,

    pub is_active: bool,
}

impl CreditCard {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
        limit: f64,
        apr: f64,
        min_payment: f64,
        min_payment_percent: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
            limit,
            apr,
            min_payment,
            min_payment_percent,
            full_payment: false,
            is_active: true,
        }
    }

    pub fn monthly_interest(&self) -> f64 {
        monthly_interest(self.balance, self.apr)
    }

    /// Payment the card requires this month
    ///
    /// Full-payment cards owe balance plus interest; otherwise the greater
    /// of the fixed minimum and the percent-of-balance minimum.
    pub fn effective_payment(&self) -> f64 {
        if self.full_payment {
            self.balance + self.monthly_interest()
        } else {
            effective_min_payment(self.balance, self.min_payment, self.min_payment_percent)
        }
    }

    /// Months to clear the card paying only the minimum
    pub fn payoff_months(&self) -> Option<u32> {
        if self.full_payment {
            return Some(1);
        }
        payoff_months(self.balance, self.apr, self.min_payment, self.min_payment_percent)
    }

    /// Lifetime interest paying only the minimum (infinite if never cleared)
    pub fn total_interest(&self) -> f64 {
        if self.full_payment {
            return 0.0;
        }
        total_interest(self.balance, self.apr, self.min_payment, self.min_payment_percent)
    }

    pub fn utilization_rate(&self) -> f64 {
        if self.limit <= 0.0 {
            0.0
        } else {
            self.balance / self.limit
        }
    }
}

/// Greater of the fixed minimum and percent-of-balance minimum
pub fn effective_min_payment(balance: f64, min_payment: f64, min_payment_percent: f64) -> f64 {
    min_payment.max(balance * min_payment_percent / 100.0)
}

/// Walk the card forward on minimum payments until cleared
///
/// Returns `(months, total_interest)`, or `None` when the payment never
/// covers interest or the safety limit is reached.
fn minimum_payment_schedule(
    balance: f64,
    apr: f64,
    min_payment: f64,
    min_payment_percent: f64,
) -> Option<(u32, f64)> {
    let r = monthly_rate(apr);
    let mut remaining = balance;
    let mut months = 0;
    let mut interest_total = 0.0;

    while remaining > CLEARED_BALANCE && months < MAX_PAYOFF_MONTHS {
        let interest = remaining * r;
        let payment = effective_min_payment(remaining, min_payment, min_payment_percent);
        if payment <= interest {
            return None;
        }
        interest_total += interest;
        remaining = remaining + interest - payment;
        months += 1;
    }

    (months < MAX_PAYOFF_MONTHS).then_some((months, interest_total))
}

pub fn payoff_months(balance: f64, apr: f64, min_payment: f64, min_payment_percent: f64) -> Option<u32> {
    if balance <= 0.0 {
        return Some(0);
    }
    minimum_payment_schedule(balance, apr, min_payment, min_payment_percent).map(|(months, _)| months)
}

pub fn total_interest(balance: f64, apr: f64, min_payment: f64, min_payment_percent: f64) -> f64 {
    if balance <= 0.0 {
        return 0.0;
    }
    minimum_payment_schedule(balance, apr, min_payment, min_payment_percent)
        .map(|(_, interest)| interest)
        .unwrap_or(f64::INFINITY)
}

/// Totals across all active cards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditCardSummary {
    pub total_balance: f64,
    pub total_limit: f64,
    pub total_utilization: f64,
    pub total_min_payment: f64,
    pub total_monthly_interest: f64,
}

pub fn summarize_cards(cards: &[CreditCard]) -> CreditCardSummary {
    let mut summary = cards
        .iter()
        .filter(|c| c.is_active)
        .fold(CreditCardSummary::default(), |mut acc, card| {
            acc.total_balance += card.balance;
            acc.total_limit += card.limit;
            acc.total_min_payment += card.effective_payment();
            acc.total_monthly_interest += card.monthly_interest();
            acc
        });

    if summary.total_limit > 0.0 {
        summary.total_utilization = summary.total_balance / summary.total_limit;
    }
    summary
}
