//! Prioritization strategies and the single debt-ordering function

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::debt::Debt;
use crate::error::PlanError;

/// How budget above the minimum payments is prioritized
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStrategy {
    /// Highest APR first
    #[default]
    Avalanche,
    /// Smallest balance first
    Snowball,
    /// Extra split across open debts in proportion to balance
    Equal,
    /// Caller-supplied order of debt ids; unlisted debts follow in input order
    Custom(Vec<String>),
}

impl PaymentStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            PaymentStrategy::Avalanche => "avalanche",
            PaymentStrategy::Snowball => "snowball",
            PaymentStrategy::Equal => "equal",
            PaymentStrategy::Custom(_) => "custom",
        }
    }

    /// Whether extra budget is split proportionally instead of cascading
    pub fn is_proportional(&self) -> bool {
        matches!(self, PaymentStrategy::Equal)
    }

    /// The three built-in strategies
    pub fn standard() -> [PaymentStrategy; 3] {
        [PaymentStrategy::Avalanche, PaymentStrategy::Snowball, PaymentStrategy::Equal]
    }
}

impl fmt::Display for PaymentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaymentStrategy {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avalanche" => Ok(PaymentStrategy::Avalanche),
            "snowball" => Ok(PaymentStrategy::Snowball),
            "equal" | "equal-distribution" => Ok(PaymentStrategy::Equal),
            other => Err(PlanError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Indices of open debts (balance > 0) in the order they receive extra budget
///
/// Ties fall back to input order, so the result is fully deterministic.
/// For `Equal` the order is descending balance; it decides where overflow
/// from a capped proportional share goes.
pub fn order_debts(debts: &[Debt], strategy: &PaymentStrategy) -> Vec<usize> {
    let mut open: Vec<usize> = (0..debts.len()).filter(|&i| debts[i].is_open()).collect();

    open.sort_by(|&a, &b| {
        let (da, db) = (&debts[a], &debts[b]);
        let primary = match strategy {
            PaymentStrategy::Avalanche => by_rate_desc(da, db).then_with(|| by_balance_desc(da, db)),
            PaymentStrategy::Snowball => by_balance_asc(da, db).then_with(|| by_rate_desc(da, db)),
            PaymentStrategy::Equal => by_balance_desc(da, db).then_with(|| by_rate_desc(da, db)),
            PaymentStrategy::Custom(order) => custom_rank(order, &da.id).cmp(&custom_rank(order, &db.id)),
        };
        primary.then(a.cmp(&b))
    });

    open
}

fn by_rate_desc(a: &Debt, b: &Debt) -> Ordering {
    b.interest_rate.total_cmp(&a.interest_rate)
}

fn by_balance_desc(a: &Debt, b: &Debt) -> Ordering {
    b.balance.total_cmp(&a.balance)
}

fn by_balance_asc(a: &Debt, b: &Debt) -> Ordering {
    a.balance.total_cmp(&b.balance)
}

fn custom_rank(order: &[String], id: &str) -> usize {
    order.iter().position(|o| o == id).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debts() -> Vec<Debt> {
        vec![
            Debt::loan("mortgage", 150_000.0, 3.5, 900.0),
            Debt::credit_card("visa", 1200.0, 21.0, 40.0),
            Debt::credit_card("store", 400.0, 21.0, 25.0),
            Debt::loan("paid", 0.0, 9.0, 100.0),
            Debt::loan("car", 8000.0, 6.0, 220.0),
        ]
    }

    #[test]
    fn test_avalanche_order() {
        // Equal APR: larger balance first
        assert_eq!(order_debts(&debts(), &PaymentStrategy::Avalanche), vec![1, 2, 4, 0]);
    }

    #[test]
    fn test_snowball_order() {
        assert_eq!(order_debts(&debts(), &PaymentStrategy::Snowball), vec![2, 1, 4, 0]);
    }

    #[test]
    fn test_snowball_tie_prefers_higher_rate() {
        let debts = vec![
            Debt::loan("low", 1000.0, 5.0, 50.0),
            Debt::loan("high", 1000.0, 15.0, 50.0),
        ];
        assert_eq!(order_debts(&debts, &PaymentStrategy::Snowball), vec![1, 0]);
    }

    #[test]
    fn test_equal_order_is_balance_desc() {
        assert_eq!(order_debts(&debts(), &PaymentStrategy::Equal), vec![0, 4, 1, 2]);
    }

    #[test]
    fn test_custom_order() {
        let strategy = PaymentStrategy::Custom(vec!["car".into(), "store".into()]);
        // Unlisted debts follow in input order; paid debts are skipped
        assert_eq!(order_debts(&debts(), &strategy), vec![4, 2, 0, 1]);
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let debts = vec![
            Debt::loan("a", 500.0, 10.0, 20.0),
            Debt::loan("b", 500.0, 10.0, 20.0),
        ];
        for strategy in PaymentStrategy::standard() {
            assert_eq!(order_debts(&debts, &strategy), vec![0, 1]);
        }
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("Avalanche".parse::<PaymentStrategy>().unwrap(), PaymentStrategy::Avalanche);
        assert_eq!("equal".parse::<PaymentStrategy>().unwrap(), PaymentStrategy::Equal);
        assert!(matches!(
            "minimum".parse::<PaymentStrategy>(),
            Err(PlanError::UnknownStrategy(_))
        ));
        assert_eq!(PaymentStrategy::Snowball.to_string(), "snowball");
    }
}
