//! Spend planning over the two partners' balances.
//!
//! Spendable points and lifetime points are separate counters. Spending only
//! ever draws down spendable points; the lifetime total that drives the level
//! is left alone.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A partner's counters as read from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerBalance {
    pub partner_id: String,
    pub points: i64,
    pub lifetime_points: i64,
}

/// Points to take from one partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deduction {
    pub partner_id: String,
    pub amount: i64,
}

/// Sum of lifetime points across partners, saturating at `i64::MAX`.
pub fn total_lifetime(balances: &[PartnerBalance]) -> i64 {
    balances
        .iter()
        .fold(0i64, |total, b| total.saturating_add(b.lifetime_points))
}

/// Sum of spendable points across partners, ignoring negative balances.
///
/// Saturates at `i64::MAX`.
pub fn total_spendable(balances: &[PartnerBalance]) -> i64 {
    balances
        .iter()
        .fold(0i64, |total, b| total.saturating_add(b.points.max(0)))
}

/// Split `cost` across partners, richest first.
///
/// Partners with equal balances pay in input order. A zero cost yields no
/// deductions.
pub fn plan_spend(balances: &[PartnerBalance], cost: i64) -> Result<Vec<Deduction>, LedgerError> {
    if cost < 0 {
        return Err(LedgerError::InvalidCost(cost));
    }

    let available = total_spendable(balances);
    if available < cost {
        return Err(LedgerError::InsufficientPoints {
            required: cost,
            available,
        });
    }

    let mut order: Vec<&PartnerBalance> = balances.iter().collect();
    order.sort_by(|a, b| b.points.cmp(&a.points));

    let mut remaining = cost;
    let mut deductions = Vec::new();
    for balance in order {
        if remaining == 0 {
            break;
        }
        let amount = balance.points.max(0).min(remaining);
        if amount > 0 {
            deductions.push(Deduction {
                partner_id: balance.partner_id.clone(),
                amount,
            });
            remaining -= amount;
        }
    }

    Ok(deductions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(id: &str, points: i64, lifetime: i64) -> PartnerBalance {
        PartnerBalance {
            partner_id: id.to_string(),
            points,
            lifetime_points: lifetime,
        }
    }

    #[test]
    fn test_richer_partner_pays_first() {
        let balances = vec![balance("b", 50, 500), balance("a", 80, 300)];
        let plan = plan_spend(&balances, 100).unwrap();

        assert_eq!(
            plan,
            vec![
                Deduction { partner_id: "a".into(), amount: 80 },
                Deduction { partner_id: "b".into(), amount: 20 },
            ]
        );
    }

    #[test]
    fn test_single_partner_covers_cost() {
        let balances = vec![balance("a", 80, 0), balance("b", 50, 0)];
        let plan = plan_spend(&balances, 30).unwrap();
        assert_eq!(plan, vec![Deduction { partner_id: "a".into(), amount: 30 }]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let balances = vec![balance("first", 40, 0), balance("second", 40, 0)];
        let plan = plan_spend(&balances, 50).unwrap();
        assert_eq!(plan[0].partner_id, "first");
        assert_eq!(plan[0].amount, 40);
        assert_eq!(plan[1].amount, 10);
    }

    #[test]
    fn test_insufficient_points() {
        let balances = vec![balance("a", 10, 0), balance("b", 20, 0)];
        let err = plan_spend(&balances, 31).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientPoints {
                required: 31,
                available: 30
            }
        );
    }

    #[test]
    fn test_negative_balance_is_not_spendable() {
        let balances = vec![balance("a", -40, 0), balance("b", 30, 0)];
        assert!(plan_spend(&balances, 30).is_ok());
        assert!(plan_spend(&balances, 31).is_err());
    }

    #[test]
    fn test_zero_and_negative_cost() {
        let balances = vec![balance("a", 0, 0)];
        assert!(plan_spend(&balances, 0).unwrap().is_empty());
        assert_eq!(
            plan_spend(&balances, -5).unwrap_err(),
            LedgerError::InvalidCost(-5)
        );
    }

    #[test]
    fn test_total_lifetime() {
        let balances = vec![balance("a", 0, 120), balance("b", 10, 130)];
        assert_eq!(total_lifetime(&balances), 250);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let balances = vec![balance("a", i64::MAX, i64::MAX), balance("b", 1, 1)];
        assert_eq!(total_lifetime(&balances), i64::MAX);
        assert_eq!(total_spendable(&balances), i64::MAX);

        let plan = plan_spend(&balances, 10).unwrap();
        assert_eq!(plan, vec![Deduction { partner_id: "a".into(), amount: 10 }]);
    }
}
