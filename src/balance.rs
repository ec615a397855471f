use serde::Serialize;
use std::collections::BTreeMap;

use crate::claims::unit_price;
use crate::schemas::{GroupId, SharedItem, UserId};
use crate::store::StoreState;

type Balance = BTreeMap<UserId, f64>;

/// A debt created by one claim: the claimant owes the item's poster.
#[derive(Clone, Debug, PartialEq)]
pub struct Debt {
    pub debtor: UserId,
    pub creditor: UserId,
    pub amount: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BalanceSummary {
    pub you_owe: Balance,
    pub owed_to_you: Balance,
}

impl BalanceSummary {
    pub fn is_empty(&self) -> bool {
        self.you_owe.is_empty() && self.owed_to_you.is_empty()
    }
}

// A poster keeping part of their own item owes nobody for it
fn debts_from_item(item: &SharedItem) -> impl Iterator<Item = Debt> + '_ {
    let unit_price = unit_price(item).unwrap_or(0.0);
    item.claims
        .iter()
        .filter(move |claim| claim.user_id != item.created_by)
        .map(move |claim| Debt {
            debtor: claim.user_id.clone(),
            creditor: item.created_by.clone(),
            amount: unit_price * f64::from(claim.quantity),
        })
}

pub fn debts_for_group<'a>(
    state: &'a StoreState,
    group_id: &'a GroupId,
) -> impl Iterator<Item = Debt> + 'a {
    state
        .items_for_group(group_id)
        .flat_map(|item| debts_from_item(item))
}

/// What `user` owes and is owed across every item in the group.
pub fn summary_for(state: &StoreState, group_id: &GroupId, user: &UserId) -> BalanceSummary {
    let mut summary = BalanceSummary::default();
    for debt in debts_for_group(state, group_id) {
        if &debt.creditor == user {
            *summary.owed_to_you.entry(debt.debtor).or_insert(0.0) += debt.amount;
        } else if &debt.debtor == user {
            *summary.you_owe.entry(debt.creditor).or_insert(0.0) += debt.amount;
        }
    }
    summary
}

/// Positive balances are owed money, negative ones owe money.
pub fn net_balances(state: &StoreState, group_id: &GroupId) -> Balance {
    let mut balance = Balance::new();
    for debt in debts_for_group(state, group_id) {
        balance
            .entry(debt.creditor)
            .and_modify(|v| *v += debt.amount)
            .or_insert(debt.amount);
        balance
            .entry(debt.debtor)
            .and_modify(|v| *v -= debt.amount)
            .or_insert(-debt.amount);
    }
    balance
}
