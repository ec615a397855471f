use serde::Serialize;
use std::collections::HashMap;
use std::mem::swap;

use crate::balance::{debts_for_group, net_balances, Debt};
use crate::schemas::{GroupId, UserId};
use crate::store::StoreState;

// Anything below half a cent is treated as settled
const SETTLED: f64 = 0.005;

#[derive(Clone, Debug)]
struct PersonalBalance {
    id: UserId,
    balance: f64,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
struct UserPair {
    user1: UserId,
    user2: UserId,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Exchange {
    pub payer: UserId,
    pub receiver: UserId,
    pub amount: f64,
}

// The exchanges that will be made if no simplification happens
fn get_naive_exchanges(debts: impl Iterator<Item = Debt>) -> Vec<Exchange> {
    let mut balances_between_people: HashMap<UserPair, f64> = HashMap::new();

    for debt in debts {
        let mut pair = UserPair {
            user1: debt.debtor,
            user2: debt.creditor,
        };
        let mut amount = debt.amount;

        // Store each pair in id order so debts in both directions net out
        if pair.user1 > pair.user2 {
            swap(&mut pair.user1, &mut pair.user2);
            amount = -amount;
        }

        *balances_between_people.entry(pair).or_insert(0.0) += amount;
    }

    let mut exchanges = Vec::new();

    for (people_pair, balance) in balances_between_people {
        if balance.abs() < SETTLED {
            continue;
        }
        let mut payer = people_pair.user1;
        let mut receiver = people_pair.user2;
        if balance < 0.0 {
            swap(&mut payer, &mut receiver);
        }

        exchanges.push(Exchange {
            payer,
            receiver,
            amount: round_to_2_decimals(balance.abs()),
        });
    }

    exchanges.sort_by(|a, b| (&a.payer, &a.receiver).cmp(&(&b.payer, &b.receiver)));
    exchanges
}

// Largest debtor pays largest creditor until everyone is settled
fn get_simplified_exchanges(
    mut payers: Vec<PersonalBalance>,
    mut receivers: Vec<PersonalBalance>,
) -> Vec<Exchange> {
    payers.sort_by(|a, b| a.balance.total_cmp(&b.balance));
    receivers.sort_by(|a, b| a.balance.total_cmp(&b.balance));

    let mut exchanges: Vec<Exchange> = Vec::new();

    while let (Some(payer), Some(receiver)) = (payers.last_mut(), receivers.last_mut()) {
        let amount = payer.balance.min(receiver.balance);
        exchanges.push(Exchange {
            payer: payer.id.clone(),
            receiver: receiver.id.clone(),
            amount: round_to_2_decimals(amount),
        });
        payer.balance = round_to_2_decimals(payer.balance - amount);
        receiver.balance = round_to_2_decimals(receiver.balance - amount);

        if payer.balance < SETTLED {
            payers.pop();
        }
        if receiver.balance < SETTLED {
            receivers.pop();
        }
    }
    exchanges
}

fn round_to_2_decimals(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Who should pay whom to settle every claim in the group.
pub fn exchanges_for_group(state: &StoreState, group_id: &GroupId) -> Vec<Exchange> {
    let people_balances = net_balances(state, group_id);

    let mut payers = Vec::new();
    let mut receivers = Vec::new();

    for (id, balance) in people_balances {
        if balance.abs() < SETTLED {
            continue;
        }
        let person = PersonalBalance {
            id,
            balance: balance.abs(),
        };
        if balance < 0.0 {
            payers.push(person);
        } else {
            receivers.push(person);
        }
    }

    let naive_exchanges = get_naive_exchanges(debts_for_group(state, group_id));
    let simplified_exchanges = get_simplified_exchanges(payers, receivers);

    // The simplification must never end up with more transfers than the
    // naive pairwise plan
    if simplified_exchanges.len() < naive_exchanges.len() {
        simplified_exchanges
    } else {
        naive_exchanges
    }
}
