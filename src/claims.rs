//! Claim transitions and the values derived from an item's claims.
//!
//! Nothing here is cached on the item: every figure is recomputed from the
//! claim list on each call.

use serde::Serialize;

use crate::error::{StoreError, StoreResult};
use crate::schemas::{Claim, SharedItem, UserId};

/// What a claim request did to an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ClaimChange {
    Unchanged,
    Inserted,
    Updated { previous: u32 },
    Removed { previous: u32 },
    ItemMissing,
}

impl ClaimChange {
    pub fn is_effective(self) -> bool {
        !matches!(self, ClaimChange::Unchanged | ClaimChange::ItemMissing)
    }
}

/// How far an item's claims are from its total quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimStatus {
    Open { remaining: i64 },
    FullyClaimed,
    OverClaimed { excess: i64 },
}

impl ClaimStatus {
    pub fn label(self) -> &'static str {
        match self {
            ClaimStatus::Open { .. } => "open",
            ClaimStatus::FullyClaimed => "fully_claimed",
            ClaimStatus::OverClaimed { .. } => "over_claimed",
        }
    }
}

/// Sets `user`'s claim to exactly `quantity`. Zero removes the claim; an
/// existing claim keeps its position in the list.
pub fn apply_claim(claims: &mut Vec<Claim>, user: &UserId, quantity: u32) -> ClaimChange {
    let existing = claims.iter().position(|claim| &claim.user_id == user);
    match (existing, quantity) {
        (None, 0) => ClaimChange::Unchanged,
        (None, quantity) => {
            claims.push(Claim {
                user_id: user.clone(),
                quantity,
            });
            ClaimChange::Inserted
        }
        (Some(index), 0) => {
            let removed = claims.remove(index);
            ClaimChange::Removed {
                previous: removed.quantity,
            }
        }
        (Some(index), quantity) => {
            let previous = claims[index].quantity;
            if previous == quantity {
                return ClaimChange::Unchanged;
            }
            claims[index].quantity = quantity;
            ClaimChange::Updated { previous }
        }
    }
}

/// Predicts what [`apply_claim`] would do without touching the claims.
pub fn preview_claim(claims: &[Claim], user: &UserId, quantity: u32) -> ClaimChange {
    match (claims.iter().find(|claim| &claim.user_id == user), quantity) {
        (None, 0) => ClaimChange::Unchanged,
        (None, _) => ClaimChange::Inserted,
        (Some(claim), 0) => ClaimChange::Removed {
            previous: claim.quantity,
        },
        (Some(claim), quantity) if claim.quantity == quantity => ClaimChange::Unchanged,
        (Some(claim), _) => ClaimChange::Updated {
            previous: claim.quantity,
        },
    }
}

pub fn claimed_quantity(item: &SharedItem) -> i64 {
    item.claims.iter().map(|claim| i64::from(claim.quantity)).sum()
}

pub fn claim_quantity(item: &SharedItem, user: &UserId) -> u32 {
    item.claims
        .iter()
        .find(|claim| &claim.user_id == user)
        .map_or(0, |claim| claim.quantity)
}

/// Units left to claim. Negative when the item is over-claimed.
pub fn remaining(item: &SharedItem) -> i64 {
    i64::from(item.total_quantity) - claimed_quantity(item)
}

pub fn unit_price(item: &SharedItem) -> StoreResult<f64> {
    if item.total_quantity == 0 {
        return Err(StoreError::ZeroQuantity(item.id.clone()));
    }
    Ok(item.total_price / f64::from(item.total_quantity))
}

pub fn my_cost(item: &SharedItem, user: &UserId) -> StoreResult<f64> {
    Ok(unit_price(item)? * f64::from(claim_quantity(item, user)))
}

pub fn claim_status(item: &SharedItem) -> ClaimStatus {
    let remaining = remaining(item);
    match remaining {
        0 => ClaimStatus::FullyClaimed,
        r if r > 0 => ClaimStatus::Open { remaining: r },
        r => ClaimStatus::OverClaimed { excess: -r },
    }
}
