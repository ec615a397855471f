//! Error types for the domain store.

use thiserror::Error;

use crate::schemas::{GroupId, ItemId, UserId};

/// Rejected store operations. Lookups that miss (unknown item on a claim,
/// unknown invite code) are not errors and never show up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    // Session errors
    #[error("No user is logged in on this session")]
    NoActiveUser,

    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("User {user} is not a member of group {group}")]
    NotAMember { user: UserId, group: GroupId },

    // Lookup errors
    #[error("Unknown group: {0}")]
    UnknownGroup(GroupId),

    // Validation errors
    #[error("Total quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("Total price must be a non-negative amount, got {0}")]
    InvalidPrice(f64),

    #[error("{0} must not be blank")]
    EmptyField(&'static str),

    // Arithmetic errors
    #[error("Item {0} has a total quantity of zero, unit price is undefined")]
    ZeroQuantity(ItemId),

    // Id generation errors
    #[error("Could not find a free invite code after {0} attempts")]
    InviteCodeExhausted(usize),

    #[error("Invite codes must be 4 to 12 characters long, got {0}")]
    InvalidInviteCodeLength(usize),

    #[error("Invite code generation needs at least one attempt")]
    NoInviteCodeAttempts,
}

impl StoreError {
    /// True for errors caused by a malformed request rather than by who sent it
    /// or by the store's own configuration.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidQuantity(_)
                | StoreError::InvalidPrice(_)
                | StoreError::EmptyField(_)
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
