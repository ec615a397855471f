//! Shared bulk-buy settlement.
//!
//! One member of a group posts an item with its total price and quantity,
//! members claim units of it, and each member's share of the price follows
//! from what they claimed. [`Store`] holds users, groups, items and claims;
//! [`claims`] derives remaining quantity and per-member cost; [`balance`] and
//! [`exchange`] turn claims into who-owes-whom.

pub mod api;
pub mod balance;
pub mod claims;
pub mod config;
pub mod error;
pub mod exchange;
pub mod ids;
pub mod schemas;
pub mod session;
pub mod store;

pub use claims::{ClaimChange, ClaimStatus};
pub use error::{StoreError, StoreResult};
pub use schemas::{Claim, Comment, Group, GroupId, ItemId, NewItem, SharedItem, User, UserId};
pub use session::Session;
pub use store::{JoinOutcome, SharedStore, Store, StoreOptions, StoreState};
