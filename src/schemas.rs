use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifies a user. Safe to show to other members; it is never accepted
    /// in place of a session id.
    UserId
);
string_id!(GroupId);
string_id!(ItemId);
string_id!(CommentId);
string_id!(
    /// Opaque handle a front end keeps between calls.
    SessionId
);

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub invite_code: String,
    pub members: Vec<UserId>,
}

impl Group {
    pub fn has_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }
}

/// A single user's stake in an item. Never stored with a zero quantity.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Claim {
    pub user_id: UserId,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SharedItem {
    pub id: ItemId,
    pub group_id: GroupId,
    pub created_by: UserId,
    pub name: String,
    pub total_quantity: u32,
    pub unit_name: String,
    pub total_price: f64,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub expires_on: Option<NaiveDate>,
    pub claims: Vec<Claim>,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_UNIT_NAME: &str = "unit";

fn default_unit_name() -> String {
    DEFAULT_UNIT_NAME.to_string()
}

/// The caller-supplied part of a [`SharedItem`]. The store fills in the id,
/// the creation time and an empty claim list.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NewItem {
    pub group_id: GroupId,
    pub created_by: UserId,
    pub name: String,
    pub total_price: f64,
    // Signed so that a zero or negative draft reaches validation instead of
    // failing to deserialize.
    pub total_quantity: i64,
    #[serde(default = "default_unit_name")]
    pub unit_name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

impl NewItem {
    pub fn new(
        group_id: GroupId,
        created_by: UserId,
        name: impl Into<String>,
        total_price: f64,
        total_quantity: i64,
    ) -> Self {
        Self {
            group_id,
            created_by,
            name: name.into(),
            total_price,
            total_quantity,
            unit_name: default_unit_name(),
            photo_url: None,
            notes: None,
            source: None,
            expires_on: None,
        }
    }

    pub fn with_unit_name(mut self, unit_name: impl Into<String>) -> Self {
        self.unit_name = unit_name.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_expiry(mut self, expires_on: NaiveDate) -> Self {
        self.expires_on = Some(expires_on);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
