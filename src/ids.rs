//! Identifier and invite-code generation.

use std::ops::RangeInclusive;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::schemas::{CommentId, GroupId, ItemId, SessionId, UserId};

pub fn new_session_id() -> SessionId {
    SessionId::new(Uuid::new_v4().to_string())
}

/// Invite code lengths the generator accepts.
pub const INVITE_CODE_LENS: RangeInclusive<usize> = 4..=12;

pub fn new_user_id() -> UserId {
    UserId::new(Uuid::new_v4().to_string())
}

pub fn new_group_id() -> GroupId {
    GroupId::new(Uuid::new_v4().to_string())
}

pub fn new_item_id() -> ItemId {
    ItemId::new(Uuid::new_v4().to_string())
}

pub fn new_comment_id() -> CommentId {
    CommentId::new(Uuid::new_v4().to_string())
}

/// Canonical form used both when storing and when looking up a code.
pub fn normalize_invite_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn check_invite_code_len(len: usize) -> StoreResult<()> {
    if INVITE_CODE_LENS.contains(&len) {
        Ok(())
    } else {
        Err(StoreError::InvalidInviteCodeLength(len))
    }
}

fn random_invite_code(len: usize) -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(len)
        .collect::<String>()
        .to_uppercase()
}

/// Draws invite codes until one is not `taken`, giving up after `attempts`.
pub fn unique_invite_code<F>(len: usize, attempts: usize, taken: F) -> StoreResult<String>
where
    F: Fn(&str) -> bool,
{
    check_invite_code_len(len)?;
    for _ in 0..attempts {
        let code = random_invite_code(len);
        if !taken(&code) {
            return Ok(code);
        }
        tracing::debug!(%code, "invite code collision, retrying");
    }
    Err(StoreError::InviteCodeExhausted(attempts))
}
