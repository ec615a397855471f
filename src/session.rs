use crate::error::{StoreError, StoreResult};
use crate::ids::new_session_id;
use crate::schemas::{SessionId, UserId};

/// The acting user's context, passed explicitly to every operation that
/// needs one. A fresh session has no user until [`crate::Store::login`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    user: Option<UserId>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: new_session_id(),
            user: None,
        }
    }

    pub(crate) fn with_user(id: SessionId, user: Option<UserId>) -> Self {
        Self { id, user }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> StoreResult<&UserId> {
        self.user.as_ref().ok_or(StoreError::NoActiveUser)
    }

    pub(crate) fn activate(&mut self, user: UserId) {
        self.user = Some(user);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
