//! The canonical in-memory state and the operations that change it.
//!
//! State lives behind an `Arc` snapshot. Every mutation validates against
//! the current snapshot first and only then writes, so a rejected call
//! leaves both the state and [`Store::version`] untouched.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::claims::{apply_claim, preview_claim, ClaimChange};
use crate::error::{StoreError, StoreResult};
use crate::ids::{
    check_invite_code_len, new_comment_id, new_group_id, new_item_id, new_user_id,
    normalize_invite_code, unique_invite_code,
};
use crate::schemas::{
    Comment, CommentId, Group, GroupId, ItemId, NewItem, SessionId, SharedItem, User, UserId,
    DEFAULT_UNIT_NAME,
};
use crate::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    pub invite_code_len: usize,
    pub invite_code_attempts: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            invite_code_len: 6,
            invite_code_attempts: 16,
        }
    }
}

impl StoreOptions {
    pub fn validate(&self) -> StoreResult<()> {
        check_invite_code_len(self.invite_code_len)?;
        if self.invite_code_attempts == 0 {
            return Err(StoreError::NoInviteCodeAttempts);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(GroupId),
    AlreadyMember(GroupId),
    NoMatch,
}

/// One immutable view of everything the store holds.
#[derive(Clone, Debug, Default)]
pub struct StoreState {
    pub users: HashMap<UserId, User>,
    /// Which user each issued session acts as. Never exposed to other users.
    sessions: HashMap<SessionId, UserId>,
    /// Insertion order.
    pub groups: Vec<Group>,
    /// Most recent first.
    pub items: Vec<SharedItem>,
    /// Oldest first.
    pub comments: Vec<Comment>,
}

impl StoreState {
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| &group.id == id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&SharedItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn items_for_group<'a>(
        &'a self,
        group_id: &'a GroupId,
    ) -> impl Iterator<Item = &'a SharedItem> + 'a {
        self.items
            .iter()
            .filter(move |item| &item.group_id == group_id)
    }
}

#[derive(Debug, Default)]
pub struct Store {
    state: Arc<StoreState>,
    version: u64,
    options: StoreOptions,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: StoreOptions) -> StoreResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            ..Self::default()
        })
    }

    /// A cheap handle on the current state. Later mutations do not affect it.
    pub fn snapshot(&self) -> Arc<StoreState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Incremented once for every mutation that changed the state.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn write(&mut self) -> &mut StoreState {
        self.version += 1;
        Arc::make_mut(&mut self.state)
    }

    fn acting_user<'s>(&self, session: &'s Session) -> StoreResult<&'s UserId> {
        let user = session.require_user()?;
        if !self.state.users.contains_key(user) {
            return Err(StoreError::UnknownUser(user.clone()));
        }
        Ok(user)
    }

    // Identity

    /// Logs `name` in on `session`. The first login creates a user with its
    /// own id; logging in again on the same session reactivates that user.
    pub fn login(&mut self, session: &mut Session, name: &str) -> UserId {
        let user_id = self
            .state
            .sessions
            .get(session.id())
            .cloned()
            .unwrap_or_else(new_user_id);
        let user = User {
            id: user_id.clone(),
            name: name.to_string(),
            avatar_url: None,
        };
        let state = self.write();
        state.sessions.insert(session.id().clone(), user_id.clone());
        state.users.insert(user_id.clone(), user);
        session.activate(user_id.clone());
        tracing::info!(user = %user_id, name, "user logged in");
        user_id
    }

    /// Rebuilds a session handle for an id issued earlier. Unknown ids give a
    /// session with no user.
    pub fn resume(&self, session_id: SessionId) -> Session {
        let user = self.state.sessions.get(&session_id).cloned();
        Session::with_user(session_id, user)
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.state.user(id)
    }

    // Groups

    pub fn create_group(&mut self, session: &Session, name: &str) -> StoreResult<GroupId> {
        let creator = self.acting_user(session)?.clone();
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyField("group name"));
        }
        let state = &self.state;
        let invite_code = unique_invite_code(
            self.options.invite_code_len,
            self.options.invite_code_attempts,
            |code| state.groups.iter().any(|group| group.invite_code == code),
        )?;
        let group = Group {
            id: new_group_id(),
            name: name.to_string(),
            invite_code,
            members: vec![creator.clone()],
        };
        let group_id = group.id.clone();
        tracing::info!(group = %group_id, code = %group.invite_code, creator = %creator, "group created");
        self.write().groups.push(group);
        Ok(group_id)
    }

    /// Adds the session user to the group with `invite_code`. Unknown codes
    /// and existing memberships leave the store untouched.
    pub fn join_group(&mut self, session: &Session, invite_code: &str) -> StoreResult<JoinOutcome> {
        let user = self.acting_user(session)?.clone();
        let Some(group) = self.group_by_invite_code(invite_code) else {
            tracing::debug!(code = invite_code, "no group matches invite code");
            return Ok(JoinOutcome::NoMatch);
        };
        let group_id = group.id.clone();
        if group.has_member(&user) {
            tracing::debug!(group = %group_id, user = %user, "already a member");
            return Ok(JoinOutcome::AlreadyMember(group_id));
        }
        if let Some(group) = self
            .write()
            .groups
            .iter_mut()
            .find(|group| group.id == group_id)
        {
            group.members.push(user.clone());
        }
        tracing::info!(group = %group_id, user = %user, "member joined");
        Ok(JoinOutcome::Joined(group_id))
    }

    pub fn groups(&self) -> &[Group] {
        &self.state.groups
    }

    pub fn groups_for<'a>(&'a self, user: &'a UserId) -> impl Iterator<Item = &'a Group> + 'a {
        self.state
            .groups
            .iter()
            .filter(move |group| group.has_member(user))
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.state.group(id)
    }

    pub fn group_by_invite_code(&self, invite_code: &str) -> Option<&Group> {
        let code = normalize_invite_code(invite_code);
        self.state
            .groups
            .iter()
            .find(|group| group.invite_code == code)
    }

    // Items

    fn build_item(&self, draft: NewItem) -> StoreResult<SharedItem> {
        let group = self
            .state
            .group(&draft.group_id)
            .ok_or_else(|| StoreError::UnknownGroup(draft.group_id.clone()))?;
        if !self.state.users.contains_key(&draft.created_by) {
            return Err(StoreError::UnknownUser(draft.created_by));
        }
        if !group.has_member(&draft.created_by) {
            return Err(StoreError::NotAMember {
                user: draft.created_by,
                group: draft.group_id,
            });
        }
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyField("item name"));
        }
        let total_quantity = u32::try_from(draft.total_quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or(StoreError::InvalidQuantity(draft.total_quantity))?;
        if !draft.total_price.is_finite() || draft.total_price < 0.0 {
            return Err(StoreError::InvalidPrice(draft.total_price));
        }
        let unit_name = match draft.unit_name.trim() {
            "" => DEFAULT_UNIT_NAME.to_string(),
            unit => unit.to_string(),
        };

        Ok(SharedItem {
            id: new_item_id(),
            group_id: draft.group_id,
            created_by: draft.created_by,
            name: name.to_string(),
            total_quantity,
            unit_name,
            total_price: draft.total_price,
            photo_url: draft.photo_url,
            notes: draft.notes,
            source: draft.source,
            expires_on: draft.expires_on,
            claims: vec![],
            created_at: Utc::now(),
        })
    }

    /// Posts a new item at the head of the item list.
    pub fn add_item(&mut self, draft: NewItem) -> StoreResult<ItemId> {
        let item = self.build_item(draft).inspect_err(|err| {
            tracing::warn!(%err, "item rejected");
        })?;
        let item_id = item.id.clone();
        tracing::info!(
            item = %item_id,
            group = %item.group_id,
            quantity = item.total_quantity,
            price = item.total_price,
            "item posted"
        );
        self.write().items.insert(0, item);
        Ok(item_id)
    }

    /// Posts a batch of drafts. Every draft is validated before any is
    /// posted; one bad draft rejects the whole batch.
    pub fn add_items(&mut self, drafts: Vec<NewItem>) -> StoreResult<Vec<ItemId>> {
        let items = drafts
            .into_iter()
            .map(|draft| self.build_item(draft))
            .collect::<StoreResult<Vec<_>>>()
            .inspect_err(|err| tracing::warn!(%err, "batch rejected"))?;
        if items.is_empty() {
            return Ok(vec![]);
        }
        let ids = items.iter().map(|item| item.id.clone()).collect();
        tracing::info!(count = items.len(), "item batch posted");
        let state = self.write();
        for item in items {
            state.items.insert(0, item);
        }
        Ok(ids)
    }

    pub fn item(&self, id: &ItemId) -> Option<&SharedItem> {
        self.state.item(id)
    }

    pub fn items_for_group<'a>(
        &'a self,
        group_id: &'a GroupId,
    ) -> impl Iterator<Item = &'a SharedItem> + 'a {
        self.state.items_for_group(group_id)
    }

    // Claims

    /// Sets `user`'s claim on `item_id` to exactly `quantity`. Claims are not
    /// checked against what is left; an over-claimed item simply shows a
    /// negative remainder.
    pub fn toggle_claim(&mut self, item_id: &ItemId, user: &UserId, quantity: u32) -> ClaimChange {
        let Some(index) = self.state.items.iter().position(|item| &item.id == item_id) else {
            tracing::debug!(item = %item_id, "claim on unknown item ignored");
            return ClaimChange::ItemMissing;
        };
        let predicted = preview_claim(&self.state.items[index].claims, user, quantity);
        if !predicted.is_effective() {
            tracing::debug!(item = %item_id, user = %user, quantity, "claim unchanged");
            return predicted;
        }
        let change = apply_claim(&mut self.write().items[index].claims, user, quantity);
        tracing::debug!(item = %item_id, user = %user, quantity, ?change, "claim set");
        change
    }

    // Comments

    /// Appends a comment by the session user. Returns `None` when the item
    /// does not exist.
    pub fn add_comment(
        &mut self,
        session: &Session,
        item_id: &ItemId,
        text: &str,
    ) -> StoreResult<Option<CommentId>> {
        let user = self.acting_user(session)?.clone();
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyField("comment"));
        }
        if self.state.item(item_id).is_none() {
            tracing::debug!(item = %item_id, "comment on unknown item ignored");
            return Ok(None);
        }
        let comment = Comment {
            id: new_comment_id(),
            item_id: item_id.clone(),
            user_id: user,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        let comment_id = comment.id.clone();
        self.write().comments.push(comment);
        Ok(Some(comment_id))
    }

    pub fn comments_for<'a>(&'a self, item_id: &'a ItemId) -> impl Iterator<Item = &'a Comment> + 'a {
        self.state
            .comments
            .iter()
            .filter(move |comment| &comment.item_id == item_id)
    }
}

/// A store shared between threads. Writers are serialised by the lock, so
/// every read-modify-write sees the result of the previous one.
#[derive(Clone, Debug, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn read<T>(&self, f: impl FnOnce(&Store) -> T) -> T {
        f(&self.inner.read())
    }

    pub fn write<T>(&self, f: impl FnOnce(&mut Store) -> T) -> T {
        f(&mut self.inner.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{my_cost, remaining};
    use chrono::NaiveDate;

    fn logged_in(store: &mut Store, name: &str) -> (Session, UserId) {
        let mut session = Session::new();
        let user = store.login(&mut session, name);
        (session, user)
    }

    fn group_with_member(store: &mut Store) -> (Session, UserId, GroupId) {
        let (session, user) = logged_in(store, "Ana");
        let group = store.create_group(&session, "Roommates").unwrap();
        (session, user, group)
    }

    #[test]
    fn login_binds_user_to_session() {
        let mut store = Store::new();
        let mut session = Session::new();
        let user = store.login(&mut session, "Ana");
        assert_eq!(session.user(), Some(&user));
        assert_ne!(user.as_str(), session.id().as_str());
        assert_eq!(store.user(&user).unwrap().name, "Ana");

        let again = store.login(&mut session, "Ana B.");
        assert_eq!(again, user);
        assert_eq!(store.state().users.len(), 1);
        assert_eq!(store.user(&user).unwrap().name, "Ana B.");
    }

    #[test]
    fn resume_restores_known_sessions_only() {
        let mut store = Store::new();
        let (session, user) = logged_in(&mut store, "Ana");
        assert_eq!(store.resume(session.id().clone()).user(), Some(&user));
        assert_eq!(store.resume(Session::new().id().clone()).user(), None);
    }

    #[test]
    fn user_id_does_not_work_as_a_session_id() {
        let mut store = Store::new();
        let (_, user) = logged_in(&mut store, "Ana");
        let forged = store.resume(SessionId::new(user.as_str()));
        assert_eq!(forged.user(), None);
        assert_eq!(
            store.create_group(&forged, "Not Ana's"),
            Err(StoreError::NoActiveUser)
        );
    }

    #[test]
    fn options_are_validated() {
        for invite_code_len in [0, 3, 13, 33] {
            let options = StoreOptions {
                invite_code_len,
                ..StoreOptions::default()
            };
            assert_eq!(
                Store::with_options(options).unwrap_err(),
                StoreError::InvalidInviteCodeLength(invite_code_len)
            );
        }
        let options = StoreOptions {
            invite_code_attempts: 0,
            ..StoreOptions::default()
        };
        assert_eq!(
            Store::with_options(options).unwrap_err(),
            StoreError::NoInviteCodeAttempts
        );
        assert!(Store::with_options(StoreOptions::default()).is_ok());
    }

    #[test]
    fn create_group_requires_a_user() {
        let mut store = Store::new();
        let err = store.create_group(&Session::new(), "Roommates").unwrap_err();
        assert_eq!(err, StoreError::NoActiveUser);
        assert!(store.groups().is_empty());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn session_from_another_store_is_rejected() {
        let mut other = Store::new();
        let (session, user) = logged_in(&mut other, "Ana");
        let mut store = Store::new();
        assert_eq!(
            store.create_group(&session, "Roommates"),
            Err(StoreError::UnknownUser(user))
        );
    }

    #[test]
    fn creator_is_the_first_member() {
        let mut store = Store::new();
        let (_, user, group) = group_with_member(&mut store);
        let group = store.group(&group).unwrap();
        assert_eq!(group.members, vec![user]);
        assert_eq!(group.invite_code.len(), 6);
        assert_eq!(group.invite_code, group.invite_code.to_uppercase());
    }

    #[test]
    fn blank_group_name_is_rejected() {
        let mut store = Store::new();
        let (session, _) = logged_in(&mut store, "Ana");
        assert_eq!(
            store.create_group(&session, "   "),
            Err(StoreError::EmptyField("group name"))
        );
    }

    #[test]
    fn invite_codes_are_unique() {
        let mut store = Store::with_options(StoreOptions {
            invite_code_len: 4,
            invite_code_attempts: 64,
        })
        .unwrap();
        let (session, _) = logged_in(&mut store, "Ana");
        for n in 0..16 {
            store.create_group(&session, &format!("group {n}")).unwrap();
        }
        let mut codes: Vec<_> = store.groups().iter().map(|g| g.invite_code.clone()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 16);
        assert!(codes.iter().all(|code| code.len() == 4));
    }

    #[test]
    fn join_is_idempotent_and_case_insensitive() {
        let mut store = Store::new();
        let (_, owner, group) = group_with_member(&mut store);
        let code = store.group(&group).unwrap().invite_code.clone();
        let (session, bob) = logged_in(&mut store, "Bob");

        let typed = format!("  {} ", code.to_lowercase());
        assert_eq!(
            store.join_group(&session, &typed),
            Ok(JoinOutcome::Joined(group.clone()))
        );
        let version = store.version();
        assert_eq!(
            store.join_group(&session, &code),
            Ok(JoinOutcome::AlreadyMember(group.clone()))
        );
        assert_eq!(store.version(), version);
        assert_eq!(store.group(&group).unwrap().members, vec![owner, bob]);
    }

    #[test]
    fn unknown_invite_code_is_a_no_op() {
        let mut store = Store::new();
        let (session, _, _) = group_with_member(&mut store);
        let version = store.version();
        assert_eq!(store.join_group(&session, "NOPE"), Ok(JoinOutcome::NoMatch));
        assert_eq!(store.version(), version);
        assert_eq!(
            store.join_group(&Session::new(), "NOPE"),
            Err(StoreError::NoActiveUser)
        );
    }

    #[test]
    fn groups_for_lists_memberships_only() {
        let mut store = Store::new();
        let (_, ana, ana_group) = group_with_member(&mut store);
        let (bob_session, bob) = logged_in(&mut store, "Bob");
        store.create_group(&bob_session, "Bob's").unwrap();

        let ana_groups: Vec<_> = store.groups_for(&ana).map(|g| g.id.clone()).collect();
        assert_eq!(ana_groups, vec![ana_group]);
        assert_eq!(store.groups_for(&bob).count(), 1);
        assert_eq!(store.groups().len(), 2);
    }

    #[test]
    fn items_are_listed_most_recent_first() {
        let mut store = Store::new();
        let (_, user, group) = group_with_member(&mut store);
        let first = store
            .add_item(NewItem::new(group.clone(), user.clone(), "Rice", 20.0, 10))
            .unwrap();
        let second = store
            .add_item(NewItem::new(group.clone(), user.clone(), "Beans", 12.0, 6))
            .unwrap();
        let listed: Vec<_> = store.items_for_group(&group).map(|i| i.id.clone()).collect();
        assert_eq!(listed, vec![second, first]);

        let item = store.items_for_group(&group).next().unwrap();
        assert_eq!(item.unit_name, "unit");
        assert!(item.claims.is_empty());
    }

    #[test]
    fn zero_quantity_item_is_rejected() {
        let mut store = Store::new();
        let (_, user, group) = group_with_member(&mut store);
        let version = store.version();
        assert_eq!(
            store.add_item(NewItem::new(group.clone(), user.clone(), "Rice", 20.0, 0)),
            Err(StoreError::InvalidQuantity(0))
        );
        assert_eq!(
            store.add_item(NewItem::new(group.clone(), user.clone(), "Rice", 20.0, -3)),
            Err(StoreError::InvalidQuantity(-3))
        );
        assert_eq!(
            store.add_item(NewItem::new(group.clone(), user.clone(), "Rice", -1.0, 3)),
            Err(StoreError::InvalidPrice(-1.0))
        );
        assert!(store
            .add_item(NewItem::new(group.clone(), user, "Rice", f64::NAN, 3))
            .is_err());
        assert_eq!(store.items_for_group(&group).count(), 0);
        assert_eq!(store.version(), version);
    }

    #[test]
    fn free_items_are_allowed() {
        let mut store = Store::new();
        let (_, user, group) = group_with_member(&mut store);
        assert!(store
            .add_item(NewItem::new(group, user, "Hand-me-down jars", 0.0, 4))
            .is_ok());
    }

    #[test]
    fn items_need_a_known_group_and_member() {
        let mut store = Store::new();
        let (_, ana, group) = group_with_member(&mut store);
        let (_, bob) = logged_in(&mut store, "Bob");
        let missing = GroupId::new("missing");

        assert_eq!(
            store.add_item(NewItem::new(missing.clone(), ana, "Rice", 1.0, 1)),
            Err(StoreError::UnknownGroup(missing))
        );
        assert_eq!(
            store.add_item(NewItem::new(group.clone(), bob.clone(), "Rice", 1.0, 1)),
            Err(StoreError::NotAMember { user: bob, group })
        );
    }

    #[test]
    fn optional_fields_are_kept() {
        let mut store = Store::new();
        let (_, user, group) = group_with_member(&mut store);
        let expiry = NaiveDate::from_ymd_opt(2026, 11, 30).unwrap();
        let id = store
            .add_item(
                NewItem::new(group, user, "Eggs", 9.5, 36)
                    .with_unit_name("egg")
                    .with_source("Costco")
                    .with_notes("two flats")
                    .with_expiry(expiry),
            )
            .unwrap();
        let item = store.item(&id).unwrap();
        assert_eq!(item.unit_name, "egg");
        assert_eq!(item.source.as_deref(), Some("Costco"));
        assert_eq!(item.notes.as_deref(), Some("two flats"));
        assert_eq!(item.expires_on, Some(expiry));
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let mut store = Store::new();
        let (_, user, group) = group_with_member(&mut store);
        let bad = vec![
            NewItem::new(group.clone(), user.clone(), "Rice", 20.0, 10),
            NewItem::new(group.clone(), user.clone(), "Broken", 20.0, 0),
        ];
        assert!(store.add_items(bad).is_err());
        assert_eq!(store.items_for_group(&group).count(), 0);

        let good = vec![
            NewItem::new(group.clone(), user.clone(), "Rice", 20.0, 10),
            NewItem::new(group.clone(), user.clone(), "Beans", 12.0, 6),
        ];
        let ids = store.add_items(good).unwrap();
        let listed: Vec<_> = store.items_for_group(&group).map(|i| i.id.clone()).collect();
        assert_eq!(listed, vec![ids[1].clone(), ids[0].clone()]);
    }

    #[test]
    fn claims_follow_the_scenario() {
        let mut store = Store::new();
        let (_, ana, group) = group_with_member(&mut store);
        let (_, bob) = logged_in(&mut store, "Bob");
        let item = store
            .add_item(NewItem::new(group, ana.clone(), "Toilet paper", 24.99, 30))
            .unwrap();

        assert_eq!(store.toggle_claim(&item, &ana, 10), ClaimChange::Inserted);
        assert_eq!(remaining(store.item(&item).unwrap()), 20);
        assert!((my_cost(store.item(&item).unwrap(), &ana).unwrap() - 8.33).abs() < 1e-9);

        assert_eq!(store.toggle_claim(&item, &bob, 25), ClaimChange::Inserted);
        assert_eq!(remaining(store.item(&item).unwrap()), -5);
    }

    #[test]
    fn repeated_claim_leaves_state_and_version_alone() {
        let mut store = Store::new();
        let (_, ana, group) = group_with_member(&mut store);
        let item = store
            .add_item(NewItem::new(group, ana.clone(), "Rice", 20.0, 10))
            .unwrap();
        store.toggle_claim(&item, &ana, 4);
        let before = store.item(&item).unwrap().clone();
        let version = store.version();

        assert_eq!(store.toggle_claim(&item, &ana, 4), ClaimChange::Unchanged);
        assert_eq!(store.item(&item).unwrap(), &before);
        assert_eq!(store.version(), version);
    }

    #[test]
    fn zero_claim_always_clears() {
        let mut store = Store::new();
        let (_, ana, group) = group_with_member(&mut store);
        let item = store
            .add_item(NewItem::new(group, ana.clone(), "Rice", 20.0, 10))
            .unwrap();
        for prior in [0, 3] {
            store.toggle_claim(&item, &ana, prior);
            store.toggle_claim(&item, &ana, 0);
            assert!(store.item(&item).unwrap().claims.is_empty());
        }
    }

    #[test]
    fn claim_on_missing_item_changes_nothing() {
        let mut store = Store::new();
        let (_, ana, _) = group_with_member(&mut store);
        let version = store.version();
        assert_eq!(
            store.toggle_claim(&ItemId::new("ghost"), &ana, 3),
            ClaimChange::ItemMissing
        );
        assert_eq!(store.version(), version);
    }

    #[test]
    fn snapshots_are_not_affected_by_later_writes() {
        let mut store = Store::new();
        let (_, ana, group) = group_with_member(&mut store);
        let item = store
            .add_item(NewItem::new(group, ana.clone(), "Rice", 20.0, 10))
            .unwrap();
        let before = store.snapshot();
        store.toggle_claim(&item, &ana, 5);
        assert!(before.item(&item).unwrap().claims.is_empty());
        assert_eq!(store.item(&item).unwrap().claims.len(), 1);
    }

    #[test]
    fn comments_are_listed_oldest_first() {
        let mut store = Store::new();
        let (session, ana, group) = group_with_member(&mut store);
        let item = store
            .add_item(NewItem::new(group, ana, "Rice", 20.0, 10))
            .unwrap();
        store.add_comment(&session, &item, "Who wants some?").unwrap();
        store.add_comment(&session, &item, "Picked up today").unwrap();
        let texts: Vec<_> = store.comments_for(&item).map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Who wants some?", "Picked up today"]);

        assert_eq!(
            store.add_comment(&session, &ItemId::new("ghost"), "hello"),
            Ok(None)
        );
        assert_eq!(
            store.add_comment(&session, &item, "  "),
            Err(StoreError::EmptyField("comment"))
        );
    }

    #[test]
    fn shared_store_serialises_concurrent_claims() {
        let shared = SharedStore::new(Store::new());
        let (ana, item) = shared.write(|store| {
            let (_, ana, group) = group_with_member(store);
            let item = store
                .add_item(NewItem::new(group, ana.clone(), "Rice", 20.0, 100))
                .unwrap();
            (ana, item)
        });

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let shared = shared.clone();
                let item = item.clone();
                std::thread::spawn(move || {
                    let user = UserId::new(format!("user-{n}"));
                    shared.write(|store| store.toggle_claim(&item, &user, 1));
                    shared.write(|store| store.toggle_claim(&item, &user, 2));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        shared.read(|store| {
            let item = store.item(&item).unwrap();
            assert_eq!(item.claims.len(), 8);
            assert_eq!(remaining(item), 100 - 16);
            assert!(!item.claims.iter().any(|claim| claim.user_id == ana));
        });
    }
}
