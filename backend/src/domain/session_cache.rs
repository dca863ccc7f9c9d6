//! Session cache: who is using the app right now, plus the account roster.
//!
//! A [`SessionCache`] is an explicit handle shared by every screen of one
//! session. Clones share the same state; independent sessions (one per test,
//! for example) simply create their own cache.
//!
//! ## Invariant
//!
//! Whenever a current member is set, the roster entry with the same
//! `user_name` carries the same values (the decoded profile image aside).
//! Every mutator that touches the current member also re-syncs that entry.
//!
//! No mutation fails. Mutators addressing an absent current member or an
//! unknown name are no-ops logged with `warn!`.

use log::{debug, warn};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::errors::SyncError;
use super::models::{Member, MemberPatch, ProfileImage};

/// Plain-data content of a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub account_id: Option<String>,
    pub members: Vec<Member>,
    pub current_member: Option<Member>,
}

impl SessionState {
    fn roster_entry_mut(&mut self, user_name: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.user_name == user_name)
    }

    /// Copy the current member over its roster entry, keeping the entry's own
    /// decoded image when the current copy has none
    fn resync_roster_entry(&mut self, previous_name: &str) {
        let Some(current) = self.current_member.clone() else {
            return;
        };
        match self.roster_entry_mut(previous_name) {
            Some(entry) => {
                let image = entry.profile_image.take();
                *entry = current;
                if entry.profile_image.is_none() {
                    entry.profile_image = image;
                }
            }
            None => debug!("Current member '{}' has no roster entry to re-sync", previous_name),
        }
    }

    fn update_current<F>(&mut self, operation: &str, mutate: F)
    where
        F: FnOnce(&mut Member),
    {
        let Some(current) = self.current_member.as_mut() else {
            warn!("{} ignored: no current member", operation);
            return;
        };
        let previous_name = current.user_name.clone();
        mutate(current);
        self.resync_roster_entry(&previous_name);
    }
}

#[derive(Clone, Default)]
pub struct SessionCache {
    state: Arc<Mutex<SessionState>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_account_id(&self, account_id: impl Into<String>) {
        self.lock().account_id = Some(account_id.into());
    }

    pub fn account_id(&self) -> Option<String> {
        self.lock().account_id.clone()
    }

    /// Replace the roster wholesale, as after a fresh fetch
    pub fn set_members(&self, members: Vec<Member>) {
        self.lock().members = members;
    }

    pub fn add_member(&self, member: Member) {
        self.lock().members.push(member);
    }

    pub fn members(&self) -> Vec<Member> {
        self.lock().members.clone()
    }

    pub fn member(&self, user_name: &str) -> Option<Member> {
        self.lock()
            .members
            .iter()
            .find(|m| m.user_name == user_name)
            .cloned()
    }

    /// Set the current member. The roster is left as is; callers keep the
    /// invariant by selecting a member taken from the roster.
    pub fn select_current_member(&self, member: Member) {
        self.lock().current_member = Some(member);
    }

    pub fn clear_current_member(&self) {
        self.lock().current_member = None;
    }

    pub fn current_member(&self) -> Option<Member> {
        self.lock().current_member.clone()
    }

    /// Signed-in account id, for operations that need one
    pub(crate) fn require_account_id(&self) -> Result<String, SyncError> {
        self.account_id().ok_or(SyncError::NotSignedIn)
    }

    /// Current member, for operations that act on it
    pub(crate) fn require_current_member(&self) -> Result<Member, SyncError> {
        self.current_member().ok_or(SyncError::NoActiveMember)
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn update_current_point(&self, current_point: u32) {
        self.lock()
            .update_current("update_current_point", |m| m.current_point = current_point);
    }

    pub fn update_bonus_point(&self, bonus_point: u32) {
        self.lock()
            .update_current("update_bonus_point", |m| m.bonus_point = bonus_point);
    }

    pub fn update_profile_image(&self, image: ProfileImage) {
        let mut state = self.lock();
        let Some(current) = state.current_member.as_mut() else {
            warn!("update_profile_image ignored: no current member");
            return;
        };
        current.profile_image = Some(image.clone());
        let user_name = current.user_name.clone();
        if let Some(entry) = state.roster_entry_mut(&user_name) {
            entry.profile_image = Some(image);
        }
    }

    /// Set the decoded image of one roster entry, independent of the current member
    pub fn update_profile_image_for(&self, user_name: &str, image: ProfileImage) {
        match self.lock().roster_entry_mut(user_name) {
            Some(entry) => entry.profile_image = Some(image),
            None => warn!("update_profile_image_for ignored: no member '{}'", user_name),
        }
    }

    /// Replace the marked days of the named member in the roster and, when
    /// the names match, in the current member
    pub fn update_selected_dates(&self, user_name: &str, selected_dates: BTreeSet<i64>) {
        let mut state = self.lock();
        if let Some(current) = state.current_member.as_mut() {
            if current.user_name == user_name {
                current.selected_dates = selected_dates.clone();
            }
        }
        match state.roster_entry_mut(user_name) {
            Some(entry) => entry.selected_dates = selected_dates,
            None => warn!("update_selected_dates: no roster entry for '{}'", user_name),
        }
    }

    /// Merge the present fields of `patch` into the current member, then
    /// re-sync the roster entry that carried the current member's name
    pub fn update_current_member(&self, patch: &MemberPatch) {
        if patch.is_empty() {
            return;
        }
        self.lock()
            .update_current("update_current_member", |m| m.apply(patch));
    }

    /// Merge `patch` into the named roster entry, and into the current member
    /// when it has the same name
    pub fn update_member(&self, user_name: &str, patch: &MemberPatch) {
        if patch.is_empty() {
            return;
        }
        let mut state = self.lock();
        if let Some(current) = state.current_member.as_mut() {
            if current.user_name == user_name {
                current.apply(patch);
            }
        }
        match state.roster_entry_mut(user_name) {
            Some(entry) => entry.apply(patch),
            None => warn!("update_member: no roster entry for '{}'", user_name),
        }
    }

    /// Drop the named member from the roster, clearing the current member
    /// when it is the same one
    pub fn remove_member(&self, user_name: &str) {
        let mut state = self.lock();
        state.members.retain(|m| m.user_name != user_name);
        if state
            .current_member
            .as_ref()
            .is_some_and(|m| m.user_name == user_name)
        {
            state.current_member = None;
        }
    }

    /// Reset everything, as on logout
    pub fn clear(&self) {
        *self.lock() = SessionState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Pin;

    fn member(name: &str, current_point: u32, challenge_point: u32) -> Member {
        let mut member = Member::new(name);
        member.current_point = current_point;
        member.challenge_point = challenge_point;
        member
    }

    fn cache_with_current(name: &str) -> SessionCache {
        let cache = SessionCache::new();
        cache.set_account_id("acc");
        cache.set_members(vec![member("Aki", 10, 5), member("Mio", 0, 1)]);
        let current = cache.member(name).unwrap();
        cache.select_current_member(current);
        cache
    }

    #[test]
    fn test_update_current_member_dual_writes_roster() {
        let cache = cache_with_current("Aki");

        cache.update_current_member(&MemberPatch::current_point(15));

        let current = cache.current_member().unwrap();
        let entry = cache.member("Aki").unwrap();
        assert_eq!(current.current_point, 15);
        assert_eq!(entry.current_point, 15);
        assert_eq!(current.challenge_point, 5);
        assert_eq!(entry.challenge_point, 5);
        assert_eq!(cache.member("Mio").unwrap().current_point, 0);
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let cache = cache_with_current("Aki");
        let before = cache.snapshot();

        cache.update_current_member(&MemberPatch::default());

        assert_eq!(cache.snapshot(), before);
    }

    #[test]
    fn test_patch_is_idempotent() {
        let patch = MemberPatch {
            goal_point: Some(30),
            pin: Some(Pin::parse("0042").unwrap()),
            ..Default::default()
        };
        let once = cache_with_current("Aki");
        once.update_current_member(&patch);
        let twice = cache_with_current("Aki");
        twice.update_current_member(&patch);
        twice.update_current_member(&patch);

        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn test_rename_resyncs_previous_roster_entry() {
        let cache = cache_with_current("Aki");

        cache.update_current_member(&MemberPatch {
            user_name: Some("Akira".to_string()),
            ..Default::default()
        });

        assert!(cache.member("Aki").is_none());
        assert_eq!(cache.member("Akira").unwrap().current_point, 10);
        assert_eq!(cache.current_member().unwrap().user_name, "Akira");
    }

    #[test]
    fn test_mutators_without_current_member_are_noops() {
        let cache = SessionCache::new();
        cache.set_members(vec![member("Aki", 10, 5)]);
        let before = cache.snapshot();

        cache.update_current_point(99);
        cache.update_bonus_point(3);
        cache.update_profile_image(ProfileImage::from(vec![1]));
        cache.update_current_member(&MemberPatch::current_point(1));

        assert_eq!(cache.snapshot(), before);
    }

    #[test]
    fn test_single_field_mutators_mirror_into_roster() {
        let cache = cache_with_current("Aki");

        cache.update_current_point(20);
        cache.update_bonus_point(4);
        cache.update_profile_image(ProfileImage::from(vec![9, 9]));

        let entry = cache.member("Aki").unwrap();
        assert_eq!(entry.current_point, 20);
        assert_eq!(entry.bonus_point, 4);
        assert_eq!(entry.profile_image.unwrap().len(), 2);
    }

    #[test]
    fn test_profile_image_for_touches_only_roster() {
        let cache = cache_with_current("Aki");

        cache.update_profile_image_for("Mio", ProfileImage::from(vec![1, 2, 3]));
        cache.update_profile_image_for("Aki", ProfileImage::from(vec![4]));

        assert!(cache.member("Mio").unwrap().profile_image.is_some());
        assert!(cache.member("Aki").unwrap().profile_image.is_some());
        assert!(cache.current_member().unwrap().profile_image.is_none());
    }

    #[test]
    fn test_selected_dates_update_both_copies_when_names_match() {
        let cache = cache_with_current("Aki");
        let dates = BTreeSet::from([1_700_000_000]);

        cache.update_selected_dates("Aki", dates.clone());
        cache.update_selected_dates("Mio", BTreeSet::from([1]));

        assert_eq!(cache.current_member().unwrap().selected_dates, dates);
        assert_eq!(cache.member("Aki").unwrap().selected_dates, dates);
        assert_eq!(cache.member("Mio").unwrap().selected_dates, BTreeSet::from([1]));
    }

    #[test]
    fn test_remove_member_clears_matching_current() {
        let cache = cache_with_current("Aki");

        cache.remove_member("Mio");
        assert!(cache.current_member().is_some());

        cache.remove_member("Aki");
        assert!(cache.current_member().is_none());
        assert!(cache.members().is_empty());
    }

    #[test]
    fn test_clones_share_state_and_clear_resets() {
        let cache = cache_with_current("Aki");
        let other_screen = cache.clone();

        other_screen.update_current_point(42);
        assert_eq!(cache.current_member().unwrap().current_point, 42);

        cache.clear();
        assert_eq!(other_screen.snapshot(), SessionState::default());
        assert!(other_screen.account_id().is_none());
    }
}
