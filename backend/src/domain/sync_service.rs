//! Synchronization of member changes with the remote account document.
//!
//! ## Key Responsibilities
//!
//! - Fetching and decoding the account document
//! - The dual update: merging one partial member change into both the
//!   `users` roster entry and the `current_user` snapshot, keyed by name,
//!   with a single merge write
//! - Single-path writes that do not need roster synchronization
//!
//! None of these calls touch the session cache; callers mirror successful
//! changes themselves. Every call is one read-modify-write cycle and is not
//! transactional: concurrent writers resolve as last-writer-wins.

use log::{debug, error, info, warn};
use serde_json::Value;
use shared::fields;
use std::sync::Arc;

use super::errors::SyncError;
use super::models::{Account, Member, MemberPatch};
use crate::io::{AccountMapper, MemberMapper};
use crate::storage::{Document, DocumentStore};

#[derive(Clone)]
pub struct SyncService {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl SyncService {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    async fn read_document(&self, account_id: &str) -> Result<Option<Document>, SyncError> {
        Ok(self.store.get_document(&self.collection, account_id).await?)
    }

    async fn write_merge(&self, account_id: &str, document: Document) -> Result<(), SyncError> {
        self.store
            .set_document(&self.collection, account_id, document, true)
            .await
            .map_err(|e| {
                error!("Failed to write account {}: {}", account_id, e);
                SyncError::from(e)
            })
    }

    /// Fetch and decode the account document
    pub async fn fetch_account(&self, account_id: &str) -> Result<Account, SyncError> {
        info!("Fetching account {}", account_id);

        let document = self
            .read_document(account_id)
            .await?
            .ok_or_else(|| SyncError::not_found(account_id))?;
        let account = AccountMapper::to_domain(account_id, document)?;
        if !account.is_consistent() {
            warn!(
                "Account {}: current_user differs from its roster entry, using it as stored",
                account_id
            );
        }

        debug!(
            "Account {} has {} members, current member present: {}",
            account_id,
            account.members.len(),
            account.current_member.is_some()
        );
        Ok(account)
    }

    /// Merge `patch` into the roster entry named `user_name` and into
    /// `current_user` when it carries the same name, in one merge write.
    ///
    /// A `current_user` naming another member is left as is rather than
    /// merged unconditionally, so one member's fields never land on another
    /// after the selection changed elsewhere.
    ///
    /// Fails with `NotFound` when the document, its `users` array or its
    /// `current_user` object is missing, and with `MemberNotFound` when no
    /// roster entry has the name. Neither failure writes anything.
    pub async fn dual_update(
        &self,
        account_id: &str,
        user_name: &str,
        patch: &MemberPatch,
    ) -> Result<(), SyncError> {
        let update = MemberMapper::patch_fields(patch);
        info!(
            "Dual update of '{}' in account {} ({} fields)",
            user_name,
            account_id,
            update.len()
        );

        if update.is_empty() {
            debug!("Empty patch for '{}', nothing to write", user_name);
            return Ok(());
        }

        let mut document = self
            .read_document(account_id)
            .await?
            .ok_or_else(|| SyncError::not_found(account_id))?;

        let mut users = match document.remove(fields::USERS) {
            Some(Value::Array(users)) => users,
            _ => return Err(SyncError::not_found(account_id)),
        };
        let mut current_user = match document.remove(fields::CURRENT_USER) {
            Some(Value::Object(current_user)) => current_user,
            _ => return Err(SyncError::not_found(account_id)),
        };

        let index =
            roster_index(&users, user_name).ok_or_else(|| SyncError::member_not_found(user_name))?;
        if let Some(Value::Object(entry)) = users.get_mut(index) {
            merge_into(entry, &update);
        }

        if entry_name(&current_user) == Some(user_name) {
            merge_into(&mut current_user, &update);
        } else {
            warn!(
                "current_user of account {} is not '{}', leaving it untouched",
                account_id, user_name
            );
        }

        let mut write = Document::new();
        write.insert(fields::USERS.to_string(), Value::Array(users));
        write.insert(fields::CURRENT_USER.to_string(), Value::Object(current_user));
        self.write_merge(account_id, write).await
    }

    /// Plain merge write of top-level document fields, no roster sync
    pub async fn merge_fields(&self, account_id: &str, document: Document) -> Result<(), SyncError> {
        info!("Merging {} fields into account {}", document.len(), account_id);
        self.write_merge(account_id, document).await
    }

    /// Merge `patch` into one roster entry only, for members that are not
    /// the current member
    pub async fn update_roster_member(
        &self,
        account_id: &str,
        user_name: &str,
        patch: &MemberPatch,
    ) -> Result<(), SyncError> {
        info!("Updating roster entry '{}' in account {}", user_name, account_id);

        let update = MemberMapper::patch_fields(patch);
        if update.is_empty() {
            return Ok(());
        }

        let mut document = self
            .read_document(account_id)
            .await?
            .ok_or_else(|| SyncError::not_found(account_id))?;
        let mut users = match document.remove(fields::USERS) {
            Some(Value::Array(users)) => users,
            _ => return Err(SyncError::not_found(account_id)),
        };

        let index =
            roster_index(&users, user_name).ok_or_else(|| SyncError::member_not_found(user_name))?;
        if let Some(Value::Object(entry)) = users.get_mut(index) {
            merge_into(entry, &update);
        }

        self.merge_fields(account_id, single_field(fields::USERS, Value::Array(users)))
            .await
    }

    /// Append a member to the roster, creating the document on first write.
    ///
    /// Rejects a name already present with `DuplicateMember`.
    pub async fn append_member(&self, account_id: &str, member: &Member) -> Result<(), SyncError> {
        info!("Appending member '{}' to account {}", member.user_name, account_id);

        let mut users = match self.read_document(account_id).await? {
            Some(mut document) => match document.remove(fields::USERS) {
                Some(Value::Array(users)) => users,
                _ => Vec::new(),
            },
            None => Vec::new(),
        };

        if roster_index(&users, &member.user_name).is_some() {
            return Err(SyncError::DuplicateMember {
                user_name: member.user_name.clone(),
            });
        }
        users.push(MemberMapper::to_value(member));

        self.write_merge(account_id, single_field(fields::USERS, Value::Array(users)))
            .await
    }

    /// Write `member` as the account's `current_user`
    pub async fn set_current_member(&self, account_id: &str, member: &Member) -> Result<(), SyncError> {
        info!("Selecting '{}' as current member of account {}", member.user_name, account_id);
        self.write_merge(
            account_id,
            single_field(fields::CURRENT_USER, MemberMapper::to_value(member)),
        )
        .await
    }

    /// Remove the roster entry named `user_name`, clearing `current_user` in
    /// the same write when it names the same member.
    ///
    /// Returns whether `current_user` was cleared.
    pub async fn remove_member(&self, account_id: &str, user_name: &str) -> Result<bool, SyncError> {
        info!("Removing member '{}' from account {}", user_name, account_id);

        let mut document = self
            .read_document(account_id)
            .await?
            .ok_or_else(|| SyncError::not_found(account_id))?;
        let mut users = match document.remove(fields::USERS) {
            Some(Value::Array(users)) => users,
            _ => return Err(SyncError::not_found(account_id)),
        };

        let index =
            roster_index(&users, user_name).ok_or_else(|| SyncError::member_not_found(user_name))?;
        users.remove(index);

        let clears_current = document
            .get(fields::CURRENT_USER)
            .and_then(Value::as_object)
            .is_some_and(|current| entry_name(current) == Some(user_name));

        let mut write = single_field(fields::USERS, Value::Array(users));
        if clears_current {
            write.insert(fields::CURRENT_USER.to_string(), Value::Null);
        }
        self.write_merge(account_id, write).await?;
        Ok(clears_current)
    }
}

fn entry_name(entry: &Document) -> Option<&str> {
    entry.get(fields::USER_NAME).and_then(Value::as_str)
}

fn roster_index(users: &[Value], user_name: &str) -> Option<usize> {
    users.iter().position(|entry| {
        entry
            .as_object()
            .and_then(entry_name)
            .is_some_and(|name| name == user_name)
    })
}

/// Shallow merge: each update field replaces the target's field
fn merge_into(target: &mut Document, update: &Document) {
    for (key, value) in update {
        target.insert(key.clone(), value.clone());
    }
}

fn single_field(key: &str, value: Value) -> Document {
    let mut document = Document::new();
    document.insert(key.to_string(), value);
    document
}
