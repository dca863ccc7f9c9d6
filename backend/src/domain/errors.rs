//! Error taxonomy of the synchronization layer.
//!
//! The session cache never fails. Everything that can go wrong originates in
//! the sync protocol or the document store and reaches the caller as a
//! [`SyncError`].

use thiserror::Error;

use super::models::PinError;
use crate::storage::StoreError;

/// A fetched document could not be turned into an account or member
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Rejected user input on registration, settings and reward forms
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("user name cannot be empty")]
    EmptyUserName,

    #[error("user name cannot exceed {max} characters (got {len})")]
    UserNameTooLong { len: usize, max: usize },

    #[error("user name cannot contain '/' or '\\'")]
    UserNameHasPathSeparator,

    #[error("setting `{0}` has not been chosen")]
    MissingSetting(&'static str),

    #[error("the current PIN is required to change the reward")]
    CurrentPinMismatch,

    #[error("hiding place cannot be empty")]
    EmptyHiddenPlace,

    #[error(transparent)]
    InvalidPin(#[from] PinError),
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// No document for the account yet; callers redirect to registration
    #[error("no data stored for account {account_id}")]
    NotFound { account_id: String },

    /// Name lookup in the roster failed: cache and remote have diverged
    #[error("member '{user_name}' was not found in the account")]
    MemberNotFound { user_name: String },

    #[error("a member named '{user_name}' already exists")]
    DuplicateMember { user_name: String },

    #[error("no member is currently selected")]
    NoActiveMember,

    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to encode profile image: {0}")]
    ImageEncoding(#[from] image::ImageError),

    #[error("failed to decode account data: {0}")]
    Decode(#[from] DecodeError),

    #[error("document store error: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    pub fn not_found(account_id: &str) -> Self {
        Self::NotFound {
            account_id: account_id.to_string(),
        }
    }

    pub fn member_not_found(user_name: &str) -> Self {
        Self::MemberNotFound {
            user_name: user_name.to_string(),
        }
    }
}

impl From<PinError> for SyncError {
    fn from(error: PinError) -> Self {
        Self::Validation(error.into())
    }
}
