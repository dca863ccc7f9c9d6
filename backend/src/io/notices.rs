//! Dismissible notices shown to the user after an operation.

use serde::Serialize;

use crate::domain::errors::{SyncError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Notice for a failed operation.
    ///
    /// `NotFound` yields `None`: the caller redirects to registration
    /// instead of showing an error.
    pub fn from_error(error: &SyncError) -> Option<Self> {
        let notice = match error {
            SyncError::NotFound { .. } => return None,
            SyncError::NotSignedIn => Self::new("Please sign in", ""),
            SyncError::Validation(ValidationError::MissingSetting(_)) => {
                Self::new("Settings are incomplete", "Please fill in every item.")
            }
            SyncError::Validation(e) => Self::new("Invalid input", e.to_string()),
            SyncError::ImageEncoding(e) => Self::new("Image upload failed", e.to_string()),
            SyncError::MemberNotFound { .. }
            | SyncError::DuplicateMember { .. }
            | SyncError::NoActiveMember
            | SyncError::Decode(_)
            | SyncError::Store(_) => Self::new("Failed to save data", error.to_string()),
        };
        Some(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;

    #[test]
    fn test_not_found_has_no_notice() {
        assert_eq!(Notice::from_error(&SyncError::not_found("acc")), None);
    }

    #[test]
    fn test_store_failures_are_never_swallowed() {
        let error = SyncError::Store(StoreError::Unavailable("offline".to_string()));
        let notice = Notice::from_error(&error).unwrap();

        assert_eq!(notice.title, "Failed to save data");
        assert!(notice.message.contains("offline"));
    }

    #[test]
    fn test_member_not_found_is_shown_verbatim() {
        let notice = Notice::from_error(&SyncError::member_not_found("Aki")).unwrap();
        assert!(notice.message.contains("'Aki'"));
    }

    #[test]
    fn test_picture_and_reward_failures_have_notices() {
        let undecodable = image::load_from_memory(b"not a picture").unwrap_err();
        let notice = Notice::from_error(&SyncError::ImageEncoding(undecodable)).unwrap();
        assert_eq!(notice.title, "Image upload failed");

        let error = SyncError::Validation(ValidationError::CurrentPinMismatch);
        assert_eq!(Notice::from_error(&error).unwrap().title, "Invalid input");
    }

    #[test]
    fn test_missing_setting_asks_to_fill_everything() {
        let error = SyncError::Validation(ValidationError::MissingSetting("goal_point"));
        let notice = Notice::from_error(&error).unwrap();
        assert_eq!(notice.title, "Settings are incomplete");
    }
}
