//! # Domain Module
//!
//! Business logic of the account and session core.
//!
//! ## Key Responsibilities
//!
//! - **Session cache**: the in-process copy of the signed-in account
//! - **Synchronization**: partial member updates merged into the remote
//!   account document without clobbering sibling fields
//! - **Member operations**: registration, selection, point accrual,
//!   settings, calendar marks and profile pictures
//! - **Rewards**: PIN-gated disclosure of the hidden reward
//!
//! Services are cheap to clone and share the same [`SessionCache`] handle.

pub mod calendar;
pub mod errors;
pub mod member_service;
pub mod models;
pub mod profile_image_service;
pub mod reward_service;
pub mod session_cache;
pub mod sync_service;

pub use errors::{DecodeError, SyncError, ValidationError};
pub use member_service::{MemberService, RefreshOutcome, SettingsForm};
pub use profile_image_service::ProfileImageService;
pub use reward_service::{DialogMode, Disclosure, RewardService};
pub use session_cache::{SessionCache, SessionState};
pub use sync_service::SyncService;
