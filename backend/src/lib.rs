//! # Okeiko Sitter Backend
//!
//! Account and session core of the Okeiko Sitter habit tracker: family
//! members earn points for a recurring task until they reach a goal that
//! unlocks a hidden reward.
//!
//! ## Architecture
//!
//! ```text
//! Screens
//!     ↓
//! Domain (session cache, services)
//!     ↓
//! IO (wire mappers, notices)
//!     ↓
//! Storage (document and blob store adapters)
//! ```
//!
//! [`Backend`] wires one session: a shared [`SessionCache`] plus the
//! services operating on it.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::{MemberService, ProfileImageService, RewardService, SessionCache, SyncService};
use crate::storage::{BlobStore, DocumentStore, FileConnection, FileStore};

/// One app session with all services sharing its cache
#[derive(Clone)]
pub struct Backend {
    pub session: SessionCache,
    pub sync_service: SyncService,
    pub member_service: MemberService,
    pub reward_service: RewardService,
    pub profile_image_service: ProfileImageService,
}

impl Backend {
    /// Backend over the file store in the configured data directory
    pub fn new(config: &AppConfig) -> Result<Self> {
        info!("Setting up file store at {:?}", config.data_directory);
        let connection = FileConnection::new(&config.data_directory)
            .context("Failed to open the data directory")?;
        let store = Arc::new(FileStore::new(connection));

        Ok(Self::with_stores(store.clone(), store, config))
    }

    /// Backend over arbitrary store adapters
    pub fn with_stores(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        config: &AppConfig,
    ) -> Self {
        info!("Setting up domain services");
        let session = SessionCache::new();
        let sync_service = SyncService::new(documents, config.collection.clone());
        let profile_image_service = ProfileImageService::new(
            blobs,
            config.profile_image_quality,
            config.max_profile_image_bytes,
        );
        let member_service = MemberService::new(
            session.clone(),
            sync_service.clone(),
            profile_image_service.clone(),
        );
        let reward_service = RewardService::new(session.clone(), sync_service.clone());

        Self {
            session,
            sync_service,
            member_service,
            reward_service,
            profile_image_service,
        }
    }
}
