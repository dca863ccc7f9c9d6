//! Test utilities: a self-cleaning file store and account fixtures.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::{FileConnection, FileStore, MemoryStore};
use crate::domain::models::{Account, Member};
use crate::io::AccountMapper;

/// File store rooted in a temporary directory removed on drop
pub struct TestEnvironment {
    /// Kept alive until drop
    _temp_dir: TempDir,
    pub store: FileStore,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let store = FileStore::new(FileConnection::new(&base_path)?);

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            store,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }
}

/// Member with the point settings used across the sync tests
pub fn member(user_name: &str, current_point: u32, challenge_point: u32) -> Member {
    let mut member = Member::new(user_name);
    member.current_point = current_point;
    member.challenge_point = challenge_point;
    member
}

/// Seed an account document into a memory store without counting a write
pub fn seed_account(
    store: &MemoryStore,
    account_id: &str,
    members: Vec<Member>,
    current: Option<Member>,
) -> Account {
    let account = Account {
        account_id: account_id.to_string(),
        members,
        current_member: current,
    };
    store.seed_document(
        shared::USERS_COLLECTION,
        account_id,
        AccountMapper::to_document(&account),
    );
    account
}
