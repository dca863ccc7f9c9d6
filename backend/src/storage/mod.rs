//! # Storage Module
//!
//! Document store adapters for the account document and profile pictures.
//!
//! The domain layer only ever talks to the [`DocumentStore`] and
//! [`BlobStore`] traits. Two backends ship with the crate:
//!
//! - **Memory**: an in-process store used by tests and demos, with an
//!   offline switch for exercising failure paths
//! - **File**: one JSON file per document plus a blob directory, used by the
//!   headless binary
//!
//! ## Write semantics
//!
//! `set_document(.., merge: true)` replaces each provided top-level field and
//! leaves every other top-level field of the stored document untouched.
//! `merge: false` replaces the whole document. See [`merge`].

pub mod error;
pub mod file;
pub mod memory;
pub mod merge;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use error::StoreError;
pub use file::{FileConnection, FileStore};
pub use memory::MemoryStore;
pub use traits::{BlobStore, Document, DocumentStore};
