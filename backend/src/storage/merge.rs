//! Merge-write semantics shared by every store backend.

use super::Document;

/// Apply a write to the currently stored document and return the new one.
///
/// A merge write replaces the provided top-level fields and keeps the rest.
/// Nested objects are replaced as a unit, so a member entry written back
/// never keeps stale keys from a previous value.
pub fn apply_write(existing: Option<Document>, fields: Document, merge: bool) -> Document {
    match existing {
        Some(mut document) if merge => {
            for (key, value) in fields {
                document.insert(key, value);
            }
            document
        }
        _ => fields,
    }
}
