//! Directory-backed store: `<base>/<collection>/<id>.json` for documents and
//! `<base>/blobs/<path>` for binary objects.

pub mod blob_store;
pub mod connection;
pub mod document_store;

pub use connection::FileConnection;

/// Store backend persisting to a [`FileConnection`]'s directory
#[derive(Clone)]
pub struct FileStore {
    connection: FileConnection,
}

impl FileStore {
    pub fn new(connection: FileConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &FileConnection {
        &self.connection
    }
}
