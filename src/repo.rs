//! The repository is the live folder/file store the reconciliation engine
//! mutates. The trait mirrors the persistence layer's CRUD surface and is
//! deliberately fallible on every call: a backing store may be a remote
//! service, and the engine treats each operation as one that can fail.

use thiserror::Error;

use crate::model::{FileDoc, Folder};

pub(crate) mod local;
mod memory;

pub use self::local::LocalRepo;
pub use self::memory::MemoryRepo;

#[derive(Debug, Clone, Error)]
#[error("{op}: {message}")]
pub struct RepoError {
    pub op: &'static str,
    pub message: String,
}

impl RepoError {
    pub fn new(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

pub trait Repository {
    fn folders(&self) -> Result<Vec<Folder>, RepoError>;
    fn files(&self) -> Result<Vec<FileDoc>, RepoError>;

    /// Create a folder under `parent_id` (or at the root for `None`) and
    /// return its repository-assigned id. New folders start open.
    fn create_folder(&mut self, name: &str, parent_id: Option<i64>) -> Result<i64, RepoError>;

    fn delete_folder(&mut self, id: i64) -> Result<(), RepoError>;

    /// Flip a folder's open/closed UI state.
    fn toggle_folder_open(&mut self, id: i64) -> Result<(), RepoError>;

    /// Create a file and return its repository-assigned id. Timestamps are
    /// stamped by the repository, not supplied by the caller.
    fn create_file(
        &mut self,
        folder_id: Option<i64>,
        title: &str,
        content: &str,
    ) -> Result<i64, RepoError>;

    fn delete_file(&mut self, id: i64) -> Result<(), RepoError>;
}
