use std::collections::HashSet;

use crate::model::{FileDoc, Folder, now_rfc3339};

use super::{RepoError, Repository};

/// In-memory repository. Backs the CLI's dry runs and the test suites; also
/// documents the reference semantics other implementations follow.
#[derive(Debug, Default)]
pub struct MemoryRepo {
    folders: Vec<Folder>,
    files: Vec<FileDoc>,
    next_folder_id: i64,
    next_file_id: i64,
    refuse_folder_deletes: HashSet<i64>,
    refuse_file_deletes: HashSet<i64>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self {
            next_folder_id: 1,
            next_file_id: 1,
            ..Self::default()
        }
    }

    /// Fault-injection hook: make `delete_folder(id)` fail. Lets callers
    /// exercise the best-effort wipe contract.
    pub fn refuse_folder_delete(&mut self, id: i64) {
        self.refuse_folder_deletes.insert(id);
    }

    /// Fault-injection hook: make `delete_file(id)` fail.
    pub fn refuse_file_delete(&mut self, id: i64) {
        self.refuse_file_deletes.insert(id);
    }
}

impl Repository for MemoryRepo {
    fn folders(&self) -> Result<Vec<Folder>, RepoError> {
        Ok(self.folders.clone())
    }

    fn files(&self) -> Result<Vec<FileDoc>, RepoError> {
        Ok(self.files.clone())
    }

    fn create_folder(&mut self, name: &str, parent_id: Option<i64>) -> Result<i64, RepoError> {
        if let Some(pid) = parent_id
            && !self.folders.iter().any(|f| f.id == pid)
        {
            return Err(RepoError::new(
                "create folder",
                format!("parent folder {pid} not found"),
            ));
        }
        let id = self.next_folder_id;
        self.next_folder_id += 1;
        self.folders.push(Folder {
            id,
            name: name.to_string(),
            parent_id,
            is_open: true,
        });
        Ok(id)
    }

    fn delete_folder(&mut self, id: i64) -> Result<(), RepoError> {
        if self.refuse_folder_deletes.contains(&id) {
            return Err(RepoError::new("delete folder", format!("folder {id} is locked")));
        }
        let before = self.folders.len();
        self.folders.retain(|f| f.id != id);
        if self.folders.len() == before {
            return Err(RepoError::new(
                "delete folder",
                format!("folder {id} not found"),
            ));
        }
        Ok(())
    }

    fn toggle_folder_open(&mut self, id: i64) -> Result<(), RepoError> {
        let folder = self
            .folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| RepoError::new("toggle folder", format!("folder {id} not found")))?;
        folder.is_open = !folder.is_open;
        Ok(())
    }

    fn create_file(
        &mut self,
        folder_id: Option<i64>,
        title: &str,
        content: &str,
    ) -> Result<i64, RepoError> {
        if let Some(fid) = folder_id
            && !self.folders.iter().any(|f| f.id == fid)
        {
            return Err(RepoError::new(
                "create file",
                format!("folder {fid} not found"),
            ));
        }
        let id = self.next_file_id;
        self.next_file_id += 1;
        let now = now_rfc3339();
        self.files.push(FileDoc {
            id,
            folder_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now.clone(),
            updated_at: now,
        });
        Ok(id)
    }

    fn delete_file(&mut self, id: i64) -> Result<(), RepoError> {
        if self.refuse_file_deletes.contains(&id) {
            return Err(RepoError::new("delete file", format!("file {id} is locked")));
        }
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        if self.files.len() == before {
            return Err(RepoError::new("delete file", format!("file {id} not found")));
        }
        Ok(())
    }
}
