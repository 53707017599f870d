use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{FileDoc, Folder, now_rfc3339};

use super::{RepoError, Repository};

const STORE_DIR: &str = ".satchel";
const WORKSPACE_FILE: &str = "workspace.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkspaceDoc {
    version: u32,
    next_folder_id: i64,
    next_file_id: i64,
    folders: Vec<Folder>,
    files: Vec<FileDoc>,
}

/// File-backed repository: the whole workspace lives in
/// `<root>/.satchel/workspace.json`, rewritten atomically after every
/// mutation.
#[derive(Debug)]
pub struct LocalRepo {
    path: PathBuf,
    doc: WorkspaceDoc,
}

impl LocalRepo {
    pub fn store_dir(root: &Path) -> PathBuf {
        root.join(STORE_DIR)
    }

    pub fn init(root: &Path, force: bool) -> Result<Self, RepoError> {
        let dir = Self::store_dir(root);
        let path = dir.join(WORKSPACE_FILE);
        if path.exists() && !force {
            return Err(RepoError::new(
                "init",
                format!(
                    "{} already exists at {} (use --force to re-init)",
                    STORE_DIR,
                    dir.display()
                ),
            ));
        }
        fs::create_dir_all(&dir)
            .map_err(|err| RepoError::new("init", format!("create {}: {err}", dir.display())))?;

        let doc = WorkspaceDoc {
            version: 1,
            next_folder_id: 1,
            next_file_id: 1,
            folders: Vec::new(),
            files: Vec::new(),
        };
        let repo = Self { path, doc };
        repo.persist()?;
        Ok(repo)
    }

    pub fn open(root: &Path) -> Result<Self, RepoError> {
        let path = Self::store_dir(root).join(WORKSPACE_FILE);
        if !path.is_file() {
            return Err(RepoError::new(
                "open",
                format!(
                    "no {} workspace found at {} (run `satchel init`)",
                    STORE_DIR,
                    path.display()
                ),
            ));
        }
        let bytes = fs::read(&path)
            .map_err(|err| RepoError::new("open", format!("read {}: {err}", path.display())))?;
        let doc: WorkspaceDoc = serde_json::from_slice(&bytes)
            .map_err(|err| RepoError::new("open", format!("parse {}: {err}", path.display())))?;
        if doc.version != 1 {
            return Err(RepoError::new(
                "open",
                format!("unsupported workspace version {}", doc.version),
            ));
        }
        Ok(Self { path, doc })
    }

    fn persist(&self) -> Result<(), RepoError> {
        let bytes = serde_json::to_vec_pretty(&self.doc)
            .map_err(|err| RepoError::new("persist", format!("serialize workspace: {err}")))?;
        write_atomic(&self.path, &bytes)
            .map_err(|err| RepoError::new("persist", format!("write {}: {err}", self.path.display())))
    }
}

impl Repository for LocalRepo {
    fn folders(&self) -> Result<Vec<Folder>, RepoError> {
        Ok(self.doc.folders.clone())
    }

    fn files(&self) -> Result<Vec<FileDoc>, RepoError> {
        Ok(self.doc.files.clone())
    }

    fn create_folder(&mut self, name: &str, parent_id: Option<i64>) -> Result<i64, RepoError> {
        if let Some(pid) = parent_id
            && !self.doc.folders.iter().any(|f| f.id == pid)
        {
            return Err(RepoError::new(
                "create folder",
                format!("parent folder {pid} not found"),
            ));
        }
        let id = self.doc.next_folder_id;
        self.doc.next_folder_id += 1;
        self.doc.folders.push(Folder {
            id,
            name: name.to_string(),
            parent_id,
            is_open: true,
        });
        self.persist()?;
        Ok(id)
    }

    fn delete_folder(&mut self, id: i64) -> Result<(), RepoError> {
        let before = self.doc.folders.len();
        self.doc.folders.retain(|f| f.id != id);
        if self.doc.folders.len() == before {
            return Err(RepoError::new(
                "delete folder",
                format!("folder {id} not found"),
            ));
        }
        self.persist()
    }

    fn toggle_folder_open(&mut self, id: i64) -> Result<(), RepoError> {
        let folder = self
            .doc
            .folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| RepoError::new("toggle folder", format!("folder {id} not found")))?;
        folder.is_open = !folder.is_open;
        self.persist()
    }

    fn create_file(
        &mut self,
        folder_id: Option<i64>,
        title: &str,
        content: &str,
    ) -> Result<i64, RepoError> {
        if let Some(fid) = folder_id
            && !self.doc.folders.iter().any(|f| f.id == fid)
        {
            return Err(RepoError::new(
                "create file",
                format!("folder {fid} not found"),
            ));
        }
        let id = self.doc.next_file_id;
        self.doc.next_file_id += 1;
        let now = now_rfc3339();
        self.doc.files.push(FileDoc {
            id,
            folder_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now.clone(),
            updated_at: now,
        });
        self.persist()?;
        Ok(id)
    }

    fn delete_file(&mut self, id: i64) -> Result<(), RepoError> {
        let before = self.doc.files.len();
        self.doc.files.retain(|f| f.id != id);
        if self.doc.files.len() == before {
            return Err(RepoError::new("delete file", format!("file {id} not found")));
        }
        self.persist()
    }
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
