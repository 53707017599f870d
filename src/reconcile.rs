//! Destructive replace: wipe the repository, then replay a snapshot into it
//! with fresh identifiers.
//!
//! Sequencing is strict. The wipe finishes before any folder is created, and
//! every folder exists before the first file is created, because later
//! phases consume the results of earlier ones (the empty repository, the
//! remap table). There is no rollback: the repository offers no transaction
//! primitive, so the contract is best-effort forward progress with full
//! failure reporting, not atomicity. Reference validation runs before the
//! wipe so that a broken snapshot leaves the repository untouched.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{Folder, Snapshot};
use crate::repo::{RepoError, Repository};

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A file in the snapshot points at a folder id the snapshot itself does
    /// not contain. Raised before any mutation; the repository is untouched.
    #[error("file {file_id} references folder {folder_id}, which is not in the snapshot")]
    DanglingReference { file_id: i64, folder_id: i64 },

    /// Folder replay could not make progress: the listed folders form a
    /// parent cycle or reference parents missing from the snapshot. The wipe
    /// has already run by this point, so the repository is left empty.
    #[error("folder hierarchy is cyclic or unresolvable (folders {folder_ids:?})")]
    CyclicHierarchy { folder_ids: Vec<i64> },

    /// A create call failed mid-replay. The wipe has already run and replay
    /// stopped early, so the repository is empty or partially restored.
    #[error("repository operation failed during replay: {0}")]
    Replay(RepoError),

    /// Reading the current repository contents failed before the wipe
    /// deleted anything.
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// What one `replace` run did, including per-item wipe failures. Wipe
/// failures do not abort the run; the caller decides how loudly to report
/// them.
#[derive(Debug, Default)]
pub struct ReplaceReport {
    pub folders_created: usize,
    pub files_created: usize,
    pub wipe_failures: Vec<WipeFailure>,
}

#[derive(Debug)]
pub struct WipeFailure {
    pub item: WipeItem,
    pub error: RepoError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipeItem {
    File(i64),
    Folder(i64),
}

/// Replace the repository's entire contents with the snapshot's.
///
/// Identifiers in the snapshot are foreign: folders are recreated parent
/// before child and assigned fresh ids, files are recreated in snapshot
/// order with their folder references remapped. The caller must refresh any
/// cached folder/file state afterwards; every prior identifier is invalid.
pub fn replace<R: Repository>(
    repo: &mut R,
    snapshot: &Snapshot,
) -> Result<ReplaceReport, ReconcileError> {
    validate_references(snapshot)?;

    let mut report = ReplaceReport::default();
    wipe(repo, &mut report)?;

    let remap = replay_folders(repo, snapshot, &mut report)?;
    replay_files(repo, snapshot, &remap, &mut report)?;

    debug!(
        folders = report.folders_created,
        files = report.files_created,
        wipe_failures = report.wipe_failures.len(),
        "replace complete"
    );
    Ok(report)
}

/// Every non-null file->folder reference must resolve inside the snapshot's
/// own folder list. Runs before the wipe; failure here means nothing was
/// mutated.
fn validate_references(snapshot: &Snapshot) -> Result<(), ReconcileError> {
    let folder_ids: HashSet<i64> = snapshot.folders.iter().map(|f| f.id).collect();
    for file in &snapshot.files {
        if let Some(folder_id) = file.folder_id
            && !folder_ids.contains(&folder_id)
        {
            return Err(ReconcileError::DanglingReference {
                file_id: file.id,
                folder_id,
            });
        }
    }
    Ok(())
}

/// Delete all files, then all folders. Files first so the live repository
/// never holds a file pointing at a deleted folder. Individual failures are
/// collected, not fatal: the wipe is best-effort-complete.
fn wipe<R: Repository>(repo: &mut R, report: &mut ReplaceReport) -> Result<(), ReconcileError> {
    let files = repo.files()?;
    let folders = repo.folders()?;
    debug!(files = files.len(), folders = folders.len(), "wipe start");

    for file in files {
        if let Err(error) = repo.delete_file(file.id) {
            warn!(file = file.id, %error, "wipe: delete file failed");
            report.wipe_failures.push(WipeFailure {
                item: WipeItem::File(file.id),
                error,
            });
        }
    }
    for folder in folders {
        if let Err(error) = repo.delete_folder(folder.id) {
            warn!(folder = folder.id, %error, "wipe: delete folder failed");
            report.wipe_failures.push(WipeFailure {
                item: WipeItem::Folder(folder.id),
                error,
            });
        }
    }
    Ok(())
}

/// Recreate folders parent-before-child, building the remap table as we go.
///
/// Repeated ready-set passes over the pending list: a folder is ready when
/// its parent is null or already remapped. A pass that creates nothing while
/// folders remain pending means a cycle or a parent id missing from the
/// snapshot, and fails rather than looping.
fn replay_folders<R: Repository>(
    repo: &mut R,
    snapshot: &Snapshot,
    report: &mut ReplaceReport,
) -> Result<HashMap<i64, i64>, ReconcileError> {
    let mut remap: HashMap<i64, i64> = HashMap::with_capacity(snapshot.folders.len());
    let mut pending: Vec<&Folder> = snapshot.folders.iter().collect();

    while !pending.is_empty() {
        let mut rest: Vec<&Folder> = Vec::new();
        let mut progressed = false;

        for folder in pending {
            let new_parent = match folder.parent_id {
                None => None,
                Some(old_parent) => match remap.get(&old_parent) {
                    Some(new_parent) => Some(*new_parent),
                    None => {
                        rest.push(folder);
                        continue;
                    }
                },
            };

            let new_id = repo
                .create_folder(&folder.name, new_parent)
                .map_err(ReconcileError::Replay)?;
            if !folder.is_open {
                // Repositories create folders open; one toggle closes it.
                repo.toggle_folder_open(new_id)
                    .map_err(ReconcileError::Replay)?;
            }
            remap.insert(folder.id, new_id);
            report.folders_created += 1;
            progressed = true;
        }

        if !progressed {
            let folder_ids: Vec<i64> = rest.iter().map(|f| f.id).collect();
            return Err(ReconcileError::CyclicHierarchy { folder_ids });
        }
        pending = rest;
    }

    Ok(remap)
}

/// Recreate files in snapshot order. Order is part of the contract:
/// downstream "first file" behavior depends on it.
fn replay_files<R: Repository>(
    repo: &mut R,
    snapshot: &Snapshot,
    remap: &HashMap<i64, i64>,
    report: &mut ReplaceReport,
) -> Result<(), ReconcileError> {
    for file in &snapshot.files {
        let folder_id = match file.folder_id {
            None => None,
            Some(old) => match remap.get(&old) {
                Some(new) => Some(*new),
                // Preflight validation makes this unreachable, but stay total.
                None => {
                    return Err(ReconcileError::DanglingReference {
                        file_id: file.id,
                        folder_id: old,
                    });
                }
            },
        };
        repo.create_file(folder_id, &file.title, &file.content)
            .map_err(ReconcileError::Replay)?;
        report.files_created += 1;
    }
    Ok(())
}
