mod common;

use common::{file, folder, snapshot};
use satchel::model::Folder;
use satchel::reconcile::{self, ReconcileError, WipeItem};
use satchel::repo::{MemoryRepo, Repository};

/// Seed a repository with some pre-existing contents whose ids will collide
/// with nothing in the snapshots under test.
fn seeded_repo() -> MemoryRepo {
    let mut repo = MemoryRepo::new();
    let old = repo.create_folder("old stuff", None).unwrap();
    repo.create_file(Some(old), "old note", "old body").unwrap();
    repo.create_file(None, "old unfiled", "").unwrap();
    repo
}

fn parent_name_of(folders: &[Folder], name: &str) -> Option<String> {
    let child = folders.iter().find(|f| f.name == name)?;
    let parent_id = child.parent_id?;
    folders.iter().find(|f| f.id == parent_id).map(|f| f.name.clone())
}

#[test]
fn hierarchy_is_preserved_across_remapping() {
    // Depth-3 tree with deliberately awkward foreign ids, children listed
    // before their parents.
    let snap = snapshot(
        vec![
            folder(300, "grandchild", Some(200)),
            folder(200, "child", Some(100)),
            folder(100, "root", None),
            folder(101, "sibling root", None),
        ],
        vec![],
    );

    let mut repo = seeded_repo();
    let report = reconcile::replace(&mut repo, &snap).unwrap();
    assert_eq!(report.folders_created, 4);

    let folders = repo.folders().unwrap();
    assert_eq!(folders.len(), 4);
    assert_eq!(parent_name_of(&folders, "grandchild").as_deref(), Some("child"));
    assert_eq!(parent_name_of(&folders, "child").as_deref(), Some("root"));
    assert_eq!(parent_name_of(&folders, "root"), None);
    assert_eq!(parent_name_of(&folders, "sibling root"), None);

    // Foreign ids must not leak through the remap.
    assert!(folders.iter().all(|f| f.id < 100));
}

#[test]
fn file_references_resolve_to_the_remapped_folders() {
    let snap = snapshot(
        vec![folder(50, "projects", None), folder(60, "archive", Some(50))],
        vec![
            file(1, Some(60), "deep note", "a"),
            file(2, Some(50), "top note", "b"),
            file(3, None, "loose note", "c"),
        ],
    );

    let mut repo = seeded_repo();
    reconcile::replace(&mut repo, &snap).unwrap();

    let folders = repo.folders().unwrap();
    let files = repo.files().unwrap();

    let folder_name = |id: Option<i64>| {
        id.and_then(|id| folders.iter().find(|f| f.id == id))
            .map(|f| f.name.as_str().to_string())
    };

    let by_title = |title: &str| files.iter().find(|f| f.title == title).unwrap();
    assert_eq!(folder_name(by_title("deep note").folder_id).as_deref(), Some("archive"));
    assert_eq!(folder_name(by_title("top note").folder_id).as_deref(), Some("projects"));
    assert_eq!(by_title("loose note").folder_id, None);
}

#[test]
fn files_are_replayed_in_snapshot_order() {
    let snap = snapshot(
        vec![],
        vec![
            file(9, None, "first", ""),
            file(3, None, "second", ""),
            file(7, None, "third", ""),
        ],
    );

    let mut repo = seeded_repo();
    reconcile::replace(&mut repo, &snap).unwrap();

    let titles: Vec<String> = repo.files().unwrap().into_iter().map(|f| f.title).collect();
    assert_eq!(titles, ["first", "second", "third"]);
}

#[test]
fn double_import_yields_the_same_structure() {
    let snap = snapshot(
        vec![folder(1, "a", None), folder(2, "b", Some(1))],
        vec![file(1, Some(2), "note", "body")],
    );

    let mut repo = seeded_repo();
    reconcile::replace(&mut repo, &snap).unwrap();
    let first_folders: Vec<(String, Option<String>)> = {
        let folders = repo.folders().unwrap();
        folders
            .iter()
            .map(|f| (f.name.clone(), parent_name_of(&folders, &f.name)))
            .collect()
    };
    let first_titles: Vec<String> =
        repo.files().unwrap().into_iter().map(|f| f.title).collect();

    reconcile::replace(&mut repo, &snap).unwrap();
    let second_folders: Vec<(String, Option<String>)> = {
        let folders = repo.folders().unwrap();
        folders
            .iter()
            .map(|f| (f.name.clone(), parent_name_of(&folders, &f.name)))
            .collect()
    };
    let second_titles: Vec<String> =
        repo.files().unwrap().into_iter().map(|f| f.title).collect();

    assert_eq!(first_folders, second_folders);
    assert_eq!(first_titles, second_titles);
}

#[test]
fn empty_snapshot_is_a_factory_reset() {
    let snap = snapshot(vec![], vec![]);

    let mut repo = seeded_repo();
    assert!(!repo.folders().unwrap().is_empty());

    let report = reconcile::replace(&mut repo, &snap).unwrap();
    assert_eq!(report.folders_created, 0);
    assert_eq!(report.files_created, 0);
    assert!(report.wipe_failures.is_empty());
    assert!(repo.folders().unwrap().is_empty());
    assert!(repo.files().unwrap().is_empty());
}

#[test]
fn dangling_file_reference_aborts_before_any_mutation() {
    let snap = snapshot(
        vec![folder(1, "present", None)],
        vec![file(42, Some(99), "orphan", "")],
    );

    let mut repo = seeded_repo();
    let folders_before = repo.folders().unwrap();
    let files_before = repo.files().unwrap();

    let err = reconcile::replace(&mut repo, &snap).unwrap_err();
    match err {
        ReconcileError::DanglingReference { file_id, folder_id } => {
            assert_eq!(file_id, 42);
            assert_eq!(folder_id, 99);
        }
        other => panic!("expected DanglingReference, got {other:?}"),
    }

    assert_eq!(repo.folders().unwrap(), folders_before);
    assert_eq!(repo.files().unwrap(), files_before);
}

#[test]
fn two_folder_cycle_is_rejected_not_looped() {
    let snap = snapshot(
        vec![folder(1, "a", Some(2)), folder(2, "b", Some(1))],
        vec![],
    );

    let mut repo = seeded_repo();
    let err = reconcile::replace(&mut repo, &snap).unwrap_err();
    match err {
        ReconcileError::CyclicHierarchy { mut folder_ids } => {
            folder_ids.sort_unstable();
            assert_eq!(folder_ids, vec![1, 2]);
        }
        other => panic!("expected CyclicHierarchy, got {other:?}"),
    }

    // The wipe has run by the time the cycle is detected.
    assert!(repo.folders().unwrap().is_empty());
    assert!(repo.files().unwrap().is_empty());
}

#[test]
fn self_parenting_folder_is_rejected() {
    let snap = snapshot(vec![folder(7, "ouroboros", Some(7))], vec![]);

    let mut repo = MemoryRepo::new();
    assert!(matches!(
        reconcile::replace(&mut repo, &snap),
        Err(ReconcileError::CyclicHierarchy { .. })
    ));
}

#[test]
fn parent_missing_from_snapshot_is_rejected() {
    let snap = snapshot(vec![folder(1, "stray", Some(999))], vec![]);

    let mut repo = MemoryRepo::new();
    assert!(matches!(
        reconcile::replace(&mut repo, &snap),
        Err(ReconcileError::CyclicHierarchy { .. })
    ));
}

#[test]
fn closed_folders_are_restored_closed() {
    let mut closed = folder(1, "shut", None);
    closed.is_open = false;
    let snap = snapshot(vec![closed, folder(2, "open", None)], vec![]);

    let mut repo = MemoryRepo::new();
    reconcile::replace(&mut repo, &snap).unwrap();

    let folders = repo.folders().unwrap();
    assert!(!folders.iter().find(|f| f.name == "shut").unwrap().is_open);
    assert!(folders.iter().find(|f| f.name == "open").unwrap().is_open);
}

#[test]
fn wipe_failures_are_collected_not_fatal() {
    let mut repo = MemoryRepo::new();
    let keep = repo.create_file(None, "stubborn", "cannot delete me").unwrap();
    repo.create_file(None, "deletable", "").unwrap();
    repo.refuse_file_delete(keep);

    let snap = snapshot(vec![folder(1, "fresh", None)], vec![file(1, Some(1), "new", "")]);
    let report = reconcile::replace(&mut repo, &snap).unwrap();

    assert_eq!(report.wipe_failures.len(), 1);
    assert_eq!(report.wipe_failures[0].item, WipeItem::File(keep));
    assert_eq!(report.folders_created, 1);
    assert_eq!(report.files_created, 1);

    // The stubborn file survives alongside the restored contents.
    let titles: Vec<String> = repo.files().unwrap().into_iter().map(|f| f.title).collect();
    assert!(titles.contains(&"stubborn".to_string()));
    assert!(titles.contains(&"new".to_string()));
}
