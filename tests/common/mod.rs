use satchel::model::{FileDoc, Folder, Snapshot};

pub fn folder(id: i64, name: &str, parent_id: Option<i64>) -> Folder {
    Folder {
        id,
        name: name.to_string(),
        parent_id,
        is_open: true,
    }
}

pub fn file(id: i64, folder_id: Option<i64>, title: &str, content: &str) -> FileDoc {
    FileDoc {
        id,
        folder_id,
        title: title.to_string(),
        content: content.to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

pub fn snapshot(folders: Vec<Folder>, files: Vec<FileDoc>) -> Snapshot {
    Snapshot {
        version: 1,
        exported_at: "2024-01-01T00:00:00Z".to_string(),
        folders,
        files,
    }
}
