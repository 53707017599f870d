use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

fn default_open() -> bool {
    true
}

/// A folder in the workspace tree. `parent_id` references another folder's
/// id; the parent graph must be a forest. `is_open` is UI state only and has
/// no structural meaning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,

    // Absent in older exports; folders render open by default.
    #[serde(default = "default_open")]
    pub is_open: bool,
}

/// A file (document) in the workspace. `folder_id` of `None` means unfiled.
/// Timestamps are advisory RFC 3339 strings, not enforced invariants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDoc {
    pub id: i64,
    pub folder_id: Option<i64>,
    pub title: String,
    pub content: String,

    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A serialized workspace: the value object written to disk or shipped to a
/// remote backend. All identifiers inside a snapshot are foreign: they
/// belonged to whatever repository produced the export and must never be
/// assumed valid in the target repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "crate::codec::current_version")]
    pub version: u32,

    #[serde(default)]
    pub exported_at: String,

    pub folders: Vec<Folder>,
    pub files: Vec<FileDoc>,
}

pub(crate) fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
