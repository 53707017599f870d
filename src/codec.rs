//! Snapshot encode/decode. Structural validation only; cross-reference
//! checks live in [`crate::reconcile`] so a snapshot can still be inspected
//! when its references are broken.

use thiserror::Error;

use crate::model::{FileDoc, Folder, Snapshot, now_rfc3339};

/// Current snapshot format version. Decode accepts anything up to and
/// including this; newer versions are rejected rather than guessed at.
pub const SNAPSHOT_VERSION: u32 = 1;

pub(crate) fn current_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("unsupported snapshot version {version} (max supported {SNAPSHOT_VERSION})")]
    UnsupportedVersion { version: u64 },
}

/// Build a snapshot from live workspace state. Pure except for the
/// `exported_at` stamp; input order of folders and files is preserved.
pub fn encode(folders: &[Folder], files: &[FileDoc]) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION,
        exported_at: now_rfc3339(),
        folders: folders.to_vec(),
        files: files.to_vec(),
    }
}

pub fn to_json(snapshot: &Snapshot) -> Result<String, CodecError> {
    serde_json::to_string(snapshot)
        .map_err(|err| CodecError::MalformedSnapshot(format!("serialize snapshot: {err}")))
}

/// Pretty form, used for local exports so they diff cleanly.
pub fn to_json_pretty(snapshot: &Snapshot) -> Result<String, CodecError> {
    serde_json::to_string_pretty(snapshot)
        .map_err(|err| CodecError::MalformedSnapshot(format!("serialize snapshot: {err}")))
}

/// Parse a serialized snapshot.
///
/// The version guard runs before element-shape validation so a snapshot from
/// a future format still reports `UnsupportedVersion` with the offending
/// number instead of a misleading shape error. Unknown fields anywhere in the
/// document are ignored.
pub fn decode(raw: &str) -> Result<Snapshot, CodecError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|err| CodecError::MalformedSnapshot(format!("not valid JSON: {err}")))?;

    let Some(obj) = value.as_object() else {
        return Err(CodecError::MalformedSnapshot(
            "top level is not an object".to_string(),
        ));
    };

    if let Some(version) = obj.get("version") {
        let version = version.as_u64().ok_or_else(|| {
            CodecError::MalformedSnapshot("`version` is not an integer".to_string())
        })?;
        if version > u64::from(SNAPSHOT_VERSION) {
            return Err(CodecError::UnsupportedVersion { version });
        }
    }

    for key in ["folders", "files"] {
        match obj.get(key) {
            Some(serde_json::Value::Array(_)) => {}
            Some(_) => {
                return Err(CodecError::MalformedSnapshot(format!(
                    "`{key}` is not an array"
                )));
            }
            None => {
                return Err(CodecError::MalformedSnapshot(format!("missing `{key}`")));
            }
        }
    }

    serde_json::from_value(value)
        .map_err(|err| CodecError::MalformedSnapshot(format!("snapshot shape: {err}")))
}
