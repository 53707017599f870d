use std::fs;
use std::path::Path;

use crate::codec;
use crate::model::Snapshot;
use crate::repo::local::write_atomic;

use super::AdapterError;

/// Local-file backend: plain pretty-printed snapshot JSON, no transport, no
/// credentials. The payload is the file contents verbatim.
#[derive(Debug, Default)]
pub struct LocalAdapter;

impl LocalAdapter {
    pub const ID: &'static str = "local";

    pub fn encode_payload(&self, snapshot: &Snapshot) -> Result<String, AdapterError> {
        Ok(codec::to_json_pretty(snapshot)?)
    }

    pub fn decode_payload(&self, raw: &str) -> Result<Snapshot, AdapterError> {
        Ok(codec::decode(raw)?)
    }

    pub fn save(&self, path: &Path, payload: &str) -> Result<(), AdapterError> {
        write_atomic(path, payload.as_bytes())?;
        Ok(())
    }

    pub fn load(&self, path: &Path) -> Result<String, AdapterError> {
        Ok(fs::read_to_string(path)?)
    }
}
