//! Storage adapters pair the snapshot codec with an optional remote
//! transport. The set of backends is closed and known at compile time;
//! callers branch on [`Capabilities`] instead of probing with calls that
//! might fail.

use thiserror::Error;

use crate::codec::CodecError;
use crate::model::Snapshot;

mod hosted;
mod local;
mod registry;

pub use self::hosted::{HostedAdapter, HostedConfig};
pub use self::local::LocalAdapter;
pub use self::registry::{AdapterRegistry, RegistryError};

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Required credentials are absent or were rejected by the backend.
    #[error("not authenticated: {message}")]
    Unauthenticated { message: String },

    /// Network or backend failure, with whatever status/detail the backend
    /// gave us so the caller can display it.
    #[error("transport failure{}: {message}", fmt_status(*status))]
    Transport { status: Option<u16>, message: String },

    #[error("remote snapshot {remote_id} not found")]
    NotFound { remote_id: String },

    /// Backend-specific framing around the snapshot could not be unwrapped.
    #[error("bad payload envelope: {0}")]
    Envelope(String),

    #[error("adapter `{adapter}` does not support {op}")]
    Unsupported { adapter: &'static str, op: &'static str },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_status(status: Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

/// Which optional operations an adapter provides. Encode/decode are always
/// present and are not listed here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub upload: bool,
    pub download: bool,
    pub authenticate: bool,
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub remote_id: String,
    pub remote_url: Option<String>,
}

/// The closed set of storage backends. One shared reconciliation engine and
/// one logical snapshot format sit behind every variant; only the transport
/// and payload framing differ.
pub enum StorageAdapter {
    Local(LocalAdapter),
    Hosted(HostedAdapter),
}

impl StorageAdapter {
    pub fn id(&self) -> &'static str {
        match self {
            StorageAdapter::Local(_) => LocalAdapter::ID,
            StorageAdapter::Hosted(_) => HostedAdapter::ID,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StorageAdapter::Local(_) => "Local file",
            StorageAdapter::Hosted(_) => "Hosted content",
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            StorageAdapter::Local(_) => Capabilities::default(),
            StorageAdapter::Hosted(_) => Capabilities {
                upload: true,
                download: true,
                authenticate: true,
            },
        }
    }

    /// Serialize a snapshot into this adapter's transport payload. The
    /// logical snapshot is identical across adapters; only the framing
    /// differs.
    pub fn encode_payload(&self, snapshot: &Snapshot) -> Result<String, AdapterError> {
        match self {
            StorageAdapter::Local(a) => a.encode_payload(snapshot),
            StorageAdapter::Hosted(a) => a.encode_payload(snapshot),
        }
    }

    /// Unwrap this adapter's framing and decode the snapshot inside.
    pub fn decode_payload(&self, raw: &str) -> Result<Snapshot, AdapterError> {
        match self {
            StorageAdapter::Local(a) => a.decode_payload(raw),
            StorageAdapter::Hosted(a) => a.decode_payload(raw),
        }
    }

    pub fn upload(&self, payload: &str) -> Result<UploadReceipt, AdapterError> {
        match self {
            StorageAdapter::Local(_) => Err(AdapterError::Unsupported {
                adapter: self.id(),
                op: "upload",
            }),
            StorageAdapter::Hosted(a) => a.upload(payload),
        }
    }

    pub fn download(&self, remote_id: &str) -> Result<String, AdapterError> {
        match self {
            StorageAdapter::Local(_) => Err(AdapterError::Unsupported {
                adapter: self.id(),
                op: "download",
            }),
            StorageAdapter::Hosted(a) => a.download(remote_id),
        }
    }

    /// Store or refresh credentials. Idempotent: authenticating while
    /// already authenticated is a refresh, never an error.
    pub fn authenticate(&mut self, token: &str) -> Result<(), AdapterError> {
        match self {
            StorageAdapter::Local(_) => Err(AdapterError::Unsupported {
                adapter: self.id(),
                op: "authenticate",
            }),
            StorageAdapter::Hosted(a) => {
                a.authenticate(token);
                Ok(())
            }
        }
    }
}
