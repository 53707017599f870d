//! Generic hosted-content backend. Uploads land at `POST {base_url}/snapshots`
//! and come back from `GET {base_url}/snapshots/{id}`, authenticated with a
//! bearer token. The snapshot JSON is base64-wrapped for transport; the
//! logical snapshot inside is identical to what the local adapter writes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::model::Snapshot;

use super::{AdapterError, UploadReceipt};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostedConfig {
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    payload: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

pub struct HostedAdapter {
    config: HostedConfig,
    client: reqwest::blocking::Client,
}

impl HostedAdapter {
    pub const ID: &'static str = "hosted";

    pub fn new(config: HostedConfig) -> Result<Self, AdapterError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("satchel")
            .build()
            .map_err(|err| AdapterError::Transport {
                status: None,
                message: format!("build http client: {err}"),
            })?;
        Ok(Self { config, client })
    }

    /// Store or refresh the bearer token. Calling this when a token is
    /// already set just replaces it.
    pub fn authenticate(&mut self, token: &str) {
        self.config.token = Some(token.to_string());
    }

    pub fn is_authenticated(&self) -> bool {
        self.config.token.is_some()
    }

    pub fn encode_payload(&self, snapshot: &Snapshot) -> Result<String, AdapterError> {
        let inner = codec::to_json(snapshot)?;
        let envelope = Envelope {
            payload: BASE64.encode(inner.as_bytes()),
        };
        serde_json::to_string(&envelope)
            .map_err(|err| AdapterError::Envelope(format!("serialize envelope: {err}")))
    }

    pub fn decode_payload(&self, raw: &str) -> Result<Snapshot, AdapterError> {
        let envelope: Envelope = serde_json::from_str(raw)
            .map_err(|err| AdapterError::Envelope(format!("parse envelope: {err}")))?;
        let bytes = BASE64
            .decode(envelope.payload.as_bytes())
            .map_err(|err| AdapterError::Envelope(format!("decode base64 payload: {err}")))?;
        let inner = String::from_utf8(bytes)
            .map_err(|err| AdapterError::Envelope(format!("payload is not UTF-8: {err}")))?;
        Ok(codec::decode(&inner)?)
    }

    pub fn upload(&self, payload: &str) -> Result<UploadReceipt, AdapterError> {
        let auth = self.bearer()?;
        let resp = with_retries("upload snapshot", || {
            self.client
                .post(self.url("/snapshots"))
                .header(reqwest::header::AUTHORIZATION, &auth)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload.to_string())
                .send()
                .map_err(send_error)
        })?;
        let resp = ensure_ok(resp, "upload snapshot")?;
        let created: UploadResponse = resp.json().map_err(|err| AdapterError::Transport {
            status: None,
            message: format!("parse upload response: {err}"),
        })?;
        debug!(remote_id = %created.id, "snapshot uploaded");
        Ok(UploadReceipt {
            remote_id: created.id,
            remote_url: created.url,
        })
    }

    pub fn download(&self, remote_id: &str) -> Result<String, AdapterError> {
        let auth = self.bearer()?;
        let resp = with_retries("download snapshot", || {
            self.client
                .get(self.url(&format!("/snapshots/{remote_id}")))
                .header(reqwest::header::AUTHORIZATION, &auth)
                .send()
                .map_err(send_error)
        })?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound {
                remote_id: remote_id.to_string(),
            });
        }
        let resp = ensure_ok(resp, "download snapshot")?;
        resp.text().map_err(|err| AdapterError::Transport {
            status: None,
            message: format!("read download body: {err}"),
        })
    }

    fn bearer(&self) -> Result<String, AdapterError> {
        match &self.config.token {
            Some(token) => Ok(format!("Bearer {token}")),
            None => Err(AdapterError::Unauthenticated {
                message: "no token configured (authenticate first)".to_string(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

fn send_error(err: reqwest::Error) -> AdapterError {
    AdapterError::Transport {
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

/// Retry transient send failures with exponential backoff. Status handling
/// happens after, on the final response.
fn with_retries<T>(
    label: &str,
    mut f: impl FnMut() -> Result<T, AdapterError>,
) -> Result<T, AdapterError> {
    const ATTEMPTS: usize = 3;
    let mut last: Option<AdapterError> = None;
    for i in 0..ATTEMPTS {
        match f() {
            Ok(v) => return Ok(v),
            Err(err) => {
                last = Some(err);
                if i + 1 < ATTEMPTS {
                    std::thread::sleep(std::time::Duration::from_millis(200 * (1 << i)));
                }
            }
        }
    }
    Err(match last {
        Some(AdapterError::Transport { status, message }) => AdapterError::Transport {
            status,
            message: format!("{label}: {message}"),
        },
        Some(err) => err,
        None => AdapterError::Transport {
            status: None,
            message: format!("{label}: unknown error"),
        },
    })
}

fn ensure_ok(
    resp: reqwest::blocking::Response,
    label: &str,
) -> Result<reqwest::blocking::Response, AdapterError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let message = resp.text().unwrap_or_default();
        return Err(AdapterError::Unauthenticated {
            message: if message.is_empty() {
                format!("{label}: token invalid or expired")
            } else {
                message
            },
        });
    }
    if !status.is_success() {
        let message = resp.text().unwrap_or_default();
        return Err(AdapterError::Transport {
            status: Some(status.as_u16()),
            message: if message.is_empty() {
                label.to_string()
            } else {
                message
            },
        });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    fn adapter(token: Option<&str>) -> HostedAdapter {
        HostedAdapter::new(HostedConfig {
            base_url: "http://localhost:0".to_string(),
            token: token.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn envelope_roundtrip_preserves_snapshot() {
        let snapshot = codec::encode(
            &[crate::model::Folder {
                id: 7,
                name: "inbox".to_string(),
                parent_id: None,
                is_open: false,
            }],
            &[crate::model::FileDoc {
                id: 3,
                folder_id: Some(7),
                title: "note".to_string(),
                content: "body".to_string(),
                created_at: String::new(),
                updated_at: String::new(),
            }],
        );

        let a = adapter(Some("t"));
        let wrapped = a.encode_payload(&snapshot).unwrap();

        // The wire form is an envelope, not bare snapshot JSON.
        let value: serde_json::Value = serde_json::from_str(&wrapped).unwrap();
        assert!(value.get("payload").is_some_and(|p| p.is_string()));
        assert!(value.get("folders").is_none());

        let back = a.decode_payload(&wrapped).unwrap();
        assert_eq!(back.folders, snapshot.folders);
        assert_eq!(back.files, snapshot.files);
    }

    #[test]
    fn upload_without_token_fails_before_any_network_call() {
        let a = adapter(None);
        let err = a.upload("{}").unwrap_err();
        assert!(matches!(err, AdapterError::Unauthenticated { .. }));
    }

    #[test]
    fn authenticate_is_idempotent() {
        let mut a = adapter(Some("old"));
        a.authenticate("new");
        a.authenticate("new");
        assert!(a.is_authenticated());
    }

    #[test]
    fn garbage_envelope_is_rejected() {
        let a = adapter(Some("t"));
        assert!(matches!(
            a.decode_payload("not json"),
            Err(AdapterError::Envelope(_))
        ));
        assert!(matches!(
            a.decode_payload(r#"{"payload":"%%%not-base64%%%"}"#),
            Err(AdapterError::Envelope(_))
        ));
    }
}
