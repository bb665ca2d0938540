//! Typed payloads for the hosting API endpoints.
//!
//! Responses are deserialized into raw shapes first and then validated,
//! so a missing or malformed field becomes an `Unavailable` error instead
//! of a silently defaulted value.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UpkeepError};

/// Encoding marker the contents endpoint uses for inline file bodies.
pub const BASE64_ENCODING: &str = "base64";

/// Raw shape of `GET /repos/{repo}/contents/{path}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentsPayload {
    pub content: Option<String>,
    pub encoding: Option<String>,
}

/// Decoded file content at a ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent(pub Vec<u8>);

impl FileContent {
    /// Content as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl ContentsPayload {
    pub(crate) fn decode(self) -> Result<FileContent> {
        let encoding = self
            .encoding
            .ok_or_else(|| UpkeepError::unavailable("contents response has no encoding"))?;
        if encoding != BASE64_ENCODING {
            return Err(UpkeepError::unavailable(format!(
                "unsupported content encoding '{}'",
                encoding
            )));
        }
        let content = self
            .content
            .ok_or_else(|| UpkeepError::unavailable("contents response has no content"))?;

        // The API wraps base64 bodies at 60 columns.
        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| UpkeepError::unavailable(format!("invalid base64 content: {}", e)))?;
        Ok(FileContent(bytes))
    }
}

/// A downloadable asset attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Raw shape of `GET /repos/{repo}/releases/latest`.
#[derive(Debug, Deserialize)]
pub(crate) struct ReleasePayload {
    pub tag_name: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// The most recent tagged release of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    /// Tag exactly as published (may carry a leading `v`).
    pub tag: String,
    /// Human-facing release page.
    pub html_url: Option<String>,
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseMetadata {
    /// Tag with a single leading `v` removed.
    pub fn version(&self) -> &str {
        self.tag.strip_prefix('v').unwrap_or(&self.tag)
    }
}

impl ReleasePayload {
    pub(crate) fn validate(self) -> Result<ReleaseMetadata> {
        let tag = self
            .tag_name
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| UpkeepError::unavailable("release response has no tag_name"))?;
        Ok(ReleaseMetadata {
            tag,
            html_url: self.html_url,
            assets: self.assets,
        })
    }
}

/// Raw shape of `GET /repos/{repo}/commits/{ref}`.
#[derive(Debug, Deserialize)]
pub(crate) struct CommitPayload {
    pub sha: Option<String>,
}

/// A full commit identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(pub String);

impl CommitId {
    /// The seven-character form used for display.
    pub fn short(&self) -> &str {
        short_sha(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CommitPayload {
    pub(crate) fn validate(self) -> Result<CommitId> {
        match self.sha {
            Some(sha) if !sha.is_empty() && sha.chars().all(|c| c.is_ascii_hexdigit()) => {
                Ok(CommitId(sha))
            }
            Some(sha) => Err(UpkeepError::unavailable(format!(
                "commit response has malformed sha '{}'",
                sha
            ))),
            None => Err(UpkeepError::unavailable("commit response has no sha")),
        }
    }
}

/// First seven characters of a commit identifier.
pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wrapped_base64_content() {
        let payload = ContentsPayload {
            content: Some("VmVyc2lv\nbjogMS4w\nLjMK".to_string()),
            encoding: Some("base64".to_string()),
        };
        let content = payload.decode().unwrap();
        assert_eq!(content.text(), "Version: 1.0.3\n");
    }

    #[test]
    fn rejects_unknown_encoding() {
        let payload = ContentsPayload {
            content: Some("plain".to_string()),
            encoding: Some("utf-8".to_string()),
        };
        let err = payload.decode().unwrap_err();
        assert!(matches!(err, UpkeepError::Unavailable { .. }));
    }

    #[test]
    fn rejects_missing_content() {
        let payload = ContentsPayload {
            content: None,
            encoding: Some("base64".to_string()),
        };
        assert!(payload.decode().is_err());
    }

    #[test]
    fn rejects_invalid_base64() {
        let payload = ContentsPayload {
            content: Some("***".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert!(payload.decode().is_err());
    }

    #[test]
    fn release_requires_tag() {
        let payload: ReleasePayload =
            serde_json::from_str(r#"{"html_url": "https://example.test"}"#).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn release_parses_assets_and_strips_v() {
        let payload: ReleasePayload = serde_json::from_str(
            r#"{
                "tag_name": "v2.1.0",
                "html_url": "https://github.com/acme/widget/releases/tag/v2.1.0",
                "assets": [{"name": "widget.zip", "browser_download_url": "https://example.test/widget.zip"}]
            }"#,
        )
        .unwrap();
        let release = payload.validate().unwrap();
        assert_eq!(release.tag, "v2.1.0");
        assert_eq!(release.version(), "2.1.0");
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].name, "widget.zip");
    }

    #[test]
    fn commit_requires_hex_sha() {
        let ok: CommitPayload = serde_json::from_str(r#"{"sha": "def5678abc"}"#).unwrap();
        assert_eq!(ok.validate().unwrap().short(), "def5678");

        let bad: CommitPayload = serde_json::from_str(r#"{"sha": "not a sha"}"#).unwrap();
        assert!(bad.validate().is_err());

        let missing: CommitPayload = serde_json::from_str(r#"{"message": "x"}"#).unwrap();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn short_sha_handles_short_input() {
        assert_eq!(short_sha("abc"), "abc");
        assert_eq!(short_sha("abc1234def"), "abc1234");
    }
}
