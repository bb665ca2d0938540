//! Version extraction and ordering.

use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

static HEADER_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Version:\s*(\S+)").unwrap());

/// Extract the token following the first `Version:` header.
pub fn extract_header_version(text: &str) -> Option<String> {
    HEADER_VERSION
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse a version token leniently.
///
/// Accepts a leading `v`, and one or two numeric components (`1`, `1.2`)
/// which are padded to three. Anything else that is not valid semver is
/// rejected.
pub fn parse_version(token: &str) -> Option<Version> {
    let token = token.trim();
    let token = token.strip_prefix('v').unwrap_or(token);
    if token.is_empty() {
        return None;
    }

    let split = token.find(['-', '+']).unwrap_or(token.len());
    let (core, rest) = token.split_at(split);

    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty()
        || parts.len() > 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let mut padded: Vec<&str> = parts;
    while padded.len() < 3 {
        padded.push("0");
    }

    Version::parse(&format!("{}{}", padded.join("."), rest)).ok()
}

/// Whether `remote` is newer than `stored` under semver ordering.
///
/// An empty `stored` counts as `0.0.0`. Returns the offending token if
/// either side cannot be parsed.
pub fn is_newer_version(stored: &str, remote: &str) -> Result<bool, String> {
    let remote_version = parse_version(remote).ok_or_else(|| remote.to_string())?;
    let stored_version = if stored.trim().is_empty() {
        Version::new(0, 0, 0)
    } else {
        parse_version(stored).ok_or_else(|| stored.to_string())?
    };
    Ok(stored_version < remote_version)
}
