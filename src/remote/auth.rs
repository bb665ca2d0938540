//! Access credentials and host-restricted authorization.

use reqwest::Url;
use std::fmt;

/// A bearer credential for the hosting API.
///
/// The token value is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    /// Wrap a token; blank tokens yield `None`.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self { token })
        }
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Decides which request URLs may receive the credential.
///
/// Trusted hosts only receive it over https. Plain http is allowed for a
/// single origin, the API base itself, when that base was configured as
/// http (a local mirror).
#[derive(Debug, Clone)]
pub struct HostPolicy {
    trusted: Vec<String>,
    plain_origin: Option<(String, Option<u16>)>,
}

impl HostPolicy {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut trusted: Vec<String> = hosts
            .into_iter()
            .map(|h| h.into().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        trusted.sort();
        trusted.dedup();
        Self {
            trusted,
            plain_origin: None,
        }
    }

    /// Allow plain http to `api_url`'s exact host and port if it is http.
    pub fn with_api_origin(mut self, api_url: &Url) -> Self {
        if api_url.scheme() == "http" {
            self.plain_origin = api_url
                .host_str()
                .map(|host| (host.to_ascii_lowercase(), api_url.port_or_known_default()));
        }
        self
    }

    /// Check whether a URL's scheme and host are trusted.
    pub fn allows(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        match url.scheme() {
            "https" => self.trusted.iter().any(|t| *t == host),
            "http" => self
                .plain_origin
                .as_ref()
                .is_some_and(|(h, port)| *h == host && *port == url.port_or_known_default()),
            _ => false,
        }
    }

    /// Header value to attach for a URL, if any.
    pub fn authorization_for(&self, url: &Url, credential: Option<&Credential>) -> Option<String> {
        match credential {
            Some(c) if self.allows(url) => Some(c.header_value()),
            _ => None,
        }
    }
}
