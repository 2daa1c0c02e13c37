//! Parsed file names (`scheme://[user@]host[:port]/path`)

use std::fmt;

use url::Url;

use crate::error::{ClusterVfsError, Result};

/// A parsed, normalized file name addressed to a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileName {
    /// Lower-cased scheme; empty when unknown
    pub scheme: String,
    pub user_info: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Absolute path, always starting with `/`
    pub path: String,
}

impl FileName {
    /// Parse an absolute URI.
    ///
    /// Fails with `MalformedAddress` if the input is not an absolute URI.
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri.trim()).map_err(|e| ClusterVfsError::MalformedAddress {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        let user_info = match (url.username(), url.password()) {
            ("", None) => None,
            (user, None) => Some(user.to_string()),
            (user, Some(password)) => Some(format!("{}:{}", user, password)),
        };

        Ok(Self {
            scheme: url.scheme().to_ascii_lowercase(),
            user_info,
            host: url.host_str().filter(|h| !h.is_empty()).map(str::to_string),
            port: url.port(),
            path: normalize_path(url.path()),
        })
    }

    /// Port as the integer the resolver expects; 0 when absent
    pub fn port_or_zero(&self) -> u16 {
        self.port.unwrap_or(0)
    }

    /// The root of the filesystem this name lives in
    pub fn root(&self) -> Self {
        self.with_path("/")
    }

    /// Same scheme and authority, different path
    pub fn with_path(&self, path: &str) -> Self {
        Self {
            path: normalize_path(path),
            ..self.clone()
        }
    }

    /// Rendered authority: `[user@]host[:port]`
    pub fn authority(&self) -> String {
        let mut authority = String::with_capacity(32);
        if let Some(user_info) = &self.user_info {
            authority.push_str(user_info);
            authority.push('@');
        }
        if let Some(host) = &self.host {
            authority.push_str(host);
        }
        if let Some(port) = self.port {
            authority.push(':');
            authority.push_str(&port.to_string());
        }
        authority
    }

    /// Full normalized URI
    pub fn uri(&self) -> String {
        format!("{}://{}{}", self.scheme, self.authority(), self.path)
    }

    pub fn root_uri(&self) -> String {
        self.root().uri()
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

/// Collapse duplicate and trailing separators, resolve `.` and `..`
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}
