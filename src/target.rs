//! Canonical call target derived from any accepted input shape.

use std::fmt;

use url::Url;

use crate::Error;

/// Scheme of a call target. Decides which transport handles the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Plain transport.
    Http,
    /// TLS-capable transport.
    Https,
}

/// A parsed absolute http(s) URL.
///
/// Whatever shape the call started from (string, [`Url`], request
/// object), this is what the transport invoker sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    url: Url,
    scheme: Scheme,
}

impl TargetUrl {
    /// Parses an absolute URL string.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let url = Url::parse(input).map_err(|_| Error::BadInput(input.to_string()))?;
        TargetUrl::from_url(url)
    }

    /// Accepts an already-parsed URL.
    pub fn from_url(url: Url) -> Result<Self, Error> {
        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            _ => return Err(Error::BadInput(url.to_string())),
        };
        if url.host_str().is_none() {
            return Err(Error::BadInput(url.to_string()));
        }
        Ok(TargetUrl { url, scheme })
    }

    /// The scheme, driving transport selection.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The host.
    pub fn host(&self) -> &str {
        // Checked in from_url().
        self.url.host_str().unwrap_or("")
    }

    /// The port, falling back to the scheme default (80/443).
    pub fn port(&self) -> u16 {
        self.url.port_or_known_default().unwrap_or(match self.scheme {
            Scheme::Http => 80,
            Scheme::Https => 443,
        })
    }

    /// The path handed to the transport: path, query and fragment
    /// concatenated in that order.
    pub fn request_path(&self) -> String {
        let mut path = self.url.path().to_string();
        if let Some(query) = self.url.query() {
            path.push('?');
            path.push_str(query);
        }
        if let Some(fragment) = self.url.fragment() {
            path.push('#');
            path.push_str(fragment);
        }
        path
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
