//! Fetch-style call surface.
//!
//! A [`Client`] owns two [`Transport`]s, one plain and one
//! TLS-capable, and exposes `fetch` plus per-verb shorthands. A call
//! runs through four steps:
//!
//! * **Normalize** - resolve the input shape (URL string, parsed
//!   [`Url`], or [`FetchRequest`]) into one canonical
//!   `(TargetUrl, RequestConfig)` pair, converting Headers-like
//!   mappings to a plain [`HeaderMap`][http::HeaderMap] and draining
//!   stream bodies to bytes.
//! * **Merge** - defaults < per-call config < fields carried by a
//!   request object, last writer wins, headers replaced wholesale.
//! * **Invoke** - select the transport by scheme and drive the
//!   exchange event loop, accumulating chunks in arrival order and
//!   feeding the optional `on_data` observer.
//! * **Materialize** - classify the outcome and build the
//!   [`Response`] with its lazy decode methods.
//!
//! Each call settles exactly once, moving through these states:
//!
//! ```text
//!     ┌──────────────────┐
//!     │       Idle       │
//!     └──────────────────┘
//!               │
//!               ▼
//!     ┌──────────────────┐      ┌──────────────────┐
//!  ┌──│     Sending      │─────▶│     Errored      │
//!  │  └──────────────────┘      └──────────────────┘
//!  │            │                         ▲
//!  │            ▼                         │
//!  │  ┌──────────────────┐◀─┐             │
//!  ├──│    Streaming     │──┼─────────────┘
//!  │  └──────────────────┘ chunk
//!  │            │
//!  │            ▼
//!  │  ┌──────────────────┐      ┌──────────────────┐
//!  │  │    Completed     │      │     TimedOut     │
//!  │  └──────────────────┘      └──────────────────┘
//!  │                                      ▲
//!  └──────────────────────────────────────┘
//! ```
//!
//! Timeout forces teardown of the exchange before the call settles.
//!
//! # Example
//!
//! ```no_run
//! use fetch_proto::client::Client;
//! use fetch_proto::RequestConfig;
//!
//! # fn transports() -> (Box<dyn fetch_proto::transport::Transport>, Box<dyn fetch_proto::transport::Transport>) { unimplemented!() }
//! let (plain, secure) = transports();
//! let mut client = Client::new(plain, secure);
//!
//! let response = client
//!     .get("http://example.com/search?q=1", RequestConfig::default())
//!     .unwrap();
//!
//! assert_eq!(response.status(), 200);
//! let body = response.text().unwrap();
//! # let _ = body;
//! ```

use http::Method;
use url::Url;

use crate::config::{Body, FetchRequest, RequestConfig};
use crate::target::{Scheme, TargetUrl};
use crate::transport::Transport;
use crate::{Error, Response};

mod call;

#[cfg(test)]
mod test;

/// The accepted input shapes for a call.
///
/// Anything else is not a URL; string inputs that do not parse as an
/// absolute http(s) URL fail with status 400 before any transport is
/// touched.
#[derive(Debug)]
pub enum FetchInput {
    /// An absolute URL string.
    Text(String),
    /// An already-parsed URL.
    Url(Url),
    /// A request object carrying its own config fields.
    Request(FetchRequest),
}

impl From<&str> for FetchInput {
    fn from(value: &str) -> Self {
        FetchInput::Text(value.to_string())
    }
}

impl From<String> for FetchInput {
    fn from(value: String) -> Self {
        FetchInput::Text(value)
    }
}

impl From<Url> for FetchInput {
    fn from(value: Url) -> Self {
        FetchInput::Url(value)
    }
}

impl From<FetchRequest> for FetchInput {
    fn from(value: FetchRequest) -> Self {
        FetchInput::Request(value)
    }
}

/// A fetch client over a pair of caller-supplied transports.
pub struct Client {
    plain: Box<dyn Transport>,
    secure: Box<dyn Transport>,
}

impl Client {
    /// Creates a client. `plain` handles `http` targets, `secure`
    /// handles `https`.
    pub fn new(plain: Box<dyn Transport>, secure: Box<dyn Transport>) -> Self {
        Client { plain, secure }
    }

    /// Issues a request and blocks until the call settles.
    pub fn fetch(
        &mut self,
        input: impl Into<FetchInput>,
        config: RequestConfig,
    ) -> Result<Response, Error> {
        let (target, config) = normalize(input.into(), config)?;

        let transport = match target.scheme() {
            Scheme::Http => &mut *self.plain,
            Scheme::Https => &mut *self.secure,
        };

        call::invoke(transport, &target, config)
    }

    /// `fetch` with the method forced to GET.
    pub fn get(
        &mut self,
        input: impl Into<FetchInput>,
        config: RequestConfig,
    ) -> Result<Response, Error> {
        self.with_method(Method::GET, input, config)
    }

    /// `fetch` with the method forced to POST.
    pub fn post(
        &mut self,
        input: impl Into<FetchInput>,
        config: RequestConfig,
    ) -> Result<Response, Error> {
        self.with_method(Method::POST, input, config)
    }

    /// `fetch` with the method forced to PUT.
    pub fn put(
        &mut self,
        input: impl Into<FetchInput>,
        config: RequestConfig,
    ) -> Result<Response, Error> {
        self.with_method(Method::PUT, input, config)
    }

    /// `fetch` with the method forced to PATCH.
    pub fn patch(
        &mut self,
        input: impl Into<FetchInput>,
        config: RequestConfig,
    ) -> Result<Response, Error> {
        self.with_method(Method::PATCH, input, config)
    }

    /// `fetch` with the method forced to DELETE.
    pub fn delete(
        &mut self,
        input: impl Into<FetchInput>,
        config: RequestConfig,
    ) -> Result<Response, Error> {
        self.with_method(Method::DELETE, input, config)
    }

    /// `fetch` with the method forced to HEAD.
    pub fn head(
        &mut self,
        input: impl Into<FetchInput>,
        config: RequestConfig,
    ) -> Result<Response, Error> {
        self.with_method(Method::HEAD, input, config)
    }

    // The per-verb entry points force the method and pass the rest of
    // the config through unchanged.
    fn with_method(
        &mut self,
        method: Method,
        input: impl Into<FetchInput>,
        mut config: RequestConfig,
    ) -> Result<Response, Error> {
        config.method = method;
        self.fetch(input, config)
    }
}

/// Resolves the input shape and config into one canonical pair.
///
/// Bad input stops the call here, before any transport is touched.
fn normalize(
    input: FetchInput,
    mut config: RequestConfig,
) -> Result<(TargetUrl, RequestConfig), Error> {
    let target = match input {
        FetchInput::Text(v) => TargetUrl::parse(&v)?,
        FetchInput::Url(v) => TargetUrl::from_url(v)?,
        FetchInput::Request(v) => {
            // URL comes from the request's own field; config fields
            // carried by the request win over the per-call config.
            let target = TargetUrl::parse(&v.url)?;
            config.absorb(v)?;
            target
        }
    };

    // Stream bodies are fully drained before the request is issued.
    // No streamed upload.
    if let Some(body) = config.body.take() {
        config.body = Some(Body::Bytes(body.into_bytes()?));
    }

    debug!("normalized: {} {}", config.method, target);

    Ok((target, config))
}
