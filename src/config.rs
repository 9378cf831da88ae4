//! Per-call configuration and the merge rules around it.

use std::any::Any;
use std::fmt;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue, Method};

use crate::Error;

/// Timeout applied when the caller names none.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Callback invoked once per received body chunk, in arrival order,
/// with exactly the bytes of that chunk.
pub type ChunkObserver = Box<dyn FnMut(&[u8]) + Send>;

/// A request body.
///
/// Readers are fully drained to bytes before the request is issued.
/// There is no streamed upload; the pre-drain is a deliberate
/// simplification.
pub enum Body {
    /// UTF-8 text payload.
    Text(String),
    /// Raw byte payload.
    Bytes(Vec<u8>),
    /// A readable stream, drained before sending.
    Reader(Box<dyn Read + Send>),
}

impl Body {
    /// Drains the body to bytes. For [`Body::Reader`] this blocks
    /// until the stream ends.
    pub(crate) fn into_bytes(self) -> Result<Vec<u8>, Error> {
        match self {
            Body::Text(v) => Ok(v.into_bytes()),
            Body::Bytes(v) => Ok(v),
            Body::Reader(mut r) => {
                let mut buf = Vec::new();
                r.read_to_end(&mut buf)
                    .map_err(|e| Error::BodyRead(e.to_string()))?;
                trace!("drained reader body: {} bytes", buf.len());
                Ok(buf)
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Text(v) => write!(f, "Body::Text({} bytes)", v.len()),
            Body::Bytes(v) => write!(f, "Body::Bytes({} bytes)", v.len()),
            Body::Reader(_) => write!(f, "Body::Reader"),
        }
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::Text(value.to_string())
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Text(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::Bytes(value)
    }
}

impl From<&[u8]> for Body {
    fn from(value: &[u8]) -> Self {
        Body::Bytes(value.to_vec())
    }
}

/// A Headers-like mapping: ordered name/value pairs iterable via
/// [`entries()`][Headers::entries].
///
/// This is the loosely typed shape a [`FetchRequest`] carries. It is
/// normalized to a plain [`HeaderMap`] before any merging happens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Headers(Vec::new())
    }

    /// Appends a name/value pair.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Iterates the name/value pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Converts to a plain [`HeaderMap`], validating each pair.
    pub fn to_header_map(&self) -> Result<HeaderMap, Error> {
        let mut map = HeaderMap::new();
        for (name, value) in self.entries() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::BadHeader(name.to_string()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| Error::BadHeader(value.to_string()))?;
            map.append(name, value);
        }
        Ok(map)
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Headers(iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect())
    }
}

/// Opaque connection-reuse handle.
///
/// The core forwards it to the transport untouched. Whatever pooling
/// or keep-alive policy it encodes is between caller and transport.
#[derive(Clone)]
pub struct Agent(Arc<dyn Any + Send + Sync>);

impl Agent {
    /// Wraps a transport-specific handle.
    pub fn new<T: Any + Send + Sync>(handle: T) -> Self {
        Agent(Arc::new(handle))
    }

    /// Downcasts back to the transport-specific type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent")
    }
}

/// Abort signal, forwarded opaquely to the transport.
///
/// The core never checks it. A pre-aborted signal behaves however the
/// transport decides; the only cancellation the core drives itself is
/// the timeout teardown.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    /// Creates a signal in the non-aborted state.
    pub fn new() -> Self {
        AbortSignal::default()
    }

    /// Flags the signal as aborted.
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the signal has been aborted.
    pub fn aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configuration for one call.
///
/// [`RequestConfig::default()`] is a pure factory. Each call starts
/// from a fresh snapshot; there is no shared mutable baseline, so a
/// config mutated by one call can never leak into another.
pub struct RequestConfig {
    /// Request headers. A caller-supplied map replaces the default
    /// empty map wholesale; headers are never deep-merged.
    pub headers: HeaderMap,
    /// Time before the in-flight request is torn down, default 5s.
    pub timeout: Duration,
    /// Opaque connection-reuse handle passed to the transport.
    pub agent: Option<Agent>,
    /// Basic-auth credential, `user:pass`. Rendered as an
    /// `Authorization: Basic` header when the request is issued.
    pub auth: Option<String>,
    /// Request payload. Readers are pre-drained.
    pub body: Option<Body>,
    /// HTTP verb. Always populated; the per-verb entry points force it.
    pub method: Method,
    /// Incremental chunk observer. Consumed locally, never forwarded
    /// to the transport.
    pub on_data: Option<ChunkObserver>,
    /// When true, a non-2xx status does not fail the call.
    pub silent: bool,
    /// Abort signal, opaque passthrough to the transport.
    pub signal: Option<AbortSignal>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        RequestConfig {
            headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            agent: None,
            auth: None,
            body: None,
            method: Method::GET,
            on_data: None,
            silent: false,
            signal: None,
        }
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("auth", &self.auth.as_deref().map(|_| "***"))
            .field("body", &self.body)
            .field("silent", &self.silent)
            .field("on_data", &self.on_data.is_some())
            .finish()
    }
}

impl RequestConfig {
    /// Copies the config fields a [`FetchRequest`] carries onto this
    /// config, last writer wins.
    ///
    /// This is an explicit allow-list: only the known fields below are
    /// copied, and only when present. `body_used` is fetch bookkeeping
    /// with no transport meaning and is dropped here.
    pub(crate) fn absorb(&mut self, request: FetchRequest) -> Result<(), Error> {
        let FetchRequest {
            url: _,
            method,
            headers,
            body,
            timeout,
            auth,
            agent,
            signal,
            body_used: _,
        } = request;

        if let Some(v) = method {
            self.method = v;
        }
        if let Some(v) = headers {
            // Headers-like to plain mapping, replacing wholesale.
            self.headers = v.to_header_map()?;
        }
        if let Some(v) = body {
            self.body = Some(v);
        }
        if let Some(v) = timeout {
            self.timeout = v;
        }
        if let Some(v) = auth {
            self.auth = Some(v);
        }
        if let Some(v) = agent {
            self.agent = Some(v);
        }
        if let Some(v) = signal {
            self.signal = Some(v);
        }

        Ok(())
    }
}

/// Request-like input: a URL plus whatever config fields it carries.
///
/// Fields left `None` do not overwrite the per-call config during the
/// merge.
#[derive(Debug, Default)]
pub struct FetchRequest {
    /// Absolute target URL.
    pub url: String,
    /// HTTP verb, if the request names one.
    pub method: Option<Method>,
    /// Headers-like mapping, normalized before merging.
    pub headers: Option<Headers>,
    /// Request payload.
    pub body: Option<Body>,
    /// Per-call timeout.
    pub timeout: Option<Duration>,
    /// Basic-auth credential.
    pub auth: Option<String>,
    /// Connection-reuse handle.
    pub agent: Option<Agent>,
    /// Abort signal.
    pub signal: Option<AbortSignal>,
    /// Fetch bookkeeping flag. Never forwarded to the transport.
    pub body_used: bool,
}

impl FetchRequest {
    /// Creates a request for the given URL with no carried config.
    pub fn new(url: impl Into<String>) -> Self {
        FetchRequest {
            url: url.into(),
            ..Default::default()
        }
    }
}
