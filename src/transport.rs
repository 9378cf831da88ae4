//! Contract between the client core and the byte-level transport.
//!
//! The core never touches sockets, TLS or wire framing. It hands a
//! [`TransportRequest`] to a [`Transport`] and then pulls
//! [`Event`]s off the returned [`Exchange`] until the call settles.
//! Two transport implementations are expected per
//! [`Client`][crate::client::Client]: one for plain `http` and one
//! TLS-capable for `https`.
//!
//! Implementations block in [`Exchange::next_event`] until something
//! happens or the deadline passes, whichever comes first. The core
//! enforces the call timeout solely through that deadline and through
//! [`Exchange::abort`].

use std::fmt;
use std::time::{Duration, Instant};

use http::{HeaderMap, Method, StatusCode};

use crate::config::{AbortSignal, Agent};

/// Everything the transport needs to put a request on the wire.
///
/// `silent` and `on_data` never appear here. They are control-plane
/// fields the invoker consumes locally.
pub struct TransportRequest<'a> {
    /// Target host.
    pub host: &'a str,
    /// Target port (scheme default when the URL named none).
    pub port: u16,
    /// Concatenated path, query and fragment, in that order.
    pub path: &'a str,
    /// HTTP verb.
    pub method: &'a Method,
    /// Request headers, already normalized. Includes the rendered
    /// `Authorization` header when the call carried basic auth.
    pub headers: &'a HeaderMap,
    /// Request body, pre-drained to bytes.
    pub body: Option<&'a [u8]>,
    /// The call timeout. The invoker enforces it via the event
    /// deadline; transports may additionally use it when connecting.
    pub timeout: Duration,
    /// Opaque connection-reuse handle supplied by the caller.
    pub agent: Option<&'a Agent>,
    /// Abort signal, forwarded opaquely. Honoring it is the
    /// transport's responsibility, not the core's.
    pub signal: Option<&'a AbortSignal>,
}

impl fmt::Debug for TransportRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportRequest")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("method", &self.method)
            .field("body", &self.body.map(|b| b.len()))
            .finish()
    }
}

/// Status line and headers of a streaming response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    /// Response status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
}

/// Error reported by the transport layer.
///
/// The code is whatever the transport maps its failure to. It becomes
/// the status of the resulting [`Error`][crate::Error]; codes that are
/// not HTTP statuses get an empty status text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    code: u16,
    message: String,
}

impl TransportError {
    /// Creates a new transport error.
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        TransportError {
            code,
            message: message.into(),
        }
    }

    /// The transport's error code.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The transport's error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

/// One event in a streaming response.
#[derive(Debug, Clone)]
pub enum Event {
    /// Status line and headers arrived.
    Head(ResponseHead),
    /// One chunk of body data, in arrival order. Chunked framing is
    /// the transport's concern; the core only sees de-framed bytes.
    Chunk(Vec<u8>),
    /// End of body. The exchange is done.
    End,
    /// Transport-level failure. The exchange is dead.
    Error(TransportError),
    /// The deadline passed before anything happened.
    TimedOut,
}

/// An in-flight request/response exchange.
pub trait Exchange {
    /// Blocks until the next event or until `deadline`, whichever
    /// comes first. Must return [`Event::TimedOut`] in the latter
    /// case.
    fn next_event(&mut self, deadline: Instant) -> Event;

    /// Tears down the in-flight request. No further events are
    /// observed after this returns.
    fn abort(&mut self);
}

/// A byte-level request/response delivery mechanism.
pub trait Transport {
    /// Issues a request, returning the streaming exchange.
    ///
    /// Failing to even start (e.g. connection refused) is reported as
    /// a [`TransportError`] here rather than through an event.
    fn start(&mut self, request: TransportRequest<'_>) -> Result<Box<dyn Exchange>, TransportError>;
}
