//! The transport invoker: one call, driven to a terminal state.

use std::time::Instant;

use base64::prelude::{Engine, BASE64_STANDARD};
use http::{header, HeaderValue};

use crate::config::{Body, RequestConfig};
use crate::target::TargetUrl;
use crate::transport::{Event, Transport, TransportError, TransportRequest};
use crate::{Error, Response};

/// Call lifecycle. Terminal states settle the call exactly once;
/// there are no transitions after settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Idle,
    Sending,
    Streaming,
    Completed,
    Errored,
    TimedOut,
}

impl CallState {
    fn name(&self) -> &'static str {
        match self {
            CallState::Idle => "Idle",
            CallState::Sending => "Sending",
            CallState::Streaming => "Streaming",
            CallState::Completed => "Completed",
            CallState::Errored => "Errored",
            CallState::TimedOut => "TimedOut",
        }
    }
}

fn transition(state: &mut CallState, to: CallState) {
    debug!("{} -> {}", state.name(), to.name());
    *state = to;
}

/// Issues the request on the already-selected transport and drives
/// the exchange until the call settles.
///
/// `silent` and `on_data` are consumed here; everything else in the
/// config goes to the transport.
pub(crate) fn invoke(
    transport: &mut dyn Transport,
    target: &TargetUrl,
    config: RequestConfig,
) -> Result<Response, Error> {
    let RequestConfig {
        mut headers,
        timeout,
        agent,
        auth,
        body,
        method,
        mut on_data,
        silent,
        signal,
    } = config;

    if let Some(auth) = &auth {
        headers.insert(header::AUTHORIZATION, basic_auth(auth)?);
    }

    // Already bytes after normalization; this is a no-op for anything
    // but a reader that bypassed the normalizer.
    let body = body.map(Body::into_bytes).transpose()?;

    let path = target.request_path();
    let mut state = CallState::Idle;

    let request = TransportRequest {
        host: target.host(),
        port: target.port(),
        path: &path,
        method: &method,
        headers: &headers,
        body: body.as_deref(),
        timeout,
        agent: agent.as_ref(),
        signal: signal.as_ref(),
    };

    debug!("{} {}:{}{}", method, request.host, request.port, path);

    transition(&mut state, CallState::Sending);
    let mut exchange = transport.start(request)?;

    let deadline = Instant::now() + timeout;
    let mut head = None;
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        match exchange.next_event(deadline) {
            Event::Head(v) => {
                transition(&mut state, CallState::Streaming);
                head = Some(v);
            }
            Event::Chunk(chunk) => {
                trace!("chunk: {} bytes", chunk.len());
                buffer.extend_from_slice(&chunk);
                if let Some(observer) = on_data.as_mut() {
                    observer(&chunk);
                }
            }
            Event::End => {
                transition(&mut state, CallState::Completed);

                let head = head.ok_or_else(|| {
                    TransportError::new(0, "response ended before status and headers")
                })?;

                let response = Response::new(head, buffer);

                return if response.status().as_u16() >= 400 && !silent {
                    Err(Error::Status(response.status()))
                } else {
                    Ok(response)
                };
            }
            Event::Error(e) => {
                transition(&mut state, CallState::Errored);
                return Err(Error::Transport(e));
            }
            Event::TimedOut => {
                transition(&mut state, CallState::TimedOut);
                // Teardown before settling. Nothing is observed from
                // the exchange after this.
                exchange.abort();
                return Err(Error::Timeout);
            }
        }
    }
}

fn basic_auth(credential: &str) -> Result<HeaderValue, Error> {
    let encoded = format!("Basic {}", BASE64_STANDARD.encode(credential));
    HeaderValue::from_str(&encoded).map_err(|_| Error::BadHeader("authorization".to_string()))
}
