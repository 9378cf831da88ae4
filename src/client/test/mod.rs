//! Client tests against a scripted mock transport.

use std::collections::VecDeque;
use std::mem;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use http::{HeaderMap, Method, StatusCode};

use crate::client::Client;
use crate::transport::{
    Event, Exchange, ResponseHead, Transport, TransportError, TransportRequest,
};


/// What the mock saw when a request was issued.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
    pub had_agent: bool,
    pub signal_aborted: Option<bool>,
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub requests: Vec<RecordedRequest>,
    pub aborted: bool,
    /// Scripted events the invoker never pulled.
    pub undelivered: usize,
}

/// A transport that replays a scripted event sequence.
pub(crate) struct MockTransport {
    state: Arc<Mutex<MockState>>,
    script: VecDeque<Event>,
    refuse: Option<TransportError>,
}

impl MockTransport {
    pub fn scripted(script: Vec<Event>) -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState::default()));
        let transport = MockTransport {
            state: state.clone(),
            script: script.into(),
            refuse: None,
        };
        (transport, state)
    }

    pub fn refusing(error: TransportError) -> (Self, Arc<Mutex<MockState>>) {
        let (mut transport, state) = MockTransport::scripted(vec![]);
        transport.refuse = Some(error);
        (transport, state)
    }
}

impl Transport for MockTransport {
    fn start(
        &mut self,
        request: TransportRequest<'_>,
    ) -> Result<Box<dyn Exchange>, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            host: request.host.to_string(),
            port: request.port,
            path: request.path.to_string(),
            method: request.method.clone(),
            headers: request.headers.clone(),
            body: request.body.map(|b| b.to_vec()),
            timeout: request.timeout,
            had_agent: request.agent.is_some(),
            signal_aborted: request.signal.map(|s| s.aborted()),
        });

        if let Some(e) = self.refuse.take() {
            return Err(e);
        }

        let events = mem::take(&mut self.script);
        state.undelivered = events.len();

        Ok(Box::new(MockExchange {
            events,
            state: self.state.clone(),
        }))
    }
}

struct MockExchange {
    events: VecDeque<Event>,
    state: Arc<Mutex<MockState>>,
}

impl Exchange for MockExchange {
    fn next_event(&mut self, _deadline: Instant) -> Event {
        match self.events.pop_front() {
            Some(event) => {
                self.state.lock().unwrap().undelivered = self.events.len();
                event
            }
            None => Event::End,
        }
    }

    fn abort(&mut self) {
        self.state.lock().unwrap().aborted = true;
    }
}

// Script builders.

pub(crate) fn head(status: u16) -> Event {
    head_with(status, HeaderMap::new())
}

pub(crate) fn head_with(status: u16, headers: HeaderMap) -> Event {
    Event::Head(ResponseHead {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
    })
}

pub(crate) fn chunk(bytes: &[u8]) -> Event {
    Event::Chunk(bytes.to_vec())
}

pub(crate) fn ok_script(status: u16, body: &[u8]) -> Vec<Event> {
    vec![head(status), chunk(body), Event::End]
}

/// A client whose plain transport replays `script`. The secure
/// transport replays nothing and records separately.
pub(crate) fn client_with(script: Vec<Event>) -> (Client, Arc<Mutex<MockState>>) {
    let (plain, state) = MockTransport::scripted(script);
    let (secure, _) = MockTransport::scripted(vec![]);
    (Client::new(Box::new(plain), Box::new(secure)), state)
}

/// A client with both transports scripted, for scheme selection tests.
pub(crate) fn client_pair(
    plain_script: Vec<Event>,
    secure_script: Vec<Event>,
) -> (Client, Arc<Mutex<MockState>>, Arc<Mutex<MockState>>) {
    let (plain, plain_state) = MockTransport::scripted(plain_script);
    let (secure, secure_state) = MockTransport::scripted(secure_script);
    (
        Client::new(Box::new(plain), Box::new(secure)),
        plain_state,
        secure_state,
    )
}
