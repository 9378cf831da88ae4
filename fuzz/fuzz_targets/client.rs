#![no_main]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use libfuzzer_sys::fuzz_target;

use fetch_proto::client::Client;
use fetch_proto::http::{HeaderMap, StatusCode};
use fetch_proto::transport::{
    Event, Exchange, ResponseHead, Transport, TransportError, TransportRequest,
};
use fetch_proto::{Body, Error, RequestConfig};

// URL candidates, some of which must be classified as bad input.
const URLS: &[&str] = &[
    "http://example.com/",
    "http://example.com/search?q=1#frag",
    "https://example.com:8443/deep/path?a=1&b=2",
    "http://example.com/%20encoded",
    "ftp://example.com/nope",
    "not a url",
    "/relative/only",
];

const STATUS_CODES: &[u16] = &[200, 201, 204, 302, 304, 399, 400, 404, 500, 503];

struct ScriptedTransport {
    script: VecDeque<Event>,
}

struct ScriptedExchange {
    events: VecDeque<Event>,
}

impl Transport for ScriptedTransport {
    fn start(
        &mut self,
        _request: TransportRequest<'_>,
    ) -> Result<Box<dyn Exchange>, TransportError> {
        Ok(Box::new(ScriptedExchange {
            events: std::mem::take(&mut self.script),
        }))
    }
}

impl Exchange for ScriptedExchange {
    fn next_event(&mut self, _deadline: Instant) -> Event {
        self.events.pop_front().unwrap_or(Event::End)
    }

    fn abort(&mut self) {}
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let url = URLS[(data[0] as usize) % URLS.len()];
    let status = STATUS_CODES[(data[1] as usize) % STATUS_CODES.len()];
    let silent = data[2] % 2 == 0;
    let timeout_event = data[2] % 7 == 0;
    let error_event = data[2] % 11 == 0;

    // Split the remaining bytes into arbitrary chunks.
    let mut body = &data[3..];
    let mut script = vec![Event::Head(ResponseHead {
        status: StatusCode::from_u16(status).unwrap(),
        headers: HeaderMap::new(),
    })];
    let mut expected: Vec<u8> = Vec::new();
    let mut i = 0;
    while !body.is_empty() {
        let n = ((data[i % data.len()] as usize) % body.len()) + 1;
        let (chunk, rest) = body.split_at(n);
        expected.extend_from_slice(chunk);
        script.push(Event::Chunk(chunk.to_vec()));
        body = rest;
        i += 1;
    }
    if timeout_event {
        script.push(Event::TimedOut);
    } else if error_event {
        script.push(Event::Error(TransportError::new(0, "scripted failure")));
    }
    script.push(Event::End);

    let plain = ScriptedTransport {
        script: script.clone().into(),
    };
    let secure = ScriptedTransport {
        script: script.into(),
    };
    let mut client = Client::new(Box::new(plain), Box::new(secure));

    let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut config = RequestConfig::default();
    config.silent = silent;
    config.body = Some(Body::Bytes(expected.clone()));
    config.on_data = Some(Box::new(move |chunk| {
        sink.lock().unwrap().extend_from_slice(chunk);
    }));

    let result = client.fetch(url, config);

    let bad_url = url.starts_with("ftp") || !url.contains("://");
    match result {
        Ok(response) => {
            assert!(!bad_url);
            assert!(!timeout_event && !error_event);
            assert!(silent || status < 400);
            assert_eq!(response.body(), &expected[..]);
            assert_eq!(&*seen.lock().unwrap(), &expected);
        }
        Err(Error::BadInput(_)) => assert!(bad_url),
        Err(Error::Timeout) => assert!(timeout_event),
        Err(Error::Transport(_)) => assert!(error_event),
        Err(Error::Status(code)) => {
            assert!(!silent);
            assert_eq!(code.as_u16(), status);
        }
        Err(_) => unreachable!(),
    }
});
