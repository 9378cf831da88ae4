//! fetch-shaped HTTP(S) client core.
//!
//! This crate implements the request normalization and response
//! materialization layer of a minimal fetch-style HTTP client. It does
//! not open sockets or speak the wire protocol. Establishing
//! connections, TLS and header framing are delegated to a caller
//! supplied [`Transport`](transport::Transport) which exposes the
//! response as a stream of [events](transport::Event).
//!
//! On top of that abstraction the crate provides:
//!
//! * A [`Client`](client::Client) with `fetch` plus per-verb
//!   shorthands (`get`, `post`, `put`, `patch`, `delete`, `head`).
//! * Input normalization: URL strings, parsed [`url::Url`] values and
//!   [`FetchRequest`] objects all resolve to one canonical target.
//! * Config merging with immutable per-call defaults.
//! * Streamed body accumulation with an optional per-chunk observer.
//! * A [`Response`] supporting repeated lazy decodes of the one
//!   buffered body: `json`, `text`, `blob`, `array_buffer`,
//!   `form_data`.
//!
//! # In scope:
//!
//! * Transport selection by scheme (http vs https)
//! * Timeout enforcement with forced teardown of the exchange
//! * Failure classification (bad input, transport error, HTTP status,
//!   timeout)
//!
//! # Out of scope:
//!
//! * Opening/closing sockets and TLS (the transport's job)
//! * Redirect following
//! * Cookie jars
//! * Connection pooling policy (an [`Agent`] handle is forwarded
//!   opaquely)
//! * Body data transformations (charset, compression etc)
//!
//! # The http crate
//!
//! Based on the [http crate](https://crates.io/crates/http) - a unified HTTP API for Rust.

#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![deny(missing_docs)]

#[macro_use]
extern crate log;

mod error;
pub use error::Error;

mod config;
pub use config::{AbortSignal, Agent, Body, ChunkObserver, FetchRequest, Headers, RequestConfig};

mod target;
pub use target::{Scheme, TargetUrl};

mod response;
pub use response::{Blob, FormData, Response};

pub mod client;
pub mod transport;

pub use http;
pub use url;
