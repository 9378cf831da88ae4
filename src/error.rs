use std::fmt;

use http::StatusCode;

use crate::transport::TransportError;

/// Error type for fetch-proto
///
/// Every variant answers [`status()`][Error::status] and
/// [`status_text()`][Error::status_text] so callers see one uniform
/// failure shape regardless of where the failure was classified.
#[derive(Debug, PartialEq, Eq)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum Error {
    /// The call target is not a recognized absolute http(s) URL.
    BadInput(String),
    /// A header name or value in a Headers-like mapping is not legal.
    BadHeader(String),
    /// Draining a streamed request body failed before the request was issued.
    BodyRead(String),
    /// The transport reported an error event.
    Transport(TransportError),
    /// Response status >= 400 and the call was not silent.
    Status(StatusCode),
    /// No completion or error within the configured timeout.
    Timeout,
    /// `json()` called on a buffer that is not valid JSON.
    BadJson(String),
    /// `text()` or `form_data()` called on a buffer that is not UTF-8.
    NotText,
}

impl Error {
    /// The status code carried by this error.
    ///
    /// HTTP failures carry the response status, transport errors the
    /// transport's code, and the remaining kinds synthetic codes
    /// (400 for bad input and decode failures, 408 for timeout).
    pub fn status(&self) -> u16 {
        match self {
            Error::BadInput(_) => 400,
            Error::BadHeader(_) => 400,
            Error::BodyRead(_) => 400,
            Error::Transport(e) => e.code(),
            Error::Status(v) => v.as_u16(),
            Error::Timeout => 408,
            Error::BadJson(_) => 400,
            Error::NotText => 400,
        }
    }

    /// The status text matching [`status()`][Error::status].
    pub fn status_text(&self) -> &'static str {
        match self {
            Error::Timeout => "Request Timeout",
            _ => StatusCode::from_u16(self.status())
                .ok()
                .and_then(|v| v.canonical_reason())
                .unwrap_or(""),
        }
    }
}

impl From<TransportError> for Error {
    fn from(value: TransportError) -> Self {
        Error::Transport(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::BadJson(value.to_string())
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadInput(v) => write!(f, "Invalid URL: {}", v),
            Error::BadHeader(v) => write!(f, "bad header: {}", v),
            Error::BodyRead(v) => write!(f, "failed to drain request body: {}", v),
            Error::Transport(e) => write!(f, "transport: {}", e),
            Error::Status(v) => write!(
                f,
                "status {} {}",
                v.as_u16(),
                v.canonical_reason().unwrap_or("")
            ),
            Error::Timeout => write!(f, "Request timed out"),
            Error::BadJson(v) => write!(f, "body is not valid json: {}", v),
            Error::NotText => write!(f, "body is not valid utf-8"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_input_status() {
        let err = Error::BadInput("42".into());
        assert_eq!(err.status(), 400);
        assert_eq!(err.status_text(), "Bad Request");
        assert_eq!(err.to_string(), "Invalid URL: 42");
    }

    #[test]
    fn test_timeout_status() {
        let err = Error::Timeout;
        assert_eq!(err.status(), 408);
        assert_eq!(err.status_text(), "Request Timeout");
        assert_eq!(err.to_string(), "Request timed out");
    }

    #[test]
    fn test_http_failure_status() {
        let err = Error::Status(StatusCode::NOT_FOUND);
        assert_eq!(err.status(), 404);
        assert_eq!(err.status_text(), "Not Found");
    }

    #[test]
    fn test_transport_status() {
        let err = Error::Transport(TransportError::new(502, "connection refused"));
        assert_eq!(err.status(), 502);
        assert_eq!(err.status_text(), "Bad Gateway");
        assert_eq!(err.to_string(), "transport: connection refused (502)");
    }

    #[test]
    fn test_transport_unknown_code_has_empty_text() {
        let err = Error::Transport(TransportError::new(0, "broken pipe"));
        assert_eq!(err.status(), 0);
        assert_eq!(err.status_text(), "");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::BadJson(_)));
        assert_eq!(err.status(), 400);
    }
}
