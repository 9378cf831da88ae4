//! The materialized response and its lazy decode operations.

use std::fmt;
use std::str;

use http::{header, HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::transport::ResponseHead;
use crate::Error;

/// A fully received response.
///
/// Owns the one accumulated body buffer. The decode methods are pure
/// reads of that buffer and may be called any number of times; a
/// decode failure surfaces at the decode call, never at the time the
/// call settled.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    pub(crate) fn new(head: ResponseHead, body: Vec<u8>) -> Self {
        Response {
            status: head.status,
            headers: head.headers,
            body,
        }
    }

    /// Response status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical status text for the status code.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw accumulated body buffer.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as UTF-8 text, verbatim.
    pub fn text(&self) -> Result<&str, Error> {
        str::from_utf8(&self.body).map_err(|_| Error::NotText)
    }

    /// The body parsed as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The body as a binary large object, tagged with the response
    /// content type.
    pub fn blob(&self) -> Blob {
        let content_type = self
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        Blob {
            bytes: self.body.clone(),
            content_type,
        }
    }

    /// The body's bytes as an owned fixed-size buffer.
    pub fn array_buffer(&self) -> Box<[u8]> {
        self.body.clone().into_boxed_slice()
    }

    /// The body parsed as `application/x-www-form-urlencoded` pairs.
    pub fn form_data(&self) -> Result<FormData, Error> {
        // Require text first so a binary body is a decode failure
        // rather than silently mangled pairs.
        let text = self.text()?;
        let pairs = url::form_urlencoded::parse(text.as_bytes())
            .into_owned()
            .collect();
        Ok(FormData(pairs))
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body.len())
            .finish()
    }
}

/// A binary large object: the body's bytes plus the content type the
/// response declared, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

impl Blob {
    /// The blob's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The declared content type.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Form name/value pairs decoded from a response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    /// The first value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All pairs in decoded order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn response(status: u16, body: &[u8]) -> Response {
        Response::new(
            ResponseHead {
                status: StatusCode::from_u16(status).unwrap(),
                headers: HeaderMap::new(),
            },
            body.to_vec(),
        )
    }

    #[test]
    fn test_text_verbatim() {
        let res = response(200, b"hello there");
        assert_eq!(res.text().unwrap(), "hello there");
        // Pure read, callable again.
        assert_eq!(res.text().unwrap(), "hello there");
    }

    #[test]
    fn test_text_not_utf8() {
        let res = response(200, &[0xFF, 0xFE]);
        assert_eq!(res.text().unwrap_err(), Error::NotText);
    }

    #[test]
    fn test_json() {
        let res = response(200, b"{\"ok\":true,\"n\":3}");
        let value: serde_json::Value = res.json().unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["n"], 3);
    }

    #[test]
    fn test_json_parse_failure_at_decode_time() {
        let res = response(200, b"not json");
        let err = res.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, Error::BadJson(_)));
        // The buffer is untouched and still decodable as text.
        assert_eq!(res.text().unwrap(), "not json");
    }

    #[test]
    fn test_blob_carries_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        let res = Response::new(
            ResponseHead {
                status: StatusCode::OK,
                headers,
            },
            vec![1, 2, 3],
        );

        let blob = res.blob();
        assert_eq!(blob.as_bytes(), &[1, 2, 3]);
        assert_eq!(blob.len(), 3);
        assert_eq!(blob.content_type(), Some("application/octet-stream"));
    }

    #[test]
    fn test_array_buffer_has_actual_bytes() {
        let res = response(200, b"abc");
        let buf = res.array_buffer();
        assert_eq!(&*buf, b"abc");
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_form_data() {
        let res = response(200, b"a=1&b=two&a=3");
        let form = res.form_data().unwrap();
        assert_eq!(form.len(), 3);
        assert_eq!(form.get("a"), Some("1"));
        assert_eq!(form.get("b"), Some("two"));
        let entries: Vec<_> = form.entries().collect();
        assert_eq!(entries, vec![("a", "1"), ("b", "two"), ("a", "3")]);
    }

    #[test]
    fn test_form_data_percent_decoding() {
        let res = response(200, b"name=hello%20world&x=%26");
        let form = res.form_data().unwrap();
        assert_eq!(form.get("name"), Some("hello world"));
        assert_eq!(form.get("x"), Some("&"));
    }

    #[test]
    fn test_decodes_work_on_failure_statuses() {
        // Classification rejects the call elsewhere; the response is
        // still fully decorated.
        let res = response(404, b"missing");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.status_text(), "Not Found");
        assert_eq!(res.text().unwrap(), "missing");
    }
}
