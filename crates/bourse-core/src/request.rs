//! Request and response types exchanged with the transport.

use std::borrow::Cow;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::credentials::Credentials;
use crate::error::{Error, InvalidInputError, RemoteError, TransportError};
use crate::types::BaseUrl;

/// Where credentials are placed on an outgoing request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Injection {
    /// One header per credential entry.
    #[default]
    Header,
    /// One query parameter per credential entry.
    Query,
}

/// Description of a single API call, independent of any credentials.
///
/// The body is serialized once, when the request is built. Every attempt to
/// send the request reuses the same bytes.
///
/// # Example
///
/// ```
/// use bourse_core::PendingRequest;
///
/// let request = PendingRequest::get("/api/v1/markets")
///     .query("searchTerm", "gold")
///     .query_opt("epics", None::<&str>);
/// assert_eq!(request.query_pairs().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
    injection: Injection,
}

impl PendingRequest {
    /// Create a request with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            injection: Injection::Header,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter if the value is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Add a header that is sent with every attempt.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        let bytes = serde_json::to_vec(body).map_err(|e| InvalidInputError::Body {
            message: e.to_string(),
        })?;
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }

    /// Send credentials as query parameters instead of headers.
    pub fn inject_into_query(mut self) -> Self {
        self.injection = Injection::Query;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn extra_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn injection(&self) -> Injection {
        self.injection
    }

    /// Build the wire request for one attempt with the given credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not resolve or a header cannot be encoded.
    pub fn to_http(&self, base: &BaseUrl, credentials: &Credentials) -> Result<HttpRequest, Error> {
        let mut url = base.endpoint(&self.path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
            if self.injection == Injection::Query {
                for entry in credentials.entries() {
                    pairs.append_pair(entry.name(), entry.value().expose());
                }
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            headers.insert(header_name(name)?, header_value(name, value)?);
        }
        if self.injection == Injection::Header {
            for entry in credentials.entries() {
                let mut value = header_value(entry.name(), entry.value().expose())?;
                value.set_sensitive(true);
                headers.insert(header_name(entry.name())?, value);
            }
        }
        if self.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(HttpRequest::new(
            self.method.clone(),
            url,
            headers,
            self.body.clone(),
        ))
    }
}

/// Check that `value` can be appended to a request path as exactly one
/// segment.
///
/// URL parsing resolves `.` and `..` segments (percent-encoded ones too) and
/// splits on `?` and `#`, so an id carrying any of them would address a
/// different resource than the one named.
pub fn check_path_segment(name: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(InvalidInputError::parameter(name, "must not be empty").into());
    }
    if value == "." || value == ".." || value.contains(['/', '\\', '?', '#', '%']) {
        return Err(InvalidInputError::parameter(
            name,
            "must be a single path segment without '/', '\\', '?', '#' or '%'",
        )
        .into());
    }
    Ok(())
}

fn header_name(name: &str) -> Result<HeaderName, Error> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
        InvalidInputError::Header {
            name: name.to_string(),
        }
        .into()
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|_| {
        InvalidInputError::Header {
            name: name.to_string(),
        }
        .into()
    })
}

/// A fully resolved request handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl HttpRequest {
    pub(crate) fn new(method: Method, url: Url, headers: HeaderMap, body: Option<Bytes>) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn into_parts(self) -> (Method, Url, HeaderMap, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// A response from the remote API, body fully buffered.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// A response with a JSON body and no headers.
    pub fn json_body(status: StatusCode, body: &serde_json::Value) -> Self {
        Self::new(status, HeaderMap::new(), body.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode the body as JSON.
    ///
    /// An empty body decodes as JSON `null`, so `serde_json::Value` and
    /// `Option<T>` targets accept bodiless success responses.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let body: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|e| {
            TransportError::Body {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Look up a top-level string field of a JSON body.
    pub fn json_field(&self, field: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(&self.body).ok()?;
        value.get(field)?.as_str().map(str::to_string)
    }

    /// Interpret this response as an API error.
    pub fn to_remote_error(&self) -> RemoteError {
        let code = ["errorCode", "error", "code"]
            .iter()
            .find_map(|f| self.json_field(f));
        let message = ["message", "errorMessage", "details"]
            .iter()
            .find_map(|f| self.json_field(f))
            .or_else(|| {
                if code.is_some() {
                    return None;
                }
                let text = self.text();
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            });
        RemoteError::new(self.status.as_u16(), code, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::Secret;
    use serde_json::json;

    fn base() -> BaseUrl {
        BaseUrl::new("https://api.example.com").unwrap()
    }

    fn creds() -> Credentials {
        Credentials::new()
            .with_entry("CST", Secret::new("cst-token"))
            .with_entry("X-SECURITY-TOKEN", Secret::new("sec-token"))
    }

    #[test]
    fn path_segments_reject_traversal_and_query_text() {
        check_path_segment("dealId", "DEAL-0001").unwrap();
        check_path_segment("epic", "OIL_CRUDE").unwrap();

        let rejected = [
            "",
            "  ",
            ".",
            "..",
            "../workingorders/DEAL9",
            "DEAL1?force=true",
            "a#b",
            "%2e%2e",
            "a\\b",
        ];
        for id in rejected {
            let err = check_path_segment("dealId", id).unwrap_err();
            assert!(err.to_string().contains("dealId"), "{:?} -> {}", id, err);
        }
    }

    #[test]
    fn injects_credentials_as_headers() {
        let request = PendingRequest::get("/api/v1/positions");
        let http = request.to_http(&base(), &creds()).unwrap();

        assert_eq!(http.url().as_str(), "https://api.example.com/api/v1/positions");
        assert_eq!(http.header("cst"), Some("cst-token"));
        assert_eq!(http.header("x-security-token"), Some("sec-token"));
        assert!(http.headers().get("cst").unwrap().is_sensitive());
        assert!(http.body().is_none());
    }

    #[test]
    fn injects_credentials_as_query() {
        let request = PendingRequest::get("quotes").query("symbol", "AAPL").inject_into_query();
        let http = request.to_http(&base(), &creds()).unwrap();

        assert_eq!(
            http.url().as_str(),
            "https://api.example.com/quotes?symbol=AAPL&CST=cst-token&X-SECURITY-TOKEN=sec-token"
        );
        assert!(http.header("cst").is_none());
    }

    #[test]
    fn json_body_is_serialized_once() {
        let request = PendingRequest::post("/api/v1/positions")
            .json(&json!({"epic": "GOLD", "size": 1.5}))
            .unwrap();
        let first = request.to_http(&base(), &creds()).unwrap();
        let second = request.to_http(&base(), &creds()).unwrap();

        assert_eq!(first.body(), second.body());
        assert_eq!(first.header("content-type"), Some("application/json"));
    }

    #[test]
    fn rejects_unencodable_header() {
        let request = PendingRequest::get("/x").header("x-bad", "line\nbreak");
        let err = request.to_http(&base(), &Credentials::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(InvalidInputError::Header { .. })));
    }

    #[test]
    fn no_dangling_question_mark_without_query() {
        let http = PendingRequest::get("/ping")
            .to_http(&base(), &Credentials::new())
            .unwrap();
        assert_eq!(http.url().as_str(), "https://api.example.com/ping");
    }

    #[test]
    fn remote_error_from_json_body() {
        let response = ApiResponse::json_body(
            StatusCode::BAD_REQUEST,
            &json!({"errorCode": "error.invalid.stoploss.minvalue"}),
        );
        let err = response.to_remote_error();
        assert_eq!(err.status, 400);
        assert_eq!(err.code.as_deref(), Some("error.invalid.stoploss.minvalue"));
        assert!(err.message.is_none());
    }

    #[test]
    fn remote_error_from_plain_text() {
        let response = ApiResponse::new(
            StatusCode::SERVICE_UNAVAILABLE,
            HeaderMap::new(),
            "upstream down",
        );
        let err = response.to_remote_error();
        assert_eq!(err.code, None);
        assert_eq!(err.message.as_deref(), Some("upstream down"));
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let response = ApiResponse::new(StatusCode::OK, HeaderMap::new(), "");
        let value: serde_json::Value = response.json().unwrap();
        assert!(value.is_null());
    }
}
