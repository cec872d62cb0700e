//! Read-only views over the requests, responses and targets the plugin observes.
//!
//! The plugin never depends on a concrete HTTP client. Anything that can describe
//! itself through [`RequestView`] and [`ResponseView`] can be logged. Adapters for
//! the `http` crate types are provided here.

use axum::body::HttpBody;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::collections::BTreeMap;
use std::fmt;

use crate::curl;

/// Logical endpoint a request is made against.
///
/// # Examples
///
/// ```rust
/// use netlogger::{Endpoint, Target};
///
/// let zen = Endpoint::new("zen", "https://api.github.com", "/zen");
/// assert_eq!(zen.url(), "https://api.github.com/zen");
/// assert_eq!(zen.name(), "zen");
/// ```
pub trait Target: Send + Sync {
    /// Base URL of the API, e.g. `https://api.github.com`.
    fn base_url(&self) -> &str;
    /// Path of the endpoint relative to [`Target::base_url`].
    fn path(&self) -> &str;
    /// Name of the endpoint or operation, used in log messages.
    fn name(&self) -> &str;

    /// Fully resolved URL of the endpoint.
    fn url(&self) -> String {
        let base = self.base_url().trim_end_matches('/');
        let path = self.path().trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}

/// A plain [`Target`] value.
///
/// Can be attached to an [`http::Request`] as an extension so that
/// [`PluginLayer`](crate::PluginLayer) reports it instead of a target derived from the URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub base_url: String,
    pub path: String,
}

impl Endpoint {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            path: path.into(),
        }
    }

    /// Derive an endpoint from a request URI, named after its path.
    pub fn from_uri(uri: &http::Uri) -> Self {
        let base_url = match (uri.scheme_str(), uri.authority()) {
            (Some(scheme), Some(authority)) => format!("{scheme}://{authority}"),
            _ => String::new(),
        };
        let path = uri.path().to_string();
        Self {
            name: path.trim_start_matches('/').to_string(),
            base_url,
            path,
        }
    }
}

impl Target for Endpoint {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Description of a streamed request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// Exact length of the stream, when the body knows it up front.
    pub length: Option<u64>,
}

impl fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.length {
            Some(length) => write!(f, "<stream of {length} bytes>"),
            None => write!(f, "<stream of unknown length>"),
        }
    }
}

/// The kind of body an outgoing request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestBody<'a> {
    Empty,
    /// Body fully held in memory.
    Bytes(&'a [u8]),
    /// Body produced lazily by a stream; its content is not available.
    Stream(StreamInfo),
}

/// Body types that can report what kind of [`RequestBody`] they are.
pub trait InspectBody {
    fn body_kind(&self) -> RequestBody<'_>;
}

impl InspectBody for () {
    fn body_kind(&self) -> RequestBody<'_> {
        RequestBody::Empty
    }
}

impl InspectBody for [u8] {
    fn body_kind(&self) -> RequestBody<'_> {
        if self.is_empty() {
            RequestBody::Empty
        } else {
            RequestBody::Bytes(self)
        }
    }
}

impl InspectBody for Bytes {
    fn body_kind(&self) -> RequestBody<'_> {
        <[u8]>::body_kind(self)
    }
}

impl InspectBody for Vec<u8> {
    fn body_kind(&self) -> RequestBody<'_> {
        self.as_slice().body_kind()
    }
}

impl InspectBody for String {
    fn body_kind(&self) -> RequestBody<'_> {
        self.as_bytes().body_kind()
    }
}

impl InspectBody for &str {
    fn body_kind(&self) -> RequestBody<'_> {
        self.as_bytes().body_kind()
    }
}

impl<T: InspectBody> InspectBody for Option<T> {
    fn body_kind(&self) -> RequestBody<'_> {
        match self {
            Some(body) => body.body_kind(),
            None => RequestBody::Empty,
        }
    }
}

impl InspectBody for axum::body::Body {
    fn body_kind(&self) -> RequestBody<'_> {
        let length = HttpBody::size_hint(self).exact();
        if HttpBody::is_end_stream(self) || length == Some(0) {
            return RequestBody::Empty;
        }
        RequestBody::Stream(StreamInfo { length })
    }
}

/// Read-only view of an outgoing request.
pub trait RequestView {
    /// The resolved URL, or `None` if the request has none.
    fn url(&self) -> Option<String>;
    /// Request headers keyed by canonical header name.
    fn headers(&self) -> BTreeMap<String, String>;
    fn method(&self) -> Method;
    fn body(&self) -> RequestBody<'_>;

    /// A shell command reproducing this request.
    ///
    /// Defaults to a generated cURL command line. Implementors with a better
    /// description of themselves can override it.
    fn curl_description(&self) -> Option<String> {
        curl::render(self)
    }
}

impl<B: InspectBody> RequestView for http::Request<B> {
    fn url(&self) -> Option<String> {
        let uri = self.uri();
        if uri.scheme().is_some() && uri.authority().is_some() {
            Some(uri.to_string())
        } else {
            None
        }
    }

    fn headers(&self) -> BTreeMap<String, String> {
        convert_headers(http::Request::headers(self))
    }

    fn method(&self) -> Method {
        http::Request::method(self).clone()
    }

    fn body(&self) -> RequestBody<'_> {
        http::Request::body(self).body_kind()
    }
}

/// Read-only view of a received response.
pub trait ResponseView {
    fn status(&self) -> StatusCode;
    /// URL the response was received from, if known.
    fn url(&self) -> Option<String>;
    fn headers(&self) -> BTreeMap<String, String>;
    fn body(&self) -> &[u8];
}

/// An owned response snapshot.
///
/// # Examples
///
/// ```rust
/// use netlogger::{Response, ResponseView};
/// use http::StatusCode;
///
/// let response = Response::new(StatusCode::OK, "https://api.github.com/zen", "cool body");
/// assert_eq!(response.body(), b"cool body");
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub url: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            url: Some(url.into()),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

impl ResponseView for Response {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn url(&self) -> Option<String> {
        self.url.clone()
    }

    fn headers(&self) -> BTreeMap<String, String> {
        convert_headers(&self.headers)
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Borrowed [`ResponseView`] over an [`http::Response`], paired with the URL of
/// the request that produced it.
#[derive(Debug, Clone, Copy)]
pub struct HttpResponseView<'a> {
    url: Option<&'a str>,
    response: &'a http::Response<Bytes>,
}

impl<'a> HttpResponseView<'a> {
    pub fn new(url: Option<&'a str>, response: &'a http::Response<Bytes>) -> Self {
        Self { url, response }
    }
}

impl ResponseView for HttpResponseView<'_> {
    fn status(&self) -> StatusCode {
        self.response.status()
    }

    fn url(&self) -> Option<String> {
        self.url.map(str::to_string)
    }

    fn headers(&self) -> BTreeMap<String, String> {
        convert_headers(self.response.headers())
    }

    fn body(&self) -> &[u8] {
        self.response.body()
    }
}

/// Convert a [`HeaderMap`] into a sorted map of canonical names to values.
///
/// Repeated headers are joined with `, `. Values that are not valid UTF-8 are
/// decoded lossily.
pub fn convert_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let value = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (canonical_name(name.as_str()), value)
        })
        .collect()
}

/// `content-type` -> `Content-Type`.
pub fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
