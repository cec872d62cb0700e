//! The request/response logging plugin.
//!
//! [`NetworkLoggerPlugin`] turns the requests and responses it observes into
//! human-readable lines and hands them to an [`Output`]. It holds no mutable
//! state: every call is an independent transformation of its inputs.

use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::NetworkError;
use crate::formatters;
use crate::output::{Output, StderrOutput};
use crate::types::{RequestBody, RequestView, ResponseView, Target};
use crate::{NetworkLoggerConfig, Plugin};

/// Transforms a response body before it is displayed.
pub type ResponseBodyFormatter = Arc<dyn Fn(&[u8]) -> Bytes + Send + Sync>;

/// Renders an in-memory request body as text.
pub type RequestBodyFormatter = Arc<dyn Fn(&[u8]) -> String + Send + Sync>;

const INVALID_REQUEST: &str = "(invalid request)";

/// Logs outgoing requests and incoming responses.
///
/// What gets printed is controlled by [`NetworkLoggerConfig`]:
/// - The URL of every request and a summary of every response are always printed
/// - With `verbose`, request headers, method and body plus the response body follow
/// - With `curl`, the request is printed as a cURL command instead of field by field
///
/// # Examples
///
/// ```rust
/// use netlogger::{NetworkLoggerConfig, NetworkLoggerPlugin, formatters};
///
/// let plugin = NetworkLoggerPlugin::new(NetworkLoggerConfig {
///     verbose: true,
///     curl: true,
///     ..Default::default()
/// })
/// .with_response_body_formatter(formatters::pretty_json);
/// ```
#[derive(Clone)]
pub struct NetworkLoggerPlugin {
    config: NetworkLoggerConfig,
    output: Arc<dyn Output>,
    request_body_formatter: Option<RequestBodyFormatter>,
    response_body_formatter: ResponseBodyFormatter,
}

impl NetworkLoggerPlugin {
    /// Create a plugin writing to standard error.
    pub fn new(config: NetworkLoggerConfig) -> Self {
        Self {
            config,
            output: Arc::new(StderrOutput),
            request_body_formatter: None,
            response_body_formatter: Arc::new(formatters::identity),
        }
    }

    /// A plugin with `verbose` enabled and every other option at its default.
    pub fn verbose() -> Self {
        Self::new(NetworkLoggerConfig {
            verbose: true,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &NetworkLoggerConfig {
        &self.config
    }

    /// Replace the output sink.
    pub fn with_output<O: Output + 'static>(mut self, output: O) -> Self {
        self.output = Arc::new(output);
        self
    }

    /// Transform response bodies before they are decoded and printed.
    pub fn with_response_body_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&[u8]) -> Bytes + Send + Sync + 'static,
    {
        self.response_body_formatter = Arc::new(formatter);
        self
    }

    /// Render in-memory request bodies with `formatter` instead of UTF-8 decoding.
    pub fn with_request_body_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&[u8]) -> String + Send + Sync + 'static,
    {
        self.request_body_formatter = Some(Arc::new(formatter));
        self
    }

    fn request_items(&self, request: Option<&dyn RequestView>) -> Vec<String> {
        let url = request.and_then(|r| r.url());
        let mut items = vec![format!(
            "Request: {}",
            url.as_deref().unwrap_or(INVALID_REQUEST)
        )];

        let Some(request) = request else {
            return items;
        };

        if self.config.curl {
            match request.curl_description() {
                Some(command) => {
                    items.push(command);
                    return items;
                }
                None => debug!("No cURL description available, logging request fields"),
            }
        }

        if !self.config.verbose {
            return items;
        }

        items.push(format!("Request Headers: {}", render_headers(&request.headers())));
        items.push(format!("HTTP Request Method: {}", request.method()));
        match request.body() {
            RequestBody::Bytes(body) => {
                let text = match &self.request_body_formatter {
                    Some(formatter) => formatter(body),
                    None => decode(body),
                };
                items.push(format!("Request Body: {text}"));
            }
            RequestBody::Stream(stream) => items.push(format!("Request Body Stream: {stream}")),
            RequestBody::Empty => {}
        }

        items
    }

    fn response_items(
        &self,
        result: Result<&dyn ResponseView, &NetworkError>,
        target: &dyn Target,
    ) -> Vec<String> {
        match result {
            Ok(response) => {
                let mut items = vec![format!("Response: {}", describe_response(response))];
                if self.config.verbose {
                    let body = (self.response_body_formatter)(response.body());
                    if !body.is_empty() {
                        items.push(decode(&body));
                    }
                }
                items
            }
            Err(NetworkError::EmptyResponse) => vec![format!(
                "Response: Received empty network response for {}.",
                target.name()
            )],
            Err(err) => vec![format!("Response: Request failed: {err}")],
        }
    }

    /// Verbose output writes every item as its own event.
    fn emit(&self, items: Vec<String>) {
        let NetworkLoggerConfig {
            separator,
            terminator,
            verbose,
            ..
        } = &self.config;

        if *verbose {
            for item in items {
                self.output.write(separator, terminator, &[item]);
            }
        } else {
            self.output.write(separator, terminator, &items);
        }
    }
}

impl Default for NetworkLoggerPlugin {
    fn default() -> Self {
        Self::new(NetworkLoggerConfig::default())
    }
}

impl fmt::Debug for NetworkLoggerPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkLoggerPlugin")
            .field("config", &self.config)
            .field("request_body_formatter", &self.request_body_formatter.is_some())
            .finish_non_exhaustive()
    }
}

impl Plugin for NetworkLoggerPlugin {
    fn on_request_will_send(&self, request: Option<&dyn RequestView>, _target: &dyn Target) {
        self.emit(self.request_items(request));
    }

    fn on_response_received(
        &self,
        result: Result<&dyn ResponseView, &NetworkError>,
        target: &dyn Target,
    ) {
        self.emit(self.response_items(result, target));
    }
}

/// `["Content-Type": "application/json"]`, or `[]` when there are no headers.
fn render_headers(headers: &BTreeMap<String, String>) -> String {
    let pairs: Vec<String> = headers
        .iter()
        .map(|(name, value)| format!("{name:?}: {value:?}"))
        .collect();
    format!("[{}]", pairs.join(", "))
}

fn describe_response(response: &dyn ResponseView) -> String {
    format!(
        "<HTTPResponse> {{ URL: {} }} {{ Status Code: {}, Headers {} }}",
        response.url().as_deref().unwrap_or("(unknown)"),
        response.status().as_u16(),
        render_headers(&response.headers()),
    )
}

fn decode(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<{} bytes>", body.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Endpoint, Response};
    use http::StatusCode;
    use std::sync::Mutex;

    type Events = Arc<Mutex<Vec<Vec<String>>>>;

    fn capturing(config: NetworkLoggerConfig) -> (NetworkLoggerPlugin, Events) {
        let events: Events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let plugin = NetworkLoggerPlugin::new(config).with_output(
            move |_separator: &str, _terminator: &str, items: &[String]| {
                sink.lock().unwrap().push(items.to_vec());
            },
        );
        (plugin, events)
    }

    fn zen() -> Endpoint {
        Endpoint::new("zen", "https://api.github.com", "/zen")
    }

    fn body_request() -> http::Request<&'static str> {
        http::Request::builder()
            .uri("https://api.github.com/zen")
            .header("content-type", "application/json")
            .body("cool body")
            .unwrap()
    }

    #[test]
    fn test_quiet_request_is_a_single_event() {
        let (plugin, events) = capturing(NetworkLoggerConfig::default());

        plugin.on_request_will_send(Some(&body_request()), &zen());

        assert_eq!(
            *events.lock().unwrap(),
            vec![vec!["Request: https://api.github.com/zen".to_string()]]
        );
    }

    #[test]
    fn test_verbose_request_writes_one_event_per_line() {
        let (plugin, events) = capturing(NetworkLoggerConfig {
            verbose: true,
            ..Default::default()
        });

        plugin.on_request_will_send(Some(&body_request()), &zen());

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                vec!["Request: https://api.github.com/zen".to_string()],
                vec![r#"Request Headers: ["Content-Type": "application/json"]"#.to_string()],
                vec!["HTTP Request Method: GET".to_string()],
                vec!["Request Body: cool body".to_string()],
            ]
        );
    }

    #[test]
    fn test_request_without_headers_or_body() {
        let (plugin, events) = capturing(NetworkLoggerConfig {
            verbose: true,
            ..Default::default()
        });
        let request = http::Request::builder()
            .method(http::Method::DELETE)
            .uri("https://api.github.com/gists/1")
            .body(())
            .unwrap();

        plugin.on_request_will_send(Some(&request), &zen());

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], vec!["Request Headers: []".to_string()]);
        assert_eq!(events[2], vec!["HTTP Request Method: DELETE".to_string()]);
    }

    #[test]
    fn test_undecodable_request_body() {
        let (plugin, events) = capturing(NetworkLoggerConfig {
            verbose: true,
            ..Default::default()
        });
        let request = http::Request::builder()
            .uri("https://api.github.com/zen")
            .body(vec![0xff, 0xfe, 0x00])
            .unwrap();

        plugin.on_request_will_send(Some(&request), &zen());

        let events = events.lock().unwrap();
        assert_eq!(
            events.last().unwrap(),
            &vec!["Request Body: <3 bytes>".to_string()]
        );
    }

    #[test]
    fn test_request_body_formatter() {
        let (plugin, events) = capturing(NetworkLoggerConfig {
            verbose: true,
            ..Default::default()
        });
        let plugin =
            plugin.with_request_body_formatter(|body| format!("{} bytes redacted", body.len()));

        plugin.on_request_will_send(Some(&body_request()), &zen());

        let events = events.lock().unwrap();
        assert_eq!(
            events.last().unwrap(),
            &vec!["Request Body: 9 bytes redacted".to_string()]
        );
    }

    #[test]
    fn test_curl_falls_back_when_url_is_unresolved() {
        let (plugin, events) = capturing(NetworkLoggerConfig {
            verbose: true,
            curl: true,
            ..Default::default()
        });
        let request = http::Request::builder().uri("/zen").body(()).unwrap();

        plugin.on_request_will_send(Some(&request), &zen());

        let events = events.lock().unwrap();
        assert_eq!(events[0], vec!["Request: (invalid request)".to_string()]);
        assert_eq!(events[2], vec!["HTTP Request Method: GET".to_string()]);
    }

    #[test]
    fn test_response_descriptor() {
        let (plugin, events) = capturing(NetworkLoggerConfig::default());
        let mut response =
            Response::new(StatusCode::OK, "https://api.github.com/zen", "cool body");
        response
            .headers
            .insert(http::header::CONTENT_TYPE, "text/plain".parse().unwrap());

        plugin.on_response_received(Ok(&response), &zen());

        assert_eq!(
            *events.lock().unwrap(),
            vec![vec![
                r#"Response: <HTTPResponse> { URL: https://api.github.com/zen } { Status Code: 200, Headers ["Content-Type": "text/plain"] }"#
                    .to_string()
            ]]
        );
    }

    #[test]
    fn test_response_without_url_or_body() {
        let (plugin, events) = capturing(NetworkLoggerConfig {
            verbose: true,
            ..Default::default()
        });
        let response = Response {
            status: StatusCode::NO_CONTENT,
            url: None,
            headers: http::HeaderMap::new(),
            body: Bytes::new(),
        };

        plugin.on_response_received(Ok(&response), &zen());

        assert_eq!(
            *events.lock().unwrap(),
            vec![vec![
                "Response: <HTTPResponse> { URL: (unknown) } { Status Code: 204, Headers [] }"
                    .to_string()
            ]]
        );
    }

    #[test]
    fn test_undecodable_response_body() {
        let (plugin, events) = capturing(NetworkLoggerConfig {
            verbose: true,
            ..Default::default()
        });
        let response = Response::new(
            StatusCode::OK,
            "https://api.github.com/zen",
            vec![0xff, 0xfe],
        );

        plugin.on_response_received(Ok(&response), &zen());

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], vec!["<2 bytes>".to_string()]);
    }

    #[test]
    fn test_formatter_producing_invalid_utf8() {
        let (plugin, events) = capturing(NetworkLoggerConfig {
            verbose: true,
            ..Default::default()
        });
        let plugin =
            plugin.with_response_body_formatter(|_| Bytes::from_static(&[0xc3, 0x28, 0xff]));
        let response = Response::new(StatusCode::OK, "https://api.github.com/zen", "cool body");

        plugin.on_response_received(Ok(&response), &zen());

        let events = events.lock().unwrap();
        assert_eq!(events.last().unwrap(), &vec!["<3 bytes>".to_string()]);
    }

    #[test]
    fn test_empty_axum_body_logs_no_stream() {
        let (plugin, events) = capturing(NetworkLoggerConfig {
            verbose: true,
            ..Default::default()
        });
        let request = http::Request::builder()
            .uri("https://api.github.com/zen")
            .body(axum::body::Body::empty())
            .unwrap();

        plugin.on_request_will_send(Some(&request), &zen());

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                vec!["Request: https://api.github.com/zen".to_string()],
                vec!["Request Headers: []".to_string()],
                vec!["HTTP Request Method: GET".to_string()],
            ]
        );
    }

    #[test]
    fn test_generic_failure() {
        let (plugin, events) = capturing(NetworkLoggerConfig::default());

        plugin.on_response_received(Err(&NetworkError::StatusCode(500)), &zen());

        assert_eq!(
            *events.lock().unwrap(),
            vec![vec![
                "Response: Request failed: status code 500 was not acceptable".to_string()
            ]]
        );
    }

    #[test]
    fn test_debug_omits_sink() {
        let plugin = NetworkLoggerPlugin::verbose();
        let debug = format!("{plugin:?}");
        assert!(debug.starts_with("NetworkLoggerPlugin"));
        assert!(debug.contains("verbose: true"));
    }
}
