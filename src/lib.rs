//! # netlogger
//!
//! A logging plugin for HTTP client pipelines. It prints the requests a client is
//! about to send and the responses it receives as human-readable text, optionally
//! rendering requests as equivalent `curl` command lines.
//!
//! ## Features
//!
//! - **Client agnostic**: requests and responses are observed through the
//!   [`RequestView`] and [`ResponseView`] traits, with adapters for the `http` crate
//! - **Verbose and cURL modes**: headers, method and bodies, or a ready-to-paste command
//! - **Pluggable output**: write to stderr, to `tracing`, or to any closure
//! - **Tower integration**: attach any [`Plugin`] to a tower client with [`PluginLayer`]
//!
//! ## Quick Start
//!
//! ```rust
//! use bytes::Bytes;
//! use netlogger::{NetworkLoggerPlugin, PluginLayer};
//! use tower::{service_fn, ServiceBuilder, ServiceExt};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! // Stand-in for a real HTTP transport
//! let transport = service_fn(|_request: http::Request<&'static str>| async {
//!     Ok::<_, std::io::Error>(http::Response::new(Bytes::from_static(
//!         b"Keep it logically awesome.",
//!     )))
//! });
//!
//! let client = ServiceBuilder::new()
//!     .layer(PluginLayer::new(NetworkLoggerPlugin::verbose()))
//!     .service(transport);
//!
//! let request = http::Request::builder()
//!     .uri("https://api.github.com/zen")
//!     .body("")?;
//! let response = client.oneshot(request).await?;
//! assert_eq!(response.status(), 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Plugins
//!
//! Implement the [`Plugin`] trait to hook your own logic into the same extension points:
//!
//! ```rust
//! use netlogger::{NetworkError, Plugin, ResponseView, Target};
//!
//! #[derive(Debug)]
//! struct StatusPrinter;
//!
//! impl Plugin for StatusPrinter {
//!     fn on_response_received(
//!         &self,
//!         result: Result<&dyn ResponseView, &NetworkError>,
//!         target: &dyn Target,
//!     ) {
//!         match result {
//!             Ok(response) => println!("{} -> {}", target.name(), response.status()),
//!             Err(err) => println!("{} failed: {err}", target.name()),
//!         }
//!     }
//! }
//! ```

use bytes::Bytes;
use futures::future::BoxFuture;
use std::{
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::{debug, instrument};

pub mod curl;
pub mod error;
pub use error::NetworkError;

pub mod formatters;

pub mod logger;
pub use logger::{NetworkLoggerPlugin, RequestBodyFormatter, ResponseBodyFormatter};

pub mod multi_plugin;
pub use multi_plugin::MultiPlugin;

pub mod output;
pub use output::{Output, StderrOutput, TracingOutput};

pub mod types;
pub use types::{
    Endpoint, HttpResponseView, InspectBody, RequestBody, RequestView, Response, ResponseView,
    StreamInfo, Target,
};

/// Configuration for [`NetworkLoggerPlugin`].
///
/// # Examples
///
/// ```rust
/// use netlogger::NetworkLoggerConfig;
///
/// // Default configuration: URL and response summary only
/// let config = NetworkLoggerConfig::default();
///
/// // Everything, with requests rendered as cURL commands
/// let config = NetworkLoggerConfig {
///     verbose: true,
///     curl: true,
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkLoggerConfig {
    /// Whether to log request headers, method and bodies
    pub verbose: bool,
    /// Whether to render requests as cURL commands instead of field by field
    pub curl: bool,
    /// Separator handed to the output sink
    pub separator: String,
    /// Terminator handed to the output sink
    pub terminator: String,
}

impl Default for NetworkLoggerConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            curl: false,
            separator: ", ".to_string(),
            terminator: "\n".to_string(),
        }
    }
}

/// Extension points of an HTTP client pipeline.
///
/// The pipeline calls [`Plugin::on_request_will_send`] right before a request goes out
/// and [`Plugin::on_response_received`] once the outcome is known, at most once each per
/// call and in that order. Both have empty default implementations.
///
/// Plugins may be invoked concurrently for different in-flight requests.
pub trait Plugin: Send + Sync + 'static {
    /// Called before a request is sent.
    ///
    /// # Arguments
    ///
    /// * `request` - The outgoing request, or `None` if it could not be built
    /// * `target` - The endpoint the request is made against
    fn on_request_will_send(&self, _request: Option<&dyn RequestView>, _target: &dyn Target) {}

    /// Called once a response has been received or the call has failed.
    ///
    /// # Arguments
    ///
    /// * `result` - The response, or the reason there is none
    /// * `target` - The endpoint the request was made against
    fn on_response_received(
        &self,
        _result: Result<&dyn ResponseView, &NetworkError>,
        _target: &dyn Target,
    ) {
    }
}

impl<P: Plugin> Plugin for Arc<P> {
    fn on_request_will_send(&self, request: Option<&dyn RequestView>, target: &dyn Target) {
        self.as_ref().on_request_will_send(request, target);
    }

    fn on_response_received(
        &self,
        result: Result<&dyn ResponseView, &NetworkError>,
        target: &dyn Target,
    ) {
        self.as_ref().on_response_received(result, target);
    }
}

/// Tower layer attaching a [`Plugin`] to an HTTP client service.
///
/// The target reported to the plugin is the [`Endpoint`] found in the request
/// extensions, or one derived from the request URI.
///
/// # Examples
///
/// ```rust
/// use netlogger::{NetworkLoggerPlugin, PluginLayer};
/// use tower::ServiceBuilder;
///
/// let layer = PluginLayer::new(NetworkLoggerPlugin::default());
/// let builder = ServiceBuilder::new().layer(layer);
/// ```
#[derive(Debug)]
pub struct PluginLayer<P> {
    plugin: Arc<P>,
}

impl<P: Plugin> PluginLayer<P> {
    pub fn new(plugin: P) -> Self {
        Self {
            plugin: Arc::new(plugin),
        }
    }
}

impl<P> Clone for PluginLayer<P> {
    fn clone(&self) -> Self {
        Self {
            plugin: self.plugin.clone(),
        }
    }
}

impl<S, P> Layer<S> for PluginLayer<P> {
    type Service = PluginService<S, P>;

    fn layer(&self, inner: S) -> Self::Service {
        PluginService {
            inner,
            plugin: self.plugin.clone(),
        }
    }
}

/// Tower service invoking a [`Plugin`] around an inner HTTP client service.
///
/// The inner service's response or error is passed through unchanged. Users
/// typically don't construct this type directly - it's created by [`PluginLayer`].
#[derive(Debug)]
pub struct PluginService<S, P> {
    inner: S,
    plugin: Arc<P>,
}

impl<S: Clone, P> Clone for PluginService<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            plugin: self.plugin.clone(),
        }
    }
}

impl<S, B, P> Service<http::Request<B>> for PluginService<S, P>
where
    S: Service<http::Request<B>, Response = http::Response<Bytes>>,
    S::Future: Send + 'static,
    S::Error: std::error::Error + Send + Sync + 'static,
    B: InspectBody,
    P: Plugin,
{
    type Response = http::Response<Bytes>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    #[instrument(skip_all)]
    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        let target = request
            .extensions()
            .get::<Endpoint>()
            .cloned()
            .unwrap_or_else(|| Endpoint::from_uri(request.uri()));
        let url = RequestView::url(&request);

        debug!(endpoint = %target.name, "Request will be sent");
        self.plugin.on_request_will_send(Some(&request), &target);

        let plugin = self.plugin.clone();
        let future = self.inner.call(request);

        Box::pin(async move {
            let result = future.await;
            debug!(endpoint = %target.name, ok = result.is_ok(), "Response received");

            match &result {
                Ok(response) => {
                    let view = HttpResponseView::new(url.as_deref(), response);
                    plugin.on_response_received(Ok(&view), &target);
                }
                Err(err) => {
                    let error = NetworkError::classify(err);
                    plugin.on_response_received(Err(&error), &target);
                }
            }

            result
        })
    }
}
