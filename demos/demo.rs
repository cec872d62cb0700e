use bytes::Bytes;
use http::{Method, StatusCode};
use netlogger::{
    formatters, Endpoint, MultiPlugin, NetworkError, NetworkLoggerConfig, NetworkLoggerPlugin,
    PluginLayer, Target, TracingOutput,
};
use std::time::Duration;
use tokio::time::sleep;
use tower::{service_fn, ServiceBuilder, ServiceExt};
use tracing::{info, Level};

/// Transport failure raised by the fake GitHub API below
#[derive(Debug, thiserror::Error)]
#[error("github transport error")]
struct GithubError(#[source] NetworkError);

/// Stand-in for a real HTTP client: answers a few GitHub endpoints from memory
async fn fake_github(request: http::Request<Bytes>) -> Result<http::Response<Bytes>, GithubError> {
    sleep(Duration::from_millis(20)).await; // Simulate network latency

    let body = match (request.method(), request.uri().path()) {
        (&Method::GET, "/zen") => Bytes::from_static(b"Practicality beats purity."),
        (&Method::GET, "/users/octocat") => {
            Bytes::from_static(br#"{"login":"octocat","id":583231,"type":"User"}"#)
        }
        (&Method::POST, "/markdown") => {
            let text = String::from_utf8_lossy(request.body());
            Bytes::from(format!("<p>{text}</p>"))
        }
        (&Method::GET, "/empty") => return Err(GithubError(NetworkError::EmptyResponse)),
        _ => {
            return Ok(http::Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Bytes::from_static(br#"{"message":"Not Found"}"#))
                .expect("static response is valid"))
        }
    };

    Ok(http::Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json; charset=utf-8")
        .body(body)
        .expect("static response is valid"))
}

fn request(
    method: Method,
    endpoint: &Endpoint,
    body: &'static str,
) -> anyhow::Result<http::Request<Bytes>> {
    let mut request = http::Request::builder()
        .method(method)
        .uri(endpoint.url())
        .header("accept", "application/vnd.github+json")
        .body(Bytes::from_static(body.as_bytes()))?;
    request.extensions_mut().insert(endpoint.clone());
    Ok(request)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    info!("Starting network logger demo");

    // cURL commands on stderr, verbose field-by-field output through tracing
    let plugin = MultiPlugin::new()
        .with(NetworkLoggerPlugin::new(NetworkLoggerConfig {
            curl: true,
            ..Default::default()
        }))
        .with(
            NetworkLoggerPlugin::verbose()
                .with_output(TracingOutput)
                .with_response_body_formatter(formatters::pretty_json),
        );

    let client = ServiceBuilder::new()
        .layer(PluginLayer::new(plugin))
        .service(service_fn(fake_github));

    let base = "https://api.github.com";
    let calls = [
        (Method::GET, Endpoint::new("zen", base, "/zen"), ""),
        (Method::GET, Endpoint::new("userProfile", base, "/users/octocat"), ""),
        (Method::POST, Endpoint::new("markdown", base, "/markdown"), "Hello **world**"),
        (Method::GET, Endpoint::new("empty", base, "/empty"), ""),
        (Method::GET, Endpoint::new("missing", base, "/nope"), ""),
    ];

    for (method, endpoint, body) in calls {
        match client.clone().oneshot(request(method, &endpoint, body)?).await {
            Ok(response) => info!("{} answered {}", endpoint.name(), response.status()),
            Err(err) => info!("{} failed: {err}", endpoint.name()),
        }
    }

    Ok(())
}
