//! cURL command rendering for outgoing requests.

use http::Method;

use crate::types::{RequestBody, RequestView};

const SEPARATOR: &str = " \\\n\t";

/// Render `request` as a `curl` invocation that reproduces it.
///
/// Returns `None` when the request has no resolved URL.
///
/// ```rust
/// use netlogger::curl;
///
/// let request = http::Request::builder()
///     .uri("https://api.github.com/zen")
///     .header("content-type", "application/json")
///     .body("cool body")
///     .unwrap();
///
/// let command = curl::render(&request).unwrap();
/// assert!(command.starts_with("$ curl -i"));
/// assert!(command.contains("-H \"Content-Type: application/json\""));
/// assert!(command.contains("-d \"cool body\""));
/// assert!(command.ends_with("\"https://api.github.com/zen\""));
/// ```
pub fn render<R: RequestView + ?Sized>(request: &R) -> Option<String> {
    let url = request.url()?;
    let mut components = vec!["$ curl -i".to_string()];

    let method = request.method();
    if method != Method::GET {
        components.push(format!("-X {method}"));
    }

    for (name, value) in request.headers() {
        components.push(format!("-H \"{}: {}\"", escape(&name), escape(&value)));
    }

    if let RequestBody::Bytes(body) = request.body() {
        // Binary payloads cannot be pasted into a shell line.
        if let Ok(text) = std::str::from_utf8(body) {
            components.push(format!("-d \"{}\"", escape(text)));
        }
    }

    components.push(format!("\"{url}\""));
    Some(components.join(SEPARATOR))
}

/// Escape for a double-quoted shell word, where `\`, `"`, `$` and `` ` `` stay special.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
