//! Output sinks receiving the lines produced by the logger.
//!
//! The logger only produces ordered lists of printable items; how they are joined
//! and where they end up is up to the [`Output`] implementation. Sinks may be
//! invoked concurrently from several in-flight requests, so thread safety is the
//! sink's responsibility (hence the `Send + Sync` bound).

use std::io::Write;
use tracing::info;

/// Destination for logger output.
///
/// Any `Fn(&str, &str, &[String]) + Send + Sync` closure is an `Output`, which
/// makes capturing output in tests straightforward:
///
/// ```rust
/// use netlogger::{NetworkLoggerPlugin, Output};
/// use std::sync::{Arc, Mutex};
///
/// let log = Arc::new(Mutex::new(Vec::<String>::new()));
/// let sink = log.clone();
/// let plugin = NetworkLoggerPlugin::verbose().with_output(
///     move |_separator: &str, _terminator: &str, items: &[String]| {
///         sink.lock().unwrap().extend_from_slice(items);
///     },
/// );
/// ```
pub trait Output: Send + Sync {
    /// Receive one log event.
    ///
    /// # Arguments
    ///
    /// * `separator` - Suggested separator between items
    /// * `terminator` - Suggested terminator after the last item
    /// * `items` - The printable items of the event, in order
    fn write(&self, separator: &str, terminator: &str, items: &[String]);
}

impl<F> Output for F
where
    F: Fn(&str, &str, &[String]) + Send + Sync,
{
    fn write(&self, separator: &str, terminator: &str, items: &[String]) {
        self(separator, terminator, items)
    }
}

/// Writes events to standard error. This is the default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrOutput;

impl Output for StderrOutput {
    fn write(&self, separator: &str, terminator: &str, items: &[String]) {
        let mut stderr = std::io::stderr().lock();
        // A failing diagnostic stream must not affect the request being logged.
        let _ = write!(stderr, "{}{}", items.join(separator), terminator);
    }
}

/// Emits each event as a `tracing` event at INFO level.
///
/// The terminator is dropped since subscribers end their own lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOutput;

impl Output for TracingOutput {
    fn write(&self, separator: &str, _terminator: &str, items: &[String]) {
        info!(target: "netlogger", "{}", items.join(separator));
    }
}
