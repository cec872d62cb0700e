//! Error classification for failed network calls.
//!
//! The logger never produces errors of its own. [`NetworkError`] describes why the
//! observed call failed so that the logger can pick the right line to print.

use std::error::Error as StdError;

/// Reasons a request can fail before a usable response reaches the plugin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The transport completed but produced no response body to work with.
    #[error("response contained no data")]
    EmptyResponse,

    /// The server answered with a status code the caller did not accept.
    #[error("status code {0} was not acceptable")]
    StatusCode(u16),

    /// The target could not be turned into a request.
    #[error("failed to map target to a request: {0}")]
    RequestMapping(String),

    /// Any other transport failure, carried as its description.
    #[error("{0}")]
    Underlying(String),
}

impl NetworkError {
    /// Classify an arbitrary transport error.
    ///
    /// The source chain is searched for an embedded [`NetworkError`] so that wrapped
    /// variants such as [`NetworkError::EmptyResponse`] keep their meaning. Anything
    /// else becomes [`NetworkError::Underlying`] with the outermost description.
    pub fn classify(err: &(dyn StdError + 'static)) -> Self {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(network) = e.downcast_ref::<NetworkError>() {
                return network.clone();
            }
            current = e.source();
        }
        NetworkError::Underlying(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("transport wrapper")]
    struct Wrapper(#[source] NetworkError);

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset by peer")]
    struct Reset;

    #[test]
    fn test_classify_direct() {
        let err = NetworkError::StatusCode(503);
        assert_eq!(NetworkError::classify(&err), NetworkError::StatusCode(503));
    }

    #[test]
    fn test_classify_finds_wrapped_empty_response() {
        let err = Wrapper(NetworkError::EmptyResponse);
        assert_eq!(NetworkError::classify(&err), NetworkError::EmptyResponse);
    }

    #[test]
    fn test_classify_foreign_error() {
        assert_eq!(
            NetworkError::classify(&Reset),
            NetworkError::Underlying("connection reset by peer".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            NetworkError::StatusCode(404).to_string(),
            "status code 404 was not acceptable"
        );
        assert_eq!(
            NetworkError::RequestMapping("bad path".into()).to_string(),
            "failed to map target to a request: bad path"
        );
    }
}
