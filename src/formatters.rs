//! Ready-made response body formatters.

use bytes::Bytes;

/// Leave the body untouched.
pub fn identity(body: &[u8]) -> Bytes {
    Bytes::copy_from_slice(body)
}

/// Re-indent JSON bodies for reading; anything that is not JSON passes through.
///
/// ```rust
/// use netlogger::formatters::pretty_json;
///
/// let body = pretty_json(br#"{"login":"octocat"}"#);
/// assert_eq!(&body[..], b"{\n  \"login\": \"octocat\"\n}");
///
/// assert_eq!(&pretty_json(b"not json")[..], b"not json");
/// ```
pub fn pretty_json(body: &[u8]) -> Bytes {
    serde_json::from_slice::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_vec_pretty(&value))
        .map(Bytes::from)
        .unwrap_or_else(|_| identity(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_json_nested() {
        let body = pretty_json(br#"{"a":[1,2]}"#);
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            "{\n  \"a\": [\n    1,\n    2\n  ]\n}"
        );
    }

    #[test]
    fn test_pretty_json_empty_body_passes_through() {
        assert!(pretty_json(b"").is_empty());
    }
}
