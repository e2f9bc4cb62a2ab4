//! Classify HTTP status and curl errors into retry policy error kinds.

use super::error::TransportError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a transport error into an ErrorKind.
pub fn classify(e: &TransportError) -> ErrorKind {
    match e {
        TransportError::Curl(ce) => classify_curl_error(ce),
        TransportError::Http(code) => classify_http_status(*code),
        TransportError::Credential(_)
        | TransportError::Form(_)
        | TransportError::Encode(_)
        | TransportError::Aborted => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_429_and_503_throttled() {
        assert_eq!(classify_http_status(429), ErrorKind::Throttled);
        assert_eq!(classify_http_status(503), ErrorKind::Throttled);
    }

    #[test]
    fn http_5xx_retryable() {
        assert!(matches!(classify_http_status(500), ErrorKind::Http5xx(500)));
        assert!(matches!(classify_http_status(502), ErrorKind::Http5xx(502)));
    }

    #[test]
    fn http_4xx_other() {
        assert_eq!(classify_http_status(401), ErrorKind::Other);
        assert_eq!(classify_http_status(413), ErrorKind::Other);
    }

    #[test]
    fn credential_errors_not_retried() {
        let e = TransportError::Credential("token file missing".into());
        assert_eq!(classify(&e), ErrorKind::Other);
    }

    #[test]
    fn aborted_requests_not_retried() {
        assert_eq!(classify(&TransportError::Aborted), ErrorKind::Other);
    }

    #[test]
    fn curl_timeout_and_connect_classified() {
        // CURLE_OPERATION_TIMEDOUT = 28, CURLE_COULDNT_CONNECT = 7
        assert_eq!(classify_curl_error(&curl::Error::new(28)), ErrorKind::Timeout);
        assert_eq!(
            classify(&TransportError::Curl(curl::Error::new(7))),
            ErrorKind::Connection
        );
    }
}
