/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;

use mdtranslate::errors::{DocumentError, GlossaryError, ProviderError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_providerError_isRetryable_shouldOnlyRetryTransientFailures() {
    assert!(ProviderError::ConnectionError("reset".to_string()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("slow down".to_string()).is_retryable());
    assert!(ProviderError::ApiError { status_code: 502, message: String::new() }.is_retryable());

    assert!(!ProviderError::ApiError { status_code: 400, message: String::new() }.is_retryable());
    assert!(!ProviderError::AuthenticationError("bad key".to_string()).is_retryable());
    assert!(!ProviderError::ParseError("garbage".to_string()).is_retryable());
}

#[test]
fn test_documentError_read_shouldNamePath() {
    let error = DocumentError::Read {
        path: PathBuf::from("chapter.md"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    };
    let display = error.to_string();
    assert!(display.contains("chapter.md"));
    assert!(display.contains("gone"));
}

#[test]
fn test_glossaryError_io_shouldNamePath() {
    let error = GlossaryError::Io {
        path: PathBuf::from("terms.csv"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    };
    let display = error.to_string();
    assert!(display.contains("terms.csv"));
    assert!(display.contains("denied"));
}
