//! Error types for rSolr-Exporter
//!
//! This module defines the error types used throughout the application.

use thiserror::Error;

/// Instance descriptor 파싱 에러
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// 문법에 맞지 않는 descriptor
    #[error("Invalid instance descriptor '{descriptor}': {reason}")]
    InvalidDescriptor { descriptor: String, reason: String },
}

/// JSON stat block 조회 에러
///
/// Raised by the typed accessors when an admin response does not have the
/// expected shape. The carried path is dotted, e.g. `CORE.searcher.stats`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// 필드 없음
    #[error("Missing field '{path}'")]
    MissingField { path: String },

    /// 객체가 아닌 노드에 대한 필드 조회
    #[error("Expected an object at '{path}'")]
    NotAnObject { path: String },

    /// 스칼라 값이 필요한 위치에 null/객체/배열
    #[error("Expected a scalar value at '{path}'")]
    NotScalar { path: String },
}

impl LookupError {
    /// The dotted path that failed to resolve
    pub fn path(&self) -> &str {
        match self {
            LookupError::MissingField { path }
            | LookupError::NotAnObject { path }
            | LookupError::NotScalar { path } => path,
        }
    }
}

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Instance registry error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Collector error
    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),
}

/// Collector 모듈 에러 타입
#[derive(Error, Debug)]
pub enum CollectorError {
    /// HTTP 클라이언트 초기화 실패
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(#[source] reqwest::Error),

    /// URL 생성 실패
    #[error("Invalid admin URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// HTTP 요청 실패
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[source] reqwest::Error),

    /// HTTP 응답 읽기 실패
    #[error("Failed to read HTTP response: {0}")]
    HttpResponse(#[source] reqwest::Error),

    /// HTTP 상태 코드 에러
    #[error("HTTP error status: {0}")]
    HttpStatus(u16),

    /// JSON 파싱 에러
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// 타임아웃
    /// The value is the configured timeout in milliseconds, if known.
    #[error("Request timed out{}", .0.map(|ms| format!(" after {}ms", ms)).unwrap_or_default())]
    Timeout(Option<u64>),

    /// 연결 실패
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl CollectorError {
    /// Create a Timeout error with known duration
    pub fn timeout_with_duration(ms: u64) -> Self {
        CollectorError::Timeout(Some(ms))
    }

    /// HTTP 상태 코드 추출
    pub fn http_status(&self) -> Option<u16> {
        match self {
            CollectorError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }

    /// Whether the failure happened before any response was received
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CollectorError::HttpRequest(_)
                | CollectorError::Timeout(..)
                | CollectorError::ConnectionFailed(_)
        )
    }
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest doesn't expose the configured timeout; callers that know it
            // use CollectorError::timeout_with_duration() instead.
            CollectorError::Timeout(None)
        } else if err.is_connect() {
            CollectorError::ConnectionFailed(err.to_string())
        } else if err.is_request() {
            CollectorError::HttpRequest(err)
        } else {
            CollectorError::HttpResponse(err)
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        assert_eq!(
            CollectorError::timeout_with_duration(250).to_string(),
            "Request timed out after 250ms"
        );
        assert_eq!(CollectorError::Timeout(None).to_string(), "Request timed out");
    }

    #[test]
    fn test_http_status_extraction() {
        assert_eq!(CollectorError::HttpStatus(503).http_status(), Some(503));
        assert_eq!(CollectorError::JsonParse("x".into()).http_status(), None);
    }

    #[test]
    fn test_transport_classification() {
        assert!(CollectorError::Timeout(None).is_transport());
        assert!(CollectorError::ConnectionFailed("refused".into()).is_transport());
        assert!(!CollectorError::HttpStatus(500).is_transport());
        assert!(!CollectorError::JsonParse("eof".into()).is_transport());
    }

    #[test]
    fn test_lookup_error_path() {
        let err = LookupError::MissingField {
            path: "QUERYHANDLER./update".to_string(),
        };
        assert_eq!(err.path(), "QUERYHANDLER./update");
        assert_eq!(err.to_string(), "Missing field 'QUERYHANDLER./update'");
    }
}
