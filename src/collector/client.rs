//! Solr admin HTTP 클라이언트
//!
//! Connection pooling과 타임아웃을 지원하는 비동기 HTTP 클라이언트입니다.
//! 실패는 호출 단위로 격리되며 재시도하지 않습니다.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, error, instrument};
use url::Url;

use crate::error::CollectorError;

/// Collector 작업 결과 타입
pub type CollectResult<T> = Result<T, CollectorError>;

/// Solr admin HTTP 클라이언트
///
/// Holds no per-call state, so one instance is shared by every instance and core.
#[derive(Clone)]
pub struct AdminClient {
    client: Client,
    context: String,
    timeout_ms: u64,
}

impl AdminClient {
    /// 새 클라이언트 생성
    ///
    /// # Arguments
    /// * `context` - web application path segment (예: "solr")
    /// * `timeout_ms` - 요청 타임아웃 (밀리초)
    ///
    /// # Example
    /// ```ignore
    /// let client = AdminClient::new("solr", 5000)?;
    /// let status = client.fetch("localhost", 8983, "/admin/cores?action=STATUS&wt=json").await;
    /// ```
    pub fn new(context: &str, timeout_ms: u64) -> CollectResult<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(CollectorError::HttpClientInit)?;

        Ok(Self {
            client,
            context: context.to_string(),
            timeout_ms,
        })
    }

    /// `http://host:port/<context>/<path>` 생성
    ///
    /// The path part is normalized, the query string (after `?`) is kept as is.
    pub fn admin_url(&self, host: &str, port: u16, path: &str) -> CollectResult<Url> {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };

        let base = format!("http://{}:{}", host, port);
        let mut url = Url::parse(&base).map_err(|e| CollectorError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;

        url.set_path(&normalize_path(&format!("/{}/{}", self.context, path)));
        url.set_query(query);
        Ok(url)
    }

    /// GET 후 JSON 디코딩 - 실패 원인을 그대로 반환
    #[instrument(skip(self), level = "debug")]
    pub async fn try_fetch(&self, host: &str, port: u16, path: &str) -> CollectResult<Value> {
        let url = self.admin_url(host, port, path)?;

        debug!(url = %url, "Sending admin request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectorError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;

        serde_json::from_str(&body).map_err(|e| CollectorError::JsonParse(e.to_string()))
    }

    /// GET 후 JSON 디코딩 - 실패 시 에러 로그 후 `None`
    ///
    /// Exactly one request is sent; every failure kind is logged once here.
    pub async fn fetch(&self, host: &str, port: u16, path: &str) -> Option<Value> {
        match self.try_fetch(host, port, path).await {
            Ok(value) => Some(value),
            Err(e) => {
                let url = self
                    .admin_url(host, port, path)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| format!("{}:{}{}", host, port, path));
                error!(url = %url, error = %e, "Admin request failed");
                None
            }
        }
    }

    fn classify(&self, err: reqwest::Error) -> CollectorError {
        if err.is_timeout() {
            CollectorError::timeout_with_duration(self.timeout_ms)
        } else {
            CollectorError::from(err)
        }
    }
}

/// POSIX `normpath` 방식의 경로 정규화
///
/// Collapses repeated separators, drops `.` segments and resolves `..`, so an
/// empty core name never produces `//` in the request path.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let client = AdminClient::new("solr", 5000);
        assert!(client.is_ok());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("//admin/ping"), "/admin/ping");
        assert_eq!(normalize_path("/core1/./admin//mbeans"), "/core1/admin/mbeans");
        assert_eq!(normalize_path("/a/../b"), "/b");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_admin_url_with_core() {
        let client = AdminClient::new("solr", 5000).unwrap();
        let url = client
            .admin_url("solr1", 8983, "/shard1/admin/ping?wt=json")
            .unwrap();
        assert_eq!(url.as_str(), "http://solr1:8983/solr/shard1/admin/ping?wt=json");
    }

    #[test]
    fn test_admin_url_empty_core() {
        let client = AdminClient::new("solr", 5000).unwrap();
        let url = client
            .admin_url("localhost", 8983, &format!("/{}/admin/ping?wt=json", ""))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8983/solr/admin/ping?wt=json");
    }

    #[test]
    fn test_admin_url_empty_context() {
        let client = AdminClient::new("", 5000).unwrap();
        let url = client
            .admin_url("localhost", 8983, "/admin/cores?action=STATUS&wt=json")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8983/admin/cores?action=STATUS&wt=json"
        );
    }

    #[test]
    fn test_admin_url_rejects_bad_host() {
        let client = AdminClient::new("solr", 5000).unwrap();
        assert!(matches!(
            client.admin_url("bad host", 8983, "/admin/ping"),
            Err(CollectorError::InvalidUrl { .. })
        ));
    }
}
