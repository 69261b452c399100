//! Web 模块的数据类型定义

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};

use crate::web::config::WebConfig;
use crate::web::edge_cache::EdgeCache;
use crate::web::services::UpstreamClient;

/// 应用状态
pub struct AppState {
    pub config: WebConfig,
    /// 访问源站的客户端
    pub http: reqwest::Client,
    pub upstream: UpstreamClient,
    /// 译文页面缓存
    pub pages: EdgeCache<CachedPage>,
}

impl AppState {
    pub fn new(config: WebConfig) -> Result<Self, crate::core::EdgeError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let upstream = UpstreamClient::new(
            http.clone(),
            &config.api_url,
            config.config_ttl,
            config.languages_ttl,
        );

        Ok(Self {
            config,
            http,
            upstream,
            pages: EdgeCache::new(),
        })
    }

    /// 清理所有边缘缓存中的过期条目，返回清理数量
    pub fn cleanup_expired(&self) -> usize {
        let removed = self.pages.cleanup_expired() + self.upstream.cleanup_expired();
        if removed > 0 {
            let stats = self.pages.stats();
            tracing::debug!("清理过期缓存 {} 项，剩余页面 {} 个", removed, stats.total_keys);
        }
        removed
    }
}

/// 缓存中的译文页面
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// 转发前读入内存的访客请求
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: axum::http::Method,
    pub uri: axum::http::Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IncomingRequest {
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// `?` 开头的查询串，没有时为空
    pub fn query_suffix(&self) -> String {
        self.uri
            .query()
            .map(|query| format!("?{}", query))
            .unwrap_or_default()
    }

    /// 访客看到的站点源，例如 `https://example.com`
    pub fn public_origin(&self, fallback_host: &str) -> String {
        let scheme = self
            .headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("http");
        let host = self
            .headers
            .get(axum::http::header::HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| self.uri.host())
            .unwrap_or(fallback_host);

        format!("{}://{}", scheme, host)
    }

    /// 访客请求的完整 URL
    pub fn public_url(&self, fallback_host: &str) -> String {
        let path_and_query = self
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("{}{}", self.public_origin(fallback_host), path_and_query)
    }
}
