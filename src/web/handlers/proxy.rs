//! 边缘代理处理器
//!
//! 所有请求都经过这里：
//!
//! - 路径带有已启用的语言段：去掉语言段向源站取页，注入脚本和链接，
//!   在服务端运行翻译引擎，带 `Content-Language` 返回并缓存
//! - 其他路径：原样转发，HTML 响应追加自动语言检测和语言切换器
//!
//! 任何环节失败都回退为透传源站的原始响应；只有透传本身也失败时才返回 502。

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::core::{detect_language_route, EdgeError, LanguageNameMap, LanguageRoute, ProjectConfig};
use crate::parsers::html::{
    add_hreflang_links, inject_auto_language_detection, inject_auto_translation,
    inject_language_context, inject_language_switcher,
};
use crate::translation::{translate_page_blocking, InitialOutcome};
use crate::web::edge_cache::EdgeCache;
use crate::web::types::{AppState, CachedPage, IncomingRequest};

/// 请求体读取上限
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// 不向下游或上游转发的头部
const SKIPPED_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
    "content-encoding",
    "accept-encoding",
];

/// 代理入口
pub async fn proxy_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("读取请求体失败: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid request body").into_response();
        }
    };

    let incoming = IncomingRequest {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        body,
    };

    match route_request(&state, &incoming).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("边缘处理失败，透传源站响应: {}", e);
            passthrough_or_bad_gateway(&state, &incoming).await
        }
    }
}

async fn route_request(state: &AppState, incoming: &IncomingRequest) -> Result<Response, EdgeError> {
    let Some(api_key) = state.config.api_key.as_deref() else {
        return passthrough(state, incoming).await;
    };

    let project_config = match state.upstream.project_config(api_key).await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("项目配置不可用，透传: {}", e);
            return passthrough(state, incoming).await;
        }
    };

    if project_config.target_languages.is_none() {
        return passthrough(state, incoming).await;
    }

    let language_names = state.upstream.language_names().await;

    match detect_language_route(incoming.path(), &project_config) {
        Some(route) => {
            tracing::info!("译文请求 {} → {} ({})", incoming.path(), route.original_path, route.lang);
            handle_translated(state, incoming, api_key, &route, &project_config, &language_names).await
        }
        None => handle_default(state, incoming, &project_config, &language_names).await,
    }
}

/// 译文页面
async fn handle_translated(
    state: &AppState,
    incoming: &IncomingRequest,
    api_key: &str,
    route: &LanguageRoute,
    project_config: &ProjectConfig,
    language_names: &LanguageNameMap,
) -> Result<Response, EdgeError> {
    let fallback_host = state.config.listen_address();
    let cache_key = EdgeCache::<CachedPage>::page_key(&incoming.public_url(&fallback_host), &route.lang);

    if let Some(cached) = state.pages.get(&cache_key) {
        tracing::debug!("边缘缓存命中: {}", cache_key);
        return Ok(cached_response(cached));
    }

    let target = state
        .config
        .origin_target(&format!("{}{}", route.original_path, incoming.query_suffix()));
    let origin_response = state.http.get(&target).send().await?;

    if !origin_response.status().is_success() || !is_html(origin_response.headers()) {
        return convert_response(origin_response).await;
    }

    let status = origin_response.status();
    let origin_headers = origin_response.headers().clone();
    let html = origin_response.text().await?;

    let public_origin = incoming.public_origin(&fallback_host);
    let html = inject_auto_translation(&html, &route.lang, api_key);
    let html = inject_language_context(&html, &route.lang);
    let html = add_hreflang_links(&html, &route.original_path, project_config, &public_origin);
    let html = inject_language_switcher(&html, project_config, language_names);

    let engine_config = state.config.engine_config(&route.lang, api_key);
    let page = tokio::task::spawn_blocking(move || translate_page_blocking(&html, engine_config))
        .await
        .map_err(|e| EdgeError::new(&format!("翻译任务异常结束: {}", e)))??;

    if page.outcome == InitialOutcome::TimedOut {
        tracing::warn!("首次翻译超时，返回部分译文: {}", incoming.path());
    }

    let clean = page.is_clean();
    let mut headers = forwardable_headers(&origin_headers);
    headers.insert(header::CONTENT_LANGUAGE, header_value(&route.lang)?);
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    if clean {
        headers.insert(
            header::CACHE_CONTROL,
            header_value(&format!("public, max-age={}", state.config.page_ttl.as_secs()))?,
        );
    } else {
        // 不完整的译文不进入任何缓存，下一次请求重新翻译
        tracing::warn!("译文不完整，不缓存: {} (失败请求 {})", incoming.path(), page.failed_calls);
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    let page = CachedPage {
        status,
        headers,
        body: Bytes::from(page.html),
    };
    if clean {
        state.pages.put(&cache_key, page.clone(), state.config.page_ttl);
    }

    Ok(cached_response(page))
}

/// 默认语言页面
async fn handle_default(
    state: &AppState,
    incoming: &IncomingRequest,
    project_config: &ProjectConfig,
    language_names: &LanguageNameMap,
) -> Result<Response, EdgeError> {
    let origin_response = forward(state, incoming).await?;

    if !is_html(origin_response.headers()) {
        return convert_response(origin_response).await;
    }

    let status = origin_response.status();
    let headers = forwardable_headers(origin_response.headers());
    let html = origin_response.text().await?;

    let html = inject_auto_language_detection(&html, project_config);
    let html = inject_language_switcher(&html, project_config, language_names);

    Ok(build_response(status, headers, Bytes::from(html)))
}

/// 原样转发到源站
async fn passthrough(state: &AppState, incoming: &IncomingRequest) -> Result<Response, EdgeError> {
    let origin_response = forward(state, incoming).await?;
    convert_response(origin_response).await
}

async fn passthrough_or_bad_gateway(state: &AppState, incoming: &IncomingRequest) -> Response {
    match passthrough(state, incoming).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("源站不可用: {}", e);
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}

async fn forward(state: &AppState, incoming: &IncomingRequest) -> Result<reqwest::Response, EdgeError> {
    let path_and_query = incoming
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = state.config.origin_target(path_and_query);

    let response = state
        .http
        .request(incoming.method.clone(), &target)
        .headers(forwardable_headers(&incoming.headers))
        .body(incoming.body.clone())
        .send()
        .await?;

    Ok(response)
}

async fn convert_response(response: reqwest::Response) -> Result<Response, EdgeError> {
    let status = response.status();
    let headers = forwardable_headers(response.headers());
    let body = response.bytes().await?;
    Ok(build_response(status, headers, body))
}

fn cached_response(page: CachedPage) -> Response {
    build_response(page.status, page.headers, page.body)
}

fn build_response(status: StatusCode, headers: HeaderMap, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for (name, value) in headers.iter() {
        if !is_skipped(name) {
            forwarded.append(name.clone(), value.clone());
        }
    }
    forwarded
}

fn is_skipped(name: &HeaderName) -> bool {
    SKIPPED_HEADERS.contains(&name.as_str())
}

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("html"))
        .unwrap_or(false)
}

fn header_value(value: &str) -> Result<HeaderValue, EdgeError> {
    HeaderValue::from_str(value).map_err(|e| EdgeError::new(&format!("无效的响应头: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwardable_headers_drops_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("site.test"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::COOKIE, HeaderValue::from_static("a=b"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("x=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("y=2"));

        let forwarded = forwardable_headers(&headers);
        assert!(forwarded.get(header::HOST).is_none());
        assert!(forwarded.get(header::CONTENT_LENGTH).is_none());
        assert!(forwarded.get(header::CONTENT_ENCODING).is_none());
        assert_eq!(forwarded.get(header::COOKIE).unwrap(), "a=b");
        assert_eq!(forwarded.get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn test_is_html() {
        let mut headers = HeaderMap::new();
        assert!(!is_html(&headers));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        assert!(is_html(&headers));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(!is_html(&headers));
    }
}
