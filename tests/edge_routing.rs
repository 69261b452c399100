//! 边缘代理集成测试
//!
//! 源站和上游服务都由 wiremock 模拟，路由器通过 `oneshot` 直接调用

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

use lingua_edge::parsers::html::inject::{AUTO_DETECT_ID, AUTO_TRANSLATE_ID, SWITCHER_CLASS};
use lingua_edge::web::{create_router, AppState, WebConfig};

const ABOUT_PAGE: &str = "<html><head><title>About</title></head>\
<body><h1>About us</h1><a href=\"/contact\">Contact</a></body></html>";

/// 给每个文本加上语言前缀的翻译服务
struct PrefixTranslator;

impl Respond for PrefixTranslator {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        let body: Value = request.body_json().unwrap_or(Value::Null);
        let lang = body["language"].as_str().unwrap_or("xx").to_string();
        let translations: Vec<Value> = body["texts"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|text| text.as_str().map(str::to_string))
            .map(|text| json!({ "original": text, "translated": format!("[{}] {}", lang, text) }))
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({ "translations": translations }))
    }
}

struct TestServers {
    origin: MockServer,
    api: MockServer,
}

impl TestServers {
    async fn start() -> Self {
        let origin = MockServer::start().await;
        let api = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/languages/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "languages": [
                    { "code": "en", "name": "English" },
                    { "code": "fr", "name": "French" },
                    { "code": "de", "name": "German" }
                ]
            })))
            .mount(&api)
            .await;

        Self { origin, api }
    }

    async fn mount_project_config(&self) {
        Mock::given(method("GET"))
            .and(path("/plan-status/"))
            .and(query_param("api_key", "project-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "default_language": "en",
                "target_languages": ["fr", "de"]
            })))
            .expect(1)
            .mount(&self.api)
            .await;
    }

    async fn mount_page(&self, page_path: &str, body: &str, expected_hits: u64) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8"),
            )
            .expect(expected_hits)
            .mount(&self.origin)
            .await;
    }

    fn config(&self, api_key: Option<&str>) -> WebConfig {
        WebConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 7080,
            origin_url: self.origin.uri(),
            api_key: api_key.map(str::to_string),
            api_url: self.api.uri(),
            page_ttl: Duration::from_secs(3600),
            config_ttl: Duration::from_secs(3600),
            languages_ttl: Duration::from_secs(86400),
            translate_timeout: Duration::from_secs(5),
        }
    }

    fn router(&self, api_key: Option<&str>) -> Router {
        let state = AppState::new(self.config(api_key)).expect("app state");
        create_router(Arc::new(state))
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let request = Request::builder()
        .uri(uri)
        .header(header::HOST, "site.test")
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_language_path_serves_translated_page() {
    let servers = TestServers::start().await;
    servers.mount_project_config().await;
    // 第二次请求命中边缘缓存，源站和翻译服务都只访问一次
    servers.mount_page("/about", ABOUT_PAGE, 1).await;
    Mock::given(method("POST"))
        .and(path("/translate/"))
        .respond_with(PrefixTranslator)
        .expect(1)
        .mount(&servers.api)
        .await;

    let router = servers.router(Some("project-key"));
    let (status, headers, body) = get(&router, "/fr/about").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_LANGUAGE).unwrap(), "fr");
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "public, max-age=3600");

    assert!(body.contains("<h1>[fr] About us</h1>"));
    assert!(body.contains("<title>[fr] About</title>"));
    assert!(body.contains("href=\"/fr/contact\""));
    assert!(body.contains(AUTO_TRANSLATE_ID));
    assert!(body.contains(SWITCHER_CLASS));
    assert!(!body.contains("__LINGUA_BLUR__"));

    for (lang, href) in [
        ("en", "https://site.test/about"),
        ("fr", "https://site.test/fr/about"),
        ("de", "https://site.test/de/about"),
        ("x-default", "https://site.test/about"),
    ] {
        let link = format!("hreflang=\"{}\" href=\"{}\"", lang, href);
        assert!(body.contains(&link), "missing {}", link);
    }

    let (status, headers, cached) = get(&router, "/fr/about").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_LANGUAGE).unwrap(), "fr");
    assert_eq!(cached, body);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_translation_is_not_cached() {
    let servers = TestServers::start().await;
    servers.mount_project_config().await;
    // 第一次译文失败不进缓存，第二次重新回源
    servers.mount_page("/about", ABOUT_PAGE, 2).await;
    Mock::given(method("POST"))
        .and(path("/translate/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&servers.api)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate/"))
        .respond_with(PrefixTranslator)
        .expect(1)
        .mount(&servers.api)
        .await;

    let router = servers.router(Some("project-key"));
    let (status, headers, body) = get(&router, "/fr/about").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    assert!(body.contains("<h1>About us</h1>"));

    let (status, headers, body) = get(&router, "/fr/about").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "public, max-age=3600");
    assert!(body.contains("<h1>[fr] About us</h1>"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_default_path_gets_detection_and_switcher() {
    let servers = TestServers::start().await;
    servers.mount_project_config().await;
    servers.mount_page("/about", ABOUT_PAGE, 1).await;

    let router = servers.router(Some("project-key"));
    let (status, headers, body) = get(&router, "/about").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.get(header::CONTENT_LANGUAGE).is_none());
    assert!(body.contains(AUTO_DETECT_ID));
    assert!(body.contains(SWITCHER_CLASS));
    assert!(body.contains(">French</option>"));
    assert!(!body.contains(AUTO_TRANSLATE_ID));
    assert!(body.contains("<h1>About us</h1>"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_html_translated_path_is_returned_as_is() {
    let servers = TestServers::start().await;
    servers.mount_project_config().await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#.as_bytes().to_vec(), "application/json"),
        )
        .mount(&servers.origin)
        .await;

    let router = servers.router(Some("project-key"));
    let (status, headers, body) = get(&router, "/fr/data.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.get(header::CONTENT_LANGUAGE).is_none());
    assert_eq!(body, r#"{"ok":true}"#);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_failure_passes_origin_through() {
    let servers = TestServers::start().await;
    Mock::given(method("GET"))
        .and(path("/plan-status/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&servers.api)
        .await;
    servers.mount_page("/about", ABOUT_PAGE, 1).await;

    let router = servers.router(Some("project-key"));
    let (status, _, body) = get(&router, "/about").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ABOUT_PAGE);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_api_key_passes_origin_through() {
    let servers = TestServers::start().await;
    Mock::given(method("GET"))
        .and(path("/plan-status/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&servers.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/fr/about"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&servers.origin)
        .await;

    let router = servers.router(None);
    let (status, _, body) = get(&router, "/fr/about").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "not here");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_origin_returns_bad_gateway() {
    let servers = TestServers::start().await;
    let mut config = servers.config(None);
    config.origin_url = "http://127.0.0.1:1".to_string();
    let router = create_router(Arc::new(AppState::new(config).unwrap()));

    let (status, _, _) = get(&router, "/anything").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
