// 集成测试公共模块
//
// 提供测试页面、引擎装配和模拟服务

#![allow(dead_code)]

use std::rc::Rc;
use std::time::Duration;

use lingua_edge::translation::core::{MockMode, MockTranslateApi};
use lingua_edge::translation::{EngineConfig, LiveDocument, PageContext, TranslationEngine};

/// 带遮罩样式的典型页面
pub const SIMPLE_PAGE: &str = r#"<html lang="en"><head>
<style id="__LINGUA_BLUR__">html{filter:blur(8px)}</style>
<title>Welcome</title>
<meta name="description" content="A small test site">
</head><body>
<h1>Hello world</h1>
<p>Read the <a href="/docs">documentation</a> first.</p>
<img src="/logo.png" alt="Company logo">
<input placeholder="Search the site">
<script>var greeting = "Hello world";</script>
<style>.x { content: "Hidden"; }</style>
<code>let answer = 42;</code>
<div translate="no"><p>BrandName</p></div>
<div id="feed"></div>
</body></html>"#;

/// 测试页面构建器
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    pub fn page_with_body(body: &str) -> String {
        format!(
            "<html><head><style id=\"__LINGUA_BLUR__\">html{{}}</style><title>Test</title></head><body>{}</body></html>",
            body
        )
    }

    pub fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }
}

/// 一个页面加载的测试环境
pub struct TestEnvironment {
    pub engine: Rc<TranslationEngine>,
    pub api: Rc<MockTranslateApi>,
}

impl TestEnvironment {
    pub fn new(html: &str, mode: MockMode) -> Self {
        Self::with_config(html, mode, EngineConfig::new("fr", "test-key"))
    }

    pub fn with_config(html: &str, mode: MockMode, config: EngineConfig) -> Self {
        Self::with_api(html, Rc::new(MockTranslateApi::new(mode)), config)
    }

    pub fn with_api(html: &str, api: Rc<MockTranslateApi>, config: EngineConfig) -> Self {
        let ctx = Rc::new(PageContext::new(config, api.clone()));
        let document = Rc::new(LiveDocument::parse(html));
        let engine = Rc::new(TranslationEngine::new(ctx, document));
        Self { engine, api }
    }

    pub fn document(&self) -> &Rc<LiveDocument> {
        self.engine.document()
    }

    pub fn html(&self) -> String {
        self.engine.document().serialize()
    }

    /// 所有请求中出现过的文本
    pub fn requested_texts(&self) -> Vec<String> {
        self.api.calls().into_iter().flatten().collect()
    }
}

/// 在 `LocalSet` 上运行引擎代码
pub async fn run_local<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    tokio::task::LocalSet::new().run_until(future).await
}

pub fn short_grace() -> EngineConfig {
    EngineConfig::new("fr", "test-key").with_reveal_grace(Duration::ZERO)
}
