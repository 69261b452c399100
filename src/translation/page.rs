//! 整页翻译入口
//!
//! 解析 HTML、运行首次翻译、等待遮罩移除，再序列化回字符串。
//! 引擎状态不是 `Send` 的，[`translate_page_blocking`] 在当前线程上
//! 自建单线程运行时和 `LocalSet`，供 `spawn_blocking` 调用。

use std::rc::Rc;

use super::config::EngineConfig;
use super::core::{HttpTranslateApi, InitialOutcome, PageContext, TranslateApi, TranslationEngine};
use super::document::LiveDocument;
use super::error::{TranslationError, TranslationResult};

/// 整页翻译结果
#[derive(Debug, Clone)]
pub struct PageTranslation {
    pub html: String,
    pub outcome: InitialOutcome,
    /// 失败的批量请求数
    pub failed_calls: u64,
}

impl PageTranslation {
    /// 首次翻译按时完成且没有失败的请求
    pub fn is_clean(&self) -> bool {
        self.outcome == InitialOutcome::Completed && self.failed_calls == 0
    }
}

/// 翻译整页 HTML，必须在 `LocalSet` 内调用
pub async fn translate_page(
    html: &str,
    config: EngineConfig,
    api: Rc<dyn TranslateApi>,
) -> PageTranslation {
    let document = Rc::new(LiveDocument::parse(html));
    let ctx = Rc::new(PageContext::new(config, api));
    let engine = TranslationEngine::new(ctx.clone(), document.clone());

    let outcome = engine.run_initial_translation().await;
    engine.reveal_controller().settled().await;

    PageTranslation {
        html: document.serialize(),
        outcome,
        failed_calls: ctx.stats.snapshot().failed_calls,
    }
}

/// 在独立的单线程运行时上翻译整页 HTML
pub fn translate_page_blocking(html: &str, config: EngineConfig) -> TranslationResult<PageTranslation> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TranslationError::ParseError(format!("创建运行时失败: {}", e)))?;

    let api: Rc<dyn TranslateApi> = Rc::new(HttpTranslateApi::new(&config)?);
    let local = tokio::task::LocalSet::new();

    Ok(local.block_on(&runtime, translate_page(html, config, api)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::core::{MockMode, MockTranslateApi};

    #[tokio::test(start_paused = true)]
    async fn test_translate_page() {
        let local = tokio::task::LocalSet::new();
        let api = Rc::new(MockTranslateApi::with_mappings(&[("Hello", "Bonjour")]));

        let result = local
            .run_until(translate_page(
                "<html><head><style id=\"__LINGUA_BLUR__\">body{}</style></head><body><p>Hello</p></body></html>",
                EngineConfig::new("fr", "key"),
                api,
            ))
            .await;

        assert_eq!(result.outcome, InitialOutcome::Completed);
        assert!(result.is_clean());
        assert!(result.html.contains("<p>Bonjour</p>"));
        assert!(result.html.contains("class=\"lingua-translated\""));
        assert!(!result.html.contains("__LINGUA_BLUR__"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_call_marks_page_degraded() {
        let local = tokio::task::LocalSet::new();
        let api = Rc::new(MockTranslateApi::new(MockMode::Error("503".to_string())));

        let result = local
            .run_until(translate_page(
                "<html><head></head><body><p>Hello</p></body></html>",
                EngineConfig::new("fr", "key"),
                api,
            ))
            .await;

        assert_eq!(result.outcome, InitialOutcome::Completed);
        assert!(result.failed_calls > 0);
        assert!(!result.is_clean());
        assert!(result.html.contains("<p>Hello</p>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_page_is_degraded() {
        let local = tokio::task::LocalSet::new();
        let api = Rc::new(MockTranslateApi::new(MockMode::Never));

        let result = local
            .run_until(translate_page(
                "<html><head></head><body><p>Hello</p></body></html>",
                EngineConfig::new("fr", "key").with_reveal_grace(std::time::Duration::ZERO),
                api,
            ))
            .await;

        assert_eq!(result.outcome, InitialOutcome::TimedOut);
        assert!(!result.is_clean());
    }
}
