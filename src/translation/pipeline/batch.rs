//! 批量翻译器
//!
//! 一次扫描只发一次请求：先在缓存中去重，只把从未请求过的文本发出去，
//! 再把结果写回缓存。失败只记录日志，缓存保持不变。

use crate::translation::core::PageContext;
use crate::translation::error::helpers;
use crate::translation::storage::PendingGuard;

/// 一次批量翻译的结果摘要
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// 本次实际发送的文本数
    pub sent: usize,
    /// 写入缓存的结果数
    pub resolved: usize,
    /// 等待其他轮次返回的文本数
    pub waited: usize,
    /// 请求是否失败
    pub failed: bool,
}

/// 批量翻译器
pub struct BatchTranslator<'a> {
    ctx: &'a PageContext,
}

impl<'a> BatchTranslator<'a> {
    pub fn new(ctx: &'a PageContext) -> Self {
        Self { ctx }
    }

    /// 翻译一组文本并写入缓存
    ///
    /// 返回时，本次发出的请求已经结束（成功或失败），
    /// 其他轮次正在请求的文本也已经有了结果。
    pub async fn translate(&self, texts: &[String]) -> BatchReport {
        let cache = &self.ctx.cache;
        let split = cache.pending(texts);

        let mut report = BatchReport {
            waited: split.in_flight.len(),
            ..Default::default()
        };

        if split.is_empty() {
            return report;
        }

        if !split.to_send.is_empty() {
            report.sent = split.to_send.len();
            let guard = PendingGuard::new(cache, split.to_send);

            tracing::debug!("发送翻译批次: {} 条文本", report.sent);
            self.ctx.stats.inc_batch_calls();

            match self.ctx.api.translate(self.ctx.lang(), guard.texts()).await {
                Ok(pairs) => {
                    for pair in pairs.iter() {
                        if let Some((original, translated)) = pair.as_complete() {
                            cache.resolve(original, translated);
                            report.resolved += 1;
                        }
                    }

                    if report.resolved < report.sent {
                        tracing::debug!(
                            "翻译结果不完整: 发送 {}，返回 {}",
                            report.sent,
                            report.resolved
                        );
                    }
                }
                Err(e) => {
                    helpers::log_error(&e.with_context(format!("{} 条文本", report.sent)));
                    self.ctx.stats.inc_failed_calls();
                    report.failed = true;
                }
            }

            // 未返回结果的文本撤销登记，后续轮次可以重试
            drop(guard);
        }

        if !split.in_flight.is_empty() {
            let wait = cache.wait_settled(&split.in_flight);
            if tokio::time::timeout(self.ctx.config.request_timeout, wait)
                .await
                .is_err()
            {
                tracing::debug!("等待在途文本超时: {} 条", split.in_flight.len());
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::translation::config::EngineConfig;
    use crate::translation::core::mock::{MockMode, MockTranslateApi};

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn context(api: Rc<MockTranslateApi>) -> PageContext {
        PageContext::new(EngineConfig::new("fr", "key"), api)
    }

    #[tokio::test]
    async fn test_duplicates_are_sent_once() {
        let api = Rc::new(MockTranslateApi::new(MockMode::Prefix));
        let ctx = context(api.clone());
        let translator = BatchTranslator::new(&ctx);

        let report = translator.translate(&texts(&["Hello", "World", "Hello"])).await;
        assert_eq!(report.sent, 2);
        assert_eq!(api.calls(), vec![texts(&["Hello", "World"])]);
        assert_eq!(ctx.cache.get("Hello").as_deref(), Some("[fr] Hello"));

        // 全部命中缓存时不发请求
        let report = translator.translate(&texts(&["World", "Hello"])).await;
        assert_eq!(report.sent, 0);
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_call() {
        let api = Rc::new(MockTranslateApi::new(MockMode::Prefix));
        let ctx = context(api.clone());

        let report = BatchTranslator::new(&ctx).translate(&[]).await;
        assert_eq!(report, BatchReport::default());
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_leaves_cache_unchanged() {
        let api = Rc::new(MockTranslateApi::new(MockMode::Error("HTTP 500".into())));
        let ctx = context(api.clone());
        let translator = BatchTranslator::new(&ctx);

        let report = translator.translate(&texts(&["Hello"])).await;
        assert!(report.failed);
        assert!(ctx.cache.is_empty());

        // 失败的文本在下一轮会重新发送
        translator.translate(&texts(&["Hello"])).await;
        assert_eq!(api.times_requested("Hello"), 2);
        assert_eq!(ctx.stats.snapshot().failed_calls, 2);
    }

    #[tokio::test]
    async fn test_missing_results_stay_retryable() {
        let api = Rc::new(MockTranslateApi::with_mappings(&[("Hello", "Bonjour")]));
        let ctx = context(api.clone());
        let translator = BatchTranslator::new(&ctx);

        let report = translator.translate(&texts(&["Hello", "Unknown"])).await;
        assert_eq!(report.resolved, 1);
        assert_eq!(ctx.cache.get("Unknown"), None);

        translator.translate(&texts(&["Hello", "Unknown"])).await;
        assert_eq!(api.calls()[1], texts(&["Unknown"]));
    }

    #[tokio::test]
    async fn test_identity_results_are_not_resent() {
        let api = Rc::new(MockTranslateApi::new(MockMode::NoOp));
        let ctx = context(api.clone());
        let translator = BatchTranslator::new(&ctx);

        translator.translate(&texts(&["Acme"])).await;
        translator.translate(&texts(&["Acme"])).await;

        assert_eq!(api.call_count(), 1);
        assert_eq!(ctx.cache.get("Acme").as_deref(), Some("Acme"));
    }
}
