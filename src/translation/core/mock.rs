//! 测试用翻译服务
//!
//! 不访问网络，记录每次请求的文本，便于断言批次行为。

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;

use super::client::{TranslateApi, TranslationPair};
use crate::translation::error::{TranslationError, TranslationResult};

/// 模拟模式
#[derive(Debug, Clone)]
pub enum MockMode {
    /// 加语言前缀："Hello" → "[fr] Hello"
    Prefix,
    /// 按映射表翻译，表中没有的文本不出现在响应里
    Mappings(HashMap<String, String>),
    /// 原样返回
    NoOp,
    /// 返回服务错误
    Error(String),
    /// 永不返回
    Never,
}

/// 模拟翻译服务
pub struct MockTranslateApi {
    mode: MockMode,
    calls: RefCell<Vec<Vec<String>>>,
}

impl MockTranslateApi {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_mappings(pairs: &[(&str, &str)]) -> Self {
        let mappings = pairs
            .iter()
            .map(|(original, translated)| (original.to_string(), translated.to_string()))
            .collect();
        Self::new(MockMode::Mappings(mappings))
    }

    /// 每次请求携带的文本
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// 某个文本出现在多少次请求中
    pub fn times_requested(&self, text: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.iter().any(|t| t == text))
            .count()
    }
}

#[async_trait(?Send)]
impl TranslateApi for MockTranslateApi {
    async fn translate(&self, lang: &str, texts: &[String]) -> TranslationResult<Vec<TranslationPair>> {
        self.calls.borrow_mut().push(texts.to_vec());

        // 让出一次执行权，模拟网络等待
        tokio::task::yield_now().await;

        match &self.mode {
            MockMode::Prefix => Ok(texts
                .iter()
                .map(|text| TranslationPair::new(text, &format!("[{}] {}", lang, text)))
                .collect()),
            MockMode::Mappings(mappings) => Ok(texts
                .iter()
                .filter_map(|text| {
                    mappings
                        .get(text)
                        .map(|translated| TranslationPair::new(text, translated))
                })
                .collect()),
            MockMode::NoOp => Ok(texts.iter().map(|text| TranslationPair::new(text, text)).collect()),
            MockMode::Error(message) => Err(TranslationError::TranslationServiceError(message.clone())),
            MockMode::Never => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        }
    }
}
