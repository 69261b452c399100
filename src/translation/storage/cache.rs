//! 页面级翻译缓存
//!
//! 键是去除首尾空白的原文，值只对应当前目标语言。缓存只在一次页面加载内有效，
//! 所有写入都是"不存在才插入"，因此多个翻译轮次交错执行时无需加锁。

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use tokio::sync::Notify;

/// 缓存条目状态
#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheState {
    /// 已在某个批量请求中发出，结果未知
    Pending,
    /// 已有译文
    Translated(String),
    /// 已请求过但没有可用译文，值等于键
    Unavailable,
}

/// `pending` 的拆分结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingTexts {
    /// 本次需要发出的新文本（已去重，保持首次出现顺序）
    pub to_send: Vec<String>,
    /// 已由其他轮次发出、尚未返回的文本
    pub in_flight: Vec<String>,
}

impl PendingTexts {
    pub fn is_empty(&self) -> bool {
        self.to_send.is_empty() && self.in_flight.is_empty()
    }
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub lookups: u64,
    pub hits: u64,
    pub sent: u64,
}

/// 翻译缓存
#[derive(Default)]
pub struct TranslationCache {
    entries: RefCell<HashMap<String, CacheState>>,
    settled: Notify,
    lookups: Cell<u64>,
    hits: Cell<u64>,
    sent: Cell<u64>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询译文
    ///
    /// 对"已请求但无译文"的条目返回原文本身；待定或未知的条目返回 `None`。
    pub fn get(&self, text: &str) -> Option<String> {
        self.lookups.set(self.lookups.get() + 1);

        let result = match self.entries.borrow().get(text) {
            Some(CacheState::Translated(translated)) => Some(translated.clone()),
            Some(CacheState::Unavailable) => Some(text.to_string()),
            Some(CacheState::Pending) | None => None,
        };

        if result.is_some() {
            self.hits.set(self.hits.get() + 1);
        }
        result
    }

    /// 拆分出需要发送的新文本，并把它们登记为待定
    pub fn pending(&self, texts: &[String]) -> PendingTexts {
        let mut entries = self.entries.borrow_mut();
        let mut seen = HashSet::new();
        let mut split = PendingTexts::default();

        for text in texts {
            if !seen.insert(text.as_str()) {
                continue;
            }

            match entries.get(text) {
                None => {
                    entries.insert(text.clone(), CacheState::Pending);
                    split.to_send.push(text.clone());
                }
                Some(CacheState::Pending) => split.in_flight.push(text.clone()),
                Some(_) => {}
            }
        }

        self.sent.set(self.sent.get() + split.to_send.len() as u64);
        split
    }

    /// 写入译文；已有结论的条目保持不变
    pub fn resolve(&self, original: &str, translated: &str) {
        if original.is_empty() || translated.is_empty() {
            return;
        }

        let mut entries = self.entries.borrow_mut();
        if matches!(
            entries.get(original),
            Some(CacheState::Translated(_)) | Some(CacheState::Unavailable)
        ) {
            return;
        }

        let state = if translated == original {
            CacheState::Unavailable
        } else {
            CacheState::Translated(translated.to_string())
        };
        entries.insert(original.to_string(), state);
    }

    /// 撤销仍处于待定状态的登记，失败的请求不会在缓存中留下痕迹
    pub fn release(&self, texts: &[String]) {
        let mut entries = self.entries.borrow_mut();
        for text in texts {
            if entries.get(text) == Some(&CacheState::Pending) {
                entries.remove(text);
            }
        }
    }

    /// 唤醒等待在途文本的轮次
    pub fn notify_settled(&self) {
        self.settled.notify_waiters();
    }

    /// 等待指定文本全部离开待定状态
    pub async fn wait_settled(&self, texts: &[String]) {
        loop {
            let notified = self.settled.notified();

            let still_pending = {
                let entries = self.entries.borrow();
                texts
                    .iter()
                    .any(|text| entries.get(text) == Some(&CacheState::Pending))
            };
            if !still_pending {
                return;
            }

            notified.await;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            lookups: self.lookups.get(),
            hits: self.hits.get(),
            sent: self.sent.get(),
        }
    }
}

/// 批量请求期间持有的待定登记
///
/// 无论请求成功、失败还是被取消，析构时都会撤销残留的待定条目并唤醒等待者。
pub struct PendingGuard<'a> {
    cache: &'a TranslationCache,
    texts: Vec<String>,
}

impl<'a> PendingGuard<'a> {
    pub fn new(cache: &'a TranslationCache, texts: Vec<String>) -> Self {
        Self { cache, texts }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.cache.release(&self.texts);
        self.cache.notify_settled();
    }
}
