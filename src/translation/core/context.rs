//! 页面加载上下文
//!
//! 一次页面加载内共享的全部可变状态：缓存、已翻译标记和"正在翻译"标志。
//! 每次页面加载构造一次，通过 `Rc` 传给各个子组件。

use std::cell::Cell;
use std::rc::Rc;

use super::client::TranslateApi;
use crate::translation::config::EngineConfig;
use crate::translation::storage::{TranslatedMarkers, TranslationCache};

/// 运行统计
#[derive(Debug, Default)]
pub struct EngineStats {
    batch_calls: Cell<u64>,
    failed_calls: Cell<u64>,
    units_applied: Cell<u64>,
    subtrees_processed: Cell<u64>,
    links_rewritten: Cell<u64>,
}

impl EngineStats {
    pub fn inc_batch_calls(&self) {
        self.batch_calls.set(self.batch_calls.get() + 1);
    }

    pub fn inc_failed_calls(&self) {
        self.failed_calls.set(self.failed_calls.get() + 1);
    }

    pub fn add_units_applied(&self, count: usize) {
        self.units_applied.set(self.units_applied.get() + count as u64);
    }

    pub fn inc_subtrees_processed(&self) {
        self.subtrees_processed.set(self.subtrees_processed.get() + 1);
    }

    pub fn add_links_rewritten(&self, count: usize) {
        self.links_rewritten.set(self.links_rewritten.get() + count as u64);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            batch_calls: self.batch_calls.get(),
            failed_calls: self.failed_calls.get(),
            units_applied: self.units_applied.get(),
            subtrees_processed: self.subtrees_processed.get(),
            links_rewritten: self.links_rewritten.get(),
        }
    }
}

/// 统计快照
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub batch_calls: u64,
    pub failed_calls: u64,
    pub units_applied: u64,
    pub subtrees_processed: u64,
    pub links_rewritten: u64,
}

/// 页面加载上下文
pub struct PageContext {
    pub config: EngineConfig,
    pub cache: TranslationCache,
    pub markers: TranslatedMarkers,
    pub api: Rc<dyn TranslateApi>,
    pub stats: EngineStats,
    translating: Cell<bool>,
}

impl PageContext {
    pub fn new(config: EngineConfig, api: Rc<dyn TranslateApi>) -> Self {
        Self {
            config,
            cache: TranslationCache::new(),
            markers: TranslatedMarkers::new(),
            api,
            stats: EngineStats::default(),
            translating: Cell::new(false),
        }
    }

    /// 当前目标语言
    pub fn lang(&self) -> &str {
        &self.config.lang
    }

    pub fn is_translating(&self) -> bool {
        self.translating.get()
    }

    pub(crate) fn set_translating(&self, value: bool) {
        self.translating.set(value);
    }
}
