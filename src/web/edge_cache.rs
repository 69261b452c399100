//! 边缘缓存
//!
//! 进程内的 TTL 缓存。译文页面的键是完整 URL 加语言区分参数，
//! 项目配置和语言名称使用固定的逻辑键。

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// 缓存统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_keys: usize,
    pub expired_keys: usize,
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

/// 带过期时间的并发缓存
#[derive(Debug)]
pub struct EdgeCache<T: Clone> {
    entries: DashMap<String, CacheEntry<T>>,
}

impl<T: Clone> Default for EdgeCache<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T: Clone> EdgeCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 译文页面的缓存键
    ///
    /// 同一 URL 的不同语言不会互相覆盖。
    pub fn page_key(url: &str, lang: &str) -> String {
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{}{}__cache_lang={}", url, separator, lang)
    }

    /// 读取未过期的条目；过期条目会被顺手删除
    pub fn get(&self, key: &str) -> Option<T> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        } else {
            return None;
        }

        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    /// 写入条目；TTL 为零时不缓存
    pub fn put(&self, key: &str, value: T, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// 清理过期条目，返回清理数量
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let expired_keys = self
            .entries
            .iter()
            .filter(|entry| entry.expires_at <= now)
            .count();

        CacheStats {
            total_keys: self.entries.len(),
            expired_keys,
        }
    }
}
