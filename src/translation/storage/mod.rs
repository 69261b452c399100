//! 存储模块
//!
//! 页面级翻译缓存和已翻译节点标记。

pub mod cache;
pub mod markers;

pub use cache::{CacheStats, PendingGuard, PendingTexts, TranslationCache};
pub use markers::TranslatedMarkers;
