//! 翻译模块
//!
//! 页面级翻译引擎，采用清晰的模块化架构：
//! - **core**: 引擎、揭示控制、增量观察和翻译服务客户端
//! - **pipeline**: 文本处理管道（收集、批次、写回）
//! - **storage**: 页面级缓存和已翻译标记
//! - **document**: 可观察的活动文档
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use lingua_edge::translation::{translate_page_blocking, EngineConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let html = "<html><head></head><body><p>Hello</p></body></html>";
//! let page = translate_page_blocking(html, EngineConfig::new("fr", "project-key"))?;
//! println!("{:?}: {}", page.outcome, page.html);
//! # Ok(())
//! # }
//! ```

/// 配置管理模块 - 目标语言、服务地址和时间预算
pub mod config;

/// 核心翻译引擎模块
///
/// 包含首次翻译、揭示控制、增量观察等核心功能
pub mod core;

/// 可观察的活动文档
pub mod document;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 整页翻译入口
pub mod page;

/// 文本处理管道模块 - 文本收集、批次处理和写回
pub mod pipeline;

/// 存储管理模块 - 页面级缓存和已翻译标记
pub mod storage;

pub use config::{constants, EngineConfig};
pub use self::core::{
    HttpTranslateApi, IncrementalWatcher, InitialOutcome, PageContext, RevealController,
    RevealState, TranslateApi, TranslationEngine, TranslationPair,
};
pub use document::{LiveDocument, MutationObserver, MutationRecord};
pub use error::{ErrorSeverity, TranslationError, TranslationResult};
pub use page::{translate_page, translate_page_blocking, PageTranslation};
pub use pipeline::{
    apply_units, collect_units, ApplyReport, BatchReport, BatchTranslator, ExtractedUnit, RootKind,
};
pub use storage::{CacheStats, TranslatedMarkers, TranslationCache};
