//! 翻译系统核心模块
//!
//! - **client** (`client.rs`): 翻译服务接口和 HTTP 实现
//! - **context** (`context.rs`): 页面加载范围内的共享状态
//! - **reveal** (`reveal.rs`): 遮罩和揭示
//! - **engine** (`engine.rs`): 首次翻译和子树翻译
//! - **watcher** (`watcher.rs`): 后续插入的增量翻译
//!
//! 所有状态基于 `Rc`/`RefCell`，整个引擎运行在同一个线程的 `LocalSet` 上。

pub mod client;
pub mod context;
pub mod engine;
pub mod mock;
pub mod reveal;
pub mod watcher;

pub use client::{HttpTranslateApi, TranslateApi, TranslationPair};
pub use context::{EngineStats, PageContext, StatsSnapshot};
pub use engine::{InitialOutcome, TranslationEngine};
pub use mock::{MockMode, MockTranslateApi};
pub use reveal::{RevealController, RevealState};
pub use watcher::IncrementalWatcher;
