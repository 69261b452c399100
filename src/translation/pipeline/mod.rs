//! 翻译管道模块
//!
//! 收集 → 批量翻译 → 写回

pub mod apply;
pub mod batch;
pub mod collector;

pub use apply::{apply_units, ApplyReport};
pub use batch::{BatchReport, BatchTranslator};
pub use collector::{collect_units, is_blocked, unit_texts, ExtractedUnit, RootKind};
