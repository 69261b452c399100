//! # Lingua Edge
//!
//! 按语言路径段提供网站译文的边缘代理，以及在页面文档上运行的翻译引擎。
//!
//! ## 模块组织
//!
//! - `core` - 项目配置、语言路由和边缘错误类型
//! - `env` - 环境变量配置
//! - `parsers` - HTML解析、页面注入和链接重写
//! - `translation` - 页面翻译引擎（收集、批次、写回、揭示、增量观察）
//! - `web` - 边缘代理服务器（可选）

pub mod core;
pub mod env;
pub mod parsers;
pub mod translation;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used items for convenience
pub use crate::core::*;
pub use crate::parsers::*;
