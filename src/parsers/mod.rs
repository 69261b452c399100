//! # 解析器模块
//!
//! 这个模块包含所有用于解析和改写页面的功能：
//!
//! - HTML解析和DOM操作
//! - 边缘侧页面注入（遮罩、hreflang、语言切换器等）
//! - 链接重写，为站内链接加上语言段前缀
//!
//! # 模块组织
//!
//! - `html` - HTML文档解析、DOM操作、序列化和注入
//! - `link_rewriter` - 链接重写功能

pub mod html;
pub mod link_rewriter;

// Re-export commonly used items for convenience
pub use html::{html_to_dom, parse_fragment, serialize_document, serialize_to_string};
pub use link_rewriter::{rewrite_href, rewrite_links_in_subtree};
