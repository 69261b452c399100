//! HTML解析和处理模块
//!
//! - `utils`: 基础常量（排除标签、可翻译属性、meta 选择器）
//! - `dom`: 基础DOM操作
//! - `serializer`: 序列化功能
//! - `inject`: 边缘侧的字符串级页面注入

pub mod dom;
pub mod inject;
pub mod serializer;
pub mod utils;

pub use dom::{
    add_class, closest_with_attr, create_text_node, descendants, detach_node, find_nodes,
    get_element_by_id, get_node_attr, get_node_name, get_parent_node,
    get_text, html_to_dom, is_element, is_inclusive_descendant, parse_fragment, set_node_attr,
    set_text,
};
pub use inject::{
    add_hreflang_links, inject_auto_language_detection, inject_auto_translation,
    inject_language_context, inject_language_switcher,
};
pub use serializer::{serialize_document, serialize_to_string};
pub use utils::{
    is_excluded_tag, trim_html_whitespace, EXCLUDED_TAGS, META_SELECTORS, OPT_OUT_ATTR,
    TRANSLATABLE_ATTRIBUTES, WHITESPACES,
};
