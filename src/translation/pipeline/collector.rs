//! 文本收集器模块
//!
//! 按文档顺序从子树中收集可翻译的文本节点和属性值

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::{
    descendants, get_node_attr, get_node_name, get_parent_node, is_excluded_tag,
    trim_html_whitespace, META_SELECTORS, OPT_OUT_ATTR, TRANSLATABLE_ATTRIBUTES,
};
use crate::translation::core::PageContext;

/// 收集的根节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// 文档 `<head>`：文本只取 `<title>`，额外收集 meta 内容
    Head,
    /// 文档 `<body>`
    Body,
    /// 后续插入的子树
    Subtree,
}

/// 单个待翻译单元
#[derive(Debug, Clone)]
pub enum ExtractedUnit {
    /// 文本节点
    Text { node: Handle, text: String },
    /// 元素属性
    Attribute {
        element: Handle,
        name: String,
        text: String,
    },
}

impl ExtractedUnit {
    /// 去除空白后的原文
    pub fn text(&self) -> &str {
        match self {
            ExtractedUnit::Text { text, .. } => text,
            ExtractedUnit::Attribute { text, .. } => text,
        }
    }

    /// 承载标记的节点
    pub fn node(&self) -> &Handle {
        match self {
            ExtractedUnit::Text { node, .. } => node,
            ExtractedUnit::Attribute { element, .. } => element,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, ExtractedUnit::Attribute { .. })
    }
}

/// 收集子树中的待翻译单元
///
/// 先收集文本节点，再收集属性；两部分各自保持文档顺序。
pub fn collect_units(ctx: &PageContext, root: &Handle, kind: RootKind) -> Vec<ExtractedUnit> {
    let mut units = collect_text_units(ctx, root, kind);
    units.extend(collect_attribute_units(ctx, root, kind));

    tracing::debug!("{:?} 收集到 {} 个待翻译单元", kind, units.len());
    units
}

/// 把单元列表转换为请求文本列表
pub fn unit_texts(units: &[ExtractedUnit]) -> Vec<String> {
    units.iter().map(|unit| unit.text().to_string()).collect()
}

fn collect_text_units(ctx: &PageContext, root: &Handle, kind: RootKind) -> Vec<ExtractedUnit> {
    let mut units = Vec::new();

    for node in descendants(root) {
        let NodeData::Text { ref contents } = node.data else {
            continue;
        };

        if ctx.markers.is_marked(&node) {
            continue;
        }

        let text = trim_html_whitespace(&contents.borrow()).to_string();
        if text.is_empty() {
            continue;
        }

        let Some(parent) = get_parent_node(&node) else {
            continue;
        };
        if ctx.markers.is_marked(&parent) || is_blocked(&parent) {
            continue;
        }

        if kind == RootKind::Head && get_node_name(&parent) != Some("title") {
            continue;
        }

        units.push(ExtractedUnit::Text { node, text });
    }

    units
}

fn collect_attribute_units(
    ctx: &PageContext,
    root: &Handle,
    kind: RootKind,
) -> Vec<ExtractedUnit> {
    let mut units = Vec::new();
    let elements: Vec<Handle> = std::iter::once(root.clone())
        .chain(descendants(root))
        .filter(|node| matches!(node.data, NodeData::Element { .. }))
        .collect();

    for element in elements.iter() {
        if ctx.markers.is_marked(element) || is_blocked(element) {
            continue;
        }

        for name in TRANSLATABLE_ATTRIBUTES {
            if let Some(text) = attribute_text(element, name) {
                units.push(ExtractedUnit::Attribute {
                    element: element.clone(),
                    name: name.to_string(),
                    text,
                });
            }
        }
    }

    if kind == RootKind::Head {
        for &(attr, value) in META_SELECTORS {
            // 每个选择器只取第一个匹配
            let meta = elements.iter().find(|node| {
                get_node_name(node) == Some("meta") && get_node_attr(node, attr).as_deref() == Some(value)
            });

            let Some(meta) = meta else {
                continue;
            };
            if ctx.markers.is_marked(meta) || is_blocked(meta) {
                continue;
            }

            if let Some(text) = attribute_text(meta, "content") {
                units.push(ExtractedUnit::Attribute {
                    element: meta.clone(),
                    name: "content".to_string(),
                    text,
                });
            }
        }
    }

    units
}

fn attribute_text(element: &Handle, name: &str) -> Option<String> {
    let value = get_node_attr(element, name)?;
    let trimmed = trim_html_whitespace(&value);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 元素自身或任一祖先带有退出标记，或属于排除标签
pub fn is_blocked(element: &Handle) -> bool {
    let (opt_out_name, opt_out_value) = OPT_OUT_ATTR;
    let mut current = Some(element.clone());

    while let Some(node) = current {
        if let Some(name) = get_node_name(&node) {
            if is_excluded_tag(name) {
                return true;
            }
        }
        if get_node_attr(&node, opt_out_name).as_deref() == Some(opt_out_value) {
            return true;
        }
        current = get_parent_node(&node);
    }

    false
}
