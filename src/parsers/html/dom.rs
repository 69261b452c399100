use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: String) -> RcDom {
    let s: String;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        s = string.to_string();
    } else {
        s = String::from_utf8_lossy(data).to_string();
    }

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .unwrap_or_default()
}

/// 将 HTML 片段解析为一组游离节点
///
/// 片段按 `<body>` 内容解析；返回的节点已脱离临时文档，可以插入任意父节点。
pub fn parse_fragment(html: &str) -> Vec<Handle> {
    let dom = html_to_dom(
        format!("<html><head></head><body>{}</body></html>", html).as_bytes(),
        "utf-8".to_string(),
    );

    let Some(body) = find_nodes(&dom.document, vec!["html", "body"]).into_iter().next() else {
        return Vec::new();
    };

    // 先从 body 中取出子节点，临时文档析构时才不会清空它们的后代
    let nodes = std::mem::take(&mut *body.children.borrow_mut());
    for node in nodes.iter() {
        node.parent.set(None);
    }
    nodes
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: Vec<&str>) -> Vec<Handle> {
    assert!(!node_names.is_empty());

    let mut found_nodes = Vec::new();
    let node_name = node_names[0];

    if node_names.len() == 1 {
        if let NodeData::Element { ref name, .. } = node.data {
            if &*name.local == node_name {
                found_nodes.push(node.clone());
            }
        }

        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    } else if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == node_name {
            let mut new_node_names = node_names;
            new_node_names.remove(0);
            found_nodes.append(&mut find_nodes(node, new_node_names));
        } else {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
            }
        }
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    }

    found_nodes
}

/// 按文档顺序返回所有后代节点（不含根节点本身）
pub fn descendants(root: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();

    while let Some(node) = stack.pop() {
        stack.extend(node.children.borrow().iter().rev().cloned());
        out.push(node);
    }

    out
}

/// 按 id 查找元素
pub fn get_element_by_id(root: &Handle, id: &str) -> Option<Handle> {
    descendants(root)
        .into_iter()
        .find(|node| get_node_attr(node, "id").as_deref() == Some(id))
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

/// 获取父节点
///
/// `parent` 是 `Cell`，读取时必须把弱引用放回去。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 从自身开始向上查找带有指定属性的元素
pub fn closest_with_attr(node: &Handle, attr_name: &str, attr_value: &str) -> Option<Handle> {
    let mut current = Some(node.clone());

    while let Some(candidate) = current {
        if get_node_attr(&candidate, attr_name).as_deref() == Some(attr_value) {
            return Some(candidate);
        }
        current = get_parent_node(&candidate);
    }

    None
}

/// 判断 `node` 是否位于 `ancestor` 之内（含自身）
pub fn is_inclusive_descendant(node: &Handle, ancestor: &Handle) -> bool {
    let mut current = Some(node.clone());

    while let Some(candidate) = current {
        if Rc::ptr_eq(&candidate, ancestor) {
            return true;
        }
        current = get_parent_node(&candidate);
    }

    false
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    use html5ever::interface::{Attribute, QualName};
    use html5ever::tendril::format_tendril;
    use html5ever::{namespace_url, ns, LocalName};

    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    let _ = &attrs_mut[i].value.clear();
                    let _ = &attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value.clone() {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// 为元素追加 class（已存在则不重复）
pub fn add_class(node: &Handle, class_name: &str) {
    let current = get_node_attr(node, "class").unwrap_or_default();
    if current.split_whitespace().any(|c| c == class_name) {
        return;
    }

    let updated = if current.trim().is_empty() {
        class_name.to_string()
    } else {
        format!("{} {}", current.trim(), class_name)
    };
    set_node_attr(node, "class", Some(updated));
}

/// 读取文本节点内容
pub fn get_text(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 覆盖文本节点内容
pub fn set_text(node: &Handle, text: &str) {
    if let NodeData::Text { contents } = &node.data {
        *contents.borrow_mut() = StrTendril::from_slice(text);
    }
}

/// 创建游离的文本节点
pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// 将节点从父节点中移除
pub fn detach_node(node: &Handle) {
    if let Some(parent) = get_parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_detaches_nodes() {
        let nodes = parse_fragment("<p>One <b>two</b></p><span>three</span>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(get_node_name(&nodes[0]), Some("p"));
        assert!(get_parent_node(&nodes[0]).is_none());
        // 后代在临时文档析构后仍然存在
        assert_eq!(descendants(&nodes[0]).len(), 3);
    }

    #[test]
    fn test_get_parent_node_is_repeatable() {
        let dom = html_to_dom(b"<html><body><p>x</p></body></html>", "utf-8".to_string());
        let p = find_nodes(&dom.document, vec!["html", "body", "p"]).remove(0);
        assert_eq!(get_node_name(&get_parent_node(&p).unwrap()), Some("body"));
        assert_eq!(get_node_name(&get_parent_node(&p).unwrap()), Some("body"));
    }

    #[test]
    fn test_closest_with_attr() {
        let dom = html_to_dom(
            b"<html><body><div translate=\"no\"><p><i>x</i></p></div><p>y</p></body></html>",
            "utf-8".to_string(),
        );
        let italics = find_nodes(&dom.document, vec!["i"]).remove(0);
        assert!(closest_with_attr(&italics, "translate", "no").is_some());

        let paragraphs = find_nodes(&dom.document, vec!["p"]);
        assert!(closest_with_attr(&paragraphs[1], "translate", "no").is_none());
    }

    #[test]
    fn test_add_class_is_idempotent() {
        let dom = html_to_dom(b"<html class=\"js\"><body></body></html>", "utf-8".to_string());
        let html = find_nodes(&dom.document, vec!["html"]).remove(0);
        add_class(&html, "done");
        add_class(&html, "done");
        assert_eq!(get_node_attr(&html, "class").as_deref(), Some("js done"));
    }

    #[test]
    fn test_set_node_attr_adds_updates_and_removes() {
        let dom = html_to_dom(b"<html><body><a>x</a></body></html>", "utf-8".to_string());
        let link = find_nodes(&dom.document, vec!["html", "body", "a"]).remove(0);

        set_node_attr(&link, "href", Some("/fr/about".to_string()));
        assert_eq!(get_node_attr(&link, "href").as_deref(), Some("/fr/about"));

        set_node_attr(&link, "href", Some("/fr".to_string()));
        assert_eq!(get_node_attr(&link, "href").as_deref(), Some("/fr"));

        set_node_attr(&link, "href", None);
        assert!(get_node_attr(&link, "href").is_none());
    }

    #[test]
    fn test_detach_node() {
        let dom = html_to_dom(
            b"<html><head><style id=\"s\">a{}</style></head><body></body></html>",
            "utf-8".to_string(),
        );
        let style = get_element_by_id(&dom.document, "s").unwrap();
        detach_node(&style);
        assert!(get_element_by_id(&dom.document, "s").is_none());
    }
}
