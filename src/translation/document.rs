//! 可观察的活动文档
//!
//! 对 `RcDom` 的一层包装：通过 [`LiveDocument::append_child`] 和
//! [`LiveDocument::insert_before`] 插入的节点会以 [`MutationRecord`]
//! 的形式投递给观察该区域的 [`MutationObserver`]，
//! 相当于只监听 `childList` + `subtree` 的变更观察器。
//! 文本和属性的原地修改不产生记录，因此引擎自己的写入不会被重新观察到。

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};
use tokio::sync::Notify;

use crate::parsers::html::{
    detach_node, find_nodes, get_element_by_id, get_parent_node, html_to_dom,
    is_inclusive_descendant, parse_fragment, serialize_to_string,
};

/// 一次插入操作产生的变更记录
#[derive(Debug, Clone)]
pub struct MutationRecord {
    /// 接收插入的父节点
    pub target: Handle,
    /// 新插入的节点，保持插入顺序
    pub added_nodes: Vec<Handle>,
}

/// 变更观察器
///
/// 记录排队等待消费；`changed()` 在有新记录时返回，通知不会丢失。
pub struct MutationObserver {
    root: Handle,
    queue: RefCell<VecDeque<MutationRecord>>,
    notify: Notify,
    connected: Cell<bool>,
}

impl MutationObserver {
    fn new(root: Handle) -> Self {
        Self {
            root,
            queue: RefCell::new(VecDeque::new()),
            notify: Notify::new(),
            connected: Cell::new(true),
        }
    }

    fn deliver(&self, record: &MutationRecord) {
        if !self.connected.get() || !is_inclusive_descendant(&record.target, &self.root) {
            return;
        }
        self.queue.borrow_mut().push_back(record.clone());
        self.notify.notify_one();
    }

    /// 取出所有排队的记录
    pub fn take_records(&self) -> Vec<MutationRecord> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// 是否有待处理的记录
    pub fn has_records(&self) -> bool {
        !self.queue.borrow().is_empty()
    }

    /// 等待下一批记录
    pub async fn changed(&self) {
        if self.has_records() {
            return;
        }
        self.notify.notified().await;
    }

    /// 停止接收新记录
    pub fn disconnect(&self) {
        self.connected.set(false);
        self.queue.borrow_mut().clear();
        // 唤醒等待者，让监听循环退出
        self.notify.notify_one();
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }
}

/// 单个页面加载期间的活动文档
pub struct LiveDocument {
    dom: RcDom,
    observers: RefCell<Vec<Rc<MutationObserver>>>,
}

impl LiveDocument {
    pub fn new(dom: RcDom) -> Self {
        Self {
            dom,
            observers: RefCell::new(Vec::new()),
        }
    }

    /// 解析完整的 HTML 文档
    pub fn parse(html: &str) -> Self {
        Self::new(html_to_dom(html.as_bytes(), "utf-8".to_string()))
    }

    /// 文档根节点
    pub fn document(&self) -> Handle {
        self.dom.document.clone()
    }

    /// `<html>` 元素
    pub fn html_element(&self) -> Option<Handle> {
        find_nodes(&self.dom.document, vec!["html"]).into_iter().next()
    }

    pub fn head(&self) -> Option<Handle> {
        find_nodes(&self.dom.document, vec!["html", "head"])
            .into_iter()
            .next()
    }

    pub fn body(&self) -> Option<Handle> {
        find_nodes(&self.dom.document, vec!["html", "body"])
            .into_iter()
            .next()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Handle> {
        get_element_by_id(&self.dom.document, id)
    }

    /// 注册一个观察 `root` 子树的观察器
    pub fn observe(&self, root: &Handle) -> Rc<MutationObserver> {
        let observer = Rc::new(MutationObserver::new(root.clone()));
        self.observers.borrow_mut().push(observer.clone());
        observer
    }

    /// 追加子节点；已有父节点的节点会先被移出
    pub fn append_child(&self, parent: &Handle, child: Handle) {
        self.attach(parent, &child, None);
        self.dispatch(MutationRecord {
            target: parent.clone(),
            added_nodes: vec![child],
        });
    }

    /// 在 `reference` 之前插入节点；`reference` 不是 `parent` 的子节点时追加到末尾
    pub fn insert_before(&self, parent: &Handle, child: Handle, reference: &Handle) {
        self.attach(parent, &child, Some(reference));
        self.dispatch(MutationRecord {
            target: parent.clone(),
            added_nodes: vec![child],
        });
    }

    /// 解析 HTML 片段并整体追加到 `parent`，产生一条记录
    pub fn append_html(&self, parent: &Handle, html: &str) -> Vec<Handle> {
        let nodes = parse_fragment(html);
        for node in nodes.iter() {
            self.attach(parent, node, None);
        }

        if !nodes.is_empty() {
            self.dispatch(MutationRecord {
                target: parent.clone(),
                added_nodes: nodes.clone(),
            });
        }
        nodes
    }

    /// 移除节点（不产生记录）
    pub fn remove(&self, node: &Handle) {
        detach_node(node);
    }

    /// 序列化整个文档
    pub fn serialize(&self) -> String {
        serialize_to_string(&self.dom.document)
    }

    fn attach(&self, parent: &Handle, child: &Handle, reference: Option<&Handle>) {
        if get_parent_node(child).is_some() {
            detach_node(child);
        }

        child.parent.set(Some(Rc::downgrade(parent)));

        let mut children = parent.children.borrow_mut();
        let position = reference.and_then(|reference| {
            children
                .iter()
                .position(|existing| Rc::ptr_eq(existing, reference))
        });

        match position {
            Some(index) => children.insert(index, child.clone()),
            None => children.push(child.clone()),
        }
    }

    fn dispatch(&self, record: MutationRecord) {
        self.observers
            .borrow_mut()
            .retain(|observer| observer.is_connected());

        for observer in self.observers.borrow().iter() {
            observer.deliver(&record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{create_text_node, get_node_name};

    const PAGE: &str = "<html><head><title>T</title></head><body><main id=\"m\"><p>a</p></main></body></html>";

    #[test]
    fn test_structure_accessors() {
        let doc = LiveDocument::parse(PAGE);
        assert_eq!(get_node_name(&doc.head().unwrap()), Some("head"));
        assert_eq!(get_node_name(&doc.body().unwrap()), Some("body"));
        assert_eq!(get_node_name(&doc.html_element().unwrap()), Some("html"));
        assert!(doc.get_element_by_id("m").is_some());
    }

    #[test]
    fn test_observer_only_sees_its_subtree() {
        let doc = LiveDocument::parse(PAGE);
        let body = doc.body().unwrap();
        let head = doc.head().unwrap();
        let observer = doc.observe(&body);

        let main = doc.get_element_by_id("m").unwrap();
        doc.append_html(&main, "<p>new</p><p>two</p>");
        doc.append_child(&head, create_text_node("ignored"));

        let records = observer.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].added_nodes.len(), 2);
        assert!(Rc::ptr_eq(&records[0].target, &main));
        assert!(!observer.has_records());
    }

    #[test]
    fn test_insert_before_orders_children() {
        let doc = LiveDocument::parse(PAGE);
        let main = doc.get_element_by_id("m").unwrap();
        let first = main.children.borrow()[0].clone();

        let nodes = parse_fragment("<h1>title</h1>");
        doc.insert_before(&main, nodes[0].clone(), &first);

        assert_eq!(get_node_name(&main.children.borrow()[0]), Some("h1"));
        assert!(Rc::ptr_eq(&get_parent_node(&nodes[0]).unwrap(), &main));
    }

    #[test]
    fn test_moving_node_detaches_from_old_parent() {
        let doc = LiveDocument::parse(PAGE);
        let main = doc.get_element_by_id("m").unwrap();
        let body = doc.body().unwrap();
        let paragraph = main.children.borrow()[0].clone();

        doc.append_child(&body, paragraph);
        assert!(main.children.borrow().is_empty());
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let doc = LiveDocument::parse(PAGE);
        let body = doc.body().unwrap();
        let observer = doc.observe(&body);
        observer.disconnect();

        doc.append_html(&body, "<p>late</p>");
        assert!(!observer.has_records());
    }
}
