//! 已翻译标记
//!
//! 以节点身份为键的旁路表，只持有弱引用：不会延长节点生命周期，
//! 也不会在节点上留下页面可见的属性。节点释放后对应条目自动失效。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use markup5ever_rcdom::{Handle, Node};

/// 已翻译节点集合
#[derive(Default)]
pub struct TranslatedMarkers {
    entries: RefCell<HashMap<*const Node, Weak<Node>>>,
}

impl TranslatedMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记节点为已翻译；重复标记无副作用，标记永不撤销
    pub fn mark(&self, node: &Handle) {
        let mut entries = self.entries.borrow_mut();
        // 地址可能被已释放节点复用，这里总是用新的弱引用覆盖
        entries.insert(Rc::as_ptr(node), Rc::downgrade(node));
    }

    pub fn is_marked(&self, node: &Handle) -> bool {
        let entries = self.entries.borrow();
        match entries.get(&Rc::as_ptr(node)) {
            Some(weak) => weak
                .upgrade()
                .map(|alive| Rc::ptr_eq(&alive, node))
                .unwrap_or(false),
            None => false,
        }
    }

    /// 清理已释放节点的条目，返回清理数量
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|_, weak| weak.strong_count() > 0);
        before - entries.len()
    }

    /// 仍然存活的已标记节点数量
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
