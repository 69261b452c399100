//! 增量观察器
//!
//! 观察 `<body>` 中后续插入的元素子树，逐个送入
//! 收集 → 批量翻译 → 写回 → 链接重写。子树按顺序处理；
//! 已标记的节点和位于 `translate="no"` 区域内的节点整棵跳过。

use std::rc::Rc;

use markup5ever_rcdom::Handle;

use super::engine::TranslationEngine;
use crate::parsers::html::{closest_with_attr, get_parent_node, is_element, OPT_OUT_ATTR};
use crate::translation::document::MutationObserver;

pub struct IncrementalWatcher {
    engine: Rc<TranslationEngine>,
    observer: Rc<MutationObserver>,
}

impl IncrementalWatcher {
    /// 在 `<body>` 上注册观察器；文档没有 `<body>` 时返回 `None`
    pub fn start(engine: Rc<TranslationEngine>) -> Option<Self> {
        let body = engine.document().body()?;
        let observer = engine.document().observe(&body);

        tracing::debug!("增量观察器已启动");
        Some(Self { engine, observer })
    }

    /// 处理目前排队的所有插入，返回处理的子树数量
    pub async fn process_pending(&self) -> usize {
        let candidates = self.take_candidates();
        let mut processed = 0;

        for node in candidates {
            // 处理前一棵子树时，这个节点可能已被移出文档
            if get_parent_node(&node).is_none() {
                continue;
            }

            let report = self.engine.translate_subtree(&node).await;
            tracing::debug!("新增子树处理完成: 写回 {} 项", report.applied);
            processed += 1;
        }

        let pruned = self.engine.context().markers.prune();
        if pruned > 0 {
            tracing::debug!("清理 {} 个已释放节点的标记", pruned);
        }

        processed
    }

    /// 持续处理插入，直到观察器断开
    pub async fn run(&self) {
        while self.observer.is_connected() {
            self.observer.changed().await;
            if !self.observer.is_connected() {
                break;
            }
            self.process_pending().await;
        }
    }

    /// 停止观察
    pub fn stop(&self) {
        self.observer.disconnect();
    }

    fn take_candidates(&self) -> Vec<Handle> {
        let ctx = self.engine.context();
        let (opt_out_name, opt_out_value) = OPT_OUT_ATTR;

        self.observer
            .take_records()
            .into_iter()
            .flat_map(|record| record.added_nodes)
            .filter(|node| is_element(node))
            .filter(|node| !ctx.markers.is_marked(node))
            .filter(|node| closest_with_attr(node, opt_out_name, opt_out_value).is_none())
            .collect()
    }
}
