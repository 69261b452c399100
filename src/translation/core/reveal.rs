//! 揭示控制器
//!
//! 页面从首次绘制起处于遮罩状态（模糊、变暗）。状态只会前进：
//! `Suppressed → Translating → Revealed`。揭示时给 `<html>` 加上
//! `lingua-translated` 类，宽限期结束后整体移除遮罩样式元素。
//!
//! 宽限计时器通过 `spawn_local` 运行，调用方必须处在 `LocalSet` 内。

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::parsers::html::add_class;
use crate::parsers::html::inject::{BLUR_STYLE_ID, TRANSLATED_CLASS};
use crate::translation::document::LiveDocument;

/// 揭示状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Suppressed,
    Translating,
    Revealed,
}

pub struct RevealController {
    document: Rc<LiveDocument>,
    grace: Duration,
    state: Cell<RevealState>,
    style_removed: Cell<bool>,
    settled: Notify,
}

impl RevealController {
    pub fn new(document: Rc<LiveDocument>, grace: Duration) -> Self {
        Self {
            document,
            grace,
            state: Cell::new(RevealState::Suppressed),
            style_removed: Cell::new(false),
            settled: Notify::new(),
        }
    }

    pub fn state(&self) -> RevealState {
        self.state.get()
    }

    /// 进入翻译阶段；只有第一次调用返回 `true`
    pub fn begin(&self) -> bool {
        if self.state.get() != RevealState::Suppressed {
            return false;
        }
        self.state.set(RevealState::Translating);
        true
    }

    /// 揭示页面；重复调用无副作用，返回是否由本次调用完成揭示
    pub fn reveal(self: &Rc<Self>) -> bool {
        if self.state.get() == RevealState::Revealed {
            return false;
        }
        self.state.set(RevealState::Revealed);

        if let Some(html) = self.document.html_element() {
            add_class(&html, TRANSLATED_CLASS);
        }

        if self.grace.is_zero() {
            self.remove_style();
        } else {
            let controller = Rc::clone(self);
            tokio::task::spawn_local(async move {
                tokio::time::sleep(controller.grace).await;
                controller.remove_style();
            });
        }

        tracing::debug!("页面已揭示，{:?} 后移除遮罩样式", self.grace);
        true
    }

    /// 等待遮罩样式被移除
    pub async fn settled(&self) {
        loop {
            let notified = self.settled.notified();
            if self.style_removed.get() {
                return;
            }
            notified.await;
        }
    }

    fn remove_style(&self) {
        if let Some(style) = self.document.get_element_by_id(BLUR_STYLE_ID) {
            self.document.remove(&style);
        }
        self.style_removed.set(true);
        self.settled.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::get_node_attr;

    fn page() -> Rc<LiveDocument> {
        Rc::new(LiveDocument::parse(
            "<html><head><style id=\"__LINGUA_BLUR__\">body{filter:blur(4px)}</style></head><body></body></html>",
        ))
    }

    #[test]
    fn test_state_only_moves_forward() {
        let controller = Rc::new(RevealController::new(page(), Duration::ZERO));
        assert_eq!(controller.state(), RevealState::Suppressed);
        assert!(controller.begin());
        assert!(!controller.begin());
        assert_eq!(controller.state(), RevealState::Translating);

        assert!(controller.reveal());
        assert!(!controller.reveal());
        assert!(!controller.begin());
        assert_eq!(controller.state(), RevealState::Revealed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_style_removed_after_grace() {
        let document = page();
        let controller = Rc::new(RevealController::new(document.clone(), Duration::from_millis(300)));

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                controller.begin();
                controller.reveal();

                let html = document.html_element().unwrap();
                assert_eq!(get_node_attr(&html, "class").as_deref(), Some("lingua-translated"));
                assert!(document.get_element_by_id(BLUR_STYLE_ID).is_some());

                let start = tokio::time::Instant::now();
                controller.settled().await;
                assert!(start.elapsed() >= Duration::from_millis(300));
                assert!(document.get_element_by_id(BLUR_STYLE_ID).is_none());
            })
            .await;
    }
}
