//! 翻译引擎
//!
//! 把收集、批量翻译、写回和链接重写串成完整的流程：
//!
//! - [`TranslationEngine::run_initial_translation`]：首次翻译 `<head>` 和 `<body>`，
//!   与时间预算赛跑，无论哪个先结束都会揭示页面
//! - [`TranslationEngine::translate_subtree`]：处理后续插入的子树
//!
//! 首次翻译的工作通过 `spawn_local` 在后台运行。超时只是不再阻塞揭示，
//! 在途请求不会被取消，返回后仍会写入缓存，并写回尚未标记的节点。

use std::rc::Rc;

use markup5ever_rcdom::Handle;

use super::context::PageContext;
use super::reveal::RevealController;
use super::watcher::IncrementalWatcher;
use crate::parsers::link_rewriter::rewrite_links_in_subtree;
use crate::translation::document::LiveDocument;
use crate::translation::error::{helpers, TranslationError};
use crate::translation::pipeline::{
    apply_units, collect_units, unit_texts, ApplyReport, BatchTranslator, RootKind,
};

/// 首次翻译的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialOutcome {
    /// 翻译工作在预算内全部结束（成功或失败）
    Completed,
    /// 超出时间预算，页面照常揭示
    TimedOut,
    /// 已经运行过，本次调用什么也没做
    AlreadyStarted,
}

/// 页面级翻译引擎
pub struct TranslationEngine {
    ctx: Rc<PageContext>,
    document: Rc<LiveDocument>,
    reveal: Rc<RevealController>,
}

impl TranslationEngine {
    pub fn new(ctx: Rc<PageContext>, document: Rc<LiveDocument>) -> Self {
        let reveal = Rc::new(RevealController::new(
            document.clone(),
            ctx.config.reveal_grace,
        ));

        Self {
            ctx,
            document,
            reveal,
        }
    }

    pub fn context(&self) -> &Rc<PageContext> {
        &self.ctx
    }

    pub fn document(&self) -> &Rc<LiveDocument> {
        &self.document
    }

    pub fn reveal_controller(&self) -> &Rc<RevealController> {
        &self.reveal
    }

    /// 首次翻译
    ///
    /// 先重写全文的站内链接，再在后台翻译 `<head>` 和 `<body>`（合并为一次请求），
    /// 与 `initial_timeout` 赛跑。无论结果如何都会揭示页面。
    pub async fn run_initial_translation(&self) -> InitialOutcome {
        if !self.reveal.begin() {
            tracing::debug!("首次翻译已经开始，忽略重复调用");
            return InitialOutcome::AlreadyStarted;
        }

        self.ctx.set_translating(true);

        let rewritten = rewrite_links_in_subtree(&self.document.document(), self.ctx.lang());
        self.ctx.stats.add_links_rewritten(rewritten);

        let work = tokio::task::spawn_local(translate_document(
            self.ctx.clone(),
            self.document.clone(),
        ));

        let outcome = match tokio::time::timeout(self.ctx.config.initial_timeout, work).await {
            Ok(Ok(report)) => {
                tracing::debug!("首次翻译完成: 写回 {} 项", report.applied);
                InitialOutcome::Completed
            }
            Ok(Err(join_error)) => {
                helpers::log_error(&TranslationError::ParseError(format!(
                    "首次翻译任务异常结束: {}",
                    join_error
                )));
                InitialOutcome::Completed
            }
            Err(_) => {
                helpers::log_error(&TranslationError::Timeout(format!(
                    "首次翻译超过 {:?}，直接揭示页面",
                    self.ctx.config.initial_timeout
                )));
                InitialOutcome::TimedOut
            }
        };

        self.reveal.reveal();
        self.ctx.set_translating(false);

        outcome
    }

    /// 翻译一棵新插入的子树并重写其中的链接
    pub async fn translate_subtree(&self, root: &Handle) -> ApplyReport {
        let units = collect_units(&self.ctx, root, RootKind::Subtree);

        let report = if units.is_empty() {
            ApplyReport::default()
        } else {
            BatchTranslator::new(&self.ctx)
                .translate(&unit_texts(&units))
                .await;
            apply_units(&self.ctx, &units)
        };

        let rewritten = rewrite_links_in_subtree(root, self.ctx.lang());
        self.ctx.stats.add_links_rewritten(rewritten);
        self.ctx.stats.inc_subtrees_processed();

        report
    }

    /// 开始观察 `<body>` 中后续插入的节点
    pub fn start_watcher(self: &Rc<Self>) -> Option<IncrementalWatcher> {
        IncrementalWatcher::start(self.clone())
    }
}

/// 收集 head 和 body，一次请求翻译，再统一写回
async fn translate_document(ctx: Rc<PageContext>, document: Rc<LiveDocument>) -> ApplyReport {
    let mut units = Vec::new();
    if let Some(head) = document.head() {
        units.extend(collect_units(&ctx, &head, RootKind::Head));
    }
    if let Some(body) = document.body() {
        units.extend(collect_units(&ctx, &body, RootKind::Body));
    }

    if units.is_empty() {
        return ApplyReport::default();
    }

    BatchTranslator::new(&ctx).translate(&unit_texts(&units)).await;
    apply_units(&ctx, &units)
}
