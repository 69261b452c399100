//! 译文写回
//!
//! 只在缓存中有不同于原文的译文时修改节点，并把节点标记为已翻译。
//! 没有译文的节点保持原样且不标记，留给后续轮次重试。

use crate::parsers::html::{set_node_attr, set_text};
use crate::translation::core::PageContext;

use super::collector::ExtractedUnit;

/// 写回结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    pub untouched: usize,
}

/// 把缓存中的译文写回文档
pub fn apply_units(ctx: &PageContext, units: &[ExtractedUnit]) -> ApplyReport {
    let mut report = ApplyReport::default();

    for unit in units {
        let original = unit.text();
        let translated = match ctx.cache.get(original) {
            Some(translated) if translated != original => translated,
            _ => {
                report.untouched += 1;
                continue;
            }
        };

        match unit {
            ExtractedUnit::Text { node, .. } => {
                set_text(node, &translated);
                ctx.markers.mark(node);
            }
            ExtractedUnit::Attribute { element, name, .. } => {
                set_node_attr(element, name, Some(translated));
                ctx.markers.mark(element);
            }
        }
        report.applied += 1;
    }

    ctx.stats.add_units_applied(report.applied);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{find_nodes, get_node_attr, get_text};
    use crate::translation::core::test_support::test_context;
    use crate::translation::document::LiveDocument;
    use crate::translation::pipeline::collector::{collect_units, RootKind};

    #[test]
    fn test_apply_overwrites_and_marks() {
        let doc = LiveDocument::parse(
            "<html><body><p> Hello </p><img alt=\"Photo\"><span>Acme</span><em>Later</em></body></html>",
        );
        let ctx = test_context();
        let body = doc.body().unwrap();
        let units = collect_units(&ctx, &body, RootKind::Body);

        ctx.cache.resolve("Hello", "Bonjour");
        ctx.cache.resolve("Photo", "Image");
        ctx.cache.resolve("Acme", "Acme");

        let report = apply_units(&ctx, &units);
        assert_eq!(report, ApplyReport { applied: 2, untouched: 2 });

        let paragraph = find_nodes(&body, vec!["p"]).remove(0);
        let text = paragraph.children.borrow()[0].clone();
        assert_eq!(get_text(&text).as_deref(), Some("Bonjour"));
        assert!(ctx.markers.is_marked(&text));

        let img = find_nodes(&body, vec!["img"]).remove(0);
        assert_eq!(get_node_attr(&img, "alt").as_deref(), Some("Image"));
        assert!(ctx.markers.is_marked(&img));

        // 译文等于原文或缺失的节点不标记
        let remaining = collect_units(&ctx, &body, RootKind::Body);
        let remaining: Vec<&str> = remaining.iter().map(|unit| unit.text()).collect();
        assert_eq!(remaining, vec!["Acme", "Later"]);
    }

    #[test]
    fn test_apply_twice_is_stable() {
        let doc = LiveDocument::parse("<html><body><p>Hello</p></body></html>");
        let ctx = test_context();
        let body = doc.body().unwrap();
        ctx.cache.resolve("Hello", "Bonjour");

        let units = collect_units(&ctx, &body, RootKind::Body);
        apply_units(&ctx, &units);
        let first = doc.serialize();

        let units = collect_units(&ctx, &body, RootKind::Body);
        assert!(units.is_empty());
        apply_units(&ctx, &units);
        assert_eq!(doc.serialize(), first);
    }
}
