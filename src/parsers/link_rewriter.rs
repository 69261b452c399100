//! 链接重写模块
//!
//! 负责把站内链接加上当前语言段前缀，使访客在译文页面之间跳转时保持语言

use markup5ever_rcdom::Handle;

use crate::parsers::html::{descendants, get_node_attr, get_node_name, set_node_attr};

/// 重写单个 href
///
/// 返回 `None` 表示保持原样：外部链接、锚点、mailto/tel 以及已带语言前缀的链接。
///
/// | href | lang = fr |
/// |------|-----------|
/// | `/` | `/fr` |
/// | `/about` | `/fr/about` |
/// | `./x` | `/fr/x` |
/// | `x` | `/fr/x` |
pub fn rewrite_href(href: &str, lang: &str) -> Option<String> {
    if should_skip_link(href) {
        return None;
    }

    let lang_prefix = format!("/{}", lang);
    if href == lang_prefix || href.starts_with(&format!("{}/", lang_prefix)) {
        return None;
    }

    let rewritten = if href == "/" {
        lang_prefix
    } else if href.starts_with('/') {
        format!("{}{}", lang_prefix, href)
    } else if let Some(rest) = href.strip_prefix("./") {
        format!("{}/{}", lang_prefix, rest)
    } else {
        format!("{}/{}", lang_prefix, href)
    };

    Some(rewritten)
}

/// 重写子树（含根节点）中所有锚点的 href，返回被修改的数量
pub fn rewrite_links_in_subtree(root: &Handle, lang: &str) -> usize {
    let mut rewritten = 0;

    for node in std::iter::once(root.clone()).chain(descendants(root)) {
        if get_node_name(&node) != Some("a") {
            continue;
        }

        let Some(href) = get_node_attr(&node, "href") else {
            continue;
        };

        if let Some(new_href) = rewrite_href(&href, lang) {
            set_node_attr(&node, "href", Some(new_href));
            rewritten += 1;
        }
    }

    rewritten
}

/// 判断是否应该跳过重写的链接
fn should_skip_link(href: &str) -> bool {
    // 跳过以下类型的链接：
    // 1. 空链接
    // 2. 外部绝对链接 (http/https/协议相对)
    // 3. 锚点链接 (#section)
    // 4. 邮件和电话链接
    // 5. 其他协议 (javascript:, data: ...)
    href.is_empty()
        || href.starts_with("http://")
        || href.starts_with("https://")
        || href.starts_with("//")
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || has_scheme(href)
}

fn has_scheme(href: &str) -> bool {
    match href.find(':') {
        Some(idx) => {
            let scheme = &href[..idx];
            !scheme.is_empty()
                && !scheme.contains('/')
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}
