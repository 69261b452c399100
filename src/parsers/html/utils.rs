/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 其文本内容永远不翻译的元素
pub const EXCLUDED_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "code", "pre"];

/// 需要翻译的属性，按收集顺序排列
pub const TRANSLATABLE_ATTRIBUTES: &[&str] = &["alt", "title", "placeholder", "aria-label"];

/// 显式退出翻译的属性及其取值
pub const OPT_OUT_ATTR: (&str, &str) = ("translate", "no");

/// `<head>` 中需要翻译 `content` 的 meta 标签，每个选择器最多取第一个匹配
pub const META_SELECTORS: &[(&str, &str)] = &[
    ("name", "title"),
    ("name", "description"),
    ("name", "keywords"),
    ("property", "og:title"),
    ("property", "og:description"),
    ("name", "twitter:title"),
    ("name", "twitter:description"),
];

/// 去掉首尾 HTML 空白
pub fn trim_html_whitespace(text: &str) -> &str {
    text.trim_matches(|c: char| WHITESPACES.contains(&c) || c.is_whitespace())
}

pub fn is_excluded_tag(tag: &str) -> bool {
    EXCLUDED_TAGS.contains(&tag.to_lowercase().as_str())
}
