//! 页面注入模块
//!
//! 边缘侧对源站 HTML 做的字符串级增强：翻译引导标记、语言上下文、
//! hreflang 链接、语言切换器和首次访问的语言自动检测。
//! 每个注入都通过标记检查保证幂等，重复执行不会产生重复内容。

use std::sync::LazyLock;

use regex::Regex;

use crate::core::{LanguageNameMap, ProjectConfig};

/// 首屏遮罩样式的 id
pub const BLUR_STYLE_ID: &str = "__LINGUA_BLUR__";
/// 翻译引导标记的 id
pub const AUTO_TRANSLATE_ID: &str = "__LINGUA_AUTO_TRANSLATE__";
/// 语言上下文脚本的 id
pub const CONTEXT_ID: &str = "__LINGUA_CONTEXT__";
/// 语言自动检测脚本的 id
pub const AUTO_DETECT_ID: &str = "__LINGUA_AUTO_LANG_DETECT__";
/// 揭示后加在 `<html>` 上的 class
pub const TRANSLATED_CLASS: &str = "lingua-translated";
/// 语言切换器容器的 class
pub const SWITCHER_CLASS: &str = "lingua-lang-switcher";

static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(\s[^>]*)?>").expect("static regex"));
static HREFLANG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link[^>]+rel=["']alternate["'][^>]+hreflang="#).expect("static regex")
});
static SWITCHER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[^>]+class=["']lingua-lang-switcher["']"#).expect("static regex")
});

/// 注入首屏遮罩和翻译引导标记
///
/// 遮罩在首次绘制时生效，由引擎揭示后移除；引导标记携带当前语言和项目密钥。
pub fn inject_auto_translation(html: &str, lang: &str, api_key: &str) -> String {
    if html.contains(AUTO_TRANSLATE_ID) {
        return html.to_string();
    }

    let bootstrap = serde_json::json!({ "lang": lang, "project": api_key });
    let snippet = format!(
        r#"
<style id="{blur_id}">
  html {{
    filter: blur(8px);
    opacity: 0.6;
    transition: filter 0.3s ease-out, opacity 0.3s ease-out;
  }}

  html.{class} {{
    filter: none;
    opacity: 1;
  }}
</style>
<script id="{marker_id}" type="application/json">{bootstrap}</script>
"#,
        blur_id = BLUR_STYLE_ID,
        class = TRANSLATED_CLASS,
        marker_id = AUTO_TRANSLATE_ID,
        bootstrap = script_safe_json(&bootstrap.to_string()),
    );

    html.replacen("</head>", &format!("{}\n</head>", snippet), 1)
}

/// 注入语言上下文脚本，紧跟在 `<head>` 开始标签之后
pub fn inject_language_context(html: &str, lang: &str) -> String {
    if html.contains(CONTEXT_ID) {
        return html.to_string();
    }

    let lang_literal = script_safe_json(&serde_json::Value::from(lang).to_string());
    let script = format!(
        r#"
<script id="{id}">
  window.__LINGUA_LANG__ = {lang};
  document.documentElement.lang = {lang};
</script>
"#,
        id = CONTEXT_ID,
        lang = lang_literal,
    );

    insert_after_head_open(html, &script)
}

/// 添加 hreflang 备用链接
///
/// 默认语言和 `x-default` 指向无前缀路径，每个目标语言指向 `/<lang><path>`。
/// 文档中已有任何 hreflang 备用链接时保持原样。
pub fn add_hreflang_links(
    html: &str,
    pathname: &str,
    config: &ProjectConfig,
    origin: &str,
) -> String {
    if HREFLANG_RE.is_match(html) {
        return html.to_string();
    }

    let mut tags = format!(
        r#"<link rel="alternate" hreflang="{}" href="{}{}" />"#,
        escape_html(&config.default_language),
        origin,
        escape_html(pathname)
    );

    for lang in config.enabled_languages() {
        tags.push_str(&format!(
            r#"<link rel="alternate" hreflang="{lang}" href="{origin}/{lang}{path}" />"#,
            lang = escape_html(lang),
            origin = origin,
            path = escape_html(pathname)
        ));
    }

    tags.push_str(&format!(
        r#"<link rel="alternate" hreflang="x-default" href="{}{}" />"#,
        origin,
        escape_html(pathname)
    ));

    html.replacen("</head>", &format!("{}\n</head>", tags), 1)
}

/// 在 `</body>` 之前注入语言切换器
pub fn inject_language_switcher(
    html: &str,
    config: &ProjectConfig,
    names: &LanguageNameMap,
) -> String {
    if SWITCHER_RE.is_match(html) {
        return html.to_string();
    }

    let default_lang = &config.default_language;
    let options: String = std::iter::once(default_lang)
        .chain(config.enabled_languages().iter())
        .map(|code| {
            format!(
                r#"<option value="{}">{}</option>"#,
                escape_html(code),
                escape_html(&names.display_name(code))
            )
        })
        .collect();

    let switcher = format!(
        r#"
<style>
.{class} {{
  position: fixed;
  bottom: 20px;
  right: 20px;
  z-index: 999999;
  background: #fff;
  border: 1px solid #e5e7eb;
  border-radius: 8px;
  padding: 8px 12px;
  font-family: system-ui, sans-serif;
  box-shadow: 0 6px 16px rgba(0,0,0,.12);
}}
.{class} select {{
  border: none;
  outline: none;
  background: transparent;
  font-size: 14px;
  cursor: pointer;
  padding: 4px;
}}
</style>

<div class="{class}">
  <select id="lingua-lang-select">
    <option value="">Language</option>
    {options}
  </select>
</div>

<script>
(function () {{
  var select = document.getElementById('lingua-lang-select');
  if (!select) return;

  var defaultLang = {default_lang};
  var match = window.location.pathname.match(/^\/([a-z]{{2}})(\/|$)/);
  var currentLang = match ? match[1] : defaultLang;
  select.value = currentLang;

  select.addEventListener('change', function () {{
    var newLang = this.value;
    if (!newLang || newLang === currentLang) return;

    var cleanPath = window.location.pathname.replace(/^\/[a-z]{{2}}(\/|$)/, '/');
    if (!cleanPath.startsWith('/')) cleanPath = '/' + cleanPath;

    var newPath = newLang === defaultLang ? cleanPath : '/' + newLang + cleanPath;
    window.location.href = newPath + window.location.search + window.location.hash;
  }});
}})();
</script>
"#,
        class = SWITCHER_CLASS,
        options = options,
        default_lang = script_safe_json(&serde_json::Value::from(default_lang.as_str()).to_string()),
    );

    html.replacen("</body>", &format!("{}\n</body>", switcher), 1)
}

/// 注入首次访问的浏览器语言检测脚本
///
/// 每个会话只检测一次；浏览器语言是非默认的目标语言时跳转到 `/<lang><path>`。
pub fn inject_auto_language_detection(html: &str, config: &ProjectConfig) -> String {
    if html.contains(AUTO_DETECT_ID) {
        return html.to_string();
    }

    let targets = serde_json::Value::from(config.enabled_languages().to_vec()).to_string();
    let default_lang = serde_json::Value::from(config.default_language.as_str()).to_string();

    let script = format!(
        r#"
<script id="{id}">
(function() {{
  if (sessionStorage.getItem('lingua_lang_detected')) {{
    return;
  }}

  var browserLang = navigator.language || navigator.userLanguage || '';
  var langCode = browserLang.split('-')[0].toLowerCase();

  var targetLanguages = {targets};
  var defaultLanguage = {default_lang};

  sessionStorage.setItem('lingua_lang_detected', 'true');

  if (targetLanguages.includes(langCode) && langCode !== defaultLanguage) {{
    var newPath = '/' + langCode + window.location.pathname;
    window.location.href = newPath + window.location.search + window.location.hash;
  }}
}})();
</script>
"#,
        id = AUTO_DETECT_ID,
        targets = script_safe_json(&targets),
        default_lang = script_safe_json(&default_lang),
    );

    insert_after_head_open(html, &script)
}

fn insert_after_head_open(html: &str, snippet: &str) -> String {
    HEAD_OPEN_RE
        .replace(html, |caps: &regex::Captures| format!("{}{}", &caps[0], snippet))
        .into_owned()
}

/// 防止 JSON 字面量提前闭合 `<script>`
fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
