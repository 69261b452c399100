use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents errors that can occur while the edge wraps an origin response
///
/// Every `EdgeError` is recoverable from the visitor's point of view: the
/// handler answers it by passing the untouched origin response through.
#[derive(Debug)]
pub struct EdgeError {
    details: String,
}

impl EdgeError {
    /// Creates a new EdgeError with the given message
    pub fn new(msg: &str) -> EdgeError {
        EdgeError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for EdgeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for EdgeError {}

impl From<reqwest::Error> for EdgeError {
    fn from(error: reqwest::Error) -> Self {
        EdgeError::new(&format!("upstream request failed: {}", error))
    }
}

impl From<std::io::Error> for EdgeError {
    fn from(error: std::io::Error) -> Self {
        EdgeError::new(&format!("io error: {}", error))
    }
}

impl From<crate::translation::TranslationError> for EdgeError {
    fn from(error: crate::translation::TranslationError) -> Self {
        EdgeError::new(&error.to_string())
    }
}

/// 项目配置，由配置服务 `/plan-status/` 返回
///
/// 在一个边缘缓存周期内不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default)]
    pub target_languages: Option<Vec<String>>,
}

fn default_language() -> String {
    "en".to_string()
}

impl ProjectConfig {
    pub fn new(default_language: &str, target_languages: &[&str]) -> Self {
        Self {
            default_language: default_language.to_string(),
            target_languages: Some(target_languages.iter().map(|l| l.to_string()).collect()),
        }
    }

    /// 已启用的目标语言（保持配置顺序）
    pub fn enabled_languages(&self) -> &[String] {
        self.target_languages.as_deref().unwrap_or(&[])
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.enabled_languages().iter().any(|l| l == code)
    }
}

/// 语言代码到显示名称的映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageNameMap(pub HashMap<String, String>);

impl LanguageNameMap {
    /// 获取显示名称，缺失时回退为大写代码
    pub fn display_name(&self, code: &str) -> String {
        self.0
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 从请求路径中识别出的语言段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRoute {
    /// 当前激活的语言代码
    pub lang: String,
    /// 去掉语言段后的源站路径，总是以 `/` 开头
    pub original_path: String,
}

/// 识别请求路径的语言段
///
/// 只有当第一个非空路径段是已启用的目标语言时才返回路由；
/// 其余路径段以 `/` 重新拼接（尾随斜杠不保留）。
pub fn detect_language_route(path: &str, config: &ProjectConfig) -> Option<LanguageRoute> {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let first = parts.first()?;

    if !config.is_enabled(first) {
        return None;
    }

    Some(LanguageRoute {
        lang: first.to_string(),
        original_path: format!("/{}", parts[1..].join("/")),
    })
}
