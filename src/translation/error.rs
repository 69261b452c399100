//! 翻译模块统一错误处理
//!
//! 引擎内部的所有错误都在本地吸收：最坏结果是文本未被翻译，而不是页面损坏。
//! 这里的类型只用于记录日志和在边缘侧决定是否透传源站响应。

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// 项目配置或语言列表不可用
    #[error("配置不可用: {0}")]
    ConfigUnavailable(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 翻译服务返回非成功状态
    #[error("翻译服务错误: {0}")]
    TranslationServiceError(String),

    /// 翻译服务返回的响应体无法解析
    #[error("响应格式错误: {0}")]
    MalformedResponse(String),

    /// 首次翻译超出时间预算
    #[error("操作超时: {0}")]
    Timeout(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),
}

impl TranslationError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigUnavailable(_) => ErrorSeverity::Error,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::TranslationServiceError(_) => ErrorSeverity::Warning,
            TranslationError::MalformedResponse(_) => ErrorSeverity::Warning,
            // 超时不算错误，揭示照常进行
            TranslationError::Timeout(_) => ErrorSeverity::Info,
            TranslationError::ParseError(_) => ErrorSeverity::Error,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        let wrap = |msg: String| format!("{} (上下文: {})", msg, context);

        match self {
            TranslationError::ConfigUnavailable(msg) => TranslationError::ConfigUnavailable(wrap(msg)),
            TranslationError::NetworkError(msg) => TranslationError::NetworkError(wrap(msg)),
            TranslationError::TranslationServiceError(msg) => {
                TranslationError::TranslationServiceError(wrap(msg))
            }
            TranslationError::MalformedResponse(msg) => TranslationError::MalformedResponse(wrap(msg)),
            TranslationError::Timeout(msg) => TranslationError::Timeout(wrap(msg)),
            TranslationError::ParseError(msg) => TranslationError::ParseError(wrap(msg)),
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            TranslationError::MalformedResponse(error.to_string())
        } else if error.is_timeout() {
            TranslationError::Timeout(error.to_string())
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::MalformedResponse(format!("JSON解析错误: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for TranslationError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        TranslationError::Timeout(format!("异步操作超时: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误，不向上传播
    pub fn log_error(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
        }
    }
}
