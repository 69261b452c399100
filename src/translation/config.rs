//! 翻译引擎配置

use std::time::Duration;

/// 配置常量
pub mod constants {
    use std::time::Duration;

    /// 首次翻译的时间预算
    pub const INITIAL_TRANSLATION_TIMEOUT: Duration = Duration::from_millis(5000);
    /// 与去除模糊的 CSS 过渡时长一致
    pub const REVEAL_GRACE: Duration = Duration::from_millis(300);
    /// 单次翻译请求的网络超时，超时后视为"无翻译可用"
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    /// 翻译接口路径
    pub const TRANSLATE_ENDPOINT: &str = "/translate/";
    /// 默认服务地址
    pub const DEFAULT_API_URL: &str = "https://api.altified.com";
}

/// 单个页面加载的引擎配置
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 当前目标语言
    pub lang: String,
    /// 项目 API 密钥
    pub project_api_key: String,
    /// 服务基础地址
    pub api_url: String,
    /// 首次翻译超时
    pub initial_timeout: Duration,
    /// 揭示后移除遮罩样式前的等待时间
    pub reveal_grace: Duration,
    /// 单次批量请求的网络超时
    pub request_timeout: Duration,
}

impl EngineConfig {
    pub fn new(lang: &str, project_api_key: &str) -> Self {
        Self {
            lang: lang.to_string(),
            project_api_key: project_api_key.to_string(),
            api_url: constants::DEFAULT_API_URL.to_string(),
            initial_timeout: constants::INITIAL_TRANSLATION_TIMEOUT,
            reveal_grace: constants::REVEAL_GRACE,
            request_timeout: constants::REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_initial_timeout(mut self, timeout: Duration) -> Self {
        self.initial_timeout = timeout;
        self
    }

    pub fn with_reveal_grace(mut self, grace: Duration) -> Self {
        self.reveal_grace = grace;
        self
    }

    /// 翻译接口完整地址
    pub fn translate_endpoint(&self) -> String {
        format!("{}{}", self.api_url, constants::TRANSLATE_ENDPOINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new("fr", "key");
        assert_eq!(config.initial_timeout, Duration::from_secs(5));
        assert_eq!(config.reveal_grace, Duration::from_millis(300));
        assert_eq!(config.translate_endpoint(), "https://api.altified.com/translate/");
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new("de", "key")
            .with_api_url("http://127.0.0.1:9000/")
            .with_reveal_grace(Duration::ZERO);
        assert_eq!(config.translate_endpoint(), "http://127.0.0.1:9000/translate/");
        assert_eq!(config.reveal_grace, Duration::ZERO);
    }
}
