//! 边缘代理配置
//!
//! 使用类型安全的环境变量系统进行配置管理

use std::time::Duration;

use crate::env::{EnvConfig, EnvError, EnvResult};
use crate::translation::EngineConfig;

/// 边缘代理配置
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// 绑定地址
    pub bind_addr: String,
    /// 端口
    pub port: u16,
    /// 源站基础地址
    pub origin_url: String,
    /// 项目 API 密钥；未设置时所有请求直接透传
    pub api_key: Option<String>,
    /// 配置、语言列表和翻译服务的基础地址
    pub api_url: String,
    /// 译文页面缓存时间
    pub page_ttl: Duration,
    /// 项目配置缓存时间
    pub config_ttl: Duration,
    /// 语言名称缓存时间
    pub languages_ttl: Duration,
    /// 首次翻译时间预算
    pub translate_timeout: Duration,
}

impl WebConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self::from_env_config(&EnvConfig::from_env()?))
    }

    pub fn from_env_config(env: &EnvConfig) -> Self {
        Self {
            bind_addr: env.bind_address.clone(),
            port: env.port,
            origin_url: env.origin_url.clone(),
            api_key: env.api_key.clone(),
            api_url: env.api_url.clone(),
            page_ttl: env.page_ttl,
            config_ttl: env.config_ttl,
            languages_ttl: env.languages_ttl,
            translate_timeout: env.translate_timeout,
        }
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.bind_addr.is_empty() {
            return Err(EnvError {
                variable: "LINGUA_BIND_ADDRESS".to_string(),
                message: "Bind address cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(EnvError {
                variable: "LINGUA_PORT".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if url::Url::parse(&self.origin_url).is_err() {
            return Err(EnvError {
                variable: "LINGUA_ORIGIN_URL".to_string(),
                message: format!("Invalid origin URL '{}'", self.origin_url),
            });
        }

        Ok(())
    }

    /// 获取完整的监听地址
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// 为某个语言的页面构造引擎配置
    ///
    /// 页面在服务端渲染，访客看不到去模糊过渡，所以不等待宽限期
    pub fn engine_config(&self, lang: &str, api_key: &str) -> EngineConfig {
        EngineConfig::new(lang, api_key)
            .with_api_url(&self.api_url)
            .with_initial_timeout(self.translate_timeout)
            .with_reveal_grace(Duration::ZERO)
    }

    /// 源站上某个路径（含查询串）的完整地址
    pub fn origin_target(&self, path_and_query: &str) -> String {
        format!("{}{}", self.origin_url.trim_end_matches('/'), path_and_query)
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("Failed to load web config from environment: {}. Using defaults.", e);
            Self {
                bind_addr: "127.0.0.1".to_string(),
                port: 7080,
                origin_url: "http://127.0.0.1:8080".to_string(),
                api_key: None,
                api_url: crate::translation::constants::DEFAULT_API_URL.to_string(),
                page_ttl: Duration::from_secs(3600),
                config_ttl: Duration::from_secs(3600),
                languages_ttl: Duration::from_secs(86400),
                translate_timeout: crate::translation::constants::INITIAL_TRANSLATION_TIMEOUT,
            }
        })
    }
}
