//! 上游服务客户端
//!
//! 项目配置 (`GET /plan-status/?api_key=`) 和语言名称 (`GET /languages/`)，
//! 每个缓存周期只请求一次。

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::core::{LanguageNameMap, ProjectConfig};
use crate::translation::{TranslationError, TranslationResult};
use crate::web::edge_cache::EdgeCache;

const PLAN_STATUS_ENDPOINT: &str = "/plan-status/";
const LANGUAGES_ENDPOINT: &str = "/languages/";
const LANGUAGE_NAMES_KEY: &str = "language_names";

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LanguagesResponse {
    #[serde(default)]
    languages: Option<Vec<LanguageEntry>>,
}

/// 上游服务客户端
pub struct UpstreamClient {
    client: reqwest::Client,
    api_url: String,
    config_ttl: Duration,
    languages_ttl: Duration,
    configs: EdgeCache<ProjectConfig>,
    language_names: EdgeCache<LanguageNameMap>,
}

impl UpstreamClient {
    pub fn new(client: reqwest::Client, api_url: &str, config_ttl: Duration, languages_ttl: Duration) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            config_ttl,
            languages_ttl,
            configs: EdgeCache::new(),
            language_names: EdgeCache::new(),
        }
    }

    fn config_key(api_key: &str) -> String {
        format!("project_config_{}", api_key)
    }

    /// 获取项目配置
    pub async fn project_config(&self, api_key: &str) -> TranslationResult<ProjectConfig> {
        let key = Self::config_key(api_key);
        if let Some(config) = self.configs.get(&key) {
            return Ok(config);
        }

        let url = format!(
            "{}{}?api_key={}",
            self.api_url,
            PLAN_STATUS_ENDPOINT,
            utf8_percent_encode(api_key, NON_ALPHANUMERIC)
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TranslationError::ConfigUnavailable(format!("配置服务请求失败: {}", e)))?;

        if !response.status().is_success() {
            return Err(TranslationError::ConfigUnavailable(format!(
                "配置服务返回 HTTP {}",
                response.status()
            )));
        }

        let config: ProjectConfig = response
            .json()
            .await
            .map_err(|e| TranslationError::ConfigUnavailable(format!("配置解析失败: {}", e)))?;

        self.configs.put(&key, config.clone(), self.config_ttl);
        tracing::debug!("项目配置已缓存: {} 个目标语言", config.enabled_languages().len());

        Ok(config)
    }

    /// 获取语言名称；失败时返回空映射，显示名称回退为大写代码
    pub async fn language_names(&self) -> LanguageNameMap {
        if let Some(names) = self.language_names.get(LANGUAGE_NAMES_KEY) {
            return names;
        }

        match self.fetch_language_names().await {
            Ok(names) => {
                self.language_names
                    .put(LANGUAGE_NAMES_KEY, names.clone(), self.languages_ttl);
                names
            }
            Err(e) => {
                tracing::warn!("语言列表不可用: {}", e);
                LanguageNameMap::default()
            }
        }
    }

    async fn fetch_language_names(&self) -> TranslationResult<LanguageNameMap> {
        let url = format!("{}{}", self.api_url, LANGUAGES_ENDPOINT);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslationError::ConfigUnavailable(format!(
                "语言服务返回 HTTP {}",
                response.status()
            )));
        }

        let parsed: LanguagesResponse = response.json().await?;
        let mut names = LanguageNameMap::default();
        for entry in parsed.languages.unwrap_or_default() {
            if let (Some(code), Some(name)) = (entry.code, entry.name) {
                if !code.is_empty() && !name.is_empty() {
                    names.0.insert(code, name);
                }
            }
        }

        Ok(names)
    }

    /// 清理过期的配置和语言名称
    pub fn cleanup_expired(&self) -> usize {
        self.configs.cleanup_expired() + self.language_names.cleanup_expired()
    }
}
