//! 翻译服务客户端
//!
//! `POST <api>/translate/`，请求体 `{project_api_key, language, texts}`，
//! 响应体 `{translations: [{original, translated}]}`。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translation::config::EngineConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 一条翻译结果；字段缺失时为 `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationPair {
    #[serde(default)]
    pub original: Option<String>,
    #[serde(default)]
    pub translated: Option<String>,
}

impl TranslationPair {
    pub fn new(original: &str, translated: &str) -> Self {
        Self {
            original: Some(original.to_string()),
            translated: Some(translated.to_string()),
        }
    }

    /// 两个字段都存在且非空时返回 `(original, translated)`
    pub fn as_complete(&self) -> Option<(&str, &str)> {
        match (self.original.as_deref(), self.translated.as_deref()) {
            (Some(original), Some(translated)) if !original.is_empty() && !translated.is_empty() => {
                Some((original, translated))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    project_api_key: &'a str,
    language: &'a str,
    texts: &'a [String],
}

#[derive(Debug, Default, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Option<Vec<TranslationPair>>,
}

/// 翻译服务接口
///
/// 页面级引擎运行在单线程上，实现不需要 `Send`。
#[async_trait(?Send)]
pub trait TranslateApi {
    /// 一次请求翻译一组去重后的文本
    async fn translate(&self, lang: &str, texts: &[String]) -> TranslationResult<Vec<TranslationPair>>;
}

/// 基于 reqwest 的翻译服务客户端
#[derive(Clone)]
pub struct HttpTranslateApi {
    client: reqwest::Client,
    endpoint: String,
    project_api_key: String,
}

impl HttpTranslateApi {
    pub fn new(config: &EngineConfig) -> TranslationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TranslationError::NetworkError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self::with_client(client, config))
    }

    /// 复用已有的连接池
    pub fn with_client(client: reqwest::Client, config: &EngineConfig) -> Self {
        Self {
            client,
            endpoint: config.translate_endpoint(),
            project_api_key: config.project_api_key.clone(),
        }
    }
}

impl std::fmt::Debug for HttpTranslateApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTranslateApi")
            .field("endpoint", &self.endpoint)
            .field("project_api_key", &"***")
            .finish()
    }
}

#[async_trait(?Send)]
impl TranslateApi for HttpTranslateApi {
    async fn translate(&self, lang: &str, texts: &[String]) -> TranslationResult<Vec<TranslationPair>> {
        let body = TranslateRequest {
            project_api_key: &self.project_api_key,
            language: lang,
            texts,
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::TranslationServiceError(format!("HTTP {}", status)));
        }

        let raw = response.text().await?;
        let parsed: TranslateResponse = serde_json::from_str(&raw)?;

        Ok(parsed.translations.unwrap_or_default())
    }
}
