//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，边缘代理和翻译引擎的配置都从这里读取

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "LINGUA_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 翻译服务相关环境变量
pub mod service {
    use super::*;

    /// 项目 API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "LINGUA_API_KEY";
        const DEFAULT: Option<String> = None; // 无默认值，未设置时直接透传源站
        const DESCRIPTION: &'static str = "Project API key used for config lookup and translation";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key cannot be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// 服务 API 基础地址
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "LINGUA_API_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("https://api.altified.com".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Base URL of the config, language and translation service";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }

    /// 首次翻译的超时预算
    pub struct TranslateTimeout;
    impl EnvVar<Duration> for TranslateTimeout {
        const NAME: &'static str = "LINGUA_TRANSLATE_TIMEOUT_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(5000));
        const DESCRIPTION: &'static str = "Initial translation budget in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_millis(value, Self::NAME, 100, 60_000)
        }
    }
}

/// 缓存相关环境变量
pub mod cache {
    use super::*;

    /// 译文页面 TTL
    pub struct PageTtl;
    impl EnvVar<Duration> for PageTtl {
        const NAME: &'static str = "LINGUA_PAGE_TTL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(3600));
        const DESCRIPTION: &'static str = "Translated page cache TTL in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_ttl(value, Self::NAME)
        }
    }

    /// 项目配置 TTL
    pub struct ConfigTtl;
    impl EnvVar<Duration> for ConfigTtl {
        const NAME: &'static str = "LINGUA_CONFIG_TTL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(3600));
        const DESCRIPTION: &'static str = "Project config cache TTL in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_ttl(value, Self::NAME)
        }
    }

    /// 语言名称 TTL
    pub struct LanguagesTtl;
    impl EnvVar<Duration> for LanguagesTtl {
        const NAME: &'static str = "LINGUA_LANGUAGES_TTL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(86400));
        const DESCRIPTION: &'static str = "Language name map cache TTL in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_ttl(value, Self::NAME)
        }
    }
}

/// 边缘服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "LINGUA_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Edge server bind address";

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "LINGUA_PORT";
        const DEFAULT: Option<u16> = Some(7080);
        const DESCRIPTION: &'static str = "Edge server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                });
            }

            Ok(port)
        }
    }

    /// 源站地址
    pub struct OriginUrl;
    impl EnvVar<String> for OriginUrl {
        const NAME: &'static str = "LINGUA_ORIGIN_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("http://127.0.0.1:8080".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Origin server base URL the edge forwards to";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }
}

/// 辅助函数
fn parse_http_url(value: &str, var_name: &str) -> EnvResult<String> {
    let trimmed = value.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).map_err(|e| EnvError {
        variable: var_name.to_string(),
        message: format!("Invalid URL '{}': {}", trimmed, e),
    })?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(trimmed.to_string()),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: "URL must start with http:// or https://".to_string(),
        }),
    }
}

fn parse_millis(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let millis: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of milliseconds".to_string(),
    })?;

    if millis < min || millis > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} outside of range {}..={}", millis, min, max),
        });
    }

    Ok(Duration::from_millis(millis))
}

fn parse_ttl(value: &str, var_name: &str) -> EnvResult<Duration> {
    let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of seconds".to_string(),
    })?;

    if seconds == 0 {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "TTL must be greater than 0".to_string(),
        });
    }

    if seconds > 86400 * 7 {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "TTL too long (maximum 7 days)".to_string(),
        });
    }

    Ok(Duration::from_secs(seconds))
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub log_level: String,
    pub no_color: bool,

    pub api_key: Option<String>,
    pub api_url: String,
    pub translate_timeout: Duration,

    pub page_ttl: Duration,
    pub config_ttl: Duration,
    pub languages_ttl: Duration,

    pub bind_address: String,
    pub port: u16,
    pub origin_url: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,

            api_key: service::ApiKey::get().ok(),
            api_url: service::ApiUrl::get()?,
            translate_timeout: service::TranslateTimeout::get()?,

            page_ttl: cache::PageTtl::get()?,
            config_ttl: cache::ConfigTtl::get()?,
            languages_ttl: cache::LanguagesTtl::get()?,

            bind_address: web::BindAddress::get()?,
            port: web::Port::get()?,
            origin_url: web::OriginUrl::get()?,
        })
    }

    /// 打印配置摘要（隐藏敏感信息）
    pub fn log_summary(&self) {
        tracing::info!("Log level: {}", self.log_level);
        tracing::info!("Origin: {}", self.origin_url);
        tracing::info!("Service API: {}", self.api_url);
        tracing::info!("Edge: {}:{}", self.bind_address, self.port);
        if self.api_key.is_some() {
            tracing::info!("API Key: [configured]");
        } else {
            tracing::warn!("API Key not configured, all requests pass through");
        }
    }
}
