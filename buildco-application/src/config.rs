//! 分发器配置
//!
//! 既可通过 builder 显式构造，也可从环境变量读取：
//!
//! | 变量 | 含义 | 缺省 |
//! |------|------|------|
//! | `BUILDCO_DEFAULT_QUERY_TTL_SECS` | 查询缓存默认 TTL（秒） | 300 |
//! | `BUILDCO_SLOW_COMMAND_MS` | 慢命令阈值（毫秒） | 1000 |
//! | `BUILDCO_DISPATCH_TIMEOUT_MS` | 单次分发超时（毫秒），不设置则不限 | 无 |
//! | `BUILDCO_ALLOW_HANDLER_OVERRIDE` | 是否允许重复注册时覆盖 | false |
//!
use std::str::FromStr;
use std::time::Duration;

use bon::Builder;

use crate::error::{AppError, AppResult};

pub const ENV_DEFAULT_QUERY_TTL_SECS: &str = "BUILDCO_DEFAULT_QUERY_TTL_SECS";
pub const ENV_SLOW_COMMAND_MS: &str = "BUILDCO_SLOW_COMMAND_MS";
pub const ENV_DISPATCH_TIMEOUT_MS: &str = "BUILDCO_DISPATCH_TIMEOUT_MS";
pub const ENV_ALLOW_HANDLER_OVERRIDE: &str = "BUILDCO_ALLOW_HANDLER_OVERRIDE";

/// ```rust
/// use std::time::Duration;
/// use buildco_application::config::DispatcherConfig;
///
/// let config = DispatcherConfig::builder()
///     .default_query_ttl(Duration::from_secs(60))
///     .build();
///
/// assert_eq!(config.default_query_ttl, Duration::from_secs(60));
/// assert_eq!(config.slow_command_threshold, Duration::from_millis(1000));
/// assert!(!config.allow_handler_override);
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// `CachePolicy::Default` 查询使用的 TTL
    #[builder(default = Duration::from_secs(300))]
    pub default_query_ttl: Duration,

    /// 超过该耗时的命令记为慢命令
    #[builder(default = Duration::from_millis(1000))]
    pub slow_command_threshold: Duration,

    /// 重复注册同一名称时覆盖（否则报错）
    #[builder(default)]
    pub allow_handler_override: bool,

    /// 单次分发的超时；`None` 表示不限
    pub dispatch_timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DispatcherConfig {
    /// 从进程环境变量读取，未设置的项使用缺省值
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse::<u64>(&lookup, ENV_DEFAULT_QUERY_TTL_SECS)? {
            config.default_query_ttl = Duration::from_secs(secs);
        }
        if let Some(ms) = parse::<u64>(&lookup, ENV_SLOW_COMMAND_MS)? {
            config.slow_command_threshold = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(&lookup, ENV_DISPATCH_TIMEOUT_MS)? {
            if ms == 0 {
                return Err(AppError::Config(format!(
                    "{ENV_DISPATCH_TIMEOUT_MS} must be greater than 0"
                )));
            }
            config.dispatch_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(flag) = parse::<bool>(&lookup, ENV_ALLOW_HANDLER_OVERRIDE)? {
            config.allow_handler_override = flag;
        }

        Ok(config)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| AppError::Config(format!("{key}={raw:?}: {e}")))
}
