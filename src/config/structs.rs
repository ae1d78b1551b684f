//! 应用配置
//!
//! 从 TOML 文件和环境变量加载，启动时构建一次后显式注入各组件。
//! 不使用进程级全局配置单例。

use serde::{Deserialize, Serialize};

/// 应用配置
///
/// 包含：
/// - server: 服务器地址、端口
/// - database: 数据库连接配置
/// - directory: 外部电台目录服务配置
/// - aggregator: 聚合器限制
/// - analytics: 点击统计汇总与清理配置
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：RD，分隔符：__
    /// 示例：RD__SERVER__PORT=9999
    pub fn load() -> Self {
        use config::{Config, Environment, File};

        let path = "config.toml";

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 RD，分隔符 __
            .add_source(
                Environment::with_prefix("RD")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<AppConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 外部电台目录服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// 目录服务基础 URL（radio-browser 风格的 JSON API）
    #[serde(default = "default_directory_base_url")]
    pub base_url: String,
    /// 单次请求超时（秒）
    #[serde(default = "default_directory_timeout_secs")]
    pub timeout_secs: u64,
    /// 描述性 User-Agent，目录服务要求每个客户端可识别
    #[serde(default = "default_directory_user_agent")]
    pub user_agent: String,
    /// 分面结果缓存 TTL（秒）
    #[serde(default = "default_directory_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

/// 聚合器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// 单次请求返回条目的硬上限
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
    /// 摘要块中 top 切片的长度
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

/// 点击统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// 汇总任务运行间隔（秒）
    #[serde(default = "default_roller_interval_secs")]
    pub roller_interval_secs: u64,
    /// 已汇总事件的保留宽限期（天）
    #[serde(default = "default_retention_grace_days")]
    pub retention_grace_days: u64,
    /// 清理任务运行间隔（小时）
    #[serde(default = "default_retention_interval_hours")]
    pub retention_interval_hours: u64,
    /// 清理任务单批删除行数
    #[serde(default = "default_prune_batch_size")]
    pub prune_batch_size: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "radiodir.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_directory_base_url() -> String {
    "https://de1.api.radio-browser.info/json".to_string()
}

fn default_directory_timeout_secs() -> u64 {
    10
}

fn default_directory_user_agent() -> String {
    format!("radiodir/{} (+https://github.com/radiodir/radiodir)", env!("CARGO_PKG_VERSION"))
}

fn default_directory_cache_ttl_secs() -> u64 {
    60
}

fn default_max_limit() -> u64 {
    500
}

fn default_top_n() -> usize {
    10
}

fn default_roller_interval_secs() -> u64 {
    3600
}

fn default_retention_grace_days() -> u64 {
    30
}

fn default_retention_interval_hours() -> u64 {
    12
}

fn default_prune_batch_size() -> u64 {
    10000
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_base_url(),
            timeout_secs: default_directory_timeout_secs(),
            user_agent: default_directory_user_agent(),
            cache_ttl_secs: default_directory_cache_ttl_secs(),
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_limit: default_max_limit(),
            top_n: default_top_n(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            roller_interval_secs: default_roller_interval_secs(),
            retention_grace_days: default_retention_grace_days(),
            retention_interval_hours: default_retention_interval_hours(),
            prune_batch_size: default_prune_batch_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
