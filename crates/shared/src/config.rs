//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。
//! 配置只在进程启动时加载一次，运行期间不做热更新。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Kafka 配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    pub brokers: String,
    pub consumer_group: String,
    pub auto_offset_reset: String,
    /// 单条消息的最长投递时间，超时后由生产者自行记录失败
    pub message_timeout_ms: u64,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            consumer_group: "owl-shop".to_string(),
            auto_offset_reset: "earliest".to_string(),
            message_timeout_ms: 5000,
        }
    }
}

/// 流量模拟配置
///
/// `request_rate` 是每个间隔内的精确页面访问次数，而非平均值。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub request_rate: u32,
    pub request_rate_interval_ms: u64,
    /// 所有生产者初始化共享的总超时
    pub startup_timeout_secs: u64,
    pub topic_prefix: String,
    pub topic_partition_count: i32,
    pub topic_replication_factor: i32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            request_rate: 10,
            request_rate_interval_ms: 1000,
            startup_timeout_secs: 60,
            topic_prefix: "owlshop-".to_string(),
            topic_partition_count: 6,
            topic_replication_factor: 1,
        }
    }
}

impl ShopConfig {
    pub fn request_rate_interval(&self) -> Duration {
        Duration::from_millis(self.request_rate_interval_ms)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    /// 拼接全局前缀后的 topic 名称
    pub fn topic_name(&self, name: &str) -> String {
        format!("{}{}", self.topic_prefix, name)
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
    pub metrics_enabled: bool,
    pub metrics_host: String,
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_host: "0.0.0.0".to_string(),
            metrics_port: 8080,
        }
    }
}

impl ObservabilityConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// 获取指标服务地址
    pub fn metrics_addr(&self) -> String {
        format!("{}:{}", self.metrics_host, self.metrics_port)
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub kafka: KafkaConfig,
    pub shop: ShopConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. `.env` 文件（如存在，注入进程环境变量）
    /// 2. {config_dir}/default.toml（默认配置）
    /// 3. {config_dir}/{environment}.toml（环境特定配置）
    /// 4. {config_dir}/{service_name}.toml（服务特定配置）
    /// 5. 环境变量（OWLSHOP_ 前缀，`__` 分隔层级，如 OWLSHOP_SHOP__REQUEST_RATE -> shop.request_rate）
    pub fn load(service_name: &str, config_dir: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("OWLSHOP_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = config_dir
            .map(str::to_string)
            .or_else(|| std::env::var("CONFIG_DIR").ok())
            .unwrap_or_else(|| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            // 字段名本身含下划线，层级分隔使用双下划线
            .add_source(
                Environment::with_prefix("OWLSHOP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.shop.request_rate, 10);
        assert_eq!(config.shop.request_rate_interval(), Duration::from_secs(1));
        assert_eq!(config.shop.startup_timeout(), Duration::from_secs(60));
        assert_eq!(config.observability.metrics_port, 8080);
        assert_eq!(config.kafka.brokers, "localhost:9092");
    }

    #[test]
    fn test_topic_name_uses_prefix() {
        let config = ShopConfig {
            topic_prefix: "demo-".to_string(),
            ..Default::default()
        };
        assert_eq!(config.topic_name("customers"), "demo-customers");
    }

    #[test]
    fn test_metrics_addr() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.metrics_addr(), "0.0.0.0:8080");
        assert!(!config.json_logs());

        let json = ObservabilityConfig {
            log_format: "JSON".to_string(),
            ..Default::default()
        };
        assert!(json.json_logs());
    }

    #[test]
    fn test_load_from_service_file() {
        let dir = std::env::temp_dir().join(format!("owl-shop-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut file = std::fs::File::create(dir.join("owl-shop-test.toml")).unwrap();
        writeln!(
            file,
            "[shop]\nrequest_rate = 250\nrequest_rate_interval_ms = 200\n\n[kafka]\nbrokers = \"kafka:29092\""
        )
        .unwrap();

        let config = AppConfig::load("owl-shop-test", dir.to_str()).unwrap();
        assert_eq!(config.service_name, "owl-shop-test");
        assert_eq!(config.shop.request_rate, 250);
        assert_eq!(config.shop.request_rate_interval(), Duration::from_millis(200));
        assert_eq!(config.kafka.brokers, "kafka:29092");
        // 未出现在文件中的字段回落到默认值
        assert_eq!(config.shop.topic_prefix, "owlshop-");
        assert_eq!(config.observability.metrics_port, 8080);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let config = AppConfig::load("owl-shop", Some("/nonexistent/owl-shop-config")).unwrap();
        assert_eq!(config.service_name, "owl-shop");
        assert_eq!(config.shop.startup_timeout_secs, 60);
    }
}
