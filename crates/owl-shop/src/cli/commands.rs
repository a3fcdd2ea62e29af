//! CLI 参数定义
//!
//! 命令行参数优先级高于配置文件和环境变量。

use clap::Parser;
use shop_shared::config::AppConfig;

/// 模拟商店流量生成器
#[derive(Parser, Debug, Default)]
#[command(name = "owl-shop")]
#[command(version, about = "向 Kafka 持续写入模拟商店流量")]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 配置文件目录
    #[arg(short, long)]
    pub config_dir: Option<String>,

    /// Kafka brokers 地址
    #[arg(long)]
    pub kafka_brokers: Option<String>,

    /// 每个间隔内的页面访问次数
    #[arg(short = 'r', long)]
    pub request_rate: Option<u32>,

    /// 间隔长度（毫秒）
    #[arg(long)]
    pub request_rate_interval_ms: Option<u64>,

    /// 只运行指定数量的间隔，缺省时一直运行
    #[arg(short, long)]
    pub ticks: Option<u64>,
}

impl Cli {
    /// 将命令行参数覆盖到已加载的配置上
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(brokers) = &self.kafka_brokers {
            config.kafka.brokers = brokers.clone();
        }
        if let Some(rate) = self.request_rate {
            config.shop.request_rate = rate;
        }
        if let Some(interval) = self.request_rate_interval_ms {
            config.shop.request_rate_interval_ms = interval;
        }
    }
}
