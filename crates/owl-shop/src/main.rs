//! Owl Shop 入口
//!
//! 加载配置、初始化日志与指标、启动所有生产者，然后开始产生页面访问。
//! 启动失败时以非零状态退出。

use anyhow::Context;
use clap::Parser;
use owl_shop::Shop;
use owl_shop::cli::Cli;
use shop_shared::config::AppConfig;
use shop_shared::observability;
use tracing::{error, info};

const SERVICE_NAME: &str = "owl-shop";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load(SERVICE_NAME, cli.config_dir.as_deref()).context("加载配置失败")?;
    cli.apply(&mut config);

    let _guard = observability::init(SERVICE_NAME, &config.observability)
        .await
        .context("初始化可观测性失败")?;

    info!(
        environment = %config.environment,
        brokers = %config.kafka.brokers,
        request_rate = config.shop.request_rate,
        interval_ms = config.shop.request_rate_interval_ms,
        "Owl Shop 启动中"
    );

    let shop = match Shop::connect(&config).await {
        Ok(shop) => shop,
        Err(e) => {
            error!(error = %e, "启动失败");
            return Err(anyhow::Error::new(e).context("Owl Shop 启动失败"));
        }
    };

    shop.run(cli.ticks).await;
    Ok(())
}
