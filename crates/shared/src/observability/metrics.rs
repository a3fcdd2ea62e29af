//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取，无鉴权。

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ObservabilityConfig;

/// 已模拟的页面访问总数
pub const PAGE_IMPRESSIONS_SIMULATED: &str = "owlshop_page_impressions_simulated_total";
/// 成功写入 Kafka 的领域事件数
pub const EVENTS_PRODUCED: &str = "owlshop_events_produced_total";
/// 写入 Kafka 失败的领域事件数
pub const EVENTS_FAILED: &str = "owlshop_events_failed_total";

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定地址暴露 `/metrics` 端点。
pub async fn init(service_name: &str, config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("安装 Prometheus recorder 失败")?;

    describe_metrics();
    metrics::counter!("owlshop_service_starts_total", "service" => service_name.to_string())
        .increment(1);

    let addr: SocketAddr = config
        .metrics_addr()
        .parse()
        .with_context(|| format!("无效的指标监听地址: {}", config.metrics_addr()))?;
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 描述指标，描述会出现在 /metrics 端点的 HELP 注释中
pub fn describe_metrics() {
    metrics::describe_counter!(
        PAGE_IMPRESSIONS_SIMULATED,
        "Total number of page impressions simulated"
    );
    metrics::describe_counter!(EVENTS_PRODUCED, "Total number of events produced to Kafka");
    metrics::describe_counter!(
        EVENTS_FAILED,
        "Total number of events that failed to be produced"
    );
}

/// 构建指标路由，拆分出来便于测试
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }))
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = metrics_router(handle);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("绑定指标端口失败: {addr}"))?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
        info!("Metrics server quit");
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 页面访问计数器句柄
///
/// 在当前 recorder 中解析一次，调用方持有句柄后直接递增。
pub fn page_impressions_counter() -> metrics::Counter {
    metrics::counter!(PAGE_IMPRESSIONS_SIMULATED)
}

/// 记录事件写入成功
#[inline]
pub fn record_event_produced(service: &'static str) {
    metrics::counter!(EVENTS_PRODUCED, "service" => service).increment(1);
}

/// 记录事件写入失败
#[inline]
pub fn record_event_failed(service: &'static str, code: &'static str) {
    metrics::counter!(EVENTS_FAILED, "service" => service, "code" => code).increment(1);
}
