//! 生产者启动编排
//!
//! 按声明顺序依次初始化所有生产者，整个序列共享同一个截止时间。
//! 任何一个失败都会立即中止启动，后续生产者不会被初始化。
//! 全部成功后再把带后台任务的生产者以独立任务方式启动。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use shop_shared::error::ShopError;
use tokio::time::Instant;
use tracing::{error, info};

use crate::error::EngineError;

/// 生产者生命周期
///
/// `initialize` 必须在流量开始之前完成；`background_task` 可选，
/// 返回的 future 会被独立 spawn，不会被等待，也不会在失败后重启，
/// 其中的错误由任务自身记录。
#[async_trait]
pub trait ShopService: Send + Sync {
    fn name(&self) -> &'static str;

    async fn initialize(&self, deadline: Instant) -> Result<(), ShopError>;

    fn background_task(self: Arc<Self>) -> Option<BoxFuture<'static, ()>> {
        None
    }
}

/// 启动编排器
pub struct ServiceInitializer {
    services: Vec<Arc<dyn ShopService>>,
    timeout: Duration,
}

impl ServiceInitializer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            services: Vec::new(),
            timeout,
        }
    }

    /// 追加生产者，初始化顺序即追加顺序
    pub fn with_service(mut self, service: Arc<dyn ShopService>) -> Self {
        self.services.push(service);
        self
    }

    /// 在共享截止时间内依次初始化所有生产者
    pub async fn initialize_all(&self) -> Result<(), EngineError> {
        let deadline = Instant::now() + self.timeout;

        for service in &self.services {
            let name = service.name();
            // 截止时间已过时不再调用后续生产者的 initialize
            if Instant::now() >= deadline {
                error!(service = name, timeout = ?self.timeout, "截止时间已过，生产者未开始初始化");
                return Err(self.deadline_exceeded(name));
            }
            info!(service = name, "初始化生产者");

            match tokio::time::timeout_at(deadline, service.initialize(deadline)).await {
                Ok(Ok(())) => info!(service = name, "生产者初始化完成"),
                Ok(Err(source)) => {
                    error!(service = name, error = %source, code = source.code(), "生产者初始化失败");
                    return Err(EngineError::InitializationFailed {
                        service: name.to_string(),
                        source,
                    });
                }
                Err(_) => {
                    error!(service = name, timeout = ?self.timeout, "生产者初始化超时");
                    return Err(self.deadline_exceeded(name));
                }
            }
        }

        Ok(())
    }

    fn deadline_exceeded(&self, service: &str) -> EngineError {
        EngineError::StartupDeadlineExceeded {
            service: service.to_string(),
            timeout: self.timeout,
        }
    }

    /// 启动所有后台任务，返回启动的数量
    ///
    /// 任务句柄直接丢弃，任务与调度循环的生命周期互不相关。
    pub fn start_background_tasks(&self) -> usize {
        let mut started = 0;
        for service in &self.services {
            if let Some(task) = Arc::clone(service).background_task() {
                info!(service = service.name(), "启动后台任务");
                tokio::spawn(task);
                started += 1;
            }
        }
        started
    }

    /// 完整启动流程：初始化全部成功后才启动后台任务
    pub async fn run(&self) -> Result<usize, EngineError> {
        self.initialize_all().await?;
        Ok(self.start_background_tasks())
    }

    pub fn service_names(&self) -> Vec<&'static str> {
        self.services.iter().map(|s| s.name()).collect()
    }
}
