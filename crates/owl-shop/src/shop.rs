//! 模拟商店装配
//!
//! 创建 Kafka 客户端与四个生产者，按顺序完成初始化，
//! 然后以固定权重表构建选择器并交给调度循环。

use std::sync::Arc;

use shop_shared::config::{AppConfig, KafkaConfig, ShopConfig};
use shop_shared::kafka::{KafkaAdmin, KafkaProducer};
use tracing::info;

use crate::engine::{
    Action, Choice, Chooser, ImpressionCounter, ImpressionDispatcher, ServiceInitializer,
    SimulationConfig,
};
use crate::error::EngineError;
use crate::services::{
    AddressService, CustomerService, EventPublisher, FrontendService, OrderService, TopicAdmin,
};

/// 各动作的相对权重
///
/// 前端访问占绝大多数，订单最少。
pub mod weights {
    pub const FRONTEND_EVENT: u32 = 1000;
    pub const CUSTOMER_CREATE: u32 = 50;
    pub const ADDRESS_CREATE: u32 = 30;
    pub const CUSTOMER_DELETE: u32 = 8;
    pub const CUSTOMER_MODIFY: u32 = 6;
    pub const ORDER_CREATE: u32 = 5;
}

/// 已完成初始化的生产者集合
#[derive(Clone)]
pub struct ShopServices {
    pub customers: Arc<CustomerService>,
    pub addresses: Arc<AddressService>,
    pub frontend: Arc<FrontendService>,
    pub orders: Arc<OrderService>,
}

impl ShopServices {
    pub fn new(
        config: &ShopConfig,
        kafka: Option<&KafkaConfig>,
        publisher: Arc<dyn EventPublisher>,
        admin: Arc<dyn TopicAdmin>,
    ) -> Self {
        let mut addresses =
            AddressService::new(config, Arc::clone(&publisher), Arc::clone(&admin));
        let mut orders = OrderService::new(config, Arc::clone(&publisher), Arc::clone(&admin));
        if let Some(kafka) = kafka {
            addresses = addresses.with_customer_feed(kafka.clone());
            orders = orders.with_address_feed(kafka.clone());
        }

        Self {
            customers: Arc::new(CustomerService::new(
                config,
                Arc::clone(&publisher),
                Arc::clone(&admin),
            )),
            addresses: Arc::new(addresses),
            frontend: Arc::new(FrontendService::new(config, publisher, admin)),
            orders: Arc::new(orders),
        }
    }

    /// 初始化顺序：客户、地址、前端、订单
    pub fn initializer(&self, config: &ShopConfig) -> ServiceInitializer {
        ServiceInitializer::new(config.startup_timeout())
            .with_service(self.customers.clone())
            .with_service(self.addresses.clone())
            .with_service(self.frontend.clone())
            .with_service(self.orders.clone())
    }

    /// 按固定权重表构建动作选择器
    pub fn chooser(&self) -> Result<Chooser<Action>, EngineError> {
        Chooser::new(vec![
            Choice::new(
                Action::bind("frontend.create_event", self.frontend.clone(), |svc| async move {
                    svc.create_frontend_event().await
                }),
                weights::FRONTEND_EVENT,
            ),
            Choice::new(
                Action::bind("customer.create", self.customers.clone(), |svc| async move {
                    svc.create_customer().await
                }),
                weights::CUSTOMER_CREATE,
            ),
            Choice::new(
                Action::bind("address.create", self.addresses.clone(), |svc| async move {
                    svc.create_address().await
                }),
                weights::ADDRESS_CREATE,
            ),
            Choice::new(
                Action::bind("customer.delete", self.customers.clone(), |svc| async move {
                    svc.delete_customer().await
                }),
                weights::CUSTOMER_DELETE,
            ),
            Choice::new(
                Action::bind("customer.modify", self.customers.clone(), |svc| async move {
                    svc.modify_customer().await
                }),
                weights::CUSTOMER_MODIFY,
            ),
            Choice::new(
                Action::bind("order.create", self.orders.clone(), |svc| async move {
                    svc.create_order().await
                }),
                weights::ORDER_CREATE,
            ),
        ])
    }
}

/// 可以开始产生流量的商店
pub struct Shop {
    services: ShopServices,
    dispatcher: ImpressionDispatcher,
}

impl Shop {
    /// 连接 Kafka 并完成全部启动步骤
    pub async fn connect(config: &AppConfig) -> Result<Self, EngineError> {
        let publisher: Arc<dyn EventPublisher> = Arc::new(KafkaProducer::new(&config.kafka)?);
        let admin: Arc<dyn TopicAdmin> = Arc::new(KafkaAdmin::new(&config.kafka)?);

        let services = ShopServices::new(&config.shop, Some(&config.kafka), publisher, admin);
        Self::start(&config.shop, services).await
    }

    /// 用给定的生产者完成启动
    ///
    /// 配置先于任何 I/O 校验；初始化失败或超时时不会启动任何后台任务。
    pub async fn start(config: &ShopConfig, services: ShopServices) -> Result<Self, EngineError> {
        let simulation =
            SimulationConfig::new(config.request_rate, config.request_rate_interval())?;
        let chooser = Arc::new(services.chooser()?);

        let initializer = services.initializer(config);
        let background = initializer.run().await?;
        info!(
            services = ?initializer.service_names(),
            background,
            total_weight = chooser.total_weight(),
            "所有生产者已就绪"
        );

        let dispatcher =
            ImpressionDispatcher::new(simulation, chooser, Arc::new(ImpressionCounter::new()));
        Ok(Self {
            services,
            dispatcher,
        })
    }

    pub fn services(&self) -> &ShopServices {
        &self.services
    }

    pub fn dispatcher(&self) -> &ImpressionDispatcher {
        &self.dispatcher
    }

    /// 开始产生流量；`ticks` 为 `None` 时一直运行
    pub async fn run(&self, ticks: Option<u64>) {
        match ticks {
            Some(ticks) => self.dispatcher.run_ticks(ticks).await,
            None => self.dispatcher.run().await,
        }
    }
}
