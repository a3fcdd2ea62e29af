//! 地址生产者
//!
//! 后台消费客户 topic 以维护仍然存在的客户列表，新地址只会关联到这些客户。

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use shop_shared::config::{KafkaConfig, ShopConfig};
use shop_shared::error::ShopError;
use shop_shared::kafka::{ConsumerMessage, KafkaConsumer, TopicSpec, topics};
use tokio::time::Instant;
use tracing::{debug, info};

use super::{
    EventPublisher, KNOWN_ENTITY_CAPACITY, KnownEntities, TopicAdmin, create_topic_before,
    publish_event, subscribe_feed, topic_spec,
};
use crate::engine::ShopService;
use crate::models::{Address, Customer, CustomerRef};

const SERVICE: &str = "address-service";

pub struct AddressService {
    publisher: Arc<dyn EventPublisher>,
    admin: Arc<dyn TopicAdmin>,
    topic: TopicSpec,
    customers_topic: String,
    /// 为 `None` 时不消费客户 topic，客户只能通过 `handle_customer_message` 注入
    kafka: Option<KafkaConfig>,
    consumer: Mutex<Option<KafkaConsumer>>,
    customers: KnownEntities<CustomerRef>,
}

impl AddressService {
    pub fn new(
        config: &ShopConfig,
        publisher: Arc<dyn EventPublisher>,
        admin: Arc<dyn TopicAdmin>,
    ) -> Self {
        Self {
            publisher,
            admin,
            topic: topic_spec(config, topics::ADDRESSES),
            customers_topic: config.topic_name(topics::CUSTOMERS),
            kafka: None,
            consumer: Mutex::new(None),
            customers: KnownEntities::with_capacity(KNOWN_ENTITY_CAPACITY),
        }
    }

    /// 启用客户 topic 的后台消费
    pub fn with_customer_feed(mut self, kafka: KafkaConfig) -> Self {
        self.kafka = Some(kafka);
        self
    }

    pub fn known_customers(&self) -> usize {
        self.customers.len()
    }

    /// 处理一条客户消息：tombstone 移除客户，其余更新或加入客户
    pub fn handle_customer_message(&self, msg: &ConsumerMessage) -> Result<(), ShopError> {
        if msg.is_tombstone() {
            if let Some(id) = msg.key.as_deref() {
                let removed = self.customers.remove_where(|c| c.id == id);
                debug!(service = SERVICE, customer_id = id, removed, "客户已删除");
            }
            return Ok(());
        }

        let customer: Customer = msg.deserialize_payload()?;
        let reference = customer.reference();
        self.customers.upsert(reference, |c| c.id == customer.id);
        Ok(())
    }

    /// 为随机已知客户生成并写入一个地址
    pub async fn create_address(&self) {
        let Some(customer) = self.customers.random() else {
            debug!(service = SERVICE, "没有已知客户，跳过创建地址");
            return;
        };

        let address = Address::random_for(&customer);
        publish_event(
            self.publisher.as_ref(),
            SERVICE,
            &self.topic.name,
            &address.id,
            &address,
        )
        .await;
    }
}

#[async_trait]
impl ShopService for AddressService {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn initialize(&self, deadline: Instant) -> Result<(), ShopError> {
        create_topic_before(self.admin.as_ref(), &self.topic, deadline).await?;

        if let Some(kafka) = &self.kafka {
            let consumer = subscribe_feed(kafka, SERVICE, &self.customers_topic)?;
            *self.consumer.lock() = Some(consumer);
        }
        Ok(())
    }

    fn background_task(self: Arc<Self>) -> Option<BoxFuture<'static, ()>> {
        let consumer = self.consumer.lock().take()?;
        info!(service = SERVICE, topic = %self.customers_topic, "开始消费客户");

        Some(
            async move {
                consumer
                    .run(|msg| self.handle_customer_message(&msg))
                    .await;
            }
            .boxed(),
        )
    }
}
