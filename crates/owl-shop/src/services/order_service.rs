//! 订单生产者
//!
//! 后台消费地址 topic，订单的客户和收货地址都取自已写入的地址。

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
use crate::models::{Address, Order};

const SERVICE: &str = "order-service";

pub struct OrderService {
    publisher: Arc<dyn EventPublisher>,
    admin: Arc<dyn TopicAdmin>,
    topic: TopicSpec,
    addresses_topic: String,
    kafka: Option<KafkaConfig>,
    consumer: Mutex<Option<KafkaConsumer>>,
    addresses: KnownEntities<Address>,
}

impl OrderService {
    pub fn new(
        config: &ShopConfig,
        publisher: Arc<dyn EventPublisher>,
        admin: Arc<dyn TopicAdmin>,
    ) -> Self {
        Self {
            publisher,
            admin,
            topic: topic_spec(config, topics::ORDERS),
            addresses_topic: config.topic_name(topics::ADDRESSES),
            kafka: None,
            consumer: Mutex::new(None),
            addresses: KnownEntities::with_capacity(KNOWN_ENTITY_CAPACITY),
        }
    }

    /// 启用地址 topic 的后台消费
    pub fn with_address_feed(mut self, kafka: KafkaConfig) -> Self {
        self.kafka = Some(kafka);
        self
    }

    pub fn known_addresses(&self) -> usize {
        self.addresses.len()
    }

    pub fn handle_address_message(&self, msg: &ConsumerMessage) -> Result<(), ShopError> {
        if msg.is_tombstone() {
            return Ok(());
        }

        let address: Address = msg.deserialize_payload()?;
        let id = address.id.clone();
        self.addresses.upsert(address, |a| a.id == id);
        Ok(())
    }

    /// 为随机已知地址生成并写入一个订单
    pub async fn create_order(&self) {
        let Some(address) = self.addresses.random() else {
            debug!(service = SERVICE, "没有已知地址，跳过创建订单");
            return;
        };

        let order = Order::random_for(&address);
        publish_event(
            self.publisher.as_ref(),
            SERVICE,
            &self.topic.name,
            &order.id,
            &order,
        )
        .await;
    }
}

#[async_trait]
impl ShopService for OrderService {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn initialize(&self, deadline: Instant) -> Result<(), ShopError> {
        create_topic_before(self.admin.as_ref(), &self.topic, deadline).await?;

        if let Some(kafka) = &self.kafka {
            let consumer = subscribe_feed(kafka, SERVICE, &self.addresses_topic)?;
            *self.consumer.lock() = Some(consumer);
        }
        Ok(())
    }

    fn background_task(self: Arc<Self>) -> Option<BoxFuture<'static, ()>> {
        let consumer = self.consumer.lock().take()?;
        info!(service = SERVICE, topic = %self.addresses_topic, "开始消费地址");

        Some(
            async move {
                consumer.run(|msg| self.handle_address_message(&msg)).await;
            }
            .boxed(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Customer;
    use crate::services::traits::{MockEventPublisher, MockTopicAdmin};

    fn address_message(address: &Address) -> ConsumerMessage {
        ConsumerMessage {
            topic: "owlshop-addresses".to_string(),
            partition: 2,
            offset: 10,
            key: Some(address.id.clone()),
            payload: Some(serde_json::to_vec(address).unwrap()),
            timestamp: None,
        }
    }

    fn service(publisher: MockEventPublisher) -> OrderService {
        OrderService::new(
            &ShopConfig::default(),
            Arc::new(publisher),
            Arc::new(MockTopicAdmin::new()),
        )
    }

    #[tokio::test]
    async fn test_create_order_without_addresses_is_noop() {
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().times(0);

        service(publisher).create_order().await;
    }

    #[tokio::test]
    async fn test_create_order_ships_to_known_address() {
        let address = Address::random_for(&Customer::random().reference());
        let address_id = address.id.clone();

        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .withf(move |topic, key, payload| {
                let order: Order =
                    serde_json::from_slice(payload.as_deref().unwrap_or_default()).unwrap();
                topic == "owlshop-orders"
                    && order.id == key
                    && order.delivery_address.id == address_id
                    && order.customer == order.delivery_address.customer
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(publisher);
        tokio_test::assert_ok!(service.handle_address_message(&address_message(&address)));
        service.create_order().await;
    }

    #[test]
    fn test_repeated_address_is_stored_once() {
        let service = service(MockEventPublisher::new());
        let address = Address::random_for(&Customer::random().reference());

        service.handle_address_message(&address_message(&address)).unwrap();
        service.handle_address_message(&address_message(&address)).unwrap();
        assert_eq!(service.known_addresses(), 1);
    }
}
