//! 客户生产者
//!
//! 客户 topic 为 compacted topic，同一客户的每次修改都以客户 ID 为 key 重新写入，
//! 删除时写入 tombstone。

use std::sync::Arc;

use async_trait::async_trait;
use shop_shared::config::ShopConfig;
use shop_shared::error::ShopError;
use shop_shared::kafka::{TopicSpec, topics};
use tokio::time::Instant;
use tracing::debug;

use super::{
    EventPublisher, KNOWN_ENTITY_CAPACITY, KnownEntities, TopicAdmin, create_topic_before,
    publish_event, publish_tombstone, topic_spec,
};
use crate::engine::ShopService;
use crate::models::Customer;

const SERVICE: &str = "customer-service";

pub struct CustomerService {
    publisher: Arc<dyn EventPublisher>,
    admin: Arc<dyn TopicAdmin>,
    topic: TopicSpec,
    customers: KnownEntities<Customer>,
}

impl CustomerService {
    pub fn new(
        config: &ShopConfig,
        publisher: Arc<dyn EventPublisher>,
        admin: Arc<dyn TopicAdmin>,
    ) -> Self {
        Self {
            publisher,
            admin,
            topic: topic_spec(config, topics::CUSTOMERS).with_config("cleanup.policy", "compact"),
            customers: KnownEntities::with_capacity(KNOWN_ENTITY_CAPACITY),
        }
    }

    pub fn known_customers(&self) -> usize {
        self.customers.len()
    }

    /// 生成并写入一个新客户，写入成功后记住它
    pub async fn create_customer(&self) {
        let customer = Customer::random();
        if publish_event(
            self.publisher.as_ref(),
            SERVICE,
            &self.topic.name,
            &customer.id,
            &customer,
        )
        .await
        {
            self.customers.insert(customer);
        }
    }

    /// 随机修改一个已知客户并重新写入
    pub async fn modify_customer(&self) {
        let Some(customer) = self.customers.update_random(|c| {
            c.modify();
            c.clone()
        }) else {
            debug!(service = SERVICE, "没有已知客户，跳过修改");
            return;
        };

        publish_event(
            self.publisher.as_ref(),
            SERVICE,
            &self.topic.name,
            &customer.id,
            &customer,
        )
        .await;
    }

    /// 随机删除一个已知客户
    pub async fn delete_customer(&self) {
        let Some(customer) = self.customers.take_random() else {
            debug!(service = SERVICE, "没有已知客户，跳过删除");
            return;
        };

        publish_tombstone(self.publisher.as_ref(), SERVICE, &self.topic.name, &customer.id).await;
    }
}

#[async_trait]
impl ShopService for CustomerService {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn initialize(&self, deadline: Instant) -> Result<(), ShopError> {
        create_topic_before(self.admin.as_ref(), &self.topic, deadline).await
    }
}
