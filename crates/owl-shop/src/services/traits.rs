//! 生产者依赖的外部接口
//!
//! 生产者只依赖这两个 trait 而非具体的 Kafka 客户端，便于 mock 测试

use std::time::Duration;

use async_trait::async_trait;
use shop_shared::error::ShopError;
use shop_shared::kafka::{KafkaAdmin, KafkaProducer, TopicSpec};

/// 事件发布接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// 发布一条消息，`payload` 为 `None` 表示 tombstone
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: Option<Vec<u8>>,
    ) -> Result<(), ShopError>;
}

/// topic 管理接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopicAdmin: Send + Sync {
    /// 创建 topic，已存在时视为成功
    async fn create_topic(&self, spec: &TopicSpec, timeout: Duration) -> Result<(), ShopError>;
}

#[async_trait]
impl EventPublisher for KafkaProducer {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: Option<Vec<u8>>,
    ) -> Result<(), ShopError> {
        self.send(topic, key, payload.as_deref()).await.map(|_| ())
    }
}

#[async_trait]
impl TopicAdmin for KafkaAdmin {
    async fn create_topic(&self, spec: &TopicSpec, timeout: Duration) -> Result<(), ShopError> {
        KafkaAdmin::create_topic(self, spec, timeout).await
    }
}
