//! 事件生产者
//!
//! 每个生产者负责一个 topic：启动时创建 topic，运行时由调度循环随机触发写入。
//! 地址和订单生产者还会在后台消费上游 topic，以便引用真实存在的客户和地址。

pub mod address_service;
pub mod customer_service;
pub mod frontend_service;
pub mod known_entities;
pub mod order_service;
pub mod traits;

pub use address_service::AddressService;
pub use customer_service::CustomerService;
pub use frontend_service::FrontendService;
pub use known_entities::KnownEntities;
pub use order_service::OrderService;
pub use traits::{EventPublisher, TopicAdmin};

use serde::Serialize;
use shop_shared::config::{KafkaConfig, ShopConfig};
use shop_shared::error::ShopError;
use shop_shared::kafka::{KafkaConsumer, TopicSpec};
use shop_shared::observability::metrics::{record_event_failed, record_event_produced};
use tokio::time::Instant;
use tracing::{debug, warn};

/// 每个生产者最多记住的实体数量
pub const KNOWN_ENTITY_CAPACITY: usize = 10_000;

/// 按全局配置构造 topic 描述
pub(crate) fn topic_spec(config: &ShopConfig, base_name: &str) -> TopicSpec {
    TopicSpec::new(
        config.topic_name(base_name),
        config.topic_partition_count,
        config.topic_replication_factor,
    )
}

/// 在截止时间之前创建 topic，超时时间取剩余时间
pub(crate) async fn create_topic_before(
    admin: &dyn TopicAdmin,
    spec: &TopicSpec,
    deadline: Instant,
) -> Result<(), ShopError> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    admin.create_topic(spec, remaining).await
}

/// 创建消费上游 topic 的消费者，每个生产者使用独立的消费组
pub(crate) fn subscribe_feed(
    kafka: &KafkaConfig,
    service: &str,
    topic: &str,
) -> Result<KafkaConsumer, ShopError> {
    let consumer = KafkaConsumer::new(kafka, Some(service))?;
    consumer.subscribe(&[topic])?;
    Ok(consumer)
}

/// 序列化并发布一条事件，记录指标
///
/// 失败只记录日志和指标，不向调用方传播；返回是否写入成功。
pub(crate) async fn publish_event<T: Serialize>(
    publisher: &dyn EventPublisher,
    service: &'static str,
    topic: &str,
    key: &str,
    value: &T,
) -> bool {
    let payload = match serde_json::to_vec(value) {
        Ok(payload) => payload,
        Err(e) => {
            let e = ShopError::from(e);
            warn!(service, topic, key, error = %e, code = e.code(), "事件序列化失败");
            record_event_failed(service, e.code());
            return false;
        }
    };
    record_outcome(service, topic, key, publisher.publish(topic, key, Some(payload)).await)
}

/// 发布 tombstone
pub(crate) async fn publish_tombstone(
    publisher: &dyn EventPublisher,
    service: &'static str,
    topic: &str,
    key: &str,
) -> bool {
    record_outcome(service, topic, key, publisher.publish(topic, key, None).await)
}

fn record_outcome(
    service: &'static str,
    topic: &str,
    key: &str,
    result: Result<(), ShopError>,
) -> bool {
    match result {
        Ok(()) => {
            debug!(service, topic, key, "事件已写入");
            record_event_produced(service);
            true
        }
        Err(e) => {
            warn!(service, topic, key, error = %e, code = e.code(), "事件写入失败");
            record_event_failed(service, e.code());
            false
        }
    }
}
