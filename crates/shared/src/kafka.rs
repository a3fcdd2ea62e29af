//! Kafka 基础设施封装
//!
//! 将 rdkafka 的底层 API 封装为 Producer/Consumer/Admin，
//! 统一消息序列化与错误映射。

use std::time::Duration;

use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::message::{BorrowedMessage, Message};
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::config::KafkaConfig;
use crate::error::ShopError;

// ---------------------------------------------------------------------------
// Topic 常量
// ---------------------------------------------------------------------------

/// topic 基础名称，实际名称需拼接 `shop.topic_prefix`
pub mod topics {
    pub const CUSTOMERS: &str = "customers";
    pub const ADDRESSES: &str = "addresses";
    pub const FRONTEND_EVENTS: &str = "frontend-events";
    pub const ORDERS: &str = "orders";
}

// ---------------------------------------------------------------------------
// ConsumerMessage
// ---------------------------------------------------------------------------

/// 消费到的 Kafka 消息的统一表示
///
/// 将 rdkafka 的 `BorrowedMessage`（带生命周期约束）转换为拥有所有权的结构体，
/// 使消息可以安全地跨 await 点传递给异步处理函数。
/// `payload` 为 `None` 表示 tombstone（compacted topic 上的删除标记）。
#[derive(Debug, Clone)]
pub struct ConsumerMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub payload: Option<Vec<u8>>,
    pub timestamp: Option<i64>,
}

impl ConsumerMessage {
    fn from_borrowed(msg: &BorrowedMessage<'_>) -> Self {
        let key = msg
            .key()
            .and_then(|k| std::str::from_utf8(k).ok())
            .map(String::from);

        Self {
            topic: msg.topic().to_string(),
            partition: msg.partition(),
            offset: msg.offset(),
            key,
            payload: msg.payload().map(|p| p.to_vec()),
            timestamp: msg.timestamp().to_millis(),
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.payload.is_none()
    }

    /// 将 JSON 格式负载反序列化为目标类型
    pub fn deserialize_payload<T: DeserializeOwned>(&self) -> Result<T, ShopError> {
        let payload = self.payload.as_deref().ok_or_else(|| {
            ShopError::Kafka(format!("消息无负载: {}@{}", self.topic, self.offset))
        })?;
        Ok(serde_json::from_slice(payload)?)
    }
}

// ---------------------------------------------------------------------------
// KafkaProducer
// ---------------------------------------------------------------------------

/// 面向业务的 Kafka 生产者
///
/// 封装 `FutureProducer` 并提供类型安全的 JSON 发送方法，
/// 内部已派生 Clone（`FutureProducer` 本身是 Arc 包装的）。
#[derive(Clone)]
pub struct KafkaProducer {
    producer: FutureProducer,
    queue_timeout: Duration,
}

impl KafkaProducer {
    /// 根据配置创建生产者
    pub fn new(config: &KafkaConfig) -> Result<Self, ShopError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .create()
            .map_err(|e| ShopError::Kafka(format!("创建生产者失败: {e}")))?;

        info!(brokers = %config.brokers, "Kafka 生产者已初始化");
        Ok(Self {
            producer,
            queue_timeout: Duration::from_millis(config.message_timeout_ms),
        })
    }

    /// 发送消息，`payload` 为 `None` 时发送 tombstone
    pub async fn send(
        &self,
        topic: &str,
        key: &str,
        payload: Option<&[u8]>,
    ) -> Result<(i32, i64), ShopError> {
        let mut record = FutureRecord::<str, [u8]>::to(topic).key(key);
        if let Some(payload) = payload {
            record = record.payload(payload);
        }

        // rdkafka 0.39+ 返回 Delivery 结构体而非元组
        let delivery = self
            .producer
            .send(record, self.queue_timeout)
            .await
            .map_err(|(e, _)| ShopError::Kafka(format!("发送消息失败: {e}")))?;

        debug!(
            topic,
            key,
            partition = delivery.partition,
            offset = delivery.offset,
            "消息已发送"
        );
        Ok((delivery.partition, delivery.offset))
    }
}

// ---------------------------------------------------------------------------
// KafkaConsumer
// ---------------------------------------------------------------------------

/// 面向业务的 Kafka 消费者
///
/// 封装 `StreamConsumer`，消费循环随进程一直运行。
pub struct KafkaConsumer {
    consumer: StreamConsumer,
}

impl KafkaConsumer {
    /// 创建消费者
    ///
    /// `group_id_suffix` 允许不同生产者的后台消费使用独立的消费组，
    /// 例如 "owl-shop.address-service"。
    pub fn new(config: &KafkaConfig, group_id_suffix: Option<&str>) -> Result<Self, ShopError> {
        let group_id = match group_id_suffix {
            Some(suffix) => format!("{}.{}", config.consumer_group, suffix),
            None => config.consumer_group.clone(),
        };

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &group_id)
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("enable.auto.commit", "true")
            .create()
            .map_err(|e| ShopError::Kafka(format!("创建消费者失败: {e}")))?;

        info!(brokers = %config.brokers, group_id, "Kafka 消费者已初始化");
        Ok(Self { consumer })
    }

    /// 订阅指定的 topic 列表
    pub fn subscribe(&self, topics: &[&str]) -> Result<(), ShopError> {
        self.consumer
            .subscribe(topics)
            .map_err(|e| ShopError::Kafka(format!("订阅 topic 失败: {e}")))?;

        info!(?topics, "已订阅 Kafka topics");
        Ok(())
    }

    /// 启动消费循环
    ///
    /// handler 返回错误只记录日志，不中断循环。
    /// 仅当消息流结束时返回。
    pub async fn run<F>(self, mut handler: F)
    where
        F: FnMut(ConsumerMessage) -> Result<(), ShopError>,
    {
        use futures::StreamExt;

        let stream = self.consumer.stream();
        futures::pin_mut!(stream);
        info!("Kafka 消费循环已启动");

        while let Some(msg_result) = stream.next().await {
            match msg_result {
                Ok(borrowed_msg) => {
                    let msg = ConsumerMessage::from_borrowed(&borrowed_msg);
                    debug!(
                        topic = %msg.topic,
                        partition = msg.partition,
                        offset = msg.offset,
                        "收到 Kafka 消息"
                    );

                    let (topic, offset) = (msg.topic.clone(), msg.offset);
                    if let Err(e) = handler(msg) {
                        error!(error = %e, topic = %topic, offset, "处理 Kafka 消息失败");
                    }
                }
                Err(e) => {
                    error!(error = %e, "接收 Kafka 消息出错");
                }
            }
        }

        warn!("Kafka 消息流意外结束");
    }
}

// ---------------------------------------------------------------------------
// KafkaAdmin
// ---------------------------------------------------------------------------

/// 待创建 topic 的描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i32,
    pub configs: Vec<(String, String)>,
}

impl TopicSpec {
    pub fn new(name: impl Into<String>, partitions: i32, replication_factor: i32) -> Self {
        Self {
            name: name.into(),
            partitions,
            replication_factor,
            configs: Vec::new(),
        }
    }

    /// 追加 topic 级配置，如 `cleanup.policy=compact`
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configs.push((key.into(), value.into()));
        self
    }
}

/// topic 管理客户端
pub struct KafkaAdmin {
    admin: AdminClient<DefaultClientContext>,
}

impl KafkaAdmin {
    pub fn new(config: &KafkaConfig) -> Result<Self, ShopError> {
        let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .create()
            .map_err(|e| ShopError::Kafka(format!("创建管理客户端失败: {e}")))?;

        Ok(Self { admin })
    }

    /// 创建 topic，已存在时视为成功
    pub async fn create_topic(&self, spec: &TopicSpec, timeout: Duration) -> Result<(), ShopError> {
        let mut topic = NewTopic::new(
            &spec.name,
            spec.partitions,
            TopicReplication::Fixed(spec.replication_factor),
        );
        for (key, value) in &spec.configs {
            topic = topic.set(key.as_str(), value.as_str());
        }

        let options = AdminOptions::new()
            .operation_timeout(Some(timeout))
            .request_timeout(Some(timeout));

        let results = self
            .admin
            .create_topics([&topic], &options)
            .await
            .map_err(|e| ShopError::TopicCreation {
                topic: spec.name.clone(),
                reason: e.to_string(),
            })?;

        for result in results {
            match result {
                Ok(name) => info!(topic = %name, partitions = spec.partitions, "topic 已创建"),
                Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    debug!(topic = %name, "topic 已存在，跳过创建");
                }
                Err((name, code)) => {
                    return Err(ShopError::TopicCreation {
                        topic: name,
                        reason: code.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 测试
// ---------------------------------------------------------------------------
