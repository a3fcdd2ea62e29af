//! 商店整体启动与流量
//!
//! 使用内存 broker 代替 Kafka，验证启动顺序、启动失败以及流量写入。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shop_shared::config::ShopConfig;
use shop_shared::error::ShopError;
use shop_shared::kafka::TopicSpec;

use owl_shop::services::{EventPublisher, TopicAdmin};
use owl_shop::{EngineError, Shop, ShopServices};

#[derive(Debug, Clone)]
struct Record {
    topic: String,
    key: String,
    tombstone: bool,
}

/// 记录所有调用的内存 broker
#[derive(Default)]
struct MemoryBroker {
    topics: Mutex<Vec<TopicSpec>>,
    records: Mutex<Vec<Record>>,
    reject_publish: AtomicBool,
    hang_on: Option<&'static str>,
}

impl MemoryBroker {
    fn hanging_on(topic: &'static str) -> Self {
        Self {
            hang_on: Some(topic),
            ..Default::default()
        }
    }

    fn created_topics(&self) -> Vec<String> {
        self.topics.lock().iter().map(|t| t.name.clone()).collect()
    }

    fn records_for(&self, topic: &str) -> Vec<Record> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.topic == topic)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventPublisher for MemoryBroker {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: Option<Vec<u8>>,
    ) -> Result<(), ShopError> {
        if self.reject_publish.load(Ordering::SeqCst) {
            return Err(ShopError::Kafka("Message production error: QueueFull".to_string()));
        }
        self.records.lock().push(Record {
            topic: topic.to_string(),
            key: key.to_string(),
            tombstone: payload.is_none(),
        });
        Ok(())
    }
}

#[async_trait]
impl TopicAdmin for MemoryBroker {
    async fn create_topic(&self, spec: &TopicSpec, _timeout: Duration) -> Result<(), ShopError> {
        if self.hang_on.is_some_and(|name| spec.name.ends_with(name)) {
            std::future::pending::<()>().await;
        }
        self.topics.lock().push(spec.clone());
        Ok(())
    }
}

fn config(request_rate: u32) -> ShopConfig {
    ShopConfig {
        request_rate,
        request_rate_interval_ms: 100,
        startup_timeout_secs: 2,
        ..Default::default()
    }
}

fn services(config: &ShopConfig, broker: &Arc<MemoryBroker>) -> ShopServices {
    ShopServices::new(config, None, broker.clone(), broker.clone())
}

#[tokio::test(start_paused = true)]
async fn startup_creates_every_topic_in_order() {
    let broker = Arc::new(MemoryBroker::default());
    let config = config(10);

    let shop = tokio_test::assert_ok!(Shop::start(&config, services(&config, &broker)).await);

    assert_eq!(
        broker.created_topics(),
        vec![
            "owlshop-customers",
            "owlshop-addresses",
            "owlshop-frontend-events",
            "owlshop-orders"
        ]
    );
    let customers = broker.topics.lock()[0].clone();
    assert!(
        customers
            .configs
            .contains(&("cleanup.policy".to_string(), "compact".to_string()))
    );
    assert_eq!(shop.dispatcher().counter().value(), 0);
}

#[tokio::test(start_paused = true)]
async fn startup_deadline_is_shared_across_services() {
    let broker = Arc::new(MemoryBroker::hanging_on("frontend-events"));
    let config = config(10);

    let result = Shop::start(&config, services(&config, &broker)).await;

    match result {
        Err(EngineError::StartupDeadlineExceeded { service, timeout }) => {
            assert_eq!(service, "frontend-service");
            assert_eq!(timeout, Duration::from_secs(2));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("startup should time out"),
    }
    // 订单生产者从未被初始化
    assert_eq!(
        broker.created_topics(),
        vec!["owlshop-customers", "owlshop-addresses"]
    );
}

#[tokio::test(start_paused = true)]
async fn traffic_reaches_the_broker() {
    let broker = Arc::new(MemoryBroker::default());
    let config = config(500);
    let shop = tokio_test::assert_ok!(Shop::start(&config, services(&config, &broker)).await);

    shop.run(Some(4)).await;

    assert_eq!(shop.dispatcher().counter().value(), 2000);
    let frontend = broker.records_for("owlshop-frontend-events");
    let customers = broker.records_for("owlshop-customers");
    assert!(!frontend.is_empty());
    assert!(!customers.is_empty());
    assert!(frontend.iter().all(|r| !r.tombstone && !r.key.is_empty()));
    // 没有消费者时地址与订单生产者不认识任何客户
    assert!(broker.records_for("owlshop-addresses").is_empty());
    assert!(broker.records_for("owlshop-orders").is_empty());
    assert!(broker.records.lock().len() <= 2000);
}

#[tokio::test(start_paused = true)]
async fn publish_failures_do_not_change_the_count() {
    let broker = Arc::new(MemoryBroker::default());
    let config = config(100);
    let shop = tokio_test::assert_ok!(Shop::start(&config, services(&config, &broker)).await);
    broker.reject_publish.store(true, Ordering::SeqCst);

    shop.run(Some(3)).await;

    assert_eq!(shop.dispatcher().counter().value(), 300);
    assert!(broker.records.lock().is_empty());
    assert_eq!(shop.services().customers.known_customers(), 0);
}
