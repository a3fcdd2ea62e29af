//! 前端访问事件生产者

use std::sync::Arc;

use async_trait::async_trait;
use shop_shared::config::ShopConfig;
use shop_shared::error::ShopError;
use shop_shared::kafka::{TopicSpec, topics};
use tokio::time::Instant;

use super::{EventPublisher, TopicAdmin, create_topic_before, publish_event, topic_spec};
use crate::engine::ShopService;
use crate::models::FrontendEvent;

const SERVICE: &str = "frontend-service";

pub struct FrontendService {
    publisher: Arc<dyn EventPublisher>,
    admin: Arc<dyn TopicAdmin>,
    topic: TopicSpec,
}

impl FrontendService {
    pub fn new(
        config: &ShopConfig,
        publisher: Arc<dyn EventPublisher>,
        admin: Arc<dyn TopicAdmin>,
    ) -> Self {
        Self {
            publisher,
            admin,
            topic: topic_spec(config, topics::FRONTEND_EVENTS),
        }
    }

    /// 写入一次随机页面访问
    pub async fn create_frontend_event(&self) {
        let event = FrontendEvent::random();
        publish_event(
            self.publisher.as_ref(),
            SERVICE,
            &self.topic.name,
            &event.request_id,
            &event,
        )
        .await;
    }
}

#[async_trait]
impl ShopService for FrontendService {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn initialize(&self, deadline: Instant) -> Result<(), ShopError> {
        create_topic_before(self.admin.as_ref(), &self.topic, deadline).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::traits::{MockEventPublisher, MockTopicAdmin};
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_frontend_event() {
        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .withf(|topic, key, payload| {
                let event: FrontendEvent =
                    serde_json::from_slice(payload.as_deref().unwrap_or_default()).unwrap();
                topic == "owlshop-frontend-events" && event.request_id == key
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = FrontendService::new(
            &ShopConfig::default(),
            Arc::new(publisher),
            Arc::new(MockTopicAdmin::new()),
        );
        service.create_frontend_event().await;
    }

    #[tokio::test]
    async fn test_initialize_propagates_topic_error() {
        let mut admin = MockTopicAdmin::new();
        admin.expect_create_topic().times(1).returning(|spec, _| {
            Err(ShopError::TopicCreation {
                topic: spec.name.clone(),
                reason: "not authorized".to_string(),
            })
        });

        let service = FrontendService::new(
            &ShopConfig::default(),
            Arc::new(MockEventPublisher::new()),
            Arc::new(admin),
        );
        let deadline = Instant::now() + Duration::from_secs(1);
        let err = service.initialize(deadline).await.unwrap_err();
        assert_eq!(err.code(), "TOPIC_CREATION_FAILED");
    }
}
