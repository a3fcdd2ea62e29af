//! 统一错误处理模块
//!
//! 定义系统中所有共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum ShopError {
    // ==================== Kafka 错误 ====================
    #[error("Kafka 错误: {0}")]
    Kafka(String),

    #[error("创建 topic 失败: {topic} - {reason}")]
    TopicCreation { topic: String, reason: String },

    // ==================== 编码错误 ====================
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ShopError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Kafka(_) => "KAFKA_ERROR",
            Self::TopicCreation { .. } => "TOPIC_CREATION_FAILED",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
