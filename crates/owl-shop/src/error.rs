//! 流量引擎错误类型
//!
//! 构造期与启动期错误都是致命的：引擎要么开始按配置速率产生流量，
//! 要么带着描述性的原因立即退出。

use std::time::Duration;

use shop_shared::error::ShopError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    // ==================== 构造错误 ====================
    #[error("权重表为空，至少需要一个动作")]
    EmptyChoices,

    #[error("权重必须为正数: index={index}")]
    ZeroWeight { index: usize },

    #[error("权重总和溢出")]
    WeightOverflow,

    #[error("无效的模拟配置: {0}")]
    InvalidSimulationConfig(String),

    // ==================== 启动错误 ====================
    #[error("初始化 {service} 失败: {source}")]
    InitializationFailed {
        service: String,
        #[source]
        source: ShopError,
    },

    #[error("启动超时: {service} 未能在 {timeout:?} 内完成初始化")]
    StartupDeadlineExceeded { service: String, timeout: Duration },

    #[error(transparent)]
    Shared(#[from] ShopError),
}

impl EngineError {
    /// 启动期错误（相对于构造期错误）
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            Self::InitializationFailed { .. } | Self::StartupDeadlineExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::ZeroWeight { index: 3 };
        assert_eq!(err.to_string(), "权重必须为正数: index=3");

        let err = EngineError::InitializationFailed {
            service: "address-service".to_string(),
            source: ShopError::Kafka("broker down".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "初始化 address-service 失败: Kafka 错误: broker down"
        );
        assert!(err.is_startup_error());

        let err = EngineError::StartupDeadlineExceeded {
            service: "order-service".to_string(),
            timeout: Duration::from_secs(60),
        };
        assert_eq!(
            err.to_string(),
            "启动超时: order-service 未能在 60s 内完成初始化"
        );
        assert!(!EngineError::EmptyChoices.is_startup_error());
    }
}
