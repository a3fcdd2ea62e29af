//! 共享库
//!
//! 包含流量生成器各组件共用的配置、错误处理、Kafka 客户端与可观测性基础设施代码。

pub mod config;
pub mod error;
pub mod kafka;
pub mod observability;
