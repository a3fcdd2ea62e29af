//! Owl Shop
//!
//! 模拟一个网上商店的流量，持续向 Kafka 写入客户、地址、前端访问和订单事件。
//!
//! # 主要模块
//!
//! - `engine`: 加权选择、启动编排、页面访问调度与计数
//! - `services`: 各 topic 的事件生产者
//! - `models`: 事件数据模型
//! - `shop`: 将以上部分装配为可运行的商店

pub mod cli;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod shop;

pub use error::EngineError;
pub use shop::{Shop, ShopServices};
