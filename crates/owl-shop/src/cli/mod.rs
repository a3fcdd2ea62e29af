//! CLI 模块
//!
//! # 使用示例
//!
//! ```bash
//! # 每秒 200 次页面访问
//! owl-shop --request-rate 200
//!
//! # 使用指定配置目录，只运行 10 个间隔
//! owl-shop -c ./config --ticks 10
//! ```

pub mod commands;

pub use commands::Cli;
