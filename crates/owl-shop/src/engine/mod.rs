//! 流量模拟引擎
//!
//! - `chooser`: 加权随机选择器
//! - `initializer`: 生产者启动编排
//! - `dispatcher`: 按固定间隔派发页面访问
//! - `counter`: 页面访问计数

mod action;
mod chooser;
mod counter;
mod dispatcher;
mod initializer;

pub use action::Action;
pub use chooser::{Choice, Chooser};
pub use counter::ImpressionCounter;
pub use dispatcher::{FatalHandler, ImpressionDispatcher, SimulationConfig};
pub use initializer::{ServiceInitializer, ShopService};
