//! 模拟商店的事件数据模型

pub mod address;
pub mod customer;
pub mod frontend;
pub mod order;

pub use address::{Address, AddressType};
pub use customer::{Customer, CustomerRef, CustomerType, Gender};
pub use frontend::FrontendEvent;
pub use order::{LineItem, Order, Payment, PaymentMethod};
