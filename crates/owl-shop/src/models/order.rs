//! 订单模型
//!
//! 订单总是引用某个已知客户及其一个地址，金额以分为单位。

use chrono::{DateTime, Utc};
use fake::Fake;
use fake::faker::lorem::en::Word;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::address::Address;
use super::customer::CustomerRef;

/// 订单
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub revision: u32,
    pub customer: CustomerRef,
    pub delivery_address: Address,
    /// 订单总额（分）
    pub order_value: u64,
    pub line_items: Vec<LineItem>,
    pub payment: Payment,
    pub completed_at: Option<DateTime<Utc>>,
}

/// 订单项
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub article_id: String,
    pub name: String,
    pub quantity: u32,
    pub quantity_unit: String,
    /// 单价（分）
    pub unit_price: u64,
    pub total_price: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_id: String,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    Debit,
    Paypal,
}

impl Order {
    /// 为指定地址生成随机订单，包含 1-5 个订单项
    pub fn random_for(address: &Address) -> Self {
        let mut rng = rand::thread_rng();

        let item_count = rng.gen_range(1..=5);
        let line_items: Vec<LineItem> = (0..item_count).map(|_| LineItem::random()).collect();
        let order_value = line_items.iter().map(|item| item.total_price).sum();

        let now = Utc::now();
        // 约一半订单已完成
        let completed_at = rng.gen_bool(0.5).then_some(now);

        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            last_updated_at: now,
            revision: 0,
            customer: address.customer.clone(),
            delivery_address: address.clone(),
            order_value,
            line_items,
            payment: Payment::random(),
            completed_at,
        }
    }
}

impl LineItem {
    fn random() -> Self {
        let mut rng = rand::thread_rng();

        let units = ["piece", "pack", "kg"];
        let quantity = rng.gen_range(1..=5);
        let unit_price = rng.gen_range(199..=49_999);
        let word: String = Word().fake();

        Self {
            article_id: Uuid::new_v4().to_string(),
            name: format!("Owl {word}"),
            quantity,
            quantity_unit: units[rng.gen_range(0..units.len())].to_string(),
            unit_price,
            total_price: unit_price * u64::from(quantity),
        }
    }
}

impl Payment {
    fn random() -> Self {
        let method = match rand::thread_rng().gen_range(0..10) {
            0..=5 => PaymentMethod::CreditCard,
            6..=7 => PaymentMethod::Debit,
            _ => PaymentMethod::Paypal,
        };
        Self {
            payment_id: Uuid::new_v4().to_string(),
            method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::Customer;

    #[test]
    fn test_order_random_for_address() {
        let customer = Customer::random().reference();
        let address = Address::random_for(&customer);
        let order = Order::random_for(&address);

        assert_eq!(order.customer, customer);
        assert_eq!(order.delivery_address.id, address.id);
        assert!(!order.line_items.is_empty());
        assert!(order.line_items.len() <= 5);
    }

    #[test]
    fn test_order_value_is_sum_of_line_items() {
        let address = Address::random_for(&Customer::random().reference());
        let order = Order::random_for(&address);

        let expected: u64 = order
            .line_items
            .iter()
            .map(|item| item.unit_price * u64::from(item.quantity))
            .sum();
        assert_eq!(order.order_value, expected);
    }

    #[test]
    fn test_line_item_random() {
        let item = LineItem::random();

        assert!(item.name.starts_with("Owl "));
        assert!((1..=5).contains(&item.quantity));
        assert_eq!(item.total_price, item.unit_price * u64::from(item.quantity));
    }
}
