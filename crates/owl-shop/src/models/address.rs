//! 地址模型

use chrono::{DateTime, Utc};
use fake::Fake;
use fake::faker::address::en::{
    BuildingNumber, CityName, Latitude, Longitude, StateName, StreetName, ZipCode,
};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::customer::CustomerRef;

/// 客户地址
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    pub customer: CustomerRef,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub first_name: String,
    pub last_name: String,
    pub state: String,
    pub street: String,
    pub house_number: String,
    pub city: String,
    pub zip: String,
    pub latitude: String,
    pub longitude: String,
    pub phone: String,
    pub additional_address_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub revision: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressType {
    Invoice,
    Delivery,
}

impl Address {
    /// 为指定客户生成随机地址
    ///
    /// 约 20% 的地址带有补充说明
    pub fn random_for(customer: &CustomerRef) -> Self {
        let mut rng = rand::thread_rng();

        let address_type = if rng.gen_bool(0.5) {
            AddressType::Delivery
        } else {
            AddressType::Invoice
        };
        let additional_address_info = if rng.gen_bool(0.2) {
            Some(Sentence(3..6).fake())
        } else {
            None
        };

        Self {
            id: Uuid::new_v4().to_string(),
            customer: customer.clone(),
            address_type,
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            state: StateName().fake(),
            street: StreetName().fake(),
            house_number: BuildingNumber().fake(),
            city: CityName().fake(),
            zip: ZipCode().fake(),
            latitude: Latitude().fake(),
            longitude: Longitude().fake(),
            phone: PhoneNumber().fake(),
            additional_address_info,
            created_at: Utc::now(),
            revision: 0,
        }
    }
}
