//! 客户模型
//!
//! 客户 topic 是 compacted topic，以客户 ID 作为消息 key，
//! 删除客户时写入 tombstone。

use chrono::{DateTime, Utc};
use fake::Fake;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 客户
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    /// 仅企业客户有公司名
    pub company_name: Option<String>,
    pub email: String,
    pub customer_type: CustomerType,
    /// 每次修改递增
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    Personal,
    Business,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Female,
    Male,
    Diverse,
}

/// 其他事件中对客户的引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    pub id: String,
    pub customer_type: CustomerType,
}

impl Customer {
    /// 生成随机客户
    ///
    /// 约 15% 为企业客户
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();

        let customer_type = if rng.gen_bool(0.15) {
            CustomerType::Business
        } else {
            CustomerType::Personal
        };
        let company_name = match customer_type {
            CustomerType::Business => Some(CompanyName().fake()),
            CustomerType::Personal => None,
        };
        let gender = match rng.gen_range(0..100) {
            0..=47 => Gender::Female,
            48..=95 => Gender::Male,
            _ => Gender::Diverse,
        };

        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            gender,
            company_name,
            email: SafeEmail().fake(),
            customer_type,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// 模拟一次资料修改：更换邮箱，偶尔更换姓氏
    pub fn modify(&mut self) {
        let mut rng = rand::thread_rng();

        self.email = SafeEmail().fake();
        if rng.gen_bool(0.3) {
            self.last_name = LastName().fake();
        }
        self.revision += 1;
        self.updated_at = Utc::now();
    }

    pub fn reference(&self) -> CustomerRef {
        CustomerRef {
            id: self.id.clone(),
            customer_type: self.customer_type,
        }
    }
}
