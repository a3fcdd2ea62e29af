//! 前端访问事件模型
//!
//! 模拟 Web 前端的一次 HTTP 请求日志。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fake::Fake;
use fake::faker::internet::en::{IPv4, UserAgent};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const PAGES: [&str; 8] = [
    "/",
    "/products",
    "/products/owl-plush",
    "/products/owl-mug",
    "/cart",
    "/checkout",
    "/account",
    "/search",
];

const LANGUAGES: [&str; 4] = ["en-US", "en-GB", "de-DE", "fr-FR"];

const REFERRERS: [&str; 4] = ["direct", "search", "social", "email"];

/// 前端访问事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendEvent {
    pub id: String,
    pub version: u32,
    pub request_id: String,
    pub headers: BTreeMap<String, String>,
    pub method: String,
    pub path: String,
    pub status_code: u16,
    pub remote_address: String,
    pub response_size_bytes: u32,
    pub request_duration_ms: u32,
    pub referrer: String,
    pub created_at: DateTime<Utc>,
}

impl FrontendEvent {
    /// 生成随机访问事件
    ///
    /// 绝大多数请求为成功的 GET，少量 404 与 5xx
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();

        let path = PAGES[rng.gen_range(0..PAGES.len())];
        let method = if path == "/checkout" && rng.gen_bool(0.5) {
            "POST"
        } else {
            "GET"
        };
        let status_code = match rng.gen_range(0..1000) {
            0..=959 => 200,
            960..=989 => 404,
            _ => 503,
        };

        let user_agent: String = UserAgent().fake();
        let mut headers = BTreeMap::new();
        headers.insert("user-agent".to_string(), user_agent);
        headers.insert(
            "accept-language".to_string(),
            LANGUAGES[rng.gen_range(0..LANGUAGES.len())].to_string(),
        );

        Self {
            id: Uuid::new_v4().to_string(),
            version: 0,
            request_id: Uuid::new_v4().to_string(),
            headers,
            method: method.to_string(),
            path: path.to_string(),
            status_code,
            remote_address: IPv4().fake(),
            response_size_bytes: rng.gen_range(512..256_000),
            request_duration_ms: rng.gen_range(5..1_500),
            referrer: REFERRERS[rng.gen_range(0..REFERRERS.len())].to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontend_event_random() {
        let event = FrontendEvent::random();

        assert!(PAGES.contains(&event.path.as_str()));
        assert!(event.method == "GET" || event.method == "POST");
        assert!([200, 404, 503].contains(&event.status_code));
        assert!(event.headers.contains_key("user-agent"));
        assert!(event.remote_address.parse::<std::net::Ipv4Addr>().is_ok());
        assert!(event.request_duration_ms >= 5 && event.request_duration_ms < 1_500);
    }

    #[test]
    fn test_post_only_on_checkout() {
        for _ in 0..200 {
            let event = FrontendEvent::random();
            if event.method == "POST" {
                assert_eq!(event.path, "/checkout");
            }
        }
    }
}
