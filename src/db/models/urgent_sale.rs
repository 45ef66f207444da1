//! Urgent Sale Model
//!
//! 限时折扣的临期/剩余食品条目，独立于常规商品目录。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Urgent sale listing status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UrgentSaleStatus {
    Active,
    Inactive,
}

/// Urgent sale listing entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgentSaleItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    /// 原价
    pub price: f64,
    /// 折后价，创建时强制 < price
    pub discounted_price: f64,
    /// 剩余数量
    pub quantity: i32,
    /// 过期时间 (RFC 3339)
    pub expires_at: String,
    pub status: UrgentSaleStatus,
    pub seller: String,
    /// 浏览计数
    #[serde(default)]
    pub views: i64,
    pub created_at: String,
}

impl UrgentSaleItem {
    /// 是否已过期 (相对给定时刻)
    pub fn is_expired_at(&self, now: &str) -> bool {
        // RFC 3339 in UTC compares lexicographically
        self.expires_at.as_str() <= now
    }

    /// 是否可售：active、未过期、有余量
    pub fn is_sellable(&self, now: &str) -> bool {
        self.status == UrgentSaleStatus::Active && !self.is_expired_at(now) && self.quantity > 0
    }
}

/// Payload for creating an urgent sale listing
#[derive(Debug, Clone, Deserialize)]
pub struct UrgentSaleCreate {
    pub name: String,
    pub price: f64,
    pub discounted_price: f64,
    pub quantity: i32,
    pub expires_at: String,
    /// 管理员可代卖家创建
    pub seller: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: UrgentSaleStatus, quantity: i32, expires_at: &str) -> UrgentSaleItem {
        UrgentSaleItem {
            id: None,
            name: "surplus bread".into(),
            price: 10.0,
            discounted_price: 4.0,
            quantity,
            expires_at: expires_at.into(),
            status,
            seller: "seller-1".into(),
            views: 0,
            created_at: "2026-08-26T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_sellable_requires_active_unexpired_stock() {
        let now = "2026-08-26T12:00:00Z";
        assert!(item(UrgentSaleStatus::Active, 3, "2026-08-27T00:00:00Z").is_sellable(now));
        assert!(!item(UrgentSaleStatus::Inactive, 3, "2026-08-27T00:00:00Z").is_sellable(now));
        assert!(!item(UrgentSaleStatus::Active, 0, "2026-08-27T00:00:00Z").is_sellable(now));
        assert!(!item(UrgentSaleStatus::Active, 3, "2026-08-26T00:00:00Z").is_sellable(now));
    }
}
