//! Product Model
//!
//! 常规目录商品。目录管理属卖家后台，订单流程只读取并调整库存。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Catalog product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    /// 单价 (元)
    pub price: f64,
    /// 库存，不变式: 永不为负
    pub stock: i32,
    /// 所属卖家用户 ID
    pub seller: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

/// Payload for creating a product
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub stock: i32,
    /// 管理员可代卖家建品；卖家创建时忽略并用自己的 ID
    pub seller: Option<String>,
    pub image: Option<String>,
}
