//! Cart Model (collaborator)
//!
//! 订单流程只用到按用户查找和清空；购物车的增删改属前台购物流程。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// One cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product: String,
    pub quantity: i32,
}

/// Shopping cart entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// 所属用户 ID
    pub user: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub updated_at: String,
}
