//! Sale Transaction Model (revenue ledger)
//!
//! 一经写入不可变更：营收报表的事实来源，与可变的目录价格字段解耦，
//! 之后改价不会追溯改写历史营收。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Immutable ledger entry, written only by "mark as sold"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleTransaction {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// 售出的急售条目
    #[serde(with = "serde_helpers::record_id")]
    pub item: RecordId,
    /// 条目名称快照 (条目后续改名不影响流水)
    pub item_name: String,
    pub quantity: i32,
    /// 成交单价 = 售出时刻的 discounted_price
    pub unit_price: f64,
    /// 行金额 = quantity × unit_price，写入时固定
    pub amount: f64,
    pub seller: String,
    pub sold_at: String,
}
