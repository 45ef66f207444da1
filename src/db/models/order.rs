//! Order Model
//!
//! 订单嵌入行项目、收货地址、状态和只追加的状态历史。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

// =============================================================================
// Status state machine
// =============================================================================

/// Order status enum
///
/// 转移图：
///
/// | From       | Allowed To            |
/// |------------|-----------------------|
/// | pending    | processing, cancelled |
/// | processing | shipped, cancelled    |
/// | shipped    | delivered, cancelled  |
/// | delivered  | (terminal)            |
/// | cancelled  | (terminal)            |
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Allowed transition targets for this status
    pub fn allowed_targets(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Processing, OrderStatus::Cancelled],
            OrderStatus::Processing => &[OrderStatus::Shipped, OrderStatus::Cancelled],
            OrderStatus::Shipped => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    /// Whether `target` is a legal next status
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Terminal statuses accept no further transitions
    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CashOnDelivery,
    Card,
    Online,
}

/// 订单来源渠道
///
/// 原系统五个几乎相同的创建入口合并为一个服务，由渠道参数区分
/// 校验严格程度 (basic 入口是 simple 的别名)。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceChannel {
    Standard,
    Simple,
    Emergency,
    OfflineImport,
}

impl SourceChannel {
    /// 是否允许 "anonymous" 买家哨兵值
    pub fn allows_anonymous(&self) -> bool {
        matches!(self, SourceChannel::Emergency | SourceChannel::OfflineImport)
    }

    /// 是否要求完整收货地址
    pub fn requires_shipping_address(&self) -> bool {
        matches!(self, SourceChannel::Standard)
    }
}

// =============================================================================
// Embedded documents
// =============================================================================

/// One line of an order: product, quantity, and price at time of purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// 解析到的目录条目 ("product:x" 或 "urgent_sale:x")；降级行为 None
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub product: Option<RecordId>,
    /// 行项目解析自急售条目
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_urgent: bool,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
    pub image: Option<String>,
}

/// Shipping address embedded in the order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    pub phone: Option<String>,
}

/// One entry of the append-only status history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub timestamp: String,
    pub note: Option<String>,
}

// =============================================================================
// Order (主表)
// =============================================================================

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// 人类可读订单号，唯一 (ORD-YYMMDD-NNNN / EMG-YYMMDD-NNNN)
    pub order_number: String,
    /// 买家用户 ID，或哨兵值 "anonymous"
    pub buyer: String,
    /// 卖家用户 ID (尽力解析，可为空)
    pub seller: Option<String>,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_total: f64,
    pub tax_total: f64,
    pub shipping_total: f64,
    pub total_amount: f64,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_paid: bool,
    pub paid_at: Option<String>,
    pub status: OrderStatus,
    /// 只追加，永不重写
    pub status_history: Vec<StatusEntry>,
    pub channel: SourceChannel,
    /// 离线导入来源标记 (设备/批次)
    pub imported_from: Option<String>,
    pub created_at: String,
    pub delivered_at: Option<String>,
    pub cancelled_at: Option<String>,
}
