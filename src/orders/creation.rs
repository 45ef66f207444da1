//! Order Creation Service
//!
//! 渠道参数化的统一创建入口。
//!
//! 关键行为：
//! - 行项目先查常规商品，再查急售条目 (单价取折后价)，都查不到则
//!   降级为仅客户端提供的名称/价格 (告警但不中断)
//! - 库存预留是数据库侧的条件原子扣减；余量不足直接拒单，并回滚
//!   同一请求里已预留的行 (补偿动作，替代多文档事务)
//! - 金额一律服务端重算；客户端传入总额只做容差核对，超差拒单
//! - 购物车清空是尽力而为，失败只记日志

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::CurrentUser;
use crate::db::models::{
    Order, OrderItem, OrderStatus, PaymentMethod, ShippingAddress, SourceChannel, StatusEntry,
};
use crate::db::repository::{
    CartRepository, OrderRepository, ProductRepository, UrgentSaleRepository,
};
use crate::orders::number::OrderNumberGenerator;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_price, validate_quantity, validate_required_text,
};
use crate::utils::{AppError, AppResult, time};

/// 匿名买家哨兵值 (应急/离线渠道)
pub const ANONYMOUS_BUYER: &str = "anonymous";

/// One requested line
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OrderItemInput {
    /// 目录引用: "product:x"、"urgent_sale:y" 或裸 id
    pub product: Option<String>,
    /// 客户端提供的名称 (降级路径必需)
    pub name: Option<String>,
    pub quantity: i32,
    /// 客户端提供的单价 (降级路径必需；可解析时忽略)
    pub price: Option<f64>,
    pub image: Option<String>,
    /// 行级卖家提示
    pub seller: Option<String>,
}

/// Create-order payload (all channels share this shape)
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OrderCreateRequest {
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    pub payment_method: Option<PaymentMethod>,
    pub tax_price: Option<f64>,
    pub shipping_price: Option<f64>,
    /// 客户端预计算总额 —— 只用于容差核对，从不直接入库
    pub total_amount: Option<f64>,
    /// 订单级卖家提示
    pub seller: Option<String>,
    /// 买家 ID (仅匿名渠道生效；有令牌时以令牌为准)
    pub buyer: Option<String>,
    /// 离线导入保留原单号
    pub order_number: Option<String>,
    /// 离线导入来源标记
    pub imported_from: Option<String>,
    pub is_paid: Option<bool>,
}

/// 已预留的库存，失败时按记录回滚
struct Reservation {
    id: String,
    is_urgent: bool,
    quantity: i32,
}

#[derive(Clone)]
pub struct OrderCreationService {
    products: ProductRepository,
    urgent_sales: UrgentSaleRepository,
    orders: OrderRepository,
    carts: CartRepository,
    numbers: OrderNumberGenerator,
    /// 客户端总额容差 (元)
    total_tolerance: f64,
}

impl OrderCreationService {
    pub fn new(db: Surreal<Db>, total_tolerance: f64) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            urgent_sales: UrgentSaleRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            carts: CartRepository::new(db.clone()),
            numbers: OrderNumberGenerator::new(db),
            total_tolerance,
        }
    }

    /// Create an order on the given channel
    pub async fn create_order(
        &self,
        caller: Option<&CurrentUser>,
        request: OrderCreateRequest,
        channel: SourceChannel,
    ) -> AppResult<Order> {
        let buyer = self.resolve_buyer(caller, &request, channel)?;
        self.validate_request(&request, channel)?;

        // 逐行解析 + 预留库存；任何一行失败回滚已预留的行
        let mut reservations: Vec<Reservation> = Vec::new();
        let mut items: Vec<OrderItem> = Vec::new();
        let mut seller: Option<String> = request.seller.clone();

        for input in &request.items {
            match self.resolve_line(input, &mut seller, &mut reservations).await {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.rollback(&reservations).await;
                    return Err(e);
                }
            }
        }

        // 金额服务端重算；客户端总额只做容差核对
        let items_total = round2(items.iter().map(|i| i.line_total).sum());
        let tax_total = request.tax_price.unwrap_or(0.0);
        let shipping_total = request.shipping_price.unwrap_or(0.0);
        let total_amount = round2(items_total + tax_total + shipping_total);

        if let Some(claimed) = request.total_amount
            && (claimed - total_amount).abs() > self.total_tolerance
        {
            self.rollback(&reservations).await;
            return Err(AppError::validation(format!(
                "total_amount mismatch: client sent {claimed:.2}, server computed {total_amount:.2}"
            )));
        }

        let now = Utc::now();
        let order_number = match self.resolve_order_number(&request, channel, now).await {
            Ok(n) => n,
            Err(e) => {
                self.rollback(&reservations).await;
                return Err(e);
            }
        };

        let created_at = time::now_rfc3339();
        let order = Order {
            id: None,
            order_number,
            buyer: buyer.clone(),
            seller,
            items,
            shipping_address: request.shipping_address,
            payment_method: request.payment_method.unwrap_or(PaymentMethod::CashOnDelivery),
            items_total,
            tax_total,
            shipping_total,
            total_amount,
            is_paid: request.is_paid.unwrap_or(false),
            paid_at: None,
            status: OrderStatus::Pending,
            status_history: vec![StatusEntry {
                status: OrderStatus::Pending,
                timestamp: created_at.clone(),
                note: Some("Order created".to_string()),
            }],
            channel,
            imported_from: request.imported_from,
            created_at,
            delivered_at: None,
            cancelled_at: None,
        };

        let created = match self.orders.create(order).await {
            Ok(o) => o,
            Err(e) => {
                self.rollback(&reservations).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            order_number = %created.order_number,
            buyer = %created.buyer,
            channel = ?channel,
            total = created.total_amount,
            "Order created"
        );

        // 尽力清空购物车；失败不影响订单
        if buyer != ANONYMOUS_BUYER
            && let Err(e) = self.carts.clear_for_user(buyer.clone()).await
        {
            tracing::warn!(buyer = %buyer, error = %e, "Failed to clear cart after order");
        }

        Ok(created)
    }

    /// 买家身份：令牌优先，匿名渠道允许哨兵值
    fn resolve_buyer(
        &self,
        caller: Option<&CurrentUser>,
        request: &OrderCreateRequest,
        channel: SourceChannel,
    ) -> AppResult<String> {
        if let Some(user) = caller {
            return Ok(user.id.clone());
        }
        if channel.allows_anonymous() {
            return Ok(request
                .buyer
                .clone()
                .unwrap_or_else(|| ANONYMOUS_BUYER.to_string()));
        }
        Err(AppError::unauthorized())
    }

    fn validate_request(
        &self,
        request: &OrderCreateRequest,
        channel: SourceChannel,
    ) -> AppResult<()> {
        if request.items.is_empty() {
            return Err(AppError::validation("items must not be empty"));
        }

        if channel.requires_shipping_address() {
            let addr = &request.shipping_address;
            validate_required_text(&addr.address, "shipping_address.address", MAX_ADDRESS_LEN)?;
            validate_required_text(&addr.city, "shipping_address.city", MAX_SHORT_TEXT_LEN)?;
            validate_required_text(
                &addr.postal_code,
                "shipping_address.postal_code",
                MAX_SHORT_TEXT_LEN,
            )?;
            if request.payment_method.is_none() {
                return Err(AppError::validation("payment_method is required"));
            }
        }

        if let Some(tax) = request.tax_price {
            validate_price(tax, "tax_price")?;
        }
        if let Some(shipping) = request.shipping_price {
            validate_price(shipping, "shipping_price")?;
        }
        validate_optional_text(&request.imported_from, "imported_from", MAX_NOTE_LEN)?;

        for input in &request.items {
            validate_quantity(input.quantity, "item quantity")?;
            validate_optional_text(&input.name, "item name", MAX_NAME_LEN)?;
            if let Some(price) = input.price {
                validate_price(price, "item price")?;
            }
        }

        Ok(())
    }

    /// 解析一行：商品 → 急售 → 降级，并预留库存
    async fn resolve_line(
        &self,
        input: &OrderItemInput,
        seller: &mut Option<String>,
        reservations: &mut Vec<Reservation>,
    ) -> AppResult<OrderItem> {
        if let Some(reference) = input.product.as_deref() {
            // 带 "urgent_sale:" 前缀的引用直接走急售表
            if !reference.starts_with("urgent_sale:") {
                match self.products.find_by_id(reference).await {
                    Ok(Some(product)) => {
                        return self
                            .reserve_product_line(input, product, seller, reservations)
                            .await;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(reference, error = %e, "Product lookup failed, degrading line");
                    }
                }
            }

            match self.urgent_sales.find_by_id(reference).await {
                Ok(Some(item)) => {
                    return self
                        .reserve_urgent_line(input, item, seller, reservations)
                        .await;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(reference, error = %e, "Urgent-sale lookup failed, degrading line");
                }
            }
        }

        self.degraded_line(input, seller)
    }

    async fn reserve_product_line(
        &self,
        input: &OrderItemInput,
        product: crate::db::models::Product,
        seller: &mut Option<String>,
        reservations: &mut Vec<Reservation>,
    ) -> AppResult<OrderItem> {
        let id = product
            .id
            .as_ref()
            .map(|r| r.to_string())
            .ok_or_else(|| AppError::internal("resolved product has no id"))?;

        let reserved = self.products.reserve_stock(&id, input.quantity).await?;
        if reserved.is_none() {
            return Err(AppError::validation(format!(
                "Insufficient stock for {} (requested {})",
                product.name, input.quantity
            )));
        }
        reservations.push(Reservation {
            id: id.clone(),
            is_urgent: false,
            quantity: input.quantity,
        });

        note_seller(seller, Some(product.seller.clone()), input.seller.clone());

        Ok(OrderItem {
            product: product.id.clone(),
            is_urgent: false,
            name: product.name,
            quantity: input.quantity,
            unit_price: product.price,
            line_total: round2(product.price * input.quantity as f64),
            image: product.image.or_else(|| input.image.clone()),
        })
    }

    async fn reserve_urgent_line(
        &self,
        input: &OrderItemInput,
        item: crate::db::models::UrgentSaleItem,
        seller: &mut Option<String>,
        reservations: &mut Vec<Reservation>,
    ) -> AppResult<OrderItem> {
        let id = item
            .id
            .as_ref()
            .map(|r| r.to_string())
            .ok_or_else(|| AppError::internal("resolved urgent sale has no id"))?;

        let now = time::now_rfc3339();
        if !item.is_sellable(&now) {
            return Err(AppError::business_rule(format!(
                "Urgent sale {} is no longer available",
                item.name
            )));
        }

        let reserved = self.urgent_sales.reserve_quantity(&id, input.quantity).await?;
        if reserved.is_none() {
            return Err(AppError::validation(format!(
                "Insufficient quantity for {} (requested {})",
                item.name, input.quantity
            )));
        }
        reservations.push(Reservation {
            id: id.clone(),
            is_urgent: true,
            quantity: input.quantity,
        });

        note_seller(seller, Some(item.seller.clone()), input.seller.clone());

        // 急售条目按折后价成交
        Ok(OrderItem {
            product: item.id.clone(),
            is_urgent: true,
            name: item.name,
            quantity: input.quantity,
            unit_price: item.discounted_price,
            line_total: round2(item.discounted_price * input.quantity as f64),
            image: input.image.clone(),
        })
    }

    /// 降级行：目录查不到，只用客户端提供的数据
    fn degraded_line(
        &self,
        input: &OrderItemInput,
        seller: &mut Option<String>,
    ) -> AppResult<OrderItem> {
        let name = input
            .name
            .clone()
            .ok_or_else(|| AppError::validation("unresolvable item is missing a name"))?;
        let price = input
            .price
            .ok_or_else(|| AppError::validation("unresolvable item is missing a price"))?;

        tracing::warn!(
            item = %name,
            reference = input.product.as_deref().unwrap_or("-"),
            "Line item did not resolve against any catalog, using client-supplied data"
        );

        note_seller(seller, None, input.seller.clone());

        Ok(OrderItem {
            product: None,
            is_urgent: false,
            name,
            quantity: input.quantity,
            unit_price: price,
            line_total: round2(price * input.quantity as f64),
            image: input.image.clone(),
        })
    }

    async fn resolve_order_number(
        &self,
        request: &OrderCreateRequest,
        channel: SourceChannel,
        now: chrono::DateTime<Utc>,
    ) -> AppResult<String> {
        // 离线导入保留原始单号 (若与已有订单冲突则拒绝)
        if channel == SourceChannel::OfflineImport
            && let Some(number) = request.order_number.clone()
        {
            validate_required_text(&number, "order_number", MAX_SHORT_TEXT_LEN)?;
            if self.orders.find_by_number(&number).await?.is_some() {
                return Err(AppError::conflict(format!("Order number {}", number)));
            }
            return Ok(number);
        }

        Ok(self.numbers.next(channel, now).await?)
    }

    /// 回滚本请求已预留的库存 (尽力而为)
    async fn rollback(&self, reservations: &[Reservation]) {
        for r in reservations {
            let result = if r.is_urgent {
                self.urgent_sales
                    .release_quantity(&r.id, r.quantity)
                    .await
                    .map(|_| ())
            } else {
                self.products
                    .release_stock(&r.id, r.quantity)
                    .await
                    .map(|_| ())
            };
            if let Err(e) = result {
                tracing::error!(id = %r.id, quantity = r.quantity, error = %e,
                    "Failed to roll back stock reservation");
            }
        }
    }
}

/// 订单卖家归属：第一个可解析的卖家生效，不一致只告警
fn note_seller(seller: &mut Option<String>, resolved: Option<String>, hint: Option<String>) {
    let Some(candidate) = hint.or(resolved) else {
        return;
    };
    match seller {
        None => *seller = Some(candidate),
        Some(current) if *current != candidate => {
            tracing::warn!(current = %current, other = %candidate,
                "Order spans multiple sellers, keeping the first");
        }
        _ => {}
    }
}

/// 金额保留两位小数
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.0 * 3.0), 6.0);
        assert_eq!(round2(0.1 + 0.2), 0.3);
    }

    #[test]
    fn test_note_seller_keeps_first() {
        let mut seller = None;
        note_seller(&mut seller, Some("s1".into()), None);
        assert_eq!(seller.as_deref(), Some("s1"));

        // 后续不一致的卖家不覆盖
        note_seller(&mut seller, Some("s2".into()), None);
        assert_eq!(seller.as_deref(), Some("s1"));
    }

    #[test]
    fn test_note_seller_prefers_hint_over_resolved() {
        let mut seller = None;
        note_seller(&mut seller, Some("resolved".into()), Some("hint".into()));
        assert_eq!(seller.as_deref(), Some("hint"));
    }
}
