//! Order Status Service
//!
//! 状态机转移 + 取消时的库存归还。
//!
//! 转移合法性由 [`OrderStatus::can_transition_to`] 定义；这里补上
//! 授权 (管理员或订单卖家) 和取消时的补偿动作。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::CurrentUser;
use crate::db::models::{Order, OrderStatus, StatusEntry};
use crate::db::repository::{OrderRepository, ProductRepository, UrgentSaleRepository};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, time};

/// 状态变更权限：管理员，或订单归属的卖家
pub fn can_transition_order(caller: &CurrentUser, order: &Order) -> bool {
    if caller.is_admin() {
        return true;
    }
    caller.is_seller() && order.seller.as_deref() == Some(caller.id.as_str())
}

#[derive(Clone)]
pub struct OrderStatusService {
    orders: OrderRepository,
    products: ProductRepository,
    urgent_sales: UrgentSaleRepository,
}

impl OrderStatusService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            urgent_sales: UrgentSaleRepository::new(db),
        }
    }

    /// 执行一次状态转移
    ///
    /// 检查顺序：存在性 → 授权 → 状态机合法性。取消成功后归还
    /// 各行库存 (尽力而为，失败只记日志)。
    pub async fn update_status(
        &self,
        caller: &CurrentUser,
        order_id: &str,
        target: OrderStatus,
        note: Option<String>,
    ) -> AppResult<Order> {
        validate_optional_text(&note, "note", MAX_NOTE_LEN)?;

        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        if !can_transition_order(caller, &order) {
            return Err(AppError::forbidden(
                "Only an admin or the order's seller can change its status",
            ));
        }

        if !order.status.can_transition_to(target) {
            return Err(AppError::business_rule(format!(
                "Cannot transition order from {} to {}",
                order.status, target
            )));
        }

        let entry = StatusEntry {
            status: target,
            timestamp: time::now_rfc3339(),
            note,
        };
        let updated = self.orders.apply_transition(order_id, target, entry).await?;

        tracing::info!(
            order_number = %updated.order_number,
            from = %order.status,
            to = %target,
            by = %caller.id,
            "Order status changed"
        );

        if target == OrderStatus::Cancelled {
            self.restore_stock(&updated).await;
        }

        Ok(updated)
    }

    /// 取消后归还每行库存。降级行 (无目录引用) 跳过；
    /// 单行失败不阻断其余行。
    async fn restore_stock(&self, order: &Order) {
        for item in &order.items {
            let Some(rid) = &item.product else {
                continue;
            };
            let id = rid.to_string();
            let result = if item.is_urgent {
                self.urgent_sales
                    .release_quantity(&id, item.quantity)
                    .await
                    .map(|_| ())
            } else {
                self.products
                    .release_stock(&id, item.quantity)
                    .await
                    .map(|_| ())
            };
            if let Err(e) = result {
                tracing::error!(
                    order_number = %order.order_number,
                    item = %item.name,
                    error = %e,
                    "Failed to restore stock after cancellation"
                );
            }
        }
    }
}
