//! Order Repository
//!
//! 状态变更只 MERGE 变化字段 + 追加历史，从不重写整个文档。

use super::{BaseRepository, RepoError, RepoResult, record_id, strip_table_prefix};
use crate::db::models::{Order, OrderStatus, StatusEntry};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "order";

/// 列表查询的角色范围
#[derive(Debug, Clone)]
pub enum OrderScope {
    /// 管理员：全部订单
    All,
    /// 卖家：本人作为卖家的订单
    Seller(String),
    /// 买家：本人作为买家的订单
    Buyer(String),
}

/// Aggregated stats row (excluding cancelled orders)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatsRow {
    pub order_count: i64,
    pub revenue: f64,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let order: Option<Order> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(order)
    }

    /// Find order by its human-readable number
    pub async fn find_by_number(&self, number: &str) -> RepoResult<Option<Order>> {
        let number_owned = number.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE order_number = $number LIMIT 1")
            .bind(("number", number_owned))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Role-scoped listing (paginated, newest first)
    pub async fn find_scoped(
        &self,
        scope: OrderScope,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Order>> {
        let mut query = self.base.db().query(match &scope {
            OrderScope::All => {
                "SELECT * FROM order ORDER BY created_at DESC LIMIT $limit START $offset"
            }
            OrderScope::Seller(_) => {
                "SELECT * FROM order WHERE seller = $user \
                 ORDER BY created_at DESC LIMIT $limit START $offset"
            }
            OrderScope::Buyer(_) => {
                "SELECT * FROM order WHERE buyer = $user \
                 ORDER BY created_at DESC LIMIT $limit START $offset"
            }
        });
        query = query.bind(("limit", limit)).bind(("offset", offset));
        if let OrderScope::Seller(user) | OrderScope::Buyer(user) = scope {
            query = query.bind(("user", user));
        }

        let orders: Vec<Order> = query.await?.take(0)?;
        Ok(orders)
    }

    /// 应用一次状态转移：变更 status、追加历史、按需写终态时间戳
    ///
    /// 只更新点名的字段；历史只追加，不重写
    pub async fn apply_transition(
        &self,
        id: &str,
        status: OrderStatus,
        entry: StatusEntry,
    ) -> RepoResult<Order> {
        let rid = record_id(TABLE, id);

        let statement = match status {
            OrderStatus::Delivered => {
                "UPDATE $id SET status = $status, status_history += $entry, \
                 delivered_at = $entry.timestamp RETURN AFTER"
            }
            OrderStatus::Cancelled => {
                "UPDATE $id SET status = $status, status_history += $entry, \
                 cancelled_at = $entry.timestamp RETURN AFTER"
            }
            _ => "UPDATE $id SET status = $status, status_history += $entry RETURN AFTER",
        };

        let mut result = self
            .base
            .db()
            .query(statement)
            .bind(("id", rid))
            .bind(("status", status))
            .bind(("entry", entry))
            .await?;
        let updated: Vec<Order> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// 卖家订单统计 (排除已取消)
    pub async fn stats_for_seller(&self, seller: String) -> RepoResult<OrderStatsRow> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT count() AS order_count, math::sum(total_amount) AS revenue \
                 FROM order WHERE seller = $seller AND status != 'cancelled' GROUP ALL",
            )
            .bind(("seller", seller))
            .await?;
        let rows: Vec<OrderStatsRow> = result.take(0)?;
        Ok(rows.into_iter().next().unwrap_or(OrderStatsRow {
            order_count: 0,
            revenue: 0.0,
        }))
    }
}
