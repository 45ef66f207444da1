//! Sale Transaction Service (urgent-sale ledger)
//!
//! "标记售出" 是唯一写入流水的路径：先原子扣减急售余量，成功后
//! 落一条不可变流水。扣减失败即拒绝，无任何副作用；流水写入失败
//! 则归还刚扣减的数量 (补偿动作)。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::CurrentUser;
use crate::db::models::SaleTransaction;
use crate::db::repository::{RevenueRow, SaleTransactionRepository, UrgentSaleRepository};
use crate::utils::validation::validate_quantity;
use crate::utils::{AppError, AppResult, time};

#[derive(Clone)]
pub struct SaleTransactionService {
    urgent_sales: UrgentSaleRepository,
    transactions: SaleTransactionRepository,
}

impl SaleTransactionService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            urgent_sales: UrgentSaleRepository::new(db.clone()),
            transactions: SaleTransactionRepository::new(db),
        }
    }

    /// 记录一次线下售出
    ///
    /// 检查顺序：数量合法 → 条目存在 → 授权 (管理员或条目卖家)
    /// → 可售状态 → 原子扣减 → 写流水
    pub async fn record_sale(
        &self,
        caller: &CurrentUser,
        item_id: &str,
        quantity: i32,
    ) -> AppResult<SaleTransaction> {
        validate_quantity(quantity, "quantity")?;

        let item = self
            .urgent_sales
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Urgent sale {}", item_id)))?;

        if !caller.is_admin() && item.seller != caller.id {
            return Err(AppError::forbidden(
                "Only an admin or the listing's seller can record a sale",
            ));
        }

        let now = time::now_rfc3339();
        if !item.is_sellable(&now) {
            return Err(AppError::business_rule(format!(
                "Urgent sale {} is inactive or expired",
                item.name
            )));
        }
        if quantity > item.quantity {
            return Err(AppError::business_rule(format!(
                "Cannot sell {} units of {}, only {} remaining",
                quantity, item.name, item.quantity
            )));
        }

        // 原子扣减；条件不满足 (并发下余量被抢) 返回 None
        let reserved = self.urgent_sales.reserve_quantity(item_id, quantity).await?;
        if reserved.is_none() {
            return Err(AppError::business_rule(format!(
                "Cannot sell {} units of {}, only {} remaining",
                quantity, item.name, item.quantity
            )));
        }

        let item_rid = item
            .id
            .clone()
            .ok_or_else(|| AppError::internal("urgent sale record has no id"))?;

        let tx = SaleTransaction {
            id: None,
            item: item_rid,
            item_name: item.name.clone(),
            quantity,
            unit_price: item.discounted_price,
            amount: (item.discounted_price * quantity as f64 * 100.0).round() / 100.0,
            seller: item.seller.clone(),
            sold_at: now,
        };

        let created = match self.transactions.create(tx).await {
            Ok(t) => t,
            Err(e) => {
                // 流水没落下来，把数量还回去
                if let Err(release_err) =
                    self.urgent_sales.release_quantity(item_id, quantity).await
                {
                    tracing::error!(item = %item_id, quantity, error = %release_err,
                        "Failed to release quantity after ledger write failure");
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            item = %created.item_name,
            quantity = created.quantity,
            amount = created.amount,
            seller = %created.seller,
            "Sale recorded"
        );

        Ok(created)
    }

    /// 营收汇总 (流水聚合，与订单营收独立)
    pub async fn revenue_summary(&self, seller: Option<String>) -> AppResult<RevenueRow> {
        Ok(self.transactions.revenue_summary(seller).await?)
    }

    /// 卖家流水明细
    pub async fn transactions_for_seller(
        &self,
        seller: String,
    ) -> AppResult<Vec<SaleTransaction>> {
        Ok(self.transactions.find_by_seller(seller).await?)
    }
}
