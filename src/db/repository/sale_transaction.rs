//! Sale Transaction Repository
//!
//! 流水只插入、只聚合。没有 update/delete —— 账本不可变。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::SaleTransaction;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "sale_transaction";

/// Aggregated revenue row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueRow {
    pub total_revenue: f64,
    pub units_sold: i64,
    pub transaction_count: i64,
}

#[derive(Clone)]
pub struct SaleTransactionRepository {
    base: BaseRepository,
}

impl SaleTransactionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append a ledger row
    pub async fn create(&self, tx: SaleTransaction) -> RepoResult<SaleTransaction> {
        let created: Option<SaleTransaction> = self.base.db().create(TABLE).content(tx).await?;
        created.ok_or_else(|| RepoError::Database("Failed to record sale transaction".to_string()))
    }

    /// 营收汇总，可选按卖家过滤
    pub async fn revenue_summary(&self, seller: Option<String>) -> RepoResult<RevenueRow> {
        let mut result = match seller {
            Some(seller) => {
                self.base
                    .db()
                    .query(
                        "SELECT math::sum(amount) AS total_revenue, \
                         math::sum(quantity) AS units_sold, \
                         count() AS transaction_count \
                         FROM sale_transaction WHERE seller = $seller GROUP ALL",
                    )
                    .bind(("seller", seller))
                    .await?
            }
            None => {
                self.base
                    .db()
                    .query(
                        "SELECT math::sum(amount) AS total_revenue, \
                         math::sum(quantity) AS units_sold, \
                         count() AS transaction_count \
                         FROM sale_transaction GROUP ALL",
                    )
                    .await?
            }
        };

        let rows: Vec<RevenueRow> = result.take(0)?;
        Ok(rows.into_iter().next().unwrap_or(RevenueRow {
            total_revenue: 0.0,
            units_sold: 0,
            transaction_count: 0,
        }))
    }

    /// 卖家流水明细 (新→旧)
    pub async fn find_by_seller(&self, seller: String) -> RepoResult<Vec<SaleTransaction>> {
        let rows: Vec<SaleTransaction> = self
            .base
            .db()
            .query("SELECT * FROM sale_transaction WHERE seller = $seller ORDER BY sold_at DESC")
            .bind(("seller", seller))
            .await?
            .take(0)?;
        Ok(rows)
    }
}
