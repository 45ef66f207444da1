//! Urgent Sale Repository

use super::{BaseRepository, RepoError, RepoResult, record_id, strip_table_prefix};
use crate::db::models::{UrgentSaleCreate, UrgentSaleItem, UrgentSaleStatus};
use crate::utils::time;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "urgent_sale";

#[derive(Clone)]
pub struct UrgentSaleRepository {
    base: BaseRepository,
}

impl UrgentSaleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 公开列表：active 且未过期、有余量的条目
    pub async fn find_all_active(&self, now: String) -> RepoResult<Vec<UrgentSaleItem>> {
        let items: Vec<UrgentSaleItem> = self
            .base
            .db()
            .query(
                "SELECT * FROM urgent_sale \
                 WHERE status = 'active' AND expires_at > $now AND quantity > 0 \
                 ORDER BY expires_at",
            )
            .bind(("now", now))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// 卖家视角：本人全部条目 (含 inactive/过期)
    pub async fn find_by_seller(&self, seller: String) -> RepoResult<Vec<UrgentSaleItem>> {
        let items: Vec<UrgentSaleItem> = self
            .base
            .db()
            .query("SELECT * FROM urgent_sale WHERE seller = $seller ORDER BY created_at DESC")
            .bind(("seller", seller))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Find item by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<UrgentSaleItem>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let item: Option<UrgentSaleItem> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(item)
    }

    /// Create a new urgent sale listing
    ///
    /// 折后价 < 原价仅在创建时强制 (与原系统一致)
    pub async fn create(&self, data: UrgentSaleCreate, seller: String) -> RepoResult<UrgentSaleItem> {
        if data.discounted_price >= data.price {
            return Err(RepoError::Validation(
                "discounted_price must be lower than price".into(),
            ));
        }
        if data.quantity < 0 {
            return Err(RepoError::Validation("quantity must not be negative".into()));
        }

        let item = UrgentSaleItem {
            id: None,
            name: data.name,
            price: data.price,
            discounted_price: data.discounted_price,
            quantity: data.quantity,
            expires_at: data.expires_at,
            status: UrgentSaleStatus::Active,
            seller,
            views: 0,
            created_at: time::now_rfc3339(),
        };

        let created: Option<UrgentSaleItem> = self.base.db().create(TABLE).content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create urgent sale".to_string()))
    }

    /// 浏览计数 +1 (详情页)
    pub async fn increment_views(&self, id: &str) -> RepoResult<()> {
        let rid = record_id(TABLE, id);
        self.base
            .db()
            .query("UPDATE $id SET views += 1")
            .bind(("id", rid))
            .await?;
        Ok(())
    }

    /// 原子预留数量：仅当余量足够时扣减；归零时同时置 inactive
    ///
    /// 返回扣减后的记录；`None` 表示余量不足 (记录未变)
    pub async fn reserve_quantity(
        &self,
        id: &str,
        quantity: i32,
    ) -> RepoResult<Option<UrgentSaleItem>> {
        let rid = record_id(TABLE, id);
        let mut result = self
            .base
            .db()
            .query(
                // SET 子句按序生效，status 判断看到的是扣减后的 quantity
                "UPDATE $id SET quantity -= $qty, \
                 status = IF quantity <= 0 THEN 'inactive' ELSE status END \
                 WHERE quantity >= $qty RETURN AFTER",
            )
            .bind(("id", rid))
            .bind(("qty", quantity))
            .await?;
        let updated: Vec<UrgentSaleItem> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// 归还数量 (取消订单 / 预留回滚)；有余量则重新置 active
    pub async fn release_quantity(
        &self,
        id: &str,
        quantity: i32,
    ) -> RepoResult<Option<UrgentSaleItem>> {
        let rid = record_id(TABLE, id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET quantity += $qty, \
                 status = IF quantity > 0 THEN 'active' ELSE status END \
                 RETURN AFTER",
            )
            .bind(("id", rid))
            .bind(("qty", quantity))
            .await?;
        let updated: Vec<UrgentSaleItem> = result.take(0)?;
        Ok(updated.into_iter().next())
    }
}
