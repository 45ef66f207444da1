//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, record_id, strip_table_prefix};
use crate::db::models::{Product, ProductCreate};
use crate::utils::time;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active products
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE is_active = true ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let product: Option<Product> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(product)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate, seller: String) -> RepoResult<Product> {
        if data.stock < 0 {
            return Err(RepoError::Validation("stock must not be negative".into()));
        }

        let product = Product {
            id: None,
            name: data.name,
            price: data.price,
            stock: data.stock,
            seller,
            image: data.image,
            is_active: true,
            created_at: time::now_rfc3339(),
        };

        let created: Option<Product> = self.base.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// 原子预留库存：仅当余量足够时扣减
    ///
    /// 返回扣减后的记录；`None` 表示余量不足 (记录未变)
    pub async fn reserve_stock(&self, id: &str, quantity: i32) -> RepoResult<Option<Product>> {
        let rid = record_id(TABLE, id);
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET stock -= $qty WHERE stock >= $qty RETURN AFTER")
            .bind(("id", rid))
            .bind(("qty", quantity))
            .await?;
        let updated: Vec<Product> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// 归还库存 (取消订单 / 预留回滚)
    pub async fn release_stock(&self, id: &str, quantity: i32) -> RepoResult<Option<Product>> {
        let rid = record_id(TABLE, id);
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET stock += $qty RETURN AFTER")
            .bind(("id", rid))
            .bind(("qty", quantity))
            .await?;
        let updated: Vec<Product> = result.take(0)?;
        Ok(updated.into_iter().next())
    }
}
