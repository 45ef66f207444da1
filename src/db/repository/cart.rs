//! Cart Repository (collaborator)
//!
//! 下单流程只需要按用户查找和清空。

use super::{BaseRepository, RepoResult};
use crate::db::models::Cart;
use crate::utils::time;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find the cart of a user
    pub async fn find_by_user(&self, user: String) -> RepoResult<Option<Cart>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart WHERE user = $user LIMIT 1")
            .bind(("user", user))
            .await?;
        let carts: Vec<Cart> = result.take(0)?;
        Ok(carts.into_iter().next())
    }

    /// 清空用户购物车 (下单成功后调用，调用方负责吞掉失败)
    pub async fn clear_for_user(&self, user: String) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE cart SET items = [], updated_at = $now WHERE user = $user")
            .bind(("user", user))
            .bind(("now", time::now_rfc3339()))
            .await?;
        Ok(())
    }
}
