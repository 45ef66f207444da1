//! Order Sequence Repository
//!
//! 每日一条计数记录，UPSERT 原子自增。替代原系统
//! "数当天订单数" 的竞态做法：并发请求各自拿到不同的序号。

use super::{BaseRepository, RepoError, RepoResult};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Debug, Deserialize)]
struct SequenceRow {
    value: i64,
}

#[derive(Clone)]
pub struct OrderSequenceRepository {
    base: BaseRepository,
}

impl OrderSequenceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 取下一个序号 (从 1 开始)，key 形如 "ORD-260826"
    pub async fn next(&self, key: &str) -> RepoResult<i64> {
        let key_owned = key.to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPSERT type::thing('order_sequence', $key) \
                 SET value = (value ?? 0) + 1 RETURN AFTER",
            )
            .bind(("key", key_owned))
            .await?;
        let rows: Vec<SequenceRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|r| r.value)
            .ok_or_else(|| RepoError::Database("Sequence upsert returned no row".to_string()))
    }
}
