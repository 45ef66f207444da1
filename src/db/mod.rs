//! Database Module
//!
//! Owns the embedded SurrealDB instance and schema definition

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        let service = Self::prepare(db).await?;
        tracing::info!(path = %db_path, "Database connection established (SurrealDB/RocksDB)");
        Ok(service)
    }

    /// In-memory database for tests
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns("market")
            .use_db("market")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        // Schema: 订单号唯一索引 + 常用查询字段索引
        db.query(
            r#"
            DEFINE INDEX IF NOT EXISTS idx_order_number ON TABLE order FIELDS order_number UNIQUE;
            DEFINE INDEX IF NOT EXISTS idx_order_buyer ON TABLE order FIELDS buyer;
            DEFINE INDEX IF NOT EXISTS idx_order_seller ON TABLE order FIELDS seller;
            DEFINE INDEX IF NOT EXISTS idx_sale_tx_seller ON TABLE sale_transaction FIELDS seller;
            DEFINE INDEX IF NOT EXISTS idx_cart_user ON TABLE cart FIELDS user;
            "#,
        )
        .await
        .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

        Ok(Self { db })
    }
}
