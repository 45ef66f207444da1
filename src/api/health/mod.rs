//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 健康检查 (含数据库连通性) | 无 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::time;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | degraded)
    status: &'static str,
    version: &'static str,
    database: &'static str,
    timestamp: String,
}

/// GET /health
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    // 一次最小查询探测数据库可用性
    let database = match state.get_db().query("RETURN 1").await {
        Ok(_) => "up",
        Err(e) => {
            tracing::error!(error = %e, "Health check database probe failed");
            "down"
        }
    };

    Json(HealthResponse {
        status: if database == "up" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        timestamp: time::now_rfc3339(),
    })
}
