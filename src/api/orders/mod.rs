//! Order API 模块
//!
//! 五个历史创建入口收敛为同一处理逻辑，路径只决定渠道：
//!
//! | 路径 | 渠道 | 认证 |
//! |------|------|------|
//! | POST /api/orders | standard | 必须 |
//! | POST /api/orders/simple | simple | 必须 |
//! | POST /api/orders/basic | simple (兼容别名) | 必须 |
//! | POST /api/orders/emergency | emergency | 可匿名 |
//! | POST /api/orders/import-offline | offline_import | 可匿名 |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create_standard))
        .route("/simple", post(handler::create_simple))
        // 历史客户端仍调用 /basic，行为与 /simple 完全一致
        .route("/basic", post(handler::create_simple))
        .route("/emergency", post(handler::create_emergency))
        .route("/import-offline", post(handler::import_offline))
        // Static segment must be registered alongside /{id}
        .route("/stats", get(handler::stats))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
}
