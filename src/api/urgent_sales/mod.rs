//! Urgent Sale API 模块
//!
//! 公开浏览走 /api/urgent-sales，卖家后台视角走 /api/seller/urgent-sales。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/urgent-sales", routes())
        .route("/api/seller/urgent-sales", get(handler::list_mine))
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/sell", post(handler::sell))
}
