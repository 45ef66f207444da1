//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品目录接口
//! - [`urgent_sales`] - 急售条目与售出流水接口
//! - [`orders`] - 订单接口 (创建、列表、详情、状态、统计)

pub mod health;
pub mod orders;
pub mod products;
pub mod urgent_sales;

use axum::Router;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// 组装全部 API 路由 (认证中间件在外层叠加)
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(products::router())
        .merge(urgent_sales::router())
        .merge(orders::router())
}
