//! Order API Handlers
//!
//! 所有创建入口共用 [`OrderCreationService`]，处理器只负责
//! 绑定渠道和提取调用者身份。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderStatus, SourceChannel};
use crate::db::repository::{OrderRepository, OrderScope, OrderStatsRow};
use crate::orders::{OrderCreateRequest, OrderCreationService, OrderStatusService};
use crate::utils::error::{AppResponse, ok};
use crate::utils::{AppError, AppResult};

fn creation_service(state: &ServerState) -> OrderCreationService {
    OrderCreationService::new(state.get_db(), state.config.total_tolerance())
}

/// 新建资源返回 201 + 统一封套
type CreatedOrder = (StatusCode, Json<AppResponse<Order>>);

/// POST /api/orders - 标准下单 (完整收货地址 + 支付方式)
pub async fn create_standard(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreateRequest>,
) -> AppResult<CreatedOrder> {
    let order = creation_service(&state)
        .create_order(Some(&user), payload, SourceChannel::Standard)
        .await?;
    Ok((StatusCode::CREATED, ok(order)))
}

/// POST /api/orders/simple - 简化下单 (地址/支付方式可省略)
pub async fn create_simple(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreateRequest>,
) -> AppResult<CreatedOrder> {
    let order = creation_service(&state)
        .create_order(Some(&user), payload, SourceChannel::Simple)
        .await?;
    Ok((StatusCode::CREATED, ok(order)))
}

/// POST /api/orders/emergency - 应急下单 (可匿名，EMG 单号)
pub async fn create_emergency(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    Json(payload): Json<OrderCreateRequest>,
) -> AppResult<CreatedOrder> {
    let order = creation_service(&state)
        .create_order(user.as_ref(), payload, SourceChannel::Emergency)
        .await?;
    Ok((StatusCode::CREATED, ok(order)))
}

/// POST /api/orders/import-offline - 离线订单导入 (保留原单号)
pub async fn import_offline(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    Json(payload): Json<OrderCreateRequest>,
) -> AppResult<CreatedOrder> {
    let order = creation_service(&state)
        .create_order(user.as_ref(), payload, SourceChannel::OfflineImport)
        .await?;
    Ok((StatusCode::CREATED, ok(order)))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// GET /api/orders - 角色范围列表 (买家: 本人订单；卖家: 本人售出；管理员: 全部)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let scope = if user.is_admin() {
        OrderScope::All
    } else if user.is_seller() {
        OrderScope::Seller(user.id.clone())
    } else {
        OrderScope::Buyer(user.id.clone())
    };

    let repo = OrderRepository::new(state.get_db());
    let orders = repo.find_scoped(scope, limit, offset).await?;
    Ok(ok(orders))
}

/// GET /api/orders/{id} - 订单详情 (仅订单双方或管理员)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;

    let involved = order.buyer == user.id || order.seller.as_deref() == Some(user.id.as_str());
    if !user.is_admin() && !involved {
        return Err(AppError::forbidden("Not a participant of this order"));
    }

    Ok(ok(order))
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    pub note: Option<String>,
}

/// PATCH /api/orders/{id}/status - 状态机转移 (管理员或订单卖家)
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let service = OrderStatusService::new(state.get_db());
    let order = service
        .update_status(&user, &id, payload.status, payload.note)
        .await?;
    Ok(ok(order))
}

#[derive(Deserialize)]
pub struct StatsQuery {
    /// 管理员可指定卖家
    pub seller: Option<String>,
}

#[derive(Serialize)]
pub struct OrderStatsResponse {
    pub order_count: i64,
    pub revenue: f64,
    pub avg_order_value: f64,
}

impl From<OrderStatsRow> for OrderStatsResponse {
    fn from(row: OrderStatsRow) -> Self {
        let avg_order_value = if row.order_count > 0 {
            row.revenue / row.order_count as f64
        } else {
            0.0
        };
        Self {
            order_count: row.order_count,
            revenue: row.revenue,
            avg_order_value,
        }
    }
}

/// GET /api/orders/stats - 卖家订单统计 (排除已取消)
pub async fn stats(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<AppResponse<OrderStatsResponse>>> {
    if !user.is_seller() && !user.is_admin() {
        return Err(AppError::forbidden("Only sellers can view order stats"));
    }

    let seller = if user.is_admin() {
        query.seller.unwrap_or_else(|| user.id.clone())
    } else {
        user.id.clone()
    };

    let repo = OrderRepository::new(state.get_db());
    let row = repo.stats_for_seller(seller).await?;
    Ok(ok(OrderStatsResponse::from(row)))
}
