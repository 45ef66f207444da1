//! Urgent Sale API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{SaleTransaction, UrgentSaleCreate, UrgentSaleItem};
use crate::db::repository::{RevenueRow, UrgentSaleRepository};
use crate::sales::SaleTransactionService;
use crate::utils::error::{AppResponse, ok};
use crate::utils::validation::{MAX_NAME_LEN, validate_price, validate_required_text};
use crate::utils::{AppError, AppResult, time};

/// 公开列表响应：条目 + 流水聚合的营收块
#[derive(Serialize)]
pub struct UrgentSaleListResponse {
    pub items: Vec<UrgentSaleItem>,
    pub revenue: RevenueRow,
}

/// GET /api/urgent-sales - 公开列表 (active、未过期、有余量)
///
/// 营收块与卖家后台走同一条聚合路径：匿名/管理员看全局汇总，
/// 带令牌的卖家看本人汇总
pub async fn list(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
) -> AppResult<Json<AppResponse<UrgentSaleListResponse>>> {
    let repo = UrgentSaleRepository::new(state.get_db());
    let items = repo.find_all_active(time::now_rfc3339()).await?;

    let seller_filter = match &user {
        Some(u) if u.is_seller() => Some(u.id.clone()),
        _ => None,
    };
    let revenue = SaleTransactionService::new(state.get_db())
        .revenue_summary(seller_filter)
        .await?;

    Ok(ok(UrgentSaleListResponse { items, revenue }))
}

/// GET /api/urgent-sales/{id} - 详情 (浏览计数 +1)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<UrgentSaleItem>>> {
    let repo = UrgentSaleRepository::new(state.get_db());
    let item = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Urgent sale {}", id)))?;

    // 计数失败不影响详情返回
    if let Err(e) = repo.increment_views(&id).await {
        tracing::warn!(id = %id, error = %e, "Failed to increment view counter");
    }

    Ok(ok(item))
}

/// POST /api/urgent-sales - 创建条目 (卖家本人；管理员可代卖家)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UrgentSaleCreate>,
) -> AppResult<Json<AppResponse<UrgentSaleItem>>> {
    if !user.is_seller() && !user.is_admin() {
        return Err(AppError::forbidden("Only sellers can create urgent sales"));
    }

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_price(payload.price, "price")?;
    validate_price(payload.discounted_price, "discounted_price")?;
    if time::parse_rfc3339(&payload.expires_at).is_none() {
        return Err(AppError::validation(
            "expires_at must be an RFC 3339 timestamp",
        ));
    }

    let seller = if user.is_admin() {
        payload.seller.clone().unwrap_or_else(|| user.id.clone())
    } else {
        user.id.clone()
    };

    let repo = UrgentSaleRepository::new(state.get_db());
    let item = repo.create(payload, seller).await?;
    Ok(ok(item))
}

#[derive(Deserialize)]
pub struct SellRequest {
    pub quantity: i32,
}

/// POST /api/urgent-sales/{id}/sell - 标记售出并落流水
pub async fn sell(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<SellRequest>,
) -> AppResult<Json<AppResponse<SaleTransaction>>> {
    let service = SaleTransactionService::new(state.get_db());
    let tx = service.record_sale(&user, &id, payload.quantity).await?;
    Ok(ok(tx))
}

#[derive(Deserialize)]
pub struct SellerListQuery {
    /// 管理员可查看指定卖家
    pub seller: Option<String>,
}

/// 卖家视角响应：本人全部条目 + 流水明细 + 营收汇总
#[derive(Serialize)]
pub struct SellerDashboardResponse {
    pub items: Vec<UrgentSaleItem>,
    pub transactions: Vec<SaleTransaction>,
    pub revenue: RevenueRow,
}

/// GET /api/seller/urgent-sales - 卖家后台视角 (含 inactive/过期条目)
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<SellerListQuery>,
) -> AppResult<Json<AppResponse<SellerDashboardResponse>>> {
    if !user.is_seller() && !user.is_admin() {
        return Err(AppError::forbidden("Only sellers can view this listing"));
    }

    let seller = if user.is_admin() {
        query.seller.unwrap_or_else(|| user.id.clone())
    } else {
        user.id.clone()
    };

    let repo = UrgentSaleRepository::new(state.get_db());
    let service = SaleTransactionService::new(state.get_db());

    let items = repo.find_by_seller(seller.clone()).await?;
    let transactions = service.transactions_for_seller(seller.clone()).await?;
    let revenue = service.revenue_summary(Some(seller)).await?;

    Ok(ok(SellerDashboardResponse {
        items,
        transactions,
        revenue,
    }))
}
