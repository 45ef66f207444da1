//! Product API Handlers
//!
//! 目录只保留订单流程依赖的最小操作：公开读取 + 卖家建品。

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate};
use crate::db::repository::ProductRepository;
use crate::utils::error::{AppResponse, ok};
use crate::utils::validation::{MAX_NAME_LEN, validate_price, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/products - 公开商品列表 (仅 active)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Product>>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_all().await?;
    Ok(ok(products))
}

/// GET /api/products/{id} - 商品详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(ok(product))
}

/// POST /api/products - 创建商品 (卖家本人；管理员可代卖家)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<AppResponse<Product>>> {
    if !user.is_seller() && !user.is_admin() {
        return Err(AppError::forbidden("Only sellers can create products"));
    }

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_price(payload.price, "price")?;

    // 管理员可指定卖家，卖家只能用自己的 ID
    let seller = if user.is_admin() {
        payload.seller.clone().unwrap_or_else(|| user.id.clone())
    } else {
        user.id.clone()
    };

    let repo = ProductRepository::new(state.get_db());
    let product = repo.create(payload, seller).await?;
    Ok(ok(product))
}
