//! 认证中间件
//!
//! 为 JWT 认证提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// 无需登录即可访问的路由
///
/// - 急售公开列表/详情 (GET)
/// - 商品公开列表/详情 (GET)
/// - 应急下单和离线导入 (买家可为 "anonymous" 哨兵值)
fn is_public_api_route(method: &http::Method, path: &str) -> bool {
    if method == http::Method::GET {
        let public_get = path == "/api/urgent-sales"
            || (path.starts_with("/api/urgent-sales/") && !path.ends_with("/sell"))
            || path == "/api/products"
            || path.starts_with("/api/products/");
        if public_get {
            return true;
        }
    }
    method == http::Method::POST
        && (path == "/api/orders/emergency" || path == "/api/orders/import-offline")
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展 (`req.extensions_mut().insert(user)`)。
///
/// # 跳过强制认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (健康检查等，让它们正常返回)
/// - [`is_public_api_route`] 列出的公开路由 — 有令牌时仍会解析并注入用户
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path().to_string();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let public = is_public_api_route(req.method(), &path);

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.to_string());

    let token = match auth_header.as_deref() {
        Some(header) => match JwtService::extract_from_header(header) {
            Some(token) => token,
            None if public => return Ok(next.run(req).await),
            None => return Err(AppError::invalid_token("Invalid authorization header")),
        },
        None if public => return Ok(next.run(req).await),
        None => {
            tracing::warn!(target: "security", uri = %req.uri(), "auth_missing");
            return Err(AppError::unauthorized());
        }
    };

    // 验证令牌 — 公开路由上带了无效令牌也一样拒绝，避免误以为已登录
    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(target: "security", error = %e, uri = %req.uri(), "auth_failed");
            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_route_table() {
        let get = http::Method::GET;
        let post = http::Method::POST;

        assert!(is_public_api_route(&get, "/api/urgent-sales"));
        assert!(is_public_api_route(&get, "/api/urgent-sales/urgent_sale:x"));
        assert!(is_public_api_route(&get, "/api/products"));
        assert!(is_public_api_route(&post, "/api/orders/emergency"));

        assert!(!is_public_api_route(&post, "/api/urgent-sales/urgent_sale:x/sell"));
        assert!(!is_public_api_route(&get, "/api/orders"));
        assert!(!is_public_api_route(&post, "/api/orders"));
        assert!(!is_public_api_route(&get, "/api/seller/urgent-sales"));
    }
}
