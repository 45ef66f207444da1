//! Role Definitions
//!
//! 市场角色模型：买家下单，卖家管理自己的商品和订单，管理员全量。
//! 角色写在 JWT 的 `role` claim 里，由外部身份服务分配。

/// 管理员：所有订单、所有资源
pub const ROLE_ADMIN: &str = "admin";

/// 卖家：自己的商品/急售/订单
pub const ROLE_SELLER: &str = "seller";

/// 买家：自己的订单、购物车
pub const ROLE_BUYER: &str = "buyer";

/// All roles the identity service may issue
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_SELLER, ROLE_BUYER];

/// Validate a role string coming out of a token
pub fn is_valid_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}
