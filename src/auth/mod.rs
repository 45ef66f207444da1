//! 认证授权模块
//!
//! 令牌由外部身份服务签发；本服务只验证并提取调用者身份：
//! - [`JwtService`] - JWT 令牌验证 (测试代码用它签发令牌)
//! - [`CurrentUser`] - 当前用户上下文 `{id, role}`
//! - [`require_auth`] - 认证中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod roles;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use roles::{ROLE_ADMIN, ROLE_BUYER, ROLE_SELLER};
