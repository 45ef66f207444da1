//! 订单域服务
//!
//! 原系统的五个创建入口和散落在各处的状态/库存逻辑收敛到这里：
//!
//! - [`OrderCreationService`] - 渠道参数化的订单创建 (含库存预留/回滚)
//! - [`OrderStatusService`] - 状态机转移 + 取消时归还库存
//! - [`OrderNumberGenerator`] - 原子日序号订单号

pub mod creation;
pub mod number;
pub mod status;

pub use creation::{OrderCreateRequest, OrderCreationService, OrderItemInput};
pub use number::OrderNumberGenerator;
pub use status::{OrderStatusService, can_transition_order};
