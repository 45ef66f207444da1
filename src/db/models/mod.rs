//! Database Models

// Serde helpers
pub mod serde_helpers;

// Catalog
pub mod product;
pub mod urgent_sale;

// Orders
pub mod order;

// Revenue ledger
pub mod sale_transaction;

// Collaborators
pub mod cart;

// Re-exports
pub use cart::{Cart, CartItem};
pub use order::{
    Order, OrderItem, OrderStatus, PaymentMethod, ShippingAddress, SourceChannel, StatusEntry,
};
pub use product::{Product, ProductCreate};
pub use sale_transaction::SaleTransaction;
pub use urgent_sale::{UrgentSaleCreate, UrgentSaleItem, UrgentSaleStatus};
