//! Domain order model and transport error taxonomy.

pub mod errors;
pub mod types;

pub use errors::TransportError;
pub use types::{
    AmendOrderRequest, CreateOrderRequest, Order, OrderAction, OrderSide, OrderStatus, OrderType,
    SelfTradePrevention, TimeInForce,
};
