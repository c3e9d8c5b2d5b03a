//! # Meridian Core Types
//!
//! Layer 0 of the workspace: the vocabulary every other crate speaks. Orders,
//! trades, instruments and positions live here together with the order
//! lifecycle rules, so that no higher layer can invent its own transitions.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{OrderSide, OrderStatus, OrderType};
pub use error::CoreError;
pub use structs::{
    Instrument, Order, OrderRequest, Position, PositionSnapshot, Trade, ValidatedOrder,
};
