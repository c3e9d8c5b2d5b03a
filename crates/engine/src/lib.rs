//! # Meridian Engine
//!
//! The order lifecycle. `OrderBook` accepts and cancels orders, the
//! `ExecutionEngine` runs one deferred attempt per order through a `Scheduler`,
//! and `TradingDesk` wires both to the instrument directory and the ledgers.
//!
//! Lock order is fixed: an order's own lock first, the portfolio lock second.

pub mod desk;
pub mod error;
pub mod execution;
pub mod order_book;
pub mod scheduler;
mod store;

pub use desk::TradingDesk;
pub use error::EngineError;
pub use execution::{ExecutionEngine, ExecutionOutcome};
pub use order_book::OrderBook;
pub use scheduler::{ManualScheduler, Scheduler, Task, TokioScheduler};
