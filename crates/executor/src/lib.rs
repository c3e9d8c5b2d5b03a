//! # Meridian Executor Crate
//!
//! This crate provides the components that turn a priced order into its
//! consequences: the fill decision, the trade record and the portfolio update.
//!
//! ## Architectural Principles
//!
//! - **State vs. Logic Decoupling:** `SimulatedExchange` is a pure calculator that
//!   decides whether and at what price an order fills, without mutating anything.
//!   `PortfolioLedger` and `TradeLedger` are the state holders that apply the result.
//! - **Plan, then Commit:** `PortfolioLedger::apply_fill` validates the resulting
//!   position before writing it, so a rejected fill never leaves partial state.
//!
//! ## Public API
//!
//! - `SimulatedExchange`: the fill decision for MARKET and LIMIT orders.
//! - `PortfolioLedger`: per-user positions with weighted-average cost.
//! - `TradeLedger`: the append-only trade record.
//! - `ExecutorError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod exchange;
pub mod ledger;
pub mod portfolio;

// Re-export the key components to provide a clean, public-facing API.
pub use error::ExecutorError;
pub use exchange::SimulatedExchange;
pub use ledger::TradeLedger;
pub use portfolio::PortfolioLedger;
