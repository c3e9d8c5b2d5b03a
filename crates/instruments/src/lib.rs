//! # Meridian Instruments
//!
//! The instrument directory: which (symbol, exchange) pairs exist and what
//! they last traded at. Consumers depend on the `InstrumentDirectory` trait;
//! `InMemoryInstrumentDirectory` is the catalogue the simulator runs on.

pub mod directory;
pub mod error;

pub use directory::{InMemoryInstrumentDirectory, InstrumentDirectory};
pub use error::InstrumentError;
