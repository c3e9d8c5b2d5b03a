use crate::execution::ExecutionEngine;
use crate::order_book::OrderBook;
use crate::scheduler::Scheduler;
use crate::store::OrderStore;
use configuration::{Config, ExecutionSettings};
use executor::{PortfolioLedger, SimulatedExchange, TradeLedger};
use instruments::{InMemoryInstrumentDirectory, InstrumentDirectory};
use std::sync::Arc;

/// The single owner of all trading state in a process.
///
/// Builds the order book, execution engine and ledgers around one shared
/// instrument directory and hands out references to each.
pub struct TradingDesk {
    instruments: Arc<InMemoryInstrumentDirectory>,
    order_book: OrderBook,
    engine: Arc<ExecutionEngine>,
    portfolio: Arc<PortfolioLedger>,
    trades: Arc<TradeLedger>,
}

impl TradingDesk {
    pub fn new(
        instruments: Arc<InMemoryInstrumentDirectory>,
        settings: &ExecutionSettings,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let directory: Arc<dyn InstrumentDirectory> = instruments.clone();
        let orders = Arc::new(OrderStore::default());
        let portfolio = Arc::new(PortfolioLedger::new(Arc::clone(&directory)));
        let trades = Arc::new(TradeLedger::new());

        let engine = Arc::new(ExecutionEngine::new(
            Arc::clone(&orders),
            Arc::clone(&directory),
            SimulatedExchange::new(settings.limit_tolerance),
            Arc::clone(&portfolio),
            Arc::clone(&trades),
        ));
        let order_book = OrderBook::new(
            orders,
            directory,
            Arc::clone(&engine),
            scheduler,
            settings.delay(),
        );

        tracing::debug!(
            delay_ms = settings.delay_ms,
            tolerance = %settings.limit_tolerance,
            "Trading desk assembled."
        );

        Self {
            instruments,
            order_book,
            engine,
            portfolio,
            trades,
        }
    }

    /// Builds a desk with the configured instrument catalogue and execution settings.
    pub fn from_config(config: &Config, scheduler: Arc<dyn Scheduler>) -> Self {
        let instruments = Arc::new(InMemoryInstrumentDirectory::new(config.seed_instruments()));
        Self::new(instruments, &config.execution, scheduler)
    }

    pub fn order_book(&self) -> &OrderBook {
        &self.order_book
    }

    /// Direct access to execution, bypassing the scheduler.
    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    pub fn portfolio(&self) -> &PortfolioLedger {
        &self.portfolio
    }

    pub fn trades(&self) -> &TradeLedger {
        &self.trades
    }

    pub fn instruments(&self) -> &InMemoryInstrumentDirectory {
        &self.instruments
    }
}
