use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use configuration::{init_tracing, load_config, Config};
use core_types::{Instrument, Order, OrderRequest, PositionSnapshot, Trade};
use engine::{TokioScheduler, TradingDesk};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Extra wait after the execution delay before `simulate` reads results back.
const SETTLE_SLACK: Duration = Duration::from_millis(250);

/// The main entry point for the Meridian trading simulator.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; it only supplies MERIDIAN_* overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.command.config_path())?;
    let _log_guard = init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Instruments(_) => {
            print_instruments(&config.seed_instruments());
            Ok(())
        }
        Commands::Simulate(args) => handle_simulate(args, config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A simulated securities trading backend.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Print the configured instrument catalogue.
    Instruments(ConfigArgs),
    /// Submit one order to an in-process desk and print the outcome.
    Simulate(SimulateArgs),
}

impl Commands {
    fn config_path(&self) -> &Path {
        match self {
            Commands::Serve(args) => &args.config.config,
            Commands::Instruments(args) => &args.config,
            Commands::Simulate(args) => &args.config.config,
        }
    }
}

#[derive(Parser)]
struct ConfigArgs {
    /// Path to the TOML configuration file. Missing files fall back to defaults.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[derive(Parser)]
struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct SimulateArgs {
    #[command(flatten)]
    config: ConfigArgs,

    #[arg(long, default_value = "user123")]
    user: String,

    /// The symbol to trade (e.g., "RELIANCE").
    #[arg(long)]
    symbol: String,

    #[arg(long, default_value = "NSE")]
    exchange: String,

    #[arg(long)]
    quantity: i64,

    /// BUY or SELL.
    #[arg(long, default_value = "BUY")]
    side: String,

    /// MARKET or LIMIT.
    #[arg(long, default_value = "MARKET")]
    style: String,

    /// Limit price; required for LIMIT orders.
    #[arg(long)]
    price: Option<Decimal>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let addr: SocketAddr = config.server.address().parse()?;
    tracing::info!(
        %addr,
        delay_ms = config.execution.delay_ms,
        instruments = config.instruments.len(),
        "Starting Meridian API."
    );
    let desk = Arc::new(TradingDesk::from_config(&config, Arc::new(TokioScheduler)));
    web_server::run_server(addr, desk).await
}

async fn handle_simulate(args: SimulateArgs, config: Config) -> anyhow::Result<()> {
    let desk = TradingDesk::from_config(&config, Arc::new(TokioScheduler));
    let request = OrderRequest {
        symbol: Some(args.symbol),
        exchange: Some(args.exchange),
        side: Some(args.side),
        order_type: Some(args.style),
        quantity: Some(args.quantity),
        price: args.price,
    };

    let order = desk.order_book().submit(&request, &args.user).await?;
    println!("Submitted order {} ({}).", order.id, order.status);

    tokio::time::sleep(config.execution.delay() + SETTLE_SLACK).await;

    let order = desk.order_book().get(order.id).await?;
    print_orders(&[order]);
    print_trades(&desk.trades().list_by_user(&args.user).await);
    print_portfolio(&desk.portfolio().list_by_user(&args.user).await);
    Ok(())
}

// ==============================================================================
// Table Output
// ==============================================================================

fn money(value: Decimal) -> String {
    value.round_dp(2).to_string()
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn print_instruments(instruments: &[Instrument]) {
    let mut table = new_table(&["Symbol", "Exchange", "Type", "Last Price"]);
    for i in instruments {
        table.add_row(vec![
            Cell::new(&i.symbol),
            Cell::new(&i.exchange),
            Cell::new(&i.instrument_type),
            Cell::new(money(i.last_traded_price)),
        ]);
    }
    println!("{table}");
}

fn print_orders(orders: &[Order]) {
    let mut table = new_table(&["Order", "Symbol", "Side", "Type", "Qty", "Limit", "Status", "Fill"]);
    for o in orders {
        table.add_row(vec![
            Cell::new(o.id),
            Cell::new(format!("{}/{}", o.symbol, o.exchange)),
            Cell::new(o.side),
            Cell::new(o.order_type),
            Cell::new(o.quantity),
            Cell::new(o.limit_price.map(money).unwrap_or_else(|| "-".to_string())),
            Cell::new(o.status),
            Cell::new(o.executed_price.map(money).unwrap_or_else(|| "-".to_string())),
        ]);
    }
    println!("{table}");
}

fn print_trades(trades: &[Trade]) {
    if trades.is_empty() {
        println!("No trades.");
        return;
    }
    let mut table = new_table(&["Trade", "Symbol", "Side", "Qty", "Price", "Executed At"]);
    for t in trades {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(format!("{}/{}", t.symbol, t.exchange)),
            Cell::new(t.side),
            Cell::new(t.quantity),
            Cell::new(money(t.price)),
            Cell::new(t.executed_at.to_rfc3339()),
        ]);
    }
    println!("{table}");
}

fn print_portfolio(positions: &[PositionSnapshot]) {
    if positions.is_empty() {
        println!("No open positions.");
        return;
    }
    let mut table = new_table(&["Symbol", "Exchange", "Qty", "Avg Cost", "Value"]);
    for p in positions {
        table.add_row(vec![
            Cell::new(&p.symbol),
            Cell::new(&p.exchange),
            Cell::new(p.quantity),
            Cell::new(money(p.average_cost)),
            Cell::new(money(p.current_value)),
        ]);
    }
    println!("{table}");
}
