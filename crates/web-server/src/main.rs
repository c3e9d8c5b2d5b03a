use configuration::{init_tracing, load_config};
use engine::{TokioScheduler, TradingDesk};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

// Entry point for `cargo run -p web-server`: the API alone, configured from
// `config.toml` and `MERIDIAN_*` variables.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config(Path::new("config.toml"))?;
    let _guard = init_tracing(&config.logging)?;

    let addr: SocketAddr = config.server.address().parse()?;
    let desk = Arc::new(TradingDesk::from_config(&config, Arc::new(TokioScheduler)));
    web_server::run_server(addr, desk).await
}
