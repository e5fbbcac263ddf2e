//! Entry point for the tax engine binary.
//!
//! Running this binary starts an HTTP server exposing the engine.  See
//! [`zimtax_engine::config`] for the environment variables it reads.

use zimtax_engine::config::ServerConfig;

#[tokio::main]
async fn main() {
    zimtax_engine::logging::init();
    if let Err(err) = run().await {
        tracing::error!("Error running server: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    let rates = config.load_rate_table()?;
    zimtax_engine::api::serve(config.bind_addr, rates).await
}
