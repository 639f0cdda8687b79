mod cli;
mod config;
mod logging;
mod model;
mod providers;
mod stages;
mod store;
mod util;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = cli::parse_args(&args)?;

    // Load config
    let config = config::load_config()?;
    logging::init_tracing(&config.log_level)?;

    cli::run(command, &config).await
}
