use clap::Parser;
use docvault_config::ConfigLoader;
use eyre::WrapErr;
use std::path::PathBuf;
use std::sync::Arc;

mod commands;
mod session;

use commands::Commands;

#[derive(Parser)]
#[command(name = "docvault")]
#[command(about = "Share and open documents stored in a docvault", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (overrides DOCVAULT_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// API base URL (overrides DOCVAULT_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Origin shareable addresses are built on (overrides DOCVAULT_CLIENT_ORIGIN)
    #[arg(long, global = true, value_name = "URL")]
    origin: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = docvault_utils::tracing::verbosity_filter(cli.verbose);
    docvault_utils::tracing::init_with_default(filter)
        .map_err(|e| eyre::eyre!("failed to initialise logging: {e}"))?;

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config {
        loader = loader.file(path);
    }
    let mut config = loader.load().wrap_err("failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url.parse().wrap_err("invalid --api-url")?;
    }
    if let Some(origin) = cli.origin {
        config.client_origin = origin.parse().wrap_err("invalid --origin")?;
    }
    config.validate().wrap_err("invalid configuration")?;

    if let Err(error) = cli.command.execute(Arc::new(config)).await {
        let advisory = error.advisory();
        return Err(eyre::Report::new(error).wrap_err(advisory));
    }
    Ok(())
}
