use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mp3_batch::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they stay out of the per-item report
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    info!("Starting mp3-batch v{}", env!("CARGO_PKG_VERSION"));

    // Failed URLs are reported, never turned into a failing exit status
    cli.run().await?;

    Ok(())
}
