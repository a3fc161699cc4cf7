//! # Kakitori CLI
//!
//! Command-line entry point.

use clap::Parser;
use kakitori_cli::CliArgs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "kakitori_cli=info,kakitori_core=info,kakitori_renderer=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    tracing::debug!("Parsed arguments: {:?}", args);

    kakitori_cli::run(args).await
}
