mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    let report = cli::execute(args).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(error) = report.error {
        anyhow::bail!("save failed: {error}");
    }
    Ok(())
}
