//! nino-cli - risk zone lookup and SST / rainfall imagery animation.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "nino-cli",
    version,
    about = "El Nino flood-risk map toolkit for northern Peru"
)]
struct Cli {
    #[command(subcommand)]
    command: nino_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    nino_cmd::run(cli.command).await
}
