use clap::Parser;
use rest_api_starter::cli::{Cli, execute_command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    execute_command(Cli::parse()).await
}
