use bloodconnect::cli::Cli;
use bloodconnect_observability::init_tracing;
use clap::Parser;
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    Cli::parse().run().await
}
