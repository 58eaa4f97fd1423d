use clap::Parser;
use sfcgrid_processor::cli::{run, Cli};
use sfcgrid_processor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
