mod cli;
mod commands;
mod output;
mod sanitize;

use clap::Parser;

#[tokio::main]
async fn main() {
    revq_core::init_tracing();

    let cli = cli::Cli::parse();
    if let Err(e) = commands::execute(cli).await {
        eprintln!("❌ Error: {e}");
        std::process::exit(1);
    }
}
