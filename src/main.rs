use std::process;
use clap::Parser;

use rss_digest::cli::Cli;

#[tokio::main]
async fn main() {
    // Load .env before parsing so env-backed flags see its values.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.run().await {
        Ok(_) => {
            // Command completed successfully
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
