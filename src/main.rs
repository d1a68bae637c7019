//! MemeTrader - memecoin wallet tracking and copy-trading client

use anyhow::Result;

use memetrader::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (signer keys go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
