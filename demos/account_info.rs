use kavenegar::{Config, KavenegarClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let client = KavenegarClient::from_config(&config)?;

    let entries = client.account_info().await?;
    println!("{client}: remaining credit {}", entries["remaincredit"]);

    Ok(())
}
