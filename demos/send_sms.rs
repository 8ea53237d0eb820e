use std::io;

use kavenegar::{Config, KavenegarClient, KavenegarError, Params};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let sender = config.sender.clone().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SENDER_NUMBER environment variable is required",
        )
    })?;
    let receptor = config.receptor.clone().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "RECEPTOR_NUMBER environment variable is required",
        )
    })?;
    let message = std::env::var("KAVENEGAR_MESSAGE")
        .unwrap_or_else(|_| "Test kavenegar message.".to_owned());

    let client = KavenegarClient::from_config(&config)?;
    let params = Params::new()
        .with("sender", sender)
        .with("receptor", receptor)
        .with("message", message);

    match client.sms_send(Some(&params)).await {
        Ok(entries) => println!("SMS sent: {entries}"),
        Err(err @ KavenegarError::Api { .. }) => eprintln!("rejected by Kavenegar: {err}"),
        Err(KavenegarError::Transport(err)) => {
            eprintln!("request failed ({:?}): {err}", err.reason());
        }
    }

    Ok(())
}
