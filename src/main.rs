use anyhow::{Context, Result};
use clap::Parser;
use spacex_queries::{
    CliArgs, ClientConfig, Command, LoggingConfig, SpaceXApi, SpaceXClient, init_logging,
};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let config = ClientConfig::from_args(&cli)?;

    // A client without its queries is unusable; fail before issuing anything.
    let client = SpaceXClient::with_config(config).context("Failed to construct client")?;

    match cli.command.unwrap_or(Command::Demo) {
        Command::Demo => run_demo(&client).await,
        Command::Mission { id } => write_response(client.mission_by_id(&id).await?),
        Command::Missions {
            manufacturer,
            limit,
        } => write_response(
            client
                .missions_by_manufacturer(&manufacturer, limit)
                .await?,
        ),
        Command::Launches { limit } => write_response(client.past_launches(limit).await?),
        Command::Rockets { limit } => write_response(client.rockets(limit).await?),
        Command::List => {
            for name in client.store().names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

async fn run_demo(client: &dyn SpaceXApi) -> Result<()> {
    let response = client.mission_by_id("6C42550").await;
    log_response("Mission 6C42550", response)?;

    let response = client.missions_by_manufacturer("Orbital ATK", 10).await;
    log_response("Missions of Orbital ATK", response)?;

    let response = client.past_launches(3).await;
    log_response("Last 3 Launches", response)?;

    let response = client.rockets(10).await;
    log_response("Rockets", response)?;

    Ok(())
}

fn log_response(
    description: &str,
    response: Result<Vec<u8>, spacex_queries::ClientError>,
) -> Result<()> {
    let bytes = response.with_context(|| format!("Failed to obtain {description}"))?;
    tracing::info!(response = %String::from_utf8_lossy(&bytes), "{description}");
    Ok(())
}

fn write_response(bytes: Vec<u8>) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes).context("failed to write response")?;
    stdout.write_all(b"\n").context("failed to write response")?;
    Ok(())
}
