use player_roster::{batch_runner::BatchRunner, config::AppConfig};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("player_roster=debug".parse()?)
                .add_directive("mongodb=info".parse()?),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting player roster bulk upload");

    let locations: Vec<String> = std::env::args().skip(1).collect();
    if locations.is_empty() {
        error!("Usage: player_roster <players.csv>...");
        return Err("no CSV files given".into());
    }
    debug!("Uploads requested: {:?}", locations);

    let config = AppConfig::load()?;
    let runner = BatchRunner::new(&config).await?;
    info!("Batch runner initialized successfully");

    let mut failed = 0;
    for outcome in runner.run(&locations).await {
        match outcome.result {
            Ok(report) => println!("{}: {}", outcome.location, serde_json::to_string(&report)?),
            Err(_) => failed += 1,
        }
    }

    if failed > 0 {
        return Err(format!("{} upload(s) could not be read", failed).into());
    }
    Ok(())
}
