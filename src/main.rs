use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use machine_feed_service::controllers::machine_feed::MachineFeedController;
use machine_feed_service::domain::machine_feed::MachineFeedService;
use machine_feed_service::infrastructure::clients::HttpMachineServiceClient;
use machine_feed_service::infrastructure::config::{Config, LogFormat};
use machine_feed_service::infrastructure::http::start_http_server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration; missing upstream URLs abort startup here
    let config = Config::from_env()?;

    init_logging(&config);

    tracing::info!(
        "Starting machine feed service on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        repairs_url = %config.upstream.repairs_url,
        sessions_url = %config.upstream.sessions_url,
        machine_name_url = %config.upstream.machine_name_url,
        timeout_secs = config.upstream.timeout.as_secs(),
        max_attempts = config.upstream.max_attempts,
        "Upstream configuration loaded"
    );

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    let client = Arc::new(HttpMachineServiceClient::new(&config.upstream)?);
    let machine_feed_service = Arc::new(MachineFeedService::new(client));
    let machine_feed_controller = Arc::new(MachineFeedController::new(machine_feed_service));

    start_http_server(config, machine_feed_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "machine_feed_service=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "machine_feed_service=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
