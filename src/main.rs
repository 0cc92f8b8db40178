use anyhow::Context;
use clap::Parser;
use property_weather::core::ServiceConfig;
use property_weather::utils::{logger, validation::Validate};
use property_weather::{
    build_router, AppState, CliConfig, PropertyOrchestrator, SupabaseStore, TomlConfig,
    WeatherstackClient,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 讀取 .env (若存在)
    dotenvy::dotenv().ok();
    let cli = CliConfig::parse();

    match cli.config.clone() {
        Some(path) => {
            let config = TomlConfig::from_file(&path)
                .with_context(|| format!("Failed to load configuration from {}", path))?;
            logger::init_logger(cli.verbose || config.verbose(), cli.json_logs || config.json_logs());
            tracing::info!("Loaded configuration from {}", path);
            serve(config).await
        }
        None => {
            logger::init_logger(cli.verbose, cli.json_logs);
            serve(cli).await
        }
    }
}

async fn serve<C: ServiceConfig + Validate>(config: C) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e).context("Invalid configuration");
    }

    let timeout = config.request_timeout_seconds();
    let store = SupabaseStore::new(
        config.store_url(),
        config.store_api_key(),
        config.properties_table(),
        timeout,
    )
    .context("Failed to create store client")?;
    let weather = WeatherstackClient::new(config.weather_base_url(), config.weather_api_key(), timeout)
        .context("Failed to create weather client")?;

    let orchestrator = Arc::new(PropertyOrchestrator::new(Arc::new(store), Arc::new(weather)));
    let app = build_router(AppState::new(orchestrator));

    let addr = format!("0.0.0.0:{}", config.listen_port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("🚀 Server is running at http://localhost:{}/graphql", config.listen_port());
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
