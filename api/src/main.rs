use actix_web::{web, App, HttpServer};
use anyhow::Context;
use posters_api::app::{configure, not_found};
use posters_api::{telemetry, AppState};
use posters_shared::AppConfig;
use tracing::info;
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging)?;

    info!(environment = %config.environment, "Starting Posters API server");

    let services = posters_infra::initialize(&config)
        .await
        .context("Failed to initialize infrastructure")?;

    let state = web::Data::new(
        AppState::new(services.verification.clone()).with_redis(services.redis.clone()),
    );

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .configure(configure)
            .default_service(web::route().to(not_found))
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_address)?.run().await?;

    info!("Server stopped");
    Ok(())
}
