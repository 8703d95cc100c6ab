use std::sync::Arc;
use std::time::Duration;

use axum_helpers::server::{create_production_app, health_router};
use axum_helpers::{JwtAuth, optional_jwt_auth_middleware};
use core_config::tracing::{init_tracing, install_color_eyre};
use email::{EmailProvider, Mailer, SmtpProvider, TemplateEngine};
use storage::S3Storage;
use tracing::info;

mod adapters;
mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.url());

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    let storage = Arc::new(S3Storage::from_config(&config.storage).await);

    // Development mail goes to a local Mailhog/Mailpit
    let provider: Arc<dyn EmailProvider> = if config.environment.is_production() {
        Arc::new(SmtpProvider::from_env()?)
    } else {
        Arc::new(SmtpProvider::mailhog()?)
    };
    let mailer = Mailer::new(provider, TemplateEngine::new()?);

    let jwt = JwtAuth::new(&config.jwt);

    let state = AppState {
        config,
        mongo_client,
        db,
        storage,
        mailer,
        jwt,
    };

    api::init_indexes(&state).await?;

    // Every route sees the caller as an optional Actor; extractors enforce the rest
    let api_routes = api::routes(&state).layer(axum::middleware::from_fn_with_state(
        state.jwt.clone(),
        optional_jwt_auth_middleware,
    ));

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router.merge(health_router(state.config.app.clone()));

    info!("Starting Tornado Watches API with graceful shutdown (30s timeout)");

    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            drop(state.mongo_client);
            info!("MongoDB connection closed successfully");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Tornado Watches API shutdown complete");
    Ok(())
}
