use anyhow::Context;
use axum::Router;
use login_api::{
    entities, handler, openapi::ApiDoc,
    service::config::{ConfigService, ConfigServiceImpl},
    state::AppState,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: Arc<dyn ConfigService> = Arc::new(ConfigServiceImpl::new());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.values().log_filter))
        .with_target(false)
        .init();

    let registry = entities::init_registry().context("entity schema is inconsistent")?;
    let state = AppState::new(config, registry).await?;

    let app = Router::new()
        .merge(handler::health::routes())
        .merge(handler::users::routes(state.clone()))
        .merge(handler::schema::routes(state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let bind_addr = format!("0.0.0.0:{}", state.config().port());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "login-api listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
