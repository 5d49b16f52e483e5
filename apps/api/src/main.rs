mod checkout;
mod config;
mod errors;
mod intake;
mod models;
mod render;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::checkout::{CheckoutGateway, MercadoPagoClient};
use crate::config::Config;
use crate::render::RenderOptions;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::ArtifactStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Info Center API v{}", env!("CARGO_PKG_VERSION"));

    let store = ArtifactStore::open(&config.storage_dir, config.artifact_ttl)
        .with_context(|| format!("cannot open storage dir {}", config.storage_dir.display()))?;

    let checkout = match &config.payment_access_token {
        Some(token) => {
            let client = MercadoPagoClient::new(token.clone())?;
            Some(Arc::new(client) as Arc<dyn CheckoutGateway>)
        }
        None => None,
    };
    if config.payment_enabled() {
        info!("Mercado Pago: ATIVADO");
    } else {
        info!("Mercado Pago: DESATIVADO (Modo Teste)");
    }

    let render = RenderOptions::with_locale(config.locale);
    info!(locale = ?render.locale, name_policy = ?config.name_policy, "Document options");

    let cors = build_cors(&config)?;

    let state = AppState {
        config: config.clone(),
        store: Arc::new(store),
        checkout,
        render: Arc::new(render),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Any origin unless `CORS_ALLOWED_ORIGIN` pins a single one.
fn build_cors(config: &Config) -> Result<CorsLayer> {
    match &config.cors_allowed_origin {
        None => Ok(CorsLayer::permissive()),
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .with_context(|| format!("CORS_ALLOWED_ORIGIN '{origin}' is not a valid origin"))?;
            info!(origin = ?origin, "CORS restricted");
            Ok(CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any))
        }
    }
}
