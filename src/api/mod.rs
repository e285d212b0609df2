pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower::buffer::BufferLayer;
use tower::limit::RateLimitLayer;
use tower::{BoxError, ServiceBuilder};

use crate::chain::MintSubmitter;
use crate::config::Config;
use crate::request::MintRequestBuilder;
use crate::rules::RulesEngine;

#[derive(Clone)]
pub struct AppState {
    pub builder: Arc<MintRequestBuilder>,
    pub submitter: Arc<MintSubmitter>,
    pub rules: Arc<RulesEngine>,
    pub preflight_onchain_verify: bool,
}

impl AppState {
    pub async fn from_config(config: &Config) -> eyre::Result<Self> {
        let contract = config.contract_address()?;
        let submitter = MintSubmitter::connect(
            &config.rpc_url,
            config.chain_id,
            contract,
            config.relayer_signer()?,
        )
        .await?;
        let builder = MintRequestBuilder::new(config.chain_id, contract)
            .with_window(config.clock_skew_secs, config.validity_window_secs);

        Ok(Self {
            builder: Arc::new(builder),
            submitter: Arc::new(submitter),
            rules: Arc::new(RulesEngine::new_with_default_rules()),
            preflight_onchain_verify: config.preflight_onchain_verify,
        })
    }
}

pub fn router_with_defaults() -> Router<AppState> {
    Router::new()
        .route("/health", get(routes::health))
        .route("/prepare", post(routes::prepare_mint))
        .route("/relay", post(routes::relay_mint))
        .layer(
            // the relay route spends relayer gas; rate limit the lot
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|error: BoxError| async move {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Unhandled error: {:?}", error),
                    )
                }))
                .layer(BufferLayer::new(10000))
                .layer(RateLimitLayer::new(60, Duration::from_secs(60))),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|error: BoxError| async move {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Unhandled error: {:?}", error),
                    )
                }))
                .layer(tower_http::trace::TraceLayer::new_for_http())
                .layer(tower::timeout::TimeoutLayer::new(Duration::from_secs(10)))
                .layer(tower_http::cors::CorsLayer::new().allow_origin(tower_http::cors::Any))
                .layer(tower_http::compression::CompressionLayer::new().gzip(true)),
        )
}

pub async fn start_api(config: &Config, state: AppState) -> eyre::Result<()> {
    let router = router_with_defaults().with_state(state);

    let addr = format!("{}:{}", config.initial_network_ip(), config.api_port);
    let listener = TcpListener::bind(addr.clone()).await?;

    tracing::info!(address = addr, "Starting API server");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("API Server failed");
    });
    Ok(())
}
