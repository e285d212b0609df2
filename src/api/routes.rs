use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::chain::PendingMint;
use crate::error::MintError;
use crate::request::{MintParams, PreparedMint};
use crate::rules::RuleContext;
use crate::wallet::SignedMintRequest;

pub async fn health() -> &'static str {
    "OK"
}

/// Builds an unsigned request plus its signing domain for the caller to
/// sign client-side. Nothing is stored; abandoned requests simply expire.
pub async fn prepare_mint(
    State(state): State<AppState>,
    Json(params): Json<MintParams>,
) -> Result<Json<PreparedMint>, (StatusCode, String)> {
    let now = chrono::Utc::now().timestamp() as u64;

    match state.builder.build(&params, now) {
        Ok(prepared) => Ok(Json(prepared)),
        Err(err) => {
            tracing::warn!("rejected prepare request: {err}");
            Err((StatusCode::BAD_REQUEST, err.to_string()))
        }
    }
}

/// Route for handling signed mint submission: preflight, then relay from
/// the funding account.
pub async fn relay_mint(
    State(state): State<AppState>,
    Json(signed): Json<SignedMintRequest>,
) -> (StatusCode, Json<APIResponse>) {
    let context = RuleContext {
        domain: state.builder.domain(),
        now_secs: chrono::Utc::now().timestamp() as u64,
        chain: state
            .preflight_onchain_verify
            .then(|| state.submitter.provider()),
    };

    let results = state.rules.evaluate(&signed, context).await;
    if !results.is_accept() {
        tracing::warn!(
            uid = %signed.request.uid,
            "preflight rejected mint:\n{}",
            results.summary()
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(APIResponse::RulesError {
                evaluation: results.summary(),
            }),
        );
    }

    match state.submitter.submit(&signed).await {
        Ok(pending) => (StatusCode::OK, Json(APIResponse::Submitted { mint: pending })),
        Err(err @ MintError::Input(_)) => (
            StatusCode::BAD_REQUEST,
            Json(APIResponse::Error {
                message: err.to_string(),
            }),
        ),
        Err(err) => {
            tracing::warn!("failed to relay mint: {err}");
            (
                StatusCode::BAD_GATEWAY,
                Json(APIResponse::Error {
                    message: err.to_string(),
                }),
            )
        }
    }
}

#[derive(Debug, Serialize)]
pub enum APIResponse {
    Submitted { mint: PendingMint },
    RulesError { evaluation: String },
    Error { message: String },
}
