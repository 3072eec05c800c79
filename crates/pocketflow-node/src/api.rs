//! HTTP API for the PocketFlow node.
//!
//! ## Auth Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/api/register` | Create account |
//! | POST | `/api/login` | Exchange credentials for a bearer token |
//!
//! ## Transaction Endpoints (protected)
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/api/transactions` | Create transaction |
//! | GET | `/api/transactions` | List own transactions |
//! | PATCH | `/api/transactions/{id}` | Update own transaction |
//! | DELETE | `/api/transactions/{id}` | Delete own transaction |
//! | GET | `/api/analytics/balance` | Income minus expenses |
//!
//! Every protected endpoint requires `Authorization: Bearer <token>`. Any
//! token failure, whatever its internal reason, answers with the same 401.

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use pocketflow_core::{
    CoreError, CoreStore, CreateTransactionRequest, LoginRequest, RegisterRequest, TokenSigner,
    TransactionId, UpdateTransactionRequest, User,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// User and transaction storage.
    pub store: CoreStore,
    /// Signer for session tokens; read-only after startup.
    pub signer: Arc<TokenSigner>,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::Core(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let error_type = match err {
                    CoreError::UsernameTaken(_) => "username_taken",
                    CoreError::InvalidUsername(_) => "invalid_username",
                    CoreError::InvalidCredentials => "invalid_credentials",
                    CoreError::Unauthorized => "unauthorized",
                    CoreError::NotFound => "not_found",
                    CoreError::Crypto(_) => "internal_error",
                };
                if matches!(err, CoreError::Crypto(_)) {
                    tracing::error!(error = %err, "request failed");
                    (status, error_type, "internal error".to_string())
                } else {
                    (status, error_type, err.to_string())
                }
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// The authenticated caller, resolved from the bearer token.
///
/// This is the authorization gate: parse the header, verify the token,
/// resolve the subject. Missing header, malformed or forged or expired
/// token, and unknown subject all reject identically.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(CoreError::Unauthorized)?;

        let claims = state.signer.verify(token.trim()).map_err(|fault| {
            tracing::debug!(?fault, "rejected bearer token");
            CoreError::Unauthorized
        })?;

        let user = state
            .store
            .users
            .find_by_username(&claims.sub)
            .ok_or(CoreError::Unauthorized)?;

        Ok(AuthUser(user))
    }
}

/// Successful login payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed bearer token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

/// Balance payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Income minus expenses over the caller's transactions.
    pub current_balance: f64,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route(
            "/api/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/api/transactions/{id}",
            patch(update_transaction).delete(delete_transaction),
        )
        .route("/api/analytics/balance", get(get_balance))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Registers a new account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Argon2 hashing is deliberately slow; keep it off the async workers.
    let users = state.store.users.clone();
    let user = tokio::task::spawn_blocking(move || users.register(&req.username, &req.password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    tracing::info!(username = %user.username, id = user.id, "registered user");
    Ok((StatusCode::CREATED, Json(user.to_profile())))
}

/// Verifies credentials and issues a session token.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let users = state.store.users.clone();
    let user = tokio::task::spawn_blocking(move || users.authenticate(&req.username, &req.password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let access_token = state.signer.issue(&user.username)?;

    tracing::debug!(username = %user.username, "issued session token");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Creates a transaction owned by the caller.
async fn create_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tx = state.store.transactions.create(user.id, req);
    Ok((StatusCode::CREATED, Json(tx)))
}

/// Lists the caller's transactions.
async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> impl IntoResponse {
    Json(state.store.transactions.list_for_owner(user.id))
}

/// Updates one of the caller's transactions.
async fn update_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<TransactionId>,
    Json(req): Json<UpdateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tx = state.store.transactions.update_for_owner(id, user.id, req)?;
    Ok(Json(tx))
}

/// Deletes one of the caller's transactions.
async fn delete_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<TransactionId>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.transactions.delete_for_owner(id, user.id)?;
    Ok(Json(MessageResponse {
        message: "transaction deleted".to_string(),
    }))
}

/// Returns the caller's balance.
async fn get_balance(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> impl IntoResponse {
    Json(BalanceResponse {
        current_balance: state.store.transactions.balance_for_owner(user.id),
    })
}
