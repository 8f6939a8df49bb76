//! Authentication routes for login, register, and token refresh.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::password::{hash_password, verify_password};
use crate::store::User;
use velora_shared::auth::{
    Claims, LoginRequest, LoginResponse, RefreshRequest, RegisterRequest, TokenPair, UserInfo,
};
use velora_shared::types::Role;
use velora_shared::jwt::TokenError;

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
}

/// Issues an access/refresh token pair for a user.
fn issue_pair(state: &AppState, user: &User) -> Result<TokenPair, TokenError> {
    let access_token = state
        .token_provider
        .issue_access_token(user.id, &user.email, user.role)?;
    let refresh_token = state
        .token_provider
        .issue_refresh_token(user.id, &user.email, user.role)?;
    Ok(TokenPair::new(
        access_token,
        refresh_token,
        state.token_provider.access_token_expires_in(),
    ))
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

fn internal_error(context: &str) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": format!("An error occurred during {context}")
        })),
    )
        .into_response()
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    // Find user by email
    let Some(user) = state.users.find_by_email(&payload.email) else {
        info!(email = %payload.email, "Login attempt for non-existent user");
        return invalid_credentials();
    };

    if !user.is_active {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "account_disabled",
                "message": "This account has been disabled"
            })),
        )
            .into_response();
    }

    // Verify password
    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("login");
        }
    }

    // Generate tokens
    let pair = match issue_pair(&state, &user) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to generate tokens");
            return internal_error("login");
        }
    };

    info!(user_id = %user.id, "User logged in successfully");

    let response = LoginResponse {
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        },
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: pair.expires_in,
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    if state.users.email_exists(&payload.email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "email_exists",
                "message": "An account with this email already exists"
            })),
        )
            .into_response();
    }

    // Hash password
    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error("registration");
        }
    };

    // Create user (new registrations are customers)
    let user = match state.users.create(
        &payload.email,
        &password_hash,
        &payload.full_name,
        Role::Customer,
    ) {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error("registration");
        }
    };

    let pair = match issue_pair(&state, &user) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to generate tokens");
            return internal_error("registration");
        }
    };

    info!(user_id = %user.id, "User registered");

    let response = LoginResponse {
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        },
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: pair.expires_in,
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

/// POST /auth/refresh - Exchange a refresh token for a new pair.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.token_provider.validate(&payload.refresh_token) {
        Ok(c) => c,
        Err(e) => {
            info!(error = %e, "Refresh token rejected");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_refresh_token",
                    "message": "Refresh token is invalid or expired"
                })),
            )
                .into_response();
        }
    };

    // The account must still exist and be active to mint fresh tokens.
    let user = match state.users.find_by_email(&claims.email) {
        Some(u) if u.is_active => u,
        _ => {
            info!(user_id = %claims.user_id(), "Refresh for unknown or disabled account");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_refresh_token",
                    "message": "Refresh token is invalid or expired"
                })),
            )
                .into_response();
        }
    };

    let pair = match issue_pair(&state, &user) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to generate tokens");
            return internal_error("refresh");
        }
    };

    (StatusCode::OK, Json(pair)).into_response()
}

/// GET /auth/me - Return the identity baked into the presented token.
async fn me(State(state): State<AppState>, request: axum::extract::Request) -> impl IntoResponse {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")));

    let Some(token) = token else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "missing_token",
                "message": "Authorization header with Bearer token is required"
            })),
        )
            .into_response();
    };

    match state.token_provider.validate(token) {
        Ok(Claims {
            sub, email, role, ..
        }) => (
            StatusCode::OK,
            Json(json!({
                "id": sub,
                "email": email,
                "role": role,
            })),
        )
            .into_response(),
        Err(e) => {
            info!(error = %e, "Token rejected on /auth/me");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_token",
                    "message": "Invalid or expired token"
                })),
            )
                .into_response()
        }
    }
}
