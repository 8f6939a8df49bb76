//! Authentication filter for proxied routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::AppState;
use velora_shared::{
    Claims,
    types::{Role, UserId},
};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// The uniform rejection for every authentication failure.
///
/// Malformed, forged, and expired tokens all produce this exact response so
/// callers cannot probe which part of a token was invalid. The concrete
/// failure kind is logged, not returned.
fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": "Authentication required"
        })),
    )
        .into_response()
}

/// Authentication middleware that validates bearer tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token against the shared secret
/// 3. Stores the claims in request extensions for the proxy to forward
///
/// A request without a bearer token is rejected before validation runs.
/// Validation failures are terminal for the request; there is nothing
/// transient to retry.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        warn!(path = %request.uri().path(), "Request without bearer token");
        return unauthorized();
    };

    match state.token_provider.validate(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %request.uri().path(), error = %e, "Token validation failed");
            unauthorized()
        }
    }
}

/// Extractor for authenticated user claims.
///
/// Use this in handlers behind the auth middleware:
///
/// ```ignore
/// async fn handler(user: AuthUser) -> impl IntoResponse {
///     let user_id = user.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0.user_id()
    }

    /// Returns the user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.0.role
    }

    /// Returns the inner claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        response::IntoResponse,
        routing::get,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use velora_shared::{Claims, JwtConfig, Role, TokenProvider, UserId};

    use super::{AuthUser, auth_middleware};
    use crate::{AppState, proxy::RouteTable};

    const SECRET: &str = "test-secret-key-for-testing";

    fn test_state(secret: &str) -> AppState {
        let jwt = JwtConfig {
            secret_key: secret.to_string(),
            access_token_expiration_secs: 3600,
            refresh_token_expiration_secs: 604_800,
        };
        AppState {
            token_provider: Arc::new(TokenProvider::new(jwt)),
            client: reqwest::Client::new(),
            routes: Arc::new(RouteTable::default()),
        }
    }

    async fn whoami(user: AuthUser) -> impl IntoResponse {
        format!("{}:{}", user.user_id(), user.role())
    }

    fn test_app(state: &AppState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
            .with_state(state.clone())
    }

    fn get_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_is_forwarded_with_claims() {
        let state = test_state(SECRET);
        let user_id = UserId::new();
        let token = state
            .token_provider
            .issue_access_token(user_id, "a@example.com", Role::Customer)
            .unwrap();

        let response = test_app(&state)
            .oneshot(get_request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, format!("{user_id}:CUSTOMER").as_bytes());
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let state = test_state(SECRET);
        let response = test_app(&state).oneshot(get_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_non_bearer_header_rejected() {
        let state = test_state(SECRET);
        let request = Request::builder()
            .uri("/whoami")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let response = test_app(&state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejection_body_is_uniform_across_failure_kinds() {
        let state = test_state(SECRET);

        // Malformed token.
        let garbage = "definitely-not-a-jwt".to_string();

        // Valid token signed with the wrong secret.
        let forged = test_state("some-other-secret")
            .token_provider
            .issue_access_token(UserId::new(), "a@example.com", Role::Customer)
            .unwrap();

        // Well-signed token that expired an hour ago.
        let expired_claims = Claims::new(
            UserId::new(),
            "a@example.com",
            Role::Customer,
            chrono::Utc::now() - chrono::Duration::hours(1),
        );
        let expired = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &expired_claims,
            &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        for token in [garbage, forged, expired] {
            let response = test_app(&state)
                .oneshot(get_request(Some(&token)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let body = body_json(response).await;
            assert_eq!(body["error"], "unauthorized");
            assert_eq!(body["message"], "Authentication required");
        }
    }
}
