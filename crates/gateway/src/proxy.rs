//! Request forwarding to downstream services.
//!
//! The gateway owns no business logic: once a request has cleared the
//! authentication filter it is handed to the service owning the first path
//! segment, with the validated identity attached as headers.

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

use crate::AppState;
use crate::config::RoutesConfig;
use velora_shared::Claims;

/// Upper bound on buffered request/response bodies.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Maps path prefixes to downstream base URLs.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<(&'static str, String)>,
}

impl RouteTable {
    /// Builds the table from the configured downstream URLs.
    #[must_use]
    pub fn from_config(routes: &RoutesConfig) -> Self {
        let base = |url: &str| url.trim_end_matches('/').to_string();
        Self {
            entries: vec![
                ("accounts", base(&routes.account_url)),
                ("checkout", base(&routes.checkout_url)),
                ("orders", base(&routes.order_url)),
                ("stock", base(&routes.stock_url)),
            ],
        }
    }

    /// Resolves a gateway path to `(downstream base URL, downstream path)`.
    ///
    /// The owning prefix is stripped: `/accounts/auth/login` becomes
    /// `/auth/login` on the account service. Returns `None` when no service
    /// owns the prefix.
    #[must_use]
    pub fn resolve<'a>(&'a self, path: &'a str) -> Option<(&'a str, String)> {
        let trimmed = path.strip_prefix('/')?;
        let (head, rest) = trimmed
            .split_once('/')
            .map_or((trimmed, ""), |(head, rest)| (head, rest));

        self.entries
            .iter()
            .find(|(prefix, _)| *prefix == head)
            .map(|(_, base)| (base.as_str(), format!("/{rest}")))
    }
}

/// Copies the validated identity into downstream request headers.
fn attach_identity(headers: &mut HeaderMap, claims: &Claims) {
    if let Ok(value) = HeaderValue::from_str(&claims.user_id().to_string()) {
        headers.insert("x-user-id", value);
    }
    headers.insert("x-user-role", HeaderValue::from_static(claims.role.as_str()));
    if let Ok(value) = HeaderValue::from_str(&claims.email) {
        headers.insert("x-user-email", value);
    }
}

fn bad_gateway() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({
            "error": "upstream_unreachable",
            "message": "Downstream service did not respond"
        })),
    )
        .into_response()
}

/// Forwards a request to the downstream service owning its path prefix.
pub async fn forward(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let Some((base, downstream_path)) = state.routes.resolve(parts.uri.path()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "unknown_route",
                "message": "No service owns this path"
            })),
        )
            .into_response();
    };

    let mut url = format!("{base}{downstream_path}");
    if let Some(query) = parts.uri.query() {
        url.push('?');
        url.push_str(query);
    }

    let body_bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Failed to buffer request body");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({
                    "error": "payload_too_large",
                    "message": "Request body exceeds the gateway limit"
                })),
            )
                .into_response();
        }
    };

    let mut headers = parts.headers.clone();
    // Hop-by-hop headers are owned by each connection.
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    if let Some(claims) = parts.extensions.get::<Claims>() {
        attach_identity(&mut headers, claims);
    }

    debug!(method = %parts.method, url = %url, "Forwarding request");

    let upstream = match state
        .client
        .request(parts.method.clone(), &url)
        .headers(headers)
        .body(body_bytes)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!(url = %url, error = %e, "Downstream request failed");
            return bad_gateway();
        }
    };

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    response_headers.remove(header::TRANSFER_ENCODING);
    response_headers.remove(header::CONTENT_LENGTH);

    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(url = %url, error = %e, "Failed to read downstream response");
            return bad_gateway();
        }
    };

    let mut builder = Response::builder().status(status);
    if let Some(headers) = builder.headers_mut() {
        *headers = response_headers;
    }
    match builder.body(Body::from(bytes)) {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Failed to assemble downstream response");
            bad_gateway()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use velora_shared::types::{Role, UserId};

    fn test_table() -> RouteTable {
        RouteTable::from_config(&RoutesConfig {
            account_url: "http://account:8081".to_string(),
            checkout_url: "http://checkout:8082/".to_string(),
            order_url: "http://order:8083".to_string(),
            stock_url: "http://stock:8084".to_string(),
        })
    }

    #[test]
    fn test_resolve_strips_owning_prefix() {
        let table = test_table();
        let (base, path) = table.resolve("/accounts/auth/login").unwrap();
        assert_eq!(base, "http://account:8081");
        assert_eq!(path, "/auth/login");
    }

    #[test]
    fn test_resolve_bare_prefix_maps_to_root() {
        let table = test_table();
        let (base, path) = table.resolve("/orders").unwrap();
        assert_eq!(base, "http://order:8083");
        assert_eq!(path, "/");
    }

    #[test]
    fn test_resolve_trims_trailing_slash_in_base() {
        let table = test_table();
        let (base, _) = table.resolve("/checkout/cart").unwrap();
        assert_eq!(base, "http://checkout:8082");
    }

    #[rstest]
    #[case("/payments/charge")]
    #[case("no-leading-slash")]
    #[case("/")]
    fn test_resolve_unknown_prefix(#[case] path: &str) {
        assert!(test_table().resolve(path).is_none());
    }

    #[test]
    fn test_attach_identity_sets_headers() {
        let user_id = UserId::new();
        let claims = Claims::new(
            user_id,
            "a@example.com",
            Role::Admin,
            Utc::now() + Duration::hours(1),
        );

        let mut headers = HeaderMap::new();
        attach_identity(&mut headers, &claims);

        assert_eq!(headers["x-user-id"], user_id.to_string().as_str());
        assert_eq!(headers["x-user-role"], "ADMIN");
        assert_eq!(headers["x-user-email"], "a@example.com");
    }
}
