use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::auth::verify_jwt;
use crate::database::{models::User, DatabaseError};
use crate::error::ApiError;

/// Rejection body for a missing or malformed bearer header.
pub const MISSING_BEARER_TOKEN: &str = "Missing bearer token";

/// Rejection body for everything else. Verification failures and unknown
/// subjects render identically so callers cannot probe which one occurred.
pub const UNAUTHORIZED_REQUEST: &str = "Unauthorized request";

/// Paths exempt from authentication, matched as case-sensitive prefixes
/// before any token parsing.
pub const DEFAULT_EXEMPT_PREFIXES: &[&str] = &["/api/auth/login", "/api/users/is", "/public"];

/// The single capability the gate consumes from the database layer.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, user_name: &str) -> Result<Option<User>, DatabaseError>;
}

/// Immutable gate configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct AuthGateConfig {
    pub jwt_secret: String,
    pub exempt_prefixes: Vec<String>,
}

impl AuthGateConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            exempt_prefixes: DEFAULT_EXEMPT_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    pub fn with_exempt_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.exempt_prefixes = prefixes;
        self
    }
}

/// The auth gate. Holds no per-request state; safe to clone per request.
#[derive(Clone)]
pub struct AuthGate {
    config: Arc<AuthGateConfig>,
    users: Arc<dyn UserStore>,
}

impl AuthGate {
    pub fn new(config: AuthGateConfig, users: Arc<dyn UserStore>) -> Self {
        Self {
            config: Arc::new(config),
            users,
        }
    }

    fn is_exempt(&self, path: &str) -> bool {
        self.config
            .exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Authenticated identity bound to admitted non-exempt requests.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Per-request authentication middleware.
///
/// Order of checks: exempt-prefix match, bearer header shape, signature and
/// expiry, then the async user lookup. Credential failures answer 401 with a
/// flat `{"error": "..."}` body and downstream never runs. A store failure is
/// not a credential problem and surfaces through the generic error layer.
pub async fn require_auth(State(gate): State<AuthGate>, mut request: Request, next: Next) -> Response {
    if gate.is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !has_bearer_scheme(header) {
        return reject(MISSING_BEARER_TOKEN);
    }

    // Everything after the 7-character scheme prefix, no trimming.
    let token = &header[7..];

    let claims = match verify_jwt(token, &gate.config.jwt_secret) {
        Ok(claims) => claims,
        Err(_) => return reject(UNAUTHORIZED_REQUEST),
    };

    let user = match gate.users.find_by_username(&claims.sub).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("user lookup failed during authentication: {}", e);
            return ApiError::from(e).into_response();
        }
    };

    match user {
        Some(user) => {
            request.extensions_mut().insert(AuthUser(user));
            next.run(request).await
        }
        None => reject(UNAUTHORIZED_REQUEST),
    }
}

/// Scheme is compared case-insensitively; the token that follows is not.
fn has_bearer_scheme(header: &str) -> bool {
    header
        .as_bytes()
        .get(..7)
        .map(|scheme| scheme.eq_ignore_ascii_case(b"bearer "))
        .unwrap_or(false)
}

fn reject(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::routing::get;
    use axum::{Extension, Router};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{generate_jwt, Claims};
    use crate::testing::{make_auth_header, sample_user, TEST_JWT_SECRET};

    struct MemoryStore {
        users: HashMap<String, User>,
        fail: bool,
    }

    impl MemoryStore {
        fn with_users(users: Vec<User>) -> Self {
            Self {
                users: users.into_iter().map(|u| (u.user_name.clone(), u)).collect(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                users: HashMap::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl UserStore for MemoryStore {
        async fn find_by_username(&self, user_name: &str) -> Result<Option<User>, DatabaseError> {
            if self.fail {
                return Err(DatabaseError::Sqlx(sqlx::Error::PoolClosed));
            }
            Ok(self.users.get(user_name).cloned())
        }
    }

    fn gate(store: MemoryStore) -> AuthGate {
        AuthGate::new(AuthGateConfig::new(TEST_JWT_SECRET), Arc::new(store))
    }

    fn test_app(gate: AuthGate) -> Router {
        Router::new()
            .route("/api/orders", get(whoami))
            .route("/api/auth/login", get(public_probe))
            .route("/api/users/is/alice", get(public_probe))
            .layer(axum::middleware::from_fn_with_state(gate, require_auth))
    }

    // Protected probe: echoes the bound identity, fails loudly if it is absent.
    async fn whoami(identity: Option<Extension<AuthUser>>) -> Response {
        match identity {
            Some(Extension(AuthUser(user))) => user.user_name.into_response(),
            None => (StatusCode::INTERNAL_SERVER_ERROR, "no identity bound").into_response(),
        }
    }

    // Exempt probe: must run with no identity bound.
    async fn public_probe(identity: Option<Extension<AuthUser>>) -> Response {
        match identity {
            Some(_) => (StatusCode::INTERNAL_SERVER_ERROR, "identity bound on exempt path").into_response(),
            None => "public".into_response(),
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn request(path: &str, auth: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn exempt_path_admits_without_header() {
        let app = test_app(gate(MemoryStore::with_users(vec![])));
        let response = app.oneshot(request("/api/auth/login", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "public");
    }

    #[tokio::test]
    async fn exempt_path_ignores_garbage_header() {
        let app = test_app(gate(MemoryStore::with_users(vec![])));
        let response = app
            .oneshot(request("/api/users/is/alice", Some("Basic abcdef")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let app = test_app(gate(MemoryStore::with_users(vec![sample_user("alice")])));
        let response = app.oneshot(request("/api/orders", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_string(response).await,
            json!({ "error": MISSING_BEARER_TOKEN }).to_string()
        );
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let app = test_app(gate(MemoryStore::with_users(vec![sample_user("alice")])));
        let response = app
            .oneshot(request("/api/orders", Some("Basic abcdef")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_string(response).await,
            json!({ "error": MISSING_BEARER_TOKEN }).to_string()
        );
    }

    #[tokio::test]
    async fn tampered_token_is_rejected_with_generic_body() {
        let app = test_app(gate(MemoryStore::with_users(vec![sample_user("alice")])));
        let token = generate_jwt(&Claims::new("alice", 1), TEST_JWT_SECRET).unwrap();
        let header = format!("Bearer {}x", token);
        let response = app
            .oneshot(request("/api/orders", Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_string(response).await,
            json!({ "error": UNAUTHORIZED_REQUEST }).to_string()
        );
    }

    #[tokio::test]
    async fn unknown_subject_is_indistinguishable_from_bad_token() {
        let app = test_app(gate(MemoryStore::with_users(vec![])));
        let response = app
            .oneshot(request("/api/orders", Some(&make_auth_header("ghost"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_string(response).await,
            json!({ "error": UNAUTHORIZED_REQUEST }).to_string()
        );
    }

    #[tokio::test]
    async fn valid_token_binds_identity() {
        let app = test_app(gate(MemoryStore::with_users(vec![sample_user("alice")])));
        let response = app
            .oneshot(request("/api/orders", Some(&make_auth_header("alice"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "alice");
    }

    #[tokio::test]
    async fn scheme_match_is_case_insensitive() {
        let app = test_app(gate(MemoryStore::with_users(vec![sample_user("alice")])));
        let token = generate_jwt(&Claims::new("alice", 1), TEST_JWT_SECRET).unwrap();
        let header = format!("bEaReR {}", token);
        let response = app
            .oneshot(request("/api/orders", Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "alice");
    }

    #[tokio::test]
    async fn repeated_requests_yield_the_same_outcome() {
        let gate = gate(MemoryStore::with_users(vec![sample_user("alice")]));
        let header = make_auth_header("alice");
        for _ in 0..3 {
            let response = test_app(gate.clone())
                .oneshot(request("/api/orders", Some(&header)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn store_error_is_not_a_401() {
        let app = test_app(gate(MemoryStore::failing()));
        let response = app
            .oneshot(request("/api/orders", Some(&make_auth_header("alice"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
