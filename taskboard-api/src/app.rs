/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::clock::SystemClock;
/// use taskboard_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(config, Arc::new(MemoryStore::new()), Arc::new(SystemClock))?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use taskboard_shared::{
    auth::{jwt::TokenIssuer, middleware::authenticate, password::PasswordHasher},
    clock::Clock,
    services::{auth::AuthService, tasks::TaskService},
    store::{TaskStore, UserStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; everything
/// inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Registration, login and token verification
    pub auth: AuthService,

    /// Owner-scoped task operations
    pub tasks: TaskService,

    /// User store, kept for health reporting
    pub users: Arc<dyn UserStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services onto one store value that implements both store
    /// traits
    ///
    /// # Errors
    ///
    /// Fails if Argon2 rejects the hashing cost, or if the signing secret
    /// is empty or the token lifetime is out of range.
    pub fn new<S>(config: Config, store: Arc<S>, clock: Arc<dyn Clock>) -> anyhow::Result<Self>
    where
        S: UserStore + TaskStore + 'static,
    {
        let users: Arc<dyn UserStore> = store.clone();
        let tasks: Arc<dyn TaskStore> = store;

        let hasher = PasswordHasher::new(config.password)?;
        let lifetime = TokenIssuer::lifetime_from_seconds(config.jwt.expires_in_seconds)?;
        let tokens = TokenIssuer::new(&config.jwt.secret, lifetime, clock)?;

        Ok(Self {
            auth: AuthService::new(users.clone(), hasher, tokens),
            tasks: TaskService::new(tasks),
            users,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET    /health           # public
/// ├── POST   /auth/register    # public
/// ├── POST   /auth/login       # public
/// ├── POST   /tasks            # bearer
/// ├── GET    /tasks            # bearer
/// ├── PATCH  /tasks/:id        # bearer
/// └── DELETE /tasks/:id        # bearer
/// ```
///
/// Outer layers, innermost first: tracing, CORS, security headers.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/:id",
            patch(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer-token middleware
///
/// Verifies the token and inserts the resulting `AuthContext` into request
/// extensions. Missing, malformed, tampered and expired tokens all end here
/// with 401.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.auth.tokens()).map_err(|err| {
        tracing::debug!(error = %err, "Rejected bearer token");
        ApiError::from(err)
    })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
