//! Bookshelf backend - GraphQL API for a small book and author catalog
//!
//! All operations are exposed via GraphQL at /graphql, with live
//! updates over WebSocket at /graphql/ws.

mod config;
mod db;
mod graphql;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::graphql::{BookshelfSchema, CurrentUser, verify_token};
use crate::services::BookEvents;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub schema: BookshelfSchema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env()?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bookshelf backend");

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    tracing::info!("Database connected");

    let events = BookEvents::new();
    let schema = graphql::build_schema(config.clone(), db.clone(), events);
    tracing::info!("GraphQL schema built");

    let state = AppState {
        config: config.clone(),
        db,
        schema,
    };

    let app = Router::new()
        .route("/health", get(health))
        // GraphQL endpoint (queries and mutations)
        .route("/graphql", get(graphiql).post(graphql_handler))
        // GraphQL WebSocket endpoint for subscriptions
        .route("/graphql/ws", get(graphql_ws_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphQL playground: http://localhost:{}/graphql", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Extract bearer token from Authorization header
fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|h| h.starts_with("Bearer "))
        .map(|h| h[7..].to_string())
}

/// Resolve the request's user from its bearer token, if any.
///
/// Every failure mode (no header, wrong scheme, bad signature, a user
/// id that no longer resolves) uniformly means "no current user";
/// protected mutations reject on their own from there.
async fn resolve_current_user(state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = extract_token(headers)?;
    let claims = verify_token(&state.config.jwt_secret, &token).ok()?;
    let user = state.db.users().get_by_id(&claims.sub).await.ok()??;
    Some(CurrentUser(user))
}

/// GraphQL query/mutation handler with auth context
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(user) = resolve_current_user(&state, &headers).await {
        request = request.data(user);
    }

    state.schema.execute(request).await.into()
}

/// GraphiQL interactive playground
async fn graphiql() -> impl IntoResponse {
    axum::response::Html(
        GraphiQLSource::build()
            .endpoint("/graphql")
            .subscription_endpoint("/graphql/ws")
            .finish(),
    )
}

/// GraphQL WebSocket handler for subscriptions with auth
async fn graphql_ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    protocol: async_graphql_axum::GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    // Auth may arrive via headers on the initial connection
    let header_user = resolve_current_user(&state, &headers).await;

    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |socket| {
            let mut ws = async_graphql_axum::GraphQLWebSocket::new(
                socket,
                state.schema.clone(),
                protocol,
            );

            if let Some(user) = header_user {
                let mut data = async_graphql::Data::default();
                data.insert(user);
                ws = ws.with_data(data);
            }

            // Auth may also arrive in the connection_init payload
            let state = state.clone();
            ws.on_connection_init(move |params| async move {
                let mut data = async_graphql::Data::default();
                if let Some(token) = params
                    .get("Authorization")
                    .or_else(|| params.get("authorization"))
                    .and_then(|v| v.as_str())
                {
                    let token = token.strip_prefix("Bearer ").unwrap_or(token);
                    if let Ok(claims) = verify_token(&state.config.jwt_secret, token) {
                        if let Ok(Some(user)) = state.db.users().get_by_id(&claims.sub).await {
                            data.insert(CurrentUser(user));
                        }
                    }
                }
                Ok(data)
            })
            .serve()
        })
}
