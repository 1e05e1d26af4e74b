//! HTTP surface of the accounts service: HTML account pages, the Google token
//! exchange and the token-authenticated JSON API.

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use axum_login::AuthManagerLayerBuilder;
use domain::gateway::google_oauth::{GoogleOAuthClient, IdentityValidator};
use domain::user::Backend;
use log::*;
use std::error::Error as StdError;
use std::sync::Arc;
use time::Duration;
use tokio::{net::TcpListener, signal, task::AbortHandle};
use tower_http::cors::CorsLayer;
use tower_sessions::{
    session_store::ExpiredDeletion, Expiry, SessionManagerLayer, SessionStore,
};
use tower_sessions_sqlx_store::PostgresStore;

pub use service::AppState;

mod controller;
mod error;
mod extractors;
mod middleware;
mod router;
mod templates;

/// Seconds between sweeps of the session table for expired rows.
const SESSION_CLEANUP_INTERVAL_SECS: u64 = 60;

pub async fn init_server(app_state: AppState) -> Result<(), Box<dyn StdError + Send + Sync>> {
    let pool = app_state
        .db_conn_ref()
        .get_postgres_connection_pool()
        .clone();
    let session_store = PostgresStore::new(pool);
    session_store.migrate().await?;

    let deletion_task = tokio::task::spawn(session_store.clone().continuously_delete_expired(
        tokio::time::Duration::from_secs(SESSION_CLEANUP_INTERVAL_SECS),
    ));

    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let listen_addr = format!("{}:{}", interface, app_state.config.port);

    let app = build_app(app_state, session_store)?;

    info!("Server starting... listening for connections on http://{listen_addr}");

    let listener = TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(deletion_task.abort_handle()))
        .await?;

    match deletion_task.await {
        Ok(result) => result?,
        Err(e) if e.is_cancelled() => debug!("Session cleanup task stopped"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Assembles the router with its session, authentication and CORS layers.
/// The Google client is built once here and shared by every request.
pub fn build_app<Store>(
    app_state: AppState,
    session_store: Store,
) -> Result<Router, Box<dyn StdError + Send + Sync>>
where
    Store: SessionStore + Clone,
{
    let config = &app_state.config;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.is_production())
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            config.backend_session_expiry_seconds as i64,
        )));

    let backend = Backend::new(&app_state.database_connection);
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let google_validator: Arc<dyn IdentityValidator> =
        Arc::new(GoogleOAuthClient::from_config(config)?);

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::COOKIE])
        .allow_origin(allowed_origins(&config.allowed_origins)?);

    Ok(router::define_routes(app_state, google_validator)
        .layer(auth_layer)
        .layer(cors_layer))
}

fn allowed_origins(origins: &[String]) -> Result<Vec<HeaderValue>, Box<dyn StdError + Send + Sync>> {
    origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|e| {
                error!("Invalid CORS origin {origin:?}: {e}");
                e.into()
            })
        })
        .collect()
}

async fn shutdown_signal(deletion_task_abort_handle: AbortHandle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down...");
    deletion_task_abort_handle.abort();
}
