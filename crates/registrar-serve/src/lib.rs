pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod sse;

use axum::Router;
use registrar_core::{Registrar, RegistrarError};
use registrar_db::schema;
use registrar_db::store::DbStore;
use registrar_feed::bus::ChangeBus;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared server state. The registrar handle is built once here and
/// reused by every request; handlers never open their own store.
#[derive(Clone)]
pub struct AppState {
    pub registrar: Arc<Mutex<Registrar<DbStore>>>,
    pub bus: ChangeBus,
    pub public_dir: Option<PathBuf>,
}

pub fn build_state(
    db_path: &str,
    public_dir: Option<PathBuf>,
) -> Result<AppState, RegistrarError> {
    let conn = schema::open_and_migrate(db_path).map_err(|err| RegistrarError::Internal {
        message: err.to_string(),
    })?;
    let bus = ChangeBus::new(256);
    let registrar = Registrar::new(DbStore::new(conn), bus.clone());
    Ok(AppState {
        registrar: Arc::new(Mutex::new(registrar)),
        bus,
        public_dir,
    })
}

pub fn app(state: AppState) -> Router {
    let public_dir = state.public_dir.clone();
    let router = routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());
    match public_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await
}
