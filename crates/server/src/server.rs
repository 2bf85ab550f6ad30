use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::sync::RwLock;

use std::sync::Arc;

use crate::{ServerError, charts, expenses};
use engine::{Engine, EngineError};

/// Shared handler state.
///
/// The lock is the single writer: `add_expense` and `delete_expense` hold the
/// write guard for their whole read-modify-write cycle.
#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<RwLock<Engine>>,
}

impl ServerState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
        }
    }
}

/// Run a mutation on the engine under the write lock.
///
/// The engine writes its file with blocking I/O, so the closure runs on the
/// blocking pool while the owned guard keeps other writers out.
pub(crate) async fn with_engine_mut<T, F>(state: &ServerState, f: F) -> Result<T, ServerError>
where
    F: FnOnce(&mut Engine) -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    let mut engine = state.engine.clone().write_owned().await;
    let result = tokio::task::spawn_blocking(move || f(&mut engine))
        .await
        .map_err(|err| ServerError::Task(err.to_string()))?;
    Ok(result?)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/expenses", get(expenses::list))
        .route("/add_expense", post(expenses::add))
        .route("/delete_expense/{id}", delete(expenses::delete))
        .route("/get_chart_data/{date}", get(charts::chart_data))
        .route("/expenses_by_date", get(charts::by_date))
        .route(
            "/get_previous_months_expenses",
            get(charts::previous_months),
        )
        .route("/debug_expenses", get(charts::debug))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
