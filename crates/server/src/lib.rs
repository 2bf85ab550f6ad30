use api_types::Status;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod charts;
mod expenses;
mod server;

pub mod types {
    pub mod expense {
        pub use api_types::expense::{AmountInput, ExpenseCreated, ExpenseNew, ExpenseView};
    }

    pub mod chart {
        pub use api_types::chart::{ChartData, DebugExpenses, MonthExpenses, MonthlyExpenses};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Validation(String),
    Task(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Storage(_) | EngineError::Malformed(_) | EngineError::Serialize(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    tracing::error!("engine error: {err}");
    match err {
        EngineError::Storage(_) => "failed to access the expenses file".to_string(),
        EngineError::Malformed(_) | EngineError::Serialize(_) => {
            "internal server error".to_string()
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Validation(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Task(err) => {
                tracing::error!("engine task failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(Status {
                status: format!("Error: {error}"),
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_maps_to_500() {
        let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let res = ServerError::from(EngineError::Storage(err)).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn serialize_error_maps_to_500() {
        let Err(err) = serde_json::from_str::<u64>("x") else {
            panic!("expected a decoding error");
        };
        let res = ServerError::from(EngineError::Serialize(err)).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn task_failure_maps_to_500() {
        let res = ServerError::Task("panicked".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_maps_to_400() {
        let res = ServerError::Validation("Amount is required".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
