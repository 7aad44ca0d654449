use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// Pipeline failure taxonomy. Client-input problems carry a message that is
/// safe to echo back; storage and encoding failures are logged server-side
/// and collapse to a generic body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    ClientInput(String),

    #[error("storage failure at {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("encoding timed out after {0}s")]
    EncodeTimeout(u64),
}

impl AppError {
    pub fn client(msg: impl Into<String>) -> Self {
        Self::ClientInput(msg.into())
    }

    pub fn storage(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::ClientInput(_) => StatusCode::BAD_REQUEST,
            AppError::Storage { .. } | AppError::Encoding(_) | AppError::EncodeTimeout(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Body text returned to the caller. Internal diagnostics stay out of it.
    fn public_message(&self) -> String {
        match self {
            AppError::ClientInput(msg) => msg.clone(),
            AppError::Storage { .. } => "storage failure".to_string(),
            AppError::Encoding(_) => "encoding failed".to_string(),
            AppError::EncodeTimeout(_) => "encoding timed out".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {self}");
        }
        (status, self.public_message()).into_response()
    }
}
