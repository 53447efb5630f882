use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("the requested page does not exist")]
    NotFound,
    #[error(transparent)]
    Upload(#[from] MultipartError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl From<jiff::Error> for AppError {
    fn from(err: jiff::Error) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                let body = crate::templates::error_page("Page not found", &self.to_string());
                (StatusCode::NOT_FOUND, Html(body)).into_response()
            },
            AppError::Upload(err) => {
                tracing::debug!(error = %err, "rejected multipart body");
                err.into_response()
            },
            AppError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                let body =
                    crate::templates::error_page("Error", "Something went wrong on our side.");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
            },
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
