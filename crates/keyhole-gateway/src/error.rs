use crate::model::ErrorResponse;
use axum::extract::rejection::FormRejection;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keyhole_core::MappingError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

const BASIC_CHALLENGE: &str = "Basic realm=\"keyhole\"";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("malformed credentials: {0}")]
    MalformedCredentials(String),
    #[error("credentials do not belong to this short url")]
    CredentialMismatch,
    #[error("invalid form body: {message}")]
    InvalidForm { status: StatusCode, message: String },
    #[error("missing longUrl parameter")]
    MissingLongUrl,
    #[error("longUrl is not valid base64: {0}")]
    BadEncoding(String),
    #[error("stored url cannot be used as a redirect target")]
    InvalidRedirectTarget,
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCredentials
            | AppError::MalformedCredentials(_)
            | AppError::CredentialMismatch => StatusCode::UNAUTHORIZED,
            AppError::InvalidForm { status, .. } => *status,
            AppError::MissingLongUrl | AppError::BadEncoding(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidRedirectTarget => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Mapping(e) => match e {
                MappingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                MappingError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                MappingError::NotFound => StatusCode::NOT_FOUND,
                MappingError::Unauthorized => StatusCode::UNAUTHORIZED,
                MappingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::InvalidForm {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage details stay in the logs.
        let message = match &self {
            AppError::Mapping(MappingError::Store(e)) => {
                error!(error = %e, "storage failure while handling request");
                "failed to access the url store".to_string()
            }
            AppError::InvalidRedirectTarget => {
                error!("stored url is not a valid Location header");
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse { error: message });
        if status == StatusCode::UNAUTHORIZED {
            (status, [(WWW_AUTHENTICATE, BASIC_CHALLENGE)], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyhole_core::StorageError;

    #[test]
    fn maps_mapping_errors_to_statuses() {
        let cases = [
            (MappingError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (
                MappingError::TooLarge { len: 2, max: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (MappingError::NotFound, StatusCode::NOT_FOUND),
            (MappingError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                MappingError::Store(StorageError::Unavailable("disk".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(AppError::from(error).into_response().status(), expected);
        }
    }

    #[test]
    fn unauthorized_carries_challenge() {
        let response = AppError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], BASIC_CHALLENGE);

        let response = AppError::BadEncoding("x".into()).into_response();
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }
}
