use crate::error::AppError;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Credentials taken from an `Authorization: Basic ...` header.
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BasicCredentials {
    /// Parses the value of an `Authorization` header.
    pub fn parse(header: &str) -> Result<Self, AppError> {
        let (scheme, encoded) = header
            .trim()
            .split_once(' ')
            .ok_or_else(|| AppError::MalformedCredentials("missing scheme".to_string()))?;

        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AppError::MalformedCredentials(format!(
                "unsupported scheme '{scheme}'"
            )));
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::MalformedCredentials(format!("invalid base64: {e}")))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| AppError::MalformedCredentials("not valid UTF-8".to_string()))?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or_else(|| AppError::MalformedCredentials("missing ':' separator".to_string()))?;

        Ok(Self {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BasicCredentials {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AppError::MissingCredentials)?
            .to_str()
            .map_err(|_| AppError::MalformedCredentials("header is not ASCII".to_string()))?;

        Self::parse(header)
    }
}
