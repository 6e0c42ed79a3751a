use crate::auth::BasicCredentials;
use crate::error::{AppError, Result};
use crate::model::{CreateUrlResponse, LongUrlForm};
use crate::state::AppState;
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// `Code` value of a successful create response.
const CREATED_CODE: i32 = 1;

pub async fn create_url_handler(
    State(state): State<AppState>,
    form: std::result::Result<Form<LongUrlForm>, FormRejection>,
) -> Result<Json<CreateUrlResponse>> {
    let Form(form) = form?;
    let long_url = decode_long_url(form.long_url)?;
    let created = state.shortener().create(&long_url).await?;

    Ok(Json(CreateUrlResponse {
        short_url: created.to_url(state.base_url()),
        code: CREATED_CODE,
    }))
}

pub async fn redirect_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    credentials: BasicCredentials,
) -> Result<Response> {
    ensure_owner(&short_id, &credentials)?;

    let target = state
        .shortener()
        .resolve(&credentials.username, &credentials.password)
        .await?;
    let location =
        HeaderValue::from_str(&target).map_err(|_| AppError::InvalidRedirectTarget)?;

    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}

pub async fn update_url_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    credentials: BasicCredentials,
    form: std::result::Result<Form<LongUrlForm>, FormRejection>,
) -> Result<StatusCode> {
    ensure_owner(&short_id, &credentials)?;
    let Form(form) = form?;

    let long_url = decode_long_url(form.long_url)?;
    let long_url = String::from_utf8(long_url)
        .map_err(|_| AppError::BadEncoding("decoded url is not valid UTF-8".to_string()))?;

    state
        .shortener()
        .update(&credentials.username, &credentials.password, &long_url)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_url_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    credentials: BasicCredentials,
) -> Result<StatusCode> {
    ensure_owner(&short_id, &credentials)?;

    state
        .shortener()
        .delete(&credentials.username, &credentials.password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn ensure_owner(short_id: &str, credentials: &BasicCredentials) -> Result<()> {
    if credentials.username == short_id {
        Ok(())
    } else {
        Err(AppError::CredentialMismatch)
    }
}

/// Decodes the base64 `longUrl` form field.
///
/// Clients that forget to percent-encode `+` have it turned into a space by
/// form decoding, so spaces are read back as `+`.
fn decode_long_url(field: Option<String>) -> Result<Vec<u8>> {
    let field = field.ok_or(AppError::MissingLongUrl)?;
    let field = field.trim().replace(' ', "+");

    STANDARD
        .decode(field.as_bytes())
        .map_err(|e| AppError::BadEncoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_standard_base64() {
        let encoded = STANDARD.encode("https://example.com/?q=1");
        assert_eq!(
            decode_long_url(Some(encoded)).unwrap(),
            b"https://example.com/?q=1"
        );
    }

    #[test]
    fn restores_plus_signs_lost_in_form_decoding() {
        // "~~~>" encodes to "fn5+Pg==".
        let encoded = STANDARD.encode("~~~>");
        assert!(encoded.contains('+'));
        let mangled = encoded.replace('+', " ");
        assert_eq!(decode_long_url(Some(mangled)).unwrap(), b"~~~>");
    }

    #[test]
    fn rejects_missing_and_invalid_fields() {
        assert!(matches!(decode_long_url(None), Err(AppError::MissingLongUrl)));
        assert!(matches!(
            decode_long_url(Some("not base64!".to_string())),
            Err(AppError::BadEncoding(_))
        ));
    }
}
