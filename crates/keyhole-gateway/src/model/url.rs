use serde::{Deserialize, Serialize};

/// Form body of `POST /short` and `PUT /{id}`.
///
/// `longUrl` carries the target URL encoded as standard base64.
#[derive(Debug, Deserialize)]
pub struct LongUrlForm {
    #[serde(rename = "longUrl", default)]
    pub long_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUrlResponse {
    #[serde(rename = "ShortUrl")]
    pub short_url: String,
    #[serde(rename = "Code")]
    pub code: i32,
}
