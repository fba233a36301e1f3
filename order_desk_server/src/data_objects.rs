use ods_common::Secret;
use serde::{Deserialize, Serialize};

/// A resource decorated with its own absolute URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Linked<T> {
    pub url: String,
    #[serde(flatten)]
    pub inner: T,
}

impl<T> Linked<T> {
    pub fn new(url: String, inner: T) -> Self {
        Self { url, inner }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Token lifetime, in seconds
    pub expires_in: i64,
}
