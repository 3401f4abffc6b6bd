// =============================================================================
// GOOGLE SERVICE ACCOUNT AUTHENTICATION
// =============================================================================
//
// OAuth2 JWT-bearer flow for a Google service account:
//
// 1. Sign a JWT (RS256) with the account's private key, claiming the
//    spreadsheets scope with the token endpoint as audience.
// 2. POST it to the token endpoint and get back a short-lived access token.
// 3. Cache the token behind a `RwLock` until shortly before it expires.
//
// The spreadsheet must be shared with the service account's email.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    #[error("Token exchange failed: {0}")]
    Auth(String),

    #[error("Sheets request failed: {0}")]
    Http(String),

    #[error("Sheets API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected Sheets response: {0}")]
    Malformed(String),
}

/// Where the service account key comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceAccountSource {
    /// Path to the downloaded JSON key file.
    KeyFile(PathBuf),
    /// The JSON key file's content.
    Json(String),
    /// Email and PEM key given separately.
    Inline {
        client_email: String,
        private_key: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Anything that can hand out a bearer token for the Sheets API.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, SheetsError>;
}

pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    client: Client,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountAuth {
    pub async fn load(source: &ServiceAccountSource, client: Client) -> Result<Self, SheetsError> {
        let key = match source {
            ServiceAccountSource::KeyFile(path) => {
                let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                    SheetsError::Credentials(format!("cannot read {}: {}", path.display(), e))
                })?;
                parse_key(&content)?
            }
            ServiceAccountSource::Json(json) => parse_key(json)?,
            ServiceAccountSource::Inline {
                client_email,
                private_key,
            } => ServiceAccountKey {
                client_email: client_email.clone(),
                private_key: private_key.clone(),
                token_uri: default_token_uri(),
            },
        };

        // Fail at startup rather than on the first request.
        EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetsError::Credentials(format!("private key: {}", e)))?;

        Ok(Self {
            key,
            client,
            cached: Arc::new(RwLock::new(None)),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Point the token exchange somewhere else.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.key.token_uri = token_uri.into();
        self
    }

    async fn exchange(&self) -> Result<CachedToken, SheetsError> {
        let now = Utc::now();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| SheetsError::Credentials(e.to_string()))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| SheetsError::Auth(e.to_string()))?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SheetsError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Auth(format!("{}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::Auth(e.to_string()))?;

        tracing::debug!(account = %self.key.client_email, "Fetched Google access token");
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

fn parse_key(json: &str) -> Result<ServiceAccountKey, SheetsError> {
    serde_json::from_str(json).map_err(|e| SheetsError::Credentials(e.to_string()))
}

#[async_trait]
impl AccessTokenSource for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, SheetsError> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) {
                    return Ok(token.token.clone());
                }
            }
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *self.cached.write().await = Some(fresh);
        Ok(token)
    }
}
