//! Service-account authorization for the Google APIs
//!
//! The key is a JSON blob supplied through an environment variable. It is
//! exchanged for a short-lived bearer token using the OAuth 2.0 JWT bearer
//! grant: an RS256-signed assertion is posted to the key's `token_uri`.

use crate::sink::traits::{SinkError, SinkResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OAuth scopes needed to find a spreadsheet by name and append to it
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a service-account key file that the token exchange uses
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parses a key from its JSON text
    pub fn from_json(json: &str) -> SinkResult<Self> {
        serde_json::from_str(json).map_err(|e| SinkError::InvalidCredential(e.to_string()))
    }

    /// Reads and parses the key from an environment variable
    ///
    /// # Returns
    ///
    /// * `Err(SinkError::MissingCredential)` - Variable unset or blank
    /// * `Err(SinkError::InvalidCredential)` - Variable is not a key
    pub fn from_env(var: &str) -> SinkResult<Self> {
        match std::env::var(var) {
            Ok(json) if !json.trim().is_empty() => Self::from_json(&json),
            _ => Err(SinkError::MissingCredential(var.to_string())),
        }
    }
}

/// Claim set of the signed assertion
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges a service-account key for access tokens
#[derive(Clone)]
pub struct TokenProvider {
    client: Client,
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl TokenProvider {
    /// Creates a provider; fails if the private key is not a valid RSA PEM
    pub fn new(key: &ServiceAccountKey, client: Client) -> SinkResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SinkError::InvalidCredential(format!("private_key: {}", e)))?;

        Ok(Self {
            client,
            client_email: key.client_email.clone(),
            key_id: key.private_key_id.clone(),
            token_uri: key.token_uri.clone(),
            encoding_key,
        })
    }

    /// Builds the RS256 assertion, valid for one hour from `now`
    pub fn signed_assertion(&self, now: DateTime<Utc>) -> SinkResult<String> {
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| SinkError::InvalidCredential(format!("signing failed: {}", e)))
    }

    /// Fetches a fresh bearer token
    pub async fn access_token(&self) -> SinkResult<String> {
        let assertion = self.signed_assertion(Utc::now())?;

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SinkError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Auth(format!(
                "token endpoint returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SinkError::Auth(format!("malformed token response: {}", e)))?;

        tracing::debug!(
            "Obtained access token for {} (expires in {:?}s)",
            self.client_email,
            token.expires_in
        );

        Ok(token.access_token)
    }
}
