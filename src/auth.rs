//! Service account authentication with domain-wide delegation.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DriveError, Result};
use crate::models::{ServiceAccountCredentials, TokenResponse};

/// Google OAuth2 token endpoint.
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 grant used for signed service account assertions.
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Google Drive API scope.
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// JWT claims for service account authentication.
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    /// The account being impersonated.
    sub: String,
    scope: String,
    aud: String,
    exp: u64,
    iat: u64,
}

/// Tokens this close to expiry are refreshed instead of reused.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime requested for each signed assertion.
const ASSERTION_TTL_SECS: u64 = 3600;

/// An access token and the moment it stops being valid.
#[derive(Clone)]
struct AccessToken {
    value: String,
    expires_at: SystemTime,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > SystemTime::now() + EXPIRY_MARGIN
    }
}

/// Authenticator that acts as `subject` through a service account.
///
/// The service account needs domain-wide delegation for the Drive scope,
/// otherwise the token endpoint rejects the `sub` claim.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<ServiceAccountCredentials>,
    subject: String,
    client: Client,
    cached_token: Arc<RwLock<Option<AccessToken>>>,
}

impl Authenticator {
    /// Load a service account JSON key and impersonate `subject`.
    pub fn from_file<P: AsRef<Path>>(path: P, subject: impl Into<String>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let credentials: ServiceAccountCredentials = serde_json::from_str(&content)?;
        Ok(Self::new(credentials, subject))
    }

    pub fn new(credentials: ServiceAccountCredentials, subject: impl Into<String>) -> Self {
        Self {
            credentials: Arc::new(credentials),
            subject: subject.into(),
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// The impersonated account.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// A bearer token for `subject`, minted again once the cached one is
    /// about to expire.
    pub async fn get_access_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token.read().await.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let mut cached = self.cached_token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.refresh_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn claims(&self, now: u64) -> Claims {
        Claims {
            iss: self.credentials.client_email.clone(),
            sub: self.subject.clone(),
            scope: DRIVE_SCOPE.to_string(),
            aud: self.token_uri().to_string(),
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        }
    }

    fn token_uri(&self) -> &str {
        self.credentials.token_uri.as_deref().unwrap_or(TOKEN_URI)
    }

    /// Exchange a signed assertion for a fresh access token.
    async fn refresh_token(&self) -> Result<AccessToken> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DriveError::AuthenticationError(e.to_string()))?
            .as_secs();

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())?;
        let jwt = encode(&header, &self.claims(now), &key)?;

        debug!(subject = %self.subject, "requesting access token");
        let response = self
            .client
            .post(self.token_uri())
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", jwt.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::TokenRefreshError(format!(
                "token endpoint answered {} for {}: {}",
                status, self.subject, body
            )));
        }

        let granted: TokenResponse = response.json().await?;
        Ok(AccessToken {
            value: granted.access_token,
            expires_at: SystemTime::now() + Duration::from_secs(granted.expires_in),
        })
    }
}

/// Where the client gets its bearer token from.
#[derive(Clone)]
pub enum TokenSource {
    ServiceAccount(Authenticator),
    /// A fixed token, e.g. one minted out of band.
    Static(String),
}

impl TokenSource {
    pub async fn access_token(&self) -> Result<String> {
        match self {
            TokenSource::ServiceAccount(auth) => auth.get_access_token().await,
            TokenSource::Static(token) => Ok(token.clone()),
        }
    }
}

impl From<Authenticator> for TokenSource {
    fn from(auth: Authenticator) -> Self {
        TokenSource::ServiceAccount(auth)
    }
}
