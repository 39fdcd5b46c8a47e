//! Single-admin authentication: Argon2 password check and signed bearer tokens.

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::config::AdminCredentials;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const ADMIN_ROLE: &str = "admin";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Token is not an admin token")]
    NotAdmin,
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("Password hash error: {0}")]
    Hash(String),
    #[error("Token lifetime of {0} days is out of range")]
    Lifetime(i64),
}

/// Claims carried by an admin token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies admin tokens for the one configured admin identity.
pub struct AdminAuth {
    username: String,
    password_hash: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl AdminAuth {
    /// Builds the authenticator, rejecting a malformed password hash up front.
    pub fn new(credentials: &AdminCredentials) -> Result<Self, AuthError> {
        PasswordHash::new(&credentials.password_hash).map_err(|e| AuthError::Hash(e.to_string()))?;

        let ttl = Duration::try_days(credentials.token_ttl_days)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or(AuthError::Lifetime(credentials.token_ttl_days))?;

        let secret = credentials.jwt_secret.as_bytes();
        let mut validation = Validation::default();
        validation.leeway = 0;

        Ok(Self {
            username: credentials.username.clone(),
            password_hash: credentials.password_hash.clone(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Checks the admin credentials and returns a fresh token.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if username != self.username {
            debug!("Login attempt for unknown user");
            return Err(AuthError::InvalidCredentials);
        }

        let parsed = PasswordHash::new(&self.password_hash)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        if Argon2::default().verify_password(password.as_bytes(), &parsed).is_err() {
            debug!("Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_token()
    }

    /// Issues a token for the admin, valid for the configured TTL.
    pub fn issue_token(&self) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: self.username.clone(),
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .ok_or(AuthError::Lifetime(self.ttl.num_days()))?
                .timestamp(),
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(&Header::default(), claims, &self.encoding_key)?)
    }

    /// Verifies signature and expiry, then that the token belongs to the admin.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.role != ADMIN_ROLE || claims.sub != self.username {
            return Err(AuthError::NotAdmin);
        }

        Ok(claims)
    }
}

/// Hashes a password into an Argon2 PHC string for the config file.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
fn bearer_token(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Rejects requests without a valid admin token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ApiError::Unauthorized("No token"))?;

    match state.auth.verify(token) {
        Ok(claims) => {
            debug!("Admin request authorised for {}", claims.sub);
            Ok(next.run(request).await)
        }
        Err(e) => {
            debug!("Rejected admin token: {}", e);
            Err(ApiError::Unauthorized("Invalid token"))
        }
    }
}
