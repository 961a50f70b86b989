//! RS256 token issuance.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use common::{AppError, AppResult};
use domain::{Account, MILLIS_PER_SECOND, TOKEN_ISSUER, TOKEN_TYPE_BEARER};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account email
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Role names held when the token was issued
    #[serde(rename = "userRoles")]
    pub user_roles: Vec<String>,
}

/// Token response returned after successful authentication
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 3600)]
    pub expires_in: i64,
}

/// Signs access tokens with the service's private key.
///
/// Only the private half lives here; verifiers get the public key out of band.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl_ms: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("key", &"[REDACTED]")
            .field("ttl_ms", &self.ttl_ms)
            .finish()
    }
}

impl TokenIssuer {
    /// Build an issuer from a PEM-encoded RSA private key.
    ///
    /// A throwaway token is signed before returning, so a key that parses but
    /// cannot sign is rejected here instead of on the first login.
    ///
    /// # Errors
    /// `AppError::Configuration` for unparseable or unusable key material,
    /// or a non-positive TTL.
    pub fn from_pem(pem: &str, ttl_ms: i64) -> AppResult<Self> {
        if ttl_ms <= 0 {
            return Err(AppError::configuration("token TTL must be positive"));
        }

        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AppError::configuration(format!("invalid RSA private key: {}", e)))?;

        let issuer = Self { key, ttl_ms };
        issuer
            .sign(&issuer.claims_for("startup-check", "startup-check", Vec::new()))
            .map_err(|e| AppError::configuration(format!("RSA private key cannot sign: {}", e)))?;

        Ok(issuer)
    }

    /// Token lifetime in milliseconds
    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    /// Issue a token for the account's current email and roles.
    pub fn issue(&self, account: &Account) -> AppResult<TokenResponse> {
        let claims = self.claims_for(
            &account.email,
            &account.id.to_string(),
            account.roles.to_vec(),
        );
        let token = self.sign(&claims)?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.ttl_ms / MILLIS_PER_SECOND,
        })
    }

    fn claims_for(&self, subject: &str, user_id: &str, roles: Vec<String>) -> Claims {
        let now = Utc::now();
        let expires_at = now + Duration::milliseconds(self.ttl_ms);

        Claims {
            sub: subject.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            user_id: user_id.to_string(),
            user_roles: roles,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::RS256), claims, &self.key)
    }
}
