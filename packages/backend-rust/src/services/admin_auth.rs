use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AdminConfig;

const ADMIN_TOKEN_TYPE: &str = "admin";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum AdminAuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
    #[error("token signing failed")]
    Signing,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AdminClaims {
    #[serde(rename = "type")]
    token_type: String,
    iat: i64,
    exp: i64,
}

/// Admin password check and HS256 bearer tokens for the admin routes.
pub struct AdminAuth {
    password: String,
    secret: Vec<u8>,
    ttl: Duration,
}

impl AdminAuth {
    pub fn new(config: &AdminConfig) -> Self {
        let secret = match &config.token_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                tracing::warn!("ADMIN_TOKEN_SECRET not set, admin tokens will not survive a restart");
                format!("{}{}", Uuid::new_v4(), Uuid::new_v4()).into_bytes()
            }
        };

        Self {
            password: config.password.clone(),
            secret,
            ttl: config.token_ttl,
        }
    }

    pub fn verify_password(&self, candidate: &str) -> Result<(), AdminAuthError> {
        // constant-time: both sides go through the MAC
        let expected = self.mac(self.password.as_bytes())?.finalize().into_bytes();
        self.mac(candidate.as_bytes())?
            .verify_slice(&expected)
            .map_err(|_| AdminAuthError::InvalidCredentials)
    }

    pub fn login(&self, candidate: &str) -> Result<AdminToken, AdminAuthError> {
        self.verify_password(candidate)?;
        self.issue_token(Utc::now())
    }

    pub fn issue_token(&self, issued_at: DateTime<Utc>) -> Result<AdminToken, AdminAuthError> {
        let ttl = chrono::Duration::from_std(self.ttl).map_err(|_| AdminAuthError::Signing)?;
        let expires_at = issued_at.checked_add_signed(ttl).ok_or(AdminAuthError::Signing)?;

        let header = serde_json::json!({ "alg": "HS256", "typ": "JWT" });
        let claims = AdminClaims {
            token_type: ADMIN_TOKEN_TYPE.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let header_b64 =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).map_err(|_| AdminAuthError::Signing)?);
        let payload_b64 =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).map_err(|_| AdminAuthError::Signing)?);
        let signing_input = format!("{header_b64}.{payload_b64}");

        let sig = self.mac(signing_input.as_bytes())?.finalize().into_bytes();
        let sig_b64 = URL_SAFE_NO_PAD.encode(sig);

        Ok(AdminToken {
            token: format!("{signing_input}.{sig_b64}"),
            expires_at,
        })
    }

    pub fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<(), AdminAuthError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(AdminAuthError::InvalidToken)?;
        let payload_b64 = parts.next().ok_or(AdminAuthError::InvalidToken)?;
        let sig_b64 = parts.next().ok_or(AdminAuthError::InvalidToken)?;
        if parts.next().is_some() {
            return Err(AdminAuthError::InvalidToken);
        }

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_b64.as_bytes())
            .map_err(|_| AdminAuthError::InvalidToken)?;
        let header: serde_json::Value =
            serde_json::from_slice(&header_bytes).map_err(|_| AdminAuthError::InvalidToken)?;
        if header.get("alg").and_then(|v| v.as_str()) != Some("HS256") {
            return Err(AdminAuthError::InvalidToken);
        }

        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig_b64.as_bytes())
            .map_err(|_| AdminAuthError::InvalidToken)?;
        let signing_input = format!("{header_b64}.{payload_b64}");
        self.mac(signing_input.as_bytes())?
            .verify_slice(&sig_bytes)
            .map_err(|_| AdminAuthError::InvalidToken)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64.as_bytes())
            .map_err(|_| AdminAuthError::InvalidToken)?;
        let claims: AdminClaims =
            serde_json::from_slice(&payload_bytes).map_err(|_| AdminAuthError::InvalidToken)?;
        if claims.token_type != ADMIN_TOKEN_TYPE {
            return Err(AdminAuthError::InvalidToken);
        }
        if claims.exp <= now.timestamp() {
            return Err(AdminAuthError::Expired);
        }

        Ok(())
    }

    fn mac(&self, data: &[u8]) -> Result<HmacSha256, AdminAuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|_| AdminAuthError::Signing)?;
        mac.update(data);
        Ok(mac)
    }
}
