// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Mobile pairing: one-time connect tokens with signed payloads.
//!
//! The QR the backend hands out is `{payload, signature}` where the
//! signature covers the canonical JSON of the payload. Redemption is
//! single-use, bounded by a 5-minute TTL and pinned to the requesting
//! user.

use config::utils::{json, rand::generate_random_string, time};
use dashmap::DashMap;
use infra::errors::{self, HttpError};
use once_cell::sync::Lazy;
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::infra::token_store::{ConnectToken, MemoryTokenStore, TokenStore};

// process-local by design; swap in a shared TTL store for multi-replica
// deployments
static CONNECT_TOKENS: Lazy<Box<dyn TokenStore>> =
    Lazy::new(|| Box::new(MemoryTokenStore::new()));

static SESSIONS: Lazy<DashMap<String, MobileSession>> = Lazy::new(DashMap::new);

const SESSION_TTL_MICROS: i64 = 30 * time::DAY_MICROS;

/// What the mobile app scans
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectGrant {
    #[schema(value_type = Object)]
    pub payload: json::Value,
    /// Raw R||S hex signature over the canonical payload
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MobileSession {
    pub session_token: String,
    pub user_id: String,
    /// Microseconds since epoch
    pub expires_at: i64,
}

pub async fn generate(user_id: &str) -> Result<ConnectGrant, errors::Error> {
    let cfg = config::get_config();
    let now = time::now_micros();
    CONNECT_TOKENS.purge_expired(now).await;

    let token = ConnectToken {
        token: generate_random_string(32),
        user_id: user_id.to_string(),
        nonce: generate_random_string(16),
        expires_at: now + (cfg.auth.connect_token_ttl_secs as i64) * time::MICROS_PER_SEC,
    };

    let payload = json::json!({
        "connect_token": token.token,
        "nonce": token.nonce,
        "expires_at": token.expires_at / time::MICROS_PER_SEC,
        "instance_id": cfg.common.instance_id,
    });
    let signature = super::sign_canonical(&payload)?;

    CONNECT_TOKENS.insert(token).await;
    Ok(ConnectGrant { payload, signature })
}

/// Redeem a connect token and mint a mobile session. The token must
/// still be in the store, unexpired, and owned by the redeeming user.
pub async fn verify(connect_token: &str, user_id: &str) -> Result<MobileSession, errors::Error> {
    let now = time::now_micros();
    let Some(token) = CONNECT_TOKENS.take(connect_token).await else {
        return Err(
            HttpError::Unauthenticated("unknown or already used connect token".to_string()).into(),
        );
    };
    if token.is_expired(now) {
        return Err(HttpError::Unauthenticated("connect token expired".to_string()).into());
    }
    if token.user_id != user_id {
        return Err(HttpError::Forbidden(
            "connect token belongs to a different user".to_string(),
        )
        .into());
    }

    let session = MobileSession {
        session_token: generate_random_string(48),
        user_id: user_id.to_string(),
        expires_at: now + SESSION_TTL_MICROS,
    };
    SESSIONS.insert(session.session_token.clone(), session.clone());
    Ok(session)
}

pub fn session_user(session_token: &str) -> Option<String> {
    let session = SESSIONS.get(session_token)?;
    if time::now_micros() >= session.expires_at {
        drop(session);
        SESSIONS.remove(session_token);
        return None;
    }
    Some(session.user_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_token(user_id: &str, expires_at: i64) -> String {
        let token = ConnectToken {
            token: generate_random_string(32),
            user_id: user_id.to_string(),
            nonce: generate_random_string(16),
            expires_at,
        };
        let id = token.token.clone();
        CONNECT_TOKENS.insert(token).await;
        id
    }

    #[tokio::test]
    async fn test_verify_is_single_use() {
        let id = seed_token("u1", i64::MAX).await;
        assert!(verify(&id, "u1").await.is_ok());
        // second redemption fails
        assert!(verify(&id, "u1").await.is_err());
    }

    #[tokio::test]
    async fn test_verify_rejects_expired() {
        let id = seed_token("u1", 1).await;
        assert!(verify(&id, "u1").await.is_err());
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_user() {
        let id = seed_token("u1", i64::MAX).await;
        let err = verify(&id, "u2").await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_session_lookup() {
        let id = seed_token("u1", i64::MAX).await;
        let session = verify(&id, "u1").await.unwrap();
        assert_eq!(session_user(&session.session_token).as_deref(), Some("u1"));
        assert_eq!(session_user("bogus"), None);
    }
}
