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

//! Single-use connect tokens for mobile pairing.
//!
//! The default store is process-local, which limits pairing to
//! single-replica deployments. The trait exists so a shared TTL store
//! (Redis, NATS KV) can replace it without API changes.

use async_trait::async_trait;
use dashmap::DashMap;

/// One pending pairing token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectToken {
    pub token: String,
    pub user_id: String,
    pub nonce: String,
    /// Microseconds since epoch
    pub expires_at: i64,
}

impl ConnectToken {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: ConnectToken);
    /// Remove and return, making every token single-use
    async fn take(&self, token: &str) -> Option<ConnectToken>;
    async fn purge_expired(&self, now: i64);
}

#[derive(Default)]
pub struct MemoryTokenStore {
    entries: DashMap<String, ConnectToken>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn insert(&self, token: ConnectToken) {
        self.entries.insert(token.token.clone(), token);
    }

    async fn take(&self, token: &str) -> Option<ConnectToken> {
        self.entries.remove(token).map(|(_, v)| v)
    }

    async fn purge_expired(&self, now: i64) {
        self.entries.retain(|_, v| !v.is_expired(now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: &str, expires_at: i64) -> ConnectToken {
        ConnectToken {
            token: id.to_string(),
            user_id: "u1".to_string(),
            nonce: "n".to_string(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_single_use() {
        let store = MemoryTokenStore::new();
        store.insert(token("t1", i64::MAX)).await;
        assert!(store.take("t1").await.is_some());
        assert!(store.take("t1").await.is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryTokenStore::new();
        store.insert(token("live", i64::MAX)).await;
        store.insert(token("dead", 1)).await;
        store.purge_expired(2).await;
        assert_eq!(store.len(), 1);
        assert!(store.take("live").await.is_some());
    }
}
