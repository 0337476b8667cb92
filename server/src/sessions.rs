//! Auswahl des Session-Store-Backends zur Laufzeit
//!
//! Der AuthService ist generisch ueber seinen Store; der Server legt sich
//! auf [`SessionBackend`] fest und entscheidet per Konfiguration.

use std::{sync::Arc, time::Duration};

use zugang_auth::{MemorySessionStore, RedisSessionStore, SessionStore, SessionStoreError};

use crate::config::{ServerConfig, SessionBackendArt};

/// Konfiguriertes Session-Store-Backend
#[derive(Debug, Clone)]
pub enum SessionBackend {
    Speicher(Arc<MemorySessionStore>),
    Redis(RedisSessionStore),
}

impl SessionBackend {
    /// Baut das Backend laut `[sessions]`. Der Speicher-Store bekommt einen
    /// Cleanup-Task, Redis laesst Keys selbst ablaufen.
    pub async fn aufbauen(config: &ServerConfig) -> anyhow::Result<Self> {
        match config.sessions.backend {
            SessionBackendArt::Speicher => {
                tracing::warn!(
                    "Session-Store im Prozessspeicher: Refresh-Sessions gehen beim Neustart verloren"
                );
                Ok(Self::Speicher(MemorySessionStore::mit_cleanup(
                    MemorySessionStore::neu(),
                    config.session_cleanup_intervall(),
                )))
            }
            SessionBackendArt::Redis => {
                let store = RedisSessionStore::verbinden(&config.sessions.redis_url)
                    .await
                    .map_err(|e| anyhow::anyhow!("Redis nicht erreichbar: {e}"))?;
                Ok(Self::Redis(store))
            }
        }
    }

    /// Kurzname fuer Logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Speicher(_) => "speicher",
            Self::Redis(_) => "redis",
        }
    }
}

impl SessionStore for SessionBackend {
    async fn setzen(&self, key: &str, wert: &str, ttl: Duration) -> Result<(), SessionStoreError> {
        match self {
            Self::Speicher(s) => s.setzen(key, wert, ttl).await,
            Self::Redis(s) => s.setzen(key, wert, ttl).await,
        }
    }

    async fn lesen(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        match self {
            Self::Speicher(s) => s.lesen(key).await,
            Self::Redis(s) => s.lesen(key).await,
        }
    }

    async fn loeschen(&self, key: &str) -> Result<bool, SessionStoreError> {
        match self {
            Self::Speicher(s) => s.loeschen(key).await,
            Self::Redis(s) => s.loeschen(key).await,
        }
    }
}
