//! Redis-Backend fuer den Session-Store
//!
//! Jeder Eintrag ist ein einfacher String-Key mit Ablaufzeit (`SET ... PX`).
//! Redis entfernt abgelaufene Keys selbst, ein Cleanup-Task ist nicht noetig.
//! `DEL` liefert die Anzahl entfernter Keys und ist pro Key atomar, damit
//! gewinnt bei gleichzeitigem Refresh genau ein Aufrufer.

use std::time::Duration;

use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::session::{SessionStore, SessionStoreError};

/// Session-Store auf Basis einer Redis-Verbindung
///
/// Der [`ConnectionManager`] verbindet sich nach Abbruechen selbst neu und
/// ist billig zu klonen; jeder Aufruf arbeitet auf einem eigenen Klon.
#[derive(Clone)]
pub struct RedisSessionStore {
    verbindung: ConnectionManager,
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore").finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Verbindet sich mit Redis (z.B. `redis://127.0.0.1:6379/0`) und prueft
    /// die Verbindung per `PING`.
    pub async fn verbinden(url: &str) -> Result<Self, SessionStoreError> {
        let client = Client::open(url).map_err(redis_fehler)?;
        let mut verbindung = ConnectionManager::new(client).await.map_err(redis_fehler)?;

        let _: String = redis::cmd("PING")
            .query_async(&mut verbindung)
            .await
            .map_err(redis_fehler)?;

        tracing::info!("Redis-Session-Store verbunden");
        Ok(Self { verbindung })
    }
}

impl SessionStore for RedisSessionStore {
    async fn setzen(&self, key: &str, wert: &str, ttl: Duration) -> Result<(), SessionStoreError> {
        let mut verbindung = self.verbindung.clone();
        let _: () = verbindung
            .pset_ex(key, wert, ttl_millis(ttl))
            .await
            .map_err(redis_fehler)?;
        Ok(())
    }

    async fn lesen(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let mut verbindung = self.verbindung.clone();
        verbindung.get(key).await.map_err(redis_fehler)
    }

    async fn loeschen(&self, key: &str) -> Result<bool, SessionStoreError> {
        let mut verbindung = self.verbindung.clone();
        let anzahl: u64 = verbindung.del(key).await.map_err(redis_fehler)?;
        Ok(anzahl > 0)
    }
}

/// TTL in Millisekunden; Redis lehnt 0 ab, daher mindestens 1
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn redis_fehler(e: redis::RedisError) -> SessionStoreError {
    SessionStoreError::NichtErreichbar(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_wird_in_millisekunden_umgerechnet() {
        assert_eq!(ttl_millis(Duration::from_secs(900)), 900_000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::ZERO), 1);
        assert_eq!(ttl_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn ungueltige_url_ist_nicht_erreichbar() {
        let fehler = RedisSessionStore::verbinden("kein-redis://").await.unwrap_err();
        assert!(matches!(fehler, SessionStoreError::NichtErreichbar(_)));
    }

    /// Braucht einen laufenden Redis-Server: `ZUGANG_TEST_REDIS=redis://127.0.0.1/ cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn setzen_lesen_loeschen_gegen_redis() {
        let url = std::env::var("ZUGANG_TEST_REDIS")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379/".into());
        let store = RedisSessionStore::verbinden(&url).await.unwrap();
        let key = format!("refresh:test-{}", uuid::Uuid::new_v4());

        store.setzen(&key, "42", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.lesen(&key).await.unwrap().as_deref(), Some("42"));

        assert!(store.loeschen(&key).await.unwrap());
        assert!(!store.loeschen(&key).await.unwrap());
        assert_eq!(store.lesen(&key).await.unwrap(), None);

        store.setzen(&key, "1", Duration::from_millis(50)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(store.lesen(&key).await.unwrap(), None);
    }
}
