//! Session-Store fuer Refresh-Tokens
//!
//! Der Auth-Service kennt nur den [`SessionStore`]-Trait: ein Key/Value-Store
//! mit TTL pro Schluessel. [`MemorySessionStore`] ist die mitgelieferte
//! In-Memory-Implementierung (HashMap hinter einem RwLock), fuer den
//! persistenten Betrieb gibt es [`RedisSessionStore`](crate::redis_store::RedisSessionStore).
//!
//! Einmaligkeit eines Refresh-Tokens haengt an [`SessionStore::loeschen`]:
//! von mehreren gleichzeitigen Loeschaufrufen fuer denselben Schluessel
//! meldet genau einer `true`.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use thiserror::Error;
use tokio::sync::RwLock;

/// Fehler des Session-Store-Backends
///
/// Ein fehlender Schluessel ist kein Fehler, sondern `Ok(None)`.
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    #[error("Session-Store nicht erreichbar: {0}")]
    NichtErreichbar(String),
}

/// Key/Value-Store mit TTL pro Eintrag
#[allow(async_fn_in_trait)]
pub trait SessionStore: Send + Sync {
    /// Setzt oder ueberschreibt einen Eintrag. Nach `ttl` verschwindet er von selbst.
    async fn setzen(&self, key: &str, wert: &str, ttl: Duration) -> Result<(), SessionStoreError>;

    /// Liest einen Eintrag (`None` = nie gesetzt oder abgelaufen)
    async fn lesen(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    /// Loescht einen Eintrag atomar.
    ///
    /// `Ok(true)` wenn dieser Aufruf einen gueltigen Eintrag entfernt hat,
    /// `Ok(false)` wenn keiner (mehr) vorhanden war. Beides ist kein Fehler.
    async fn loeschen(&self, key: &str) -> Result<bool, SessionStoreError>;
}

#[derive(Debug, Clone)]
struct Eintrag {
    wert: String,
    laeuft_ab_am: Instant,
}

impl Eintrag {
    fn ist_gueltig(&self, jetzt: Instant) -> bool {
        jetzt < self.laeuft_ab_am
    }
}

/// In-Memory Session-Store mit TTL-Unterstuetzung
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    /// key -> Eintrag
    eintraege: RwLock<HashMap<String, Eintrag>>,
}

impl MemorySessionStore {
    /// Erstellt einen neuen leeren Session-Store
    pub fn neu() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Startet den periodischen Cleanup-Task fuer einen bestehenden Store
    ///
    /// Abgelaufene Eintraege sind auch ohne Cleanup nicht mehr lesbar; der
    /// Task gibt nur den Speicher frei.
    pub fn mit_cleanup(store: Arc<Self>, intervall: Duration) -> Arc<Self> {
        let store_klon = Arc::clone(&store);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(intervall);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let entfernt = store_klon.cleanup_abgelaufene().await;
                if entfernt > 0 {
                    tracing::debug!(anzahl = entfernt, "Abgelaufene Sessions bereinigt");
                }
            }
        });
        store
    }

    /// Bereinigt abgelaufene Eintraege und gibt deren Anzahl zurueck
    pub async fn cleanup_abgelaufene(&self) -> usize {
        let jetzt = Instant::now();
        let mut eintraege = self.eintraege.write().await;
        let vorher = eintraege.len();
        eintraege.retain(|_, e| e.ist_gueltig(jetzt));
        vorher - eintraege.len()
    }

    /// Gibt die Anzahl der aktiven (nicht abgelaufenen) Eintraege zurueck
    pub async fn anzahl_aktive(&self) -> usize {
        let jetzt = Instant::now();
        let eintraege = self.eintraege.read().await;
        eintraege.values().filter(|e| e.ist_gueltig(jetzt)).count()
    }
}

impl SessionStore for MemorySessionStore {
    async fn setzen(&self, key: &str, wert: &str, ttl: Duration) -> Result<(), SessionStoreError> {
        let laeuft_ab_am = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| SessionStoreError::NichtErreichbar("TTL zu gross".into()))?;

        self.eintraege.write().await.insert(
            key.to_string(),
            Eintrag {
                wert: wert.to_string(),
                laeuft_ab_am,
            },
        );
        Ok(())
    }

    async fn lesen(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let jetzt = Instant::now();
        {
            let eintraege = self.eintraege.read().await;
            match eintraege.get(key) {
                None => return Ok(None),
                Some(e) if e.ist_gueltig(jetzt) => return Ok(Some(e.wert.clone())),
                Some(_) => {}
            }
        }

        // Abgelaufen: beim Lesen entfernen, falls nicht inzwischen neu gesetzt
        let mut eintraege = self.eintraege.write().await;
        if eintraege.get(key).is_some_and(|e| !e.ist_gueltig(Instant::now())) {
            eintraege.remove(key);
        }
        Ok(None)
    }

    async fn loeschen(&self, key: &str) -> Result<bool, SessionStoreError> {
        let entfernt = self.eintraege.write().await.remove(key);
        Ok(entfernt.is_some_and(|e| e.ist_gueltig(Instant::now())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn setzen_und_lesen() {
        let store = MemorySessionStore::neu();
        store.setzen("refresh:a", "42", MINUTE).await.unwrap();

        assert_eq!(store.lesen("refresh:a").await.unwrap().as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn unbekannter_schluessel_ist_none() {
        let store = MemorySessionStore::neu();
        assert_eq!(store.lesen("refresh:unbekannt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn eintrag_laeuft_ab() {
        let store = MemorySessionStore::neu();
        store
            .setzen("refresh:kurz", "1", Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.lesen("refresh:kurz").await.unwrap(), None);
        assert_eq!(store.anzahl_aktive().await, 0);
    }

    #[tokio::test]
    async fn setzen_ueberschreibt() {
        let store = MemorySessionStore::neu();
        store.setzen("k", "1", MINUTE).await.unwrap();
        store.setzen("k", "2", MINUTE).await.unwrap();

        assert_eq!(store.lesen("k").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn loeschen_ist_idempotent() {
        let store = MemorySessionStore::neu();
        store.setzen("k", "1", MINUTE).await.unwrap();

        assert!(store.loeschen("k").await.unwrap());
        assert!(!store.loeschen("k").await.unwrap());
        assert!(!store.loeschen("nie_gesetzt").await.unwrap());
        assert_eq!(store.lesen("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn abgelaufener_eintrag_zaehlt_nicht_als_geloescht() {
        let store = MemorySessionStore::neu();
        store.setzen("k", "1", Duration::from_millis(10)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!store.loeschen("k").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn gleichzeitiges_loeschen_gewinnt_genau_einmal() {
        for _ in 0..50 {
            let store = MemorySessionStore::neu();
            store.setzen("refresh:x", "1", MINUTE).await.unwrap();

            let aufgaben: Vec<_> = (0..8)
                .map(|_| {
                    let store = Arc::clone(&store);
                    tokio::spawn(async move { store.loeschen("refresh:x").await.unwrap() })
                })
                .collect();

            let mut gewonnen = 0;
            for a in aufgaben {
                if a.await.unwrap() {
                    gewonnen += 1;
                }
            }
            assert_eq!(gewonnen, 1);
        }
    }

    #[tokio::test]
    async fn cleanup_entfernt_nur_abgelaufene() {
        let store = MemorySessionStore::neu();
        store.setzen("alt", "1", Duration::from_millis(10)).await.unwrap();
        store.setzen("neu", "2", MINUTE).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.cleanup_abgelaufene().await, 1);
        assert_eq!(store.anzahl_aktive().await, 1);
    }
}
