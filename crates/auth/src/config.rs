//! Konfiguration des Auth-Service
//!
//! Wird vom einbettenden Prozess injiziert; dieses Crate liest selbst keine
//! Dateien oder Umgebungsvariablen.

use std::time::Duration;

use crate::{
    error::{AuthError, AuthResult},
    password::HashKosten,
    refresh_token::{MIN_REFRESH_TOKEN_BYTES, REFRESH_TOKEN_BYTES},
};

/// Standard-Lebensdauer der Access-Tokens: 15 Minuten
pub const STANDARD_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);

/// Standard-Lebensdauer der Refresh-Tokens: 30 Tage
pub const STANDARD_REFRESH_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Standard-Zeitlimit pro Aufruf an Datenbank oder Session-Store
pub const STANDARD_ZEITLIMIT: Duration = Duration::from_secs(3);

/// Vollstaendige Konfiguration des Auth-Service
#[derive(Clone)]
pub struct AuthKonfig {
    /// Symmetrisches Secret fuer die Access-Token-Signatur
    pub token_secret: Vec<u8>,
    /// Lebensdauer der Access-Tokens
    pub access_ttl: Duration,
    /// Lebensdauer der Refresh-Sessions im Store
    pub refresh_ttl: Duration,
    /// Zeitlimit pro Kollaborateur-Aufruf
    pub zeitlimit: Duration,
    /// Laenge der Refresh-Tokens in Bytes
    pub refresh_token_bytes: usize,
    /// Argon2id-Kosten
    pub hash_kosten: HashKosten,
}

impl std::fmt::Debug for AuthKonfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthKonfig")
            .field("token_secret", &"<verborgen>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("zeitlimit", &self.zeitlimit)
            .field("refresh_token_bytes", &self.refresh_token_bytes)
            .field("hash_kosten", &self.hash_kosten)
            .finish()
    }
}

impl AuthKonfig {
    /// Erstellt eine Konfiguration mit Standardwerten fuer alles ausser dem Secret
    pub fn neu(token_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            token_secret: token_secret.into(),
            access_ttl: STANDARD_ACCESS_TTL,
            refresh_ttl: STANDARD_REFRESH_TTL,
            zeitlimit: STANDARD_ZEITLIMIT,
            refresh_token_bytes: REFRESH_TOKEN_BYTES,
            hash_kosten: HashKosten::default(),
        }
    }

    /// Validiert die Konfiguration
    ///
    /// Eine Refresh-TTL gleich der Access-TTL ist erlaubt, aber vermutlich ein
    /// Konfigurationsfehler: beide Tokens laufen dann gleichzeitig ab.
    pub fn pruefen(&self) -> AuthResult<()> {
        if self.token_secret.is_empty() {
            return Err(AuthError::Konfiguration("Token-Secret ist leer".into()));
        }
        if self.access_ttl.is_zero() {
            return Err(AuthError::Konfiguration("Access-TTL muss groesser 0 sein".into()));
        }
        if self.zeitlimit.is_zero() {
            return Err(AuthError::Konfiguration("Zeitlimit muss groesser 0 sein".into()));
        }
        if self.refresh_ttl < self.access_ttl {
            return Err(AuthError::Konfiguration(format!(
                "Refresh-TTL ({}s) kuerzer als Access-TTL ({}s)",
                self.refresh_ttl.as_secs(),
                self.access_ttl.as_secs()
            )));
        }
        if self.refresh_ttl == self.access_ttl {
            tracing::warn!(
                ttl_sekunden = self.refresh_ttl.as_secs(),
                "Refresh-TTL gleich Access-TTL: Refresh-Tokens verlieren ihren Zweck"
            );
        }
        if self.refresh_token_bytes < MIN_REFRESH_TOKEN_BYTES {
            return Err(AuthError::Konfiguration(format!(
                "Refresh-Token muss mindestens {MIN_REFRESH_TOKEN_BYTES} Bytes haben"
            )));
        }
        Ok(())
    }
}
