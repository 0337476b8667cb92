//! Kurzlebige, selbst-verifizierende Access-Tokens (JWT, HS256)
//!
//! Access-Tokens werden serverseitig nie gespeichert. Gueltigkeit ergibt sich
//! allein aus Signatur und `exp`-Claim; widerrufen werden sie nur durch Ablauf.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use zugang_core::UserId;

/// Fehler bei Ausstellung oder Pruefung eines Access-Tokens
///
/// `Abgelaufen` ist der erwartete Normalfall vor einem Refresh, die anderen
/// Arten deuten auf Manipulation oder Beschaedigung hin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenFehler {
    #[error("Token nicht dekodierbar")]
    Fehlerhaft,

    #[error("Signatur ungueltig")]
    UngueltigeSignatur,

    #[error("Token abgelaufen")]
    Abgelaufen,

    #[error("Token konnte nicht signiert werden: {0}")]
    Signieren(String),
}

/// Claims eines Access-Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Benutzer-ID als Text
    pub sub: String,
    /// Ausstellungszeitpunkt (Unix-Sekunden)
    pub iat: i64,
    /// Ablaufzeitpunkt (Unix-Sekunden)
    pub exp: i64,
    /// Eindeutige Token-ID
    pub jti: String,
}

impl AccessClaims {
    /// Gibt die Benutzer-ID aus dem `sub`-Claim zurueck
    pub fn user_id(&self) -> Result<UserId, TokenFehler> {
        self.sub.parse().map_err(|_| TokenFehler::Fehlerhaft)
    }
}

/// Stellt Access-Tokens aus und prueft sie
///
/// Secret und TTL kommen aus der Prozesskonfiguration und sind pro Instanz fest.
#[derive(Clone)]
pub struct AccessTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for AccessTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl AccessTokenIssuer {
    /// Erstellt einen Issuer mit symmetrischem Secret und Lebensdauer
    pub fn neu(secret: &[u8], ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl)
            .unwrap_or_else(|_| chrono::Duration::days(365 * 100));
        Self::mit_chrono_ttl(secret, ttl)
    }

    /// Wie [`neu`](Self::neu), erlaubt aber negative TTLs (bereits abgelaufene Tokens)
    pub fn mit_chrono_ttl(secret: &[u8], ttl: chrono::Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Stellt ein signiertes Access-Token fuer den Benutzer aus
    pub fn ausstellen(&self, user_id: UserId) -> Result<String, TokenFehler> {
        let jetzt = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: jetzt.timestamp(),
            exp: (jetzt + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenFehler::Signieren(e.to_string()))?;

        tracing::debug!(user_id = %user_id, jti = %claims.jti, "Access-Token ausgestellt");
        Ok(token)
    }

    /// Prueft Signatur und Ablauf und gibt die Claims zurueck
    pub fn verifizieren(&self, token: &str) -> Result<AccessClaims, TokenFehler> {
        let daten = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenFehler::Abgelaufen,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenFehler::UngueltigeSignatur
                }
                _ => TokenFehler::Fehlerhaft,
            })?;

        // jsonwebtoken lehnt erst bei exp < jetzt ab; gueltig ist nur exp > jetzt
        if daten.claims.exp <= Utc::now().timestamp() {
            return Err(TokenFehler::Abgelaufen);
        }

        // sub muss eine gueltige Benutzer-ID sein
        daten.claims.user_id()?;
        Ok(daten.claims)
    }
}
