//! Fehlertypen fuer den Auth-Service
//!
//! Jeder Fehler eines Kollaborateurs (Datenbank, Session-Store, Signatur)
//! wird an der Service-Grenze in genau eine [`FehlerArt`] eingeordnet.
//! Transporte bilden nur die Art auf ihre Statuscodes ab und zeigen dem
//! Aufrufer [`AuthError::oeffentliche_meldung`], nie interne Details.

use thiserror::Error;

use crate::{access_token::TokenFehler, session::SessionStoreError};

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Eingabe ---
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    // --- Authentifizierung ---
    #[error("E-Mail oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    #[error("invalid or expired refresh token")]
    RefreshTokenUngueltig,

    #[error("Access-Token ungueltig: {0}")]
    AccessToken(#[from] TokenFehler),

    // --- Benutzerverwaltung ---
    #[error("Benutzer existiert bereits")]
    EmailVergeben,

    // --- Verfuegbarkeit ---
    #[error("Zeitlimit ueberschritten: {0}")]
    Zeitlimit(&'static str),

    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Kollaborateure ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] zugang_db::DbError),

    #[error("Session-Store-Fehler: {0}")]
    SessionStore(#[from] SessionStoreError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

/// Fehlerklasse, auf die Transporte ihre Statuscodes abbilden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FehlerArt {
    /// Fehlende oder fehlerhafte Eingabe, nie wiederholen
    Validierung,
    /// Neu anmelden, nie automatisch wiederholen
    NichtAutorisiert,
    /// E-Mail bereits registriert
    Konflikt,
    /// Zeitlimit eines Kollaborateurs ueberschritten
    NichtVerfuegbar,
    /// Store-, Datenbank- oder Signaturfehler
    Intern,
}

/// Meldung fuer alles, was der Aufrufer nicht im Detail sehen darf
const INTERNE_MELDUNG: &str = "Interner Fehler";
const NICHT_VERFUEGBAR_MELDUNG: &str = "Dienst voruebergehend nicht verfuegbar";

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn eingabe(msg: impl Into<String>) -> Self {
        Self::UngueltigeEingabe(msg.into())
    }

    /// Ordnet den Fehler in genau eine Fehlerklasse ein
    pub fn art(&self) -> FehlerArt {
        match self {
            Self::UngueltigeEingabe(_) => FehlerArt::Validierung,
            Self::UngueltigeAnmeldedaten | Self::RefreshTokenUngueltig => {
                FehlerArt::NichtAutorisiert
            }
            Self::AccessToken(TokenFehler::Signieren(_)) => FehlerArt::Intern,
            Self::AccessToken(_) => FehlerArt::NichtAutorisiert,
            Self::EmailVergeben => FehlerArt::Konflikt,
            Self::Zeitlimit(_) => FehlerArt::NichtVerfuegbar,
            Self::PasswortHashing(_)
            | Self::Konfiguration(_)
            | Self::Datenbank(_)
            | Self::SessionStore(_)
            | Self::Intern(_) => FehlerArt::Intern,
        }
    }

    /// Text, den ein Transport dem Aufrufer zeigen darf
    pub fn oeffentliche_meldung(&self) -> String {
        match self.art() {
            FehlerArt::Intern => INTERNE_MELDUNG.to_string(),
            FehlerArt::NichtVerfuegbar => NICHT_VERFUEGBAR_MELDUNG.to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeitlimit_ist_nie_nicht_autorisiert() {
        let e = AuthError::Zeitlimit("Benutzer laden");
        assert_eq!(e.art(), FehlerArt::NichtVerfuegbar);
        assert_ne!(e.art(), FehlerArt::NichtAutorisiert);
    }

    #[test]
    fn token_arten_werden_unterschieden() {
        assert_eq!(
            AuthError::from(TokenFehler::Abgelaufen).art(),
            FehlerArt::NichtAutorisiert
        );
        assert_eq!(
            AuthError::from(TokenFehler::UngueltigeSignatur).art(),
            FehlerArt::NichtAutorisiert
        );
        assert_eq!(
            AuthError::from(TokenFehler::Signieren("kaputt".into())).art(),
            FehlerArt::Intern
        );
    }

    #[test]
    fn interne_details_bleiben_intern() {
        let e = AuthError::Datenbank(zugang_db::DbError::intern("disk I/O error auf /var/lib"));
        assert_eq!(e.art(), FehlerArt::Intern);
        assert_eq!(e.oeffentliche_meldung(), INTERNE_MELDUNG);

        let e = AuthError::SessionStore(SessionStoreError::NichtErreichbar("10.0.0.3:6379".into()));
        assert!(!e.oeffentliche_meldung().contains("10.0.0.3"));
    }

    #[test]
    fn aufruferfehler_zeigen_ihre_meldung() {
        assert_eq!(
            AuthError::RefreshTokenUngueltig.oeffentliche_meldung(),
            "invalid or expired refresh token"
        );
        assert_eq!(AuthError::EmailVergeben.art(), FehlerArt::Konflikt);
        assert_eq!(AuthError::eingabe("E-Mail fehlt").art(), FehlerArt::Validierung);
    }
}
