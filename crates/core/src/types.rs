//! Gemeinsame Identifikationstypen fuer Zugang
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen mit anderen
//! Ganzzahlen zur Compilezeit auszuschliessen.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Eindeutige Benutzer-ID (Primaerschluessel im Benutzerverzeichnis)
///
/// Die textuelle Form ist die nackte Zahl. Sie landet im `sub`-Claim der
/// Access-Tokens und als Wert im Session-Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Gibt die innere Zahl zurueck
    pub fn inner(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fehler beim Parsen einer UserId aus Text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Ungueltige Benutzer-ID: '{0}'")]
pub struct UngueltigeUserId(pub String);

impl FromStr for UserId {
    type Err = UngueltigeUserId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| UngueltigeUserId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_anzeige_ist_nackte_zahl() {
        assert_eq!(UserId(42).to_string(), "42");
    }

    #[test]
    fn user_id_parsen() {
        assert_eq!("17".parse::<UserId>(), Ok(UserId(17)));
        assert_eq!(" 17 ".parse::<UserId>(), Ok(UserId(17)));
    }

    #[test]
    fn user_id_parsen_ungueltig() {
        let fehler = "abc".parse::<UserId>().unwrap_err();
        assert!(fehler.to_string().contains("abc"));
        assert!("".parse::<UserId>().is_err());
    }

    #[test]
    fn user_id_ist_serde_transparent() {
        let json = serde_json::to_string(&UserId(7)).unwrap();
        assert_eq!(json, "7");
        let id: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, UserId(7));
    }
}
