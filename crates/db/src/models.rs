//! Datenbankmodelle fuer Zugang
//!
//! Diese Typen repraesentieren Datensaetze aus dem Benutzerverzeichnis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zugang_core::UserId;

/// Benutzer-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerRecord {
    pub id: UserId,
    pub email: String,
    /// PHC-String inkl. Algorithmus, Parameter und Salt
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
}
