//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder ausser dem
//! Token-Secret haben sinnvolle Standardwerte. Das Secret kann ueber
//! `ZUGANG_TOKEN_SECRET` gesetzt werden und muss nicht in der Datei stehen.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zugang_auth::{AuthKonfig, HashKosten};
use zugang_db::DatabaseConfig;

/// Umgebungsvariable, die das Token-Secret der Datei ueberschreibt
pub const SECRET_ENV: &str = "ZUGANG_TOKEN_SECRET";

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Netzwerk-Einstellungen
    pub server: ServerEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Token- und Passwort-Einstellungen
    pub auth: AuthEinstellungen,
    /// Backend fuer Refresh-Sessions
    pub sessions: SessionEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Bind-Adresse fuer die REST-API
    pub bind_adresse: String,
    /// Port fuer die REST-API
    pub port: u16,
    /// Port fuer die gRPC-API
    pub grpc_port: u16,
    /// CORS-Origins (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 8080,
            grpc_port: 50051,
            cors_origins: vec![],
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    /// WAL-Modus fuer SQLite
    pub wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            url: "sqlite://zugang.db".into(),
            max_verbindungen: 5,
            wal: true,
        }
    }
}

/// Token- und Passwort-Einstellungen
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// Signatur-Secret fuer Access-Tokens (leer = Start verweigert)
    pub token_secret: String,
    /// Lebensdauer der Access-Tokens in Sekunden
    pub access_token_ttl_sekunden: u64,
    /// Lebensdauer der Refresh-Tokens in Sekunden
    pub refresh_token_ttl_sekunden: u64,
    /// Laenge der Refresh-Tokens in Bytes
    pub refresh_token_bytes: usize,
    /// Zeitlimit pro Anfrage an Datenbank und Session-Store in ms
    pub zeitlimit_ms: u64,
    /// Intervall fuer den Session-Cleanup in Sekunden
    pub session_cleanup_sekunden: u64,
    /// Argon2id-Kosten
    pub passwort: HashKosten,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            access_token_ttl_sekunden: 15 * 60,
            refresh_token_ttl_sekunden: 30 * 24 * 60 * 60,
            refresh_token_bytes: 32,
            zeitlimit_ms: 3000,
            session_cleanup_sekunden: 15 * 60,
            passwort: HashKosten::default(),
        }
    }
}

impl std::fmt::Debug for AuthEinstellungen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEinstellungen")
            .field("token_secret", &"<verborgen>")
            .field("access_token_ttl_sekunden", &self.access_token_ttl_sekunden)
            .field("refresh_token_ttl_sekunden", &self.refresh_token_ttl_sekunden)
            .field("refresh_token_bytes", &self.refresh_token_bytes)
            .field("zeitlimit_ms", &self.zeitlimit_ms)
            .field("session_cleanup_sekunden", &self.session_cleanup_sekunden)
            .field("passwort", &self.passwort)
            .finish()
    }
}

/// Art des Session-Store-Backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackendArt {
    /// Im Prozessspeicher; Sessions gehen beim Neustart verloren
    #[default]
    Speicher,
    /// Redis-Server
    Redis,
}

/// Session-Store-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionEinstellungen {
    /// "speicher" oder "redis"
    pub backend: SessionBackendArt,
    /// Verbindungs-URL (nur fuer Redis)
    pub redis_url: String,
}

impl Default for SessionEinstellungen {
    fn default() -> Self {
        Self {
            backend: SessionBackendArt::Speicher,
            redis_url: "redis://127.0.0.1:6379/0".into(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => Self::aus_toml(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };

        if let Ok(secret) = std::env::var(SECRET_ENV) {
            config.auth.token_secret = secret;
        }

        Ok(config)
    }

    /// Parst eine Konfiguration aus einem TOML-String
    pub fn aus_toml(inhalt: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(inhalt)
    }

    /// Gibt die Bind-Adresse fuer die REST-API zurueck
    pub fn rest_bind_adresse(&self) -> String {
        format!("{}:{}", self.server.bind_adresse, self.server.port)
    }

    /// Gibt die Bind-Adresse fuer die gRPC-API zurueck
    pub fn grpc_bind_adresse(&self) -> String {
        format!("{}:{}", self.server.bind_adresse, self.server.grpc_port)
    }

    /// Baut die Datenbank-Konfiguration
    pub fn datenbank_konfig(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.wal,
        }
    }

    /// Baut die Auth-Konfiguration (Validierung erfolgt im AuthService)
    pub fn auth_konfig(&self) -> AuthKonfig {
        let a = &self.auth;
        AuthKonfig {
            token_secret: a.token_secret.as_bytes().to_vec(),
            access_ttl: Duration::from_secs(a.access_token_ttl_sekunden),
            refresh_ttl: Duration::from_secs(a.refresh_token_ttl_sekunden),
            zeitlimit: Duration::from_millis(a.zeitlimit_ms),
            refresh_token_bytes: a.refresh_token_bytes,
            hash_kosten: a.passwort,
        }
    }

    /// Intervall fuer den Session-Cleanup
    pub fn session_cleanup_intervall(&self) -> Duration {
        Duration::from_secs(self.auth.session_cleanup_sekunden.max(1))
    }
}
