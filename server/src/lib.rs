//! zugang-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;
pub mod grpc;
pub mod logging;
pub mod rest;
pub mod sessions;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use config::ServerConfig;
use sessions::SessionBackend;
use tokio::sync::watch;
use zugang_auth::AuthService;
use zugang_db::SqliteDb;

/// Konkreter Service, wie ihn der Server betreibt
pub type AuthDienst = AuthService<SqliteDb, SessionBackend>;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Auth-Konfiguration pruefen
    /// 2. Datenbankverbindung herstellen (inkl. Migrationen)
    /// 3. Session-Store laut `[sessions]` aufbauen
    /// 4. REST- und gRPC-API starten
    /// 5. Auf Ctrl-C warten, beide APIs beenden, danach Pool schliessen
    pub async fn starten(self) -> Result<()> {
        let auth_konfig = self.config.auth_konfig();
        auth_konfig
            .pruefen()
            .map_err(|e| anyhow::anyhow!("Ungueltige Auth-Konfiguration: {e}"))?;

        let grpc_adresse: SocketAddr = self
            .config
            .grpc_bind_adresse()
            .parse()
            .map_err(|e| anyhow::anyhow!("Ungueltige gRPC-Adresse: {e}"))?;

        tracing::info!(
            rest = %self.config.rest_bind_adresse(),
            grpc = %grpc_adresse,
            access_ttl_s = self.config.auth.access_token_ttl_sekunden,
            refresh_ttl_s = self.config.auth.refresh_token_ttl_sekunden,
            "Server startet"
        );

        let db = Arc::new(SqliteDb::oeffnen(&self.config.datenbank_konfig()).await?);

        let sessions = SessionBackend::aufbauen(&self.config).await?;
        tracing::info!(backend = sessions.name(), "Session-Store bereit");

        let auth = Arc::new(
            AuthService::neu(Arc::clone(&db), Arc::new(sessions), auth_konfig)
                .map_err(|e| anyhow::anyhow!("AuthService konnte nicht erstellt werden: {e}"))?,
        );

        let app = rest::router(
            rest::AppState::neu(Arc::clone(&auth)),
            &self.config.server.cors_origins,
        );

        let adresse = self.config.rest_bind_adresse();
        let listener = tokio::net::TcpListener::bind(&adresse).await?;
        tracing::info!(adresse = %adresse, "REST-API bereit");

        let (stopp_tx, stopp_rx) = watch::channel(false);
        tokio::spawn(async move {
            shutdown_signal().await;
            let _ = stopp_tx.send(true);
        });

        let rest_server = async {
            axum::serve(listener, app)
                .with_graceful_shutdown(gestoppt(stopp_rx.clone()))
                .await
                .map_err(anyhow::Error::from)
        };
        let grpc_server = grpc::starten(grpc_adresse, auth, gestoppt(stopp_rx.clone()));

        tokio::try_join!(rest_server, grpc_server)?;

        db.schliessen().await;
        tracing::info!("Server beendet");

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht installiert werden");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
}

/// Wird fertig, sobald das Stopp-Signal gesetzt ist
async fn gestoppt(mut stopp: watch::Receiver<bool>) {
    // Ein geschlossener Sender zaehlt ebenfalls als Stopp
    let _ = stopp.wait_for(|&s| s).await;
}

#[cfg(test)]
pub(crate) mod testhilfe {
    use std::sync::Arc;

    use zugang_auth::{AuthKonfig, AuthService, HashKosten, MemorySessionStore};
    use zugang_db::SqliteDb;

    use crate::{sessions::SessionBackend, AuthDienst};

    /// AuthService auf In-Memory-SQLite und Speicher-Sessions, billige Hash-Kosten
    pub async fn test_dienst() -> Arc<AuthDienst> {
        let db = SqliteDb::in_memory()
            .await
            .expect("In-Memory DB konnte nicht erstellt werden");
        let mut konfig = AuthKonfig::neu("test-secret");
        konfig.hash_kosten = HashKosten {
            speicher_kib: 8,
            iterationen: 1,
            parallelitaet: 1,
        };
        let sessions = SessionBackend::Speicher(MemorySessionStore::neu());
        Arc::new(AuthService::neu(Arc::new(db), Arc::new(sessions), konfig).unwrap())
    }
}
