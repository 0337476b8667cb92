//! Auth-Service fuer Zugang
//!
//! Zentraler Service fuer Registrierung, Login, Refresh und Logout.
//! Nutzt das Benutzerverzeichnis, den Session-Store, den Passwort-Hasher
//! und den Access-Token-Issuer.
//!
//! Lebenszyklus eines Refresh-Tokens:
//! `ausgestellt -> aktiv -> {rotiert | widerrufen | abgelaufen}`.
//! Rotiert und widerrufen sind fuer den Store beide "nicht vorhanden".

use std::{future::Future, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use zugang_core::UserId;
use zugang_db::{models::NeuerBenutzer, repository::UserRepository};

use crate::{
    access_token::{AccessClaims, AccessTokenIssuer},
    config::AuthKonfig,
    error::{AuthError, AuthResult},
    password::PasswortHasher,
    refresh_token::{refresh_token_generieren, session_schluessel},
    session::SessionStore,
};

/// Ergebnis von Login und Refresh
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPaar {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPaar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPaar").finish_non_exhaustive()
    }
}

/// Auth-Service – zentraler Einstiegspunkt fuer alle Credential-Vorgaenge
///
/// Haelt keinen veraenderlichen Zustand; alle geteilten Daten liegen im
/// Benutzerverzeichnis und im Session-Store.
pub struct AuthService<U: UserRepository, S: SessionStore> {
    user_repo: Arc<U>,
    session_store: Arc<S>,
    access_tokens: AccessTokenIssuer,
    hasher: PasswortHasher,
    /// Hash gegen den bei unbekannter E-Mail verifiziert wird
    platzhalter_hash: String,
    refresh_ttl: Duration,
    refresh_token_bytes: usize,
    zeitlimit: Duration,
}

impl<U: UserRepository, S: SessionStore> AuthService<U, S> {
    /// Erstellt einen neuen AuthService aus einer geprueften Konfiguration
    pub fn neu(user_repo: Arc<U>, session_store: Arc<S>, konfig: AuthKonfig) -> AuthResult<Self> {
        konfig.pruefen()?;

        let hasher = PasswortHasher::neu(konfig.hash_kosten)?;
        let platzhalter_hash = hasher.hashen(&refresh_token_generieren(32))?;

        Ok(Self {
            user_repo,
            session_store,
            access_tokens: AccessTokenIssuer::neu(&konfig.token_secret, konfig.access_ttl),
            hasher,
            platzhalter_hash,
            refresh_ttl: konfig.refresh_ttl,
            refresh_token_bytes: konfig.refresh_token_bytes,
            zeitlimit: konfig.zeitlimit,
        })
    }

    /// Registriert einen neuen Benutzer
    ///
    /// Stellt keine Tokens aus. Eine bereits vergebene E-Mail ergibt
    /// [`AuthError::EmailVergeben`].
    pub async fn registrieren(&self, email: &str, passwort: &str) -> AuthResult<UserId> {
        let frist = self.frist();
        let email = email.trim();
        email_pruefen(email)?;
        passwort_pruefen(passwort)?;

        let passwort_hash = self.hashen(passwort).await?;

        let ergebnis = self
            .mit_frist(
                frist,
                "Benutzer anlegen",
                self.user_repo.create(NeuerBenutzer {
                    email,
                    password_hash: &passwort_hash,
                }),
            )
            .await;

        match ergebnis {
            Ok(benutzer) => {
                tracing::info!(user_id = %benutzer.id, "Neuer Benutzer registriert");
                Ok(benutzer.id)
            }
            Err(AuthError::Datenbank(e)) if e.ist_eindeutigkeit() => {
                tracing::debug!("Registrierung abgelehnt: E-Mail bereits vergeben");
                Err(AuthError::EmailVergeben)
            }
            Err(e) => {
                tracing::error!(fehler = %e, "Registrierung fehlgeschlagen");
                Err(e)
            }
        }
    }

    /// Meldet einen Benutzer an und gibt ein neues Token-Paar zurueck
    ///
    /// Unbekannte E-Mail und falsches Passwort sind fuer den Aufrufer nicht
    /// unterscheidbar.
    pub async fn anmelden(&self, email: &str, passwort: &str) -> AuthResult<TokenPaar> {
        let frist = self.frist();
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::eingabe("E-Mail fehlt"));
        }
        passwort_pruefen(passwort)?;

        let benutzer = self
            .mit_frist(frist, "Benutzer laden", self.user_repo.get_by_email(email))
            .await?;

        let hash = benutzer
            .as_ref()
            .map(|b| b.password_hash.clone())
            .unwrap_or_else(|| self.platzhalter_hash.clone());
        let korrekt = self.verifizieren(passwort, hash).await?;

        let benutzer = match benutzer {
            Some(b) if korrekt => b,
            _ => {
                tracing::warn!("Fehlgeschlagener Login-Versuch");
                return Err(AuthError::UngueltigeAnmeldedaten);
            }
        };

        let paar = self.token_paar_ausstellen(frist, benutzer.id).await?;

        tracing::info!(user_id = %benutzer.id, "Benutzer angemeldet");
        Ok(paar)
    }

    /// Tauscht einen Refresh-Token gegen ein neues Token-Paar (Rotation)
    ///
    /// Loeschen und Neuschreiben sind zwei getrennte Store-Aufrufe. Nur wer
    /// den alten Eintrag tatsaechlich entfernt, bekommt ein neues Paar. Scheitert
    /// das Loeschen mit einem Fehler, wird nur gewarnt. Scheitert das Schreiben, ist die Session
    /// verloren und der Client muss sich neu anmelden.
    pub async fn erneuern(&self, refresh_token: &str) -> AuthResult<TokenPaar> {
        let frist = self.frist();
        token_pruefen(refresh_token)?;

        let schluessel = session_schluessel(refresh_token);
        let gespeichert = self
            .mit_frist(frist, "Refresh-Session lesen", self.session_store.lesen(&schluessel))
            .await?;

        let Some(wert) = gespeichert else {
            tracing::debug!("Refresh-Token unbekannt, rotiert oder abgelaufen");
            return Err(AuthError::RefreshTokenUngueltig);
        };

        let user_id: UserId = wert.parse().map_err(|e| {
            tracing::error!(fehler = %e, "Refresh-Session enthaelt keine gueltige Benutzer-ID");
            AuthError::intern("Gespeicherte Benutzer-ID ungueltig")
        })?;

        let access_token = self.access_tokens.ausstellen(user_id)?;

        match self
            .mit_frist(
                frist,
                "Refresh-Session loeschen",
                self.session_store.loeschen(&schluessel),
            )
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                // Ein gleichzeitiger Refresh hat denselben Token schon eingeloest
                tracing::warn!(user_id = %user_id, "Refresh-Token bereits eingeloest");
                return Err(AuthError::RefreshTokenUngueltig);
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, fehler = %e, "Alte Refresh-Session nicht geloescht");
            }
        }

        let neuer_refresh_token = refresh_token_generieren(self.refresh_token_bytes);
        if let Err(e) = self
            .refresh_session_speichern(frist, &neuer_refresh_token, user_id)
            .await
        {
            tracing::error!(
                user_id = %user_id,
                fehler = %e,
                "Rotation unterbrochen: Session verloren, Client muss sich neu anmelden"
            );
            return Err(e);
        }

        tracing::debug!(user_id = %user_id, "Refresh-Token rotiert");
        Ok(TokenPaar {
            access_token,
            refresh_token: neuer_refresh_token,
        })
    }

    /// Widerruft einen Refresh-Token. Ein bereits entfernter Token ist kein Fehler.
    pub async fn abmelden(&self, refresh_token: &str) -> AuthResult<()> {
        let frist = self.frist();
        token_pruefen(refresh_token)?;

        let entfernt = self
            .mit_frist(
                frist,
                "Refresh-Session loeschen",
                self.session_store.loeschen(&session_schluessel(refresh_token)),
            )
            .await?;

        tracing::debug!(entfernt, "Refresh-Session widerrufen (Abmeldung)");
        Ok(())
    }

    /// Prueft ein Access-Token und gibt dessen Claims zurueck
    pub fn access_token_pruefen(&self, access_token: &str) -> AuthResult<AccessClaims> {
        self.access_tokens.verifizieren(access_token).map_err(|e| {
            tracing::debug!(grund = %e, "Access-Token abgelehnt");
            AuthError::AccessToken(e)
        })
    }

    async fn token_paar_ausstellen(&self, frist: Instant, user_id: UserId) -> AuthResult<TokenPaar> {
        let access_token = self.access_tokens.ausstellen(user_id)?;
        let refresh_token = refresh_token_generieren(self.refresh_token_bytes);
        self.refresh_session_speichern(frist, &refresh_token, user_id)
            .await?;

        Ok(TokenPaar {
            access_token,
            refresh_token,
        })
    }

    async fn refresh_session_speichern(
        &self,
        frist: Instant,
        refresh_token: &str,
        user_id: UserId,
    ) -> AuthResult<()> {
        self.mit_frist(
            frist,
            "Refresh-Session speichern",
            self.session_store.setzen(
                &session_schluessel(refresh_token),
                &user_id.to_string(),
                self.refresh_ttl,
            ),
        )
        .await
    }

    /// Frist einer einzelnen Operation; alle Kollaborateur-Aufrufe teilen sie
    fn frist(&self) -> Instant {
        Instant::now() + self.zeitlimit
    }

    async fn mit_frist<T, E, F>(&self, frist: Instant, operation: &'static str, f: F) -> AuthResult<T>
    where
        F: Future<Output = Result<T, E>>,
        AuthError: From<E>,
    {
        match tokio::time::timeout_at(frist, f).await {
            Ok(ergebnis) => ergebnis.map_err(AuthError::from),
            Err(_) => {
                tracing::error!(operation, "Zeitlimit ueberschritten");
                Err(AuthError::Zeitlimit(operation))
            }
        }
    }

    async fn hashen(&self, passwort: &str) -> AuthResult<String> {
        let hasher = self.hasher.clone();
        let passwort = passwort.to_owned();
        tokio::task::spawn_blocking(move || hasher.hashen(&passwort))
            .await
            .map_err(|e| AuthError::intern(format!("Hash-Task abgebrochen: {e}")))?
    }

    async fn verifizieren(&self, passwort: &str, hash: String) -> AuthResult<bool> {
        let hasher = self.hasher.clone();
        let passwort = passwort.to_owned();
        tokio::task::spawn_blocking(move || hasher.verifizieren(&passwort, &hash))
            .await
            .map_err(|e| AuthError::intern(format!("Verifikations-Task abgebrochen: {e}")))
    }
}

fn email_pruefen(email: &str) -> AuthResult<()> {
    if email.is_empty() {
        return Err(AuthError::eingabe("E-Mail fehlt"));
    }
    if !email.contains('@') {
        return Err(AuthError::eingabe("E-Mail ungueltig"));
    }
    Ok(())
}

fn passwort_pruefen(passwort: &str) -> AuthResult<()> {
    if passwort.is_empty() {
        return Err(AuthError::eingabe("Passwort fehlt"));
    }
    Ok(())
}

fn token_pruefen(refresh_token: &str) -> AuthResult<()> {
    if refresh_token.trim().is_empty() {
        return Err(AuthError::eingabe("Refresh-Token fehlt"));
    }
    Ok(())
}
