//! Passwort-Hashing mit Argon2id
//!
//! Die Kostenparameter werden einmal beim Erstellen des Hashers festgelegt.
//! Der erzeugte PHC-String enthaelt Algorithmus, Parameter und Salt, so dass
//! die Verifikation auch nach einer Aenderung der Kosten funktioniert.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Argon2id-Kostenparameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashKosten {
    /// Speicherbedarf in KiB
    pub speicher_kib: u32,
    /// Anzahl Iterationen
    pub iterationen: u32,
    /// Parallelismus (Lanes)
    pub parallelitaet: u32,
}

impl Default for HashKosten {
    /// OWASP-Mindestempfehlung fuer Argon2id: 19 MiB, 2 Iterationen, 1 Lane
    fn default() -> Self {
        Self {
            speicher_kib: 19 * 1024,
            iterationen: 2,
            parallelitaet: 1,
        }
    }
}

/// Argon2id-Hasher mit festen Kostenparametern
#[derive(Debug, Clone)]
pub struct PasswortHasher {
    params: Params,
}

impl PasswortHasher {
    /// Erstellt einen Hasher. Ungueltige Parameter ergeben einen Konfigurationsfehler.
    pub fn neu(kosten: HashKosten) -> AuthResult<Self> {
        let params = Params::new(
            kosten.speicher_kib,
            kosten.iterationen,
            kosten.parallelitaet,
            None, // output_len: Standard (32 Bytes)
        )
        .map_err(|e| AuthError::Konfiguration(format!("Argon2-Parameter ungueltig: {e}")))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hasht ein Passwort mit einem zufaelligen Salt und gibt den PHC-String zurueck
    pub fn hashen(&self, passwort: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(passwort.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswortHashing(e.to_string()))
    }

    /// Verifiziert ein Passwort gegen einen gespeicherten PHC-Hash
    ///
    /// Der Vergleich laeuft in konstanter Zeit. Ein nicht lesbarer Hash zaehlt
    /// als Fehlschlag und wird nur protokolliert.
    pub fn verifizieren(&self, passwort: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(fehler = %e, "Gespeicherter Passwort-Hash nicht lesbar");
                return false;
            }
        };

        self.argon2()
            .verify_password(passwort.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswortHasher {
        PasswortHasher::neu(HashKosten {
            speicher_kib: 8,
            iterationen: 1,
            parallelitaet: 1,
        })
        .expect("Test-Parameter muessen gueltig sein")
    }

    #[test]
    fn passwort_hashen_und_verifizieren() {
        let h = hasher();
        let hash = h.hashen("sicheres_passwort_123!").expect("Hashing fehlgeschlagen");

        assert!(
            hash.starts_with("$argon2id$"),
            "Hash muss mit $argon2id$ beginnen"
        );
        assert!(h.verifizieren("sicheres_passwort_123!", &hash));
    }

    #[test]
    fn falsches_passwort_wird_abgelehnt() {
        let h = hasher();
        let hash = h.hashen("richtiges_passwort").unwrap();

        assert!(!h.verifizieren("falsches_passwort", &hash));
    }

    #[test]
    fn gleiche_passwoerter_unterschiedliche_hashes() {
        let h = hasher();
        let hash1 = h.hashen("gleiches_passwort").unwrap();
        let hash2 = h.hashen("gleiches_passwort").unwrap();

        assert_ne!(hash1, hash2, "Salt muss pro Hash verschieden sein");
    }

    #[test]
    fn ungueltiger_hash_ist_kein_treffer() {
        assert!(!hasher().verifizieren("passwort", "kein_gueltiger_hash"));
    }

    #[test]
    fn hash_mit_anderen_kosten_bleibt_verifizierbar() {
        let alt = hasher();
        let hash = alt.hashen("passwort").unwrap();

        let neu = PasswortHasher::neu(HashKosten {
            speicher_kib: 16,
            iterationen: 2,
            parallelitaet: 1,
        })
        .unwrap();
        assert!(neu.verifizieren("passwort", &hash));
    }

    #[test]
    fn ungueltige_kosten_werden_abgelehnt() {
        let ergebnis = PasswortHasher::neu(HashKosten {
            speicher_kib: 1,
            iterationen: 0,
            parallelitaet: 1,
        });
        assert!(matches!(ergebnis, Err(AuthError::Konfiguration(_))));
    }

    #[test]
    fn standard_kosten() {
        let k = HashKosten::default();
        assert_eq!(k.speicher_kib, 19 * 1024);
        assert!(PasswortHasher::neu(k).is_ok());
    }
}
