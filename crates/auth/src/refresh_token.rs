//! Opake Refresh-Tokens
//!
//! Refresh-Tokens sind reine Zufallswerte ohne Struktur. Ihre Gueltigkeit
//! steht ausschliesslich im Session-Store.

use base64::Engine as _;
use rand_core::{OsRng, RngCore};

/// Standard-Tokenlaenge: 32 Bytes = 256 Bit Entropie
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Mindestlaenge, unter der keine Tokens erzeugt werden
pub const MIN_REFRESH_TOKEN_BYTES: usize = 32;

/// Namensraum der Refresh-Sessions im Session-Store
pub const SESSION_PRAEFIX: &str = "refresh:";

/// Generiert einen Refresh-Token aus dem OS-CSPRNG (URL-sicheres Base64)
///
/// Werte unter [`MIN_REFRESH_TOKEN_BYTES`] werden auf das Minimum angehoben.
pub fn refresh_token_generieren(anzahl_bytes: usize) -> String {
    let mut bytes = vec![0u8; anzahl_bytes.max(MIN_REFRESH_TOKEN_BYTES)];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Bildet den Session-Store-Schluessel fuer einen Refresh-Token
pub fn session_schluessel(refresh_token: &str) -> String {
    format!("{SESSION_PRAEFIX}{refresh_token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn token_hat_feste_laenge() {
        // 32 Bytes -> 43 Zeichen Base64 ohne Padding
        assert_eq!(refresh_token_generieren(REFRESH_TOKEN_BYTES).len(), 43);
        assert_eq!(refresh_token_generieren(64).len(), 86);
    }

    #[test]
    fn zu_kurze_laenge_wird_angehoben() {
        assert_eq!(refresh_token_generieren(4).len(), 43);
    }

    #[test]
    fn token_ist_url_sicher() {
        let token = refresh_token_generieren(REFRESH_TOKEN_BYTES);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn tokens_sind_eindeutig() {
        let tokens: HashSet<String> = (0..1000)
            .map(|_| refresh_token_generieren(REFRESH_TOKEN_BYTES))
            .collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn schluessel_ist_namensraum_praefixiert() {
        assert_eq!(session_schluessel("abc"), "refresh:abc");
    }
}
