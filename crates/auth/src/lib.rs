//! zugang-auth – Credential- und Session-Lebenszyklus
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id
//! - Access-Tokens (JWT, HS256) mit Ausstellung und Pruefung
//! - Opake Refresh-Tokens aus dem OS-CSPRNG
//! - Session-Store-Abstraktion mit TTL (In-Memory- und Redis-Implementierung)
//! - AuthService (Registrierung, Login, Refresh mit Rotation, Logout)

pub mod access_token;
pub mod config;
pub mod error;
pub mod password;
pub mod redis_store;
pub mod refresh_token;
pub mod service;
pub mod session;

// Bequeme Re-Exporte
pub use access_token::{AccessClaims, AccessTokenIssuer, TokenFehler};
pub use config::AuthKonfig;
pub use error::{AuthError, AuthResult, FehlerArt};
pub use password::{HashKosten, PasswortHasher};
pub use redis_store::RedisSessionStore;
pub use refresh_token::{refresh_token_generieren, session_schluessel};
pub use service::{AuthService, TokenPaar};
pub use session::{MemorySessionStore, SessionStore, SessionStoreError};
