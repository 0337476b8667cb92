//! zugang-db – Benutzerverzeichnis
//!
//! Dieses Crate stellt das Repository-Pattern fuer Benutzer bereit.
//! Der Auth-Service kennt nur den [`UserRepository`]-Trait; [`SqliteDb`]
//! ist die mitgelieferte Implementierung.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{DatabaseConfig, DbResult, UserRepository};
pub use sqlite::SqliteDb;
