//! Integration-Tests fuer UserRepository (In-Memory SQLite)

use zugang_db::{models::NeuerBenutzer, SqliteDb, UserRepository};

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

#[tokio::test]
async fn benutzer_erstellen_und_laden() {
    let db = db().await;

    let user = UserRepository::create(
        &db,
        NeuerBenutzer {
            email: "alice@example.com",
            password_hash: "hash_alice",
        },
    )
    .await
    .expect("Benutzer erstellen fehlgeschlagen");

    assert_eq!(user.email, "alice@example.com");
    assert!(user.id.inner() > 0);

    let geladen = UserRepository::get_by_email(&db, "alice@example.com")
        .await
        .expect("get_by_email fehlgeschlagen")
        .expect("Benutzer sollte gefunden werden");

    assert_eq!(geladen.id, user.id);
    assert_eq!(geladen.password_hash, "hash_alice");
}

#[tokio::test]
async fn unbekannte_email_ergibt_none() {
    let db = db().await;

    let nicht_gefunden = UserRepository::get_by_email(&db, "niemand@example.com")
        .await
        .unwrap();
    assert!(nicht_gefunden.is_none());
}

#[tokio::test]
async fn ids_sind_fortlaufend_eindeutig() {
    let db = db().await;

    let a = UserRepository::create(
        &db,
        NeuerBenutzer {
            email: "a@example.com",
            password_hash: "h",
        },
    )
    .await
    .unwrap();
    let b = UserRepository::create(
        &db,
        NeuerBenutzer {
            email: "b@example.com",
            password_hash: "h",
        },
    )
    .await
    .unwrap();

    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn email_ist_unique() {
    let db = db().await;

    UserRepository::create(
        &db,
        NeuerBenutzer {
            email: "charlie@example.com",
            password_hash: "hash1",
        },
    )
    .await
    .unwrap();

    let err = UserRepository::create(
        &db,
        NeuerBenutzer {
            email: "charlie@example.com",
            password_hash: "hash2",
        },
    )
    .await;

    assert!(err.is_err());
    assert!(err.unwrap_err().ist_eindeutigkeit());
}
