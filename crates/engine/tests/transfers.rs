use std::sync::Arc;

use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{Account, Engine, EngineError, TransferCmd, TransferDirection};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .commit_retries(10)
        .build()
        .await
        .unwrap();

    (engine, db, path)
}

async fn signup(engine: &Engine, email: &str, name: &str) -> Account {
    engine
        .create_account(email, "password", Some(name))
        .await
        .unwrap()
}

fn cmd(sender: &Account, recipient: &Account, amount: i64, reason: &str) -> TransferCmd {
    TransferCmd {
        sender_id: sender.id,
        recipient_id: recipient.id,
        amount,
        reason: reason.to_string(),
    }
}

#[tokio::test]
async fn new_accounts_start_with_ten_coins() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com", "Alice").await;
    assert_eq!(alice.balance, 10);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    signup(&engine, "alice@example.com", "Alice").await;

    let err = engine
        .create_account("  Alice@Example.COM ", "other", None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice@example.com".to_string()));
}

#[tokio::test]
async fn transfer_moves_coins_and_conserves_the_total() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com", "Alice").await;
    let bob = signup(&engine, "bob@example.com", "Bob").await;

    let transfer = engine.transfer(&cmd(&alice, &bob, 4, "lunch")).await.unwrap();
    assert_eq!(transfer.amount, 4);
    assert_eq!(transfer.sender_name, "Alice");
    assert_eq!(transfer.recipient_name, "Bob");

    let alice = engine.account(alice.id).await.unwrap();
    let bob = engine.account(bob.id).await.unwrap();
    assert_eq!(alice.balance, 6);
    assert_eq!(bob.balance, 14);
    assert_eq!(alice.balance + bob.balance, 20);
}

#[tokio::test]
async fn transfer_rejects_bad_commands_without_touching_balances() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com", "Alice").await;
    let bob = signup(&engine, "bob@example.com", "Bob").await;

    let err = engine.transfer(&cmd(&alice, &alice, 1, "self")).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransfer(_)));

    let err = engine.transfer(&cmd(&alice, &bob, 0, "zero")).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine.transfer(&cmd(&alice, &bob, -3, "neg")).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine.transfer(&cmd(&alice, &bob, 1, "   ")).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidReason(_)));

    let alice = engine.account(alice.id).await.unwrap();
    let bob = engine.account(bob.id).await.unwrap();
    assert_eq!(alice.balance, 10);
    assert_eq!(bob.balance, 10);
}

#[tokio::test]
async fn transfer_to_unknown_account_fails() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com", "Alice").await;

    let err = engine
        .transfer(&TransferCmd {
            sender_id: alice.id,
            recipient_id: Uuid::new_v4(),
            amount: 1,
            reason: "ghost".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn overdraft_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com", "Alice").await;
    let bob = signup(&engine, "bob@example.com", "Bob").await;

    let err = engine.transfer(&cmd(&alice, &bob, 11, "too much")).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let alice = engine.account(alice.id).await.unwrap();
    assert_eq!(alice.balance, 10);
}

#[tokio::test]
async fn transfer_snapshots_names_at_commit_time() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com", "Alice").await;
    let plain = engine
        .create_account("carol@example.com", "password", None)
        .await
        .unwrap();

    let transfer = engine.transfer(&cmd(&alice, &plain, 2, "hello")).await.unwrap();
    // No display name, so the email is the snapshot.
    assert_eq!(transfer.recipient_name, "carol@example.com");
}

#[tokio::test]
async fn history_merges_directions_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com", "Alice").await;
    let bob = signup(&engine, "bob@example.com", "Bob").await;

    engine.transfer(&cmd(&alice, &bob, 3, "one")).await.unwrap();
    engine.transfer(&cmd(&bob, &alice, 1, "two")).await.unwrap();
    engine.transfer(&cmd(&alice, &bob, 2, "three")).await.unwrap();

    let history = engine.history(alice.id, 10).await.unwrap();
    assert_eq!(history.entries.len(), 3);
    let reasons: Vec<_> = history
        .entries
        .iter()
        .map(|e| e.transfer.reason.as_str())
        .collect();
    assert_eq!(reasons, vec!["three", "two", "one"]);
    assert_eq!(history.entries[0].direction, TransferDirection::Sent);
    assert_eq!(history.entries[1].direction, TransferDirection::Received);
    assert_eq!(history.total_sent, 5);
    assert_eq!(history.total_received, 1);
}

#[tokio::test]
async fn history_limit_caps_each_direction() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com", "Alice").await;
    let bob = signup(&engine, "bob@example.com", "Bob").await;

    for i in 0..3 {
        engine
            .transfer(&cmd(&alice, &bob, 1, &format!("out {i}")))
            .await
            .unwrap();
        engine
            .transfer(&cmd(&bob, &alice, 1, &format!("back {i}")))
            .await
            .unwrap();
    }

    let history = engine.history(alice.id, 2).await.unwrap();
    // Two per direction, merged untruncated.
    assert_eq!(history.entries.len(), 4);
    assert_eq!(history.total_sent, 2);
    assert_eq!(history.total_received, 2);
}

#[tokio::test]
async fn event_timestamps_are_strictly_increasing_per_party() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com", "Alice").await;
    let bob = signup(&engine, "bob@example.com", "Bob").await;

    for i in 0..5 {
        engine
            .transfer(&cmd(&alice, &bob, 1, &format!("tick {i}")))
            .await
            .unwrap();
    }

    let history = engine.history(alice.id, 10).await.unwrap();
    let stamps: Vec<_> = history
        .entries
        .iter()
        .map(|e| e.transfer.created_at)
        .collect();
    for pair in stamps.windows(2) {
        assert!(pair[0] > pair[1]);
    }
}

#[tokio::test]
async fn concurrent_spends_cannot_overdraw() {
    let (engine, db, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);

    let alice = signup(&engine, "alice@example.com", "Alice").await;
    let bob = signup(&engine, "bob@example.com", "Bob").await;
    let carol = signup(&engine, "carol@example.com", "Carol").await;

    let to_bob = {
        let engine = Arc::clone(&engine);
        let cmd = cmd(&alice, &bob, 10, "all in");
        tokio::spawn(async move { engine.transfer(&cmd).await })
    };
    let to_carol = {
        let engine = Arc::clone(&engine);
        let cmd = cmd(&alice, &carol, 10, "all in");
        tokio::spawn(async move { engine.transfer(&cmd).await })
    };

    let results = [to_bob.await.unwrap(), to_carol.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let alice_after = engine.account(alice.id).await.unwrap();
    assert_eq!(alice_after.balance, 0);

    let bob = engine.account(bob.id).await.unwrap();
    let carol = engine.account(carol.id).await.unwrap();
    assert_eq!(bob.balance + carol.balance, 30);

    // Exactly one ledger event was written for the winning spend.
    let history = engine.history(alice.id, 10).await.unwrap();
    assert_eq!(history.entries.len(), 1);
    assert_eq!(history.entries[0].direction, TransferDirection::Sent);
    assert_eq!(history.total_sent, 10);

    drop(engine);
    drop(db);
    let _ = std::fs::remove_file(path);
}
