//! End-to-end flows through the sync server.

use serde_json::json;
use std::sync::Arc;
use usersync_core::{Change, ChangeId, ChangeKind, SessionId, Timestamp};
use usersync_server::{ServerConfig, SyncServer};
use usersync_storage::{MemoryStore, SaveMode, UserStore};

fn server() -> (SyncServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let server = SyncServer::new(store.clone() as Arc<dyn UserStore>, ServerConfig::default());
    (server, store)
}

fn change(id: &str, date: Timestamp, kind: ChangeKind, field: &str, value: serde_json::Value) -> Change {
    Change {
        id: ChangeId::from(id),
        date,
        kind,
        field: field.into(),
        value,
    }
}

/// Runs a "setVar"-style server-side function: set a field and persist.
fn set_var(server: &SyncServer, session_id: &SessionId, field: &str, value: serde_json::Value) {
    server
        .with_session(session_id, |_, handle| {
            handle.set(field, value)?;
            server
                .store()
                .save_account(handle.account().clone(), SaveMode::UpdateOnly)?;
            Ok(())
        })
        .unwrap();
}

#[test]
fn guest_sync_scenario() {
    let (server, _store) = server();

    // Guest login, then two local sets through a server-side function.
    let guest = server.log_in_as_guest().unwrap();
    let session_id = guest.session_id.clone();
    set_var(&server, &session_id, "a", json!(2));
    set_var(&server, &session_id, "b", json!("foo"));

    // Client log with increasing timestamps, all later than the sets.
    let base = Timestamp::now().saturating_add_millis(1_000);
    let outcome = server
        .synchronize_user(
            &session_id,
            vec![
                change("id1", base, ChangeKind::Increment, "a", json!(1)),
                change(
                    "id2",
                    base.saturating_add_millis(1),
                    ChangeKind::Set,
                    "b",
                    json!("bla"),
                ),
                change(
                    "id3",
                    base.saturating_add_millis(2),
                    ChangeKind::Increment,
                    "a",
                    json!(1),
                ),
            ],
        )
        .unwrap();

    assert_eq!(outcome.user_data["a"], json!(4));
    assert_eq!(outcome.user_data["b"], json!("bla"));
    assert_eq!(
        outcome.processed_changes,
        vec![
            ChangeId::from("id1"),
            ChangeId::from("id2"),
            ChangeId::from("id3"),
        ]
    );

    // A later local set prunes the field's history; a second sync with an
    // empty client log changes nothing else.
    set_var(&server, &session_id, "a", json!(-1));
    let outcome = server.synchronize_user(&session_id, vec![]).unwrap();

    assert_eq!(outcome.user_data["a"], json!(-1));
    assert_eq!(outcome.user_data["b"], json!("bla"));
    assert!(outcome.processed_changes.is_empty());
}

#[test]
fn concurrent_synchronizations_are_serialized() {
    let (server, _store) = server();
    let server = Arc::new(server);
    let guest = server.log_in_as_guest().unwrap();

    // Each thread submits increments through its own synchronize calls.
    // Without per-account mutual exclusion, two calls could both load the
    // same snapshot and one overwrite the other's update.
    const THREADS: usize = 8;
    const INCREMENTS_PER_THREAD: usize = 10;

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let server = Arc::clone(&server);
            let session_id = guest.session_id.clone();
            std::thread::spawn(move || {
                for i in 0..INCREMENTS_PER_THREAD {
                    let c = change(
                        &format!("c-{t}-{i}"),
                        Timestamp::now(),
                        ChangeKind::Increment,
                        "counter",
                        json!(1),
                    );
                    server.synchronize_user(&session_id, vec![c]).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let outcome = server.synchronize_user(&guest.session_id, vec![]).unwrap();
    assert_eq!(
        outcome.user_data["counter"],
        json!((THREADS * INCREMENTS_PER_THREAD) as i64)
    );
}

#[test]
fn dangling_session_is_cleaned_up_on_any_authenticated_call() {
    let (server, store) = server();
    let guest = server.log_in_as_guest().unwrap();

    let account_id = usersync_core::AccountId::from(guest.user_data["_id"].as_str().unwrap());
    assert!(store.remove_account(&account_id));

    let err = server.log_out(&guest.session_id).unwrap_err();
    assert_eq!(err.wire_code(), 103);
    // The session record was deleted as a side effect.
    assert!(store.load_session(&guest.session_id).unwrap().is_none());
}

#[test]
fn full_wire_flow() {
    let (server, _store) = server();

    let signed_up = server.handle_request(
        "_signUp",
        &json!({"email": "a@b.com", "password": "longenough"}),
    );
    assert_eq!(signed_up["status"], "ok");
    let session_id = signed_up["result"]["sessionId"].as_str().unwrap().to_string();

    let synced = server.handle_request(
        "_synchronizeUser",
        &json!({
            "sessionId": session_id,
            "clientChangelog": [
                {"_id": "c1", "date": 10, "type": "set", "field": "color", "value": "teal"}
            ]
        }),
    );
    assert_eq!(synced["result"]["userData"]["color"], "teal");
    assert_eq!(synced["result"]["userData"]["email"], "a@b.com");
    assert!(synced["result"]["userData"]["__hashedPassword"].is_null());

    let logged_out = server.handle_request("_logOut", &json!({"sessionId": session_id}));
    assert_eq!(logged_out["status"], "ok");

    // The session is gone now.
    let again = server.handle_request("_logOut", &json!({"sessionId": session_id}));
    assert_eq!(again["code"], 103);
}
