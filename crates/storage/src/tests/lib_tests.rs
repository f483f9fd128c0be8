use super::*;

#[tokio::test]
async fn fresh_store_is_unauthenticated() {
    let store = SessionStore::open("sqlite::memory:").await.expect("db");
    let session = store.load().await;
    assert_eq!(session, Session::default());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn saves_and_reloads_session() {
    let store = SessionStore::open("sqlite::memory:").await.expect("db");
    store.save("T1", "a@b.com").await.expect("save");

    let session = store.load().await;
    assert_eq!(session.token.as_deref(), Some("T1"));
    assert_eq!(session.subject_email.as_deref(), Some("a@b.com"));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn save_overwrites_previous_session() {
    let store = SessionStore::open("sqlite::memory:").await.expect("db");
    store.save("T1", "a@b.com").await.expect("save");
    store.save("T2", "c@d.com").await.expect("save");

    let session = store.load().await;
    assert_eq!(session.token.as_deref(), Some("T2"));
    assert_eq!(session.subject_email.as_deref(), Some("c@d.com"));
}

#[tokio::test]
async fn clear_removes_both_keys() {
    let store = SessionStore::open("sqlite::memory:").await.expect("db");
    store.save("T1", "a@b.com").await.expect("save");
    store.clear().await.expect("clear");

    let session = store.load().await;
    assert_eq!(session, Session::default());
}

#[tokio::test]
async fn clear_on_empty_store_is_a_noop() {
    let store = SessionStore::open("sqlite::memory:").await.expect("db");
    store.clear().await.expect("clear");
    assert!(!store.load().await.is_authenticated());
}

#[tokio::test]
async fn session_survives_reopen_of_file_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("nested").join("session.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let store = SessionStore::open(&database_url).await.expect("db");
        store.save("T1", "a@b.com").await.expect("save");
    }
    assert!(db_path.exists(), "database file should exist");

    let reopened = SessionStore::open(&database_url).await.expect("db");
    let session = reopened.load().await;
    assert_eq!(session.token.as_deref(), Some("T1"));
    assert_eq!(session.subject_email.as_deref(), Some("a@b.com"));
}
