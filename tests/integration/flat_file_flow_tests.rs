// ==============================
// tests/integration/flat_file_flow_tests.rs
// ==============================
//! Accounts persisted by the flat-file store survive a server restart
use crate::test_utils::{ann, test_state};
use accounts_backend_lib::auth::AuthService;
use accounts_backend_lib::storage::{CredentialStore, FlatFileStore};
use accounts_common::LoginRequest;
use tempfile::TempDir;

fn login() -> LoginRequest {
    LoginRequest {
        email: "ann@x.com".to_string(),
        password: "hunter2".to_string(),
    }
}

#[tokio::test]
async fn test_account_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    let registered = {
        let state = test_state(FlatFileStore::new(temp_dir.path()).unwrap());
        state.auth.register(ann()).await.unwrap()
    };

    // Fresh store over the same directory
    let state = test_state(FlatFileStore::new(temp_dir.path()).unwrap());
    let logged_in = state.auth.login(login()).await.unwrap();
    assert_eq!(logged_in.user, registered.user);

    let err = state.auth.register(ann()).await.unwrap_err();
    assert_eq!(err.public_message(), "User already exists");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_across_handles() {
    let temp_dir = TempDir::new().unwrap();

    // Two independent store handles over one directory, like two processes
    let a = test_state(FlatFileStore::new(temp_dir.path()).unwrap());
    let b = test_state(FlatFileStore::new(temp_dir.path()).unwrap());

    let mut handles = Vec::new();
    for i in 0..8 {
        let state = if i % 2 == 0 { a.clone() } else { b.clone() };
        handles.push(tokio::spawn(async move { state.auth.register(ann()).await }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    let store = FlatFileStore::new(temp_dir.path()).unwrap();
    let account = store.find_by_email("ann@x.com").await.unwrap().unwrap();
    assert!(account.password_hash.starts_with("$2"));
}
