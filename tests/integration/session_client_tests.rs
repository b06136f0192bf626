// ==============================
// tests/integration/session_client_tests.rs
// ==============================
//! Session client against a live server
use crate::test_utils::{spawn_server, test_state};
use accounts_backend_lib::storage::MemoryStore;
use accounts_client::{ClientConfig, ClientError, NoticeLevel, Route, SessionClient};
use chrono::NaiveDate;

async fn connected_client() -> SessionClient {
    let addr = spawn_server(test_state(MemoryStore::new())).await;
    SessionClient::new(ClientConfig::new(format!("http://{addr}"))).unwrap()
}

fn dob() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1990, 1, 1)
}

#[tokio::test]
async fn test_register_logout_login() {
    let client = connected_client().await;
    let mut notices = client.subscribe();

    assert_eq!(client.resolve(Route::Dashboard).await, Route::Login);

    let user = client.register("Ann", dob(), "ann@x.com", "hunter2").await.unwrap();
    assert_eq!(user.name, "Ann");
    assert_eq!(client.resolve(Route::Dashboard).await, Route::Dashboard);
    let message = client.fetch_protected().await.unwrap();
    assert_eq!(message.message, "This is a protected route");

    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);

    client.logout().await;
    assert_eq!(client.fetch_protected().await, Err(ClientError::LoginRequired));

    let again = client.login("ann@x.com", "hunter2").await.unwrap();
    assert_eq!(again, user);
    assert_eq!(client.current_user().await, Some(user));
}

#[tokio::test]
async fn test_server_messages_reach_the_user() {
    let client = connected_client().await;
    let mut notices = client.subscribe();

    client.register("Ann", dob(), "ann@x.com", "hunter2").await.unwrap();
    client.logout().await;
    notices.recv().await.unwrap();

    let err = client.register("Ann", dob(), "ann@x.com", "hunter2").await.unwrap_err();
    assert_eq!(err.to_string(), "User already exists");
    assert!(!client.is_authenticated().await);

    let err = client.login("ann@x.com", "wrong").await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Server {
            status: 400,
            message: "Invalid credentials".to_string()
        }
    );

    let first = notices.recv().await.unwrap();
    let second = notices.recv().await.unwrap();
    assert_eq!(first.level, NoticeLevel::Error);
    assert_eq!(first.message, "User already exists");
    assert_eq!(second.message, "Invalid credentials");
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let client = connected_client().await;
    let user = client.register("Ann", dob(), "ann@x.com", "hunter2").await.unwrap();

    client.login("ann@x.com", "wrong").await.unwrap_err();
    assert_eq!(client.current_user().await, Some(user));
    assert!(client.fetch_protected().await.is_ok());
}
