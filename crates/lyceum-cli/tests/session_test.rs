//! Session handling of the CLI client factory against a temporary data directory

use lyceum_cli::client::{create_authenticated_client, create_client};
use lyceum_cli::config::{CliConfig, SessionConfig};
use lyceum_cli::CliError;
use lyceum_sdk::{CredentialStore, FileSessionStorage, Role, User};
use std::sync::Arc;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> CliConfig {
    CliConfig {
        session: SessionConfig {
            dir: Some(dir.path().to_path_buf()),
        },
        ..CliConfig::default()
    }
}

fn admin() -> User {
    serde_json::from_value(serde_json::json!({
        "id": "u-1",
        "firstname": "Dilnoza",
        "lastname": "Karimova",
        "phone": "+998901234567",
        "role": "ADMIN"
    }))
    .unwrap()
}

#[test]
fn test_fresh_directory_requires_login() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let client = create_client(&config).unwrap();
    assert!(!client.is_authenticated());

    let err = create_authenticated_client(&config).unwrap_err();
    assert!(matches!(err, CliError::NotLoggedIn));
}

#[test]
fn test_session_written_earlier_is_picked_up() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSessionStorage::new(dir.path()));
    CredentialStore::new(storage)
        .set("T1", Some("R1".into()), Some(admin()))
        .unwrap();

    let client = create_authenticated_client(&config_in(&dir)).unwrap();
    let user = client.current_user().unwrap();

    assert_eq!(client.access_token().as_deref(), Some("T1"));
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.full_name(), "Dilnoza Karimova");
}

#[test]
fn test_logout_removes_session_file() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSessionStorage::new(dir.path()));
    CredentialStore::new(storage)
        .set("T1", Some("R1".into()), Some(admin()))
        .unwrap();

    let client = create_client(&config_in(&dir)).unwrap();
    client.logout().unwrap();

    let reopened = create_client(&config_in(&dir)).unwrap();
    assert!(!reopened.is_authenticated());
}
