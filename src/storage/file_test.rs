use super::*;

fn temp_storage() -> FileStorage {
    let dir = std::env::temp_dir().join(format!("sd-session-test-{}", uuid::Uuid::new_v4()));
    FileStorage::new(dir)
}

#[test]
fn path_for_appends_json_extension() {
    let storage = FileStorage::new("/var/lib/sd");
    assert_eq!(storage.path_for("auth-storage").unwrap(), PathBuf::from("/var/lib/sd/auth-storage.json"));
}

#[test]
fn path_for_rejects_traversal() {
    let storage = FileStorage::new("/var/lib/sd");
    assert!(matches!(storage.path_for("../passwd"), Err(StorageError::InvalidNamespace(_))));
}

#[tokio::test]
async fn read_missing_directory_is_none() {
    let storage = temp_storage();
    assert_eq!(storage.read("auth-storage").await.unwrap(), None);
}

#[tokio::test]
async fn write_creates_directory_and_round_trips() {
    let storage = temp_storage();
    storage.write("auth-storage", r#"{"version":1}"#).await.unwrap();
    assert!(storage.dir().is_dir());
    assert_eq!(storage.read("auth-storage").await.unwrap().as_deref(), Some(r#"{"version":1}"#));
    assert!(!storage.dir().join("auth-storage.json.tmp").exists());

    let _ = std::fs::remove_dir_all(storage.dir());
}

#[tokio::test]
async fn write_overwrites() {
    let storage = temp_storage();
    storage.write("auth-storage", "first").await.unwrap();
    storage.write("auth-storage", "second").await.unwrap();
    assert_eq!(storage.read("auth-storage").await.unwrap().as_deref(), Some("second"));

    let _ = std::fs::remove_dir_all(storage.dir());
}

#[tokio::test]
async fn remove_deletes_file_and_is_idempotent() {
    let storage = temp_storage();
    storage.write("auth-storage", "x").await.unwrap();
    storage.remove("auth-storage").await.unwrap();
    assert!(!storage.path_for("auth-storage").unwrap().exists());
    storage.remove("auth-storage").await.unwrap();
    assert_eq!(storage.read("auth-storage").await.unwrap(), None);

    let _ = std::fs::remove_dir_all(storage.dir());
}

#[tokio::test]
async fn invalid_namespace_fails_every_operation() {
    let storage = temp_storage();
    assert!(storage.read("a/b").await.is_err());
    assert!(storage.write("a/b", "x").await.is_err());
    assert!(storage.remove("a/b").await.is_err());
}
