use super::*;

#[tokio::test]
async fn read_absent_is_none() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.read("auth-storage").await.unwrap(), None);
}

#[tokio::test]
async fn write_then_read() {
    let storage = MemoryStorage::new();
    storage.write("auth-storage", "{}").await.unwrap();
    assert_eq!(storage.read("auth-storage").await.unwrap().as_deref(), Some("{}"));
}

#[tokio::test]
async fn write_replaces_previous_value() {
    let storage = MemoryStorage::with_entry("auth-storage", "old");
    storage.write("auth-storage", "new").await.unwrap();
    assert_eq!(storage.get("auth-storage").as_deref(), Some("new"));
}

#[tokio::test]
async fn remove_is_idempotent() {
    let storage = MemoryStorage::with_entry("auth-storage", "x");
    storage.remove("auth-storage").await.unwrap();
    storage.remove("auth-storage").await.unwrap();
    assert!(storage.get("auth-storage").is_none());
}

#[tokio::test]
async fn namespaces_are_independent() {
    let storage = MemoryStorage::with_entry("a", "1");
    storage.write("b", "2").await.unwrap();
    storage.remove("a").await.unwrap();
    assert_eq!(storage.get("b").as_deref(), Some("2"));
}
