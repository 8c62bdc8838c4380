use super::*;

fn sample() -> Credentials {
    Credentials {
        user: User { id: "1".into(), email: "a@b.com".into(), timezone: "UTC".into(), is_admin: true },
        access_token: "tok".into(),
    }
}

#[test]
fn encode_writes_version_and_omits_loading() {
    let raw = encode(&sample()).unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], SNAPSHOT_VERSION);
    assert_eq!(value["access_token"], "tok");
    assert_eq!(value["user"]["id"], "1");
    assert_eq!(value["user"]["is_admin"], true);
    assert!(value.get("is_loading").is_none());
}

#[test]
fn decode_accepts_encoded_snapshot() {
    let raw = encode(&sample()).unwrap();
    assert_eq!(decode(&raw).unwrap(), sample());
}

#[test]
fn decode_rejects_garbage() {
    assert!(matches!(decode("{not json"), Err(RestoreError::Malformed(_))));
    assert!(matches!(decode(""), Err(RestoreError::Malformed(_))));
}

#[test]
fn decode_rejects_missing_version() {
    let raw = r#"{"user":{"id":"1","email":"a@b.com"},"access_token":"tok"}"#;
    assert!(matches!(decode(raw), Err(RestoreError::Incomplete("version"))));
}

#[test]
fn decode_rejects_future_version() {
    let raw = r#"{"version":2,"user":{"id":"1","email":"a@b.com"},"access_token":"tok"}"#;
    assert!(matches!(decode(raw), Err(RestoreError::UnsupportedVersion { found: 2, expected: 1 })));
}

#[test]
fn decode_rejects_non_numeric_version() {
    let raw = r#"{"version":"1","user":{"id":"1","email":"a@b.com"},"access_token":"tok"}"#;
    assert!(matches!(decode(raw), Err(RestoreError::Malformed(_))));
}

#[test]
fn decode_rejects_token_without_user() {
    let raw = r#"{"version":1,"user":null,"access_token":"tok"}"#;
    assert!(matches!(decode(raw), Err(RestoreError::Incomplete("user"))));
}

#[test]
fn decode_rejects_user_without_token() {
    let raw = r#"{"version":1,"user":{"id":"1","email":"a@b.com"}}"#;
    assert!(matches!(decode(raw), Err(RestoreError::Incomplete("access_token"))));
}

#[test]
fn decode_rejects_blank_fields() {
    let blank_token = r#"{"version":1,"user":{"id":"1","email":"a@b.com"},"access_token":"  "}"#;
    assert!(matches!(decode(blank_token), Err(RestoreError::Incomplete("access_token"))));

    let blank_id = r#"{"version":1,"user":{"id":"","email":"a@b.com"},"access_token":"tok"}"#;
    assert!(matches!(decode(blank_id), Err(RestoreError::Incomplete("user.id"))));

    let blank_email = r#"{"version":1,"user":{"id":"1","email":" "},"access_token":"tok"}"#;
    assert!(matches!(decode(blank_email), Err(RestoreError::Incomplete("user.email"))));
}

#[test]
fn decode_rejects_wrongly_typed_user() {
    let raw = r#"{"version":1,"user":"alice","access_token":"tok"}"#;
    assert!(matches!(decode(raw), Err(RestoreError::Malformed(_))));
}

#[test]
fn decode_tolerates_unknown_fields() {
    let raw = r#"{"version":1,"user":{"id":"1","email":"a@b.com","avatar":"x"},"access_token":"tok","extra":1}"#;
    let creds = decode(raw).unwrap();
    assert_eq!(creds.user.timezone, "UTC");
    assert!(!creds.user.is_admin);
}
