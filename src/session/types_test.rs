use super::*;

fn alice() -> User {
    User { id: "1".into(), email: "a@b.com".into(), timezone: "Europe/London".into(), is_admin: false }
}

// =============================================================================
// User
// =============================================================================

#[test]
fn user_valid_requires_id_and_email() {
    assert!(alice().is_valid());
    assert!(!User { id: "  ".into(), ..alice() }.is_valid());
    assert!(!User { email: String::new(), ..alice() }.is_valid());
}

#[test]
fn user_deserialize_defaults_timezone_and_admin() {
    let user: User = serde_json::from_str(r#"{"id":"7","email":"x@y.z"}"#).unwrap();
    assert_eq!(user.timezone, DEFAULT_TIMEZONE);
    assert!(!user.is_admin);
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn default_session_is_anonymous() {
    let session = Session::default();
    assert!(!session.is_authenticated());
    assert_eq!(session.auth_state(), AuthState::Anonymous);
    assert!(session.credentials().is_none());
}

#[test]
fn user_without_token_is_not_authenticated() {
    let session = Session { user: Some(alice()), access_token: None, is_loading: false };
    assert!(!session.is_authenticated());
    assert_eq!(session.auth_state(), AuthState::Anonymous);
    assert!(session.credentials().is_none());
}

#[test]
fn token_without_user_is_not_authenticated() {
    let session = Session { user: None, access_token: Some("tok".into()), is_loading: false };
    assert!(!session.is_authenticated());
}

#[test]
fn loading_anonymous_session_is_authenticating() {
    let session = Session { is_loading: true, ..Session::default() };
    assert_eq!(session.auth_state(), AuthState::Authenticating);
}

#[test]
fn install_then_clear() {
    let mut session = Session::default();
    session.install(Credentials { user: alice(), access_token: "tok".into() });
    assert!(session.is_authenticated());
    assert_eq!(session.auth_state(), AuthState::Authenticated);
    assert_eq!(session.credentials().unwrap().access_token, "tok");

    session.clear();
    assert_eq!(session, Session::default());
}

// =============================================================================
// AuthError
// =============================================================================

#[test]
fn auth_error_codes_are_distinct() {
    let errors = [
        AuthError::MissingCredentials,
        AuthError::InProgress,
        AuthError::AlreadyAuthenticated,
        AuthError::Superseded,
        AuthError::NotRestored,
        AuthError::Rejected("no".into()),
        AuthError::Unreachable("down".into()),
        AuthError::UnexpectedStatus { status: 500, body: String::new() },
        AuthError::InvalidResponse("bad".into()),
    ];
    let mut codes: Vec<_> = errors.iter().map(AuthError::code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn auth_error_retryable_classification() {
    assert!(AuthError::Unreachable("timeout".into()).retryable());
    assert!(AuthError::UnexpectedStatus { status: 503, body: String::new() }.retryable());
    assert!(!AuthError::UnexpectedStatus { status: 404, body: String::new() }.retryable());
    assert!(!AuthError::Rejected("Invalid credentials".into()).retryable());
    assert!(!AuthError::MissingCredentials.retryable());
    assert!(!AuthError::Superseded.retryable());
}

#[test]
fn rejected_message_includes_detail() {
    let err = AuthError::Rejected("Account is inactive".into());
    assert_eq!(err.to_string(), "credentials rejected: Account is inactive");
}
