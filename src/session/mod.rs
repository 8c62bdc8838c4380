//! Client-side session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `store` owns the lifecycle (create, restore, login/register, logout,
//! dispose), `snapshot` defines what survives a restart, and `types` holds
//! the shared model consumed by `route` and the presentation layer.

pub mod snapshot;
pub mod store;
pub mod types;

pub use snapshot::{SESSION_NAMESPACE, SNAPSHOT_VERSION};
pub use store::SessionStore;
pub use types::{AuthError, AuthState, Credentials, DEFAULT_TIMEZONE, RestoreError, Session, User};
