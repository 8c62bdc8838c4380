//! Client-side session core for the SD Browser guide application.
//!
//! ARCHITECTURE
//! ============
//! `session::SessionStore` is the single source of truth for who is signed
//! in. `route` is a pure projection of that state onto the application's
//! route sets. `auth` and `storage` are the injected collaborators: the
//! credential exchange and the durable snapshot surface.

pub mod auth;
pub mod config;
pub mod route;
pub mod session;
pub mod storage;

pub use auth::{AuthService, AuthTimeouts, HttpAuthService};
pub use config::{ConfigError, SessionConfig};
pub use route::{GateMode, Route, RouteDecision, RouteWatch};
pub use session::{AuthError, AuthState, Credentials, RestoreError, Session, SessionStore, User};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
