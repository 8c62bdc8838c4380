//! Session state owner.
//!
//! DESIGN
//! ======
//! `SessionStore` is the single writer of the current [`Session`]. State is
//! published through a `tokio::sync::watch` channel: readers call
//! [`SessionStore::subscribe`] and re-evaluate on every change, nobody polls.
//! Login, registration and restore share one in-flight slot guarded by an
//! atomic flag; the RAII [`InFlight`] guard owns the `is_loading` flag so it
//! is cleared on every exit path, including a dropped future.
//!
//! `logout` bumps a session epoch. An in-flight operation records the epoch
//! when it starts and only installs its result if the epoch is unchanged, so
//! a login or restore that finishes after a logout is dropped.
//!
//! PERSISTENCE
//! ===========
//! After every mutation the store re-syncs durable storage from the current
//! in-memory state under a mutex: a complete session is written, an empty
//! session removes the entry, a half-built one (only `set_user` or only
//! `set_token` so far) leaves storage untouched. Because each sync reads the
//! latest state, interleaved commands still converge on the last state.
//!
//! RESTORE
//! =======
//! A decoded snapshot is re-validated with [`AuthService::current_user`]
//! before it is installed. A rejected token or a token that now belongs to
//! someone else discards the snapshot. An unreadable store or an auth service
//! that cannot answer leaves the snapshot in place for the next start but
//! still settles anonymous.
//!
//! ERROR HANDLING
//! ==============
//! Login/registration failures propagate as [`AuthError`]. Restore failures
//! and storage write failures are logged and never propagate: the worst case
//! is an anonymous session and a forced re-login.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use super::snapshot::{self, SESSION_NAMESPACE};
use super::types::{AuthError, AuthState, Credentials, RestoreError, Session, User};
use crate::auth::AuthService;
use crate::storage::SessionStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Restore,
    Login,
    Register,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Self::Restore => "restore",
            Self::Login => "login",
            Self::Register => "register",
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<Session>,
    /// Set while a login, registration or restore holds the in-flight slot.
    busy: AtomicBool,
    /// Set once the first restore has settled (successfully or not).
    restored: AtomicBool,
    /// Set while the in-flight slot is held by a restore.
    restoring: AtomicBool,
    /// Bumped by every logout.
    epoch: AtomicU64,
    persist_lock: Mutex<()>,
}

impl SessionStore {
    /// Build an isolated store. The session starts anonymous and loading;
    /// it stays loading until [`SessionStore::restore`] settles.
    #[must_use]
    pub fn create(auth: Arc<dyn AuthService>, storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(Session { is_loading: true, ..Session::default() });
        Self {
            auth,
            storage,
            state,
            busy: AtomicBool::new(false),
            restored: AtomicBool::new(false),
            restoring: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            persist_lock: Mutex::new(()),
        }
    }

    /// [`create`](Self::create) followed by [`restore`](Self::restore).
    pub async fn open(auth: Arc<dyn AuthService>, storage: Arc<dyn SessionStorage>) -> Self {
        let store = Self::create(auth, storage);
        store.restore().await;
        store
    }

    /// End the store's lifecycle. Subscribers see the channel close.
    pub fn dispose(self) {
        debug!(authenticated = self.is_authenticated(), "session store disposed");
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current session, cloned.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Like [`Session::auth_state`], but reports [`AuthState::Restoring`]
    /// while the persisted session is being loaded.
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        let session = self.state.borrow();
        let restoring = self.restoring.load(Ordering::Acquire) || !self.is_restored();
        if session.is_loading && restoring && !session.is_authenticated() {
            AuthState::Restoring
        } else {
            session.auth_state()
        }
    }

    /// Signed-in user; `None` unless the session is complete.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().credentials().map(|c| c.user)
    }

    /// Bearer token for downstream calls; `None` unless the session is complete.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().credentials().map(|c| c.access_token)
    }

    /// Whether the startup restore has settled.
    #[must_use]
    pub fn is_restored(&self) -> bool {
        self.restored.load(Ordering::Acquire)
    }

    /// Receiver that observes every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Exchange credentials with the auth service and install the session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] without contacting the
    /// service for blank input, [`AuthError::InProgress`] while another
    /// attempt is in flight, and the service's error when the exchange fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.authenticate(Phase::Login, email, password).await
    }

    /// Create an account and install its session. Same contract as [`login`](Self::login).
    ///
    /// # Errors
    ///
    /// See [`login`](Self::login).
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.authenticate(Phase::Register, email, password).await
    }

    /// Clear identity and token and evict the persisted snapshot. Idempotent.
    /// A login or restore still in flight is superseded and will not install
    /// its result.
    pub async fn logout(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        let had_session = self.state.send_if_modified(|s| {
            let had = s.user.is_some() || s.access_token.is_some();
            s.clear();
            had
        });
        if had_session {
            info!("signed out");
        } else {
            debug!("logout on anonymous session");
        }
        self.sync_storage().await;
    }

    /// Install `user` without touching the token.
    pub async fn set_user(&self, user: User) {
        if !user.is_valid() {
            warn!("ignoring user record without id or email");
            return;
        }
        debug!(user_id = %user.id, "user installed");
        self.state.send_modify(|s| s.user = Some(user));
        self.sync_storage().await;
    }

    /// Install `token` without touching the user.
    pub async fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            warn!("ignoring blank access token");
            return;
        }
        self.state.send_modify(|s| s.access_token = Some(token));
        self.sync_storage().await;
    }

    /// Load the persisted session, if any, and re-validate its token. Corrupt,
    /// incompatible or expired snapshots are discarded and the session stays
    /// anonymous. Never fails.
    pub async fn restore(&self) {
        let Some(guard) = InFlight::begin(self, Phase::Restore) else {
            debug!("restore skipped: another operation is in flight");
            return;
        };

        let credentials = match self.load_snapshot().await {
            Ok(Some(credentials)) => credentials,
            Ok(None) => {
                debug!("no persisted session");
                guard.settle(Session::clear);
                return;
            }
            Err(RestoreError::Storage(e)) => {
                warn!(namespace = SESSION_NAMESPACE, error = %e, "session storage unreadable; starting anonymous");
                guard.settle(Session::clear);
                return;
            }
            Err(e) => {
                warn!(namespace = SESSION_NAMESPACE, error = %e, "discarding persisted session");
                self.discard_snapshot().await;
                guard.settle(Session::clear);
                return;
            }
        };

        let Credentials { user: saved, access_token } = credentials;
        match self.auth.current_user(&access_token).await {
            Ok(user) if user.id == saved.id => {
                let refreshed = user != saved;
                info!(user_id = %user.id, refreshed, "session restored");
                let installed = guard.settle(|s| s.install(Credentials { user, access_token }));
                if !installed {
                    debug!("restore superseded by logout");
                    return;
                }
                if refreshed {
                    self.sync_storage().await;
                }
            }
            Ok(user) => {
                warn!(saved = %saved.id, found = %user.id, "persisted token resolves to another user");
                self.discard_snapshot().await;
                guard.settle(Session::clear);
            }
            Err(e @ AuthError::Rejected(_)) => {
                info!(user_id = %saved.id, error = %e, "persisted session expired");
                self.discard_snapshot().await;
                guard.settle(Session::clear);
            }
            Err(e) => {
                warn!(user_id = %saved.id, code = e.code(), error = %e, "could not verify persisted session; starting anonymous");
                guard.settle(Session::clear);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn authenticate(&self, phase: Phase, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if !self.is_restored() {
            return Err(AuthError::NotRestored);
        }
        if self.is_authenticated() {
            return Err(AuthError::AlreadyAuthenticated);
        }
        let guard = InFlight::begin(self, phase).ok_or(AuthError::InProgress)?;

        info!(email, phase = phase.as_str(), "sign-in started");
        let result = match phase {
            Phase::Register => self.auth.register(email, password).await,
            Phase::Login | Phase::Restore => self.auth.exchange_credentials(email, password).await,
        };

        let credentials = match result {
            Ok(c) if c.user.is_valid() && !c.access_token.trim().is_empty() => c,
            Ok(_) => {
                warn!(email, "auth service returned an incomplete session");
                return Err(AuthError::InvalidResponse("incomplete session".into()));
            }
            Err(e) => {
                warn!(email, code = e.code(), error = %e, "sign-in failed");
                return Err(e);
            }
        };

        let user = credentials.user.clone();
        if !guard.settle(|s| s.install(credentials)) {
            info!(user_id = %user.id, phase = phase.as_str(), "sign-in superseded by logout");
            return Err(AuthError::Superseded);
        }
        info!(user_id = %user.id, phase = phase.as_str(), "signed in");
        self.sync_storage().await;
        Ok(user)
    }

    async fn load_snapshot(&self) -> Result<Option<Credentials>, RestoreError> {
        let Some(raw) = self.storage.read(SESSION_NAMESPACE).await? else {
            return Ok(None);
        };
        snapshot::decode(&raw).map(Some)
    }

    async fn discard_snapshot(&self) {
        let _lock = self.persist_lock.lock().await;
        if let Err(e) = self.storage.remove(SESSION_NAMESPACE).await {
            warn!(namespace = SESSION_NAMESPACE, error = %e, "failed to discard snapshot");
        }
    }

    /// Bring durable storage in line with the current in-memory session.
    async fn sync_storage(&self) {
        let _lock = self.persist_lock.lock().await;
        let (credentials, empty) = {
            let s = self.state.borrow();
            (s.credentials(), s.user.is_none() && s.access_token.is_none())
        };

        let result = match credentials {
            Some(c) => match snapshot::encode(&c) {
                Ok(raw) => self.storage.write(SESSION_NAMESPACE, &raw).await,
                Err(e) => Err(e),
            },
            None if empty => self.storage.remove(SESSION_NAMESPACE).await,
            None => return,
        };

        if let Err(e) = result {
            warn!(namespace = SESSION_NAMESPACE, error = %e, "session snapshot sync failed");
        }
    }
}

// =============================================================================
// IN-FLIGHT GUARD
// =============================================================================

/// Holds the store's single in-flight slot and its loading flag.
///
/// Dropping the guard without [`settle`](InFlight::settle) (error return,
/// cancelled future) clears `is_loading` and releases the slot. A dropped
/// restore counts as settled-anonymous.
struct InFlight<'a> {
    store: &'a SessionStore,
    phase: Phase,
    epoch: u64,
}

impl<'a> InFlight<'a> {
    fn begin(store: &'a SessionStore, phase: Phase) -> Option<Self> {
        store
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        if phase == Phase::Restore {
            store.restoring.store(true, Ordering::Release);
        }
        let epoch = store.epoch.load(Ordering::Acquire);
        store.state.send_if_modified(|s| !std::mem::replace(&mut s.is_loading, true));
        Some(Self { store, phase, epoch })
    }

    /// Apply the final mutation and clear the loading flag in one update.
    /// The mutation is skipped if a logout happened since [`begin`](Self::begin);
    /// returns whether it was applied.
    fn settle(self, apply: impl FnOnce(&mut Session)) -> bool {
        if self.phase == Phase::Restore {
            self.store.restored.store(true, Ordering::Release);
        }
        let mut applied = false;
        self.store.state.send_modify(|s| {
            // Checked under the channel lock so it orders against logout's clear.
            if self.store.epoch.load(Ordering::Acquire) == self.epoch {
                apply(s);
                applied = true;
            }
            s.is_loading = false;
        });
        applied
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.phase == Phase::Restore {
            self.store.restored.store(true, Ordering::Release);
            self.store.restoring.store(false, Ordering::Release);
        }
        self.store
            .state
            .send_if_modified(|s| std::mem::replace(&mut s.is_loading, false));
        self.store.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
