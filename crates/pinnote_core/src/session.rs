//! Auth-to-sync session wiring.
//!
//! # Responsibility
//! - Follow identity changes reported by the auth gateway.
//! - Keep the sync controller subscribed to exactly the current identity.
//!
//! # Invariants
//! - On every identity change the running subscription is stopped before
//!   anything else happens.
//! - Sign-out stops the subscription before the gateway is called.
//! - `loading` stays true until the gateway reports the first identity.

use crate::auth::{AuthGateway, AuthResult, IdentitySubscription};
use crate::model::identity::Identity;
use crate::store::DocumentStore;
use crate::sync::NotesController;
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Observable session status for the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub loading: bool,
    pub identity: Option<Identity>,
    /// Last subscription failure, shown as a notification.
    pub last_error: Option<String>,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            loading: true,
            identity: None,
            last_error: None,
        }
    }
}

/// Binds an [`AuthGateway`] to a [`NotesController`].
pub struct Session<G: AuthGateway, S: DocumentStore + 'static> {
    gateway: Arc<G>,
    controller: Arc<NotesController<S>>,
    status: Arc<Mutex<SessionStatus>>,
    identity_subscription: Mutex<Option<IdentitySubscription>>,
}

impl<G: AuthGateway, S: DocumentStore + 'static> Session<G, S> {
    pub fn new(gateway: Arc<G>, controller: Arc<NotesController<S>>) -> Self {
        Self {
            gateway,
            controller,
            status: Arc::new(Mutex::new(SessionStatus::default())),
            identity_subscription: Mutex::new(None),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn controller(&self) -> &Arc<NotesController<S>> {
        &self.controller
    }

    pub fn status(&self) -> SessionStatus {
        lock(&self.status).clone()
    }

    /// Starts following the gateway's identity. Calling it again re-registers.
    pub fn attach(&self) {
        let controller = Arc::clone(&self.controller);
        let status = Arc::clone(&self.status);
        let subscription = self
            .gateway
            .on_identity_change(Arc::new(move |identity: Option<Identity>| {
                apply_identity(&controller, &status, identity);
            }));

        let previous = lock(&self.identity_subscription).replace(subscription);
        if let Some(mut previous) = previous {
            previous.cancel();
        }
    }

    /// Stops following the gateway and stops the note subscription.
    pub fn detach(&self) {
        if let Some(mut subscription) = lock(&self.identity_subscription).take() {
            subscription.cancel();
        }
        self.controller.stop();
    }

    /// Signs out, dropping the note subscription first.
    pub fn sign_out(&self) -> AuthResult<()> {
        self.controller.reset();
        {
            let mut status = lock(&self.status);
            status.identity = None;
            status.last_error = None;
        }
        self.gateway.sign_out()
    }
}

impl<G: AuthGateway, S: DocumentStore + 'static> Drop for Session<G, S> {
    fn drop(&mut self) {
        self.detach();
    }
}

fn apply_identity<S: DocumentStore>(
    controller: &NotesController<S>,
    status: &Mutex<SessionStatus>,
    identity: Option<Identity>,
) {
    controller.stop();

    let last_error = match identity.clone() {
        Some(identity) => match controller.start(identity) {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    "event=session_identity module=session status=error error={}",
                    err
                );
                Some(err.to_string())
            }
        },
        None => {
            controller.reset();
            None
        }
    };

    info!(
        "event=session_identity module=session status=ok signed_in={}",
        identity.is_some()
    );
    let mut status = lock(status);
    status.loading = false;
    status.identity = identity;
    status.last_error = last_error;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
