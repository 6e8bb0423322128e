//! Auth gateway contract.
//!
//! # Responsibility
//! - Describe the external identity provider the app delegates to.
//! - Carry gateway failures as user-presentable errors.
//!
//! # Invariants
//! - Core never persists or mutates an [`Identity`].
//! - Every gateway failure is recoverable; none is fatal to the process.

pub mod flow;

use crate::model::identity::Identity;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type AuthResult<T> = Result<T, AuthError>;

/// Callback fired with the new identity (`None` after sign-out).
pub type IdentityListener = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

/// Failures surfaced inline on the auth form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    PasswordMismatch,
    PopupClosed,
    /// Any other gateway failure, carrying its human-readable message.
    Gateway(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "The email or password is incorrect."),
            Self::PasswordMismatch => write!(f, "Passwords don't match"),
            Self::PopupClosed => write!(f, "The sign-in popup was closed before completing."),
            Self::Gateway(message) => write!(f, "{message}"),
        }
    }
}

impl Error for AuthError {}

/// Federated providers offered by the login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn id(self) -> &'static str {
        match self {
            Self::Google => "google.com",
        }
    }
}

/// Registration returned by [`AuthGateway::on_identity_change`].
///
/// Cancelling is idempotent; dropping the handle cancels it too.
pub struct IdentitySubscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl IdentitySubscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for IdentitySubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// External identity provider.
pub trait AuthGateway: Send + Sync {
    fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity>;
    fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity>;
    /// Sets the display name of the signed-in identity.
    fn set_display_name(&self, name: &str) -> AuthResult<Identity>;
    fn sign_in_with_popup(&self, provider: OAuthProvider) -> AuthResult<Identity>;
    fn sign_out(&self) -> AuthResult<()>;
    /// Registers a listener; it fires once with the current identity, then on
    /// every change.
    fn on_identity_change(&self, listener: IdentityListener) -> IdentitySubscription;
}
