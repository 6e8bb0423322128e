//! Login/sign-up form flow.
//!
//! # Responsibility
//! - Hold auth form input and the inline error shown under it.
//! - Enforce the sign-up password confirmation before calling the gateway.
//!
//! # Invariants
//! - A failed submit leaves the form populated and records one error message.
//! - Passwords are never logged.

use super::{AuthError, AuthGateway, AuthResult, OAuthProvider};
use crate::model::identity::Identity;
use log::{info, warn};

/// Which action the form submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign_in",
            Self::SignUp => "sign_up",
        }
    }
}

/// State of the login screen form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Only used in sign-up mode.
    pub display_name: String,
    error: Option<String>,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Switches between sign-in and sign-up, clearing the inline error.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.error = None;
    }

    /// Inline error from the last failed attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submits the form in its current mode.
    ///
    /// # Contract
    /// - Sign-up checks `password == confirm_password` before any gateway call.
    /// - Sign-up sets the display name when one was entered.
    /// - On failure the message is kept in [`AuthForm::error`].
    pub fn submit(&mut self, gateway: &dyn AuthGateway) -> AuthResult<Identity> {
        self.error = None;
        let result = match self.mode {
            AuthMode::SignIn => gateway.sign_in(self.email.trim(), &self.password),
            AuthMode::SignUp => self.sign_up(gateway),
        };
        self.record(self.mode.as_str(), result)
    }

    /// Signs in through a federated provider popup.
    pub fn sign_in_with_provider(
        &mut self,
        gateway: &dyn AuthGateway,
        provider: OAuthProvider,
    ) -> AuthResult<Identity> {
        self.error = None;
        let result = gateway.sign_in_with_popup(provider);
        self.record(provider.id(), result)
    }

    fn sign_up(&self, gateway: &dyn AuthGateway) -> AuthResult<Identity> {
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        let identity = gateway.sign_up(self.email.trim(), &self.password)?;
        let display_name = self.display_name.trim();
        if display_name.is_empty() {
            return Ok(identity);
        }
        gateway.set_display_name(display_name)
    }

    fn record(&mut self, method: &str, result: AuthResult<Identity>) -> AuthResult<Identity> {
        match &result {
            Ok(_) => {
                self.password.clear();
                self.confirm_password.clear();
                info!(
                    "event=auth_submit module=auth status=ok method={}",
                    method
                );
            }
            Err(err) => {
                warn!(
                    "event=auth_submit module=auth status=error method={} error={:?}",
                    method, err
                );
                self.error = Some(err.to_string());
            }
        }
        result
    }
}
