//! Identity provider abstraction.
//!
//! The engine only needs two things from the provider: a stream of
//! auth-state changes to drive session attach/detach, and a way to sign
//! out. Credential handling (token exchange, password verification)
//! stays inside the provider. [`MemoryAuth`] is the in-process
//! implementation used by tests and the demo binary.
//!
//! Registration input checks live here as pure functions so a sign-up
//! form can reject bad input before it ever reaches the provider.

use taskdeck_model::UserProfile;
use tokio::sync::watch;

/// Minimum accepted password length for registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Current authentication state as reported by the provider.
///
/// Provider-side auth errors collapse into `SignedOut`: an unusable
/// session is treated exactly like no session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// No usable session.
    #[default]
    SignedOut,
    /// A user is signed in.
    SignedIn(UserProfile),
}

impl AuthState {
    /// Returns the signed-in profile, if any.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::SignedOut => None,
            Self::SignedIn(profile) => Some(profile),
        }
    }
}

/// Errors surfaced by identity operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The provider could not be reached or rejected the request.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Async client for the identity provider.
pub trait AuthClient: Send + Sync {
    /// Subscribes to auth-state changes. The receiver always holds the
    /// current state, so a new subscriber sees it without waiting.
    fn state(&self) -> watch::Receiver<AuthState>;

    /// Ends the current session. After this resolves, the state stream
    /// reports [`AuthState::SignedOut`].
    fn sign_out(&self) -> impl std::future::Future<Output = Result<(), AuthError>> + Send;
}

/// In-process identity provider.
///
/// Accepts any sign-in; holds the state on a watch channel that every
/// consumer shares.
#[derive(Debug)]
pub struct MemoryAuth {
    tx: watch::Sender<AuthState>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    /// Creates a provider with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthState::SignedOut);
        Self { tx }
    }

    /// Signs a user in, replacing any existing session.
    pub fn sign_in(&self, profile: UserProfile) {
        tracing::info!(user = %profile.id, email = %profile.email, "signed in");
        let _ = self.tx.send(AuthState::SignedIn(profile));
    }
}

impl AuthClient for MemoryAuth {
    fn state(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        tracing::info!("signed out");
        let _ = self.tx.send(AuthState::SignedOut);
        Ok(())
    }
}

/// Errors from registration input checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// One or more of the required fields is empty.
    #[error("please fill in all fields")]
    MissingFields,
    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,
    /// Password is shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
}

/// Checks registration form input before it reaches the provider.
///
/// # Errors
///
/// Returns the first failed check, in form order: missing fields, then
/// mismatched confirmation, then password length.
pub fn validate_registration(
    email: &str,
    password: &str,
    confirmation: &str,
) -> Result<(), CredentialError> {
    if email.is_empty() || password.is_empty() || confirmation.is_empty() {
        return Err(CredentialError::MissingFields);
    }
    if password != confirmation {
        return Err(CredentialError::PasswordMismatch);
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(CredentialError::PasswordTooShort);
    }
    Ok(())
}
