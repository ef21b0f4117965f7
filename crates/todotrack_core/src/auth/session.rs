//! Session and auth event types.

use crate::model::task::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Authenticated session handed to the client after sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    /// Stable user identifier used for row-level scoping.
    pub user_id: UserId,
    /// OAuth provider id, e.g. `google`.
    pub provider: String,
    /// Provider-side account identifier (usually an email address).
    pub account: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Auth state transitions pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

impl AuthEvent {
    /// Session after this event, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(session) => Some(session),
            AuthEvent::SignedOut => None,
        }
    }
}

/// OAuth sign-in request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRequest {
    pub provider: String,
    pub account: String,
    /// Where the provider should send the user back after consent.
    pub redirect_to: Option<String>,
}

impl OAuthRequest {
    pub fn new(provider: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            account: account.into(),
            redirect_to: None,
        }
    }

    pub fn with_redirect(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = Some(redirect_to.into());
        self
    }
}

/// Input validation failures for sign-in requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInValidationError {
    InvalidProvider(String),
    BlankAccount,
}

impl Display for SignInValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidProvider(value) => write!(
                f,
                "provider id is invalid: `{value}`; expected lowercase [a-z0-9_-]"
            ),
            Self::BlankAccount => write!(f, "account must not be blank"),
        }
    }
}

impl Error for SignInValidationError {}

impl OAuthRequest {
    /// Returns `(provider, account)` trimmed, or the first rule violated.
    pub fn normalized(&self) -> Result<(String, String), SignInValidationError> {
        let provider = self.provider.trim();
        if !is_valid_provider_id(provider) {
            return Err(SignInValidationError::InvalidProvider(provider.to_string()));
        }
        let account = self.account.trim();
        if account.is_empty() {
            return Err(SignInValidationError::BlankAccount);
        }
        Ok((provider.to_string(), account.to_string()))
    }
}

fn is_valid_provider_id(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::{OAuthRequest, SignInValidationError};

    #[test]
    fn normalized_trims_provider_and_account() {
        let request = OAuthRequest::new("  google ", " me@example.com ");
        assert_eq!(
            request.normalized(),
            Ok(("google".to_string(), "me@example.com".to_string()))
        );
    }

    #[test]
    fn normalized_rejects_bad_provider_and_blank_account() {
        assert!(matches!(
            OAuthRequest::new("Google", "me").normalized(),
            Err(SignInValidationError::InvalidProvider(_))
        ));
        assert_eq!(
            OAuthRequest::new("google", "  ").normalized(),
            Err(SignInValidationError::BlankAccount)
        );
    }
}
