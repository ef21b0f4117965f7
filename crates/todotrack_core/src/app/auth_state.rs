//! Client-side view of the current session.
//!
//! Mirrors the backend session through an initial `get_session` call plus
//! the auth state change subscription.

use crate::auth::gateway::AuthGateway;
use crate::auth::session::{AuthEvent, OAuthRequest, Session};
use crate::feed::listeners::Subscription;
use log::{error, info};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;

/// Session tracker fed by auth state notifications.
pub struct AuthState {
    session: Option<Session>,
    events: Receiver<AuthEvent>,
    _subscription: Subscription,
}

impl AuthState {
    /// Subscribes to auth changes, then loads the current session.
    ///
    /// A failing session lookup is logged and treated as signed out.
    pub fn connect<G: AuthGateway + ?Sized>(gateway: &G) -> Self {
        let (sender, events) = channel();
        let sender = Mutex::new(sender);
        let subscription = gateway.on_auth_state_change(Box::new(move |event: &AuthEvent| {
            if let Ok(sender) = sender.lock() {
                let _ = sender.send(event.clone());
            }
        }));

        let session = match gateway.get_session() {
            Ok(session) => session,
            Err(err) => {
                error!("event=session_load module=app status=error error={err}");
                None
            }
        };

        Self {
            session,
            events,
            _subscription: subscription,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Applies queued auth events. Returns whether the session changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            let next = event.session().cloned();
            if next != self.session {
                self.session = next;
                changed = true;
            }
        }
        changed
    }
}

/// Starts an OAuth sign-in; failures are logged and reported as `false`.
pub fn sign_in<G: AuthGateway + ?Sized>(gateway: &G, request: &OAuthRequest) -> bool {
    match gateway.sign_in_with_oauth(request) {
        Ok(session) => {
            info!(
                "event=sign_in module=app status=ok provider={}",
                session.provider
            );
            true
        }
        Err(err) => {
            error!("event=sign_in module=app status=error error={err}");
            false
        }
    }
}

/// Ends the session; failures are logged and reported as `false`.
pub fn sign_out<G: AuthGateway + ?Sized>(gateway: &G) -> bool {
    match gateway.sign_out() {
        Ok(()) => true,
        Err(err) => {
            error!("event=sign_out module=app status=error error={err}");
            false
        }
    }
}
