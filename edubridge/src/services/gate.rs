//! Admin gating
//!
//! `Checking` until the first auth state arrives, then `Authenticated` or
//! `Unauthenticated`, following every sign-in and sign-out afterwards.
//! The gate stops listening when dropped.

use crate::services::AdminIdentity;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Checking,
    Authenticated(AdminIdentity),
    Unauthenticated,
}

/// What the admin area shows for a gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminScreen {
    Loading,
    SignInForm,
    Dashboard,
}

impl GateState {
    pub fn screen(&self) -> AdminScreen {
        match self {
            GateState::Checking => AdminScreen::Loading,
            GateState::Authenticated(_) => AdminScreen::Dashboard,
            GateState::Unauthenticated => AdminScreen::SignInForm,
        }
    }
}

impl From<Option<AdminIdentity>> for GateState {
    fn from(identity: Option<AdminIdentity>) -> Self {
        match identity {
            Some(identity) => GateState::Authenticated(identity),
            None => GateState::Unauthenticated,
        }
    }
}

pub struct AdminGate {
    state: watch::Receiver<GateState>,
    listener: JoinHandle<()>,
}

impl AdminGate {
    /// Subscribe to auth state changes. Must be called within a Tokio runtime.
    pub fn start(mut auth_state: watch::Receiver<Option<AdminIdentity>>) -> Self {
        let (tx, state) = watch::channel(GateState::Checking);

        let listener = tokio::spawn(async move {
            loop {
                let next = GateState::from(auth_state.borrow_and_update().clone());
                tracing::debug!("Admin gate: {:?}", next.screen());

                if tx.send(next).is_err() {
                    break;
                }
                if auth_state.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { state, listener }
    }

    pub fn state(&self) -> GateState {
        self.state.borrow().clone()
    }

    pub fn screen(&self) -> AdminScreen {
        self.state.borrow().screen()
    }

    /// Wait until the gate reaches a state matching `predicate`
    pub async fn wait_for(&mut self, predicate: impl FnMut(&GateState) -> bool) -> GateState {
        let matched = self.state.wait_for(predicate).await.map(|s| s.clone());
        match matched {
            Ok(state) => state,
            Err(_) => self.state.borrow().clone(),
        }
    }

    /// Wait for the initial auth check to finish
    pub async fn resolved(&mut self) -> GateState {
        self.wait_for(|s| !matches!(s, GateState::Checking)).await
    }
}

impl Drop for AdminGate {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
