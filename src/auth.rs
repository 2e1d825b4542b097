//! Auth seam — who is allowed to publish presenter state.
//!
//! The console only ever asks two questions: is anybody signed in right now,
//! and tell me when that changes. Sign-in itself happens elsewhere (the login
//! surface); the console merely observes sessions and can request sign-out.

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

/// Session channel depth. Auth flips are rare; a full channel means the
/// subscriber is gone or wedged, so flips are dropped rather than awaited.
const SUBSCRIBER_CAPACITY: usize = 16;

/// Errors surfaced by the auth provider.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider failed to complete the request.
    #[error("auth provider failed: {0}")]
    Provider(String),
}

/// A signed-in operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operator {
    pub id: Uuid,
    pub email: String,
}

/// Receiver half of a session subscription. `None` means signed out.
pub type AuthUpdates = mpsc::Receiver<Option<Operator>>;

/// Session observation and teardown.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The operator currently signed in, if any.
    async fn current_operator(&self) -> Option<Operator>;

    /// Tear down the active session. A no-op when nobody is signed in.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribe to session changes. The current session state is delivered
    /// first, then one message per flip.
    async fn subscribe(&self) -> AuthUpdates;
}

/// In-process [`AuthProvider`] for the terminal binary and tests.
///
/// Sessions are local: `sign_in` mints an operator and a session token,
/// `sign_out` clears both.
pub struct MemoryAuth {
    inner: Mutex<AuthInner>,
}

struct AuthInner {
    operator: Option<Operator>,
    session_token: Option<String>,
    fail_next_sign_out: bool,
    subscribers: Vec<mpsc::Sender<Option<Operator>>>,
}

impl MemoryAuth {
    /// Signed-out provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(AuthInner {
                operator: None,
                session_token: None,
                fail_next_sign_out: false,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Provider with an operator already signed in.
    #[must_use]
    pub fn signed_in(email: &str) -> Self {
        let mut provider = Self::new();
        let inner = provider.inner.get_mut();
        inner.operator = Some(mint_operator(email));
        inner.session_token = Some(generate_token());
        provider
    }

    /// Start a session for `email`, replacing any existing one.
    pub async fn sign_in(&self, email: &str) -> Operator {
        let mut inner = self.inner.lock().await;
        let operator = mint_operator(email);
        inner.operator = Some(operator.clone());
        inner.session_token = Some(generate_token());
        notify(&mut inner.subscribers, Some(operator.clone()));
        operator
    }

    /// The active session token, if a session exists.
    pub async fn session_token(&self) -> Option<String> {
        self.inner.lock().await.session_token.clone()
    }

    /// Arrange for the next `sign_out` call to fail.
    pub async fn fail_next_sign_out(&self) {
        self.inner.lock().await.fail_next_sign_out = true;
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn current_operator(&self) -> Option<Operator> {
        self.inner.lock().await.operator.clone()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let mut inner = self.inner.lock().await;

        if inner.fail_next_sign_out {
            inner.fail_next_sign_out = false;
            return Err(AuthError::Provider("sign-out unavailable".into()));
        }

        if inner.operator.is_none() {
            return Ok(());
        }

        inner.operator = None;
        inner.session_token = None;
        notify(&mut inner.subscribers, None);
        Ok(())
    }

    async fn subscribe(&self) -> AuthUpdates {
        let mut inner = self.inner.lock().await;
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);

        let _ = tx.try_send(inner.operator.clone());
        inner.subscribers.push(tx);
        rx
    }
}

fn mint_operator(email: &str) -> Operator {
    Operator { id: Uuid::new_v4(), email: email.to_owned() }
}

/// Random 256-bit session token, hex-encoded.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn notify(subscribers: &mut Vec<mpsc::Sender<Option<Operator>>>, operator: Option<Operator>) {
    subscribers.retain(|tx| !tx.is_closed());
    for tx in subscribers.iter() {
        // Best-effort: a wedged subscriber misses the flip, not blocks it.
        let _ = tx.try_send(operator.clone());
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
