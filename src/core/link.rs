//! Bank-account linking workflow.
//!
//! A link flow goes through three backend round trips: request a link token,
//! exchange the public token handed back by the linking UI (and store the
//! resulting access credential), then verify that the backend session is live.
//! [`LinkController`] owns one flow and moves it through [`LinkStatus`] states.

use super::error::{ClientError, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Durable credential returned by the public token exchange.
#[derive(Debug)]
pub struct AccessGrant {
    pub access_token: SecretString,
    pub item_id: String,
}

impl AccessGrant {
    pub fn new(access_token: &str, item_id: &str) -> Self {
        AccessGrant {
            access_token: SecretString::new(access_token.to_string().into()),
            item_id: item_id.to_string(),
        }
    }

    fn duplicate(&self) -> Self {
        Self::new(self.access_token.expose_secret(), &self.item_id)
    }
}

/// Backend calls needed to link a bank account.
#[async_trait]
pub trait LinkApi: Send + Sync {
    async fn create_link_token(&self, user_id: &str) -> Result<String>;

    async fn exchange_public_token(
        &self,
        public_token: &str,
        user_id: &str,
        institution_id: &str,
    ) -> Result<AccessGrant>;

    async fn store_access_token(
        &self,
        user_id: &str,
        grant: &AccessGrant,
        institution_id: &str,
    ) -> Result<()>;

    /// Succeeds only if the backend recognises the current session.
    async fn check_session(&self) -> Result<()>;
}

/// Where a link flow currently stands. Ordered along the success path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkStatus {
    Idle,
    TokenRequested,
    TokenReady,
    Exchanging,
    Exchanged,
    Verifying,
    Connected,
    Failed,
}

impl Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                LinkStatus::Idle => "idle",
                LinkStatus::TokenRequested => "requesting link token",
                LinkStatus::TokenReady => "ready to link",
                LinkStatus::Exchanging => "exchanging public token",
                LinkStatus::Exchanged => "exchanged",
                LinkStatus::Verifying => "verifying session",
                LinkStatus::Connected => "connected",
                LinkStatus::Failed => "failed",
            }
        )
    }
}

/// Read-only view of a link session.
#[derive(Debug)]
pub struct LinkSession {
    pub status: LinkStatus,
    /// Link token used to open the linking UI.
    pub token: Option<String>,
    pub access_token: Option<SecretString>,
    pub item_id: Option<String>,
    pub error: Option<String>,
}

// Token fields live inside the variants that own them, so an access token
// cannot exist outside Exchanged/Verifying/Connected.
#[derive(Debug)]
enum LinkState {
    Idle,
    TokenRequested,
    TokenReady { link_token: String },
    Exchanging { link_token: String },
    Exchanged { grant: AccessGrant },
    Verifying { grant: AccessGrant },
    Connected { grant: AccessGrant },
    Failed { error: String },
}

impl LinkState {
    fn status(&self) -> LinkStatus {
        match self {
            LinkState::Idle => LinkStatus::Idle,
            LinkState::TokenRequested => LinkStatus::TokenRequested,
            LinkState::TokenReady { .. } => LinkStatus::TokenReady,
            LinkState::Exchanging { .. } => LinkStatus::Exchanging,
            LinkState::Exchanged { .. } => LinkStatus::Exchanged,
            LinkState::Verifying { .. } => LinkStatus::Verifying,
            LinkState::Connected { .. } => LinkStatus::Connected,
            LinkState::Failed { .. } => LinkStatus::Failed,
        }
    }

    fn view(&self) -> LinkSession {
        let mut session = LinkSession {
            status: self.status(),
            token: None,
            access_token: None,
            item_id: None,
            error: None,
        };
        match self {
            LinkState::TokenReady { link_token } | LinkState::Exchanging { link_token } => {
                session.token = Some(link_token.clone());
            }
            LinkState::Exchanged { grant }
            | LinkState::Verifying { grant }
            | LinkState::Connected { grant } => {
                let grant = grant.duplicate();
                session.access_token = Some(grant.access_token);
                session.item_id = Some(grant.item_id);
            }
            LinkState::Failed { error } => session.error = Some(error.clone()),
            LinkState::Idle | LinkState::TokenRequested => {}
        }
        session
    }
}

struct Inner {
    state: LinkState,
    /// Bumped by cancel/reset; results tagged with an older epoch are dropped.
    epoch: u64,
}

impl Inner {
    fn transition(&mut self, next: LinkState) {
        debug!(from = %self.state.status(), to = %next.status(), "Link session transition");
        self.state = next;
    }

    fn fail(&mut self, err: &ClientError) {
        warn!(error = %err, from = %self.state.status(), "Link session failed");
        self.state = LinkState::Failed {
            error: err.to_string(),
        };
    }

    fn invalid(&self, operation: &'static str) -> ClientError {
        ClientError::InvalidState {
            operation,
            state: self.state.status().to_string(),
        }
    }
}

/// Drives one bank-link flow against a [`LinkApi`].
///
/// Methods take `&self` so that [`LinkController::cancel`] can run while a
/// network call is in flight. The state lock is never held across an await
/// on the backend.
pub struct LinkController {
    api: Arc<dyn LinkApi>,
    user_id: String,
    inner: Mutex<Inner>,
}

impl LinkController {
    pub fn new(api: Arc<dyn LinkApi>, user_id: &str) -> Self {
        LinkController {
            api,
            user_id: user_id.to_string(),
            inner: Mutex::new(Inner {
                state: LinkState::Idle,
                epoch: 0,
            }),
        }
    }

    pub async fn session(&self) -> LinkSession {
        self.inner.lock().await.state.view()
    }

    pub async fn status(&self) -> LinkStatus {
        self.inner.lock().await.state.status()
    }

    /// Requests a link token for the linking UI. Valid only from `Idle`.
    pub async fn request_link_token(&self) -> Result<String> {
        let epoch = {
            let mut inner = self.inner.lock().await;
            if !matches!(inner.state, LinkState::Idle) {
                return Err(inner.invalid("request a link token"));
            }
            inner.transition(LinkState::TokenRequested);
            inner.epoch
        };

        let result = self.api.create_link_token(&self.user_id).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!("Dropping link token response for an abandoned flow");
            return Err(abandoned());
        }
        match result {
            Ok(link_token) if link_token.trim().is_empty() => {
                let err = ClientError::Validation("Backend returned an empty link token".into());
                inner.fail(&err);
                Err(err)
            }
            Ok(link_token) => {
                inner.transition(LinkState::TokenReady {
                    link_token: link_token.clone(),
                });
                Ok(link_token)
            }
            Err(err) => {
                inner.fail(&err);
                Err(err)
            }
        }
    }

    /// Exchanges the public token from the linking UI and stores the resulting
    /// access credential. Valid only from `TokenReady`; ends in `Exchanged`.
    pub async fn complete_exchange(&self, public_token: &str, institution_id: &str) -> Result<()> {
        if public_token.trim().is_empty() {
            return Err(ClientError::Validation("Public token is required".into()));
        }

        let epoch = {
            let mut inner = self.inner.lock().await;
            let link_token = match &inner.state {
                LinkState::TokenReady { link_token } => link_token.clone(),
                _ => return Err(inner.invalid("exchange a public token")),
            };
            inner.transition(LinkState::Exchanging { link_token });
            inner.epoch
        };

        let grant = match self
            .api
            .exchange_public_token(public_token, &self.user_id, institution_id)
            .await
        {
            Ok(grant) => grant,
            Err(err) => return self.fail_if_current(epoch, err).await,
        };

        if grant.access_token.expose_secret().is_empty() {
            let err = ClientError::Validation("Backend returned an empty access token".into());
            return self.fail_if_current(epoch, err).await;
        }

        // Skip the store call if the flow was abandoned during the exchange
        if self.inner.lock().await.epoch != epoch {
            return Err(abandoned());
        }

        if let Err(err) = self
            .api
            .store_access_token(&self.user_id, &grant, institution_id)
            .await
        {
            return self.fail_if_current(epoch, err).await;
        }

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            return Err(abandoned());
        }
        inner.transition(LinkState::Exchanged { grant });
        Ok(())
    }

    /// Checks that the backend session is live. Valid only from `Exchanged`.
    pub async fn verify(&self) -> Result<()> {
        let epoch = {
            let mut inner = self.inner.lock().await;
            let grant = match std::mem::replace(&mut inner.state, LinkState::Idle) {
                LinkState::Exchanged { grant } => grant,
                other => {
                    inner.state = other;
                    return Err(inner.invalid("verify the session"));
                }
            };
            inner.transition(LinkState::Verifying { grant });
            inner.epoch
        };

        let result = self.api.check_session().await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            return Err(abandoned());
        }
        match result {
            Ok(()) => {
                let grant = match std::mem::replace(&mut inner.state, LinkState::Idle) {
                    LinkState::Verifying { grant } => grant,
                    other => {
                        inner.state = other;
                        return Err(inner.invalid("complete verification"));
                    }
                };
                inner.transition(LinkState::Connected { grant });
                Ok(())
            }
            Err(err) => {
                inner.fail(&err);
                Err(err)
            }
        }
    }

    /// Runs the exchange and verification steps back to back.
    pub async fn link(&self, public_token: &str, institution_id: &str) -> Result<()> {
        self.complete_exchange(public_token, institution_id).await?;
        self.verify().await
    }

    /// Marks the flow as failed because the user left the linking UI.
    /// Any in-flight call's result is discarded when it arrives.
    pub async fn cancel(&self, message: &str) {
        let mut inner = self.inner.lock().await;
        inner.epoch += 1;
        let message = if message.trim().is_empty() {
            "Linking was cancelled"
        } else {
            message
        };
        inner.fail(&ClientError::Cancelled(message.to_string()));
    }

    /// Starts over from `Idle`, as if the component was remounted.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.epoch += 1;
        inner.transition(LinkState::Idle);
    }

    async fn fail_if_current<T>(&self, epoch: u64, err: ClientError) -> Result<T> {
        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            return Err(abandoned());
        }
        inner.fail(&err);
        Err(err)
    }
}

fn abandoned() -> ClientError {
    ClientError::Cancelled("Link flow was abandoned before the response arrived".into())
}
