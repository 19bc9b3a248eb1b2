use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use shared::{
    domain::{ReactionChoice, ReactionCounts, ReactionTarget, TargetKind},
    protocol::{BodyEncoding, ReactRequest, ReactionResponse},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod controller;
pub mod error;
pub mod navigation;
pub mod page;

pub use config::{load_settings, ClientSettings};
pub use controller::{ClickOutcome, Notice, NoticeLevel, PageController, UiAction, UiEvent};
pub use error::{ReactionError, ReactionFailure};
pub use navigation::{HeadlessNavigator, Navigator};
pub use page::PageModel;

/// Cookie the forum session is carried in.
pub const SESSION_COOKIE: &str = "session_token";

#[async_trait]
pub trait ReactionApi: Send + Sync {
    async fn react(
        &self,
        target: ReactionTarget,
        choice: ReactionChoice,
    ) -> Result<ReactionCounts, ReactionError>;
}

pub struct HttpReactionApi {
    http: Client,
    post_url: Url,
    comment_url: Url,
    encoding: BodyEncoding,
    session_token: Option<String>,
}

impl HttpReactionApi {
    pub fn new(base_url: &Url, encoding: BodyEncoding) -> anyhow::Result<Self> {
        Self::with_client(Client::new(), base_url, encoding)
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        let api = Self::with_client(http, &settings.base_url()?, settings.body_encoding)?;
        Ok(match &settings.session_token {
            Some(token) => api.with_session_token(token.clone()),
            None => api,
        })
    }

    fn with_client(http: Client, base_url: &Url, encoding: BodyEncoding) -> anyhow::Result<Self> {
        Ok(Self {
            http,
            post_url: base_url.join(TargetKind::Post.endpoint_path())?,
            comment_url: base_url.join(TargetKind::Comment.endpoint_path())?,
            encoding,
            session_token: None,
        })
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    fn endpoint(&self, kind: TargetKind) -> &Url {
        match kind {
            TargetKind::Post => &self.post_url,
            TargetKind::Comment => &self.comment_url,
        }
    }
}

#[async_trait]
impl ReactionApi for HttpReactionApi {
    async fn react(
        &self,
        target: ReactionTarget,
        choice: ReactionChoice,
    ) -> Result<ReactionCounts, ReactionError> {
        target.validate()?;

        let body = ReactRequest::for_target(target, choice);
        let mut request = self.http.post(self.endpoint(target.kind()).clone());
        request = match self.encoding {
            BodyEncoding::Json => request.json(&body),
            BodyEncoding::Form => request.form(&body),
        };
        if let Some(token) = &self.session_token {
            request = request.header(header::COOKIE, format!("{SESSION_COOKIE}={token}"));
        }

        let response = request.send().await.map_err(ReactionFailure::Transport)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            info!(%target, "reaction rejected: session missing or expired");
            return Err(ReactionError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(ReactionFailure::Status(status).into());
        }

        let bytes = response.bytes().await.map_err(ReactionFailure::Transport)?;
        let decoded: ReactionResponse =
            serde_json::from_slice(&bytes).map_err(ReactionFailure::MalformedBody)?;
        decoded
            .into_counts()
            .ok_or(ReactionError::ReactionFailed(ReactionFailure::NotConfirmed))
    }
}

/// Display cache for one target: the highlighted choice and the counters,
/// exactly as last confirmed by the server (or as rendered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReactionState {
    pub active: Option<ReactionChoice>,
    pub counts: ReactionCounts,
}

impl ReactionState {
    pub fn is_like_active(&self) -> bool {
        self.active == Some(ReactionChoice::Like)
    }

    pub fn is_dislike_active(&self) -> bool {
        self.active == Some(ReactionChoice::Dislike)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactionOutcome {
    pub target: ReactionTarget,
    pub choice: ReactionChoice,
    pub state: ReactionState,
    /// Strictly increasing per target; consumers drop outcomes that are not
    /// newer than the one they last applied.
    pub revision: u64,
}

#[derive(Default)]
struct TargetSlot {
    state: ReactionState,
    revision: u64,
}

/// Submits reactions and keeps the per-target display cache. Submissions
/// for the same target are serialized: the target's slot stays locked while
/// its request is in flight, so a later click waits for the earlier one.
pub struct ReactionClient {
    api: Arc<dyn ReactionApi>,
    slots: Mutex<HashMap<ReactionTarget, Arc<Mutex<TargetSlot>>>>,
}

impl ReactionClient {
    pub fn new(api: Arc<dyn ReactionApi>) -> Arc<Self> {
        Arc::new(Self {
            api,
            slots: Mutex::new(HashMap::new()),
        })
    }

    pub async fn seed(&self, target: ReactionTarget, state: ReactionState) {
        let slot = self.slot(target).await;
        let mut guard = slot.lock().await;
        guard.state = state;
    }

    pub async fn state(&self, target: ReactionTarget) -> Option<ReactionState> {
        let slot = self.slots.lock().await.get(&target).cloned()?;
        let guard = slot.lock().await;
        Some(guard.state)
    }

    pub async fn submit_reaction(
        &self,
        target: ReactionTarget,
        choice: ReactionChoice,
    ) -> Result<ReactionOutcome, ReactionError> {
        target.validate()?;

        let slot = self.slot(target).await;
        let mut guard = slot.lock().await;
        debug!(%target, %choice, revision = guard.revision, "submitting reaction");

        match self.api.react(target, choice).await {
            Ok(counts) => {
                guard.state = ReactionState {
                    active: choice.toggle_from(guard.state.active),
                    counts,
                };
                guard.revision += 1;
                debug!(
                    %target,
                    likes = counts.likes,
                    dislikes = counts.dislikes,
                    revision = guard.revision,
                    "reaction confirmed"
                );
                Ok(ReactionOutcome {
                    target,
                    choice,
                    state: guard.state,
                    revision: guard.revision,
                })
            }
            Err(err) => {
                warn!(%target, %choice, error = %err, "reaction not applied");
                Err(err)
            }
        }
    }

    async fn slot(&self, target: ReactionTarget) -> Arc<Mutex<TargetSlot>> {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(target).or_default())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
