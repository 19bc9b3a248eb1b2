//! Wiring from page actions to the reaction client, navigator and page model.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    controller::events::{ClickOutcome, Notice, UiAction, UiEvent, LINK_COPIED_NOTICE},
    navigation::{resolve_back, BackAction, Navigator, ShareMethod},
    page::{ControlDataset, OutcomeApplication, PageModel},
    ReactionClient, ReactionError,
};

/// Owns the page model for one page load. Created once per load through
/// [`PageController::init`]; dropped on navigation.
pub struct PageController {
    page: Mutex<PageModel>,
    client: Arc<ReactionClient>,
    navigator: Arc<dyn Navigator>,
    login_url: Url,
    events: broadcast::Sender<UiEvent>,
}

impl PageController {
    /// Binds the controller to a rendered page and seeds the reaction client
    /// with the server-rendered counts and highlights.
    pub async fn init(
        page: PageModel,
        client: Arc<ReactionClient>,
        navigator: Arc<dyn Navigator>,
        login_url: Url,
    ) -> Arc<Self> {
        let mut seeded = 0usize;
        for controls in page.reactions() {
            client.seed(controls.target, controls.state()).await;
            seeded += 1;
        }
        info!(
            reaction_targets = seeded,
            previews = page.previews().len(),
            "page controller initialized"
        );

        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            page: Mutex::new(page),
            client,
            navigator,
            login_url,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    pub async fn page(&self) -> PageModel {
        self.page.lock().await.clone()
    }

    pub async fn dispatch(&self, action: UiAction) -> ClickOutcome {
        let outcome = match action {
            UiAction::React { dataset } => self.react(dataset).await,
            UiAction::ToggleCommentEdit { comment_id } => {
                let event = match self.page.lock().await.toggle_comment_edit(comment_id) {
                    Ok(view) => UiEvent::CommentEditToggled { comment_id, view },
                    Err(err) => {
                        warn!(comment_id = comment_id.0, error = %err, "comment edit toggle ignored");
                        UiEvent::Notice(Notice::error(err.to_string()))
                    }
                };
                passive(event)
            }
            UiAction::FilterPosts { filter } => {
                let shown = self.page.lock().await.apply_filter(filter);
                debug!(filter = filter.as_str(), shown = shown.len(), "posts filtered");
                passive(UiEvent::PostsFiltered { filter, shown })
            }
            UiAction::Back => passive(self.back()),
            UiAction::Share { title } => passive(self.share(&title)),
        };

        let _ = self.events.send(outcome.event.clone());
        outcome
    }

    async fn react(&self, dataset: ControlDataset) -> ClickOutcome {
        let event = match dataset.resolve() {
            Err(err) => {
                let err = ReactionError::from(err);
                warn!(error = %err, "reaction click on unbound control");
                UiEvent::Notice(Notice::error(err.notice_text()))
            }
            Ok((target, choice)) => match self.client.submit_reaction(target, choice).await {
                Ok(outcome) => match self.page.lock().await.apply_outcome(&outcome) {
                    OutcomeApplication::Applied => UiEvent::ReactionApplied {
                        target,
                        state: outcome.state,
                        revision: outcome.revision,
                    },
                    OutcomeApplication::Superseded => {
                        debug!(%target, revision = outcome.revision, "superseded reaction outcome dropped");
                        UiEvent::StaleReactionIgnored {
                            target,
                            revision: outcome.revision,
                        }
                    }
                    OutcomeApplication::Unrendered => {
                        warn!(%target, "reaction confirmed for a target with no rendered controls");
                        UiEvent::ReactionNotRendered {
                            target,
                            state: outcome.state,
                            revision: outcome.revision,
                        }
                    }
                },
                Err(ReactionError::Unauthenticated) => {
                    info!(%target, login = %self.login_url, "redirecting to login");
                    self.navigator.assign(&self.login_url);
                    UiEvent::RedirectedToLogin {
                        url: self.login_url.clone(),
                    }
                }
                Err(err) => UiEvent::Notice(Notice::error(err.notice_text())),
            },
        };

        ClickOutcome {
            default_prevented: true,
            event,
        }
    }

    fn back(&self) -> UiEvent {
        match resolve_back(&self.navigator.location(), self.navigator.history_len()) {
            Ok(BackAction::Assign(url)) => {
                self.navigator.assign(&url);
                UiEvent::Navigated { url }
            }
            Ok(BackAction::HistoryBack) => {
                self.navigator.history_back();
                UiEvent::WentBack
            }
            Err(err) => {
                error!(error = %err, "could not resolve back destination");
                UiEvent::Notice(Notice::error("Could not go back"))
            }
        }
    }

    fn share(&self, title: &str) -> UiEvent {
        let url = self.navigator.location();
        if self.navigator.supports_native_share() {
            return match self.navigator.native_share(title, &url) {
                Ok(()) => UiEvent::Shared {
                    method: ShareMethod::Native,
                    notice: None,
                },
                Err(err) => {
                    error!(error = %err, "native share failed");
                    UiEvent::ShareFailed {
                        method: ShareMethod::Native,
                    }
                }
            };
        }

        match self.navigator.copy_to_clipboard(url.as_str()) {
            Ok(()) => UiEvent::Shared {
                method: ShareMethod::Clipboard,
                notice: Some(Notice::info(LINK_COPIED_NOTICE)),
            },
            Err(err) => {
                error!(error = %err, "copying link failed");
                UiEvent::ShareFailed {
                    method: ShareMethod::Clipboard,
                }
            }
        }
    }
}

fn passive(event: UiEvent) -> ClickOutcome {
    ClickOutcome {
        default_prevented: false,
        event,
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
