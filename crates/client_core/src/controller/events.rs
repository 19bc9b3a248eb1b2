//! Page actions and the UI events produced while handling them.

use serde::Serialize;
use shared::domain::{CommentId, PostFilter, PostId, ReactionTarget};
use url::Url;

use crate::{navigation::ShareMethod, page::CommentView, page::ControlDataset, ReactionState};

pub const LINK_COPIED_NOTICE: &str = "Link copied to clipboard!";

#[derive(Debug, Clone)]
pub enum UiAction {
    /// Click on a reaction control, carrying the control's rendered
    /// attributes unparsed.
    React { dataset: ControlDataset },
    ToggleCommentEdit { comment_id: CommentId },
    FilterPosts { filter: PostFilter },
    Back,
    Share { title: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    ReactionApplied {
        target: ReactionTarget,
        state: ReactionState,
        revision: u64,
    },
    StaleReactionIgnored {
        target: ReactionTarget,
        revision: u64,
    },
    /// Confirmed by the server, but the page has no controls to update.
    ReactionNotRendered {
        target: ReactionTarget,
        state: ReactionState,
        revision: u64,
    },
    RedirectedToLogin {
        url: Url,
    },
    Notice(Notice),
    CommentEditToggled {
        comment_id: CommentId,
        view: CommentView,
    },
    PostsFiltered {
        filter: PostFilter,
        shown: Vec<PostId>,
    },
    Navigated {
        url: Url,
    },
    WentBack,
    Shared {
        method: ShareMethod,
        notice: Option<Notice>,
    },
    ShareFailed {
        method: ShareMethod,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClickOutcome {
    /// Whether the control's default navigation must be suppressed.
    pub default_prevented: bool,
    pub event: UiEvent,
}
