//! In-memory model of a rendered forum page: reaction controls per target,
//! comment editors, and the filterable post list.
//!
//! The model is materialized from server-rendered HTML and afterwards only
//! mutated through the controller.

use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use shared::{
    domain::{
        CommentId, PostFilter, PostId, ReactionChoice, ReactionCounts, ReactionTarget, TargetKind,
    },
    error::DomainError,
};
use tracing::warn;

use crate::{ReactionOutcome, ReactionState};

const REACTION_CONTROL_SELECTOR: &str = "[data-post-id][data-type], [data-comment-id][data-type]";
const COMMENT_CONTENT_SELECTOR: &str = "[id^='comment-content-']";
const EDIT_FORM_SELECTOR: &str = "[id^='edit-form-']";
const POST_PREVIEW_SELECTOR: &str = ".post-preview";
const FILTER_BUTTON_SELECTOR: &str = ".filter-btn";
const LIKES_COUNT_SELECTOR: &str = ".likes-count";
const DISLIKES_COUNT_SELECTOR: &str = ".dislikes-count";

const COMMENT_CONTENT_PREFIX: &str = "comment-content-";
const EDIT_FORM_PREFIX: &str = "edit-form-";

/// Raw `data-*` attributes of a reaction control, as rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlDataset {
    pub post_id: Option<String>,
    pub comment_id: Option<String>,
    pub choice: Option<String>,
}

impl ControlDataset {
    pub fn for_target(target: ReactionTarget, choice: ReactionChoice) -> Self {
        let id = Some(target.raw_id().to_string());
        let (post_id, comment_id) = match target.kind() {
            TargetKind::Post => (id, None),
            TargetKind::Comment => (None, id),
        };
        Self {
            post_id,
            comment_id,
            choice: Some(choice.as_str().to_string()),
        }
    }

    fn from_element(element: &ElementRef<'_>) -> Self {
        let attr = |name: &str| element.value().attr(name).map(str::to_string);
        Self {
            post_id: attr("data-post-id"),
            comment_id: attr("data-comment-id"),
            choice: attr("data-type"),
        }
    }

    pub fn resolve(&self) -> Result<(ReactionTarget, ReactionChoice), DomainError> {
        let target = match (&self.post_id, &self.comment_id) {
            (Some(raw), _) => ReactionTarget::parse(TargetKind::Post, raw)?,
            (None, Some(raw)) => ReactionTarget::parse(TargetKind::Comment, raw)?,
            (None, None) => return Err(DomainError::MissingAttribute("data-post-id")),
        };
        let choice = self
            .choice
            .as_deref()
            .ok_or(DomainError::MissingAttribute("data-type"))?
            .parse()?;
        Ok((target, choice))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionControls {
    pub target: ReactionTarget,
    pub like_active: bool,
    pub dislike_active: bool,
    pub likes: u64,
    pub dislikes: u64,
    /// Revision of the last applied outcome; 0 for server-rendered state.
    pub revision: u64,
}

impl ReactionControls {
    pub fn new(target: ReactionTarget, state: ReactionState) -> Self {
        Self {
            target,
            like_active: state.is_like_active(),
            dislike_active: state.is_dislike_active(),
            likes: state.counts.likes,
            dislikes: state.counts.dislikes,
            revision: 0,
        }
    }

    pub fn state(&self) -> ReactionState {
        let active = if self.like_active {
            Some(ReactionChoice::Like)
        } else if self.dislike_active {
            Some(ReactionChoice::Dislike)
        } else {
            None
        };
        ReactionState {
            active,
            counts: ReactionCounts {
                likes: self.likes,
                dislikes: self.dislikes,
            },
        }
    }

    /// Writes a confirmed outcome into the counters and highlights. Returns
    /// false (and changes nothing) when the outcome is for another target or
    /// is not newer than what is already displayed.
    pub fn apply(&mut self, outcome: &ReactionOutcome) -> bool {
        if outcome.target != self.target || outcome.revision <= self.revision {
            return false;
        }
        self.likes = outcome.state.counts.likes;
        self.dislikes = outcome.state.counts.dislikes;
        self.like_active = outcome.state.is_like_active();
        self.dislike_active = outcome.state.is_dislike_active();
        self.revision = outcome.revision;
        true
    }

    pub fn label(&self, choice: ReactionChoice) -> String {
        match choice {
            ReactionChoice::Like => format!("👍 {}", self.likes),
            ReactionChoice::Dislike => format!("👎 {}", self.dislikes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentView {
    Content,
    EditForm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentEditor {
    pub comment_id: CommentId,
    pub view: CommentView,
    pub has_edit_form: bool,
}

impl CommentEditor {
    pub fn content_visible(&self) -> bool {
        self.view == CommentView::Content
    }

    pub fn edit_form_visible(&self) -> bool {
        self.view == CommentView::EditForm
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPreview {
    pub post_id: Option<PostId>,
    pub is_mine: bool,
    pub is_liked: bool,
    pub shown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterButton {
    pub filter: PostFilter,
    pub active: bool,
}

/// What happened to a confirmed outcome handed to [`PageModel::apply_outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeApplication {
    Applied,
    /// A newer outcome for the target is already displayed.
    Superseded,
    /// The page has no controls for the target.
    Unrendered,
}

#[derive(Debug, Clone, Default)]
pub struct PageModel {
    reactions: BTreeMap<ReactionTarget, ReactionControls>,
    comments: BTreeMap<CommentId, CommentEditor>,
    previews: Vec<PostPreview>,
    filter_buttons: Vec<FilterButton>,
    active_filter: PostFilter,
}

impl PageModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_html(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let mut page = Self::new();
        page.read_reaction_controls(&document)?;
        page.read_comments(&document)?;
        page.read_previews(&document)?;
        page.read_filter_buttons(&document)?;
        Ok(page)
    }

    pub fn insert_reaction(&mut self, target: ReactionTarget, state: ReactionState) {
        self.reactions
            .insert(target, ReactionControls::new(target, state));
    }

    pub fn insert_comment(&mut self, comment_id: CommentId, has_edit_form: bool) {
        self.comments.insert(
            comment_id,
            CommentEditor {
                comment_id,
                view: CommentView::Content,
                has_edit_form,
            },
        );
    }

    pub fn push_preview(&mut self, post_id: PostId, is_mine: bool, is_liked: bool) {
        self.previews.push(PostPreview {
            post_id: Some(post_id),
            is_mine,
            is_liked,
            shown: true,
        });
    }

    pub fn reaction(&self, target: ReactionTarget) -> Option<&ReactionControls> {
        self.reactions.get(&target)
    }

    pub fn reactions(&self) -> impl Iterator<Item = &ReactionControls> {
        self.reactions.values()
    }

    pub fn comment(&self, comment_id: CommentId) -> Option<&CommentEditor> {
        self.comments.get(&comment_id)
    }

    pub fn previews(&self) -> &[PostPreview] {
        &self.previews
    }

    pub fn filter_buttons(&self) -> &[FilterButton] {
        &self.filter_buttons
    }

    pub fn active_filter(&self) -> PostFilter {
        self.active_filter
    }

    /// Applies a confirmed outcome to its own target's controls only.
    /// Targets that were never rendered are left alone.
    pub fn apply_outcome(&mut self, outcome: &ReactionOutcome) -> OutcomeApplication {
        match self.reactions.get_mut(&outcome.target) {
            Some(controls) => {
                if controls.apply(outcome) {
                    OutcomeApplication::Applied
                } else {
                    OutcomeApplication::Superseded
                }
            }
            None => OutcomeApplication::Unrendered,
        }
    }

    pub fn toggle_comment_edit(&mut self, comment_id: CommentId) -> Result<CommentView> {
        let editor = self
            .comments
            .get_mut(&comment_id)
            .ok_or_else(|| anyhow!("comment {} is not on this page", comment_id.0))?;
        if !editor.has_edit_form {
            return Err(anyhow!("comment {} has no edit form", comment_id.0));
        }
        editor.view = match editor.view {
            CommentView::Content => CommentView::EditForm,
            CommentView::EditForm => CommentView::Content,
        };
        Ok(editor.view)
    }

    /// Shows exactly the previews the filter admits and highlights the
    /// matching filter button. Returns the ids of the shown previews.
    pub fn apply_filter(&mut self, filter: PostFilter) -> Vec<PostId> {
        self.active_filter = filter;
        for preview in &mut self.previews {
            preview.shown = filter.admits(preview.is_mine, preview.is_liked);
        }
        for button in &mut self.filter_buttons {
            button.active = button.filter == filter;
        }
        self.previews
            .iter()
            .filter(|preview| preview.shown)
            .filter_map(|preview| preview.post_id)
            .collect()
    }

    fn read_reaction_controls(&mut self, document: &Html) -> Result<()> {
        let controls = selector(REACTION_CONTROL_SELECTOR)?;
        let likes_count = selector(LIKES_COUNT_SELECTOR)?;
        let dislikes_count = selector(DISLIKES_COUNT_SELECTOR)?;

        for element in document.select(&controls) {
            let (target, choice) = match ControlDataset::from_element(&element).resolve() {
                Ok(resolved) => resolved,
                Err(error) => {
                    warn!(%error, "skipping unbound reaction control");
                    continue;
                }
            };
            let count_selector = match choice {
                ReactionChoice::Like => &likes_count,
                ReactionChoice::Dislike => &dislikes_count,
            };
            let count = element
                .select(count_selector)
                .next()
                .and_then(|counter| leading_count(&counter))
                .or_else(|| leading_count(&element))
                .unwrap_or(0);
            let active = element.value().classes().any(|class| class == "active");

            let entry = self
                .reactions
                .entry(target)
                .or_insert_with(|| ReactionControls::new(target, ReactionState::default()));
            match choice {
                ReactionChoice::Like => {
                    entry.likes = count;
                    entry.like_active = active;
                }
                ReactionChoice::Dislike => {
                    entry.dislikes = count;
                    entry.dislike_active = active;
                }
            }
        }

        for controls in self.reactions.values_mut() {
            if controls.like_active && controls.dislike_active {
                warn!(target = %controls.target, "both reactions rendered active; keeping like");
                controls.dislike_active = false;
            }
        }
        Ok(())
    }

    fn read_comments(&mut self, document: &Html) -> Result<()> {
        let forms: HashMap<i64, bool> = document
            .select(&selector(EDIT_FORM_SELECTOR)?)
            .filter_map(|form| {
                let id = form.value().id()?.strip_prefix(EDIT_FORM_PREFIX)?;
                Some((id.parse().ok()?, !is_hidden(&form)))
            })
            .collect();

        for content in document.select(&selector(COMMENT_CONTENT_SELECTOR)?) {
            let Some(raw_id) = content
                .value()
                .id()
                .and_then(|id| id.strip_prefix(COMMENT_CONTENT_PREFIX))
            else {
                continue;
            };
            let Ok(id) = raw_id.parse::<i64>() else {
                warn!(raw_id, "skipping comment with non-numeric id");
                continue;
            };
            let form_visible = forms.get(&id).copied();
            // content wins when the markup shows both or neither
            let view = match (is_hidden(&content), form_visible) {
                (true, Some(true)) => CommentView::EditForm,
                _ => CommentView::Content,
            };
            self.comments.insert(
                CommentId(id),
                CommentEditor {
                    comment_id: CommentId(id),
                    view,
                    has_edit_form: form_visible.is_some(),
                },
            );
        }
        Ok(())
    }

    fn read_previews(&mut self, document: &Html) -> Result<()> {
        for element in document.select(&selector(POST_PREVIEW_SELECTOR)?) {
            let flag = |name: &str| element.value().attr(name) == Some("true");
            let post_id = element
                .value()
                .attr("data-post-id")
                .and_then(|raw| ReactionTarget::parse(TargetKind::Post, raw).ok())
                .map(|target| PostId(target.raw_id()));
            self.previews.push(PostPreview {
                post_id,
                is_mine: flag("data-is-mine"),
                is_liked: flag("data-is-liked"),
                shown: !is_hidden(&element),
            });
        }
        Ok(())
    }

    fn read_filter_buttons(&mut self, document: &Html) -> Result<()> {
        for element in document.select(&selector(FILTER_BUTTON_SELECTOR)?) {
            let Some(filter) = element
                .value()
                .attr("data-filter")
                .and_then(|raw| raw.parse::<PostFilter>().ok())
            else {
                continue;
            };
            let active = element.value().classes().any(|class| class == "active");
            if active {
                self.active_filter = filter;
            }
            self.filter_buttons.push(FilterButton { filter, active });
        }
        Ok(())
    }
}

fn selector(raw: &'static str) -> Result<Selector> {
    Selector::parse(raw).map_err(|err| anyhow!("invalid selector {raw:?}: {err:?}"))
}

fn is_hidden(element: &ElementRef<'_>) -> bool {
    element
        .value()
        .attr("style")
        .map(|style| {
            style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase()
                .contains("display:none")
        })
        .unwrap_or(false)
}

/// First run of digits in the element's text ("👍 12" → 12).
fn leading_count(element: &ElementRef<'_>) -> Option<u64> {
    let text: String = element.text().collect();
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    match digits.parse() {
        Ok(count) => Some(count),
        Err(error) => {
            warn!(%error, counter = %digits, "reaction counter out of range");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
