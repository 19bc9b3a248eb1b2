use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Result};
use url::Url;

/// Browser-side effects the controller needs. Implemented over a real
/// browsing context in the page host, and by [`HeadlessNavigator`] for the
/// CLI and tests.
pub trait Navigator: Send + Sync {
    fn location(&self) -> Url;
    fn history_len(&self) -> usize;
    fn assign(&self, url: &Url);
    fn history_back(&self);
    fn supports_native_share(&self) -> bool;
    fn native_share(&self, title: &str, url: &Url) -> Result<()>;
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackAction {
    Assign(Url),
    HistoryBack,
}

/// Where the page's "back" affordance should lead: error pages go home,
/// category-scoped pages return to their category, otherwise the browser
/// history is used when there is any.
pub fn resolve_back(location: &Url, history_len: usize) -> Result<BackAction> {
    if location.path().contains("error") {
        return Ok(BackAction::Assign(location.join("/")?));
    }

    let category = location
        .query_pairs()
        .find(|(key, _)| key == "cat")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());
    if let Some(category) = category {
        return Ok(BackAction::Assign(
            location.join(&format!("/category/{category}"))?,
        ));
    }

    if history_len > 1 {
        Ok(BackAction::HistoryBack)
    } else {
        Ok(BackAction::Assign(location.join("/")?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareMethod {
    Native,
    Clipboard,
}

pub struct HeadlessNavigator {
    start: Url,
    history: Mutex<Vec<Url>>,
    clipboard: Mutex<Option<String>>,
}

impl HeadlessNavigator {
    pub fn new(start: Url) -> Self {
        Self {
            history: Mutex::new(vec![start.clone()]),
            start,
            clipboard: Mutex::new(None),
        }
    }

    pub fn clipboard(&self) -> Option<String> {
        self.clipboard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn visited(&self) -> Vec<Url> {
        self.history().clone()
    }

    fn history(&self) -> MutexGuard<'_, Vec<Url>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for HeadlessNavigator {
    fn location(&self) -> Url {
        self.history()
            .last()
            .cloned()
            .unwrap_or_else(|| self.start.clone())
    }

    fn history_len(&self) -> usize {
        self.history().len()
    }

    fn assign(&self, url: &Url) {
        tracing::debug!(%url, "navigating");
        self.history().push(url.clone());
    }

    fn history_back(&self) {
        let mut history = self.history();
        if history.len() > 1 {
            history.pop();
        }
    }

    fn supports_native_share(&self) -> bool {
        false
    }

    fn native_share(&self, _title: &str, _url: &Url) -> Result<()> {
        Err(anyhow!("native share is unavailable in a headless session"))
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        *self
            .clipboard
            .lock()
            .map_err(|_| anyhow!("clipboard lock poisoned"))? = Some(text.to_string());
        Ok(())
    }
}
