//! Controller layer: page actions in, reconciled page state and UI events out.

pub mod events;
pub mod orchestration;

pub use events::{ClickOutcome, Notice, NoticeLevel, UiAction, UiEvent};
pub use orchestration::PageController;
