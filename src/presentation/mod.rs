//! Presentation layer: framework-independent view state.
//!
//! Charts, the results panel and notifications are plain data here; the
//! `tui` module only draws them.

pub mod charts;
pub mod notification;
pub mod results;

use thiserror::Error;

pub use charts::{ChartColor, Charts};
pub use notification::{Notification, NotificationKind, Notifications};
pub use results::{ResultSection, ResultsPanel, ResultsReport};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("cannot update charts: {0}")]
    Misaligned(String),

    #[error("cannot write {path}: {message}")]
    Io { path: String, message: String },
}
