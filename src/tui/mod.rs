//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Patient data entry with inline validation
//! - Risk charts and the analysis results panel
//! - CSV import, sample generation and report export

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
pub use worker::{RequestHandle, RequestOutcome, RequestPoll, RequestWorker};
