//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service requests via the background worker
//! - Chart, results and notification updates

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::runtime::Runtime;

use crate::adapters::HttpDiagnosticClient;
use crate::application::{
    csv_loaded_message, failure_message, Analysis, Operation, RequestOrchestrator, SubmitError,
    FORM_CLEARED_MESSAGE, MISSING_FIELDS_MESSAGE, SAMPLE_LOADED_MESSAGE,
};
use crate::config::ClientConfig;
use crate::ports::{ApiError, DiagnosticApi};
use crate::presentation::{Charts, Notifications, ResultsPanel};

use super::ui::{
    overlay::{render_csv_prompt, render_loading, render_notifications},
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    report::render_report,
};
use super::worker::{RequestHandle, RequestOutcome, RequestPoll, RequestWorker};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Entry,
    Report,
}

/// Main application state
pub struct App<A: DiagnosticApi + 'static = HttpDiagnosticClient> {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Runtime the requests run on
    runtime: Runtime,

    orchestrator: RequestOrchestrator<A>,

    /// Where exported reports are written
    export_dir: PathBuf,

    form_state: PatientFormState,

    charts: Charts,

    results: ResultsPanel,

    notifications: Notifications,

    /// Path being typed for a CSV upload, if the prompt is open
    csv_prompt: Option<String>,

    /// In-flight request (at most one)
    pending: Option<RequestHandle>,

    report_scroll: u16,
}

impl App<HttpDiagnosticClient> {
    /// Create the application from `MEDSCAN_*` environment settings.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid, the HTTP client cannot
    /// be built or the runtime cannot start.
    pub fn from_env() -> crate::Result<Self> {
        let config = ClientConfig::from_env()?;
        let client = HttpDiagnosticClient::new(&config)?;
        tracing::info!(
            base_url = client.base_url(),
            timeout_secs = config.request_timeout.as_secs(),
            "Diagnostic service configured"
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("medscan-request")
            .enable_all()
            .build()?;

        Ok(Self::with_dependencies(
            Arc::new(client),
            runtime,
            config.export_dir,
        ))
    }
}

impl<A: DiagnosticApi + 'static> App<A> {
    /// Create application with injected dependencies (Composition Root pattern).
    pub fn with_dependencies(api: Arc<A>, runtime: Runtime, export_dir: PathBuf) -> Self {
        Self {
            screen: Screen::Entry,
            should_quit: false,
            runtime,
            orchestrator: RequestOrchestrator::new(api),
            export_dir,
            form_state: PatientFormState::default(),
            charts: Charts::initialize(),
            results: ResultsPanel::default(),
            notifications: Notifications::default(),
            csv_prompt: None,
            pending: None,
            report_scroll: 0,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_request();
            self.notifications.prune(Instant::now());

            terminal.draw(|f| self.draw(f))?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let area = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        match self.screen {
            Screen::Entry => render_patient_form(f, chunks[0], &self.form_state),
            Screen::Report => render_report(
                f,
                chunks[0],
                &self.charts,
                &self.results,
                self.report_scroll,
            ),
        }
        render_disclaimer(f, chunks[1]);

        if let Some(path) = &self.csv_prompt {
            render_csv_prompt(f, area, path);
        }
        if let Some(handle) = &self.pending {
            render_loading(f, area, handle.operation(), handle.elapsed());
        }
        render_notifications(f, area, &self.notifications);
    }

    /// Pick up the outcome of the in-flight request, if it finished.
    fn poll_request(&mut self) {
        let Some(handle) = self.pending.as_ref() else {
            return;
        };
        let operation = handle.operation();

        match handle.poll() {
            RequestPoll::Pending => {}
            RequestPoll::Done(outcome) => {
                self.pending = None;
                self.apply_outcome(outcome);
            }
            RequestPoll::Lost => {
                self.pending = None;
                tracing::error!(operation = operation.name(), "Request task ended without a result");
                let err = ApiError::Transport("request stopped unexpectedly".to_string());
                self.notifications.danger(failure_message(operation, &err));
            }
        }
    }

    fn apply_outcome(&mut self, outcome: RequestOutcome) {
        match outcome {
            RequestOutcome::Analyzed(Ok(analysis)) => self.show_analysis(analysis),
            RequestOutcome::Analyzed(Err(SubmitError::Api(e))) => {
                self.notifications
                    .danger(failure_message(Operation::Analyze, &e));
            }
            RequestOutcome::Analyzed(Err(e)) => self.notifications.warning(e.to_string()),
            RequestOutcome::CsvLoaded(Ok(import)) => {
                self.form_state.replace(import.form);
                self.screen = Screen::Entry;
                self.notifications
                    .success(csv_loaded_message(import.total_records));
            }
            RequestOutcome::CsvLoaded(Err(e)) => {
                self.notifications
                    .danger(failure_message(Operation::UploadCsv, &e));
            }
            RequestOutcome::SampleLoaded(Ok(form)) => {
                self.form_state.replace(form);
                self.screen = Screen::Entry;
                self.notifications.success(SAMPLE_LOADED_MESSAGE);
            }
            RequestOutcome::SampleLoaded(Err(e)) => {
                self.notifications
                    .danger(failure_message(Operation::GenerateSample, &e));
            }
        }
    }

    fn show_analysis(&mut self, analysis: Analysis) {
        let Analysis { record, result } = analysis;

        if let Err(e) = self.charts.update(&result.visualization) {
            tracing::warn!("Visualization rejected: {}", e);
            self.notifications.warning(e.to_string());
        }

        self.results =
            ResultsPanel::build(&record, &result.rule_results, result.ml_results.as_ref());
        self.report_scroll = 0;
        self.screen = Screen::Report;
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }

        // Only cancellation while a request is in flight
        if self.pending.is_some() {
            if key == KeyCode::Esc {
                self.cancel_request();
            }
            return;
        }

        if self.csv_prompt.is_some() {
            self.handle_csv_prompt_key(key);
            return;
        }

        match key {
            KeyCode::F(2) => self.request_sample(),
            KeyCode::F(3) => self.csv_prompt = Some(String::new()),
            KeyCode::F(5) => self.clear_form(),
            _ => match self.screen {
                Screen::Entry => self.handle_entry_key(key),
                Screen::Report => self.handle_report_key(key),
            },
        }
    }

    fn handle_entry_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.notifications.dismiss_latest();
            }
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left => self.form_state.cycle_choice(false),
            KeyCode::Right => self.form_state.cycle_choice(true),
            KeyCode::Char(c) => self.form_state.input_char(c),
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Delete => self.form_state.clear_field(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::F(4) => {
                self.report_scroll = 0;
                self.screen = Screen::Report;
            }
            _ => {}
        }
    }

    fn handle_report_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Backspace => {
                if !self.notifications.dismiss_latest() {
                    self.screen = Screen::Entry;
                }
            }
            KeyCode::Up => self.report_scroll = self.report_scroll.saturating_sub(1),
            KeyCode::Down => self.report_scroll = self.report_scroll.saturating_add(1),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export_report(),
            _ => {}
        }
    }

    fn handle_csv_prompt_key(&mut self, key: KeyCode) {
        let Some(path) = self.csv_prompt.as_mut() else {
            return;
        };

        match key {
            KeyCode::Esc => self.csv_prompt = None,
            KeyCode::Enter => {
                let path = path.trim().to_string();
                self.csv_prompt = None;
                if !path.is_empty() {
                    self.pending = Some(RequestWorker::spawn_csv_upload(
                        self.runtime.handle(),
                        self.orchestrator.clone(),
                        PathBuf::from(path),
                    ));
                }
            }
            KeyCode::Backspace => {
                path.pop();
            }
            KeyCode::Char(c) => path.push(c),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        match self.orchestrator.prepare(&self.form_state.form) {
            Ok(record) => {
                self.form_state.error_message = None;
                self.form_state.flagged.clear();
                self.pending = Some(RequestWorker::spawn_analysis(
                    self.runtime.handle(),
                    self.orchestrator.clone(),
                    record,
                ));
            }
            Err(SubmitError::Invalid(errors)) => {
                tracing::debug!(count = errors.len(), "Form failed validation");
                self.form_state.show_invalid(&errors);
            }
            Err(SubmitError::MissingFields(fields)) => {
                self.form_state.show_missing(&fields);
                self.notifications.warning(MISSING_FIELDS_MESSAGE);
            }
            Err(SubmitError::Api(e)) => {
                self.notifications
                    .danger(failure_message(Operation::Analyze, &e));
            }
        }
    }

    fn request_sample(&mut self) {
        self.pending = Some(RequestWorker::spawn_sample(
            self.runtime.handle(),
            self.orchestrator.clone(),
        ));
    }

    fn cancel_request(&mut self) {
        if let Some(handle) = self.pending.take() {
            tracing::info!(operation = handle.operation().name(), "Request cancelled");
            handle.cancel();
            self.notifications.info("Request cancelled");
        }
    }

    /// Reset form, charts and results panel.
    fn clear_form(&mut self) {
        self.form_state.reset();
        self.charts.reset();
        self.results = ResultsPanel::Placeholder;
        self.report_scroll = 0;
        self.screen = Screen::Entry;
        self.notifications.info(FORM_CLEARED_MESSAGE);
        tracing::debug!("Form cleared");
    }

    fn export_report(&mut self) {
        let Some(report) = self.results.report() else {
            self.notifications.warning("No results to export yet");
            return;
        };

        match report.export_html(&self.export_dir) {
            Ok(path) => {
                tracing::info!("Report exported");
                self.notifications
                    .success(format!("Report exported to {}", path.display()));
            }
            Err(e) => {
                tracing::warn!("Report export failed: {}", e);
                self.notifications.danger(e.to_string());
            }
        }
    }
}
