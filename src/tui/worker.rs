//! Background request worker.
//!
//! Runs one service call on the app's tokio runtime so the TUI main loop
//! keeps drawing while the request is in flight. The outcome comes back
//! over a channel that the main loop polls.

use std::future::Future;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::application::{Analysis, CsvImport, Operation, RequestOrchestrator, SubmitError};
use crate::domain::{PatientForm, PatientRecord};
use crate::ports::{ApiError, DiagnosticApi};

/// Result of a finished request.
#[derive(Debug)]
pub enum RequestOutcome {
    Analyzed(Result<Analysis, SubmitError>),
    CsvLoaded(Result<CsvImport, ApiError>),
    SampleLoaded(Result<PatientForm, ApiError>),
}

/// What polling a request yielded.
#[derive(Debug)]
pub enum RequestPoll {
    Pending,
    Done(RequestOutcome),
    /// The task ended without reporting (panicked or was aborted).
    Lost,
}

/// Handle to the in-flight request.
pub struct RequestHandle {
    operation: Operation,
    started_at: Instant,
    outcome_rx: Receiver<RequestOutcome>,
    task: JoinHandle<()>,
}

impl RequestHandle {
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Check for the outcome without blocking.
    #[must_use]
    pub fn poll(&self) -> RequestPoll {
        match self.outcome_rx.try_recv() {
            Ok(outcome) => RequestPoll::Done(outcome),
            Err(TryRecvError::Empty) => RequestPoll::Pending,
            Err(TryRecvError::Disconnected) => RequestPoll::Lost,
        }
    }

    /// Abort the request. Any late outcome is discarded.
    pub fn cancel(self) {
        self.task.abort();
    }
}

/// Spawns service calls on a runtime.
pub struct RequestWorker;

impl RequestWorker {
    pub fn spawn_analysis<A>(
        runtime: &Handle,
        orchestrator: RequestOrchestrator<A>,
        record: PatientRecord,
    ) -> RequestHandle
    where
        A: DiagnosticApi + 'static,
    {
        Self::spawn(runtime, Operation::Analyze, async move {
            RequestOutcome::Analyzed(orchestrator.analyze(record).await)
        })
    }

    pub fn spawn_csv_upload<A>(
        runtime: &Handle,
        orchestrator: RequestOrchestrator<A>,
        path: PathBuf,
    ) -> RequestHandle
    where
        A: DiagnosticApi + 'static,
    {
        Self::spawn(runtime, Operation::UploadCsv, async move {
            RequestOutcome::CsvLoaded(orchestrator.upload_csv(&path).await)
        })
    }

    pub fn spawn_sample<A>(runtime: &Handle, orchestrator: RequestOrchestrator<A>) -> RequestHandle
    where
        A: DiagnosticApi + 'static,
    {
        Self::spawn(runtime, Operation::GenerateSample, async move {
            RequestOutcome::SampleLoaded(orchestrator.generate_sample().await)
        })
    }

    fn spawn<F>(runtime: &Handle, operation: Operation, request: F) -> RequestHandle
    where
        F: Future<Output = RequestOutcome> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        tracing::debug!(operation = operation.name(), "spawning request");

        let task = runtime.spawn(async move {
            let outcome = request.await;
            // Receiver gone means the request was cancelled.
            let _ = tx.send(outcome);
        });

        RequestHandle {
            operation,
            started_at: Instant::now(),
            outcome_rx: rx,
            task,
        }
    }
}
