use serde::Serialize;
use std::cell::Cell;

/// Upload lifecycle: `Idle -> Uploading -> Processing -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadPhase {
    Idle,
    Uploading,
    Processing,
}

impl UploadPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Uploading => "Uploading...",
            Self::Processing => "Processing tweets...",
        }
    }

    /// Share of the progress bar to fill.
    pub fn percent(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Uploading => 50,
            Self::Processing => 100,
        }
    }
}

pub trait ProgressSink {
    fn phase_changed(&self, phase: UploadPhase);
}

/// Prints phase labels to stderr.
pub struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn phase_changed(&self, phase: UploadPhase) {
        if phase != UploadPhase::Idle {
            eprintln!("[{:>3}%] {}", phase.percent(), phase.label());
        }
    }
}

/// Holds the current phase. Only one upload may be in flight per tracker.
pub struct UploadTracker<'a> {
    sink: &'a dyn ProgressSink,
    phase: Cell<UploadPhase>,
}

impl<'a> UploadTracker<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            phase: Cell::new(UploadPhase::Idle),
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase.get()
    }

    fn set(&self, phase: UploadPhase) {
        self.phase.set(phase);
        self.sink.phase_changed(phase);
    }

    /// Enter `Uploading`. Returns `None` while another upload is active.
    pub fn start(&self) -> Option<ActiveUpload<'_, 'a>> {
        if self.phase() != UploadPhase::Idle {
            return None;
        }
        self.set(UploadPhase::Uploading);
        Some(ActiveUpload { tracker: self })
    }
}

/// Resets the tracker to `Idle` when dropped, whatever the exit path.
pub struct ActiveUpload<'t, 'a> {
    tracker: &'t UploadTracker<'a>,
}

impl ActiveUpload<'_, '_> {
    /// Enter `Processing` right before the network call.
    pub fn begin_processing(&self) {
        if self.tracker.phase() == UploadPhase::Uploading {
            self.tracker.set(UploadPhase::Processing);
        }
    }
}

impl Drop for ActiveUpload<'_, '_> {
    fn drop(&mut self) {
        self.tracker.set(UploadPhase::Idle);
    }
}
