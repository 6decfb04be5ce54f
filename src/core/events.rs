//! Build event reporting
//!
//! The core emits events through [`BuildReporter`]; presentation lives in
//! [`crate::cli::output`]. Progress numbering is carried by a
//! [`BuildContext`] created per invocation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

/// Receiver for build progress events
///
/// Implementations are shared across worker threads.
pub trait BuildReporter: Sync {
    /// A worker started compiling `file` (1-based `index` of `total`)
    fn compiling(&self, file: &Path, index: usize, total: usize);

    /// The link step started
    fn linking(&self, output: &Path, objects: &[PathBuf]);

    /// The executable is newer than every object; nothing was linked
    fn up_to_date(&self, output: &Path);

    /// A build artifact is being removed (1-based `index` of `total`)
    fn removing(&self, file: &Path, index: usize, total: usize);

    /// Non-fatal problem worth surfacing
    fn warning(&self, message: &str);

    /// A step failed
    fn error(&self, message: &str);

    /// A command finished
    fn result(&self, command: &str, success: bool, elapsed: Duration);
}

/// A recorded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    Compiling { file: PathBuf, index: usize, total: usize },
    Linking { output: PathBuf, objects: Vec<PathBuf> },
    UpToDate { output: PathBuf },
    Removing { file: PathBuf, index: usize, total: usize },
    Warning(String),
    Error(String),
    Result { command: String, success: bool },
}

/// Reporter that keeps every event in memory
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<BuildEvent>>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().clone()
    }

    fn push(&self, event: BuildEvent) {
        self.events.lock().push(event);
    }
}

impl BuildReporter for EventLog {
    fn compiling(&self, file: &Path, index: usize, total: usize) {
        self.push(BuildEvent::Compiling {
            file: file.to_path_buf(),
            index,
            total,
        });
    }

    fn linking(&self, output: &Path, objects: &[PathBuf]) {
        self.push(BuildEvent::Linking {
            output: output.to_path_buf(),
            objects: objects.to_vec(),
        });
    }

    fn up_to_date(&self, output: &Path) {
        self.push(BuildEvent::UpToDate {
            output: output.to_path_buf(),
        });
    }

    fn removing(&self, file: &Path, index: usize, total: usize) {
        self.push(BuildEvent::Removing {
            file: file.to_path_buf(),
            index,
            total,
        });
    }

    fn warning(&self, message: &str) {
        self.push(BuildEvent::Warning(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(BuildEvent::Error(message.to_string()));
    }

    fn result(&self, command: &str, success: bool, _elapsed: Duration) {
        self.push(BuildEvent::Result {
            command: command.to_string(),
            success,
        });
    }
}

/// State scoped to one build, clean or run invocation
pub struct BuildContext<'a> {
    reporter: &'a dyn BuildReporter,
    counter: AtomicUsize,
}

impl<'a> BuildContext<'a> {
    /// Create a context reporting to `reporter`
    pub fn new(reporter: &'a dyn BuildReporter) -> Self {
        Self {
            reporter,
            counter: AtomicUsize::new(0),
        }
    }

    /// Event sink for this invocation
    pub fn reporter(&self) -> &'a dyn BuildReporter {
        self.reporter
    }

    /// Claim the next 1-based progress index
    pub fn next_index(&self) -> usize {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}
