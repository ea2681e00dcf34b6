//! Clone and fetch progress reporting

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Progress callback signature
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Progress event emitted while talking to a remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Objects received from the remote
    Transfer {
        /// Objects downloaded so far
        received_objects: usize,
        /// Objects the remote announced
        total_objects: usize,
        /// Deltas resolved so far
        indexed_deltas: usize,
        /// Deltas to resolve
        total_deltas: usize,
        /// Bytes downloaded so far
        received_bytes: usize,
    },
    /// Files written to the working copy
    Checkout {
        /// File being written, if known
        path: Option<String>,
        /// Files written so far
        completed: usize,
        /// Files to write
        total: usize,
    },
}

impl ProgressEvent {
    /// The task this event advances, with its done/total counts
    #[must_use]
    pub fn stage(&self) -> (&'static str, usize, usize) {
        match *self {
            Self::Transfer {
                received_objects,
                total_objects,
                indexed_deltas,
                total_deltas,
                ..
            } => {
                if total_deltas > 0 && received_objects == total_objects {
                    ("Resolving deltas", indexed_deltas, total_deltas)
                } else {
                    ("Receiving objects", received_objects, total_objects)
                }
            }
            Self::Checkout {
                completed, total, ..
            } => ("Updating files", completed, total),
        }
    }
}

/// A progress printer writing one line per whole-percent step to stdout
#[must_use]
pub fn text_progress() -> ProgressCallback {
    let last = AtomicUsize::new(usize::MAX);
    Box::new(move |event| {
        let (task, done, total) = event.stage();
        if total == 0 {
            return;
        }
        let percent = done.min(total) * 100 / total;
        let key = task.len() * 1000 + percent;
        if last.swap(key, Ordering::Relaxed) == key {
            return;
        }
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{task}: {percent:>3}% ({done}/{total})");
    })
}
