//! # Printer Queue Line
//!
//! Health of one CUPS queue as `lpstat` tells it. Three queries feed one
//! reading:
//!
//! | Query            | Answers                                        |
//! |------------------|------------------------------------------------|
//! | `lpstat -p NAME` | printer state text (idle / disabled / Paused)  |
//! | `lpstat -l NAME` | job long listing (`Alerts:` reasons)           |
//! | `lpstat -o NAME` | queue listing, one job per line                |
//!
//! The classifier folds the three answers into exactly one outcome by
//! priority: paused beats disabled beats an active job beats alerts beats
//! idle, with "offline" as the catch-all. First match wins; no outcome
//! combines with another.

use super::{Status, StatusSource, capture};
use crate::error::FaroError;

/// CUPS queues this panel knows how to label.
///
/// The queue name CUPS uses is too long for a 15-column field, so every
/// watchable queue needs a short label here. Watching an unlisted queue is
/// a configuration error, caught at startup.
pub const FRIENDLY_NAMES: &[(&str, &str)] = &[("hp_LaserJet_3020", "HP")];

/// Look up the panel label for a CUPS queue name.
pub fn friendly_name(queue: &str) -> Option<&'static str> {
    FRIENDLY_NAMES
        .iter()
        .find(|(name, _)| *name == queue)
        .map(|(_, label)| *label)
}

/// Reports the health of one CUPS queue.
#[derive(Debug)]
pub struct PrinterStatus {
    queue: String,
    label: &'static str,
}

impl PrinterStatus {
    /// Watch one CUPS queue.
    ///
    /// Refuses queues missing from [`FRIENDLY_NAMES`] so a typo in the
    /// service configuration fails the process at startup instead of
    /// rendering nonsense forever.
    pub fn new(queue: &str) -> Result<Self, FaroError> {
        let label = friendly_name(queue)
            .ok_or_else(|| FaroError::UnknownPrinter(queue.to_string()))?;
        Ok(Self {
            queue: queue.to_string(),
            label,
        })
    }
}

impl StatusSource for PrinterStatus {
    fn read(&mut self) -> Result<Status, FaroError> {
        let state = capture("lpstat", &["-p", &self.queue])?;
        let long = capture("lpstat", &["-l", &self.queue])?;
        let queue = capture("lpstat", &["-o", &self.queue])?;
        Ok(classify(self.label, &state, &long, &queue))
    }
}

/// Fold the three `lpstat` answers into one reading.
///
/// Total over arbitrary input text: every combination of markers lands on
/// exactly one of the seven outcomes.
pub fn classify(label: &str, state: &str, long: &str, queue: &str) -> Status {
    let jobs = pending_jobs(queue);

    if state.contains("Paused") {
        Status::attention(format!("{}: paused({})", label, jobs))
    } else if state.contains("disabled") {
        Status::ok(format!("{}: error({})", label, jobs))
    } else if long.contains("job-printing") {
        Status::attention(format!("{}: print({})", label, jobs))
    } else if let Some(alert) = alert_reason(long) {
        Status::attention(format!("{}:!{}", label, alert))
    } else if state.contains("is idle") {
        if jobs == 0 {
            Status::ok(format!("{}: idle", label))
        } else {
            Status::attention(format!("{}: {} jobs", label, jobs))
        }
    } else {
        Status::attention(format!("{}: offline", label))
    }
}

/// Count queued jobs: one per listing line. Job lines start in column one;
/// continuation lines start with a tab.
fn pending_jobs(queue_listing: &str) -> usize {
    queue_listing
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('\t'))
        .count()
}

/// Pull the first alert reason out of the long listing.
fn alert_reason(long: &str) -> Option<&str> {
    long.lines()
        .find_map(|line| line.trim_start().strip_prefix("Alerts:"))
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
}

// ============================================================================
// TESTS
// ============================================================================
