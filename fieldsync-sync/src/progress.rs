//! Textual progress indicator for batch work.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Width of the bar in cells.
pub const BAR_WIDTH: usize = 50;

/// Symbols from "just started" to "done".
const PALETTE: &[&str] = &[
    "😱", "😫", "😩", "😢", "😞", "😐", "🙂", "😊", "😃", "😎",
];

/// Counts completed units of a batch and renders a bar on every tick.
///
/// Safe to share across threads; each `tick` increments atomically. Ticks
/// past `total` render as 100%.
#[derive(Debug)]
pub struct ProgressReporter {
    total: NonZeroUsize,
    completed: AtomicUsize,
}

impl ProgressReporter {
    pub fn new(total: NonZeroUsize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
        }
    }

    /// Reporter for a batch of `len` items, `None` when there is nothing to do.
    pub fn for_batch(len: usize) -> Option<Self> {
        NonZeroUsize::new(len).map(Self::new)
    }

    pub fn total(&self) -> usize {
        self.total.get()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Record one completed unit and render the new state.
    pub fn tick(&self) -> String {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        render(completed, self.total.get())
    }
}

fn render(completed: usize, total: usize) -> String {
    let done = completed.min(total);
    let filled = done * BAR_WIDTH / total;
    let ratio = done as f64 / total as f64;
    let symbol = PALETTE[(ratio * (PALETTE.len() - 1) as f64).round() as usize];
    format!(
        "[{}{}] {}  {:3.0}%",
        "*".repeat(filled),
        "·".repeat(BAR_WIDTH - filled),
        symbol,
        ratio * 100.0
    )
}
