//! Progress reporting for the verify stage

use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

/// Width of the bar in columns
pub const BAR_WIDTH: usize = 40;

/// Receives progress updates from the checker's progress task
pub trait ProgressSink: Send + 'static {
    /// Called once per completed check with the running count
    fn update(&mut self, current: usize, total: usize);

    /// Called after the last update
    fn finish(&mut self) {}
}

/// Fraction of checks completed, `0.0` when there is nothing to check
pub fn fraction(current: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        current as f64 / total as f64
    }
}

/// Render `[####----] current/total (pp.pp%)`
pub fn render_bar(current: usize, total: usize) -> String {
    let progress = fraction(current, total);
    let filled = ((BAR_WIDTH as f64 * progress) as usize).min(BAR_WIDTH);
    format!(
        "[{}{}] {}/{} ({:.2}%)",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        current,
        total,
        progress * 100.0
    )
}

/// Redraws a single progress line in place on stdout
pub struct TerminalProgress {
    label: String,
}

impl TerminalProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new("Verifying")
    }
}

impl ProgressSink for TerminalProgress {
    fn update(&mut self, current: usize, total: usize) {
        let line = format!("{}: {}", self.label, render_bar(current, total));
        let mut stdout = io::stdout();
        // A broken terminal only costs us the progress line
        let _ = execute!(
            stdout,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line)
        );
    }

    fn finish(&mut self) {
        let mut stdout = io::stdout();
        let _ = writeln!(stdout);
        let _ = stdout.flush();
    }
}

/// Discards all updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&mut self, _current: usize, _total: usize) {}
}
