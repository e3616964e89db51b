//! Progress reporting and cooperative cancellation

use crate::geometry::Point;
use crate::toolpath::Path;

/// Something worth telling the user about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressUpdate<'a> {
    /// Free-form status text
    Text(&'a str),
    /// Share of the work done, `0.0..=100.0`
    Percent(f64),
    /// The tool moved
    ToolPosition {
        /// New tool location
        position: Point,
        /// Completed paths
        paths: &'a [Path],
        /// The path being built, which ends at `position`
        current: Option<&'a Path>,
    },
}

/// Receives progress updates
///
/// Returning `true` from [`report`](ProgressReporter::report) asks the
/// computation to stop. Closures taking a [`ProgressUpdate`] and returning
/// `bool` are reporters.
///
/// # Example
///
/// ```
/// use waterline::progress::{ProgressReporter, ProgressUpdate};
///
/// let mut seen = 0;
/// let mut reporter = |_: ProgressUpdate<'_>| {
///     seen += 1;
///     seen > 2
/// };
/// assert!(!reporter.report(ProgressUpdate::Text("one")));
/// assert!(!reporter.report(ProgressUpdate::Percent(50.0)));
/// assert!(reporter.report(ProgressUpdate::Text("three")));
/// ```
pub trait ProgressReporter {
    /// Handle an update; `true` requests cancellation
    fn report(&mut self, update: ProgressUpdate<'_>) -> bool;
}

impl<F> ProgressReporter for F
where
    F: FnMut(ProgressUpdate<'_>) -> bool,
{
    fn report(&mut self, update: ProgressUpdate<'_>) -> bool {
        self(update)
    }
}

/// Counts work units and forwards them as percentages
///
/// Without a reporter every call is a no-op that never cancels.
pub struct ProgressCounter<'r> {
    total: usize,
    current: usize,
    reporter: Option<&'r mut dyn ProgressReporter>,
}

impl<'r> ProgressCounter<'r> {
    /// Create a counter for `total` units of work
    pub fn new(total: usize, reporter: Option<&'r mut dyn ProgressReporter>) -> Self {
        Self {
            total,
            current: 0,
            reporter,
        }
    }

    /// Units counted so far
    pub fn current(&self) -> usize {
        self.current
    }

    /// Share of the work done, `0.0..=100.0`
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (100.0 * self.current as f64 / self.total as f64).min(100.0)
        }
    }

    /// Count `units` and report; `true` requests cancellation
    pub fn increment(&mut self, units: usize) -> bool {
        self.current = self.current.saturating_add(units);
        let percent = self.percent();
        self.report(ProgressUpdate::Percent(percent))
    }

    /// Send a text update; `true` requests cancellation
    pub fn report_text(&mut self, text: &str) -> bool {
        self.report(ProgressUpdate::Text(text))
    }

    /// Send a tool position; `true` requests cancellation
    pub fn report_position(
        &mut self,
        position: Point,
        paths: &[Path],
        current: Option<&Path>,
    ) -> bool {
        self.report(ProgressUpdate::ToolPosition {
            position,
            paths,
            current,
        })
    }

    fn report(&mut self, update: ProgressUpdate<'_>) -> bool {
        match self.reporter.as_deref_mut() {
            Some(reporter) => reporter.report(update),
            None => false,
        }
    }
}
