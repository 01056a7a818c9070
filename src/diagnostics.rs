//! # Differencing Diagnostics
//!
//! Structured events emitted while a column is differenced. A
//! [`DifferencingObserver`] receives every bisection step and the final outcome
//! of each column, so a caller can trace or audit the search without the
//! library printing anything itself.
//!
//! ```rust
//! use fracdiff_finance::diagnostics::{DifferencingEvent, DifferencingObserver, RecordingObserver};
//!
//! let observer = RecordingObserver::new();
//! observer.on_event(&DifferencingEvent::AlreadyStationary { column: "x".into() });
//! assert_eq!(observer.len(), 1);
//! ```

use parking_lot::Mutex;
use std::fmt;

/// One observable step of the differencing process.
#[derive(Debug, Clone, PartialEq)]
pub enum DifferencingEvent {
    /// The raw column passed the stationarity test; order 0 is used
    AlreadyStationary {
        /// Column label
        column: String,
    },
    /// A candidate order was tested during bisection
    BisectionStep {
        /// Column label
        column: String,
        /// Lower end of the bracket before the step
        lower: f64,
        /// Upper end of the bracket before the step
        upper: f64,
        /// Tested order (bracket midpoint)
        order: f64,
        /// Test outcome
        stationary: bool,
    },
    /// The column's order is fixed
    OrderSelected {
        /// Column label
        column: String,
        /// Chosen or configured order
        order: f64,
    },
    /// The column could not be differenced
    ColumnFailed {
        /// Column label
        column: String,
        /// Rendered error
        reason: String,
    },
}

impl DifferencingEvent {
    /// Label of the column the event refers to
    pub fn column(&self) -> &str {
        match self {
            DifferencingEvent::AlreadyStationary { column }
            | DifferencingEvent::BisectionStep { column, .. }
            | DifferencingEvent::OrderSelected { column, .. }
            | DifferencingEvent::ColumnFailed { column, .. } => column,
        }
    }
}

impl fmt::Display for DifferencingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifferencingEvent::AlreadyStationary { column } => {
                write!(f, "[{}] already stationary, order 0", column)
            }
            DifferencingEvent::BisectionStep {
                column,
                lower,
                upper,
                order,
                stationary,
            } => write!(
                f,
                "[{}] bracket [{:.6}, {:.6}] order {:.6} -> {}",
                column,
                lower,
                upper,
                order,
                if *stationary { "stationary" } else { "non-stationary" }
            ),
            DifferencingEvent::OrderSelected { column, order } => {
                write!(f, "[{}] order {:.6}", column, order)
            }
            DifferencingEvent::ColumnFailed { column, reason } => {
                write!(f, "[{}] failed: {}", column, reason)
            }
        }
    }
}

/// Receives differencing events. Called concurrently when columns are
/// processed in parallel.
pub trait DifferencingObserver: Send + Sync {
    /// Handle one event
    fn on_event(&self, event: &DifferencingEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl DifferencingObserver for NullObserver {
    fn on_event(&self, _event: &DifferencingEvent) {}
}

/// Forwards events to the `log` facade: steps at debug, outcomes at info,
/// failures at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl DifferencingObserver for LogObserver {
    fn on_event(&self, event: &DifferencingEvent) {
        match event {
            DifferencingEvent::BisectionStep { .. } => log::debug!("{}", event),
            DifferencingEvent::ColumnFailed { .. } => log::warn!("{}", event),
            _ => log::info!("{}", event),
        }
    }
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<DifferencingEvent>>,
}

impl RecordingObserver {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded events
    pub fn events(&self) -> Vec<DifferencingEvent> {
        self.events.lock().clone()
    }

    /// Recorded events for one column
    pub fn events_for(&self, column: &str) -> Vec<DifferencingEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.column() == column)
            .cloned()
            .collect()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop all recorded events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl DifferencingObserver for RecordingObserver {
    fn on_event(&self, event: &DifferencingEvent) {
        self.events.lock().push(event.clone());
    }
}
