//! Diagnostic side channel for location resolution.
//!
//! Resolution recovers from bad data with sentinel values. What it recovered
//! from is reported here instead of through the return value, so the
//! index builder, resolver and classifier stay pure functions of their input.

use super::UNRESOLVED_CITY;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::{error, warn};

/// A data-quality finding raised while resolving locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A city token never appeared as the first half of a two-part location.
    UnresolvedCity { token: String },
    /// A governorate that is not part of the static region table.
    UnknownGovernorate { governorate: String },
    /// Two locations in the same batch map one city to different governorates.
    /// The later one (in order of first appearance) is kept.
    ConflictingGovernorate {
        city: String,
        previous: String,
        current: String,
    },
}

impl Diagnostic {
    /// Whether this finding is reported at error level.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::ConflictingGovernorate { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedCity { token } => {
                write!(f, "'{}' not in cities, mapped to '{}'", token, UNRESOLVED_CITY)
            }
            Self::UnknownGovernorate { governorate } => {
                write!(f, "'{}' not in regions", governorate)
            }
            Self::ConflictingGovernorate {
                city,
                previous,
                current,
            } => write!(
                f,
                "'{}' mapped to both '{}' and '{}', keeping '{}'",
                city, previous, current, current
            ),
        }
    }
}

/// Receiver for [`Diagnostic`]s.
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// moved to a worker thread.
pub trait DiagnosticSink: Send + Sync {
    /// Called once per finding.
    fn emit(&self, diagnostic: Diagnostic);
}

/// Default sink: writes every diagnostic as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            error!("{}", diagnostic);
        } else {
            warn!("{}", diagnostic);
        }
    }
}

/// Wrapper that implements [`DiagnosticSink`] using a closure.
pub struct ClosureSink<F>
where
    F: Fn(Diagnostic) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureSink<F>
where
    F: Fn(Diagnostic) + Send + Sync,
{
    /// Creates a new closure-based sink.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> DiagnosticSink for ClosureSink<F>
where
    F: Fn(Diagnostic) + Send + Sync,
{
    fn emit(&self, diagnostic: Diagnostic) {
        (self.callback)(diagnostic);
    }
}

/// Sink that keeps every diagnostic in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}

static_assertions::assert_impl_all!(TracingSink: Send, Sync);
static_assertions::assert_impl_all!(RecordingSink: Send, Sync);
