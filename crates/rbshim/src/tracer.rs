//! Argument scanning trace infrastructure.
//!
//! Provides a trait-based tracing system for the binder with zero-cost abstraction.
//! When using [`NoopTracer`], all trace methods compile away entirely via monomorphization.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Zero-cost no-op (production default) |
//! | [`StderrTracer`] | Human-readable scan log to stderr |
//! | [`RecordingTracer`] | Full event recording for tests or post-mortem |
//!
//! # Usage
//!
//! ```
//! use rbshim::{ArgSpec, Object, ObjectContext, RecordingTracer, Scanner, TraceEvent};
//!
//! let mut ctx = ObjectContext::new();
//! let mut scanner = Scanner::new(RecordingTracer::new());
//! scanner.scan(&mut ctx, &[Object::Int(1)], "1").unwrap();
//! assert!(matches!(scanner.tracer().events().last(), Some(TraceEvent::Finish { argc: 1 })));
//! ```

use crate::{
    exception::ScanError,
    format::{ArgSpec, SlotKind},
    scan::KeywordState,
};

/// Trace event emitted while scanning.
///
/// Used by [`RecordingTracer`] to capture a full trace of one or more scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A format string was parsed (or fetched from a cache).
    Parse {
        /// The format string as written at the call site.
        format: String,
        /// The resulting shape.
        spec: ArgSpec,
        /// Whether the shape came from a [`SpecCache`](crate::SpecCache) hit.
        cached: bool,
    },
    /// The trailing-keyword ambiguity was resolved.
    KeywordResolved {
        /// State of the keyword slot going into the bind loop.
        state: KeywordState,
    },
    /// A slot value was produced.
    Slot {
        /// Zero-based slot position.
        index: usize,
        /// What the slot holds.
        kind: SlotKind,
        /// Whether the value fit in the output (only the first ten slots do).
        stored: bool,
    },
    /// Binding succeeded.
    Finish {
        /// Effective argument count returned to the caller.
        argc: usize,
    },
    /// Parsing or binding failed.
    Error(ScanError),
}

/// Trait for scan tracing.
///
/// All methods have default no-op implementations, so [`NoopTracer`] requires
/// zero lines of code and compiles to zero instructions.
pub trait ScanTracer: std::fmt::Debug {
    /// Called once the format string has been turned into a shape.
    #[inline(always)]
    fn on_parse(&mut self, _format: &str, _spec: &ArgSpec, _cached: bool) {}

    /// Called once the keyword slot's state is known, before any slot is produced.
    #[inline(always)]
    fn on_keyword_resolved(&mut self, _state: KeywordState) {}

    /// Called for every produced slot value, including ones past the output limit.
    #[inline(always)]
    fn on_slot(&mut self, _index: usize, _kind: SlotKind, _stored: bool) {}

    /// Called when binding succeeded.
    #[inline(always)]
    fn on_finish(&mut self, _argc: usize) {}

    /// Called when parsing or binding failed.
    #[inline(always)]
    fn on_error(&mut self, _error: &ScanError) {}
}

impl<T: ScanTracer + ?Sized> ScanTracer for &mut T {
    fn on_parse(&mut self, format: &str, spec: &ArgSpec, cached: bool) {
        (**self).on_parse(format, spec, cached);
    }

    fn on_keyword_resolved(&mut self, state: KeywordState) {
        (**self).on_keyword_resolved(state);
    }

    fn on_slot(&mut self, index: usize, kind: SlotKind, stored: bool) {
        (**self).on_slot(index, kind, stored);
    }

    fn on_finish(&mut self, argc: usize) {
        (**self).on_finish(argc);
    }

    fn on_error(&mut self, error: &ScanError) {
        (**self).on_error(error);
    }
}

// ============================================================================
// NoopTracer — zero-cost production default
// ============================================================================

/// A tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl ScanTracer for NoopTracer {}

// ============================================================================
// StderrTracer — human-readable scan log
// ============================================================================

/// Tracer that prints a human-readable scan log to stderr.
///
/// Output format:
/// ```text
/// scan "1*:" leading=1 optional=0 rest=true trailing=0 keywords=true block=false
///   keywords: pending
///   [0] leading
///   [1] rest
///   [2] keywords
///   => argc=2
/// ```
#[derive(Debug, Clone, Default)]
pub struct StderrTracer {
    scans: usize,
}

impl StderrTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scans started since construction.
    #[must_use]
    pub fn scans(&self) -> usize {
        self.scans
    }
}

impl ScanTracer for StderrTracer {
    fn on_parse(&mut self, format: &str, spec: &ArgSpec, cached: bool) {
        self.scans += 1;
        let cached = if cached { " (cached)" } else { "" };
        eprintln!(
            "scan {format:?}{cached} leading={} optional={} rest={} trailing={} keywords={} block={}",
            spec.required_leading,
            spec.optional,
            spec.has_rest,
            spec.required_trailing,
            spec.accepts_keywords,
            spec.accepts_block,
        );
    }

    fn on_keyword_resolved(&mut self, state: KeywordState) {
        eprintln!("  keywords: {state}");
    }

    fn on_slot(&mut self, index: usize, kind: SlotKind, stored: bool) {
        if stored {
            eprintln!("  [{index}] {kind}");
        } else {
            eprintln!("  [{index}] {kind} (dropped)");
        }
    }

    fn on_finish(&mut self, argc: usize) {
        eprintln!("  => argc={argc}");
    }

    fn on_error(&mut self, error: &ScanError) {
        eprintln!("  !! {error}");
    }
}

// ============================================================================
// RecordingTracer — full event log
// ============================================================================

/// Tracer that records every event in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Consumes the tracer, returning the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    /// Discards all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ScanTracer for RecordingTracer {
    fn on_parse(&mut self, format: &str, spec: &ArgSpec, cached: bool) {
        self.events.push(TraceEvent::Parse {
            format: format.to_owned(),
            spec: *spec,
            cached,
        });
    }

    fn on_keyword_resolved(&mut self, state: KeywordState) {
        self.events.push(TraceEvent::KeywordResolved { state });
    }

    fn on_slot(&mut self, index: usize, kind: SlotKind, stored: bool) {
        self.events.push(TraceEvent::Slot { index, kind, stored });
    }

    fn on_finish(&mut self, argc: usize) {
        self.events.push(TraceEvent::Finish { argc });
    }

    fn on_error(&mut self, error: &ScanError) {
        self.events.push(TraceEvent::Error(error.clone()));
    }
}
