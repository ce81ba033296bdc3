#![doc = include_str!("../../../README.md")]

mod cache;
mod config;
mod exception;
mod format;
mod globals;
mod host;
mod object;
mod scan;
pub mod tracer;
mod warning;

pub use crate::{
    cache::{DEFAULT_SPEC_CACHE_CAPACITY, SpecCache},
    config::ShimConfig,
    exception::{ExcType, ScanError, ScanResult},
    format::{ArgSpec, MAX_OUTPUT_SLOTS, SlotKind},
    globals::{GlobalResolver, GlobalsConfig, RuntimeGlobal},
    host::CallContext,
    object::{HashKey, Object, ObjectContext},
    scan::{KeywordState, ScanOutput, Scanner, bind_args, scan_args, scan_args_into},
    tracer::{NoopTracer, RecordingTracer, ScanTracer, StderrTracer, TraceEvent},
    warning::{CollectWarnings, NoWarnings, StderrWarnings, Verbosity, WarningWriter, Warnings},
};
