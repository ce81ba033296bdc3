use std::io::{self, Write as _};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Warning level, mirroring the three states of the host's `$VERBOSE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// `$VERBOSE = nil`: all warnings suppressed.
    Silent,
    /// `$VERBOSE = false`: only `rb_warn` warnings.
    #[default]
    Normal,
    /// `$VERBOSE = true`: `rb_warn` and `rb_warning` warnings.
    Verbose,
}

impl Verbosity {
    /// Maps a `$VERBOSE` value (`None` for nil) to a level.
    #[must_use]
    pub fn from_verbose(verbose: Option<bool>) -> Self {
        match verbose {
            None => Self::Silent,
            Some(false) => Self::Normal,
            Some(true) => Self::Verbose,
        }
    }

    /// Whether `rb_warn` emits at this level.
    #[must_use]
    pub fn warn_enabled(self) -> bool {
        self != Self::Silent
    }

    /// Whether `rb_warning` emits at this level.
    #[must_use]
    pub fn warning_enabled(self) -> bool {
        self == Self::Verbose
    }
}

/// Destination for warning text.
pub trait WarningWriter {
    /// Writes one complete warning line, without the trailing newline.
    fn write_warning(&mut self, line: &str);
}

/// Writes warnings to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrWarnings;

impl WarningWriter for StderrWarnings {
    fn write_warning(&mut self, line: &str) {
        // a closed stderr has nowhere to report to
        let _ = writeln!(io::stderr().lock(), "{line}");
    }
}

/// Collects warnings in memory, useful for tests.
#[derive(Debug, Clone, Default)]
pub struct CollectWarnings {
    lines: Vec<String>,
}

impl CollectWarnings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl WarningWriter for CollectWarnings {
    fn write_warning(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}

/// Discards all warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWarnings;

impl WarningWriter for NoWarnings {
    fn write_warning(&mut self, _line: &str) {}
}

/// Verbosity-gated warning emitter backing `rb_warn`, `rb_warning` and `rb_tr_log_warning`.
#[derive(Debug, Clone, Default)]
pub struct Warnings<W: WarningWriter> {
    verbosity: Verbosity,
    writer: W,
}

impl<W: WarningWriter> Warnings<W> {
    #[must_use]
    pub fn new(verbosity: Verbosity, writer: W) -> Self {
        Self { verbosity, writer }
    }

    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    #[must_use]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// `rb_warn`: emitted unless warnings are silenced. Returns whether it was emitted.
    pub fn warn(&mut self, message: &str) -> bool {
        self.emit_if(self.verbosity.warn_enabled(), message)
    }

    /// `rb_warning`: emitted only in verbose mode. Returns whether it was emitted.
    pub fn warning(&mut self, message: &str) -> bool {
        self.emit_if(self.verbosity.warning_enabled(), message)
    }

    /// `rb_tr_log_warning`: always written to the runtime log, regardless of `$VERBOSE`.
    pub fn log_warning(&mut self, message: &str) {
        self.writer.write_warning(&format!("[ruby] WARNING {message}"));
    }

    fn emit_if(&mut self, enabled: bool, message: &str) -> bool {
        if enabled {
            self.writer.write_warning(&format!("warning: {message}"));
        }
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_suppresses_everything_but_the_log() {
        let mut warnings = Warnings::new(Verbosity::Silent, CollectWarnings::new());
        assert!(!warnings.warn("a"));
        assert!(!warnings.warning("b"));
        warnings.log_warning("c");
        assert_eq!(warnings.writer().lines(), ["[ruby] WARNING c"]);
    }

    #[test]
    fn normal_emits_warn_only() {
        let mut warnings = Warnings::new(Verbosity::Normal, CollectWarnings::new());
        assert!(warnings.warn("shown"));
        assert!(!warnings.warning("hidden"));
        assert_eq!(warnings.into_writer().into_lines(), ["warning: shown"]);
    }

    #[test]
    fn verbose_emits_both() {
        let mut warnings = Warnings::new(Verbosity::from_verbose(Some(true)), CollectWarnings::new());
        warnings.warn("one");
        warnings.warning("two");
        assert_eq!(warnings.writer().lines(), ["warning: one", "warning: two"]);
    }

    #[test]
    fn verbosity_parses_from_config_names() {
        assert_eq!("verbose".parse::<Verbosity>().unwrap(), Verbosity::Verbose);
        assert_eq!(Verbosity::from_verbose(None), Verbosity::Silent);
    }
}
