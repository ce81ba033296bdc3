//! Runtime globals that native extensions read through the C API.
//!
//! `rb_stdin`, `rb_fs`, `rb_rs` and friends look like constants in the C API,
//! but the runtime can reassign the underlying globals (`$stdout = ...`, `$/ = ...`)
//! at any time. They are therefore resolved on every access through a
//! [`GlobalResolver`] supplied by the embedder, never cached in statics.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::object::Object;

/// A runtime-global value exposed to native extensions.
///
/// The string form is the C API name, e.g. `RuntimeGlobal::Rs` <-> `"rb_rs"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter, Serialize, Deserialize,
)]
pub enum RuntimeGlobal {
    #[strum(serialize = "rb_stdin")]
    Stdin,
    #[strum(serialize = "rb_stdout")]
    Stdout,
    #[strum(serialize = "rb_stderr")]
    Stderr,
    /// Input field separator, `$;`.
    #[strum(serialize = "rb_fs")]
    Fs,
    /// Output field separator, `$,`.
    #[strum(serialize = "rb_output_fs")]
    OutputFs,
    /// Input record separator, `$/`.
    #[strum(serialize = "rb_rs")]
    Rs,
    /// Output record separator, `$\`.
    #[strum(serialize = "rb_output_rs")]
    OutputRs,
    /// The default record separator, not reassignable from the host language.
    #[strum(serialize = "rb_default_rs")]
    DefaultRs,
}

impl RuntimeGlobal {
    /// The host-language variable backing this global, if there is one.
    #[must_use]
    pub fn variable(self) -> Option<&'static str> {
        match self {
            Self::Stdin => Some("$stdin"),
            Self::Stdout => Some("$stdout"),
            Self::Stderr => Some("$stderr"),
            Self::Fs => Some("$;"),
            Self::OutputFs => Some("$,"),
            Self::Rs => Some("$/"),
            Self::OutputRs => Some("$\\"),
            Self::DefaultRs => None,
        }
    }
}

/// Resolves runtime globals at the moment they are read.
pub trait GlobalResolver {
    type Value;

    fn resolve(&mut self, global: RuntimeGlobal) -> Self::Value;
}

/// A resolver over plain configuration values, for tests and tools that have no
/// live runtime behind them.
///
/// Defaults match a freshly booted runtime: standard streams on fds 0–2, `$/` and the
/// default record separator set to `"\n"`, all other separators nil.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalsConfig {
    pub stdin_fd: i32,
    pub stdout_fd: i32,
    pub stderr_fd: i32,
    pub field_separator: Option<String>,
    pub output_field_separator: Option<String>,
    pub record_separator: Option<String>,
    pub output_record_separator: Option<String>,
    pub default_record_separator: String,
}

impl Default for GlobalsConfig {
    fn default() -> Self {
        Self {
            stdin_fd: 0,
            stdout_fd: 1,
            stderr_fd: 2,
            field_separator: None,
            output_field_separator: None,
            record_separator: Some("\n".to_owned()),
            output_record_separator: None,
            default_record_separator: "\n".to_owned(),
        }
    }
}

impl GlobalsConfig {
    /// Reassigns a separator global, as `$/ = value` would.
    ///
    /// Returns `false` (and changes nothing) for globals that are not separators or
    /// cannot be reassigned.
    pub fn assign_separator(&mut self, global: RuntimeGlobal, value: Option<String>) -> bool {
        let slot = match global {
            RuntimeGlobal::Fs => &mut self.field_separator,
            RuntimeGlobal::OutputFs => &mut self.output_field_separator,
            RuntimeGlobal::Rs => &mut self.record_separator,
            RuntimeGlobal::OutputRs => &mut self.output_record_separator,
            _ => return false,
        };
        *slot = value;
        true
    }
}

fn separator(value: Option<&String>) -> Object {
    value.map_or(Object::Nil, |s| Object::String(s.clone()))
}

impl GlobalResolver for GlobalsConfig {
    type Value = Object;

    fn resolve(&mut self, global: RuntimeGlobal) -> Object {
        match global {
            RuntimeGlobal::Stdin => Object::Io(self.stdin_fd),
            RuntimeGlobal::Stdout => Object::Io(self.stdout_fd),
            RuntimeGlobal::Stderr => Object::Io(self.stderr_fd),
            RuntimeGlobal::Fs => separator(self.field_separator.as_ref()),
            RuntimeGlobal::OutputFs => separator(self.output_field_separator.as_ref()),
            RuntimeGlobal::Rs => separator(self.record_separator.as_ref()),
            RuntimeGlobal::OutputRs => separator(self.output_record_separator.as_ref()),
            RuntimeGlobal::DefaultRs => Object::String(self.default_record_separator.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn names_round_trip() {
        for global in RuntimeGlobal::iter() {
            let name: &'static str = global.into();
            assert!(name.starts_with("rb_"));
            assert_eq!(name.parse::<RuntimeGlobal>().unwrap(), global);
        }
    }

    #[test]
    fn defaults_match_a_fresh_runtime() {
        let mut globals = GlobalsConfig::default();
        assert_eq!(globals.resolve(RuntimeGlobal::Stdout), Object::Io(1));
        assert_eq!(globals.resolve(RuntimeGlobal::Rs), Object::String("\n".to_owned()));
        assert_eq!(globals.resolve(RuntimeGlobal::Fs), Object::Nil);
    }

    #[test]
    fn reassignment_is_visible_on_next_read() {
        let mut globals = GlobalsConfig::default();
        assert!(globals.assign_separator(RuntimeGlobal::Rs, Some("\r\n".to_owned())));
        assert_eq!(globals.resolve(RuntimeGlobal::Rs), Object::String("\r\n".to_owned()));
        assert_eq!(globals.resolve(RuntimeGlobal::DefaultRs), Object::String("\n".to_owned()));
        assert!(!globals.assign_separator(RuntimeGlobal::DefaultRs, None));
    }
}
