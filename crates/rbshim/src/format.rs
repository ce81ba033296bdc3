//! Parsing of `rb_scan_args` format strings.
//!
//! A format string is a compact description of the argument shape a native method
//! accepts. It is scanned left to right without backtracking:
//!
//! ```text
//! [leading digit [optional digit]] ['*'] [trailing digit] [':'] ['&']
//! ```
//!
//! For example `"21*1:&"` means two required leading arguments, one optional, a rest
//! slot, one required trailing argument, a keyword hash and a block.

use std::{fmt, str::FromStr};

use smallvec::SmallVec;

use crate::exception::{ScanError, ScanResult};

/// Maximum number of output slots a single scan can fill.
///
/// Values produced past this slot are still bound (they consume their arguments)
/// but are discarded from the output.
pub const MAX_OUTPUT_SLOTS: usize = 10;

/// The parsed shape of a native method's arguments.
///
/// Immutable once parsed; parsing the same format string always yields an equal value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ArgSpec {
    /// Mandatory arguments before any optional/rest/trailing group.
    pub required_leading: u8,
    /// Optional positional arguments following the leading ones.
    pub optional: u8,
    /// Whether surplus positional arguments are collected into a rest list.
    pub has_rest: bool,
    /// Mandatory arguments after the optional/rest group.
    pub required_trailing: u8,
    /// Whether a trailing keyword hash is recognized.
    pub accepts_keywords: bool,
    /// Whether the call's block is bound to a slot.
    pub accepts_block: bool,
}

/// What a single output slot holds, in the order slots are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Leading,
    Optional,
    Rest,
    Trailing,
    Keywords,
    Block,
}

impl ArgSpec {
    /// Parses a format string.
    ///
    /// Fails with [`ScanError::InvalidFormat`] if any character is left unconsumed
    /// after the grammar has been scanned.
    pub fn parse(format: &str) -> ScanResult<Self> {
        let mut cursor = format.as_bytes().iter().copied().peekable();
        let mut spec = Self::default();

        if let Some(leading) = cursor.next_if(u8::is_ascii_digit) {
            spec.required_leading = leading - b'0';
            if let Some(optional) = cursor.next_if(u8::is_ascii_digit) {
                spec.optional = optional - b'0';
            }
        }
        spec.has_rest = cursor.next_if_eq(&b'*').is_some();
        if let Some(trailing) = cursor.next_if(u8::is_ascii_digit) {
            spec.required_trailing = trailing - b'0';
        }
        spec.accepts_keywords = cursor.next_if_eq(&b':').is_some();
        spec.accepts_block = cursor.next_if_eq(&b'&').is_some();

        if cursor.next().is_some() {
            return Err(ScanError::invalid_format(format));
        }
        Ok(spec)
    }

    /// Number of mandatory arguments, leading plus trailing.
    #[must_use]
    pub fn min_args(&self) -> usize {
        usize::from(self.required_leading) + usize::from(self.required_trailing)
    }

    /// Maximum number of positional arguments, or `None` when a rest slot makes it unlimited.
    #[must_use]
    pub fn max_args(&self) -> Option<usize> {
        if self.has_rest {
            None
        } else {
            Some(self.min_args() + usize::from(self.optional))
        }
    }

    /// Ordered layout of the slots a scan produces.
    ///
    /// This can exceed [`MAX_OUTPUT_SLOTS`]; only the first ten are ever returned to a caller.
    #[must_use]
    pub fn slots(&self) -> SmallVec<[SlotKind; MAX_OUTPUT_SLOTS]> {
        let mut slots = SmallVec::new();
        slots.extend(std::iter::repeat_n(SlotKind::Leading, self.required_leading.into()));
        slots.extend(std::iter::repeat_n(SlotKind::Optional, self.optional.into()));
        if self.has_rest {
            slots.push(SlotKind::Rest);
        }
        slots.extend(std::iter::repeat_n(SlotKind::Trailing, self.required_trailing.into()));
        if self.accepts_keywords {
            slots.push(SlotKind::Keywords);
        }
        if self.accepts_block {
            slots.push(SlotKind::Block);
        }
        slots
    }

    /// Total number of slots the format describes.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.min_args()
            + usize::from(self.optional)
            + usize::from(self.has_rest)
            + usize::from(self.accepts_keywords)
            + usize::from(self.accepts_block)
    }
}

impl FromStr for ArgSpec {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders the canonical format string for this shape.
///
/// An optional count without a leading digit cannot be expressed, so the leading
/// digit is always written when `optional` is non-zero. Without a `*`, a trailing
/// digit is only recognized as the third digit, so both earlier digits are written
/// too. Zero counts are otherwise omitted: `"1*0"` renders as `"1*"`.
impl fmt::Display for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trailing_needs_prefix = self.required_trailing > 0 && !self.has_rest;
        if self.required_leading > 0 || self.optional > 0 || trailing_needs_prefix {
            write!(f, "{}", self.required_leading)?;
            if self.optional > 0 || trailing_needs_prefix {
                write!(f, "{}", self.optional)?;
            }
        }
        if self.has_rest {
            f.write_str("*")?;
        }
        if self.required_trailing > 0 {
            write!(f, "{}", self.required_trailing)?;
        }
        if self.accepts_keywords {
            f.write_str(":")?;
        }
        if self.accepts_block {
            f.write_str("&")?;
        }
        Ok(())
    }
}
