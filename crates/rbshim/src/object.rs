use std::fmt::{self, Write};

use indexmap::IndexMap;
use serde_json::{Map, Number, Value as JsonValue};

use crate::host::CallContext;

/// A host value owned entirely on the Rust side.
///
/// `Object` is a reference host for the binder: it is what the CLI and the test suite
/// pass through [`ObjectContext`]. Embedders bridging to a real runtime implement
/// [`CallContext`] over their own value handles instead.
///
/// # JSON Mapping
///
/// | JSON | Object |
/// |------|--------|
/// | `null` | `Nil` |
/// | `true`/`false` | `Bool` |
/// | integer | `Int` (falls back to `Float` outside `i64`) |
/// | float | `Float` |
/// | `":name"` | `Symbol` |
/// | other strings | `String` |
/// | array | `Array` |
/// | object | `Hash` with symbol keys |
///
/// Output-only: `Proc` → `{"$proc": "name"}`, `Io` → `{"$io": fd}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Symbol(String),
    Array(Vec<Self>),
    /// Insertion-ordered hash.
    Hash(IndexMap<HashKey, Self>),
    /// A block materialized as a proc, identified by name.
    Proc(String),
    /// An IO stream identified by its file descriptor.
    Io(i32),
}

/// Hashable subset of [`Object`] usable as a hash key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Nil,
    Int(i64),
    String(String),
    Symbol(String),
}

impl HashKey {
    #[must_use]
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(name.to_owned())
    }

    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Symbol(s) => write!(f, ":{s}"),
        }
    }
}

impl Object {
    /// Builds a hash from key/value pairs, keeping insertion order.
    pub fn hash(pairs: impl IntoIterator<Item = (HashKey, Self)>) -> Self {
        Self::Hash(pairs.into_iter().collect())
    }

    #[must_use]
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(name.to_owned())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Whether this is a hash usable as keyword arguments.
    ///
    /// Any hash qualifies in lenient mode; `strict` additionally requires every key
    /// to be a symbol.
    #[must_use]
    pub fn is_keyword_hash(&self, strict: bool) -> bool {
        match self {
            Self::Hash(map) => !strict || map.keys().all(|key| matches!(key, HashKey::Symbol(_))),
            _ => false,
        }
    }

    /// Converts a JSON value using the mapping described on [`Object`].
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Nil,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => match s.strip_prefix(':') {
                Some(name) if !name.is_empty() => Self::Symbol(name.to_owned()),
                _ => Self::String(s.clone()),
            },
            JsonValue::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            JsonValue::Object(map) => Self::hash(
                map.iter()
                    .map(|(key, value)| (HashKey::Symbol(key.clone()), Self::from_json(value))),
            ),
        }
    }

    /// Converts to JSON. Non-finite floats become `null`; hash keys are rendered as text.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Nil => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Symbol(s) => JsonValue::String(format!(":{s}")),
            Self::Array(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Hash(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    let key = match key {
                        HashKey::Symbol(s) | HashKey::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    out.insert(key, value.to_json());
                }
                JsonValue::Object(out)
            }
            Self::Proc(name) => serde_json::json!({ "$proc": name }),
            Self::Io(fd) => serde_json::json!({ "$io": fd }),
        }
    }
}

/// Renders values the way the host's `inspect` would.
impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Symbol(s) => write!(f, ":{s}"),
            Self::Array(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Self::Hash(map) => {
                if map.is_empty() {
                    return f.write_str("{}");
                }
                f.write_char('{')?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match key {
                        HashKey::Symbol(name) => write!(f, "{name}: {value}")?,
                        other => write!(f, "{other} => {value}")?,
                    }
                }
                f.write_char('}')
            }
            Self::Proc(name) => write!(f, "#<Proc:{name}>"),
            Self::Io(fd) => write!(f, "#<IO:fd {fd}>"),
        }
    }
}

/// [`CallContext`] over [`Object`] values for one call.
#[derive(Debug, Clone, Default)]
pub struct ObjectContext {
    block: Option<Object>,
}

impl ObjectContext {
    /// A call without a block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A call with `block` attached.
    #[must_use]
    pub fn with_block(block: Object) -> Self {
        Self { block: Some(block) }
    }
}

impl CallContext for ObjectContext {
    type Value = Object;

    fn nil(&self) -> Object {
        Object::Nil
    }

    fn is_nil(&self, value: &Object) -> bool {
        value.is_nil()
    }

    fn is_keyword_like(&self, value: &Object, strict: bool) -> bool {
        value.is_keyword_hash(strict)
    }

    fn block_given(&self) -> bool {
        self.block.is_some()
    }

    fn current_block(&mut self) -> Object {
        self.block.clone().unwrap_or(Object::Nil)
    }

    fn new_sequence(&mut self) -> Object {
        Object::Array(Vec::new())
    }

    fn append(&mut self, sequence: &mut Object, value: Object) {
        if let Object::Array(items) = sequence {
            items.push(value);
        }
    }
}
