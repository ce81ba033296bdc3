//! Binding of incoming arguments against a parsed [`ArgSpec`].
//!
//! This is the runtime half of `rb_scan_args`. Given a shape and the arguments of one
//! native method call, the binder produces one value per slot in this order:
//!
//! ```text
//! [leading...][optional...][rest?][trailing...][keywords?][block?]
//! ```
//!
//! Trailing arguments and a pending keyword hash are reserved at the tail of the
//! argument list before anything else is bound, so leading, optional and rest slots
//! never consume them.
//!
//! # Keyword ambiguity
//!
//! A trailing hash is only taken as keywords when the host says it is keyword-like.
//! A trailing nil is taken as an empty options hash only when it cannot be a
//! positional argument: there is no rest slot and there are more arguments than the
//! leading, optional and trailing slots can hold. Otherwise keywords are *erased*:
//! nothing is consumed, but the keyword slot is still written with nil.

use smallvec::SmallVec;

use crate::{
    cache::SpecCache,
    config::ShimConfig,
    exception::{ScanError, ScanResult},
    format::{ArgSpec, MAX_OUTPUT_SLOTS, SlotKind},
    host::CallContext,
    tracer::{NoopTracer, ScanTracer},
};

/// State of the keyword slot across one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum KeywordState {
    /// The format has no `:`; no keyword slot exists.
    NotAccepted,
    /// The last argument will be consumed as the keyword hash.
    Pending,
    /// Keywords are accepted but the last argument is positional; the slot gets nil.
    Erased,
    /// The keyword hash was bound and no longer counts as a positional argument.
    Consumed,
}

impl KeywordState {
    /// Decides whether the last argument is the keyword hash.
    fn resolve<C: CallContext>(spec: &ArgSpec, ctx: &C, args: &[C::Value]) -> Self {
        if !spec.accepts_keywords {
            return Self::NotAccepted;
        }
        // every argument is owed to a mandatory slot
        if args.len() <= spec.min_args() {
            return Self::Erased;
        }
        let Some(last) = args.last() else {
            return Self::Erased;
        };

        if ctx.is_nil(last) {
            let fits_positionally = args.len() <= spec.min_args() + usize::from(spec.optional);
            if spec.has_rest || fits_positionally {
                Self::Erased
            } else {
                Self::Pending
            }
        } else if ctx.is_keyword_like(last, true) {
            Self::Pending
        } else {
            Self::Erased
        }
    }
}

/// Values bound by one scan, in slot order.
///
/// Holds at most [`MAX_OUTPUT_SLOTS`] values. `argc` is the effective argument count:
/// the number of arguments passed, minus one if a keyword hash was consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutput<V> {
    values: SmallVec<[V; MAX_OUTPUT_SLOTS]>,
    kinds: SmallVec<[SlotKind; MAX_OUTPUT_SLOTS]>,
    argc: usize,
}

impl<V> ScanOutput<V> {
    /// Effective argument count.
    #[must_use]
    pub fn argc(&self) -> usize {
        self.argc
    }

    /// Number of stored slot values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the slot at `index` (zero-based).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    /// Kind of the slot at `index` (zero-based).
    #[must_use]
    pub fn kind(&self, index: usize) -> Option<SlotKind> {
        self.kinds.get(index).copied()
    }

    /// The first stored value of the given kind.
    #[must_use]
    pub fn first_of(&self, kind: SlotKind) -> Option<&V> {
        self.kinds.iter().position(|k| *k == kind).map(|i| &self.values[i])
    }

    #[must_use]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Iterates over `(kind, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotKind, &V)> {
        self.kinds.iter().copied().zip(self.values.iter())
    }

    #[must_use]
    pub fn into_values(self) -> SmallVec<[V; MAX_OUTPUT_SLOTS]> {
        self.values
    }

    /// Destructures the slots into a fixed-size array.
    ///
    /// Slots the scan did not produce are `None`.
    #[must_use]
    pub fn into_array<const N: usize>(self) -> [Option<V>; N] {
        let mut values = self.values.into_iter();
        std::array::from_fn(|_| values.next())
    }

    /// Writes slot values into caller-provided destinations, returning the effective argc.
    ///
    /// A `None` destination means the caller did not ask for that slot; it is skipped
    /// and the value dropped. Destinations past the produced slots are left untouched.
    pub fn write_into(self, destinations: &mut [Option<&mut V>]) -> usize {
        for (destination, value) in destinations.iter_mut().zip(self.values) {
            if let Some(destination) = destination {
                **destination = value;
            }
        }
        self.argc
    }
}

/// Accumulates slot values, dropping everything past the output limit.
struct SlotWriter<'t, V, Tr: ScanTracer> {
    values: SmallVec<[V; MAX_OUTPUT_SLOTS]>,
    kinds: SmallVec<[SlotKind; MAX_OUTPUT_SLOTS]>,
    produced: usize,
    tracer: &'t mut Tr,
}

impl<'t, V, Tr: ScanTracer> SlotWriter<'t, V, Tr> {
    fn new(tracer: &'t mut Tr) -> Self {
        Self {
            values: SmallVec::new(),
            kinds: SmallVec::new(),
            produced: 0,
            tracer,
        }
    }

    fn push(&mut self, kind: SlotKind, value: V) {
        let stored = self.produced < MAX_OUTPUT_SLOTS;
        if stored {
            self.values.push(value);
            self.kinds.push(kind);
        }
        self.tracer.on_slot(self.produced, kind, stored);
        self.produced += 1;
    }

    fn finish(self, argc: usize) -> ScanOutput<V> {
        ScanOutput {
            values: self.values,
            kinds: self.kinds,
            argc,
        }
    }
}

/// Binds `args` against `spec`.
///
/// Fails with [`ScanError::Arity`] before binding anything when there are fewer
/// arguments than mandatory slots, and after binding when positional arguments
/// are left over.
pub fn bind_args<C: CallContext, Tr: ScanTracer>(
    spec: &ArgSpec,
    ctx: &mut C,
    args: &[C::Value],
    tracer: &mut Tr,
) -> ScanResult<ScanOutput<C::Value>> {
    let argc = args.len();
    let min = spec.min_args();
    let max = spec.max_args();
    if argc < min {
        return Err(ScanError::arity(argc, min, max));
    }

    let mut keywords = KeywordState::resolve(spec, ctx, args);
    tracer.on_keyword_resolved(keywords);

    // positions at the tail owed to trailing slots and a pending keyword hash
    let reserved = usize::from(spec.required_trailing) + usize::from(keywords == KeywordState::Pending);
    let mut out = SlotWriter::new(tracer);
    let mut next = 0;

    // argc >= min_args, so every leading slot has an argument outside the reservation
    for _ in 0..spec.required_leading {
        out.push(SlotKind::Leading, args[next].clone());
        next += 1;
    }
    for _ in 0..spec.optional {
        if next + reserved < argc {
            out.push(SlotKind::Optional, args[next].clone());
            next += 1;
        } else {
            out.push(SlotKind::Optional, ctx.nil());
        }
    }
    if spec.has_rest {
        let mut rest = ctx.new_sequence();
        while next + reserved < argc {
            ctx.append(&mut rest, args[next].clone());
            next += 1;
        }
        out.push(SlotKind::Rest, rest);
    }
    for _ in 0..spec.required_trailing {
        out.push(SlotKind::Trailing, args[next].clone());
        next += 1;
    }
    match keywords {
        KeywordState::Pending => {
            // the hash vetted during resolution, even when surplus arguments precede it
            out.push(SlotKind::Keywords, args[argc - 1].clone());
            keywords = KeywordState::Consumed;
        }
        KeywordState::Erased => out.push(SlotKind::Keywords, ctx.nil()),
        KeywordState::NotAccepted | KeywordState::Consumed => {}
    }
    if spec.accepts_block {
        let block = if ctx.block_given() { ctx.current_block() } else { ctx.nil() };
        out.push(SlotKind::Block, block);
    }

    let argc = if keywords == KeywordState::Consumed { argc - 1 } else { argc };
    if next < argc {
        return Err(ScanError::arity(argc, min, max));
    }
    Ok(out.finish(argc))
}

/// Parses formats and binds arguments, reporting to a tracer.
///
/// A scanner can carry a [`SpecCache`] so that repeated scans with the same format
/// string (one call site called many times) skip parsing.
#[derive(Debug, Default)]
pub struct Scanner<Tr: ScanTracer = NoopTracer> {
    tracer: Tr,
    cache: Option<SpecCache>,
}

impl<Tr: ScanTracer> Scanner<Tr> {
    #[must_use]
    pub fn new(tracer: Tr) -> Self {
        Self { tracer, cache: None }
    }

    /// Builds a scanner honoring `config.spec_cache_capacity`.
    #[must_use]
    pub fn with_config(tracer: Tr, config: &ShimConfig) -> Self {
        let scanner = Self::new(tracer);
        if config.spec_cache_capacity > 0 {
            scanner.with_cache(config.spec_cache_capacity)
        } else {
            scanner
        }
    }

    /// Enables format memoization for up to `capacity` distinct format strings.
    #[must_use]
    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = Some(SpecCache::new(capacity));
        self
    }

    #[must_use]
    pub fn tracer(&self) -> &Tr {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut Tr {
        &mut self.tracer
    }

    #[must_use]
    pub fn into_tracer(self) -> Tr {
        self.tracer
    }

    #[must_use]
    pub fn cache(&self) -> Option<&SpecCache> {
        self.cache.as_ref()
    }

    /// Parses `format` (or fetches it from the cache).
    pub fn spec(&mut self, format: &str) -> ScanResult<ArgSpec> {
        let parsed = match &mut self.cache {
            Some(cache) => cache.get_or_parse(format),
            None => ArgSpec::parse(format).map(|spec| (spec, false)),
        };
        match parsed {
            Ok((spec, cached)) => {
                self.tracer.on_parse(format, &spec, cached);
                Ok(spec)
            }
            Err(err) => {
                self.tracer.on_error(&err);
                Err(err)
            }
        }
    }

    /// Binds `args` against an already parsed shape.
    pub fn bind<C: CallContext>(
        &mut self,
        spec: &ArgSpec,
        ctx: &mut C,
        args: &[C::Value],
    ) -> ScanResult<ScanOutput<C::Value>> {
        match bind_args(spec, ctx, args, &mut self.tracer) {
            Ok(output) => {
                self.tracer.on_finish(output.argc());
                Ok(output)
            }
            Err(err) => {
                self.tracer.on_error(&err);
                Err(err)
            }
        }
    }

    /// Parses `format` and binds `args` against it.
    pub fn scan<C: CallContext>(
        &mut self,
        ctx: &mut C,
        args: &[C::Value],
        format: &str,
    ) -> ScanResult<ScanOutput<C::Value>> {
        let spec = self.spec(format)?;
        self.bind(&spec, ctx, args)
    }
}

/// Parses `format` and binds `args` against it.
///
/// ```
/// use rbshim::{Object, ObjectContext, scan_args};
///
/// let mut ctx = ObjectContext::new();
/// let args = [Object::Int(1), Object::Int(2), Object::Int(3), Object::Int(4)];
/// let out = scan_args(&mut ctx, &args, "1*1").unwrap();
/// assert_eq!(out.get(0), Some(&Object::Int(1)));
/// assert_eq!(out.get(1), Some(&Object::Array(vec![Object::Int(2), Object::Int(3)])));
/// assert_eq!(out.get(2), Some(&Object::Int(4)));
/// assert_eq!(out.argc(), 4);
/// ```
pub fn scan_args<C: CallContext>(ctx: &mut C, args: &[C::Value], format: &str) -> ScanResult<ScanOutput<C::Value>> {
    Scanner::new(NoopTracer).scan(ctx, args, format)
}

/// Parses `format`, binds `args` and writes the slots into C-style destinations.
///
/// Returns the effective argc. See [`ScanOutput::write_into`].
pub fn scan_args_into<C: CallContext>(
    ctx: &mut C,
    args: &[C::Value],
    format: &str,
    destinations: &mut [Option<&mut C::Value>],
) -> ScanResult<usize> {
    Ok(scan_args(ctx, args, format)?.write_into(destinations))
}

/// Scans arguments into up to ten destinations, `rb_scan_args` style.
///
/// Each destination is an `Option<&mut V>`; pass `None` for slots you don't need.
/// More than ten destinations is a compile error.
///
/// ```
/// use rbshim::{Object, ObjectContext};
///
/// let mut ctx = ObjectContext::new();
/// let (mut a, mut b) = (Object::Nil, Object::Nil);
/// let argc = rbshim::scan_args!(&mut ctx, &[Object::Int(7)], "11", Some(&mut a), Some(&mut b)).unwrap();
/// assert_eq!((a, b, argc), (Object::Int(7), Object::Nil, 1));
/// ```
#[macro_export]
macro_rules! scan_args {
    ($ctx:expr, $args:expr, $format:expr, $($slot:expr),+ $(,)?) => {{
        const {
            assert!(
                [$(stringify!($slot)),+].len() <= $crate::MAX_OUTPUT_SLOTS,
                "scan_args! accepts at most ten destinations"
            );
        }
        $crate::scan_args_into($ctx, $args, $format, &mut [$($slot),+])
    }};
}
