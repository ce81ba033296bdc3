//! Capabilities the binder needs from the embedding runtime.
//!
//! The binder never inspects host values itself. Everything it needs to know about a
//! value, and every value it has to create, goes through [`CallContext`], which the
//! embedder implements on top of its own invocation bridge.

/// Per-call view of the host runtime.
///
/// One context describes one native method invocation: it knows whether that call
/// carries a block and how to build the host's values. Implementations must not
/// change the binder's view of the arguments; all queries are side-effect free from
/// the binder's perspective.
pub trait CallContext {
    /// Handle to a host value.
    type Value: Clone;

    /// The host's nil-equivalent, written to slots that have no argument.
    fn nil(&self) -> Self::Value;

    /// Whether `value` is the nil-equivalent.
    fn is_nil(&self, value: &Self::Value) -> bool;

    /// Whether `value` should be treated as a keyword/options mapping.
    ///
    /// With `strict`, the host should only accept values that are usable as keyword
    /// arguments as-is (for CRuby: a hash whose keys are all symbols).
    fn is_keyword_like(&self, value: &Self::Value, strict: bool) -> bool;

    /// Whether a block was passed to the current call.
    fn block_given(&self) -> bool;

    /// Materializes the current call's block as a value.
    ///
    /// Only called when [`block_given`](Self::block_given) returned true.
    fn current_block(&mut self) -> Self::Value;

    /// Creates a new, empty ordered sequence for the rest slot.
    fn new_sequence(&mut self) -> Self::Value;

    /// Appends `value` to a sequence created by [`new_sequence`](Self::new_sequence).
    fn append(&mut self, sequence: &mut Self::Value, value: Self::Value);
}
