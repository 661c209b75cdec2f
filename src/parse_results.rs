//! The outcome of one top-level parse attempt (spec.md §3 "ParseResults").

use crate::context::CommandContextBuilder;
use crate::errors::CommandSyntaxError;
use crate::reader::StringReader;
use crate::tree::NodeRef;

/// What `parse` returns: never a failure by itself — a diagnostic record
/// for `execute` (or a caller inspecting it directly) to act on.
pub struct ParseResults<S> {
    /// The accumulated context-builder from the furthest-reached branch.
    pub context: CommandContextBuilder<S>,
    /// The reader as left by that branch; its cursor marks how much of
    /// the input was consumed.
    pub reader: StringReader,
    /// Errors recorded for children that were tried and rejected at the
    /// level parsing stopped at, in the order they were tried.
    pub exceptions: Vec<(NodeRef<S>, CommandSyntaxError)>,
}

impl<S> ParseResults<S> {
    #[must_use]
    pub(crate) const fn new(
        context: CommandContextBuilder<S>,
        reader: StringReader,
        exceptions: Vec<(NodeRef<S>, CommandSyntaxError)>,
    ) -> Self {
        Self {
            context,
            reader,
            exceptions,
        }
    }

    /// `true` if the reader has nothing left unconsumed — the shape a
    /// successful `execute` requires.
    #[must_use]
    pub fn is_consumable(&self) -> bool {
        !self.reader.can_read()
    }
}
