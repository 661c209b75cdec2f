//! Typed argument slots (spec.md §3 "Argument type", §9 "Polymorphism over
//! argument types").
//!
//! An [`ArgumentType`] is the open, user-extensible half of the command
//! tree: built-ins live in the sibling modules of this one. Because each
//! implementation has its own `Output`, node storage can't hold a single
//! `dyn ArgumentType<S>` directly — [`ArgumentTypeDyn`] is the object-safe
//! erasure every `ArgumentType` gets for free via the blanket impl below,
//! and [`ParsedValue`] is the type-erased envelope its output is boxed
//! into, downcast back to `T` by [`crate::context::CommandContext::get`].

pub mod boolean;
pub mod double;
pub mod float;
pub mod integer;
pub mod long;
pub mod string;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::context::CommandContext;
use crate::errors::{BuiltInError, CommandSyntaxError};
use crate::reader::StringReader;
use crate::suggestion::SuggestionsBuilder;

/// What an [`ArgumentType::parse`] may fail with: a well-formed syntax
/// complaint (the closed [`BuiltInError`] taxonomy), or anything else — a
/// validation failure against external state, an I/O error, and the like.
/// The latter is wrapped into [`BuiltInError::DispatcherParseException`]
/// once it reaches the dispatcher (spec.md §4.3 step 3c).
#[derive(Debug, Error)]
pub enum ArgumentParseError {
    /// A syntax error raised by a reader primitive or a bounds check.
    #[error(transparent)]
    Syntax(#[from] CommandSyntaxError),
    /// Anything else a host `ArgumentType` impl wants to raise.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ArgumentParseError {
    /// Folds this into the crate's closed [`CommandSyntaxError`], wrapping
    /// [`Self::Other`] as a [`BuiltInError::DispatcherParseException`]
    /// positioned at `reader`'s current cursor.
    #[must_use]
    pub fn into_syntax_error(self, reader: &StringReader) -> CommandSyntaxError {
        match self {
            Self::Syntax(err) => err,
            Self::Other(err) => CommandSyntaxError::with_context(
                BuiltInError::DispatcherParseException {
                    message: err.to_string(),
                },
                reader,
            ),
        }
    }
}

/// A type-erased parsed argument value, stored by name in a
/// [`crate::context::CommandContext`].
///
/// Wraps an `Arc` rather than a `Box` so a branch's context-builder can be
/// cloned cheaply during the tree walk (spec.md §4.3 step 3b) without
/// requiring every `ArgumentType::Output` to itself be `Clone`.
#[derive(Clone)]
pub struct ParsedValue(Arc<dyn Any + Send + Sync>);

impl ParsedValue {
    /// Boxes a concrete value into an erased envelope.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Downcasts back to `T`, returning `None` on a type mismatch.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParsedValue(..)")
    }
}

/// A pluggable parser for one typed slot in the command grammar.
///
/// Built-in implementations live alongside this module (`integer`,
/// `long`, `float`, `double`, `boolean`, `string`); host applications
/// implement this trait for their own domain types (player names,
/// entity selectors, and the like).
pub trait ArgumentType<S>: Send + Sync + 'static {
    /// The value this argument type produces on success.
    type Output: Clone + Send + Sync + 'static;

    /// Consumes a prefix of `reader` and returns the parsed value, or
    /// fails with the cursor restored (the same contract primitive
    /// tokenisers follow, spec.md §4.1). Syntax complaints should use
    /// [`ArgumentParseError::Syntax`] (usually via `?` on a reader
    /// primitive); anything else — a validation failure against
    /// external state, an I/O error, and the like — can be boxed as
    /// `Box<dyn std::error::Error + Send + Sync>` and raised via `?`,
    /// folding into [`ArgumentParseError::Other`].
    fn parse(&self, reader: &mut StringReader, source: &S) -> Result<Self::Output, ArgumentParseError>;

    /// Example strings used for author-time ambiguity detection
    /// (spec.md §4.2). Empty by default.
    fn examples(&self) -> Vec<String> {
        Vec::new()
    }

    /// Suggestions for this argument's domain at the current cursor.
    /// The default returns whatever the builder already holds (i.e. no
    /// additions) — most argument types don't offer completions.
    fn list_suggestions(
        &self,
        _context: &CommandContext<S>,
        builder: &mut SuggestionsBuilder,
    ) -> crate::suggestion::Suggestions {
        builder.build()
    }
}

/// The object-safe form of [`ArgumentType`], obtained for any `T:
/// ArgumentType<S>` via the blanket impl below. Tree nodes store
/// `Box<dyn ArgumentTypeDyn<S>>` since sibling argument nodes may each
/// parse a different `Output`.
pub trait ArgumentTypeDyn<S>: Send + Sync {
    /// As [`ArgumentType::parse`], with the output boxed into a
    /// [`ParsedValue`].
    fn parse_dyn(
        &self,
        reader: &mut StringReader,
        source: &S,
    ) -> Result<ParsedValue, ArgumentParseError>;

    /// As [`ArgumentType::examples`].
    fn examples_dyn(&self) -> Vec<String>;

    /// As [`ArgumentType::list_suggestions`].
    fn list_suggestions_dyn(
        &self,
        context: &CommandContext<S>,
        builder: &mut SuggestionsBuilder,
    ) -> crate::suggestion::Suggestions;
}

impl<S, A> ArgumentTypeDyn<S> for A
where
    A: ArgumentType<S>,
{
    fn parse_dyn(
        &self,
        reader: &mut StringReader,
        source: &S,
    ) -> Result<ParsedValue, ArgumentParseError> {
        self.parse(reader, source).map(ParsedValue::new)
    }

    fn examples_dyn(&self) -> Vec<String> {
        self.examples()
    }

    fn list_suggestions_dyn(
        &self,
        context: &CommandContext<S>,
        builder: &mut SuggestionsBuilder,
    ) -> crate::suggestion::Suggestions {
        self.list_suggestions(context, builder)
    }
}
