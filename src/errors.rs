//! The error taxonomy (spec.md §7) and positional error context.

use thiserror::Error;

use crate::reader::StringReader;

/// How many characters of context precede the cursor in a rendered error.
const CONTEXT_AMOUNT: usize = 10;

/// The closed set of syntax error kinds the core itself can raise.
///
/// User-defined `ArgumentType`s that throw something other than a syntax
/// error get wrapped in [`BuiltInError::DispatcherParseException`] by the
/// dispatcher (spec.md §4.3 step 3c).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuiltInError {
    /// Primitive integer tokeniser found no digits to consume.
    #[error("Expected integer")]
    ReaderExpectedInt,
    /// Primitive long tokeniser found no digits to consume.
    #[error("Expected long")]
    ReaderExpectedLong,
    /// Primitive float tokeniser found no digits to consume.
    #[error("Expected float")]
    ReaderExpectedFloat,
    /// Primitive double tokeniser found no digits to consume.
    #[error("Expected double")]
    ReaderExpectedDouble,
    /// Primitive bool tokeniser found nothing at all.
    #[error("Expected bool")]
    ReaderExpectedBool,
    /// The consumed number body didn't parse as an `i32`.
    #[error("Invalid integer '{token}'")]
    ReaderInvalidInt {
        /// The offending token.
        token: String,
    },
    /// The consumed number body didn't parse as an `i64`.
    #[error("Invalid long '{token}'")]
    ReaderInvalidLong {
        /// The offending token.
        token: String,
    },
    /// The consumed number body didn't parse as an `f32`.
    #[error("Invalid float '{token}'")]
    ReaderInvalidFloat {
        /// The offending token.
        token: String,
    },
    /// The consumed number body didn't parse as an `f64`.
    #[error("Invalid double '{token}'")]
    ReaderInvalidDouble {
        /// The offending token.
        token: String,
    },
    /// The consumed word wasn't exactly `true` or `false`.
    #[error("Invalid bool, expected true or false but found '{token}'")]
    ReaderInvalidBool {
        /// The offending token.
        token: String,
    },
    /// A quoted-string read didn't start with `"` or `'`.
    #[error("Expected quote to start a string")]
    ReaderExpectedStartOfQuote,
    /// EOF was reached before the closing quote.
    #[error("Unclosed quoted string")]
    ReaderExpectedEndOfQuote,
    /// A backslash preceded something other than the quote char or `\\`.
    #[error("Invalid escape sequence '\\{character}' in quoted string")]
    ReaderInvalidEscape {
        /// The disallowed escaped character.
        character: char,
    },
    /// `expect(c)` didn't find `c` at the cursor.
    #[error("Expected '{symbol}'")]
    ReaderExpectedSymbol {
        /// The symbol that was required.
        symbol: char,
    },
    /// A bounded integer argument's value was below its minimum.
    #[error("Integer must not be less than {minimum}, found {found}")]
    IntegerTooLow {
        /// The parsed value.
        found: i64,
        /// The configured lower bound.
        minimum: i64,
    },
    /// A bounded integer argument's value was above its maximum.
    #[error("Integer must not be more than {maximum}, found {found}")]
    IntegerTooHigh {
        /// The parsed value.
        found: i64,
        /// The configured upper bound.
        maximum: i64,
    },
    /// A bounded long argument's value was below its minimum.
    #[error("Long must not be less than {minimum}, found {found}")]
    LongTooLow {
        /// The parsed value.
        found: i64,
        /// The configured lower bound.
        minimum: i64,
    },
    /// A bounded long argument's value was above its maximum.
    #[error("Long must not be more than {maximum}, found {found}")]
    LongTooHigh {
        /// The parsed value.
        found: i64,
        /// The configured upper bound.
        maximum: i64,
    },
    /// A bounded float argument's value was below its minimum.
    #[error("Float must not be less than {minimum}, found {found}")]
    FloatTooLow {
        /// The parsed value.
        found: f64,
        /// The configured lower bound.
        minimum: f64,
    },
    /// A bounded float argument's value was above its maximum.
    #[error("Float must not be more than {maximum}, found {found}")]
    FloatTooHigh {
        /// The parsed value.
        found: f64,
        /// The configured upper bound.
        maximum: f64,
    },
    /// A bounded double argument's value was below its minimum.
    #[error("Double must not be less than {minimum}, found {found}")]
    DoubleTooLow {
        /// The parsed value.
        found: f64,
        /// The configured lower bound.
        minimum: f64,
    },
    /// A bounded double argument's value was above its maximum.
    #[error("Double must not be more than {maximum}, found {found}")]
    DoubleTooHigh {
        /// The parsed value.
        found: f64,
        /// The configured upper bound.
        maximum: f64,
    },
    /// A literal node's text didn't match the next word.
    #[error("Expected literal '{expected}'")]
    LiteralIncorrect {
        /// The literal the node expected.
        expected: String,
    },
    /// The tree was exhausted without matching any part of the input.
    #[error("Unknown command")]
    DispatcherUnknownCommand,
    /// The tree matched a command but not all of its arguments.
    #[error("Incorrect argument for command")]
    DispatcherUnknownArgument,
    /// A consumed token wasn't followed by end-of-input or a single space.
    #[error("Expected whitespace to end one argument, but found trailing data")]
    DispatcherExpectedArgumentSeparator,
    /// A user `ArgumentType` threw something other than a syntax error.
    #[error("Could not parse command: {message}")]
    DispatcherParseException {
        /// The wrapped message from the non-syntax error.
        message: String,
    },
}

/// A syntax error produced during parsing, carrying positional context.
///
/// Cloning is cheap (the input is an `Rc`-free owned `String` only when the
/// error is actually surfaced to a caller; during parsing these are kept in
/// a per-branch error map and discarded along with the branch).
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{kind}")]
pub struct CommandSyntaxError {
    /// The specific error kind and its payload.
    pub kind: BuiltInError,
    /// The full input the error occurred against, if context is available.
    pub input: Option<String>,
    /// Cursor offset into `input` at the time of the error.
    pub cursor: usize,
}

impl CommandSyntaxError {
    /// Builds an error with no positional context attached.
    #[must_use]
    pub const fn new(kind: BuiltInError) -> Self {
        Self {
            kind,
            input: None,
            cursor: 0,
        }
    }

    /// Builds an error positioned at `reader`'s current cursor.
    #[must_use]
    pub fn with_context(kind: BuiltInError, reader: &StringReader) -> Self {
        Self {
            kind,
            input: Some(reader.string().to_owned()),
            cursor: reader.cursor(),
        }
    }

    /// The up-to-10-characters-of-context rendering described in spec.md §6.
    #[must_use]
    pub fn context(&self) -> Option<String> {
        let input = self.input.as_ref()?;
        let mut cursor = self.cursor.min(input.len());
        while cursor > 0 && !input.is_char_boundary(cursor) {
            cursor -= 1;
        }

        let mut out = String::new();
        let mut start = cursor.saturating_sub(CONTEXT_AMOUNT);
        while start > 0 && !input.is_char_boundary(start) {
            start -= 1;
        }
        if start > 0 {
            out.push_str("...");
        }
        out.push_str(&input[start..cursor]);
        out.push_str("<--[HERE]");
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{BuiltInError, CommandSyntaxError};
    use crate::reader::StringReader;

    #[test]
    fn context_truncates_with_ellipsis() {
        let reader = StringReader::new("this is a long command string");
        let mut reader = reader;
        reader.set_cursor(20);
        let err = CommandSyntaxError::with_context(BuiltInError::DispatcherUnknownCommand, &reader);
        let ctx = err.context().unwrap();
        assert!(ctx.starts_with("..."));
        assert!(ctx.ends_with("<--[HERE]"));
    }

    #[test]
    fn context_has_no_ellipsis_when_near_start() {
        let mut reader = StringReader::new("short");
        reader.set_cursor(3);
        let err = CommandSyntaxError::with_context(BuiltInError::DispatcherUnknownCommand, &reader);
        assert_eq!(err.context().unwrap(), "sho<--[HERE]");
    }
}
