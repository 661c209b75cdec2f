//! A bounded 64-bit signed integer argument.
//!
//! The original `LongArgumentType` this crate's source material is
//! derived from read a single character and compared it numerically
//! (spec.md §9, Open Questions) — an evident bug. This implementation
//! always uses the long tokeniser and applies the configured bounds.

use crate::arguments::{ArgumentParseError, ArgumentType};
use crate::context::CommandContext;
use crate::errors::{BuiltInError, CommandSyntaxError};
use crate::reader::StringReader;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// Parses an `i64`, optionally bounded.
#[derive(Debug, Clone, Copy)]
pub struct LongArgumentType {
    min: i64,
    max: i64,
}

impl LongArgumentType {
    /// An unbounded long argument.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    /// A long argument bounded to `[min, max]`.
    #[must_use]
    pub const fn bounded(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl Default for LongArgumentType {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ArgumentType<S> for LongArgumentType {
    type Output = i64;

    fn parse(&self, reader: &mut StringReader, _source: &S) -> Result<i64, ArgumentParseError> {
        let start = reader.cursor();
        let value = reader.read_long()?;
        if value < self.min {
            reader.set_cursor(start);
            return Err(CommandSyntaxError::with_context(
                BuiltInError::LongTooLow {
                    found: value,
                    minimum: self.min,
                },
                reader,
            )
            .into());
        }
        if value > self.max {
            reader.set_cursor(start);
            return Err(CommandSyntaxError::with_context(
                BuiltInError::LongTooHigh {
                    found: value,
                    maximum: self.max,
                },
                reader,
            )
            .into());
        }
        Ok(value)
    }

    fn examples(&self) -> Vec<String> {
        vec!["0".to_owned(), "1".to_owned(), "-1".to_owned()]
    }

    fn list_suggestions(
        &self,
        _context: &CommandContext<S>,
        builder: &mut SuggestionsBuilder,
    ) -> Suggestions {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::LongArgumentType;
    use crate::arguments::ArgumentType;
    use crate::reader::StringReader;

    #[test]
    fn parses_values_wider_than_an_i32() {
        let arg = LongArgumentType::new();
        let mut reader = StringReader::new("9000000000");
        assert_eq!(
            ArgumentType::<()>::parse(&arg, &mut reader, &()).unwrap(),
            9_000_000_000
        );
    }

    #[test]
    fn bounds_are_enforced() {
        let arg = LongArgumentType::bounded(0, 10);
        let mut reader = StringReader::new("11");
        assert!(ArgumentType::<()>::parse(&arg, &mut reader, &()).is_err());
    }
}
