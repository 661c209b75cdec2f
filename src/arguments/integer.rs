//! A bounded 32-bit signed integer argument.

use crate::arguments::{ArgumentParseError, ArgumentType};
use crate::context::CommandContext;
use crate::errors::{BuiltInError, CommandSyntaxError};
use crate::reader::StringReader;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// Parses an `i32`, optionally bounded.
///
/// ```
/// # use command_dispatch::arguments::integer::IntegerArgumentType;
/// let bounded = IntegerArgumentType::bounded(0, 100);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IntegerArgumentType {
    min: i32,
    max: i32,
}

impl IntegerArgumentType {
    /// An unbounded integer argument.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min: i32::MIN,
            max: i32::MAX,
        }
    }

    /// An integer argument bounded to `[min, max]`.
    #[must_use]
    pub const fn bounded(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

impl Default for IntegerArgumentType {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ArgumentType<S> for IntegerArgumentType {
    type Output = i32;

    fn parse(&self, reader: &mut StringReader, _source: &S) -> Result<i32, ArgumentParseError> {
        let start = reader.cursor();
        let value = reader.read_int()?;
        if value < self.min {
            reader.set_cursor(start);
            return Err(CommandSyntaxError::with_context(
                BuiltInError::IntegerTooLow {
                    found: i64::from(value),
                    minimum: i64::from(self.min),
                },
                reader,
            )
            .into());
        }
        if value > self.max {
            reader.set_cursor(start);
            return Err(CommandSyntaxError::with_context(
                BuiltInError::IntegerTooHigh {
                    found: i64::from(value),
                    maximum: i64::from(self.max),
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
    use super::IntegerArgumentType;
    use crate::arguments::{ArgumentParseError, ArgumentType};
    use crate::errors::BuiltInError;
    use crate::reader::StringReader;

    #[test]
    fn bounds_are_enforced() {
        let arg = IntegerArgumentType::bounded(0, 100);
        let mut reader = StringReader::new("200");
        let ArgumentParseError::Syntax(err) = ArgumentType::<()>::parse(&arg, &mut reader, &()).unwrap_err()
        else {
            unreachable!("bounds checks only raise syntax errors")
        };
        assert!(matches!(err.kind, BuiltInError::IntegerTooHigh { .. }));

        let mut reader = StringReader::new("-5");
        let ArgumentParseError::Syntax(err) = ArgumentType::<()>::parse(&arg, &mut reader, &()).unwrap_err()
        else {
            unreachable!("bounds checks only raise syntax errors")
        };
        assert!(matches!(err.kind, BuiltInError::IntegerTooLow { .. }));

        let mut reader = StringReader::new("5");
        assert_eq!(ArgumentType::<()>::parse(&arg, &mut reader, &()).unwrap(), 5);
    }
}
