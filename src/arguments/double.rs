//! A bounded 64-bit floating point argument.

use crate::arguments::{ArgumentParseError, ArgumentType};
use crate::context::CommandContext;
use crate::errors::{BuiltInError, CommandSyntaxError};
use crate::reader::StringReader;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// Parses an `f64`, optionally bounded.
#[derive(Debug, Clone, Copy)]
pub struct DoubleArgumentType {
    min: f64,
    max: f64,
}

impl DoubleArgumentType {
    /// An unbounded double argument.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min: f64::MIN,
            max: f64::MAX,
        }
    }

    /// A double argument bounded to `[min, max]`.
    #[must_use]
    pub const fn bounded(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Default for DoubleArgumentType {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ArgumentType<S> for DoubleArgumentType {
    type Output = f64;

    fn parse(&self, reader: &mut StringReader, _source: &S) -> Result<f64, ArgumentParseError> {
        let start = reader.cursor();
        let value = reader.read_double()?;
        if value < self.min {
            reader.set_cursor(start);
            return Err(CommandSyntaxError::with_context(
                BuiltInError::DoubleTooLow {
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
                BuiltInError::DoubleTooHigh {
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
        vec!["0".to_owned(), "1.2".to_owned(), "-1.2".to_owned()]
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
    use super::DoubleArgumentType;
    use crate::arguments::ArgumentType;
    use crate::reader::StringReader;

    #[test]
    fn bounds_are_enforced() {
        let arg = DoubleArgumentType::bounded(0.0, 1.0);
        let mut reader = StringReader::new("-0.1");
        assert!(ArgumentType::<()>::parse(&arg, &mut reader, &()).is_err());
    }
}
