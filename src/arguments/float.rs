//! A bounded 32-bit floating point argument.

use crate::arguments::{ArgumentParseError, ArgumentType};
use crate::context::CommandContext;
use crate::errors::{BuiltInError, CommandSyntaxError};
use crate::reader::StringReader;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// Parses an `f32`, optionally bounded.
#[derive(Debug, Clone, Copy)]
pub struct FloatArgumentType {
    min: f32,
    max: f32,
}

impl FloatArgumentType {
    /// An unbounded float argument.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min: f32::MIN,
            max: f32::MAX,
        }
    }

    /// A float argument bounded to `[min, max]`.
    #[must_use]
    pub const fn bounded(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

impl Default for FloatArgumentType {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ArgumentType<S> for FloatArgumentType {
    type Output = f32;

    fn parse(&self, reader: &mut StringReader, _source: &S) -> Result<f32, ArgumentParseError> {
        let start = reader.cursor();
        let value = reader.read_float()?;
        if value < self.min {
            reader.set_cursor(start);
            return Err(CommandSyntaxError::with_context(
                BuiltInError::FloatTooLow {
                    found: f64::from(value),
                    minimum: f64::from(self.min),
                },
                reader,
            )
            .into());
        }
        if value > self.max {
            reader.set_cursor(start);
            return Err(CommandSyntaxError::with_context(
                BuiltInError::FloatTooHigh {
                    found: f64::from(value),
                    maximum: f64::from(self.max),
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
    use super::FloatArgumentType;
    use crate::arguments::ArgumentType;
    use crate::reader::StringReader;

    #[test]
    fn bounds_are_enforced() {
        let arg = FloatArgumentType::bounded(0.0, 1.0);
        let mut reader = StringReader::new("1.5");
        assert!(ArgumentType::<()>::parse(&arg, &mut reader, &()).is_err());
        let mut reader = StringReader::new("0.5");
        assert!((ArgumentType::<()>::parse(&arg, &mut reader, &()).unwrap() - 0.5).abs() < f32::EPSILON);
    }
}
