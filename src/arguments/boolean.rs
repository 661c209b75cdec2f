//! A boolean argument: exactly `true` or `false`.

use crate::arguments::{ArgumentParseError, ArgumentType};
use crate::context::CommandContext;
use crate::reader::StringReader;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// Parses `true` or `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolArgumentType;

impl<S> ArgumentType<S> for BoolArgumentType {
    type Output = bool;

    fn parse(&self, reader: &mut StringReader, _source: &S) -> Result<bool, ArgumentParseError> {
        Ok(reader.read_bool()?)
    }

    fn examples(&self) -> Vec<String> {
        vec!["true".to_owned(), "false".to_owned()]
    }

    fn list_suggestions(
        &self,
        _context: &CommandContext<S>,
        builder: &mut SuggestionsBuilder,
    ) -> Suggestions {
        let remaining = builder.remaining_lowercase().to_owned();
        if "true".starts_with(&remaining) {
            builder.suggest("true");
        }
        if "false".starts_with(&remaining) {
            builder.suggest("false");
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::BoolArgumentType;
    use crate::arguments::{ArgumentParseError, ArgumentType};
    use crate::errors::BuiltInError;
    use crate::reader::StringReader;

    #[test]
    fn parses_true_and_false() {
        let arg = BoolArgumentType;
        let mut reader = StringReader::new("true");
        assert!(ArgumentType::<()>::parse(&arg, &mut reader, &()).unwrap());
        let mut reader = StringReader::new("false");
        assert!(!ArgumentType::<()>::parse(&arg, &mut reader, &()).unwrap());
    }

    #[test]
    fn rejects_garbage_and_rewinds() {
        let arg = BoolArgumentType;
        let mut reader = StringReader::new("maybe");
        let before = reader.cursor();
        let err = ArgumentType::<()>::parse(&arg, &mut reader, &()).unwrap_err();
        let ArgumentParseError::Syntax(err) = err else {
            unreachable!("reader primitives only raise syntax errors")
        };
        assert!(matches!(err.kind, BuiltInError::ReaderInvalidBool { .. }));
        assert_eq!(reader.cursor(), before);
    }
}
