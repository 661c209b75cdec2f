//! The three string argument flavours (spec.md §3): a single unquoted
//! word, a quoted-or-unquoted phrase, and a greedy slice to end of input.

use crate::arguments::{ArgumentParseError, ArgumentType};
use crate::context::CommandContext;
use crate::reader::StringReader;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// A single unquoted word: `[A-Za-z0-9_.+-]*`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordArgumentType;

impl<S> ArgumentType<S> for WordArgumentType {
    type Output = String;

    fn parse(&self, reader: &mut StringReader, _source: &S) -> Result<String, ArgumentParseError> {
        Ok(reader.read_unquoted_string().to_owned())
    }

    fn examples(&self) -> Vec<String> {
        vec!["word".to_owned(), "words_with_underscores".to_owned()]
    }

    fn list_suggestions(
        &self,
        _context: &CommandContext<S>,
        builder: &mut SuggestionsBuilder,
    ) -> Suggestions {
        builder.build()
    }
}

/// A quoted-or-unquoted phrase: reads a quoted string if the next
/// character is a quote, otherwise a single unquoted word.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringArgumentType;

impl<S> ArgumentType<S> for StringArgumentType {
    type Output = String;

    fn parse(&self, reader: &mut StringReader, _source: &S) -> Result<String, ArgumentParseError> {
        Ok(reader.read_string()?)
    }

    fn examples(&self) -> Vec<String> {
        vec![
            "word".to_owned(),
            "\"quoted phrase\"".to_owned(),
            "\"\"".to_owned(),
            "\"quoted phrase with \\\"escaped\\\" quotes\"".to_owned(),
        ]
    }

    fn list_suggestions(
        &self,
        _context: &CommandContext<S>,
        builder: &mut SuggestionsBuilder,
    ) -> Suggestions {
        builder.build()
    }
}

impl StringArgumentType {
    /// Re-quotes `value` the way this argument type would need it
    /// written if it contained spaces or quote characters. Used by host
    /// applications constructing example input, not by parsing itself.
    #[must_use]
    pub fn escape_if_required(value: &str) -> String {
        if value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
        {
            return value.to_owned();
        }
        let mut out = String::with_capacity(value.len() + 2);
        out.push('"');
        for c in value.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
        out
    }
}

/// Consumes the rest of the input verbatim, including any spaces or
/// quote characters — quoted parsing is not invoked.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyStringArgumentType;

impl<S> ArgumentType<S> for GreedyStringArgumentType {
    type Output = String;

    fn parse(&self, reader: &mut StringReader, _source: &S) -> Result<String, ArgumentParseError> {
        let text = reader.remaining().to_owned();
        reader.set_cursor(reader.total_length());
        Ok(text)
    }

    fn examples(&self) -> Vec<String> {
        vec!["word".to_owned(), "words with spaces".to_owned()]
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
    use super::{GreedyStringArgumentType, StringArgumentType, WordArgumentType};
    use crate::arguments::ArgumentType;
    use crate::reader::StringReader;

    #[test]
    fn word_stops_at_a_space() {
        let mut reader = StringReader::new("hello world");
        let value = ArgumentType::<()>::parse(&WordArgumentType, &mut reader, &()).unwrap();
        assert_eq!(value, "hello");
        assert_eq!(reader.remaining(), " world");
    }

    #[test]
    fn string_reads_quoted_when_quoted() {
        let mut reader = StringReader::new(r#""a\"b" rest"#);
        let value = ArgumentType::<()>::parse(&StringArgumentType, &mut reader, &()).unwrap();
        assert_eq!(value, "a\"b");
        assert_eq!(reader.remaining(), " rest");
    }

    #[test]
    fn greedy_consumes_everything_raw() {
        let mut reader = StringReader::new(r#""a\"b""#);
        let value = ArgumentType::<()>::parse(&GreedyStringArgumentType, &mut reader, &()).unwrap();
        assert_eq!(value, r#""a\"b""#);
        assert!(!reader.can_read());
    }
}
