//! The input cursor (spec.md §4.1): a positional reader over an input
//! string plus the primitive tokenisers every built-in argument type is
//! built from.

use crate::errors::{BuiltInError, CommandSyntaxError};

const UNQUOTED_ALLOWED: fn(char) -> bool =
    |c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+');

/// Owns an input string and a cursor index into it.
///
/// Every tokeniser on this type follows one contract (spec.md §4.1): it
/// either advances the cursor past the consumed prefix and returns a
/// value, or fails with the cursor restored to its pre-call position.
/// This is what lets the dispatcher give every sibling branch its own
/// clone and know failures never bleed across branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringReader {
    string: String,
    cursor: usize,
}

impl StringReader {
    /// Creates a reader positioned at the start of `string`.
    #[must_use]
    pub fn new(string: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            cursor: 0,
        }
    }

    /// The full input string, irrespective of cursor position.
    #[must_use]
    pub fn string(&self) -> &str {
        &self.string
    }

    /// Current cursor offset.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sets the cursor directly. Used to rewind after a failed tokeniser.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    /// Total length of the input in bytes.
    #[must_use]
    pub fn total_length(&self) -> usize {
        self.string.len()
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &str {
        &self.string[self.cursor..]
    }

    /// Bytes already consumed.
    #[must_use]
    pub fn consumed(&self) -> &str {
        &self.string[..self.cursor]
    }

    /// `true` if at least one more byte can be read.
    #[must_use]
    pub fn can_read(&self) -> bool {
        self.can_read_length(1)
    }

    /// `true` if at least `length` more bytes can be read.
    #[must_use]
    pub fn can_read_length(&self, length: usize) -> bool {
        self.cursor + length <= self.string.len()
    }

    /// Reads the char at the cursor without consuming it.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at or past the end of input.
    #[must_use]
    pub fn peek(&self) -> char {
        self.peek_at(0)
    }

    /// Reads the char `offset` bytes past the cursor without consuming it.
    ///
    /// # Panics
    ///
    /// Panics if `cursor + offset` is at or past the end of input.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> char {
        self.string[self.cursor + offset..].chars().next().unwrap()
    }

    /// Reads one char and advances the cursor past it.
    ///
    /// # Panics
    ///
    /// Panics if there is nothing left to read.
    pub fn read(&mut self) -> char {
        let c = self.peek();
        self.cursor += c.len_utf8();
        c
    }

    /// Advances the cursor past one char without returning it.
    pub fn skip(&mut self) {
        self.cursor += self.peek().len_utf8();
    }

    /// Consumes whitespace (spaces) at the cursor.
    pub fn skip_whitespace(&mut self) {
        while self.can_read() && self.peek() == ' ' {
            self.skip();
        }
    }

    /// Requires the next char to equal `c`.
    pub fn expect(&mut self, c: char) -> Result<(), CommandSyntaxError> {
        if !self.can_read() || self.peek() != c {
            return Err(CommandSyntaxError::with_context(
                BuiltInError::ReaderExpectedSymbol { symbol: c },
                self,
            ));
        }
        self.skip();
        Ok(())
    }

    /// Consumes the longest run of `[0-9.-]` starting at the cursor.
    fn read_number_body(&mut self) -> &str {
        let start = self.cursor;
        while self.can_read() && matches!(self.peek(), '0'..='9' | '.' | '-') {
            self.skip();
        }
        &self.string[start..self.cursor]
    }

    /// Reads an `i32`, rewinding on any failure.
    pub fn read_int(&mut self) -> Result<i32, CommandSyntaxError> {
        let start = self.cursor;
        let token = self.read_number_body().to_owned();
        if token.is_empty() {
            self.cursor = start;
            return Err(CommandSyntaxError::with_context(
                BuiltInError::ReaderExpectedInt,
                self,
            ));
        }
        token.parse().map_err(|_| {
            self.cursor = start;
            CommandSyntaxError::with_context(
                BuiltInError::ReaderInvalidInt { token },
                self,
            )
        })
    }

    /// Reads an `i64`, rewinding on any failure.
    pub fn read_long(&mut self) -> Result<i64, CommandSyntaxError> {
        let start = self.cursor;
        let token = self.read_number_body().to_owned();
        if token.is_empty() {
            self.cursor = start;
            return Err(CommandSyntaxError::with_context(
                BuiltInError::ReaderExpectedLong,
                self,
            ));
        }
        token.parse().map_err(|_| {
            self.cursor = start;
            CommandSyntaxError::with_context(
                BuiltInError::ReaderInvalidLong { token },
                self,
            )
        })
    }

    /// Reads an `f32`, rewinding on any failure.
    pub fn read_float(&mut self) -> Result<f32, CommandSyntaxError> {
        let start = self.cursor;
        let token = self.read_number_body().to_owned();
        if token.is_empty() {
            self.cursor = start;
            return Err(CommandSyntaxError::with_context(
                BuiltInError::ReaderExpectedFloat,
                self,
            ));
        }
        token.parse().map_err(|_| {
            self.cursor = start;
            CommandSyntaxError::with_context(
                BuiltInError::ReaderInvalidFloat { token },
                self,
            )
        })
    }

    /// Reads an `f64`, rewinding on any failure.
    pub fn read_double(&mut self) -> Result<f64, CommandSyntaxError> {
        let start = self.cursor;
        let token = self.read_number_body().to_owned();
        if token.is_empty() {
            self.cursor = start;
            return Err(CommandSyntaxError::with_context(
                BuiltInError::ReaderExpectedDouble,
                self,
            ));
        }
        token.parse().map_err(|_| {
            self.cursor = start;
            CommandSyntaxError::with_context(
                BuiltInError::ReaderInvalidDouble { token },
                self,
            )
        })
    }

    /// Consumes the longest run of `[A-Za-z0-9_.+-]`. May return an empty
    /// string; this tokeniser never fails.
    pub fn read_unquoted_string(&mut self) -> &str {
        let start = self.cursor;
        while self.can_read() && UNQUOTED_ALLOWED(self.peek()) {
            self.skip();
        }
        &self.string[start..self.cursor]
    }

    /// Reads a quoted string. The terminator is whichever of `"`/`'`
    /// opened it. `\\` escapes only the quote char and itself.
    pub fn read_quoted_string(&mut self) -> Result<String, CommandSyntaxError> {
        if !self.can_read() {
            return Ok(String::new());
        }
        let start = self.cursor;
        let quote = self.peek();
        if quote != '"' && quote != '\'' {
            return Err(CommandSyntaxError::with_context(
                BuiltInError::ReaderExpectedStartOfQuote,
                self,
            ));
        }
        self.skip();

        let mut result = String::new();
        let mut escaped = false;
        loop {
            if !self.can_read() {
                self.cursor = start;
                return Err(CommandSyntaxError::with_context(
                    BuiltInError::ReaderExpectedEndOfQuote,
                    self,
                ));
            }
            let c = self.read();
            if escaped {
                if c == quote || c == '\\' {
                    result.push(c);
                    escaped = false;
                } else {
                    self.cursor = start;
                    return Err(CommandSyntaxError::with_context(
                        BuiltInError::ReaderInvalidEscape { character: c },
                        self,
                    ));
                }
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                return Ok(result);
            } else {
                result.push(c);
            }
        }
    }

    /// Polymorphic string read: quoted if the next char is a quote,
    /// unquoted otherwise.
    pub fn read_string(&mut self) -> Result<String, CommandSyntaxError> {
        if self.can_read() && matches!(self.peek(), '"' | '\'') {
            self.read_quoted_string()
        } else {
            Ok(self.read_unquoted_string().to_owned())
        }
    }

    /// Reads a string and requires it to be exactly `true` or `false`.
    pub fn read_bool(&mut self) -> Result<bool, CommandSyntaxError> {
        let start = self.cursor;
        if !self.can_read() {
            return Err(CommandSyntaxError::with_context(
                BuiltInError::ReaderExpectedBool,
                self,
            ));
        }
        let token = self.read_string()?;
        if token.is_empty() {
            self.cursor = start;
            return Err(CommandSyntaxError::with_context(
                BuiltInError::ReaderExpectedBool,
                self,
            ));
        }
        match token.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => {
                self.cursor = start;
                Err(CommandSyntaxError::with_context(
                    BuiltInError::ReaderInvalidBool { token },
                    self,
                ))
            }
        }
    }
}

impl From<&str> for StringReader {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StringReader {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::StringReader;
    use crate::errors::BuiltInError;

    #[test]
    fn read_int_rewinds_on_empty_body() {
        let mut r = StringReader::new("abc");
        let before = r.cursor();
        let err = r.read_int().unwrap_err();
        assert_eq!(err.kind, BuiltInError::ReaderExpectedInt);
        assert_eq!(r.cursor(), before);
    }

    #[test]
    fn read_int_rewinds_on_unparseable_body() {
        let mut r = StringReader::new("1.2.3 rest");
        let before = r.cursor();
        let err = r.read_int().unwrap_err();
        assert!(matches!(err.kind, BuiltInError::ReaderInvalidInt { .. }));
        assert_eq!(r.cursor(), before);
    }

    #[test]
    fn read_int_consumes_a_valid_body() {
        let mut r = StringReader::new("-42 rest");
        assert_eq!(r.read_int().unwrap(), -42);
        assert_eq!(r.remaining(), " rest");
    }

    #[test]
    fn quoted_string_handles_escapes() {
        let mut r = StringReader::new(r#""a\"b" rest"#);
        assert_eq!(r.read_quoted_string().unwrap(), "a\"b");
        assert_eq!(r.remaining(), " rest");
    }

    #[test]
    fn quoted_string_rejects_bad_escape() {
        let mut r = StringReader::new(r#""a\nb""#);
        let before = r.cursor();
        let err = r.read_quoted_string().unwrap_err();
        assert!(matches!(err.kind, BuiltInError::ReaderInvalidEscape { character: 'n' }));
        assert_eq!(r.cursor(), before);
    }

    #[test]
    fn quoted_string_rejects_missing_terminator() {
        let mut r = StringReader::new(r#""unterminated"#);
        let err = r.read_quoted_string().unwrap_err();
        assert_eq!(err.kind, BuiltInError::ReaderExpectedEndOfQuote);
    }

    #[test]
    fn bool_rewinds_on_garbage() {
        let mut r = StringReader::new("maybe");
        let before = r.cursor();
        let err = r.read_bool().unwrap_err();
        assert!(matches!(err.kind, BuiltInError::ReaderInvalidBool { .. }));
        assert_eq!(r.cursor(), before);
    }

    #[test]
    fn unquoted_string_may_be_empty() {
        let mut r = StringReader::new(" rest");
        assert_eq!(r.read_unquoted_string(), "");
    }
}
