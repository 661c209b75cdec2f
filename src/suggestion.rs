//! Completion suggestions and their merge algorithm (spec.md §4.5, §4.6).

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::range::StringRange;

/// A single completion candidate.
///
/// `int_value` is set for suggestions produced from an integer domain
/// (e.g. a gamerule's numeric value) — it's the "IntSuggestion" subtype
/// from spec.md §4.6, folded into one type rather than kept as a separate
/// struct so [`Suggestions::merge`] can hold one homogeneous list.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// The range of the input this suggestion would replace.
    pub range: StringRange,
    /// The replacement text.
    pub text: String,
    /// Optional human-readable annotation.
    pub tooltip: Option<String>,
    /// Present iff this suggestion was produced from an integer domain.
    pub int_value: Option<i64>,
}

impl Suggestion {
    /// A plain text suggestion with no tooltip.
    #[must_use]
    pub fn new(range: StringRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
            tooltip: None,
            int_value: None,
        }
    }

    /// An integer-valued suggestion; `text` is usually `value.to_string()`.
    #[must_use]
    pub fn integer(range: StringRange, value: i64) -> Self {
        Self {
            range,
            text: value.to_string(),
            tooltip: None,
            int_value: Some(value),
        }
    }

    /// Attaches a tooltip.
    #[must_use]
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Re-expresses this suggestion against a wider range, prepending and
    /// appending the surrounding characters of `input` it didn't cover
    /// before (spec.md §4.6 step 4).
    #[must_use]
    fn expand(&self, input: &str, range: StringRange) -> Self {
        if range == self.range {
            return self.clone();
        }
        let mut text = String::new();
        if range.start < self.range.start {
            text.push_str(&input[range.start..self.range.start]);
        }
        text.push_str(&self.text);
        if range.end > self.range.end {
            text.push_str(&input[self.range.end..range.end]);
        }
        Self {
            range,
            text,
            tooltip: self.tooltip.clone(),
            int_value: self.int_value,
        }
    }
}

/// Orders two suggestions: integers compare numerically against other
/// integers, but fall back to case-insensitive text comparison against
/// anything else or each other when at least one side is plain text.
fn compare(a: &Suggestion, b: &Suggestion) -> Ordering {
    match (a.int_value, b.int_value) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.text.to_lowercase().cmp(&b.text.to_lowercase()),
    }
}

/// A resolved set of suggestions sharing one replacement range.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestions {
    /// The range every suggestion in `list` replaces.
    pub range: StringRange,
    /// The suggestions, sorted stably by [`compare`].
    pub list: Vec<Suggestion>,
}

impl Suggestions {
    /// The canonical empty result: `range = [0, 0)`, no suggestions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            range: StringRange::at(0),
            list: Vec::new(),
        }
    }

    /// `true` if there are no suggestions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Merges several suggestion sets produced against the same `command`
    /// string into one, per spec.md §4.6.
    #[must_use]
    pub fn merge(command: &str, suggestions: &[Suggestions]) -> Self {
        let non_empty: Vec<&Suggestions> = suggestions.iter().filter(|s| !s.is_empty()).collect();
        if non_empty.is_empty() {
            return Self::empty();
        }
        if non_empty.len() == 1 {
            return (*non_empty[0]).clone();
        }

        let mut seen = HashSet::new();
        let mut all = Vec::new();
        for set in &non_empty {
            for s in &set.list {
                let key = (s.range, s.text.clone(), s.tooltip.clone());
                if seen.insert(key) {
                    all.push(s.clone());
                }
            }
        }

        let start = all.iter().map(|s| s.range.start).min().unwrap();
        let end = all.iter().map(|s| s.range.end).max().unwrap();
        let enclosing = StringRange::new(start, end);

        let mut expanded: Vec<Suggestion> =
            all.iter().map(|s| s.expand(command, enclosing)).collect();
        expanded.sort_by(compare);

        Self {
            range: enclosing,
            list: expanded,
        }
    }
}

/// Accumulates suggestions for one node during a suggestion walk.
///
/// Mirrors the input string (and its lowercased form, computed once) plus
/// the start offset of the token currently being completed.
#[derive(Debug, Clone)]
pub struct SuggestionsBuilder {
    input: String,
    input_lowercase: String,
    start: usize,
    result: Vec<Suggestion>,
}

impl SuggestionsBuilder {
    /// Creates a builder over `input` (truncated to the cursor already)
    /// whose candidates start replacing at `start`.
    #[must_use]
    pub fn new(input: impl Into<String>, start: usize) -> Self {
        let input = input.into();
        let input_lowercase = input.to_lowercase();
        Self {
            input,
            input_lowercase,
            start,
            result: Vec::new(),
        }
    }

    /// As [`Self::new`], but reuses an already-lowercased copy of `input`
    /// instead of recomputing it (the dispatcher lowercases the truncated
    /// input once per suggestion request, not once per node).
    #[must_use]
    pub fn new_with_lowercase(
        input: impl Into<String>,
        input_lowercase: impl Into<String>,
        start: usize,
    ) -> Self {
        Self {
            input: input.into(),
            input_lowercase: input_lowercase.into(),
            start,
            result: Vec::new(),
        }
    }

    /// Start offset of the token being completed.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// The remaining (not-yet-matched) portion of the input, from `start`
    /// to the end of the truncated input.
    #[must_use]
    pub fn remaining(&self) -> &str {
        &self.input[self.start.min(self.input.len())..]
    }

    /// As [`Self::remaining`], lowercased.
    #[must_use]
    pub fn remaining_lowercase(&self) -> &str {
        &self.input_lowercase[self.start.min(self.input_lowercase.len())..]
    }

    /// Adds a plain-text candidate replacing `[start, input.len())`.
    pub fn suggest(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if text != self.remaining() {
            self.result.push(Suggestion::new(
                StringRange::new(self.start, self.input.len()),
                text,
            ));
        }
        self
    }

    /// As [`Self::suggest`], with a tooltip.
    pub fn suggest_with_tooltip(
        &mut self,
        text: impl Into<String>,
        tooltip: impl Into<String>,
    ) -> &mut Self {
        let text = text.into();
        if text != self.remaining() {
            self.result.push(
                Suggestion::new(StringRange::new(self.start, self.input.len()), text)
                    .with_tooltip(tooltip),
            );
        }
        self
    }

    /// Adds an integer-valued candidate.
    pub fn suggest_integer(&mut self, value: i64) -> &mut Self {
        self.result.push(Suggestion::integer(
            StringRange::new(self.start, self.input.len()),
            value,
        ));
        self
    }

    /// Finalizes this builder into a [`Suggestions`] set, sorted.
    #[must_use]
    pub fn build(&self) -> Suggestions {
        let mut list = self.result.clone();
        list.sort_by(compare);
        Suggestions {
            range: StringRange::new(self.start, self.input.len()),
            list,
        }
    }

    /// A builder anchored at the same start but with an empty result.
    #[must_use]
    pub fn restart(&self) -> Self {
        Self::new_with_lowercase(self.input.clone(), self.input_lowercase.clone(), self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::{Suggestion, Suggestions, SuggestionsBuilder};
    use crate::range::StringRange;

    #[test]
    fn merge_expands_to_the_enclosing_range_and_sorts_case_insensitively() {
        let command = "f";
        let mut a = SuggestionsBuilder::new(command, 0);
        a.suggest("foo");
        let mut b = SuggestionsBuilder::new(command, 0);
        b.suggest("foobar");
        let mut c = SuggestionsBuilder::new(command, 0);
        c.suggest("Bar");

        let merged = Suggestions::merge(command, &[a.build(), b.build(), c.build()]);
        let texts: Vec<&str> = merged.list.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Bar", "foo", "foobar"]);
        assert_eq!(merged.range, StringRange::new(0, 1));
    }

    #[test]
    fn merge_of_empty_sets_is_the_canonical_empty() {
        let merged = Suggestions::merge("anything", &[Suggestions::empty(), Suggestions::empty()]);
        assert!(merged.is_empty());
        assert_eq!(merged.range, StringRange::at(0));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut b = SuggestionsBuilder::new("foo", 0);
        b.suggest("foobar");
        let once = Suggestions::merge("foo", &[b.build()]);
        let twice = Suggestions::merge("foo", &[once.clone()]);
        assert_eq!(once, twice);
    }

    #[test]
    fn int_suggestions_sort_numerically_against_each_other() {
        let range = StringRange::at(0);
        let mut list = vec![
            Suggestion::integer(range, 10),
            Suggestion::integer(range, 2),
            Suggestion::integer(range, 1),
        ];
        list.sort_by(super::compare);
        let values: Vec<i64> = list.iter().map(|s| s.int_value.unwrap()).collect();
        assert_eq!(values, vec![1, 2, 10]);
    }

    #[test]
    fn dont_suggest_the_text_already_fully_typed() {
        let mut b = SuggestionsBuilder::new("foo", 0);
        b.suggest("foo");
        assert!(b.build().is_empty());
    }
}
