use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A span is a half-open range `[start, end)` over an input sequence. It can optionally carry a
/// type label, such as `"sentence"`, `"PER"` or `"NP"`. Two spans are equal if their start, their
/// end and their label are equal. There is no partial credit for overlapping spans.
///
/// Spans are ordered by their start, then by their end and finally by their label. Untyped spans
/// come before typed spans sharing the same boundaries.
///
/// A span with `start > end` is malformed. It can be built and is never rejected, but it never
/// counts as a match during the evaluation, not even against an identical malformed span.
#[derive(Debug, Hash, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    start: usize,
    end: usize,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    span_type: Option<String>,
}

impl Span {
    /// Builds an untyped span.
    pub fn new(start: usize, end: usize) -> Self {
        Span {
            start,
            end,
            span_type: None,
        }
    }

    /// Builds a span tagged with `span_type`.
    pub fn with_type<S: Into<String>>(start: usize, end: usize, span_type: S) -> Self {
        Span {
            start,
            end,
            span_type: Some(span_type.into()),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span_type(&self) -> Option<&str> {
        self.span_type.as_deref()
    }

    /// Is `start <= end`? Malformed spans never match anything.
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// Length of the span. Malformed spans (`start > end`) have a length of 0.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Is `other` completely inside of this span? A span contains itself.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Is the `index` inside of `[start, end)`?
    pub fn contains_index(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// Do the two spans share at least one index, or does one contain the other?
    pub fn intersects(&self, other: &Span) -> bool {
        self.contains(other)
            || other.contains(self)
            || (self.start <= other.start && other.start < self.end)
            || (other.start <= self.start && self.start < other.end)
    }

    /// Do the two spans overlap without one of them containing the other?
    pub fn crosses(&self, other: &Span) -> bool {
        !self.contains(other)
            && !other.contains(self)
            && ((self.start <= other.start && other.start < self.end)
                || (other.start <= self.start && self.start < other.end))
    }

    /// Returns the text covered by the span, interpreting the boundaries as byte offsets. Returns
    /// `None` if the span is malformed, out of bounds or does not fall on char boundaries.
    pub fn covered_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.span_type {
            Some(span_type) => write!(f, "[{}..{}) {}", self.start, self.end, span_type),
            None => write!(f, "[{}..{})", self.start, self.end),
        }
    }
}

impl From<(usize, usize)> for Span {
    fn from(value: (usize, usize)) -> Self {
        Span::new(value.0, value.1)
    }
}
