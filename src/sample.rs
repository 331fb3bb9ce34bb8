use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A sample is an input paired with its gold-standard (reference) spans. The input is generic: it
/// can be a document, a list of tokens or anything the model knows how to read.
///
/// Two samples are equal if their inputs are equal and their references are equal as *ordered*
/// sequences. The same spans in a different order make a different sample.
#[derive(Debug, Hash, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample<I> {
    input: I,
    references: Vec<Span>,
}

impl<I> Sample<I> {
    pub fn new(input: I, references: Vec<Span>) -> Self {
        Sample { input, references }
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn references(&self) -> &[Span] {
        &self.references
    }

    pub fn into_parts(self) -> (I, Vec<Span>) {
        (self.input, self.references)
    }
}

impl<I: AsRef<str>> Sample<I> {
    /// Iterates over the text covered by each reference span, in order. Spans which can't be
    /// resolved against the input yield `None`.
    pub fn covered_texts(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        let text = self.input.as_ref();
        self.references.iter().map(move |s| s.covered_text(text))
    }
}

impl<I: Display> Display for Sample<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.input)?;
        for span in self.references.iter() {
            write!(f, "\n{}", span)?;
        }
        Ok(())
    }
}
