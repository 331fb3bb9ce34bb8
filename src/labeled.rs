use crate::config::EvalConfig;
use crate::fmeasure::{count_true_positives, FMeasure, ScoreAccumulator};
use crate::metrics::ComputationError;
use crate::reporter::Reporter;
use crate::span::Span;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Accumulator keeping one `FMeasure` per span type. Spans of different types never match, so the
/// merge of every label gives the same counters as a plain `FMeasure` fed with the same samples.
/// Untyped spans are accumulated under the `None` label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledFMeasure {
    labels: BTreeMap<Option<String>, FMeasure>,
}

impl LabeledFMeasure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_scores(&mut self, references: &[Span], predictions: &[Span]) {
        let references_by_label = references
            .iter()
            .map(|s| (s.span_type(), s))
            .into_group_map();
        let predictions_by_label = predictions
            .iter()
            .map(|s| (s.span_type(), s))
            .into_group_map();
        let no_spans = Vec::new();
        for label in references_by_label
            .keys()
            .chain(predictions_by_label.keys())
            .unique()
        {
            let label_references = references_by_label.get(label).unwrap_or(&no_spans);
            let label_predictions = predictions_by_label.get(label).unwrap_or(&no_spans);
            let matched = count_true_positives(
                label_references.iter().copied(),
                label_predictions.iter().copied(),
            );
            self.labels
                .entry(label.map(String::from))
                .or_default()
                .record(matched, label_predictions.len(), label_references.len());
        }
    }

    /// Statistics of a single label. Returns `None` if no span of this type was ever seen.
    pub fn get(&self, label: Option<&str>) -> Option<&FMeasure> {
        self.labels.get(&label.map(String::from))
    }

    /// Iterates over the labels in ascending order, the untyped spans first.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &FMeasure)> {
        self.labels.iter().map(|(l, f)| (l.as_deref(), f))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Merges the statistics of every label.
    pub fn overall(&self) -> FMeasure {
        self.labels.values().sum()
    }
}

impl ScoreAccumulator for LabeledFMeasure {
    fn update_scores(&mut self, references: &[Span], predictions: &[Span]) {
        LabeledFMeasure::update_scores(self, references, predictions)
    }
    fn overall(&self) -> FMeasure {
        LabeledFMeasure::overall(self)
    }
    fn report(&self, config: &EvalConfig) -> Result<Reporter, ComputationError> {
        Reporter::from_labels(self.iter(), config)
    }
}
