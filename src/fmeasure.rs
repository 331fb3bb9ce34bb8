/*!
Corpus-level accumulation of span matches. The `FMeasure` only keeps three counters, so samples can
be streamed through it one at a time without keeping any of them around.
*/
use crate::config::EvalConfig;
use crate::metrics::{fbeta, prf_divide, ComputationError, DivByZeroStrat, DivisionByZeroError, FloatExt};
use crate::reporter::Reporter;
use crate::span::Span;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Something that consumes the `(references, predictions)` pair of each evaluated sample and can
/// summarize what it has seen so far. The `Evaluator` is generic over it.
pub trait ScoreAccumulator {
    /// Adds the spans of a single sample to the statistics.
    fn update_scores(&mut self, references: &[Span], predictions: &[Span]);
    /// Corpus-level counters over everything accumulated so far.
    fn overall(&self) -> FMeasure;
    /// Builds a report out of the current statistics.
    fn report(&self, config: &EvalConfig) -> Result<Reporter, ComputationError>;
}

/// Counts the spans present in both `references` and `predictions`. Both sides are treated as
/// multisets: a reference can be matched by at most one prediction and duplicated spans are counted
/// separately. The order of the spans is irrelevant. Malformed spans (`start > end`) never match.
///
/// ```rust
/// use spaneval::{count_true_positives, Span};
///
/// let references = [Span::new(0, 5), Span::new(0, 5)];
/// let predictions = [Span::new(0, 5)];
/// assert_eq!(1, count_true_positives(&references, &predictions));
/// ```
pub fn count_true_positives<'a, R, P>(references: R, predictions: P) -> usize
where
    R: IntoIterator<Item = &'a Span>,
    P: IntoIterator<Item = &'a Span>,
{
    let references = references.into_iter();
    let mut remaining: AHashMap<&Span, usize> = AHashMap::with_capacity(references.size_hint().0);
    for reference in references.filter(|s| s.is_well_formed()) {
        *remaining.entry(reference).or_insert(0) += 1;
    }
    predictions
        .into_iter()
        .filter(|prediction| match remaining.get_mut(prediction) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
        .count()
}

/// Running precision, recall and F-measure over every sample seen so far.
///
/// The accumulator holds the number of matched spans (true positives), the number of predicted
/// spans and the number of reference spans. There is no way to remove the contribution of a
/// sample. Independent accumulators (e.g. one per thread) can be merged with `merge` or `+`.
///
/// ```rust
/// use spaneval::{FMeasure, Span};
///
/// let mut fmeasure = FMeasure::new();
/// fmeasure.update_scores(
///     &[Span::new(0, 10), Span::new(10, 25)],
///     &[Span::new(0, 10), Span::new(10, 20), Span::new(20, 25)],
/// );
/// assert_eq!(1.0 / 3.0, fmeasure.precision());
/// assert_eq!(0.5, fmeasure.recall());
/// assert!((fmeasure.f1() - 0.4).abs() < 1e-12);
/// ```
#[derive(Debug, Hash, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FMeasure {
    matched: usize,
    predicted_total: usize,
    reference_total: usize,
}

impl FMeasure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single sample to the counters. Empty inputs are valid and leave the scores
    /// unchanged.
    pub fn update_scores(&mut self, references: &[Span], predictions: &[Span]) {
        let matched = count_true_positives(references, predictions);
        self.record(matched, predictions.len(), references.len());
    }

    pub(crate) fn record(&mut self, matched: usize, predicted: usize, references: usize) {
        self.matched += matched;
        self.predicted_total += predicted;
        self.reference_total += references;
    }

    /// Number of true positives.
    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn predicted_total(&self) -> usize {
        self.predicted_total
    }

    pub fn reference_total(&self) -> usize {
        self.reference_total
    }

    /// Fraction of the predicted spans which are correct. Returns 1.0 if nothing was predicted.
    pub fn precision(&self) -> f64 {
        self.precision_with(DivByZeroStrat::ReplaceBy1)
            .unwrap_or(1.0)
    }

    /// Fraction of the reference spans which were predicted. Returns 1.0 if there was nothing to
    /// predict.
    pub fn recall(&self) -> f64 {
        self.recall_with(DivByZeroStrat::ReplaceBy1).unwrap_or(1.0)
    }

    /// Harmonic mean of the precision and the recall. Returns 0.0 if both are 0.
    pub fn f1(&self) -> f64 {
        fbeta(self.precision(), self.recall(), 1.0).unwrap_or(0.0)
    }

    pub fn precision_with(&self, zero_division: DivByZeroStrat) -> Result<f64, DivisionByZeroError> {
        prf_divide(self.matched, self.predicted_total, zero_division)
    }

    pub fn recall_with(&self, zero_division: DivByZeroStrat) -> Result<f64, DivisionByZeroError> {
        prf_divide(self.matched, self.reference_total, zero_division)
    }

    /// F-beta score, using the sentinel precision and recall of 1.0 on empty denominators.
    pub fn fscore<F: FloatExt>(&self, beta: F) -> Result<f64, ComputationError> {
        self.fscore_with(beta, DivByZeroStrat::ReplaceBy1)
    }

    pub fn fscore_with<F: FloatExt>(
        &self,
        beta: F,
        zero_division: DivByZeroStrat,
    ) -> Result<f64, ComputationError> {
        let precision = self.precision_with(zero_division)?;
        let recall = self.recall_with(zero_division)?;
        fbeta(precision, recall, beta)
    }

    /// Adds the counters of `other` to this accumulator.
    pub fn merge(&mut self, other: &FMeasure) {
        self.record(other.matched, other.predicted_total, other.reference_total);
    }
}

impl ScoreAccumulator for FMeasure {
    fn update_scores(&mut self, references: &[Span], predictions: &[Span]) {
        FMeasure::update_scores(self, references, predictions)
    }
    fn overall(&self) -> FMeasure {
        *self
    }
    fn report(&self, config: &EvalConfig) -> Result<Reporter, ComputationError> {
        Reporter::from_overall(self, config)
    }
}

impl Add for FMeasure {
    type Output = FMeasure;
    fn add(mut self, rhs: Self) -> Self::Output {
        self.merge(&rhs);
        self
    }
}

impl AddAssign for FMeasure {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs)
    }
}

impl Sum for FMeasure {
    fn sum<T: Iterator<Item = Self>>(iter: T) -> Self {
        iter.fold(FMeasure::default(), Add::add)
    }
}

impl<'a> Sum<&'a FMeasure> for FMeasure {
    fn sum<T: Iterator<Item = &'a FMeasure>>(iter: T) -> Self {
        iter.fold(FMeasure::default(), |acc, f| acc + *f)
    }
}

impl Display for FMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Precision: {}\nRecall: {}\nF-Measure: {}",
            self.precision(),
            self.recall(),
            self.f1()
        )
    }
}
