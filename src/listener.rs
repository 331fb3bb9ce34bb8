/*!
Observers of the evaluation. A listener is told about every sample whose predicted spans differ
from its reference spans. Listeners never influence the scores.
*/
use crate::sample::Sample;
use std::fmt::Debug;
use thiserror::Error;
use tracing::info;

/// Failure reported by a mismatch listener. What the evaluator does with it is decided by the
/// `ListenerPolicy` of its config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mismatch listener failed: {0}")]
pub struct ListenerError(String);

impl ListenerError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        ListenerError(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Receives the samples the model got wrong. `reference` is the sample as it was given to the
/// evaluator and `predicted` carries the same input with the spans returned by the model.
///
/// Any `FnMut(&Sample<I>, &Sample<I>)` closure is a listener that never fails.
///
/// ```rust
/// use spaneval::{Evaluator, Sample, Span};
///
/// let mut count = 0;
/// let model = |_: &String| Ok::<_, std::convert::Infallible>(vec![Span::new(0, 3)]);
/// let listener = |_: &Sample<String>, _: &Sample<String>| count += 1;
/// let mut evaluator = Evaluator::with_listener(model, listener);
/// evaluator
///     .evaluate_sample(&Sample::new(String::from("abcdef"), vec![Span::new(0, 6)]))
///     .unwrap();
/// drop(evaluator);
/// assert_eq!(1, count);
/// ```
pub trait MisclassifiedSampleListener<I> {
    fn misclassified(
        &mut self,
        reference: &Sample<I>,
        predicted: &Sample<I>,
    ) -> Result<(), ListenerError>;
}

impl<I, F> MisclassifiedSampleListener<I> for F
where
    F: FnMut(&Sample<I>, &Sample<I>),
{
    fn misclassified(
        &mut self,
        reference: &Sample<I>,
        predicted: &Sample<I>,
    ) -> Result<(), ListenerError> {
        self(reference, predicted);
        Ok(())
    }
}

/// Listener type of an evaluator built without a listener. It can't be instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoListener {}

impl<I> MisclassifiedSampleListener<I> for NoListener {
    fn misclassified(&mut self, _: &Sample<I>, _: &Sample<I>) -> Result<(), ListenerError> {
        match *self {}
    }
}

/// Keeps every mismatched `(reference, predicted)` pair, in the order they were reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchCollector<I> {
    mismatches: Vec<(Sample<I>, Sample<I>)>,
}

impl<I> Default for MismatchCollector<I> {
    fn default() -> Self {
        MismatchCollector {
            mismatches: Vec::new(),
        }
    }
}

impl<I> MismatchCollector<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mismatches(&self) -> &[(Sample<I>, Sample<I>)] {
        &self.mismatches
    }

    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn into_mismatches(self) -> Vec<(Sample<I>, Sample<I>)> {
        self.mismatches
    }
}

impl<I: Clone> MisclassifiedSampleListener<I> for MismatchCollector<I> {
    fn misclassified(
        &mut self,
        reference: &Sample<I>,
        predicted: &Sample<I>,
    ) -> Result<(), ListenerError> {
        self.mismatches.push((reference.clone(), predicted.clone()));
        Ok(())
    }
}

/// Logs every mismatch at the `info` level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingListener;

impl<I: Debug> MisclassifiedSampleListener<I> for TracingListener {
    fn misclassified(
        &mut self,
        reference: &Sample<I>,
        predicted: &Sample<I>,
    ) -> Result<(), ListenerError> {
        info!(
            input = ?reference.input(),
            references = ?reference.references(),
            predictions = ?predicted.references(),
            "misclassified sample"
        );
        Ok(())
    }
}
