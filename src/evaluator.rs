/*!
The evaluator drives a model over a stream of samples. For each sample it asks the model for its
spans, feeds the `(references, predictions)` pair to a `ScoreAccumulator` and, if a listener was
registered, reports the samples where the predictions differ from the references.
*/
use crate::config::{EvalConfig, ListenerPolicy};
use crate::fmeasure::{FMeasure, ScoreAccumulator};
use crate::listener::{ListenerError, MisclassifiedSampleListener, NoListener};
use crate::metrics::ComputationError;
use crate::reporter::Reporter;
use crate::sample::Sample;
use crate::span::Span;
use std::borrow::Borrow;
use std::error::Error;
use std::marker::PhantomData;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// A model able to find the spans of an input. Any `Fn(&I) -> Result<Vec<Span>, E>` closure is a
/// `SpanDetector`. Models which can't fail can use `std::convert::Infallible` as their error.
pub trait SpanDetector<I> {
    type Error: Error + 'static;
    /// Returns the spans found in `input`, in the order the model produced them.
    fn detect(&self, input: &I) -> Result<Vec<Span>, Self::Error>;
}

impl<I, E, F> SpanDetector<I> for F
where
    F: Fn(&I) -> Result<Vec<Span>, E>,
    E: Error + 'static,
{
    type Error = E;
    fn detect(&self, input: &I) -> Result<Vec<Span>, E> {
        self(input)
    }
}

/// Failures of an evaluation. `E` is the error type of the model.
#[derive(Debug, Error)]
pub enum EvaluationError<E: Error + 'static> {
    /// The model failed on a sample. The failing sample did not reach the accumulator.
    #[error("model invocation failed: {0}")]
    Model(#[source] E),
    /// The listener failed and the evaluator was configured with `ListenerPolicy::Abort`. The
    /// failing sample is already part of the scores.
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Streaming evaluator of a `SpanDetector`.
///
/// * `I` is the input type of the samples,
/// * `M` is the model,
/// * `L` is the mismatch listener. Evaluators built with `Evaluator::new` use `NoListener`.
/// * `A` is the accumulator. It defaults to the corpus-level `FMeasure`.
///
/// The evaluator only keeps the accumulated statistics: samples are dropped (or given back to
/// the caller) as soon as they are evaluated. Scores can be queried at any point.
///
/// ```rust
/// use spaneval::{Evaluator, Sample, Span};
/// use std::convert::Infallible;
///
/// // Splits on every '.', keeping the dot in the sentence.
/// let model = |text: &String| -> Result<Vec<Span>, Infallible> {
///     let mut spans = Vec::new();
///     let mut start = 0;
///     for (i, _) in text.match_indices('.') {
///         spans.push(Span::new(start, i + 1));
///         start = i + 2;
///     }
///     Ok(spans)
/// };
/// let mut evaluator = Evaluator::new(model);
/// let samples = vec![
///     Sample::new(String::from("Hi. Bye."), vec![Span::new(0, 3), Span::new(4, 8)]),
///     Sample::new(String::from("Dr. Who."), vec![Span::new(0, 8)]),
/// ];
/// assert_eq!(2, evaluator.evaluate_all(&samples).unwrap());
///
/// let fmeasure = evaluator.fmeasure();
/// assert_eq!(2, fmeasure.matched());
/// assert_eq!(4, fmeasure.predicted_total());
/// assert_eq!(3, fmeasure.reference_total());
/// ```
pub struct Evaluator<I, M, L = NoListener, A = FMeasure> {
    model: M,
    listener: Option<L>,
    accumulator: A,
    config: EvalConfig,
    _input: PhantomData<fn(&I)>,
}

impl<I, M> Evaluator<I, M>
where
    M: SpanDetector<I>,
{
    /// Evaluator without mismatch listener, accumulating into an `FMeasure`.
    pub fn new(model: M) -> Self {
        EvaluatorBuilder::new(model).build()
    }
}

impl<I, M, L> Evaluator<I, M, L>
where
    M: SpanDetector<I>,
    L: MisclassifiedSampleListener<I>,
{
    /// Evaluator reporting every mismatched sample to `listener`.
    pub fn with_listener(model: M, listener: L) -> Self {
        EvaluatorBuilder::new(model).listener(listener).build()
    }
}

impl<I, M, L, A> Evaluator<I, M, L, A>
where
    M: SpanDetector<I>,
    L: MisclassifiedSampleListener<I>,
    A: ScoreAccumulator,
{
    /// Evaluates a single sample.
    ///
    /// The model is called on the input of the sample. If a listener is registered and the
    /// predicted spans are not equal to the references (as ordered sequences), the listener
    /// receives the sample and a copy of it holding the predictions. Without listener, the spans
    /// are only scored. The accumulator is then updated, whatever the listener returned.
    ///
    /// A model error is returned as is and leaves the scores untouched. A listener error is logged
    /// and ignored with `ListenerPolicy::Isolate` and returned with `ListenerPolicy::Abort`.
    pub fn evaluate_sample(&mut self, sample: &Sample<I>) -> Result<(), EvaluationError<M::Error>>
    where
        I: Clone,
    {
        let mut predictions = self
            .model
            .detect(sample.input())
            .map_err(EvaluationError::Model)?;
        debug!(
            references = sample.references().len(),
            predictions = predictions.len(),
            "evaluating sample"
        );

        let mut listener_outcome = Ok(());
        if let Some(listener) = self.listener.as_mut() {
            if predictions.as_slice() != sample.references() {
                trace!(references = ?sample.references(), predictions = ?predictions, "mismatch");
                let predicted = Sample::new(sample.input().clone(), predictions);
                listener_outcome = listener.misclassified(sample, &predicted);
                predictions = predicted.into_parts().1;
            }
        }

        self.accumulator
            .update_scores(sample.references(), &predictions);

        match (listener_outcome, self.config.listener_policy()) {
            (Ok(()), _) => Ok(()),
            (Err(error), ListenerPolicy::Isolate) => {
                warn!(%error, "ignoring the failure of the mismatch listener");
                Ok(())
            }
            (Err(error), ListenerPolicy::Abort) => Err(error.into()),
        }
    }

    /// Evaluates every sample in order and returns how many were evaluated. Samples can be given
    /// by value or by reference. The first error stops the evaluation: the samples evaluated
    /// before it stay in the scores.
    pub fn evaluate_all<S, B>(&mut self, samples: S) -> Result<usize, EvaluationError<M::Error>>
    where
        S: IntoIterator<Item = B>,
        B: Borrow<Sample<I>>,
        I: Clone,
    {
        let mut evaluated = 0;
        for sample in samples {
            self.evaluate_sample(sample.borrow())?;
            evaluated += 1;
        }
        let overall = self.accumulator.overall();
        info!(
            samples = evaluated,
            matched = overall.matched(),
            predicted = overall.predicted_total(),
            references = overall.reference_total(),
            precision = overall.precision(),
            recall = overall.recall(),
            f1 = overall.f1(),
            "evaluation done"
        );
        Ok(evaluated)
    }

    /// Builds a report of the scores accumulated so far, using the config of the evaluator.
    pub fn report(&self) -> Result<Reporter, ComputationError> {
        self.accumulator.report(&self.config)
    }
}

impl<I, M, L, A> Evaluator<I, M, L, A> {
    /// The live accumulator. Before the first sample, it holds the initial (empty) state.
    pub fn fmeasure(&self) -> &A {
        &self.accumulator
    }

    pub fn into_fmeasure(self) -> A {
        self.accumulator
    }

    pub fn listener(&self) -> Option<&L> {
        self.listener.as_ref()
    }

    pub fn into_listener(self) -> Option<L> {
        self.listener
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

/// This builder can be used to build and customize an `Evaluator`: its listener, its
/// accumulator and its config.
///
/// ```rust
/// use spaneval::{
///     EvalConfigBuilder, EvaluatorBuilder, LabeledFMeasure, ListenerPolicy, MismatchCollector,
///     Sample, Span,
/// };
/// use std::convert::Infallible;
///
/// let model = |_: &String| Ok::<_, Infallible>(vec![Span::with_type(0, 4, "PER")]);
/// let mut evaluator = EvaluatorBuilder::new(model)
///     .listener(MismatchCollector::new())
///     .accumulator(LabeledFMeasure::new())
///     .config(EvalConfigBuilder::default().listener_policy(ListenerPolicy::Abort).build())
///     .build();
/// evaluator
///     .evaluate_sample(&Sample::new(String::from("John"), vec![Span::with_type(0, 4, "LOC")]))
///     .unwrap();
///
/// assert_eq!(1, evaluator.listener().unwrap().len());
/// assert_eq!(0, evaluator.fmeasure().get(Some("PER")).unwrap().matched());
/// ```
pub struct EvaluatorBuilder<I, M, L = NoListener, A = FMeasure> {
    model: M,
    listener: Option<L>,
    accumulator: A,
    config: EvalConfig,
    _input: PhantomData<fn(&I)>,
}

impl<I, M> EvaluatorBuilder<I, M> {
    pub fn new(model: M) -> Self {
        EvaluatorBuilder {
            model,
            listener: None,
            accumulator: FMeasure::default(),
            config: EvalConfig::default(),
            _input: PhantomData,
        }
    }
}

impl<I, M, L, A> EvaluatorBuilder<I, M, L, A> {
    pub fn listener<N>(self, listener: N) -> EvaluatorBuilder<I, M, N, A>
    where
        N: MisclassifiedSampleListener<I>,
    {
        EvaluatorBuilder {
            model: self.model,
            listener: Some(listener),
            accumulator: self.accumulator,
            config: self.config,
            _input: PhantomData,
        }
    }

    pub fn accumulator<B>(self, accumulator: B) -> EvaluatorBuilder<I, M, L, B>
    where
        B: ScoreAccumulator,
    {
        EvaluatorBuilder {
            model: self.model,
            listener: self.listener,
            accumulator,
            config: self.config,
            _input: PhantomData,
        }
    }

    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Evaluator<I, M, L, A> {
        Evaluator {
            model: self.model,
            listener: self.listener,
            accumulator: self.accumulator,
            config: self.config,
            _input: PhantomData,
        }
    }
}
