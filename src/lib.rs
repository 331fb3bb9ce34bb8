/*!
This library evaluates sequence labelers, such as sentence detectors, tokenizers, named-entity
recognizers or chunkers, by comparing the spans they predict with gold-standard spans. Samples are
streamed through an `Evaluator` one at a time: only the counters of the `FMeasure` survive, so a
corpus never has to fit in memory.

# Terminology
* A span is a half-open range `[start, end)` over an input, optionally tagged with a type such as
    `PER` or `sentence`. Two spans match if their start, their end and their type are equal. There
    is no partial credit for overlapping spans.
* A sample is an input paired with its reference (gold-standard) spans.
* A model, or `SpanDetector`, returns the predicted spans of an input.
* A mismatch is a sample whose predicted spans are not exactly its reference spans, in the same
    order. Mismatches can be sent to a `MisclassifiedSampleListener` for inspection.

# Scores
Matching treats references and predictions as multisets: a reference span can be matched by a
single prediction, and the order of the spans does not matter. The precision is the fraction of the
predicted spans that match, the recall is the fraction of the reference spans that were predicted
and the F-measure is their harmonic mean. When nothing was predicted the precision is 1, and when
there was nothing to predict the recall is 1. This is a convention: no prediction means no false
positive and no reference means no false negative. `DivByZeroStrat` allows other conventions in
reports.

# Example
```rust
use spaneval::{Evaluator, MismatchCollector, Sample, Span};
use std::convert::Infallible;

let model = |text: &String| -> Result<Vec<Span>, Infallible> {
    Ok(vec![Span::new(0, text.len())])
};
let samples = vec![
    Sample::new(String::from("Hello there."), vec![Span::new(0, 12)]),
    Sample::new(String::from("Hi. Bye."), vec![Span::new(0, 3), Span::new(4, 8)]),
];
let mut evaluator = Evaluator::with_listener(model, MismatchCollector::new());
evaluator.evaluate_all(&samples).unwrap();

assert_eq!(0.5, evaluator.fmeasure().precision());
assert_eq!(1.0 / 3.0, evaluator.fmeasure().recall());
assert_eq!(1, evaluator.listener().unwrap().len());
```
*/

mod config;
mod evaluator;
mod fmeasure;
mod labeled;
mod listener;
mod metrics;
mod reporter;
mod sample;
mod span;

// The public api starts here
pub use span::Span;

pub use sample::Sample;

pub use fmeasure::{count_true_positives, FMeasure, ScoreAccumulator};

pub use labeled::LabeledFMeasure;

pub use metrics::{ComputationError, DivByZeroStrat, DivisionByZeroError, FloatExt, ParsingError};

pub use reporter::{Average, AverageParsingError, LabelMetrics, Reporter, UNTYPED_LABEL};

pub use config::{EvalConfig, EvalConfigBuilder, ListenerPolicy};

pub use listener::{
    ListenerError, MisclassifiedSampleListener, MismatchCollector, NoListener, TracingListener,
};

pub use evaluator::{EvaluationError, Evaluator, EvaluatorBuilder, SpanDetector};
