use spaneval::{
    count_true_positives, Average, DivByZeroStrat, EvalConfigBuilder, EvaluationError, Evaluator,
    EvaluatorBuilder, FMeasure, LabelMetrics, LabeledFMeasure, ListenerError, ListenerPolicy,
    MisclassifiedSampleListener, MismatchCollector, Reporter, Sample, ScoreAccumulator, Span,
    SpanDetector, TracingListener,
};
use std::collections::HashSet;
use std::convert::Infallible;
use thiserror::Error;

/// Naive sentence detector: a sentence ends after every '.', '!' or '?' followed by a space or by
/// the end of the text.
struct PunctuationDetector;

impl SpanDetector<String> for PunctuationDetector {
    type Error = Infallible;
    fn detect(&self, input: &String) -> Result<Vec<Span>, Infallible> {
        let mut spans = Vec::new();
        let mut start = 0;
        let bytes = input.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            let is_end = matches!(b, b'.' | b'!' | b'?');
            let followed_by_space = bytes.get(i + 1).map_or(true, |n| *n == b' ');
            if is_end && followed_by_space {
                spans.push(Span::with_type(start, i + 1, "sentence"));
                start = i + 2;
            }
        }
        Ok(spans)
    }
}

fn sentence(start: usize, end: usize) -> Span {
    Span::with_type(start, end, "sentence")
}

fn corpus() -> Vec<Sample<String>> {
    vec![
        Sample::new(
            String::from("It rains. We stay home!"),
            vec![sentence(0, 9), sentence(10, 23)],
        ),
        Sample::new(
            String::from("Mr. Smith left. Bye."),
            vec![sentence(0, 15), sentence(16, 20)],
        ),
        Sample::new(String::from("No end"), vec![sentence(0, 6)]),
    ]
}

#[test]
fn sentence_detector_evaluation() {
    let mut evaluator = Evaluator::with_listener(PunctuationDetector, MismatchCollector::new());
    assert_eq!(3, evaluator.evaluate_all(corpus()).unwrap());

    // "Mr." is split from "Smith left." and "No end" has no sentence.
    let fmeasure = evaluator.fmeasure();
    assert_eq!(3, fmeasure.matched());
    assert_eq!(5, fmeasure.predicted_total());
    assert_eq!(5, fmeasure.reference_total());
    assert_eq!(0.6, fmeasure.precision());
    assert_eq!(0.6, fmeasure.recall());
    assert!((fmeasure.f1() - 0.6).abs() < 1e-12);

    let mismatches = evaluator.into_listener().unwrap().into_mismatches();
    let inputs: Vec<&str> = mismatches
        .iter()
        .map(|(reference, _)| reference.input().as_str())
        .collect();
    assert_eq!(vec!["Mr. Smith left. Bye.", "No end"], inputs);
    let (reference, predicted) = &mismatches[0];
    assert_eq!(reference.input(), predicted.input());
    assert_eq!(
        vec![Some("Mr."), Some("Smith left."), Some("Bye.")],
        predicted.covered_texts().collect::<Vec<_>>()
    );
}

#[test]
fn streaming_samples_are_not_kept() {
    let mut evaluator = Evaluator::new(PunctuationDetector);
    let generated = (0..100).map(|i| {
        let text = format!("Sample number {}.", i);
        let len = text.len();
        Sample::new(text, vec![sentence(0, len)])
    });
    assert_eq!(100, evaluator.evaluate_all(generated).unwrap());
    assert_eq!(1.0, evaluator.fmeasure().f1());
}

#[test]
fn evaluators_can_be_merged() {
    let samples = corpus();
    let mut single = Evaluator::new(PunctuationDetector);
    single.evaluate_all(&samples).unwrap();

    let (left, right) = samples.split_at(1);
    let mut first = Evaluator::new(PunctuationDetector);
    first.evaluate_all(left).unwrap();
    let mut second = Evaluator::new(PunctuationDetector);
    second.evaluate_all(right).unwrap();

    let merged: FMeasure = [first.into_fmeasure(), second.into_fmeasure()].into_iter().sum();
    assert_eq!(single.fmeasure(), &merged);
}

#[test]
fn duplicated_references_need_duplicated_predictions() {
    let references = [Span::new(0, 5), Span::new(0, 5)];
    assert_eq!(1, count_true_positives(&references, &[Span::new(0, 5)]));
    let mut fmeasure = FMeasure::new();
    fmeasure.update_scores(&references, &[Span::new(0, 5)]);
    assert_eq!(1.0, fmeasure.precision());
    assert_eq!(0.5, fmeasure.recall());
}

#[derive(Debug, Error)]
#[error("tagger unavailable")]
struct TaggerUnavailable;

#[test]
fn model_errors_reach_the_caller() {
    let model = |input: &String| {
        if input.is_empty() {
            Err(TaggerUnavailable)
        } else {
            Ok(vec![Span::new(0, input.len())])
        }
    };
    let samples = vec![
        Sample::new(String::from("abc"), vec![Span::new(0, 3)]),
        Sample::new(String::new(), vec![]),
    ];
    let mut evaluator = Evaluator::new(model);
    let error = evaluator.evaluate_all(&samples).unwrap_err();
    assert!(matches!(error, EvaluationError::Model(TaggerUnavailable)));
    assert_eq!("model invocation failed: tagger unavailable", error.to_string());
    assert_eq!(1, evaluator.fmeasure().matched());
}

struct FlakyListener {
    remaining: usize,
}

impl MisclassifiedSampleListener<String> for FlakyListener {
    fn misclassified(
        &mut self,
        _: &Sample<String>,
        _: &Sample<String>,
    ) -> Result<(), ListenerError> {
        if self.remaining == 0 {
            return Err(ListenerError::new("listener exhausted"));
        }
        self.remaining -= 1;
        Ok(())
    }
}

#[test]
fn listener_policies() {
    let mut isolated = Evaluator::with_listener(PunctuationDetector, FlakyListener { remaining: 0 });
    assert_eq!(3, isolated.evaluate_all(corpus()).unwrap());
    assert_eq!(5, isolated.fmeasure().reference_total());

    let mut aborted = EvaluatorBuilder::new(PunctuationDetector)
        .listener(FlakyListener { remaining: 0 })
        .config(
            EvalConfigBuilder::default()
                .listener_policy(ListenerPolicy::Abort)
                .build(),
        )
        .build();
    let error = aborted.evaluate_all(corpus()).unwrap_err();
    assert_eq!("mismatch listener failed: listener exhausted", error.to_string());
    // The first sample is a match and the second one failed in the listener.
    assert_eq!(4, aborted.fmeasure().reference_total());
}

#[test]
fn tracing_listener_logs_mismatches() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("spaneval=trace")
        .try_init();
    let mut evaluator = Evaluator::with_listener(PunctuationDetector, TracingListener);
    evaluator.evaluate_all(corpus()).unwrap();
    assert_eq!(3, evaluator.fmeasure().matched());
}

pub trait CloseEnough {
    fn are_close(&self, other: &Self, eps: f64) -> bool;
}

// LabelMetrics does not have the default PartialEq implementation.
impl CloseEnough for LabelMetrics {
    fn are_close(&self, other: &Self, eps: f64) -> bool {
        let are_equal = self == other;
        let precision_is_equal = f64::abs(self.precision - other.precision) < eps;
        let recall_is_equal = f64::abs(self.recall - other.recall) < eps;
        let fscore_is_equal = f64::abs(self.fscore - other.fscore) < eps;
        are_equal && precision_is_equal && recall_is_equal && fscore_is_equal
    }
}

#[test]
fn labeled_report() {
    let model = |_: &String| {
        Ok::<_, Infallible>(vec![
            Span::with_type(0, 4, "PER"),
            Span::with_type(8, 14, "LOC"),
            Span::with_type(15, 19, "ORG"),
        ])
    };
    let samples = vec![Sample::new(
        String::from("John met Berlin Acme"),
        vec![
            Span::with_type(0, 4, "PER"),
            Span::with_type(9, 15, "LOC"),
            Span::with_type(16, 20, "ORG"),
        ],
    )];
    let config = EvalConfigBuilder::default()
        .division_by_zero(DivByZeroStrat::ReplaceBy0)
        .build();
    let mut evaluator = EvaluatorBuilder::new(model)
        .accumulator(LabeledFMeasure::new())
        .config(config)
        .build();
    evaluator.evaluate_all(&samples).unwrap();

    let actual: HashSet<LabelMetrics> = evaluator.report().unwrap().into();
    let expected = vec![
        LabelMetrics {
            label: String::from("Overall_Micro"),
            span_type: None,
            average: Average::Micro,
            precision: 1.0 / 3.0,
            recall: 1.0 / 3.0,
            fscore: 1.0 / 3.0,
            support: 3,
        },
        LabelMetrics {
            label: String::from("Overall_Macro"),
            span_type: None,
            average: Average::Macro,
            precision: 1.0 / 3.0,
            recall: 1.0 / 3.0,
            fscore: 1.0 / 3.0,
            support: 3,
        },
        LabelMetrics {
            label: String::from("Overall_Weighted"),
            span_type: None,
            average: Average::Weighted,
            precision: 1.0 / 3.0,
            recall: 1.0 / 3.0,
            fscore: 1.0 / 3.0,
            support: 3,
        },
        LabelMetrics {
            label: String::from("PER"),
            span_type: Some(String::from("PER")),
            average: Average::None,
            precision: 1.0,
            recall: 1.0,
            fscore: 1.0,
            support: 1,
        },
        LabelMetrics {
            label: String::from("LOC"),
            span_type: Some(String::from("LOC")),
            average: Average::None,
            precision: 0.0,
            recall: 0.0,
            fscore: 0.0,
            support: 1,
        },
        LabelMetrics {
            label: String::from("ORG"),
            span_type: Some(String::from("ORG")),
            average: Average::None,
            precision: 0.0,
            recall: 0.0,
            fscore: 0.0,
            support: 1,
        },
    ];
    assert_eq!(expected.len(), actual.len());
    for row in expected {
        let actual_row = actual.get(&row).unwrap();
        assert!(actual_row.are_close(&row, 1e-9), "{} != {}", actual_row, row);
    }
}

#[test]
fn reporter_display() {
    let mut fmeasure = FMeasure::new();
    fmeasure.update_scores(&[Span::new(0, 1)], &[Span::new(0, 1)]);
    let reporter: Reporter = fmeasure.report(&EvalConfigBuilder::default().build()).unwrap();
    assert_eq!(
        "Label, Precision, Recall, Fscore, Support\nOverall_Micro, 1, 1, 1, 1\n",
        reporter.to_string()
    );
}
