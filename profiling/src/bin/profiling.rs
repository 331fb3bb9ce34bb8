use serde::Deserialize;
use serde_jsonlines::json_lines;
use spaneval::{
    DivByZeroStrat, EvalConfig, EvalConfigBuilder, EvaluationError, EvaluatorBuilder, FMeasure,
    LabeledFMeasure, Reporter, Sample, ScoreAccumulator, Span, SpanDetector, TracingListener,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clap::Parser;

/// One line of the corpus: a text, its gold spans and the spans a model predicted for it.
#[derive(Deserialize)]
struct Record {
    input: String,
    references: Vec<Span>,
    predictions: Vec<Span>,
}

#[derive(Debug, Clone)]
struct Document {
    id: usize,
    text: String,
}

/// Model answering with the predictions stored in the corpus.
struct Replay {
    predictions: Vec<Vec<Span>>,
}

#[derive(Debug, Error)]
#[error("no stored predictions for document {0}")]
struct MissingPredictions(usize);

impl SpanDetector<Document> for Replay {
    type Error = MissingPredictions;
    fn detect(&self, input: &Document) -> Result<Vec<Span>, MissingPredictions> {
        self.predictions
            .get(input.id)
            .cloned()
            .ok_or(MissingPredictions(input.id))
    }
}

#[derive(Debug, Error)]
enum ProfilingError {
    #[error("could not read the corpus: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError<MissingPredictions>),
    #[error(transparent)]
    Computation(#[from] spaneval::ComputationError),
}

fn load<P: AsRef<Path>>(path: P) -> Result<(Vec<Sample<Document>>, Replay), ProfilingError> {
    let mut samples = Vec::new();
    let mut predictions = Vec::new();
    for (id, record) in json_lines::<Record, P>(path)?.enumerate() {
        let record = record?;
        samples.push(Sample::new(
            Document {
                id,
                text: record.input,
            },
            record.references,
        ));
        predictions.push(record.predictions);
    }
    Ok((samples, Replay { predictions }))
}

fn evaluate<A: ScoreAccumulator>(
    samples: &[Sample<Document>],
    model: &Replay,
    accumulator: A,
    config: EvalConfig,
    log_mismatches: bool,
) -> Result<(Reporter, Duration), ProfilingError> {
    let now = Instant::now();
    let reporter = if log_mismatches {
        let mut evaluator = EvaluatorBuilder::new(|d: &Document| model.detect(d))
            .listener(TracingListener)
            .accumulator(accumulator)
            .config(config)
            .build();
        evaluator.evaluate_all(samples)?;
        evaluator.report()?
    } else {
        let mut evaluator = EvaluatorBuilder::new(|d: &Document| model.detect(d))
            .accumulator(accumulator)
            .config(config)
            .build();
        evaluator.evaluate_all(samples)?;
        evaluator.report()?
    };
    Ok((reporter, now.elapsed()))
}

#[derive(Debug, Parser)]
struct Args {
    /// JSON-lines file of `{"input", "references", "predictions"}` records
    #[arg(short, long, default_value_t = String::from("./data/corpus.jsonl"))]
    path: String,
    #[arg(short, long, default_value_t = 1)]
    n_samples: u32,
    #[arg(short, long, default_value_t = DivByZeroStrat::ReplaceBy1)]
    zero_division: DivByZeroStrat,
    /// Report the scores of every span type
    #[arg(short, long)]
    labeled: bool,
    /// Log every mismatch at the info level
    #[arg(short, long)]
    mismatches: bool,
}

fn main() -> Result<(), ProfilingError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    let path = PathBuf::from(&args.path);
    let config = EvalConfigBuilder::default()
        .division_by_zero(args.zero_division)
        .build();

    let now = Instant::now();
    let (samples, model) = load(&path)?;
    info!(documents = samples.len(), elapsed = ?now.elapsed(), "corpus loaded");

    let mut total_duration = Duration::ZERO;
    let mut last_report = None;
    for _ in 0..args.n_samples {
        let (reporter, elapsed) = if args.labeled {
            evaluate(&samples, &model, LabeledFMeasure::new(), config, args.mismatches)?
        } else {
            evaluate(&samples, &model, FMeasure::new(), config, args.mismatches)?
        };
        total_duration += elapsed;
        last_report = Some(reporter);
    }
    if let Some(reporter) = last_report {
        println!("{}", reporter);
    }
    println!(
        "Total duration: {} with {} samples",
        total_duration.as_secs_f64(),
        args.n_samples
    );
    Ok(())
}
