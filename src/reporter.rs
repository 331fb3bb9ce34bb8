/*!
This modules gives a few tools to prettyprint the output for all the labels and the overall
metrics.
*/
use crate::config::EvalConfig;
use crate::fmeasure::FMeasure;
use crate::metrics::{macro_average, weighted_average, ComputationError, DivByZeroStrat};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Label given to the row of the untyped spans.
pub const UNTYPED_LABEL: &str = "Untyped";

/// The reporter holds the metrics of every label and the overall metrics. It can be used to
/// display the results (i.e. prettyprint them) as if they were collected into a dataframe and can
/// be consumed to obtain a `HashSet` containing the metrics. The overall rows come first, in the
/// `Micro`, `Macro`, `Weighted` order, followed by the labels in ascending order.
///
/// # Example
///
/// ```rust
/// use spaneval::{EvalConfig, LabeledFMeasure, ScoreAccumulator, Span};
///
/// let mut labeled = LabeledFMeasure::new();
/// labeled.update_scores(
///     &[Span::with_type(0, 2, "A"), Span::with_type(2, 3, "B"), Span::with_type(5, 6, "A")],
///     &[Span::with_type(2, 3, "B"), Span::with_type(3, 4, "C"), Span::with_type(5, 6, "A")],
/// );
/// let reporter = labeled.report(&EvalConfig::default()).unwrap();
/// println!("{}", reporter);
///
/// // Label, Precision, Recall, Fscore, Support
/// // Overall_Micro, 0.6666666666666666, 0.6666666666666666, 0.6666666666666666, 3
/// // Overall_Macro, 0.6666666666666666, 0.8333333333333334, 0.5555555555555555, 3
/// // Overall_Weighted, 1, 0.6666666666666666, 0.7777777777777777, 3
/// // A, 1, 0.5, 0.6666666666666666, 2
/// // B, 1, 1, 1, 1
/// // C, 0, 1, 0, 0
/// assert_eq!(7, reporter.to_string().lines().count());
/// assert_eq!(1.0, reporter.get("B").unwrap().fscore);
/// assert_eq!(2, reporter.get("A").unwrap().support);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Reporter {
    pub(crate) rows: BTreeSet<LabelMetrics>,
}

/// By converting the reporter into a `HashSet` of `LabelMetrics`, you lose the ordering of the
/// rows. If you mean to consume the data without prettyprinting it, this is not a problem.
impl From<Reporter> for HashSet<LabelMetrics> {
    fn from(value: Reporter) -> Self {
        value.rows.into_iter().collect()
    }
}

impl Reporter {
    pub(crate) fn insert(&mut self, metrics: LabelMetrics) -> bool {
        self.rows.insert(metrics)
    }

    /// Report with a single `Overall_Micro` row.
    pub(crate) fn from_overall(
        fmeasure: &FMeasure,
        config: &EvalConfig,
    ) -> Result<Self, ComputationError> {
        let mut reporter = Reporter::default();
        reporter.insert(LabelMetrics::from_fmeasure(
            OverallAverage::Micro.to_string(),
            None,
            Average::Micro,
            fmeasure,
            config,
        )?);
        Ok(reporter)
    }

    /// Report with one row per label and the three overall averages. The macro and weighted rows
    /// are only added if there is at least one label.
    pub(crate) fn from_labels<'a, L>(labels: L, config: &EvalConfig) -> Result<Self, ComputationError>
    where
        L: IntoIterator<Item = (Option<&'a str>, &'a FMeasure)>,
    {
        let mut overall = FMeasure::default();
        let mut label_rows = Vec::new();
        for (label, fmeasure) in labels {
            overall.merge(fmeasure);
            let name = String::from(label.unwrap_or(UNTYPED_LABEL));
            label_rows.push(LabelMetrics::from_fmeasure(
                name,
                label.map(String::from),
                Average::None,
                fmeasure,
                config,
            )?);
        }
        let mut reporter = Reporter::from_overall(&overall, config)?;
        if !label_rows.is_empty() {
            let (macro_row, weighted_row) = averaged_rows(&label_rows, config)?;
            reporter.insert(macro_row);
            reporter.insert(weighted_row);
        }
        for row in label_rows {
            reporter.insert(row);
        }
        Ok(reporter)
    }

    /// Metrics of the first row named `label`. Overall rows are named `Overall_Micro`,
    /// `Overall_Macro` and `Overall_Weighted`, and the untyped spans `Untyped`.
    pub fn get(&self, label: &str) -> Option<&LabelMetrics> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Metrics of the spans of type `span_type`. `None` gives the row of the untyped spans.
    pub fn get_span_type(&self, span_type: Option<&str>) -> Option<&LabelMetrics> {
        self.rows
            .iter()
            .find(|r| r.average == Average::None && r.span_type.as_deref() == span_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelMetrics> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn averaged_rows(
    label_rows: &[LabelMetrics],
    config: &EvalConfig,
) -> Result<(LabelMetrics, LabelMetrics), ComputationError> {
    let precision = Array1::from_iter(label_rows.iter().map(|r| r.precision));
    let recall = Array1::from_iter(label_rows.iter().map(|r| r.recall));
    let fscore = Array1::from_iter(label_rows.iter().map(|r| r.fscore));
    let support: usize = label_rows.iter().map(|r| r.support).sum();

    let macro_row = LabelMetrics::new_overall(
        OverallAverage::Macro,
        macro_average(precision.view(), "precision")?,
        macro_average(recall.view(), "recall")?,
        macro_average(fscore.view(), "fscore")?,
        support,
    );
    let weighted_row = if support == 0 {
        match config.zero_division() {
            DivByZeroStrat::ReturnError => {
                return Err(ComputationError::DivisionByZero(
                    crate::metrics::DivisionByZeroError,
                ))
            }
            _ => {
                warn!("no reference span for any label, the weighted average falls back to the macro average");
                LabelMetrics::new_overall(
                    OverallAverage::Weighted,
                    macro_row.precision,
                    macro_row.recall,
                    macro_row.fscore,
                    support,
                )
            }
        }
    } else {
        let weights = Array1::from_iter(label_rows.iter().map(|r| r.support as f64));
        LabelMetrics::new_overall(
            OverallAverage::Weighted,
            weighted_average(precision.view(), weights.view())?,
            weighted_average(recall.view(), weights.view())?,
            weighted_average(fscore.view(), weights.view())?,
            support,
        )
    };
    Ok((macro_row, weighted_row))
}

/// The Reporter struct acts as a dataframe when displayed.
impl Display for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Label, Precision, Recall, Fscore, Support")?;
        for v in self.rows.iter() {
            writeln!(f, "{}", v)?
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
/// Datastructure holding the metrics of a given label or of an overall average. Two
/// `LabelMetrics` are equal if they share the same average, span type and label, regardless of
/// their scores. The row of the untyped spans is labeled `Untyped` but has no span type, so it
/// never collides with spans whose type is the string "Untyped".
pub struct LabelMetrics {
    /// The label, such as "PER", "sentence", "NP", etc.
    pub label: String,
    /// Type of the spans counted in this row. `None` for the untyped spans and the overall rows.
    pub span_type: Option<String>,
    /// The average used to compute this row's metrics
    pub average: Average,
    /// Precision metric
    pub precision: f64,
    /// Recall metric
    pub recall: f64,
    /// Fscore metric
    pub fscore: f64,
    /// Number of reference spans
    pub support: usize,
}

impl LabelMetrics {
    fn from_fmeasure(
        label: String,
        span_type: Option<String>,
        average: Average,
        fmeasure: &FMeasure,
        config: &EvalConfig,
    ) -> Result<Self, ComputationError> {
        let zero_division = config.zero_division();
        if fmeasure.predicted_total() == 0 {
            warn!(label = %label, strategy = %zero_division, "division by zero while computing the precision");
        }
        if fmeasure.reference_total() == 0 {
            warn!(label = %label, strategy = %zero_division, "division by zero while computing the recall");
        }
        Ok(LabelMetrics {
            precision: fmeasure.precision_with(zero_division)?,
            recall: fmeasure.recall_with(zero_division)?,
            fscore: fmeasure.fscore_with(config.beta(), zero_division)?,
            support: fmeasure.reference_total(),
            label,
            span_type,
            average,
        })
    }

    pub(crate) fn new_overall(
        average: OverallAverage,
        precision: f64,
        recall: f64,
        fscore: f64,
        support: usize,
    ) -> Self {
        LabelMetrics {
            label: average.to_string(),
            span_type: None,
            average: average.into(),
            precision,
            recall,
            fscore,
            support,
        }
    }
}

impl Hash for LabelMetrics {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.label.hash(state);
        self.span_type.hash(state);
        self.average.hash(state)
    }
}

impl PartialEq for LabelMetrics {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.span_type == other.span_type
            && self.average == other.average
    }
}
impl Eq for LabelMetrics {}

impl PartialOrd for LabelMetrics {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LabelMetrics {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.average
            .cmp(&other.average)
            .then_with(|| self.span_type.cmp(&other.span_type))
            .then_with(|| self.label.cmp(&other.label))
    }
}

/// The LabelMetrics struct acts as a line in a dataframe when displayed.
impl Display for LabelMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.label, self.precision, self.recall, self.fscore, self.support
        )
    }
}

/// Enumeration of the different types of averaging supported by this crate. `None` marks the rows
/// of single labels. &str can be parsed to create an `Average`.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Serialize, Deserialize)]
pub enum Average {
    Micro,
    Macro,
    Weighted,
    None,
}
impl Display for Average {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl FromStr for Average {
    type Err = AverageParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Average::None),
            "micro" => Ok(Average::Micro),
            "macro" => Ok(Average::Macro),
            "weighted" => Ok(Average::Weighted),
            _ => Err(AverageParsingError(String::from(s))),
        }
    }
}

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Error)]
#[error("Impossible to parse the string ({0}) into an Average")]
pub struct AverageParsingError(String);

#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub(crate) enum OverallAverage {
    Micro,
    Macro,
    Weighted,
}

impl Display for OverallAverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str_content = match self {
            Self::Micro => "Overall_Micro",
            Self::Macro => "Overall_Macro",
            Self::Weighted => "Overall_Weighted",
        };
        write!(f, "{}", str_content)
    }
}

impl From<OverallAverage> for Average {
    fn from(value: OverallAverage) -> Self {
        match value {
            OverallAverage::Micro => Average::Micro,
            OverallAverage::Macro => Average::Macro,
            OverallAverage::Weighted => Average::Weighted,
        }
    }
}
