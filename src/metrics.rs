/*!
This module contains the arithmetic shared by the accumulators and the reporter: what to do when a
denominator is zero, the F-beta formula and the macro and weighted averages over labels.
*/
use enum_iterator::Sequence;
use ndarray::ArrayView1;
use ndarray_stats::{errors::MultiInputError, SummaryStatisticsExt};
use num::{Float, NumCast};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
/// How do we handle a ratio with a zero denominator? Precision has a zero denominator when nothing
/// was predicted and recall has one when there was nothing to find.
///
/// The default is `ReplaceBy1`: with no prediction there can be no false positive, and with no
/// reference there can be no false negative. This is a policy, not a mathematical result.
pub enum DivByZeroStrat {
    /// Returns 1 when the denominator is 0
    ReplaceBy1,
    /// Returns 0 when the denominator is 0
    ReplaceBy0,
    /// Returns an error
    ReturnError,
}

impl Default for DivByZeroStrat {
    fn default() -> Self {
        Self::ReplaceBy1
    }
}

impl Display for DivByZeroStrat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not parse `{input}` into a `{target}`")]
pub struct ParsingError {
    pub(crate) input: String,
    pub(crate) target: &'static str,
}

impl FromStr for DivByZeroStrat {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "replaceby1" | "replacebyone" => Ok(DivByZeroStrat::ReplaceBy1),
            "replaceby0" | "replacebyzero" => Ok(DivByZeroStrat::ReplaceBy0),
            "returnerror" | "error" => Ok(DivByZeroStrat::ReturnError),
            _ => Err(ParsingError {
                input: String::from(s),
                target: "DivByZeroStrat",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Encountered division by zero")]
pub struct DivisionByZeroError;

#[derive(Debug, Clone, PartialEq, Error)]
/// Enum error encompassing the failures that could happen when computing the precision, recall,
/// f-score and averages out of the accumulated counts.
pub enum ComputationError {
    #[error("Beta value is not positive")]
    BetaNotPositive,
    #[error(transparent)]
    DivisionByZero(#[from] DivisionByZeroError),
    #[error(transparent)]
    InputError(#[from] MultiInputError),
    #[error("Found an empty array in {0}")]
    EmptyArray(String),
}

/// Internal extension trait for Num's Float trait
pub trait FloatExt: Float + Debug {}

impl<T: Float + Debug> FloatExt for T {}

/// Divides `numerator` by `denominator`, following `zero_division` if the denominator is 0.
pub(crate) fn prf_divide(
    numerator: usize,
    denominator: usize,
    zero_division: DivByZeroStrat,
) -> Result<f64, DivisionByZeroError> {
    if denominator == 0 {
        return match zero_division {
            DivByZeroStrat::ReplaceBy1 => Ok(1.0),
            DivByZeroStrat::ReplaceBy0 => Ok(0.0),
            DivByZeroStrat::ReturnError => Err(DivisionByZeroError),
        };
    }
    Ok(numerator as f64 / denominator as f64)
}

/// Weighted harmonic mean of `precision` and `recall`. `beta=1` gives the F1 score and `beta=0.5`
/// the F0.5 score. Returns 0 when both precision and recall are 0 and the recall when `beta` is
/// infinite.
pub(crate) fn fbeta<F: FloatExt>(
    precision: f64,
    recall: f64,
    beta: F,
) -> Result<f64, ComputationError> {
    if beta.is_sign_negative() || beta.is_nan() {
        return Err(ComputationError::BetaNotPositive);
    };
    let beta2 = beta.powi(2);
    if beta2.is_infinite() {
        return Ok(recall);
    }
    let beta2: f64 = <f64 as NumCast>::from(beta2).ok_or(ComputationError::BetaNotPositive)?;
    let denominator = beta2 * precision + recall;
    if denominator == 0.0 {
        Ok(0.0)
    } else {
        Ok((1.0 + beta2) * precision * recall / denominator)
    }
}

/// Unweighted mean of the per-label scores.
pub(crate) fn macro_average(
    scores: ArrayView1<f64>,
    name: &str,
) -> Result<f64, ComputationError> {
    scores
        .mean()
        .ok_or_else(|| ComputationError::EmptyArray(String::from(name)))
}

/// Mean of the per-label scores, weighted by their support.
pub(crate) fn weighted_average<'a>(
    scores: ArrayView1<'a, f64>,
    weights: ArrayView1<'a, f64>,
) -> Result<f64, ComputationError> {
    Ok(scores.weighted_mean(&weights)?)
}
