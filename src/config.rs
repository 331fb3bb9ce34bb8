/*
 * This module contains some quality of life structs. Most importantly, it contains the
 * `EvalConfig` struct, which implements the default trait. This config can be given to the
 * `EvaluatorBuilder` and decides how the scores are reported and what happens when a mismatch
 * listener fails.
*/
use crate::metrics::{DivByZeroStrat, ParsingError};
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
/// What does the evaluator do when the mismatch listener returns an error?
pub enum ListenerPolicy {
    /// Log the failure and keep evaluating. The scores are not affected.
    Isolate,
    /// Stop the evaluation and return the error to the caller. The scores still include the sample
    /// for which the listener failed.
    Abort,
}

impl Default for ListenerPolicy {
    fn default() -> Self {
        Self::Isolate
    }
}

impl Display for ListenerPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for ListenerPolicy {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "isolate" | "continue" => Ok(ListenerPolicy::Isolate),
            "abort" | "error" => Ok(ListenerPolicy::Abort),
            _ => Err(ParsingError {
                input: String::from(s),
                target: "ListenerPolicy",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Config struct used to simplify the parameters of the `Evaluator` and of the reports. It
/// implements the default trait.
pub struct EvalConfig {
    /// This parameter describes what to do when we encounter a division by zero when computing
    /// precision and recall for a report. The default replaces the result by 1.
    zero_division: DivByZeroStrat,
    /// Value of the `beta` parameter of the fscore in reports. `beta=1` for F1 and `beta=0.5` for
    /// F0.5.
    beta: f64,
    /// What to do when the mismatch listener fails.
    listener_policy: ListenerPolicy,
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn zero_division(&self) -> DivByZeroStrat {
        self.zero_division
    }
    pub fn beta(&self) -> f64 {
        self.beta
    }
    pub fn listener_policy(&self) -> ListenerPolicy {
        self.listener_policy
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            zero_division: DivByZeroStrat::ReplaceBy1,
            beta: 1.0,
            listener_policy: ListenerPolicy::Isolate,
        }
    }
}

impl Display for EvalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Strategy when encountering a division by zero: {}\n Beta of the fscore: {}\n Policy when the mismatch listener fails: {}", self.zero_division, self.beta, self.listener_policy)
    }
}

impl From<EvalConfigBuilder> for EvalConfig {
    fn from(value: EvalConfigBuilder) -> Self {
        Self {
            zero_division: value.zero_division,
            beta: value.beta,
            listener_policy: value.listener_policy,
        }
    }
}

/// This builder can be used to build and customize an `EvalConfig` structure.
///
/// ```rust
/// use spaneval::{DivByZeroStrat, EvalConfigBuilder, ListenerPolicy};
///
/// let config = EvalConfigBuilder::default()
///     .division_by_zero(DivByZeroStrat::ReplaceBy0)
///     .listener_policy(ListenerPolicy::Abort)
///     .build();
/// assert_eq!(DivByZeroStrat::ReplaceBy0, config.zero_division());
/// assert_eq!(1.0, config.beta());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalConfigBuilder {
    zero_division: DivByZeroStrat,
    beta: f64,
    listener_policy: ListenerPolicy,
}

impl Default for EvalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalConfigBuilder {
    pub fn division_by_zero(mut self, division_by_zero: DivByZeroStrat) -> Self {
        self.zero_division = division_by_zero;
        self
    }
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }
    pub fn listener_policy(mut self, listener_policy: ListenerPolicy) -> Self {
        self.listener_policy = listener_policy;
        self
    }
    pub fn new() -> Self {
        Self {
            zero_division: DivByZeroStrat::ReplaceBy1,
            beta: 1.0,
            listener_policy: ListenerPolicy::Isolate,
        }
    }
    pub fn build(self) -> EvalConfig {
        EvalConfig::from(self)
    }
}
