//! Stage abstractions for the generation pipeline.
//!
//! Every collector step is a named [`Stage`]. The orchestrator runs them
//! through [`run_isolated`], so a failing stage is logged, recorded as a
//! [`CollectionWarning`] and replaced by its default output.

use crate::core::CollectionWarning;
use crate::observability::set_stage;
use std::fmt::Display;
use std::marker::PhantomData;

/// A pipeline stage that transforms data.
pub trait Stage {
    type Input;
    type Output;
    type Error;

    /// Execute this stage with the given input.
    fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;

    /// Stage name used in logs and warnings.
    fn name(&self) -> &str;
}

/// A stage that cannot fail.
///
/// ```rust,ignore
/// let stage = PureStage::new("topology", |dir: &DumpDirectory| detect_topology(dir));
/// ```
pub struct PureStage<F, I, O> {
    name: String,
    func: F,
    _phantom: PhantomData<(I, O)>,
}

impl<F, I, O> PureStage<F, I, O>
where
    F: Fn(I) -> O,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, I, O> Stage for PureStage<F, I, O>
where
    F: Fn(I) -> O,
{
    type Input = I;
    type Output = O;
    type Error = std::convert::Infallible;

    fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        Ok((self.func)(input))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A stage whose failure the pipeline absorbs.
///
/// ```rust,ignore
/// let stage = FallibleStage::new("test results", |dir: &DumpDirectory| load_test_run(dir));
/// ```
pub struct FallibleStage<F, I, O, E> {
    name: String,
    func: F,
    _phantom: PhantomData<(I, O, E)>,
}

impl<F, I, O, E> FallibleStage<F, I, O, E>
where
    F: Fn(I) -> Result<O, E>,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, I, O, E> Stage for FallibleStage<F, I, O, E>
where
    F: Fn(I) -> Result<O, E>,
{
    type Input = I;
    type Output = O;
    type Error = E;

    fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        (self.func)(input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Execute `stage` inside its own span. An error is logged, appended to
/// `warnings` and replaced by `Output::default()`.
pub fn run_isolated<S>(stage: &S, input: S::Input, warnings: &mut Vec<CollectionWarning>) -> S::Output
where
    S: Stage,
    S::Output: Default,
    S::Error: Display,
{
    let span = tracing::info_span!("stage", name = stage.name());
    let _guard = span.enter();
    let _stage = set_stage(stage.name());
    tracing::debug!("Running stage");

    match stage.execute(input) {
        Ok(output) => output,
        Err(err) => {
            tracing::warn!("Stage {} failed, using empty result: {}", stage.name(), err);
            warnings.push(CollectionWarning::new(stage.name(), None, err.to_string()));
            S::Output::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_stage_execution() {
        let stage = PureStage::new("Double", |x: i32| x * 2);
        let result = stage.execute(21).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_fallible_stage_success() {
        let stage = FallibleStage::new("Parse", |s: String| {
            s.parse::<i32>().map_err(|_| "Parse error")
        });
        let result = stage.execute("42".to_string()).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_run_isolated_passes_output_through() {
        let stage = PureStage::new("Words", |s: &str| s.split(' ').count());
        let mut warnings = Vec::new();
        assert_eq!(run_isolated(&stage, "a b c", &mut warnings), 3);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_run_isolated_substitutes_default() {
        let stage = FallibleStage::new("parse", |s: &str| s.parse::<u32>());
        let mut warnings = Vec::new();
        assert_eq!(run_isolated(&stage, "nope", &mut warnings), 0);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].stage, "parse");
        assert_eq!(warnings[0].file, None);
    }

    #[test]
    fn test_stage_name() {
        let stage = PureStage::new("topology", |x: u8| x);
        assert_eq!(stage.name(), "topology");
    }
}
