use crate::result::AiError;

/// A unit of model inference.
///
/// Jobs consume snapshots via their `Input` type and return plain values.
/// This crate stays storage-agnostic: inputs are provided by callers (infra/workers).
pub trait AiJob: Send + Sync + 'static {
    type Input: Send + Sync + 'static;
    type Output: Send + 'static;

    /// Stable name used in logs (e.g. `"sales.forecast"`).
    fn kind(&self) -> &'static str;

    /// The input snapshot the job will run inference on.
    fn input(&self) -> &Self::Input;

    /// Execute inference. Must not mutate domain state.
    fn run(&self) -> Result<Self::Output, AiError>;
}
