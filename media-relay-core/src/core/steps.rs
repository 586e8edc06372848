use crate::core::error::{RelayError, UpstreamError};

/// Result of one named dispatch step.
///
/// A step either resolves the request, asks the chain to continue with the
/// next step, or fails outright. Chains never retry: once every step has
/// continued, [`StepOutcome::settle`] produces the terminal error.
#[derive(Debug)]
pub enum StepOutcome<T> {
    Resolved(T),
    Continue { step: &'static str, reason: String },
    Failed(RelayError),
}

impl<T> StepOutcome<T> {
    pub fn continue_with(step: &'static str, reason: impl Into<String>) -> Self {
        StepOutcome::Continue {
            step,
            reason: reason.into(),
        }
    }

    /// A failed upstream call ends the chain only when `propagate` is set and
    /// the failure means something to the client; otherwise the chain continues.
    pub fn upstream_failure(step: &'static str, err: UpstreamError, propagate: bool) -> Self {
        if propagate && err.is_reportable() {
            StepOutcome::Failed(RelayError::Upstream(err))
        } else {
            StepOutcome::continue_with(step, err.to_string())
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StepOutcome<U> {
        match self {
            StepOutcome::Resolved(value) => StepOutcome::Resolved(f(value)),
            StepOutcome::Continue { step, reason } => StepOutcome::Continue { step, reason },
            StepOutcome::Failed(err) => StepOutcome::Failed(err),
        }
    }

    pub fn settle(self, exhausted: impl FnOnce() -> RelayError) -> Result<T, RelayError> {
        match self {
            StepOutcome::Resolved(value) => Ok(value),
            StepOutcome::Continue { step, reason } => {
                tracing::warn!("step '{}' fell through: {}", step, reason);
                Err(exhausted())
            }
            StepOutcome::Failed(err) => Err(err),
        }
    }
}
