//! Error type shared by every planning entry point.
//!
//! Both kinds are immediate, non-recoverable caller errors. "No trajectory
//! exists" is not one of them: pathfinders report it as `Ok(None)`.

use thiserror::Error;

/// Errors produced by `arctime`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// A required builder input was never supplied.
    #[error("configuration error: {0} was never supplied")]
    Configuration(&'static str),

    /// A supplied value violates a documented constraint.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl PlanError {
    #[inline]
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PlanError::InvalidArgument(msg.into())
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
