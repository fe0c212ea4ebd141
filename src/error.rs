use std::fmt;

use thiserror::Error;

use crate::ledger::LedgerError;

/// The orchestration step at which an operation failed. Rendered as the
/// kebab-case stage names surfaced to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FeePayment,
    MintCreation,
    SupplyMint,
    AuthorityClearMint,
    AuthorityClearFreeze,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FeePayment => "fee-payment",
            Stage::MintCreation => "mint-creation",
            Stage::SupplyMint => "supply-mint",
            Stage::AuthorityClearMint => "authority-clear-mint",
            Stage::AuthorityClearFreeze => "authority-clear-freeze",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure taxonomy for the orchestration facade.
///
/// Every variant except `Validation` carries the exact stage it occurred at;
/// the facade never retries and never collapses stage information into a
/// generic error.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Malformed input rejected before any ledger traffic.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The service fee transfer did not reach a confirmed state. No
    /// privileged action was attempted.
    #[error("fee-payment failed: {0}")]
    FeePayment(#[source] LedgerError),

    /// A privileged step failed after the fee was confirmed. The fee is not
    /// refunded; the stage tells the caller exactly how far the flow got.
    #[error("{stage} failed: {source}")]
    Action {
        stage: Stage,
        #[source]
        source: LedgerError,
    },

    /// Authority revocation cleared one authority but not the other. The
    /// cleared authority stays cleared; only the stage named here remains
    /// for the caller to reattempt.
    #[error("partial success: {stage} failed, the other authority is cleared: {source}")]
    PartialRevoke {
        stage: Stage,
        #[source]
        source: LedgerError,
    },
}

impl LaunchError {
    /// Stage marker for stage-tagged failures, `None` for pre-flight
    /// validation errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            LaunchError::Validation(_) => None,
            LaunchError::FeePayment(_) => Some(Stage::FeePayment),
            LaunchError::Action { stage, .. } => Some(*stage),
            LaunchError::PartialRevoke { stage, .. } => Some(*stage),
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, LaunchError::PartialRevoke { .. })
    }
}
