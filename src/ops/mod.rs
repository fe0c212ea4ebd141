//! Orchestration of the two fee-gated token operations.
//!
//! Each operation is a single sequential flow: collect the service fee, wait
//! for it to confirm, then run the privileged steps one at a time. Nothing
//! here retries, runs steps in parallel, or holds shared mutable state;
//! independent invocations are fully independent.

mod fee;
mod issue;
mod revoke;

use solana_sdk::pubkey::Pubkey;

use crate::config::{LaunchConfig, MAX_DECIMALS};
use crate::error::{LaunchError, Stage};
use crate::ledger::{ConfirmationState, LedgerClient};

pub use issue::IssueReceipt;
pub use revoke::{AuthorityClear, RevokeReceipt};

/// Incremental status channel for stage transitions. Correctness does not
/// depend on it; the CLI prints these, library callers may ignore them.
pub trait Progress {
    fn on_stage(&self, _stage: Stage, _state: ConfirmationState) {}
}

/// Progress sink that discards everything.
pub struct Silent;

impl Progress for Silent {}

/// A validated user intent to create a token. `supply` is in human units;
/// the facade scales it by `10^decimals` before touching the ledger.
#[derive(Debug, Clone, Copy)]
pub struct IssueRequest {
    pub decimals: u8,
    pub supply: u64,
}

/// Entry point the UI calls. Routes intents to the issuer or revoker,
/// rejecting malformed input before any ledger traffic.
pub struct Launchpad<L: LedgerClient> {
    ledger: L,
    config: LaunchConfig,
}

impl<L: LedgerClient> Launchpad<L> {
    pub fn new(ledger: L, config: LaunchConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Pay the mint fee, create a new mint (decimals, authorities = payer)
    /// and mint the initial supply into the payer's holding account.
    pub fn issue_token(
        &self,
        request: &IssueRequest,
        progress: &dyn Progress,
    ) -> Result<IssueReceipt, LaunchError> {
        if request.decimals > MAX_DECIMALS {
            return Err(LaunchError::Validation(format!(
                "decimals must be between 0 and {MAX_DECIMALS}, got {}",
                request.decimals
            )));
        }
        if request.supply == 0 {
            return Err(LaunchError::Validation(
                "initial supply must be at least 1".to_string(),
            ));
        }
        let supply_raw = scale_supply(request.supply, request.decimals)?;

        issue::issue_token(&self.ledger, &self.config, request.decimals, supply_raw, progress)
    }

    /// Pay the removal fee, then clear the mint authority and the freeze
    /// authority of `mint`. Both changes are permanent.
    pub fn revoke_authorities(
        &self,
        mint: &str,
        progress: &dyn Progress,
    ) -> Result<RevokeReceipt, LaunchError> {
        let mint: Pubkey = mint
            .parse()
            .map_err(|_| LaunchError::Validation(format!("invalid mint address: {mint}")))?;

        revoke::revoke_authorities(&self.ledger, &self.config, &mint, progress)
    }
}

/// Scale a human-readable supply to base units, rejecting overflow before
/// the fee is charged.
fn scale_supply(supply: u64, decimals: u8) -> Result<u64, LaunchError> {
    let scale = 10u64.pow(u32::from(decimals));
    supply.checked_mul(scale).ok_or_else(|| {
        LaunchError::Validation(format!(
            "supply {supply} with {decimals} decimals exceeds the maximum token amount"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::scale_supply;

    #[test]
    fn scales_supply_by_decimals() {
        assert_eq!(scale_supply(1_000, 0).unwrap(), 1_000);
        assert_eq!(scale_supply(1_000, 6).unwrap(), 1_000_000_000);
        assert_eq!(
            scale_supply(1_000_000_000, 9).unwrap(),
            1_000_000_000_000_000_000
        );
    }

    #[test]
    fn rejects_supply_overflow() {
        assert!(scale_supply(u64::MAX, 1).is_err());
        assert!(scale_supply(18_446_744_074, 9).is_err());
    }
}
