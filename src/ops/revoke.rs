use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::config::LaunchConfig;
use crate::error::{LaunchError, Stage};
use crate::ledger::{
    AuthorityKind, ConfirmationState, LedgerClient, LedgerError, TransactionOutcome,
};

use super::{fee::collect_fee, Progress};

/// Outcome of clearing one authority. `AlreadyClear` is the idempotent
/// no-op: the authority was gone before this invocation, nothing was
/// submitted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityClear {
    Cleared(Signature),
    AlreadyClear,
}

#[derive(Debug, Clone, Copy)]
pub struct RevokeReceipt {
    pub mint: Pubkey,
    pub fee: TransactionOutcome,
    pub mint_authority: AuthorityClear,
    pub freeze_authority: AuthorityClear,
}

/// Clear the mint authority and then the freeze authority, gated behind the
/// removal fee. Both changes are permanent; neither is ever reattempted or
/// rolled back here.
///
/// Current on-chain state is read after the fee so an already-cleared
/// authority is skipped instead of producing an invalid authority change —
/// re-invoking on a fully revoked mint succeeds as a no-op. If the freeze
/// clear fails after the mint authority is gone (or vice versa), the result
/// is a partial-success error naming exactly the step left to reattempt.
pub(super) fn revoke_authorities<L: LedgerClient>(
    ledger: &L,
    config: &LaunchConfig,
    mint: &Pubkey,
    progress: &dyn Progress,
) -> Result<RevokeReceipt, LaunchError> {
    let fee = collect_fee(
        ledger,
        &config.treasury,
        config.fees.authority_removal_fee_lamports,
        progress,
    )?;

    let payer = ledger.payer();
    let authorities = ledger
        .mint_authorities(mint)
        .map_err(|err| LaunchError::Action {
            stage: Stage::AuthorityClearMint,
            source: err,
        })?;

    let mint_authority = match authorities.mint_authority {
        None => AuthorityClear::AlreadyClear,
        Some(_) => {
            clear(ledger, mint, &payer, AuthorityKind::Mint, progress).map_err(|source| {
                // The other authority being gone already makes this the
                // asymmetric one-of-two state, not a plain step failure.
                if authorities.freeze_authority.is_none() {
                    LaunchError::PartialRevoke {
                        stage: Stage::AuthorityClearMint,
                        source,
                    }
                } else {
                    LaunchError::Action {
                        stage: Stage::AuthorityClearMint,
                        source,
                    }
                }
            })?
        }
    };

    let freeze_authority = match authorities.freeze_authority {
        None => AuthorityClear::AlreadyClear,
        Some(_) => clear(ledger, mint, &payer, AuthorityKind::Freeze, progress).map_err(
            |source| LaunchError::PartialRevoke {
                stage: Stage::AuthorityClearFreeze,
                source,
            },
        )?,
    };

    Ok(RevokeReceipt {
        mint: *mint,
        fee,
        mint_authority,
        freeze_authority,
    })
}

fn clear<L: LedgerClient>(
    ledger: &L,
    mint: &Pubkey,
    payer: &Pubkey,
    kind: AuthorityKind,
    progress: &dyn Progress,
) -> Result<AuthorityClear, LedgerError> {
    let stage = match kind {
        AuthorityKind::Mint => Stage::AuthorityClearMint,
        AuthorityKind::Freeze => Stage::AuthorityClearFreeze,
    };

    let result = ledger
        .set_authority(mint, payer, kind, None)
        .and_then(|signature| {
            progress.on_stage(stage, ConfirmationState::Submitted);
            ledger.confirm(&signature)?;
            Ok(signature)
        });

    match result {
        Ok(signature) => {
            progress.on_stage(stage, ConfirmationState::Confirmed);
            Ok(AuthorityClear::Cleared(signature))
        }
        Err(err) => {
            progress.on_stage(stage, ConfirmationState::Failed);
            Err(err)
        }
    }
}
