use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::config::LaunchConfig;
use crate::error::{LaunchError, Stage};
use crate::ledger::{ConfirmationState, LedgerClient, LedgerError, TransactionOutcome};

use super::{fee::collect_fee, Progress};

/// Everything a caller needs after a successful token creation.
#[derive(Debug, Clone, Copy)]
pub struct IssueReceipt {
    pub mint: Pubkey,
    pub holding: Pubkey,
    pub decimals: u8,
    /// Base units minted into `holding`.
    pub initial_supply: u64,
    pub fee: TransactionOutcome,
    pub supply_signature: Signature,
}

/// Create a new mint and issue the initial supply, gated behind the mint fee.
///
/// Strict order: fee, mint creation, holding resolution, supply mint. A
/// later step failing leaves the earlier steps in place; mint creation on
/// the ledger is not reversible, so a `supply-mint` failure surfaces a mint
/// with zero or partial supply for the caller to follow up on. The fee is
/// charged for the attempt and is not refunded.
pub(super) fn issue_token<L: LedgerClient>(
    ledger: &L,
    config: &LaunchConfig,
    decimals: u8,
    supply_raw: u64,
    progress: &dyn Progress,
) -> Result<IssueReceipt, LaunchError> {
    let fee = collect_fee(ledger, &config.treasury, config.fees.mint_fee_lamports, progress)?;

    let payer = ledger.payer();

    progress.on_stage(Stage::MintCreation, ConfirmationState::Submitted);
    let mint = ledger
        .create_mint(&payer, &payer, decimals)
        .map_err(|err| fail(progress, Stage::MintCreation, err))?;
    progress.on_stage(Stage::MintCreation, ConfirmationState::Confirmed);

    progress.on_stage(Stage::SupplyMint, ConfirmationState::Submitted);
    let holding = ledger
        .get_or_create_holding(&payer, &mint)
        .map_err(|err| fail(progress, Stage::SupplyMint, err))?;
    let supply_signature = ledger
        .mint_to(&mint, &holding, &payer, supply_raw)
        .map_err(|err| fail(progress, Stage::SupplyMint, err))?;
    ledger
        .confirm(&supply_signature)
        .map_err(|err| fail(progress, Stage::SupplyMint, err))?;
    progress.on_stage(Stage::SupplyMint, ConfirmationState::Confirmed);

    Ok(IssueReceipt {
        mint,
        holding,
        decimals,
        initial_supply: supply_raw,
        fee,
        supply_signature,
    })
}

fn fail(progress: &dyn Progress, stage: Stage, source: LedgerError) -> LaunchError {
    progress.on_stage(stage, ConfirmationState::Failed);
    LaunchError::Action { stage, source }
}
