use solana_sdk::pubkey::Pubkey;

use crate::error::{LaunchError, Stage};
use crate::ledger::{ConfirmationState, LedgerClient, TransactionOutcome};

use super::Progress;

/// Transfer the service fee from the payer to the treasury and block until
/// the transfer reaches a terminal state.
///
/// Returns only once the fee is confirmed; any other outcome (decline,
/// rejection, timeout) is a `fee-payment` failure and the caller must not
/// proceed to a privileged step. The ledger's own atomicity guarantees a
/// failed transfer moved no funds.
pub(super) fn collect_fee<L: LedgerClient>(
    ledger: &L,
    treasury: &Pubkey,
    lamports: u64,
    progress: &dyn Progress,
) -> Result<TransactionOutcome, LaunchError> {
    let payer = ledger.payer();

    let signature = ledger
        .transfer(&payer, treasury, lamports)
        .map_err(LaunchError::FeePayment)?;
    progress.on_stage(Stage::FeePayment, ConfirmationState::Submitted);

    match ledger.confirm(&signature) {
        Ok(()) => {
            progress.on_stage(Stage::FeePayment, ConfirmationState::Confirmed);
            Ok(TransactionOutcome {
                signature,
                state: ConfirmationState::Confirmed,
            })
        }
        Err(err) => {
            progress.on_stage(Stage::FeePayment, ConfirmationState::Failed);
            Err(LaunchError::FeePayment(err))
        }
    }
}
