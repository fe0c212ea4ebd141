use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

/// Lifecycle of a submitted transaction. Every transaction moves from
/// `Submitted` to exactly one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationState {
    Submitted,
    Confirmed,
    Failed,
}

/// Signature plus the terminal state it reached.
#[derive(Debug, Clone, Copy)]
pub struct TransactionOutcome {
    pub signature: Signature,
    pub state: ConfirmationState,
}

/// Which of the two mint authorities a `set_authority` call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityKind {
    Mint,
    Freeze,
}

/// Current authority holders of a mint, as read from the ledger. `None`
/// means the authority has been cleared and can never be reassigned.
#[derive(Debug, Clone, Copy)]
pub struct MintAuthorities {
    pub mint_authority: Option<Pubkey>,
    pub freeze_authority: Option<Pubkey>,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("rpc request failed: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("instruction build failed: {0}")]
    Instruction(#[from] solana_sdk::program_error::ProgramError),

    #[error("signing declined by wallet")]
    SigningDeclined,

    #[error("transaction {signature} not confirmed after {waited:?}")]
    ConfirmationTimeout {
        signature: Signature,
        waited: Duration,
    },

    #[error("transaction {signature} failed on ledger: {reason}")]
    TransactionFailed {
        signature: Signature,
        reason: String,
    },
}

impl LedgerError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LedgerError::ConfirmationTimeout { .. })
    }
}

/// Capability interface over the chain: submit, confirm, and the SPL token
/// operations the launchpad needs. Production uses [`crate::rpc::RpcLedgerClient`];
/// tests substitute a scripted mock.
///
/// `transfer`, `mint_to` and `set_authority` submit a signed transaction and
/// return its signature without waiting; callers confirm separately.
/// `create_mint` and `get_or_create_holding` confirm internally and return
/// account references.
pub trait LedgerClient {
    /// The acting account, as supplied by the wallet/signer.
    fn payer(&self) -> Pubkey;

    /// Submit a value transfer of `lamports` from `from` to `to`.
    fn transfer(&self, from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<Signature, LedgerError>;

    /// Block until `signature` reaches a terminal state. `Ok(())` means
    /// confirmed; rejection and timeout surface as distinct errors. Never
    /// returns while the transaction is still pending.
    fn confirm(&self, signature: &Signature) -> Result<(), LedgerError>;

    /// Create and initialize a new mint with the given authority pair and
    /// decimals, returning its address once confirmed.
    fn create_mint(
        &self,
        authority: &Pubkey,
        freeze_authority: &Pubkey,
        decimals: u8,
    ) -> Result<Pubkey, LedgerError>;

    /// Resolve the owner's associated token account for `mint`, creating it
    /// if it does not exist yet.
    fn get_or_create_holding(&self, owner: &Pubkey, mint: &Pubkey) -> Result<Pubkey, LedgerError>;

    /// Mint `amount` base units into `holding`, signed by the mint authority.
    fn mint_to(
        &self,
        mint: &Pubkey,
        holding: &Pubkey,
        authority: &Pubkey,
        amount: u64,
    ) -> Result<Signature, LedgerError>;

    /// Change one of the mint's authorities. `None` clears it permanently.
    fn set_authority(
        &self,
        mint: &Pubkey,
        current_authority: &Pubkey,
        kind: AuthorityKind,
        new_authority: Option<Pubkey>,
    ) -> Result<Signature, LedgerError>;

    /// Read the mint's current authority holders.
    fn mint_authorities(&self, mint: &Pubkey) -> Result<MintAuthorities, LedgerError>;
}
