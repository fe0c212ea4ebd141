use std::thread;
use std::time::{Duration, Instant};

use solana_client::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::program_option::COption;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use spl_token::instruction::AuthorityType;
use spl_token::state::Mint;

use crate::ledger::{AuthorityKind, LedgerClient, LedgerError, MintAuthorities};

pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(60);

const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// [`LedgerClient`] over a blocking JSON-RPC connection, signing with a
/// locally held keypair.
pub struct RpcLedgerClient {
    client: RpcClient,
    payer: Keypair,
    commitment: CommitmentConfig,
    confirmation_timeout: Duration,
}

impl RpcLedgerClient {
    pub fn new(url: String, payer: Keypair, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url, commitment),
            payer,
            commitment,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Sign with the payer (plus any extra signers) and submit, returning
    /// the signature without waiting for confirmation.
    fn submit(
        &self,
        instructions: &[Instruction],
        extra_signers: &[&Keypair],
    ) -> Result<Signature, LedgerError> {
        let blockhash = self.client.get_latest_blockhash()?;
        let mut transaction = Transaction::new_with_payer(instructions, Some(&self.payer.pubkey()));
        let mut signers: Vec<&dyn Signer> = vec![&self.payer];
        for signer in extra_signers {
            if signer.pubkey() != self.payer.pubkey() {
                signers.push(*signer);
            }
        }
        transaction
            .try_sign(&signers, blockhash)
            .map_err(|_| LedgerError::SigningDeclined)?;
        let signature = self.client.send_transaction(&transaction)?;
        Ok(signature)
    }
}

impl LedgerClient for RpcLedgerClient {
    fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    fn transfer(&self, from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<Signature, LedgerError> {
        let instruction = system_instruction::transfer(from, to, lamports);
        self.submit(&[instruction], &[])
    }

    fn confirm(&self, signature: &Signature) -> Result<(), LedgerError> {
        let deadline = Instant::now() + self.confirmation_timeout;
        loop {
            let status = self
                .client
                .get_signature_status_with_commitment(signature, self.commitment)?;
            match status {
                Some(Ok(())) => return Ok(()),
                Some(Err(err)) => {
                    return Err(LedgerError::TransactionFailed {
                        signature: *signature,
                        reason: err.to_string(),
                    })
                }
                None => {}
            }
            if Instant::now() >= deadline {
                return Err(LedgerError::ConfirmationTimeout {
                    signature: *signature,
                    waited: self.confirmation_timeout,
                });
            }
            thread::sleep(CONFIRMATION_POLL_INTERVAL);
        }
    }

    fn create_mint(
        &self,
        authority: &Pubkey,
        freeze_authority: &Pubkey,
        decimals: u8,
    ) -> Result<Pubkey, LedgerError> {
        let mint_keypair = Keypair::new();
        let rent = self
            .client
            .get_minimum_balance_for_rent_exemption(Mint::LEN)?;
        let instructions = [
            system_instruction::create_account(
                &self.payer.pubkey(),
                &mint_keypair.pubkey(),
                rent,
                Mint::LEN as u64,
                &spl_token::id(),
            ),
            spl_token::instruction::initialize_mint(
                &spl_token::id(),
                &mint_keypair.pubkey(),
                authority,
                Some(freeze_authority),
                decimals,
            )?,
        ];
        let signature = self.submit(&instructions, &[&mint_keypair])?;
        self.confirm(&signature)?;
        Ok(mint_keypair.pubkey())
    }

    fn get_or_create_holding(&self, owner: &Pubkey, mint: &Pubkey) -> Result<Pubkey, LedgerError> {
        let holding = get_associated_token_address(owner, mint);
        let existing = self
            .client
            .get_account_with_commitment(&holding, self.commitment)?;
        if existing.value.is_none() {
            let instruction = create_associated_token_account(
                &self.payer.pubkey(),
                owner,
                mint,
                &spl_token::id(),
            );
            let signature = self.submit(&[instruction], &[])?;
            self.confirm(&signature)?;
        }
        Ok(holding)
    }

    fn mint_to(
        &self,
        mint: &Pubkey,
        holding: &Pubkey,
        authority: &Pubkey,
        amount: u64,
    ) -> Result<Signature, LedgerError> {
        let instruction = spl_token::instruction::mint_to(
            &spl_token::id(),
            mint,
            holding,
            authority,
            &[],
            amount,
        )?;
        self.submit(&[instruction], &[])
    }

    fn set_authority(
        &self,
        mint: &Pubkey,
        current_authority: &Pubkey,
        kind: AuthorityKind,
        new_authority: Option<Pubkey>,
    ) -> Result<Signature, LedgerError> {
        let authority_type = match kind {
            AuthorityKind::Mint => AuthorityType::MintTokens,
            AuthorityKind::Freeze => AuthorityType::FreezeAccount,
        };
        let instruction = spl_token::instruction::set_authority(
            &spl_token::id(),
            mint,
            new_authority.as_ref(),
            authority_type,
            current_authority,
            &[],
        )?;
        self.submit(&[instruction], &[])
    }

    fn mint_authorities(&self, mint: &Pubkey) -> Result<MintAuthorities, LedgerError> {
        let account = self.client.get_account(mint)?;
        let state = Mint::unpack(&account.data)?;
        Ok(MintAuthorities {
            mint_authority: coption(state.mint_authority),
            freeze_authority: coption(state.freeze_authority),
        })
    }
}

fn coption(value: COption<Pubkey>) -> Option<Pubkey> {
    match value {
        COption::Some(key) => Some(key),
        COption::None => None,
    }
}
