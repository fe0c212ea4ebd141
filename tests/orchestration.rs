use std::cell::RefCell;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use token_launchpad::{
    AuthorityClear, AuthorityKind, IssueRequest, Launchpad, LaunchConfig, LaunchError,
    LedgerClient, LedgerError, MintAuthorities, Silent, Stage,
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum FeeMode {
    Confirm,
    Timeout,
    Reject,
    Decline,
}

/// Scripted in-memory ledger. Records every call so tests can assert which
/// operations were (or were not) attempted, and tracks mint authority state
/// across calls.
struct MockLedger {
    payer: Pubkey,
    fee_mode: FeeMode,
    fail_create_mint: bool,
    fail_clear_mint: bool,
    fail_clear_freeze: bool,
    authorities: RefCell<MintAuthorities>,
    calls: RefCell<Vec<String>>,
    fee_signature: RefCell<Option<Signature>>,
    fee_transfers: RefCell<Vec<(Pubkey, Pubkey, u64)>>,
    minted: RefCell<Vec<(Pubkey, Pubkey, u64)>>,
    created: RefCell<Vec<(Pubkey, Pubkey, u8)>>,
}

impl MockLedger {
    fn new(payer: Pubkey) -> Self {
        Self {
            payer,
            fee_mode: FeeMode::Confirm,
            fail_create_mint: false,
            fail_clear_mint: false,
            fail_clear_freeze: false,
            authorities: RefCell::new(MintAuthorities {
                mint_authority: Some(payer),
                freeze_authority: Some(payer),
            }),
            calls: RefCell::new(Vec::new()),
            fee_signature: RefCell::new(None),
            fee_transfers: RefCell::new(Vec::new()),
            minted: RefCell::new(Vec::new()),
            created: RefCell::new(Vec::new()),
        }
    }

    fn with_fee_mode(mut self, mode: FeeMode) -> Self {
        self.fee_mode = mode;
        self
    }

    fn with_authorities(self, mint: Option<Pubkey>, freeze: Option<Pubkey>) -> Self {
        *self.authorities.borrow_mut() = MintAuthorities {
            mint_authority: mint,
            freeze_authority: freeze,
        };
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn privileged_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("transfer") && !call.starts_with("confirm"))
            .collect()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn failed(reason: &str) -> LedgerError {
        LedgerError::TransactionFailed {
            signature: Signature::new_unique(),
            reason: reason.to_string(),
        }
    }
}

impl LedgerClient for MockLedger {
    fn payer(&self) -> Pubkey {
        self.payer
    }

    fn transfer(&self, from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<Signature, LedgerError> {
        self.record("transfer");
        if self.fee_mode == FeeMode::Decline {
            return Err(LedgerError::SigningDeclined);
        }
        self.fee_transfers.borrow_mut().push((*from, *to, lamports));
        let signature = Signature::new_unique();
        *self.fee_signature.borrow_mut() = Some(signature);
        Ok(signature)
    }

    fn confirm(&self, signature: &Signature) -> Result<(), LedgerError> {
        self.record("confirm");
        if *self.fee_signature.borrow() == Some(*signature) {
            match self.fee_mode {
                FeeMode::Timeout => {
                    return Err(LedgerError::ConfirmationTimeout {
                        signature: *signature,
                        waited: Duration::from_secs(60),
                    })
                }
                FeeMode::Reject => {
                    return Err(Self::failed("insufficient funds for transfer"));
                }
                FeeMode::Confirm | FeeMode::Decline => {}
            }
        }
        Ok(())
    }

    fn create_mint(
        &self,
        authority: &Pubkey,
        freeze_authority: &Pubkey,
        decimals: u8,
    ) -> Result<Pubkey, LedgerError> {
        self.record("create_mint");
        if self.fail_create_mint {
            return Err(Self::failed("mint account creation rejected"));
        }
        self.created
            .borrow_mut()
            .push((*authority, *freeze_authority, decimals));
        *self.authorities.borrow_mut() = MintAuthorities {
            mint_authority: Some(*authority),
            freeze_authority: Some(*freeze_authority),
        };
        Ok(Pubkey::new_unique())
    }

    fn get_or_create_holding(&self, _owner: &Pubkey, _mint: &Pubkey) -> Result<Pubkey, LedgerError> {
        self.record("get_or_create_holding");
        Ok(Pubkey::new_unique())
    }

    fn mint_to(
        &self,
        mint: &Pubkey,
        holding: &Pubkey,
        _authority: &Pubkey,
        amount: u64,
    ) -> Result<Signature, LedgerError> {
        self.record("mint_to");
        self.minted.borrow_mut().push((*mint, *holding, amount));
        Ok(Signature::new_unique())
    }

    fn set_authority(
        &self,
        _mint: &Pubkey,
        _current_authority: &Pubkey,
        kind: AuthorityKind,
        new_authority: Option<Pubkey>,
    ) -> Result<Signature, LedgerError> {
        match kind {
            AuthorityKind::Mint => {
                self.record("set_authority:mint");
                if self.fail_clear_mint {
                    return Err(Self::failed("mint authority change rejected"));
                }
                self.authorities.borrow_mut().mint_authority = new_authority;
            }
            AuthorityKind::Freeze => {
                self.record("set_authority:freeze");
                if self.fail_clear_freeze {
                    return Err(Self::failed("freeze authority change rejected"));
                }
                self.authorities.borrow_mut().freeze_authority = new_authority;
            }
        }
        Ok(Signature::new_unique())
    }

    fn mint_authorities(&self, _mint: &Pubkey) -> Result<MintAuthorities, LedgerError> {
        self.record("mint_authorities");
        Ok(*self.authorities.borrow())
    }
}

fn launchpad(ledger: MockLedger) -> Launchpad<MockLedger> {
    Launchpad::new(ledger, LaunchConfig::default())
}

#[test]
fn issue_mints_scaled_supply_with_payer_as_authority() {
    let payer = Pubkey::new_unique();
    let pad = launchpad(MockLedger::new(payer));

    let receipt = pad
        .issue_token(
            &IssueRequest {
                decimals: 9,
                supply: 1_000_000_000,
            },
            &Silent,
        )
        .unwrap();

    assert_eq!(receipt.initial_supply, 1_000_000_000_000_000_000);
    assert_eq!(receipt.decimals, 9);

    let ledger = pad.ledger();
    let created = ledger.created.borrow();
    assert_eq!(created.as_slice(), &[(payer, payer, 9)]);

    let minted = ledger.minted.borrow();
    assert_eq!(minted.len(), 1);
    assert_eq!(minted[0].0, receipt.mint);
    assert_eq!(minted[0].1, receipt.holding);
    assert_eq!(minted[0].2, 1_000_000_000_000_000_000);

    let authorities = ledger.authorities.borrow();
    assert_eq!(authorities.mint_authority, Some(payer));
    assert_eq!(authorities.freeze_authority, Some(payer));
}

#[test]
fn issue_charges_the_mint_fee_to_the_treasury() {
    let payer = Pubkey::new_unique();
    let pad = launchpad(MockLedger::new(payer));

    pad.issue_token(
        &IssueRequest {
            decimals: 6,
            supply: 500,
        },
        &Silent,
    )
    .unwrap();

    let transfers = pad.ledger().fee_transfers.borrow();
    assert_eq!(transfers.len(), 1);
    let (from, to, lamports) = transfers[0];
    assert_eq!(from, payer);
    assert_eq!(to, pad.config().treasury);
    assert_eq!(lamports, pad.config().fees.mint_fee_lamports);
}

#[test]
fn fee_timeout_prevents_all_privileged_calls() {
    let pad = launchpad(MockLedger::new(Pubkey::new_unique()).with_fee_mode(FeeMode::Timeout));

    let err = pad
        .issue_token(
            &IssueRequest {
                decimals: 2,
                supply: 10,
            },
            &Silent,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        LaunchError::FeePayment(LedgerError::ConfirmationTimeout { .. })
    ));
    assert_eq!(err.stage(), Some(Stage::FeePayment));
    assert!(pad.ledger().privileged_calls().is_empty());
}

#[test]
fn fee_rejection_prevents_mint_creation() {
    let pad = launchpad(MockLedger::new(Pubkey::new_unique()).with_fee_mode(FeeMode::Reject));

    let err = pad
        .issue_token(
            &IssueRequest {
                decimals: 0,
                supply: 1,
            },
            &Silent,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        LaunchError::FeePayment(LedgerError::TransactionFailed { .. })
    ));
    assert!(pad.ledger().privileged_calls().is_empty());
}

#[test]
fn declined_fee_signing_terminates_with_no_side_effects() {
    let pad = launchpad(MockLedger::new(Pubkey::new_unique()).with_fee_mode(FeeMode::Decline));

    let err = pad
        .revoke_authorities(&Pubkey::new_unique().to_string(), &Silent)
        .unwrap_err();

    assert!(matches!(
        err,
        LaunchError::FeePayment(LedgerError::SigningDeclined)
    ));
    let ledger = pad.ledger();
    assert!(ledger.fee_transfers.borrow().is_empty());
    assert!(ledger.privileged_calls().is_empty());
}

#[test]
fn decimals_above_nine_rejected_before_any_ledger_traffic() {
    let pad = launchpad(MockLedger::new(Pubkey::new_unique()));

    let err = pad
        .issue_token(
            &IssueRequest {
                decimals: 10,
                supply: 1,
            },
            &Silent,
        )
        .unwrap_err();

    assert!(matches!(err, LaunchError::Validation(_)));
    assert!(pad.ledger().calls().is_empty());
}

#[test]
fn zero_supply_rejected_before_any_ledger_traffic() {
    let pad = launchpad(MockLedger::new(Pubkey::new_unique()));

    let err = pad
        .issue_token(
            &IssueRequest {
                decimals: 9,
                supply: 0,
            },
            &Silent,
        )
        .unwrap_err();

    assert!(matches!(err, LaunchError::Validation(_)));
    assert!(pad.ledger().calls().is_empty());
}

#[test]
fn supply_overflow_rejected_before_any_ledger_traffic() {
    let pad = launchpad(MockLedger::new(Pubkey::new_unique()));

    let err = pad
        .issue_token(
            &IssueRequest {
                decimals: 9,
                supply: u64::MAX,
            },
            &Silent,
        )
        .unwrap_err();

    assert!(matches!(err, LaunchError::Validation(_)));
    assert!(pad.ledger().calls().is_empty());
}

#[test]
fn create_mint_failure_reports_stage_and_keeps_fee() {
    let mut ledger = MockLedger::new(Pubkey::new_unique());
    ledger.fail_create_mint = true;
    let pad = launchpad(ledger);

    let err = pad
        .issue_token(
            &IssueRequest {
                decimals: 9,
                supply: 100,
            },
            &Silent,
        )
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::MintCreation));
    let ledger = pad.ledger();
    // Fee was charged and stays charged; supply minting never started.
    assert_eq!(ledger.fee_transfers.borrow().len(), 1);
    assert!(!ledger.calls().iter().any(|call| call == "mint_to"));
}

#[test]
fn revoke_clears_mint_then_freeze() {
    let payer = Pubkey::new_unique();
    let pad = launchpad(MockLedger::new(payer));

    let receipt = pad
        .revoke_authorities(&Pubkey::new_unique().to_string(), &Silent)
        .unwrap();

    assert!(matches!(receipt.mint_authority, AuthorityClear::Cleared(_)));
    assert!(matches!(receipt.freeze_authority, AuthorityClear::Cleared(_)));

    let ledger = pad.ledger();
    let order: Vec<String> = ledger
        .calls()
        .into_iter()
        .filter(|call| call.starts_with("set_authority"))
        .collect();
    assert_eq!(order, vec!["set_authority:mint", "set_authority:freeze"]);

    let authorities = ledger.authorities.borrow();
    assert_eq!(authorities.mint_authority, None);
    assert_eq!(authorities.freeze_authority, None);
}

#[test]
fn revoke_on_fully_revoked_mint_is_a_successful_noop() {
    let payer = Pubkey::new_unique();
    let pad = launchpad(MockLedger::new(payer).with_authorities(None, None));

    let receipt = pad
        .revoke_authorities(&Pubkey::new_unique().to_string(), &Silent)
        .unwrap();

    assert_eq!(receipt.mint_authority, AuthorityClear::AlreadyClear);
    assert_eq!(receipt.freeze_authority, AuthorityClear::AlreadyClear);
    assert!(!pad
        .ledger()
        .calls()
        .iter()
        .any(|call| call.starts_with("set_authority")));
}

#[test]
fn freeze_clear_failure_is_partial_success_not_rolled_back() {
    let payer = Pubkey::new_unique();
    let mut ledger = MockLedger::new(payer);
    ledger.fail_clear_freeze = true;
    let pad = launchpad(ledger);

    let err = pad
        .revoke_authorities(&Pubkey::new_unique().to_string(), &Silent)
        .unwrap_err();

    assert!(err.is_partial());
    assert_eq!(err.stage(), Some(Stage::AuthorityClearFreeze));

    // The mint authority clear stands.
    let authorities = pad.ledger().authorities.borrow();
    assert_eq!(authorities.mint_authority, None);
    assert_eq!(authorities.freeze_authority, Some(payer));
}

#[test]
fn reattempt_after_partial_failure_only_touches_freeze() {
    let payer = Pubkey::new_unique();
    let pad = launchpad(MockLedger::new(payer).with_authorities(None, Some(payer)));

    let receipt = pad
        .revoke_authorities(&Pubkey::new_unique().to_string(), &Silent)
        .unwrap();

    assert_eq!(receipt.mint_authority, AuthorityClear::AlreadyClear);
    assert!(matches!(receipt.freeze_authority, AuthorityClear::Cleared(_)));

    let order: Vec<String> = pad
        .ledger()
        .calls()
        .into_iter()
        .filter(|call| call.starts_with("set_authority"))
        .collect();
    assert_eq!(order, vec!["set_authority:freeze"]);
}

#[test]
fn mint_clear_failure_with_live_freeze_is_a_plain_action_failure() {
    let payer = Pubkey::new_unique();
    let mut ledger = MockLedger::new(payer);
    ledger.fail_clear_mint = true;
    let pad = launchpad(ledger);

    let err = pad
        .revoke_authorities(&Pubkey::new_unique().to_string(), &Silent)
        .unwrap_err();

    assert!(!err.is_partial());
    assert_eq!(err.stage(), Some(Stage::AuthorityClearMint));
    // Freeze clear must not have been attempted.
    assert!(!pad
        .ledger()
        .calls()
        .iter()
        .any(|call| call == "set_authority:freeze"));
}

#[test]
fn mint_clear_failure_with_cleared_freeze_is_partial() {
    let payer = Pubkey::new_unique();
    let mut ledger = MockLedger::new(payer).with_authorities(Some(payer), None);
    ledger.fail_clear_mint = true;
    let pad = launchpad(ledger);

    let err = pad
        .revoke_authorities(&Pubkey::new_unique().to_string(), &Silent)
        .unwrap_err();

    assert!(err.is_partial());
    assert_eq!(err.stage(), Some(Stage::AuthorityClearMint));
}

#[test]
fn unparsable_mint_address_never_reaches_the_ledger() {
    let pad = launchpad(MockLedger::new(Pubkey::new_unique()));

    let err = pad
        .revoke_authorities("not-a-mint-address", &Silent)
        .unwrap_err();

    assert!(matches!(err, LaunchError::Validation(_)));
    assert!(pad.ledger().calls().is_empty());
}

#[test]
fn revoke_charges_the_removal_fee() {
    let payer = Pubkey::new_unique();
    let pad = launchpad(MockLedger::new(payer));

    pad.revoke_authorities(&Pubkey::new_unique().to_string(), &Silent)
        .unwrap();

    let transfers = pad.ledger().fee_transfers.borrow();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].1, pad.config().treasury);
    assert_eq!(
        transfers[0].2,
        pad.config().fees.authority_removal_fee_lamports
    );
}
