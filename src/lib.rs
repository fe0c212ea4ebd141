//! Fee-gated Solana token lifecycle operations.
//!
//! Two flows, each a sequential chain of submitted-and-confirmed
//! transactions behind a fixed service fee: creating a new SPL mint with an
//! initial supply, and permanently stripping a mint's mint and freeze
//! authorities. The chain is consumed through the [`ledger::LedgerClient`]
//! capability; [`rpc::RpcLedgerClient`] is the JSON-RPC implementation.

pub mod config;
pub mod error;
pub mod ledger;
pub mod ops;
pub mod rpc;

pub use config::{FeeSchedule, LaunchConfig};
pub use error::{LaunchError, Stage};
pub use ledger::{
    AuthorityKind, ConfirmationState, LedgerClient, LedgerError, MintAuthorities,
    TransactionOutcome,
};
pub use ops::{AuthorityClear, IssueReceipt, IssueRequest, Launchpad, Progress, RevokeReceipt, Silent};
