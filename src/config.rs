use serde::Deserialize;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

use crate::error::LaunchError;

/// Wallet that collects service fees. Overridable through the config file,
/// never through the UI.
pub const DEFAULT_TREASURY: Pubkey = pubkey!("7hwrchSPCuBF6yGtFPx3f4g8Y5ymrkCPUoMDao39M4eZ");

/// 0.1 SOL per token creation.
pub const DEFAULT_MINT_FEE_LAMPORTS: u64 = 100_000_000;

/// 0.05 SOL per authority removal.
pub const DEFAULT_AUTHORITY_REMOVAL_FEE_LAMPORTS: u64 = 50_000_000;

/// SPL token mints support at most 9 decimal places.
pub const MAX_DECIMALS: u8 = 9;

/// Fixed service fees in lamports. Read-only after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub mint_fee_lamports: u64,
    pub authority_removal_fee_lamports: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            mint_fee_lamports: DEFAULT_MINT_FEE_LAMPORTS,
            authority_removal_fee_lamports: DEFAULT_AUTHORITY_REMOVAL_FEE_LAMPORTS,
        }
    }
}

/// Process-wide constants for the orchestration layer, built once at startup
/// and passed explicitly into the facade.
#[derive(Debug, Clone, Copy)]
pub struct LaunchConfig {
    pub treasury: Pubkey,
    pub fees: FeeSchedule,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            treasury: DEFAULT_TREASURY,
            fees: FeeSchedule::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LaunchConfigFile {
    treasury: Option<String>,
    fees: Option<FeeOverrides>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FeeOverrides {
    mint_lamports: Option<u64>,
    authority_removal_lamports: Option<u64>,
}

impl LaunchConfig {
    /// Parse a TOML config file and layer it over the defaults.
    pub fn from_toml(contents: &str) -> Result<Self, LaunchError> {
        let file: LaunchConfigFile = toml::from_str(contents)
            .map_err(|err| LaunchError::Validation(format!("invalid config file: {err}")))?;

        let mut config = Self::default();
        if let Some(treasury) = file.treasury.as_deref() {
            config.treasury = treasury
                .parse()
                .map_err(|_| LaunchError::Validation(format!("invalid treasury address: {treasury}")))?;
        }
        if let Some(fees) = file.fees {
            if let Some(value) = fees.mint_lamports {
                config.fees.mint_fee_lamports = value;
            }
            if let Some(value) = fees.authority_removal_lamports {
                config.fees.authority_removal_fee_lamports = value;
            }
        }
        Ok(config)
    }
}
