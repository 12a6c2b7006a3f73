//! Vault-wide constants.
//!
//! Pallet account ids and the economic parameters shared by the share ledger, the
//! conversion engine and the revenue distributor. Runtimes wire these into pallet
//! configs so every component agrees on scaling.

/// Balance type alias for consistency across the vault
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts via
/// `PalletId::into_account_truncating()`.
pub mod pallet_ids {
  /// Share ledger: custody account for the pooled position
  pub const SHARE_LEDGER_PALLET_ID: &[u8; 8] = b"shrledgr";

  /// Conversion engine: transit account for swaps and deferred fees
  pub const CONVERSION_ENGINE_PALLET_ID: &[u8; 8] = b"convengn";

  /// Revenue distributor: protocol fee vault
  pub const REVENUE_DISTRIBUTOR_PALLET_ID: &[u8; 8] = b"revdistr";
}

pub mod params {
  use super::Balance;
  use sp_arithmetic::Permill;

  /// Precision scalar for prices and token amounts (10^12).
  pub const PRECISION: Balance = 1_000_000_000_000;

  /// Fixed-point scale of the ledger index (10^18).
  ///
  /// Wider than [`PRECISION`] so truncation on unit issuance stays far below one
  /// base unit of the pooled asset.
  pub const INDEX_PRECISION: Balance = 1_000_000_000_000_000_000;

  /// Units minted to the first depositor of an empty ledger ("100%").
  pub const BASE_UNITS: Balance = 100 * PRECISION;

  /// Consecutive index decreases tolerated before the next recompute is held.
  pub const STABILIZER_LIMIT: u32 = 2;

  /// Protocol fee charged on deposits and withdrawals (0.1%).
  pub const PROTOCOL_FEE: Permill = Permill::from_parts(1_000);

  /// Upper bound governance may set the protocol fee to (5%).
  pub const MAX_PROTOCOL_FEE: Permill = Permill::from_percent(5);

  /// Default slippage tolerance in basis points (1%).
  pub const DEFAULT_SLIPPAGE_BPS: u32 = 100;

  /// Basis point denominator.
  pub const MAX_SLIPPAGE_BPS: u32 = 10_000;

  /// Pooled-asset balance the fee vault keeps before sweeping revenue (10.0).
  pub const REVENUE_OPERATING_THRESHOLD: Balance = 10 * PRECISION;

  /// Blocks between automatic revenue sweeps (~10 minutes at 6s/block).
  pub const REVENUE_SWEEP_PERIOD: u64 = 100;

  /// Capacity of the conversion strategy list.
  pub const MAX_CONVERSION_STRATEGIES: u32 = 8;

  /// Capacity of the accepted-asset registry.
  pub const MAX_REGISTERED_ASSETS: u32 = 64;
}
