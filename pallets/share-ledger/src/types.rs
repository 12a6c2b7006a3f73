use polkadot_sdk::frame_support::pallet_prelude::*;

pub use primitives::{AssetKind, Balance};

/// Guard against runs of index decreases.
#[derive(
  Clone,
  Copy,
  Default,
  Encode,
  Decode,
  DecodeWithMemTracking,
  Eq,
  PartialEq,
  RuntimeDebug,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct StabilizerState {
  /// Recomputes in a row that lowered the index
  pub consecutive_decreases: u32,
  /// The next recompute is held
  pub guard_active: bool,
}

/// Pool-wide aggregate. Mutated only through the ledger operations.
#[derive(
  Clone,
  Copy,
  Default,
  Encode,
  Decode,
  DecodeWithMemTracking,
  Eq,
  PartialEq,
  RuntimeDebug,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct LedgerState {
  /// Sum of all account units
  pub total_units: Balance,
  /// Value of the pooled position, in pooled-asset base units
  pub total_pooled_value: Balance,
  /// Pooled value per unit, scaled by `INDEX_PRECISION`
  pub index: Balance,
  pub stabilizer: StabilizerState,
}

/// Externally triggered operations guarded against re-entry.
#[derive(
  Clone,
  Copy,
  Encode,
  Decode,
  DecodeWithMemTracking,
  Eq,
  PartialEq,
  RuntimeDebug,
  TypeInfo,
  MaxEncodedLen,
)]
pub enum OperationKind {
  Deposit,
  Withdraw,
}

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  fn fund(who: &AccountId, asset: AssetKind, amount: Balance) -> DispatchResult;
}
