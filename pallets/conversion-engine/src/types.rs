use polkadot_sdk::frame_support::pallet_prelude::*;
use polkadot_sdk::sp_runtime::Permill;
use scale_info::prelude::vec::Vec;

pub use primitives::{AssetKind, Balance};

/// How a strategy moves value from the source asset to the target asset.
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
pub enum Route {
  /// No swap; only applicable when source and target coincide
  Passthrough,
  /// Single swap `source -> target`
  Direct,
  /// Two swaps `source -> base -> target`
  ViaBase,
}

/// One entry of the ordered fallback list.
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
pub struct ConversionStrategy {
  pub route: Route,
  /// Share of the original request this strategy may consume
  pub share: Permill,
  /// Multiplier applied to the caller's slippage tolerance
  pub slippage_multiplier: u32,
}

impl ConversionStrategy {
  pub const fn new(route: Route, share: Permill, slippage_multiplier: u32) -> Self {
    Self {
      route,
      share,
      slippage_multiplier,
    }
  }
}

/// The stock strategy list: passthrough, then the full amount directly and via the
/// base asset at the caller's tolerance, then two halves at doubled tolerance.
pub fn default_strategies() -> Vec<ConversionStrategy> {
  scale_info::prelude::vec![
    ConversionStrategy::new(Route::Passthrough, Permill::from_percent(100), 1),
    ConversionStrategy::new(Route::Direct, Permill::from_percent(100), 1),
    ConversionStrategy::new(Route::ViaBase, Permill::from_percent(100), 1),
    ConversionStrategy::new(Route::Direct, Permill::from_percent(50), 2),
    ConversionStrategy::new(Route::Direct, Permill::from_percent(50), 2),
  ]
}

/// Where the engine delivers the results of a conversion.
#[derive(Clone, Eq, PartialEq, RuntimeDebug)]
pub struct Recipients<AccountId> {
  /// Receives the target asset
  pub output: AccountId,
  /// Receives whatever could not be converted
  pub remainder: AccountId,
}

impl<AccountId: Clone> Recipients<AccountId> {
  /// Output and remainder both go to `who`.
  pub fn single(who: &AccountId) -> Self {
    Self {
      output: who.clone(),
      remainder: who.clone(),
    }
  }
}

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
pub enum AttemptOutcome {
  /// The strategy delivered `amount_out` of the target asset
  Converted { amount_out: Balance },
  /// First leg of a two-leg route succeeded, the second failed
  Stranded { base_amount: Balance },
  /// Nothing was swapped; all state changes of the attempt were rolled back
  Failed,
}

/// Trace of a single strategy attempt. Not persisted.
#[derive(Clone, Copy, Eq, PartialEq, RuntimeDebug)]
pub struct AttemptRecord {
  /// Position of the strategy in the list
  pub strategy: u32,
  pub amount_in: Balance,
  /// Minimum output enforced on the last leg that was tried
  pub min_out: Balance,
  pub outcome: AttemptOutcome,
}

/// Which path ultimately settled a conversion request.
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
pub enum Settlement {
  /// The strategy at this index completed the request
  Strategy(u32),
  /// Strategies up to this index converted part of the request; the rest went
  /// through the last-resort path
  Partial(u32),
  /// No strategy converted anything; the principal was returned unconverted
  LastResort,
}

/// Result of a conversion request.
#[derive(Clone, Eq, PartialEq, RuntimeDebug)]
pub struct ConversionOutcome {
  pub target: AssetKind,
  /// Amount of `target` delivered to the output recipient
  pub target_amount: Balance,
  /// Unconverted amounts delivered to the remainder recipient
  pub remainder: Vec<(AssetKind, Balance)>,
  pub settled_by: Settlement,
  pub attempts: Vec<AttemptRecord>,
}

impl ConversionOutcome {
  /// Unconverted amount left in `asset`.
  pub fn remainder_of(&self, asset: AssetKind) -> Balance {
    self
      .remainder
      .iter()
      .filter(|(a, _)| *a == asset)
      .fold(0, |acc, (_, amount)| acc.saturating_add(*amount))
  }
}

/// Swap executor. Must revert (return `Err` without side effects) when the
/// realized output is below `min_amount_out`.
pub trait AssetConversionApi<AccountId, Balance> {
  fn swap_exact_tokens_for_tokens(
    who: &AccountId,
    path: Vec<AssetKind>,
    amount_in: Balance,
    min_amount_out: Balance,
  ) -> Result<Balance, DispatchError>;
}

/// Price source used to bound slippage.
pub trait PriceOracle<Balance> {
  /// Amount of `asset_to` per unit of `asset_from`, scaled by the engine's precision.
  fn get_price(asset_from: AssetKind, asset_to: AssetKind) -> Option<Balance>;
}

/// Conversion capability exposed to the share ledger and the revenue distributor.
pub trait ConversionApi<AccountId> {
  /// Transit account that holds funds while they are converted.
  fn engine_account() -> AccountId;

  /// The asset the vault pools value in.
  fn pooled_asset() -> AssetKind;

  /// The intermediate asset two-leg routes go through.
  fn base_asset() -> AssetKind;

  /// Pull `amount_in` of `source` from `payer` and convert it into `target`.
  ///
  /// Fails only on invalid input or when `payer` cannot fund the request; an
  /// unconvertible amount is settled through the last-resort path.
  fn convert(
    payer: &AccountId,
    amount_in: Balance,
    source: AssetKind,
    target: AssetKind,
    slippage_bps: u32,
    recipients: Recipients<AccountId>,
  ) -> Result<ConversionOutcome, DispatchError>;

  /// Convert a protocol fee into the pooled asset and credit it to the fee vault.
  /// Returns the pooled amount credited; the rest is deferred.
  fn deposit_fee(
    payer: &AccountId,
    asset: AssetKind,
    amount: Balance,
    slippage_bps: u32,
  ) -> Result<Balance, DispatchError>;

  /// Retry deferred fees held in `asset`. Returns the amount converted.
  fn flush_pending_fees(asset: AssetKind, slippage_bps: u32) -> Result<Balance, DispatchError>;
}

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  fn fund(who: &AccountId, asset: AssetKind, amount: Balance) -> DispatchResult;
}
