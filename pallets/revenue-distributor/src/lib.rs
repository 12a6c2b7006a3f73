//! Revenue Distributor Pallet
//!
//! Owns the protocol fee vault. Converted protocol fees accumulate here in the
//! pooled asset; everything above the operating threshold is periodically
//! routed through the conversion engine to the revenue recipient.
//!
//! Sweeps run from `on_idle` every `SweepPeriod` blocks, or on demand through
//! [`Pallet::sweep_fees`]. A sweep never fails because of a conversion
//! shortfall: whatever the engine cannot convert reaches the recipient in the
//! pooled (or base) asset.

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

pub(crate) const LOG_TARGET: &str = "runtime::revenue-distributor";

#[frame::pallet]
pub mod pallet {
  use super::WeightInfo;
  use frame::deps::{
    frame_support::{
      storage::with_storage_layer,
      traits::{fungible::Inspect as NativeInspect, fungibles::Inspect as FungiblesInspect},
    },
    sp_runtime::{
      DispatchError,
      traits::{AccountIdConversion, Saturating, Zero},
    },
  };
  use frame::prelude::*;
  use pallet_conversion_engine::{ConversionApi, ConversionOutcome, Recipients, Settlement};
  use primitives::{AssetInspector, AssetKind, Balance};

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Conversion engine used to pay revenue out in the configured asset
    type Conversion: ConversionApi<Self::AccountId>;

    /// Fungible assets held in pallet-assets
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// Native currency
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>;

    /// The pallet ID of the fee vault
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Payout asset until governance sets one
    #[pallet::constant]
    type DefaultRevenueAsset: Get<AssetKind>;

    /// Pooled-asset balance kept in the vault until governance sets one
    #[pallet::constant]
    type DefaultOperatingThreshold: Get<Balance>;

    /// Blocks between automatic sweeps
    #[pallet::constant]
    type SweepPeriod: Get<BlockNumberFor<Self>>;

    /// Slippage tolerance for sweep conversions
    #[pallet::constant]
    type DefaultSlippageBps: Get<u32>;

    /// Origin for configuration
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: pallet_conversion_engine::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  #[pallet::type_value]
  pub fn DefaultAsset<T: Config>() -> AssetKind {
    T::DefaultRevenueAsset::get()
  }

  #[pallet::type_value]
  pub fn DefaultThreshold<T: Config>() -> Balance {
    T::DefaultOperatingThreshold::get()
  }

  /// Account receiving swept revenue. Sweeps are skipped while unset.
  #[pallet::storage]
  #[pallet::getter(fn revenue_recipient)]
  pub type RevenueRecipient<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  #[pallet::storage]
  #[pallet::getter(fn revenue_asset)]
  pub type RevenueAsset<T: Config> = StorageValue<_, AssetKind, ValueQuery, DefaultAsset<T>>;

  #[pallet::storage]
  #[pallet::getter(fn operating_threshold)]
  pub type OperatingThreshold<T: Config> =
    StorageValue<_, Balance, ValueQuery, DefaultThreshold<T>>;

  /// Pooled-asset amount swept out of the vault so far
  #[pallet::storage]
  #[pallet::getter(fn total_distributed)]
  pub type TotalDistributed<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Block of the last sweep attempt
  #[pallet::storage]
  #[pallet::getter(fn last_sweep)]
  pub type LastSweep<T: Config> = StorageValue<_, BlockNumberFor<T>, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Vault balance above the threshold was paid out
    RevenueDistributed {
      recipient: T::AccountId,
      pooled_amount: Balance,
      asset: AssetKind,
      amount_out: Balance,
      settled_by: Settlement,
    },
    RevenueRecipientSet { who: T::AccountId },
    RevenueAssetSet { asset: AssetKind },
    OperatingThresholdSet { threshold: Balance },
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn on_idle(n: BlockNumberFor<T>, remaining_weight: Weight) -> Weight {
      let sweep_weight = T::WeightInfo::sweep_fees();
      if n.saturating_sub(LastSweep::<T>::get()) < T::SweepPeriod::get()
        || !remaining_weight.all_gte(sweep_weight)
      {
        return Weight::zero();
      }
      Self::do_sweep();
      sweep_weight
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Pay out the vault balance above the operating threshold. Callable by anyone.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::sweep_fees())]
    pub fn sweep_fees(origin: OriginFor<T>) -> DispatchResult {
      ensure_signed(origin)?;
      Self::do_sweep();
      Ok(())
    }

    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::set_revenue_recipient())]
    pub fn set_revenue_recipient(origin: OriginFor<T>, who: T::AccountId) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      RevenueRecipient::<T>::put(&who);
      Self::deposit_event(Event::RevenueRecipientSet { who });
      Ok(())
    }

    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::set_revenue_asset())]
    pub fn set_revenue_asset(origin: OriginFor<T>, asset: AssetKind) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      RevenueAsset::<T>::put(asset);
      Self::deposit_event(Event::RevenueAssetSet { asset });
      Ok(())
    }

    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::set_operating_threshold())]
    pub fn set_operating_threshold(origin: OriginFor<T>, threshold: Balance) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      OperatingThreshold::<T>::put(threshold);
      Self::deposit_event(Event::OperatingThresholdSet { threshold });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// The fee vault
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn balance_of(asset: AssetKind, who: &T::AccountId) -> Balance {
      match asset.asset_id() {
        None => T::Currency::balance(who),
        Some(id) => T::Assets::balance(id, who),
      }
    }

    /// Vault balance above the operating threshold
    pub fn sweepable() -> Balance {
      let pooled = T::Conversion::pooled_asset();
      Self::balance_of(pooled, &Self::account_id()).saturating_sub(OperatingThreshold::<T>::get())
    }

    /// Returns the pooled amount paid out. Failures are logged, never propagated.
    pub(crate) fn do_sweep() -> Balance {
      LastSweep::<T>::put(frame_system::Pallet::<T>::block_number());
      let Some(recipient) = RevenueRecipient::<T>::get() else {
        log::debug!(target: crate::LOG_TARGET, "no revenue recipient, skipping sweep");
        return Zero::zero();
      };
      let amount = Self::sweepable();
      if amount.is_zero() {
        return Zero::zero();
      }

      let vault = Self::account_id();
      let pooled = T::Conversion::pooled_asset();
      let asset = RevenueAsset::<T>::get();
      let result = with_storage_layer(|| -> Result<ConversionOutcome, DispatchError> {
        T::Conversion::convert(
          &vault,
          amount,
          pooled,
          asset,
          T::DefaultSlippageBps::get(),
          Recipients::single(&recipient),
        )
      });
      match result {
        Ok(outcome) => {
          TotalDistributed::<T>::mutate(|total| *total = total.saturating_add(amount));
          Self::deposit_event(Event::RevenueDistributed {
            recipient,
            pooled_amount: amount,
            asset,
            amount_out: outcome.target_amount,
            settled_by: outcome.settled_by,
          });
          amount
        }
        Err(e) => {
          log::warn!(
            target: crate::LOG_TARGET,
            "revenue sweep of {} failed: {:?}",
            amount,
            e
          );
          Zero::zero()
        }
      }
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    pub revenue_recipient: Option<T::AccountId>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
      if let Some(who) = &self.revenue_recipient {
        RevenueRecipient::<T>::put(who);
      }
    }
  }
}
