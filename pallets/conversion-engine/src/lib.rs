//! Conversion Engine Pallet
//!
//! Converts between heterogeneous assets by walking an ordered list of
//! strategies over an external swap executor. Every attempt runs in its own
//! storage layer, so a failed swap leaves no trace. Whatever no strategy manages
//! to convert is handed back unconverted (the last-resort path) instead of
//! failing the caller's operation.
//!
//! The engine also owns the deferred-fee store: protocol fees that could not be
//! converted into the pooled asset stay on the engine account and are retried
//! before later ledger operations.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod types;
pub use types::*;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

pub(crate) const LOG_TARGET: &str = "runtime::conversion-engine";

#[frame::pallet]
pub mod pallet {
  use super::WeightInfo;
  use crate::types::*;
  use alloc::{vec, vec::Vec};
  use frame::deps::{
    frame_support::{
      storage::with_storage_layer,
      traits::{
        fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
        fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
        tokens::Preservation,
      },
    },
    sp_runtime::{
      DispatchError, Permill,
      traits::{AccountIdConversion, Zero},
    },
  };
  use frame::prelude::*;
  use primitives::{AssetInspector, ecosystem::params::MAX_SLIPPAGE_BPS, math::mul_div_floor};

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Fungible assets held in pallet-assets (`AssetKind::Local` / `AssetKind::Foreign`)
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// Native currency (`AssetKind::Native`)
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;

    /// Swap executor
    type AssetConversion: AssetConversionApi<Self::AccountId, Balance>;

    /// Price source for slippage bounds
    type PriceOracle: PriceOracle<Balance>;

    /// The pallet ID of the engine's transit account
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// The asset the vault pools value in; fees are collected in it
    #[pallet::constant]
    type PooledAsset: Get<AssetKind>;

    /// Intermediate asset for two-leg routes
    #[pallet::constant]
    type BaseAsset: Get<AssetKind>;

    /// Account credited with converted protocol fees
    type FeeDestination: Get<Self::AccountId>;

    /// Scale of oracle prices
    #[pallet::constant]
    type Precision: Get<Balance>;

    /// Slippage tolerance used when governance retries deferred fees
    #[pallet::constant]
    type DefaultSlippageBps: Get<u32>;

    /// Capacity of the strategy list
    #[pallet::constant]
    type MaxStrategies: Get<u32>;

    /// Origin that can reconfigure strategies and force fee retries
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  #[pallet::type_value]
  pub fn DefaultStrategyList<T: Config>() -> BoundedVec<ConversionStrategy, T::MaxStrategies> {
    BoundedVec::truncate_from(default_strategies())
  }

  /// Ordered fallback list of conversion strategies
  #[pallet::storage]
  #[pallet::getter(fn strategies)]
  pub type Strategies<T: Config> = StorageValue<
    _,
    BoundedVec<ConversionStrategy, T::MaxStrategies>,
    ValueQuery,
    DefaultStrategyList<T>,
  >;

  /// Protocol fees held unconverted on the engine account, keyed by the asset they are held in
  #[pallet::storage]
  #[pallet::getter(fn pending_fees)]
  pub type PendingFees<T: Config> =
    StorageMap<_, Blake2_128Concat, AssetKind, Balance, ValueQuery>;

  /// Pooled-asset amount credited to the fee destination so far
  #[pallet::storage]
  #[pallet::getter(fn total_fees_collected)]
  pub type TotalFeesCollected<T: Config> = StorageValue<_, Balance, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Strategy list replaced by governance
    StrategiesUpdated { count: u32 },
    /// A strategy attempt was rolled back
    AttemptFailed {
      strategy: u32,
      amount_in: Balance,
      min_out: Balance,
    },
    /// A conversion request finished
    ConversionSettled {
      source: AssetKind,
      target: AssetKind,
      amount_in: Balance,
      target_amount: Balance,
      settled_by: Settlement,
    },
    /// Unconverted value handed back through the last-resort path
    LastResortDelivered {
      asset: AssetKind,
      amount: Balance,
      recipient: T::AccountId,
    },
    /// A protocol fee was charged
    FeeCollected {
      asset: AssetKind,
      amount: Balance,
      pooled_credited: Balance,
      deferred: Balance,
    },
    /// Deferred fees were retried
    PendingFeesFlushed {
      asset: AssetKind,
      converted: Balance,
      remaining: Balance,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Amount must be greater than zero
    ZeroAmount,
    /// Slippage tolerance must be greater than zero
    ZeroSlippage,
    /// Strategy list must not be empty
    EmptyStrategySet,
    /// Strategy list exceeds capacity
    TooManyStrategies,
    /// Strategy with zero share or zero slippage multiplier
    InvalidStrategy,
    /// Swap output below the enforced minimum
    SlippageExceeded,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Replace the strategy list (governance only)
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::set_strategies(strategies.len() as u32))]
    pub fn set_strategies(
      origin: OriginFor<T>,
      strategies: Vec<ConversionStrategy>,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(!strategies.is_empty(), Error::<T>::EmptyStrategySet);
      ensure!(
        strategies
          .iter()
          .all(|s| s.share > Permill::from_parts(0) && !s.slippage_multiplier.is_zero()),
        Error::<T>::InvalidStrategy
      );
      let bounded: BoundedVec<_, T::MaxStrategies> = strategies
        .try_into()
        .map_err(|_| Error::<T>::TooManyStrategies)?;
      let count = bounded.len() as u32;
      Strategies::<T>::put(bounded);
      Self::deposit_event(Event::StrategiesUpdated { count });
      Ok(())
    }

    /// Retry deferred fees held in `asset` (governance only)
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::retry_pending_fees())]
    pub fn retry_pending_fees(origin: OriginFor<T>, asset: AssetKind) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      Self::do_flush_pending_fees(asset, T::DefaultSlippageBps::get())?;
      Ok(())
    }
  }

  /// Running totals of one pass over the strategy list.
  struct Execution {
    target_amount: Balance,
    source_left: Balance,
    base_left: Balance,
    last_success: Option<u32>,
    attempts: Vec<AttemptRecord>,
  }

  impl<T: Config> Pallet<T> {
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn balance_of(asset: AssetKind, who: &T::AccountId) -> Balance {
      match asset.asset_id() {
        None => T::Currency::balance(who),
        Some(id) => T::Assets::balance(id, who),
      }
    }

    pub(crate) fn transfer_asset(
      asset: AssetKind,
      from: &T::AccountId,
      to: &T::AccountId,
      amount: Balance,
    ) -> DispatchResult {
      if amount.is_zero() || from == to {
        return Ok(());
      }
      match asset {
        AssetKind::Native => {
          T::Currency::transfer(from, to, amount, Preservation::Expendable)?;
        }
        AssetKind::Local(id) | AssetKind::Foreign(id) => {
          T::Assets::transfer(id, from, to, amount, Preservation::Expendable)?;
        }
      }
      Ok(())
    }

    /// Oracle-derived floor for a swap of `amount_in`, widened by
    /// `slippage_bps * multiplier` (capped at 100%).
    pub fn min_output(
      asset_from: AssetKind,
      asset_to: AssetKind,
      amount_in: Balance,
      slippage_bps: u32,
      multiplier: u32,
    ) -> Option<Balance> {
      let price = T::PriceOracle::get_price(asset_from, asset_to)?;
      let expected = mul_div_floor(amount_in, price, T::Precision::get())?;
      let tolerance = slippage_bps
        .saturating_mul(multiplier)
        .min(MAX_SLIPPAGE_BPS);
      mul_div_floor(
        expected,
        MAX_SLIPPAGE_BPS.saturating_sub(tolerance) as Balance,
        MAX_SLIPPAGE_BPS as Balance,
      )
    }

    /// One swap from the engine account inside its own storage layer.
    /// Returns the enforced minimum and the output on success.
    fn try_leg(
      asset_from: AssetKind,
      asset_to: AssetKind,
      amount_in: Balance,
      slippage_bps: u32,
      multiplier: u32,
    ) -> (Balance, Option<Balance>) {
      let Some(min_out) =
        Self::min_output(asset_from, asset_to, amount_in, slippage_bps, multiplier)
      else {
        log::debug!(
          target: crate::LOG_TARGET,
          "no price for {:?} -> {:?}, skipping leg",
          asset_from,
          asset_to
        );
        return (Zero::zero(), None);
      };
      let engine = Self::account_id();
      let result = with_storage_layer(|| -> Result<Balance, DispatchError> {
        let amount_out = T::AssetConversion::swap_exact_tokens_for_tokens(
          &engine,
          vec![asset_from, asset_to],
          amount_in,
          min_out,
        )?;
        ensure!(amount_out >= min_out, Error::<T>::SlippageExceeded);
        Ok(amount_out)
      });
      match result {
        Ok(amount_out) => (min_out, Some(amount_out)),
        Err(e) => {
          log::debug!(
            target: crate::LOG_TARGET,
            "swap {:?} -> {:?} of {} failed: {:?}",
            asset_from,
            asset_to,
            amount_in,
            e
          );
          (min_out, None)
        }
      }
    }

    /// Walk the strategy list against funds already on the engine account.
    fn run_strategies(
      amount_in: Balance,
      source: AssetKind,
      target: AssetKind,
      slippage_bps: u32,
    ) -> Execution {
      let base = T::BaseAsset::get();
      let mut exec = Execution {
        target_amount: Zero::zero(),
        source_left: amount_in,
        base_left: Zero::zero(),
        last_success: None,
        attempts: Vec::new(),
      };
      for (index, strategy) in Self::strategies().iter().enumerate() {
        if exec.source_left.is_zero() {
          break;
        }
        let index = index as u32;
        let applicable = match strategy.route {
          Route::Passthrough => source == target,
          Route::Direct => source != target,
          Route::ViaBase => source != target && source != base && target != base,
        };
        if !applicable {
          continue;
        }
        let chunk = strategy.share.mul_floor(amount_in).min(exec.source_left);
        if chunk.is_zero() {
          continue;
        }
        let multiplier = strategy.slippage_multiplier;
        let (min_out, outcome) = match strategy.route {
          Route::Passthrough => (chunk, AttemptOutcome::Converted { amount_out: chunk }),
          Route::Direct => {
            let (min_out, out) = Self::try_leg(source, target, chunk, slippage_bps, multiplier);
            let outcome = out.map_or(AttemptOutcome::Failed, |amount_out| {
              AttemptOutcome::Converted { amount_out }
            });
            (min_out, outcome)
          }
          Route::ViaBase => {
            match Self::try_leg(source, base, chunk, slippage_bps, multiplier) {
              (first_min, None) => (first_min, AttemptOutcome::Failed),
              (_, Some(base_amount)) => {
                let (min_out, out) =
                  Self::try_leg(base, target, base_amount, slippage_bps, multiplier);
                let outcome = out.map_or(AttemptOutcome::Stranded { base_amount }, |amount_out| {
                  AttemptOutcome::Converted { amount_out }
                });
                (min_out, outcome)
              }
            }
          }
        };
        match outcome {
          AttemptOutcome::Converted { amount_out } => {
            exec.target_amount = exec.target_amount.saturating_add(amount_out);
            exec.source_left = exec.source_left.saturating_sub(chunk);
            exec.last_success = Some(index);
          }
          AttemptOutcome::Stranded { base_amount } => {
            exec.base_left = exec.base_left.saturating_add(base_amount);
            exec.source_left = exec.source_left.saturating_sub(chunk);
          }
          AttemptOutcome::Failed => {
            Self::deposit_event(Event::AttemptFailed {
              strategy: index,
              amount_in: chunk,
              min_out,
            });
          }
        }
        exec.attempts.push(AttemptRecord {
          strategy: index,
          amount_in: chunk,
          min_out,
          outcome,
        });
      }
      exec
    }

    pub fn do_convert(
      payer: &T::AccountId,
      amount_in: Balance,
      source: AssetKind,
      target: AssetKind,
      slippage_bps: u32,
      recipients: Recipients<T::AccountId>,
    ) -> Result<ConversionOutcome, DispatchError> {
      ensure!(!slippage_bps.is_zero(), Error::<T>::ZeroSlippage);
      ensure!(!amount_in.is_zero(), Error::<T>::ZeroAmount);
      let engine = Self::account_id();
      Self::transfer_asset(source, payer, &engine, amount_in)?;

      let exec = Self::run_strategies(amount_in, source, target, slippage_bps);
      Self::transfer_asset(target, &engine, &recipients.output, exec.target_amount)?;

      let mut remainder = Vec::new();
      for (asset, amount) in [(source, exec.source_left), (T::BaseAsset::get(), exec.base_left)] {
        if amount.is_zero() {
          continue;
        }
        Self::transfer_asset(asset, &engine, &recipients.remainder, amount)?;
        Self::deposit_event(Event::LastResortDelivered {
          asset,
          amount,
          recipient: recipients.remainder.clone(),
        });
        remainder.push((asset, amount));
      }

      let settled_by = match exec.last_success {
        Some(index) if remainder.is_empty() => Settlement::Strategy(index),
        Some(index) => Settlement::Partial(index),
        None => Settlement::LastResort,
      };
      if !remainder.is_empty() {
        log::warn!(
          target: crate::LOG_TARGET,
          "conversion {:?} -> {:?} of {} settled by {:?}, unconverted {:?}",
          source,
          target,
          amount_in,
          settled_by,
          remainder
        );
      }
      Self::deposit_event(Event::ConversionSettled {
        source,
        target,
        amount_in,
        target_amount: exec.target_amount,
        settled_by,
      });
      Ok(ConversionOutcome {
        target,
        target_amount: exec.target_amount,
        remainder,
        settled_by,
        attempts: exec.attempts,
      })
    }

    pub fn do_deposit_fee(
      payer: &T::AccountId,
      asset: AssetKind,
      amount: Balance,
      slippage_bps: u32,
    ) -> Result<Balance, DispatchError> {
      if amount.is_zero() {
        return Ok(Zero::zero());
      }
      let engine = Self::account_id();
      let outcome = Self::do_convert(
        payer,
        amount,
        asset,
        T::PooledAsset::get(),
        slippage_bps,
        Recipients {
          output: T::FeeDestination::get(),
          remainder: engine,
        },
      )?;
      let mut deferred: Balance = Zero::zero();
      for (held, left) in outcome.remainder.iter() {
        PendingFees::<T>::mutate(held, |pending| *pending = pending.saturating_add(*left));
        deferred = deferred.saturating_add(*left);
      }
      TotalFeesCollected::<T>::mutate(|total| *total = total.saturating_add(outcome.target_amount));
      Self::deposit_event(Event::FeeCollected {
        asset,
        amount,
        pooled_credited: outcome.target_amount,
        deferred,
      });
      Ok(outcome.target_amount)
    }

    /// Convert deferred fees held in `asset`. Only the amount actually converted
    /// leaves the store.
    pub fn do_flush_pending_fees(
      asset: AssetKind,
      slippage_bps: u32,
    ) -> Result<Balance, DispatchError> {
      let pending = PendingFees::<T>::get(asset);
      if pending.is_zero() {
        return Ok(Zero::zero());
      }
      let engine = Self::account_id();
      let available = pending.min(Self::balance_of(asset, &engine));
      if available.is_zero() {
        return Ok(Zero::zero());
      }
      let outcome = Self::do_convert(
        &engine,
        available,
        asset,
        T::PooledAsset::get(),
        slippage_bps,
        Recipients {
          output: T::FeeDestination::get(),
          remainder: engine.clone(),
        },
      )?;
      let converted = available.saturating_sub(outcome.remainder_of(asset));
      let remaining = pending.saturating_sub(converted);
      if remaining.is_zero() {
        PendingFees::<T>::remove(asset);
      } else {
        PendingFees::<T>::insert(asset, remaining);
      }
      let base = T::BaseAsset::get();
      if asset != base {
        let stranded = outcome.remainder_of(base);
        if !stranded.is_zero() {
          PendingFees::<T>::mutate(base, |pending| *pending = pending.saturating_add(stranded));
        }
      }
      TotalFeesCollected::<T>::mutate(|total| *total = total.saturating_add(outcome.target_amount));
      Self::deposit_event(Event::PendingFeesFlushed {
        asset,
        converted,
        remaining,
      });
      Ok(converted)
    }
  }

  impl<T: Config> ConversionApi<T::AccountId> for Pallet<T> {
    fn engine_account() -> T::AccountId {
      Self::account_id()
    }

    fn pooled_asset() -> AssetKind {
      T::PooledAsset::get()
    }

    fn base_asset() -> AssetKind {
      T::BaseAsset::get()
    }

    fn convert(
      payer: &T::AccountId,
      amount_in: Balance,
      source: AssetKind,
      target: AssetKind,
      slippage_bps: u32,
      recipients: Recipients<T::AccountId>,
    ) -> Result<ConversionOutcome, DispatchError> {
      Self::do_convert(payer, amount_in, source, target, slippage_bps, recipients)
    }

    fn deposit_fee(
      payer: &T::AccountId,
      asset: AssetKind,
      amount: Balance,
      slippage_bps: u32,
    ) -> Result<Balance, DispatchError> {
      Self::do_deposit_fee(payer, asset, amount, slippage_bps)
    }

    fn flush_pending_fees(asset: AssetKind, slippage_bps: u32) -> Result<Balance, DispatchError> {
      with_storage_layer(|| Self::do_flush_pending_fees(asset, slippage_bps))
    }
  }

  /// Registers a provider on the engine account so it never needs an existential deposit
  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
