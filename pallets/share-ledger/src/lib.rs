//! Share Ledger Pallet
//!
//! Pools value from many depositors into one position and tracks each
//! depositor's claim on it as ownership units. A single index converts units to
//! pooled value; it is recomputed after every deposit, withdrawal and value
//! report, subject to the index stabilizer:
//!
//! - a recompute that lowers the index counts toward `StabilizerLimit`
//! - reaching the limit engages the guard, which holds the next recompute once
//! - any non-decreasing recompute clears the counter
//!
//! Deposits and withdrawals move real assets through the conversion engine and
//! charge the protocol fee on the way. Conversion shortfalls never fail the
//! operation: unconverted value is handed back through the engine's last-resort
//! path.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod types;
pub use types::*;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

pub(crate) const LOG_TARGET: &str = "runtime::share-ledger";

#[frame::pallet]
pub mod pallet {
  use super::WeightInfo;
  use crate::types::*;
  use alloc::vec::Vec;
  use codec::Decode;
  use frame::deps::sp_runtime::{
    Permill,
    traits::{AccountIdConversion, TrailingZeroInput, Zero},
  };
  use frame::prelude::*;
  use pallet_conversion_engine::{ConversionApi, Recipients};
  use primitives::{
    AssetAllowList,
    ecosystem::params::{BASE_UNITS, INDEX_PRECISION},
    math::mul_div_floor,
  };

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Conversion engine moving assets in and out of the pooled position
    type Conversion: ConversionApi<Self::AccountId>;

    /// Assets accepted as deposit sources and withdrawal targets
    type AssetAllowList: AssetAllowList;

    /// The pallet ID of the account holding the pooled position
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Protocol fee until governance sets one
    #[pallet::constant]
    type DefaultProtocolFee: Get<Permill>;

    /// Upper bound for the protocol fee
    #[pallet::constant]
    type MaxProtocolFee: Get<Permill>;

    /// Consecutive index decreases before the stabilizer engages
    #[pallet::constant]
    type StabilizerLimit: Get<u32>;

    /// Origin for configuration and value reports
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  #[pallet::type_value]
  pub fn DefaultFee<T: Config>() -> Permill {
    T::DefaultProtocolFee::get()
  }

  /// Ownership units per depositor. Accounts persist after their units reach zero.
  #[pallet::storage]
  #[pallet::getter(fn units_of)]
  pub type Accounts<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, Balance, ValueQuery>;

  /// Pool-wide totals, index and stabilizer state
  #[pallet::storage]
  #[pallet::getter(fn ledger)]
  pub type Ledger<T: Config> = StorageValue<_, LedgerState, ValueQuery>;

  /// Cumulative source-asset amount each depositor paid in. Refunded deposits are not counted.
  #[pallet::storage]
  #[pallet::getter(fn depositor_payments)]
  pub type DepositorPayments<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, Balance, ValueQuery>;

  /// Cumulative source-asset amount deposited across all depositors
  #[pallet::storage]
  #[pallet::getter(fn total_volume)]
  pub type TotalVolume<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Accounts allowed to deposit and withdraw on behalf of depositors
  #[pallet::storage]
  pub type AuthorizedCallers<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, (), OptionQuery>;

  /// Fee charged on deposits and withdrawals
  #[pallet::storage]
  #[pallet::getter(fn protocol_fee)]
  pub type ProtocolFee<T: Config> = StorageValue<_, Permill, ValueQuery, DefaultFee<T>>;

  /// Operations currently in flight
  #[pallet::storage]
  pub type ActiveOperations<T: Config> =
    StorageMap<_, Twox64Concat, OperationKind, (), OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Units issued against converted value
    Deposited {
      caller: T::AccountId,
      depositor: T::AccountId,
      asset: AssetKind,
      amount: Balance,
      pooled_value: Balance,
      units: Balance,
    },
    /// Nothing could be converted; the deposit went back to the depositor
    DepositRefunded {
      depositor: T::AccountId,
      asset: AssetKind,
      amount: Balance,
    },
    /// Units redeemed and the proceeds delivered
    Withdrawn {
      depositor: T::AccountId,
      receiver: T::AccountId,
      units: Balance,
      pooled_value: Balance,
      asset: AssetKind,
      amount_out: Balance,
    },
    Transferred {
      from: T::AccountId,
      to: T::AccountId,
      units: Balance,
    },
    IndexUpdated { old: Balance, new: Balance },
    /// Decrease limit reached; the next recompute will be held
    StabilizerEngaged { index: Balance },
    /// A recompute was held by the stabilizer
    IndexRecomputeSuppressed { held: Balance },
    PoolValueReported { old: Balance, new: Balance },
    AuthorizedCallerSet { who: T::AccountId, allowed: bool },
    ProtocolFeeSet { fee: Permill },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Caller is not on the authorized list
    NotAuthorized,
    /// Account decodes from all-zero bytes
    ZeroAddress,
    /// Amount must be greater than zero
    ZeroAmount,
    /// Slippage tolerance must be greater than zero
    ZeroSlippage,
    /// Asset is not accepted by the vault
    UnknownAsset,
    /// Not enough units
    InsufficientBalance,
    /// The same operation is already in flight
    Reentrancy,
    /// Deposit value too small to mint a unit
    DepositTooSmall,
    /// Protocol fee above the configured maximum
    FeeTooHigh,
    /// Ledger holds no units
    NoDeposits,
    /// Fixed-point arithmetic overflow
    ArithmeticOverflow,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Convert `amount` of `asset` paid by the caller into the pooled asset and
    /// issue units to `depositor`.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::deposit())]
    pub fn deposit(
      origin: OriginFor<T>,
      depositor: T::AccountId,
      asset: AssetKind,
      amount: Balance,
      slippage_bps: u32,
    ) -> DispatchResult {
      let caller = ensure_signed(origin)?;
      ensure!(
        AuthorizedCallers::<T>::contains_key(&caller),
        Error::<T>::NotAuthorized
      );
      ensure!(!Self::is_zero_address(&depositor), Error::<T>::ZeroAddress);
      ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);
      ensure!(!slippage_bps.is_zero(), Error::<T>::ZeroSlippage);
      ensure!(Self::is_accepted(&asset), Error::<T>::UnknownAsset);

      Self::with_operation_lock(OperationKind::Deposit, || {
        Self::do_deposit(&caller, &depositor, asset, amount, slippage_bps)
      })
    }

    /// Redeem `units` of `depositor` and deliver the proceeds to `receiver` in `asset`.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::withdraw())]
    pub fn withdraw(
      origin: OriginFor<T>,
      depositor: T::AccountId,
      receiver: T::AccountId,
      units: Balance,
      asset: AssetKind,
      slippage_bps: u32,
    ) -> DispatchResult {
      let caller = ensure_signed(origin)?;
      ensure!(
        AuthorizedCallers::<T>::contains_key(&caller),
        Error::<T>::NotAuthorized
      );
      ensure!(
        !Self::is_zero_address(&depositor) && !Self::is_zero_address(&receiver),
        Error::<T>::ZeroAddress
      );
      ensure!(!units.is_zero(), Error::<T>::ZeroAmount);
      ensure!(!slippage_bps.is_zero(), Error::<T>::ZeroSlippage);
      ensure!(
        Accounts::<T>::get(&depositor) >= units,
        Error::<T>::InsufficientBalance
      );
      ensure!(Self::is_accepted(&asset), Error::<T>::UnknownAsset);

      Self::with_operation_lock(OperationKind::Withdraw, || {
        Self::do_withdraw(&depositor, &receiver, units, asset, slippage_bps)
      })
    }

    /// Move units from the signer to `to`.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::transfer())]
    pub fn transfer(origin: OriginFor<T>, to: T::AccountId, units: Balance) -> DispatchResult {
      let from = ensure_signed(origin)?;
      ensure!(!Self::is_zero_address(&to), Error::<T>::ZeroAddress);
      ensure!(!units.is_zero(), Error::<T>::ZeroAmount);
      Self::transfer_units(&from, &to, units)?;
      Self::deposit_event(Event::Transferred { from, to, units });
      Ok(())
    }

    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::set_authorized_caller())]
    pub fn set_authorized_caller(
      origin: OriginFor<T>,
      who: T::AccountId,
      allowed: bool,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(!Self::is_zero_address(&who), Error::<T>::ZeroAddress);
      if allowed {
        AuthorizedCallers::<T>::insert(&who, ());
      } else {
        AuthorizedCallers::<T>::remove(&who);
      }
      Self::deposit_event(Event::AuthorizedCallerSet { who, allowed });
      Ok(())
    }

    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::set_protocol_fee())]
    pub fn set_protocol_fee(origin: OriginFor<T>, fee: Permill) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(fee <= T::MaxProtocolFee::get(), Error::<T>::FeeTooHigh);
      ProtocolFee::<T>::put(fee);
      Self::deposit_event(Event::ProtocolFeeSet { fee });
      Ok(())
    }

    /// Record the current value of the pooled position (harvested yield or
    /// realized loss) and recompute the index.
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::report_pool_value())]
    pub fn report_pool_value(origin: OriginFor<T>, value: Balance) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(!value.is_zero(), Error::<T>::ZeroAmount);
      Ledger::<T>::try_mutate(|state| -> DispatchResult {
        ensure!(!state.total_units.is_zero(), Error::<T>::NoDeposits);
        let old = state.total_pooled_value;
        state.total_pooled_value = value;
        Self::recompute_index(state)?;
        Self::deposit_event(Event::PoolValueReported { old, new: value });
        Ok(())
      })
    }
  }

  impl<T: Config> Pallet<T> {
    /// Account holding the pooled position
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Pooled value claimed by `who` at the current index.
    pub fn balance_of(who: &T::AccountId) -> Balance {
      let index = Self::valuation_index(&Ledger::<T>::get());
      mul_div_floor(Accounts::<T>::get(who), index, INDEX_PRECISION).unwrap_or_default()
    }

    /// Index units are valued at: the stored index, capped at the pool's value per
    /// unit. Only differs from the stored index while the stabilizer holds a
    /// recompute after a drop in pool value.
    pub fn valuation_index(state: &LedgerState) -> Balance {
      if state.total_units.is_zero() {
        return state.index;
      }
      mul_div_floor(state.total_pooled_value, INDEX_PRECISION, state.total_units)
        .map_or(state.index, |per_unit| per_unit.min(state.index))
    }

    /// Index over a fixed `BASE_UNITS` supply: halves each time the unit supply doubles.
    pub fn distribution_index() -> Balance {
      let total_units = Ledger::<T>::get().total_units;
      mul_div_floor(BASE_UNITS, INDEX_PRECISION, total_units).unwrap_or_default()
    }

    /// Slice of `BASE_UNITS` ("100%") held by `who`.
    pub fn share_of(who: &T::AccountId) -> Balance {
      mul_div_floor(
        Accounts::<T>::get(who),
        Self::distribution_index(),
        INDEX_PRECISION,
      )
      .unwrap_or_default()
    }

    pub fn is_authorized(who: &T::AccountId) -> bool {
      AuthorizedCallers::<T>::contains_key(who)
    }

    pub(crate) fn is_zero_address(who: &T::AccountId) -> bool {
      T::AccountId::decode(&mut TrailingZeroInput::zeroes())
        .map(|zero| zero == *who)
        .unwrap_or(false)
    }

    fn is_accepted(asset: &AssetKind) -> bool {
      *asset == T::Conversion::pooled_asset() || T::AssetAllowList::is_known_asset(asset)
    }

    /// Run `f` with `kind` tagged as in flight. The tag is cleared on every exit path.
    pub(crate) fn with_operation_lock<R>(
      kind: OperationKind,
      f: impl FnOnce() -> Result<R, DispatchError>,
    ) -> Result<R, DispatchError> {
      ensure!(
        !ActiveOperations::<T>::contains_key(kind),
        Error::<T>::Reentrancy
      );
      ActiveOperations::<T>::insert(kind, ());
      let result = f();
      ActiveOperations::<T>::remove(kind);
      result
    }

    fn do_deposit(
      caller: &T::AccountId,
      depositor: &T::AccountId,
      asset: AssetKind,
      amount: Balance,
      slippage_bps: u32,
    ) -> DispatchResult {
      if let Err(e) = T::Conversion::flush_pending_fees(asset, slippage_bps) {
        log::warn!(
          target: crate::LOG_TARGET,
          "pending fee flush for {:?} failed: {:?}",
          asset,
          e
        );
      }

      let fee = ProtocolFee::<T>::get().mul_floor(amount);
      T::Conversion::deposit_fee(caller, asset, fee, slippage_bps)?;
      let net = amount.saturating_sub(fee);

      let outcome = T::Conversion::convert(
        caller,
        net,
        asset,
        T::Conversion::pooled_asset(),
        slippage_bps,
        Recipients {
          output: Self::account_id(),
          remainder: depositor.clone(),
        },
      )?;

      if outcome.target_amount.is_zero() {
        Self::deposit_event(Event::DepositRefunded {
          depositor: depositor.clone(),
          asset,
          amount: net,
        });
        return Ok(());
      }

      let units = Ledger::<T>::try_mutate(|state| {
        Self::issue_units(state, depositor, outcome.target_amount)
      })?;
      DepositorPayments::<T>::mutate(depositor, |paid| *paid = paid.saturating_add(amount));
      TotalVolume::<T>::mutate(|volume| *volume = volume.saturating_add(amount));
      Self::deposit_event(Event::Deposited {
        caller: caller.clone(),
        depositor: depositor.clone(),
        asset,
        amount,
        pooled_value: outcome.target_amount,
        units,
      });
      Ok(())
    }

    fn do_withdraw(
      depositor: &T::AccountId,
      receiver: &T::AccountId,
      units: Balance,
      asset: AssetKind,
      slippage_bps: u32,
    ) -> DispatchResult {
      let base = T::Conversion::base_asset();
      if let Err(e) = T::Conversion::flush_pending_fees(base, slippage_bps) {
        log::warn!(
          target: crate::LOG_TARGET,
          "pending fee flush for {:?} failed: {:?}",
          base,
          e
        );
      }

      let pooled_value =
        Ledger::<T>::try_mutate(|state| Self::redeem_units(state, depositor, units))?;

      let ledger_account = Self::account_id();
      let pooled = T::Conversion::pooled_asset();
      let fee = ProtocolFee::<T>::get().mul_floor(pooled_value);
      T::Conversion::deposit_fee(&ledger_account, pooled, fee, slippage_bps)?;
      let net = pooled_value.saturating_sub(fee);

      let amount_out = if net.is_zero() {
        Zero::zero()
      } else {
        T::Conversion::convert(
          &ledger_account,
          net,
          pooled,
          asset,
          slippage_bps,
          Recipients::single(receiver),
        )?
        .target_amount
      };

      Self::deposit_event(Event::Withdrawn {
        depositor: depositor.clone(),
        receiver: receiver.clone(),
        units,
        pooled_value,
        asset,
        amount_out,
      });
      Ok(())
    }

    /// Mint units for `value` of pooled asset at the valuation index in force before the deposit.
    pub(crate) fn issue_units(
      state: &mut LedgerState,
      who: &T::AccountId,
      value: Balance,
    ) -> Result<Balance, DispatchError> {
      ensure!(!value.is_zero(), Error::<T>::ZeroAmount);
      let units = if state.total_units.is_zero() {
        let old = state.index;
        state.index =
          mul_div_floor(value, INDEX_PRECISION, BASE_UNITS).ok_or(Error::<T>::ArithmeticOverflow)?;
        ensure!(!state.index.is_zero(), Error::<T>::DepositTooSmall);
        state.stabilizer = StabilizerState::default();
        state.total_units = BASE_UNITS;
        state.total_pooled_value = value;
        if old != state.index {
          Self::deposit_event(Event::IndexUpdated {
            old,
            new: state.index,
          });
        }
        BASE_UNITS
      } else {
        let index = Self::valuation_index(state);
        let units =
          mul_div_floor(value, INDEX_PRECISION, index).ok_or(Error::<T>::ArithmeticOverflow)?;
        ensure!(!units.is_zero(), Error::<T>::DepositTooSmall);
        state.total_units = state
          .total_units
          .checked_add(units)
          .ok_or(Error::<T>::ArithmeticOverflow)?;
        state.total_pooled_value = state
          .total_pooled_value
          .checked_add(value)
          .ok_or(Error::<T>::ArithmeticOverflow)?;
        Self::recompute_index(state)?;
        units
      };
      Accounts::<T>::try_mutate(who, |held| -> DispatchResult {
        *held = held.checked_add(units).ok_or(Error::<T>::ArithmeticOverflow)?;
        Ok(())
      })?;
      Ok(units)
    }

    /// Burn `units` of `who` and release their pooled value. The last holder to
    /// exit takes everything left in the pool.
    pub(crate) fn redeem_units(
      state: &mut LedgerState,
      who: &T::AccountId,
      units: Balance,
    ) -> Result<Balance, DispatchError> {
      ensure!(!units.is_zero(), Error::<T>::ZeroAmount);
      Accounts::<T>::try_mutate(who, |held| -> DispatchResult {
        *held = held
          .checked_sub(units)
          .ok_or(Error::<T>::InsufficientBalance)?;
        Ok(())
      })?;

      if units >= state.total_units {
        let value = state.total_pooled_value;
        state.total_units = Zero::zero();
        state.total_pooled_value = Zero::zero();
        return Ok(value);
      }

      let value = mul_div_floor(units, Self::valuation_index(state), INDEX_PRECISION)
        .ok_or(Error::<T>::ArithmeticOverflow)?
        .min(state.total_pooled_value);
      state.total_units = state.total_units.saturating_sub(units);
      state.total_pooled_value = state.total_pooled_value.saturating_sub(value);
      Self::recompute_index(state)?;
      Ok(value)
    }

    pub(crate) fn transfer_units(
      from: &T::AccountId,
      to: &T::AccountId,
      units: Balance,
    ) -> DispatchResult {
      let held = Accounts::<T>::get(from);
      ensure!(held >= units, Error::<T>::InsufficientBalance);
      if from == to {
        return Ok(());
      }
      Accounts::<T>::insert(from, held.saturating_sub(units));
      Accounts::<T>::try_mutate(to, |balance| -> DispatchResult {
        *balance = balance
          .checked_add(units)
          .ok_or(Error::<T>::ArithmeticOverflow)?;
        Ok(())
      })
    }

    /// Recompute `index = total_pooled_value / total_units` through the stabilizer.
    pub(crate) fn recompute_index(state: &mut LedgerState) -> DispatchResult {
      if state.total_units.is_zero() {
        return Ok(());
      }
      let old = state.index;
      if state.stabilizer.guard_active {
        state.stabilizer = StabilizerState::default();
        log::debug!(
          target: crate::LOG_TARGET,
          "index recompute held at {}",
          old
        );
        Self::deposit_event(Event::IndexRecomputeSuppressed { held: old });
        return Ok(());
      }

      let new = mul_div_floor(state.total_pooled_value, INDEX_PRECISION, state.total_units)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      if new < old {
        state.stabilizer.consecutive_decreases =
          state.stabilizer.consecutive_decreases.saturating_add(1);
        if state.stabilizer.consecutive_decreases >= T::StabilizerLimit::get() {
          state.stabilizer.guard_active = true;
          log::warn!(
            target: crate::LOG_TARGET,
            "{} consecutive index decreases, holding next recompute",
            state.stabilizer.consecutive_decreases
          );
          Self::deposit_event(Event::StabilizerEngaged { index: new });
        }
      } else {
        state.stabilizer.consecutive_decreases = 0;
      }
      state.index = new;
      if new != old {
        Self::deposit_event(Event::IndexUpdated { old, new });
      }
      Ok(())
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// Accounts allowed to deposit and withdraw from genesis
    pub authorized_callers: Vec<T::AccountId>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
      for who in &self.authorized_callers {
        AuthorizedCallers::<T>::insert(who, ());
      }
    }
  }
}
