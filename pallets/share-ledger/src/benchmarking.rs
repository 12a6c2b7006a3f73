use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::traits::Get;
use polkadot_sdk::frame_system::RawOrigin;
use polkadot_sdk::sp_runtime::traits::Zero;
use pallet_conversion_engine::ConversionApi;
use primitives::ecosystem::params::{BASE_UNITS, INDEX_PRECISION};

const AMOUNT: Balance = 100_000_000_000_000;

fn authorized_caller<T: Config>() -> T::AccountId {
  let caller: T::AccountId = whitelisted_caller();
  AuthorizedCallers::<T>::insert(&caller, ());
  caller
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn deposit() {
    let caller = authorized_caller::<T>();
    let depositor: T::AccountId = account("depositor", 0, 0);
    let pooled = T::Conversion::pooled_asset();
    T::BenchmarkHelper::fund(&caller, pooled, AMOUNT * 2).expect("funding failed");

    #[extrinsic_call]
    deposit(RawOrigin::Signed(caller), depositor.clone(), pooled, AMOUNT, 100);

    assert!(!Pallet::<T>::units_of(&depositor).is_zero());
  }

  #[benchmark]
  fn withdraw() {
    let caller = authorized_caller::<T>();
    let depositor: T::AccountId = account("depositor", 0, 0);
    let pooled = T::Conversion::pooled_asset();
    T::BenchmarkHelper::fund(&caller, pooled, AMOUNT * 2).expect("funding failed");
    Pallet::<T>::deposit(
      RawOrigin::Signed(caller.clone()).into(),
      depositor.clone(),
      pooled,
      AMOUNT,
      100,
    )
    .expect("deposit failed");
    let units = Pallet::<T>::units_of(&depositor);

    #[extrinsic_call]
    withdraw(
      RawOrigin::Signed(caller),
      depositor.clone(),
      depositor.clone(),
      units,
      pooled,
      100,
    );

    assert!(Pallet::<T>::units_of(&depositor).is_zero());
  }

  #[benchmark]
  fn transfer() {
    let from: T::AccountId = account("from", 0, 0);
    let to: T::AccountId = account("to", 0, 0);
    Accounts::<T>::insert(&from, BASE_UNITS);

    #[extrinsic_call]
    transfer(RawOrigin::Signed(from.clone()), to.clone(), BASE_UNITS / 2);

    assert_eq!(Pallet::<T>::units_of(&to), BASE_UNITS / 2);
  }

  #[benchmark]
  fn set_authorized_caller() {
    let who: T::AccountId = account("relay", 0, 0);

    #[extrinsic_call]
    set_authorized_caller(RawOrigin::Root, who.clone(), true);

    assert!(Pallet::<T>::is_authorized(&who));
  }

  #[benchmark]
  fn set_protocol_fee() {
    let fee = T::MaxProtocolFee::get();

    #[extrinsic_call]
    set_protocol_fee(RawOrigin::Root, fee);

    assert_eq!(Pallet::<T>::protocol_fee(), fee);
  }

  #[benchmark]
  fn report_pool_value() {
    Ledger::<T>::put(LedgerState {
      total_units: BASE_UNITS,
      total_pooled_value: AMOUNT,
      index: INDEX_PRECISION,
      stabilizer: StabilizerState::default(),
    });

    #[extrinsic_call]
    report_pool_value(RawOrigin::Root, AMOUNT + AMOUNT / 10);

    assert_eq!(Pallet::<T>::ledger().total_pooled_value, AMOUNT + AMOUNT / 10);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
