use crate::*;
use alloc::vec::Vec;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::traits::Get;
use polkadot_sdk::frame_system::RawOrigin;
use polkadot_sdk::sp_runtime::Permill;

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn set_strategies(n: Linear<1, { T::MaxStrategies::get() }>) {
    let strategies: Vec<ConversionStrategy> = (0..n)
      .map(|_| ConversionStrategy::new(Route::Direct, Permill::from_percent(50), 2))
      .collect();

    #[extrinsic_call]
    set_strategies(RawOrigin::Root, strategies);

    assert_eq!(Pallet::<T>::strategies().len() as u32, n);
  }

  #[benchmark]
  fn retry_pending_fees() {
    let asset = T::BaseAsset::get();
    let amount: Balance = 1_000_000_000_000;
    let engine = Pallet::<T>::account_id();
    T::BenchmarkHelper::fund(&engine, asset, amount).expect("funding failed");
    PendingFees::<T>::insert(asset, amount);

    #[extrinsic_call]
    retry_pending_fees(RawOrigin::Root, asset);

    assert!(Pallet::<T>::pending_fees(asset) < amount);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
