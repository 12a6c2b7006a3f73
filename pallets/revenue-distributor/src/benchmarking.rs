use crate::*;
use pallet_conversion_engine::{BenchmarkHelper, ConversionApi};
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::traits::Get;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{AssetKind, Balance};

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn sweep_fees() {
    let caller: T::AccountId = whitelisted_caller();
    let recipient: T::AccountId = account("recipient", 0, 0);
    RevenueRecipient::<T>::put(&recipient);
    let excess: Balance = 1_000_000_000_000;
    let amount = OperatingThreshold::<T>::get().saturating_add(excess);
    T::BenchmarkHelper::fund(&Pallet::<T>::account_id(), T::Conversion::pooled_asset(), amount)
      .expect("funding failed");

    #[extrinsic_call]
    sweep_fees(RawOrigin::Signed(caller));

    assert_eq!(Pallet::<T>::total_distributed(), excess);
  }

  #[benchmark]
  fn set_revenue_recipient() {
    let who: T::AccountId = account("recipient", 0, 0);

    #[extrinsic_call]
    set_revenue_recipient(RawOrigin::Root, who.clone());

    assert_eq!(Pallet::<T>::revenue_recipient(), Some(who));
  }

  #[benchmark]
  fn set_revenue_asset() {
    let asset = AssetKind::Foreign(1);

    #[extrinsic_call]
    set_revenue_asset(RawOrigin::Root, asset);

    assert_eq!(Pallet::<T>::revenue_asset(), asset);
  }

  #[benchmark]
  fn set_operating_threshold() {
    let threshold = T::DefaultOperatingThreshold::get().saturating_mul(2);

    #[extrinsic_call]
    set_operating_threshold(RawOrigin::Root, threshold);

    assert_eq!(Pallet::<T>::operating_threshold(), threshold);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
