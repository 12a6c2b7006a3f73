use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::AssetKind;

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn add_asset() {
    let asset = AssetKind::Foreign(2000);

    #[extrinsic_call]
    add_asset(RawOrigin::Root, asset);

    assert!(Pallet::<T>::is_listed(&asset));
  }

  #[benchmark]
  fn remove_asset() {
    let asset = AssetKind::Foreign(3000);
    Pallet::<T>::add_asset(RawOrigin::Root.into(), asset).expect("pre-listing failed");

    #[extrinsic_call]
    remove_asset(RawOrigin::Root, asset);

    assert!(!Pallet::<T>::is_listed(&asset));
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
