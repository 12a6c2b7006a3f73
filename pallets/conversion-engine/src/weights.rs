#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;

pub trait WeightInfo {
	fn set_strategies(n: u32, ) -> Weight;
	fn retry_pending_fees() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	/// The range of component `n` is `[1, 8]`.
	fn set_strategies(n: u32, ) -> Weight {
		Weight::from_parts(12_000_000, 1500)
			.saturating_add(Weight::from_parts(350_000, 0).saturating_mul(n.into()))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn retry_pending_fees() -> Weight {
		// Worst case walks every strategy, two swap legs each
		Weight::from_parts(180_000_000, 9000)
			.saturating_add(T::DbWeight::get().reads(12))
			.saturating_add(T::DbWeight::get().writes(10))
	}
}

impl WeightInfo for () {
	fn set_strategies(n: u32, ) -> Weight {
		Weight::from_parts(12_000_000, 1500)
			.saturating_add(Weight::from_parts(350_000, 0).saturating_mul(n.into()))
			.saturating_add(RocksDbWeight::get().writes(1))
	}
	fn retry_pending_fees() -> Weight {
		Weight::from_parts(180_000_000, 9000)
			.saturating_add(RocksDbWeight::get().reads(12))
			.saturating_add(RocksDbWeight::get().writes(10))
	}
}
