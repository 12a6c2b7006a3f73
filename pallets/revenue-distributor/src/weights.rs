#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;

pub trait WeightInfo {
	fn sweep_fees() -> Weight;
	fn set_revenue_recipient() -> Weight;
	fn set_revenue_asset() -> Weight;
	fn set_operating_threshold() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	/// Storage: `RevenueDistributor::RevenueRecipient` (r:1 w:0)
	/// Storage: `RevenueDistributor::OperatingThreshold` (r:1 w:0)
	/// Storage: `ConversionEngine::Strategies` (r:1 w:0)
	/// Storage: `Assets::Account` (r:4 w:4)
	fn sweep_fees() -> Weight {
		Weight::from_parts(160_000_000, 8000)
			.saturating_add(T::DbWeight::get().reads(10))
			.saturating_add(T::DbWeight::get().writes(8))
	}
	fn set_revenue_recipient() -> Weight {
		Weight::from_parts(8_000_000, 0)
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn set_revenue_asset() -> Weight {
		Weight::from_parts(8_000_000, 0)
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn set_operating_threshold() -> Weight {
		Weight::from_parts(8_000_000, 0)
			.saturating_add(T::DbWeight::get().writes(1))
	}
}

impl WeightInfo for () {
	fn sweep_fees() -> Weight {
		Weight::from_parts(160_000_000, 8000)
			.saturating_add(RocksDbWeight::get().reads(10))
			.saturating_add(RocksDbWeight::get().writes(8))
	}
	fn set_revenue_recipient() -> Weight {
		Weight::from_parts(8_000_000, 0)
			.saturating_add(RocksDbWeight::get().writes(1))
	}
	fn set_revenue_asset() -> Weight {
		Weight::from_parts(8_000_000, 0)
			.saturating_add(RocksDbWeight::get().writes(1))
	}
	fn set_operating_threshold() -> Weight {
		Weight::from_parts(8_000_000, 0)
			.saturating_add(RocksDbWeight::get().writes(1))
	}
}
