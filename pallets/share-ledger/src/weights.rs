#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;

pub trait WeightInfo {
	fn deposit() -> Weight;
	fn withdraw() -> Weight;
	fn transfer() -> Weight;
	fn set_authorized_caller() -> Weight;
	fn set_protocol_fee() -> Weight;
	fn report_pool_value() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	/// Storage: `ShareLedger::AuthorizedCallers` (r:1 w:0)
	/// Storage: `ShareLedger::ActiveOperations` (r:1 w:1)
	/// Storage: `ConversionEngine::PendingFees` (r:1 w:1)
	/// Storage: `ConversionEngine::Strategies` (r:2 w:0)
	/// Storage: `ShareLedger::Ledger` (r:1 w:1)
	/// Storage: `ShareLedger::Accounts` (r:1 w:1)
	fn deposit() -> Weight {
		Weight::from_parts(240_000_000, 12000)
			.saturating_add(T::DbWeight::get().reads(18))
			.saturating_add(T::DbWeight::get().writes(14))
	}
	fn withdraw() -> Weight {
		Weight::from_parts(240_000_000, 12000)
			.saturating_add(T::DbWeight::get().reads(18))
			.saturating_add(T::DbWeight::get().writes(14))
	}
	/// Storage: `ShareLedger::Accounts` (r:2 w:2)
	fn transfer() -> Weight {
		Weight::from_parts(18_000_000, 3600)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(2))
	}
	fn set_authorized_caller() -> Weight {
		Weight::from_parts(9_000_000, 0)
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn set_protocol_fee() -> Weight {
		Weight::from_parts(8_000_000, 0)
			.saturating_add(T::DbWeight::get().writes(1))
	}
	/// Storage: `ShareLedger::Ledger` (r:1 w:1)
	fn report_pool_value() -> Weight {
		Weight::from_parts(14_000_000, 1600)
			.saturating_add(T::DbWeight::get().reads(1))
			.saturating_add(T::DbWeight::get().writes(1))
	}
}

impl WeightInfo for () {
	fn deposit() -> Weight {
		Weight::from_parts(240_000_000, 12000)
			.saturating_add(RocksDbWeight::get().reads(18))
			.saturating_add(RocksDbWeight::get().writes(14))
	}
	fn withdraw() -> Weight {
		Weight::from_parts(240_000_000, 12000)
			.saturating_add(RocksDbWeight::get().reads(18))
			.saturating_add(RocksDbWeight::get().writes(14))
	}
	fn transfer() -> Weight {
		Weight::from_parts(18_000_000, 3600)
			.saturating_add(RocksDbWeight::get().reads(2))
			.saturating_add(RocksDbWeight::get().writes(2))
	}
	fn set_authorized_caller() -> Weight {
		Weight::from_parts(9_000_000, 0)
			.saturating_add(RocksDbWeight::get().writes(1))
	}
	fn set_protocol_fee() -> Weight {
		Weight::from_parts(8_000_000, 0)
			.saturating_add(RocksDbWeight::get().writes(1))
	}
	fn report_pool_value() -> Weight {
		Weight::from_parts(14_000_000, 1600)
			.saturating_add(RocksDbWeight::get().reads(1))
			.saturating_add(RocksDbWeight::get().writes(1))
	}
}
