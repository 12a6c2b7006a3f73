use crate as pallet_asset_registry;
use polkadot_sdk::frame_support::{construct_runtime, derive_impl, traits::ConstU32};
use polkadot_sdk::frame_system::{self, EnsureRoot};
use polkadot_sdk::sp_runtime::{
  BuildStorage,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{AssetKind, well_known};

type Block = frame_system::mocking::MockBlock<Test>;
type AccountId = u64;

construct_runtime!(
  pub enum Test {
    System: frame_system,
    AssetRegistry: pallet_asset_registry,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = polkadot_sdk::sp_core::H256;
  type Hashing = BlakeTwo256;
}

impl pallet_asset_registry::Config for Test {
  type RegistryOrigin = EnsureRoot<AccountId>;
  type MaxAssets = ConstU32<3>;
  type WeightInfo = ();
}

pub const USDC: AssetKind = AssetKind::Local(well_known::USDC);
pub const USDT: AssetKind = AssetKind::Local(well_known::USDT);
pub const ETH: AssetKind = AssetKind::Local(well_known::ETH);

// Build genesis storage according to the mock runtime. USDC is listed at genesis.
pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  pallet_asset_registry::GenesisConfig::<Test> {
    assets: vec![USDC],
    _marker: Default::default(),
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| System::set_block_number(1));
  ext
}
