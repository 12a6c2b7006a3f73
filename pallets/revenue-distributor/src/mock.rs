extern crate alloc;

use crate as pallet_revenue_distributor;
use alloc::vec::Vec;
use polkadot_sdk::frame_support::traits::{
  fungible::Mutate as NativeMutate,
  fungibles::Mutate as FungiblesMutate,
  tokens::{Fortitude, Precision, Preservation},
};
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU64, ConstU128, Get},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{
  AssetKind,
  ecosystem::{
    pallet_ids::{CONVERSION_ENGINE_PALLET_ID, REVENUE_DISTRIBUTOR_PALLET_ID},
    params::{
      DEFAULT_SLIPPAGE_BPS, MAX_CONVERSION_STRATEGIES, PRECISION, REVENUE_OPERATING_THRESHOLD,
      REVENUE_SWEEP_PERIOD,
    },
  },
  well_known,
};
use std::cell::RefCell;
use std::collections::BTreeMap;

pub const ALICE: u64 = 1;
pub const TREASURY: u64 = 50;

/// Blocks between automatic sweeps
pub const SWEEP_PERIOD: u64 = REVENUE_SWEEP_PERIOD;

pub const POOLED: AssetKind = AssetKind::Local(well_known::VDOT);
pub const BASE: AssetKind = AssetKind::Local(well_known::ETH);
pub const USDT: AssetKind = AssetKind::Local(well_known::USDT);

thread_local! {
    // Directed markets: (from, to) -> output per unit of input, PRECISION-scaled
    pub static RATES: RefCell<BTreeMap<(AssetKind, AssetKind), u128>> = const { RefCell::new(BTreeMap::new()) };
}

/// Open a directed market at `rate`; the oracle quotes the same price.
pub fn set_market(from: AssetKind, to: AssetKind, rate: u128) {
  RATES.with(|r| r.borrow_mut().insert((from, to), rate));
}

/// Credit `amount` of the pooled asset to the fee vault.
pub fn fund_vault(amount: u128) {
  mint(POOLED, &RevenueDistributor::account_id(), amount).unwrap();
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    ConversionEngine: pallet_conversion_engine,
    RevenueDistributor: pallet_revenue_distributor,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

fn burn(asset: AssetKind, who: &u64, amount: u128) -> Result<u128, DispatchError> {
  match asset {
    AssetKind::Native => <Balances as NativeMutate<u64>>::burn_from(
      who,
      amount,
      Preservation::Expendable,
      Precision::Exact,
      Fortitude::Polite,
    ),
    AssetKind::Local(id) | AssetKind::Foreign(id) => <Assets as FungiblesMutate<u64>>::burn_from(
      id,
      who,
      amount,
      Preservation::Expendable,
      Precision::Exact,
      Fortitude::Polite,
    ),
  }
}

pub fn mint(asset: AssetKind, who: &u64, amount: u128) -> Result<u128, DispatchError> {
  match asset {
    AssetKind::Native => <Balances as NativeMutate<u64>>::mint_into(who, amount),
    AssetKind::Local(id) | AssetKind::Foreign(id) => {
      <Assets as FungiblesMutate<u64>>::mint_into(id, who, amount)
    }
  }
}

pub struct MockSwapExecutor;
impl pallet_conversion_engine::AssetConversionApi<u64, u128> for MockSwapExecutor {
  fn swap_exact_tokens_for_tokens(
    who: &u64,
    path: Vec<AssetKind>,
    amount_in: u128,
    min_amount_out: u128,
  ) -> Result<u128, DispatchError> {
    let (asset_in, asset_out) = match path.as_slice() {
      [a, b] => (*a, *b),
      _ => return Err(DispatchError::Other("Unsupported path")),
    };
    let rate = RATES
      .with(|r| r.borrow().get(&(asset_in, asset_out)).cloned())
      .ok_or(DispatchError::Other("Market not found"))?;
    let amount_out = amount_in.saturating_mul(rate) / PRECISION;
    if amount_out == 0 || amount_out < min_amount_out {
      return Err(DispatchError::Other("Slippage exceeded"));
    }
    burn(asset_in, who, amount_in)?;
    mint(asset_out, who, amount_out)?;
    Ok(amount_out)
  }
}

pub struct MockOracle;
impl pallet_conversion_engine::PriceOracle<u128> for MockOracle {
  fn get_price(asset_from: AssetKind, asset_to: AssetKind) -> Option<u128> {
    RATES.with(|r| r.borrow().get(&(asset_from, asset_to)).cloned())
  }
}

pub struct EnginePalletId;
impl Get<PalletId> for EnginePalletId {
  fn get() -> PalletId {
    PalletId(*CONVERSION_ENGINE_PALLET_ID)
  }
}

pub struct PooledAssetStub;
impl Get<AssetKind> for PooledAssetStub {
  fn get() -> AssetKind {
    POOLED
  }
}

pub struct BaseAssetStub;
impl Get<AssetKind> for BaseAssetStub {
  fn get() -> AssetKind {
    BASE
  }
}

/// Engine fees land in the distributor's vault
pub struct FeeVaultStub;
impl Get<u64> for FeeVaultStub {
  fn get() -> u64 {
    RevenueDistributor::account_id()
  }
}

impl pallet_conversion_engine::Config for Test {
  type Assets = Assets;
  type Currency = Balances;
  type AssetConversion = MockSwapExecutor;
  type PriceOracle = MockOracle;
  type PalletId = EnginePalletId;
  type PooledAsset = PooledAssetStub;
  type BaseAsset = BaseAssetStub;
  type FeeDestination = FeeVaultStub;
  type Precision = ConstU128<PRECISION>;
  type DefaultSlippageBps = ConstU32<DEFAULT_SLIPPAGE_BPS>;
  type MaxStrategies = ConstU32<MAX_CONVERSION_STRATEGIES>;
  type AdminOrigin = frame_system::EnsureRoot<u64>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = EngineBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct EngineBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl pallet_conversion_engine::BenchmarkHelper<u64> for EngineBenchmarkHelper {
  fn fund(who: &u64, asset: AssetKind, amount: u128) -> polkadot_sdk::sp_runtime::DispatchResult {
    set_market(asset, POOLED, PRECISION);
    mint(asset, who, amount)?;
    Ok(())
  }
}

pub struct VaultPalletId;
impl Get<PalletId> for VaultPalletId {
  fn get() -> PalletId {
    PalletId(*REVENUE_DISTRIBUTOR_PALLET_ID)
  }
}

impl pallet_revenue_distributor::Config for Test {
  type Conversion = ConversionEngine;
  type Assets = Assets;
  type Currency = Balances;
  type PalletId = VaultPalletId;
  type DefaultRevenueAsset = PooledAssetStub;
  type DefaultOperatingThreshold = ConstU128<REVENUE_OPERATING_THRESHOLD>;
  type SweepPeriod = ConstU64<SWEEP_PERIOD>;
  type DefaultSlippageBps = ConstU32<DEFAULT_SLIPPAGE_BPS>;
  type AdminOrigin = frame_system::EnsureRoot<u64>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = EngineBenchmarkHelper;
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: alloc::vec![(ALICE, 1_000 * PRECISION)],
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let assets = [POOLED, BASE, USDT]
    .iter()
    .filter_map(|a| match a {
      AssetKind::Local(id) => Some(*id),
      _ => None,
    })
    .collect::<Vec<_>>();
  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    assets: assets.iter().map(|id| (*id, ALICE, true, 1)).collect(),
    metadata: alloc::vec![],
    accounts: assets
      .iter()
      .map(|id| (*id, ALICE, 1_000 * PRECISION))
      .collect(),
    reserves: alloc::vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_conversion_engine::GenesisConfig::<Test>::default()
    .assimilate_storage(&mut t)
    .unwrap();

  pallet_revenue_distributor::GenesisConfig::<Test> {
    revenue_recipient: Some(TREASURY),
  }
  .assimilate_storage(&mut t)
  .unwrap();

  RATES.with(|r| r.borrow_mut().clear());

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| System::set_block_number(1));
  ext
}
