extern crate alloc;

use crate as pallet_conversion_engine;
use alloc::vec::Vec;
use polkadot_sdk::frame_support::traits::{
  fungible::Mutate as NativeMutate,
  fungibles::Mutate as FungiblesMutate,
  tokens::{Fortitude, Precision, Preservation},
};
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU128, Get},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, PerThing, Permill,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{
  AssetKind,
  ecosystem::{
    pallet_ids::CONVERSION_ENGINE_PALLET_ID,
    params::{DEFAULT_SLIPPAGE_BPS, MAX_CONVERSION_STRATEGIES, PRECISION},
  },
  well_known,
};
use std::cell::RefCell;
use std::collections::BTreeMap;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const FEE_VAULT: u64 = 99;

pub const POOLED: AssetKind = AssetKind::Local(well_known::VDOT);
pub const BASE: AssetKind = AssetKind::Local(well_known::ETH);
pub const USDT: AssetKind = AssetKind::Local(well_known::USDT);
pub const USDC: AssetKind = AssetKind::Local(well_known::USDC);

// State containers for the stateful swap executor and oracle
thread_local! {
    // Directed markets: (from, to) -> output per unit of input, PRECISION-scaled
    pub static RATES: RefCell<BTreeMap<(AssetKind, AssetKind), u128>> = const { RefCell::new(BTreeMap::new()) };

    // Largest single input a market accepts
    pub static DEPTH: RefCell<BTreeMap<(AssetKind, AssetKind), u128>> = const { RefCell::new(BTreeMap::new()) };

    // Realized shortfall against the quoted rate
    pub static IMPACT: RefCell<BTreeMap<(AssetKind, AssetKind), Permill>> = const { RefCell::new(BTreeMap::new()) };

    // Oracle prices: (from, to) -> price, PRECISION-scaled
    pub static ORACLE_PRICES: RefCell<BTreeMap<(AssetKind, AssetKind), u128>> = const { RefCell::new(BTreeMap::new()) };

    // When set, the executor settles below the caller's minimum instead of reverting
    pub static LENIENT: RefCell<bool> = const { RefCell::new(false) };

    // Executed swaps: (path, amount_in, amount_out)
    pub static SWAPS: RefCell<Vec<(Vec<AssetKind>, u128, u128)>> = const { RefCell::new(Vec::new()) };
}

/// Open a directed market at `rate` and publish the same oracle price.
pub fn set_market(from: AssetKind, to: AssetKind, rate: u128) {
  RATES.with(|r| r.borrow_mut().insert((from, to), rate));
  set_oracle_price(from, to, rate);
}

pub fn close_market(from: AssetKind, to: AssetKind) {
  RATES.with(|r| r.borrow_mut().remove(&(from, to)));
}

pub fn set_depth(from: AssetKind, to: AssetKind, max_in: u128) {
  DEPTH.with(|d| d.borrow_mut().insert((from, to), max_in));
}

pub fn set_impact(from: AssetKind, to: AssetKind, impact: Permill) {
  IMPACT.with(|i| i.borrow_mut().insert((from, to), impact));
}

pub fn set_oracle_price(from: AssetKind, to: AssetKind, price: u128) {
  ORACLE_PRICES.with(|p| p.borrow_mut().insert((from, to), price));
}

pub fn clear_oracle_price(from: AssetKind, to: AssetKind) {
  ORACLE_PRICES.with(|p| p.borrow_mut().remove(&(from, to)));
}

pub fn set_lenient(lenient: bool) {
  LENIENT.with(|l| *l.borrow_mut() = lenient);
}

pub fn executed_swaps() -> Vec<(Vec<AssetKind>, u128, u128)> {
  SWAPS.with(|s| s.borrow().clone())
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    ConversionEngine: pallet_conversion_engine,
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
    let key = (asset_in, asset_out);
    let rate = RATES
      .with(|r| r.borrow().get(&key).cloned())
      .ok_or(DispatchError::Other("Market not found"))?;
    if let Some(max_in) = DEPTH.with(|d| d.borrow().get(&key).cloned()) {
      if amount_in > max_in {
        return Err(DispatchError::Other("Insufficient liquidity"));
      }
    }
    let quoted = amount_in.saturating_mul(rate) / PRECISION;
    let impact = IMPACT.with(|i| i.borrow().get(&key).cloned().unwrap_or_default());
    let amount_out = quoted.saturating_sub(impact.mul_floor(quoted));
    let lenient = LENIENT.with(|l| *l.borrow());
    if amount_out == 0 || (!lenient && amount_out < min_amount_out) {
      return Err(DispatchError::Other("Slippage exceeded"));
    }

    // Burn input, mint output
    match asset_in {
      AssetKind::Native => {
        <Balances as NativeMutate<u64>>::burn_from(
          who,
          amount_in,
          Preservation::Expendable,
          Precision::Exact,
          Fortitude::Polite,
        )?;
      }
      AssetKind::Local(id) | AssetKind::Foreign(id) => {
        <Assets as FungiblesMutate<u64>>::burn_from(
          id,
          who,
          amount_in,
          Preservation::Expendable,
          Precision::Exact,
          Fortitude::Polite,
        )?;
      }
    }
    match asset_out {
      AssetKind::Native => {
        <Balances as NativeMutate<u64>>::mint_into(who, amount_out)?;
      }
      AssetKind::Local(id) | AssetKind::Foreign(id) => {
        <Assets as FungiblesMutate<u64>>::mint_into(id, who, amount_out)?;
      }
    }
    SWAPS.with(|s| s.borrow_mut().push((path, amount_in, amount_out)));
    Ok(amount_out)
  }
}

pub struct MockOracle;
impl pallet_conversion_engine::PriceOracle<u128> for MockOracle {
  fn get_price(asset_from: AssetKind, asset_to: AssetKind) -> Option<u128> {
    ORACLE_PRICES.with(|p| p.borrow().get(&(asset_from, asset_to)).cloned())
  }
}

pub struct PalletIdStub;
impl Get<PalletId> for PalletIdStub {
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

pub struct FeeVaultStub;
impl Get<u64> for FeeVaultStub {
  fn get() -> u64 {
    FEE_VAULT
  }
}

impl pallet_conversion_engine::Config for Test {
  type Assets = Assets;
  type Currency = Balances;
  type AssetConversion = MockSwapExecutor;
  type PriceOracle = MockOracle;
  type PalletId = PalletIdStub;
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
impl crate::BenchmarkHelper<u64> for EngineBenchmarkHelper {
  fn fund(who: &u64, asset: AssetKind, amount: u128) -> polkadot_sdk::sp_runtime::DispatchResult {
    set_market(asset, POOLED, PRECISION);
    match asset {
      AssetKind::Native => {
        <Balances as NativeMutate<u64>>::mint_into(who, amount)?;
      }
      AssetKind::Local(id) | AssetKind::Foreign(id) => {
        <Assets as FungiblesMutate<u64>>::mint_into(id, who, amount)?;
      }
    }
    Ok(())
  }
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: alloc::vec![(ALICE, 1_000 * PRECISION), (BOB, 1_000 * PRECISION)],
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let assets = [POOLED, BASE, USDT, USDC]
    .iter()
    .filter_map(|a| match a {
      AssetKind::Local(id) => Some(*id),
      _ => None,
    })
    .collect::<Vec<_>>();
  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    // All sufficient, min_balance 1, owned by ALICE
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

  // Engine account gets a provider reference (ED-free)
  pallet_conversion_engine::GenesisConfig::<Test>::default()
    .assimilate_storage(&mut t)
    .unwrap();

  // Reset State
  RATES.with(|r| r.borrow_mut().clear());
  DEPTH.with(|d| d.borrow_mut().clear());
  IMPACT.with(|i| i.borrow_mut().clear());
  ORACLE_PRICES.with(|p| p.borrow_mut().clear());
  LENIENT.with(|l| *l.borrow_mut() = false);
  SWAPS.with(|s| s.borrow_mut().clear());

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| System::set_block_number(1));
  ext
}
