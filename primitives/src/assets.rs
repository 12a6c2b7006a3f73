use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Asset identifier shared by every vault pallet.
///
/// - `Native`: the chain's native token (pallet-balances).
/// - `Local(u32)`: assets held in pallet-assets, including the pooled yield position.
/// - `Foreign(u32)`: pallet-assets entries mirrored from another consensus system.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetKind {
  #[default]
  Native,
  Local(u32),
  Foreign(u32),
}

// 32-bit ID layout: [ 4 bits: class ] [ 28 bits: index ]
//
// 0x1... -> Standard tokens
// 0x2... -> Stablecoins
// 0x3... -> Yield-bearing positions (liquid staking, vault shares)

pub const MASK_TYPE: u32 = 0xF000_0000;
pub const MASK_INDEX: u32 = 0x0FFF_FFFF;

pub const TYPE_STD: u32 = 0x1000_0000;
pub const TYPE_STABLE: u32 = 0x2000_0000;
pub const TYPE_YIELD: u32 = 0x3000_0000;

/// Classification helpers for [`AssetKind`].
pub trait AssetInspector {
  /// The pallet-assets id, if the asset lives there.
  fn asset_id(&self) -> Option<u32>;
}

impl AssetInspector for AssetKind {
  fn asset_id(&self) -> Option<u32> {
    match self {
      AssetKind::Local(id) | AssetKind::Foreign(id) => Some(*id),
      AssetKind::Native => None,
    }
  }
}

/// Membership check for the set of assets a vault accepts.
///
/// Implemented by the asset registry pallet and consumed by the share ledger,
/// which never sees how the list is stored or governed.
pub trait AssetAllowList {
  fn is_known_asset(asset: &AssetKind) -> bool;
}

/// Accepts every asset. Useful for runtimes that gate assets elsewhere.
impl AssetAllowList for () {
  fn is_known_asset(_asset: &AssetKind) -> bool {
    true
  }
}

const fn make_id(type_mask: u32, index: u32) -> u32 {
  type_mask | (index & MASK_INDEX)
}

/// Well-known asset ids used as system defaults.
pub mod well_known {
  use super::*;

  pub const ETH: u32 = make_id(TYPE_STD, 3);

  pub const USDT: u32 = make_id(TYPE_STABLE, 1);
  pub const USDC: u32 = make_id(TYPE_STABLE, 2);

  /// Liquid staking DOT, the default pooled yield position.
  pub const VDOT: u32 = make_id(TYPE_YIELD, 1);
}
