//! Asset Registry Pallet
//!
//! Governance-controlled allow-list of the assets the vault accepts as deposit
//! sources and withdrawal targets. Other pallets query it through
//! [`primitives::AssetAllowList`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub(crate) const LOG_TARGET: &str = "runtime::asset-registry";

#[frame::pallet]
pub mod pallet {
  use crate::weights::WeightInfo as _;
  use alloc::vec::Vec;
  use frame::deps::frame_support::traits::{EnsureOrigin, Get};
  use frame::prelude::*;
  use primitives::{AssetAllowList, AssetKind};

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Origin that can list and delist assets (e.g. Governance or Root)
    type RegistryOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Maximum number of listed assets
    #[pallet::constant]
    type MaxAssets: Get<u32>;

    type WeightInfo: crate::weights::WeightInfo;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  /// Assets accepted by the vault.
  #[pallet::storage]
  pub type ListedAssets<T: Config> = StorageMap<_, Blake2_128Concat, AssetKind, (), OptionQuery>;

  /// Number of entries in `ListedAssets`.
  #[pallet::storage]
  #[pallet::getter(fn asset_count)]
  pub type AssetCount<T: Config> = StorageValue<_, u32, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// An asset was added to the allow-list.
    AssetListed { asset: AssetKind },
    /// An asset was removed from the allow-list.
    AssetDelisted { asset: AssetKind },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// The asset is already on the allow-list.
    AssetAlreadyListed,
    /// The asset is not on the allow-list.
    AssetNotListed,
    /// The allow-list is full.
    TooManyAssets,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Add an asset to the allow-list.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::add_asset())]
    pub fn add_asset(origin: OriginFor<T>, asset: AssetKind) -> DispatchResult {
      T::RegistryOrigin::ensure_origin(origin)?;
      Self::do_add_asset(asset)?;
      Self::deposit_event(Event::AssetListed { asset });
      Ok(())
    }

    /// Remove an asset from the allow-list.
    ///
    /// Balances already held in the asset are untouched; the vault simply stops
    /// accepting it for new deposits and withdrawals.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::remove_asset())]
    pub fn remove_asset(origin: OriginFor<T>, asset: AssetKind) -> DispatchResult {
      T::RegistryOrigin::ensure_origin(origin)?;
      ensure!(
        ListedAssets::<T>::contains_key(asset),
        Error::<T>::AssetNotListed
      );
      ListedAssets::<T>::remove(asset);
      AssetCount::<T>::mutate(|count| *count = count.saturating_sub(1));
      log::info!(target: crate::LOG_TARGET, "delisted {:?}", asset);
      Self::deposit_event(Event::AssetDelisted { asset });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn is_listed(asset: &AssetKind) -> bool {
      ListedAssets::<T>::contains_key(asset)
    }

    fn do_add_asset(asset: AssetKind) -> DispatchResult {
      ensure!(
        !ListedAssets::<T>::contains_key(asset),
        Error::<T>::AssetAlreadyListed
      );
      let count = AssetCount::<T>::get();
      ensure!(count < T::MaxAssets::get(), Error::<T>::TooManyAssets);
      ListedAssets::<T>::insert(asset, ());
      AssetCount::<T>::put(count.saturating_add(1));
      log::info!(target: crate::LOG_TARGET, "listed {:?}", asset);
      Ok(())
    }
  }

  impl<T: Config> AssetAllowList for Pallet<T> {
    fn is_known_asset(asset: &AssetKind) -> bool {
      Self::is_listed(asset)
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    pub assets: Vec<AssetKind>,
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      for asset in &self.assets {
        if let Err(e) = Pallet::<T>::do_add_asset(*asset) {
          panic!("invalid genesis asset {:?}: {:?}", asset, e);
        }
      }
    }
  }
}
