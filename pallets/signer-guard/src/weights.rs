#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;
use primitives::composition::TOTAL_SIGNERS;

pub trait WeightInfo {
	fn initialize() -> Weight;
	fn check_transaction() -> Weight;
	fn check_after_execution() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	fn initialize() -> Weight {
		Weight::from_parts(20_000_000, 2000)
			.saturating_add(T::DbWeight::get().reads(1))
			.saturating_add(T::DbWeight::get().writes(1 + u64::from(TOTAL_SIGNERS)))
	}
	// Worst case is an owner swap. Reads: guarded wallet, roles of `old` and `new`, the wallet's
	// owner list and threshold, one role per projected owner. Writes: both roles and the pending
	// swap.
	fn check_transaction() -> Weight {
		Weight::from_parts(30_000_000, 3000)
			.saturating_add(T::DbWeight::get().reads(5 + u64::from(TOTAL_SIGNERS)))
			.saturating_add(T::DbWeight::get().writes(3))
	}
	// Reads: guarded wallet, pending swap, the wallet's owner list and threshold, one role per
	// owner. Writes: the pending swap and, when a failed swap is undone, both roles.
	fn check_after_execution() -> Weight {
		Weight::from_parts(20_000_000, 2000)
			.saturating_add(T::DbWeight::get().reads(4 + u64::from(TOTAL_SIGNERS)))
			.saturating_add(T::DbWeight::get().writes(3))
	}
}

impl WeightInfo for () {
	fn initialize() -> Weight {
		Weight::from_parts(20_000_000, 2000)
			.saturating_add(RocksDbWeight::get().reads(1))
			.saturating_add(RocksDbWeight::get().writes(1 + u64::from(TOTAL_SIGNERS)))
	}
	fn check_transaction() -> Weight {
		Weight::from_parts(30_000_000, 3000)
			.saturating_add(RocksDbWeight::get().reads(5 + u64::from(TOTAL_SIGNERS)))
			.saturating_add(RocksDbWeight::get().writes(3))
	}
	fn check_after_execution() -> Weight {
		Weight::from_parts(20_000_000, 2000)
			.saturating_add(RocksDbWeight::get().reads(4 + u64::from(TOTAL_SIGNERS)))
			.saturating_add(RocksDbWeight::get().writes(3))
	}
}
