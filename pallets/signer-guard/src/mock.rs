use crate as pallet_signer_guard;
use alloc::collections::BTreeMap;
use polkadot_sdk::frame_support::{construct_runtime, derive_impl, traits::ConstU32};
use polkadot_sdk::frame_system::{self, EnsureRoot};
use polkadot_sdk::sp_runtime::{
  BuildStorage,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::composition::REQUIRED_THRESHOLD;
use std::cell::RefCell;

type Block = frame_system::mocking::MockBlock<Test>;
pub type AccountId = u64;

pub const WALLET: AccountId = 100;
pub const HUMAN_1: AccountId = 1;
pub const HUMAN_2: AccountId = 2;
pub const HUMAN_3: AccountId = 3;
pub const AGENT_1: AccountId = 11;
pub const AGENT_2: AccountId = 12;
pub const AGENT_3: AccountId = 13;
pub const AGENT_4: AccountId = 14;
pub const OUTSIDER: AccountId = 66;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    SignerGuard: pallet_signer_guard,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
}

thread_local! {
  // Owner list and threshold per wallet account, as the wallet itself would report them.
  static WALLETS: RefCell<BTreeMap<AccountId, (Vec<AccountId>, u32)>> = const { RefCell::new(BTreeMap::new()) };
}

pub struct MockWallet;

impl crate::WalletInspect<AccountId> for MockWallet {
  fn owners(wallet: &AccountId) -> Vec<AccountId> {
    WALLETS.with(|w| {
      w.borrow()
        .get(wallet)
        .map(|(owners, _)| owners.clone())
        .unwrap_or_default()
    })
  }

  fn threshold(wallet: &AccountId) -> u32 {
    WALLETS.with(|w| w.borrow().get(wallet).map(|(_, t)| *t).unwrap_or(0))
  }
}

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<AccountId> for MockWallet {
  fn set_wallet_state(wallet: &AccountId, owners: Vec<AccountId>, threshold: u32) {
    set_wallet_state(*wallet, owners, threshold);
  }
}

/// Overwrite what the wallet reports, bypassing the guard.
pub fn set_wallet_state(wallet: AccountId, owners: Vec<AccountId>, threshold: u32) {
  WALLETS.with(|w| {
    w.borrow_mut().insert(wallet, (owners, threshold));
  });
}

pub fn set_owners(owners: Vec<AccountId>) {
  let threshold = <MockWallet as crate::WalletInspect<AccountId>>::threshold(&WALLET);
  set_wallet_state(WALLET, owners, threshold);
}

pub fn set_threshold(threshold: u32) {
  set_wallet_state(WALLET, wallet_owners(), threshold);
}

pub fn wallet_owners() -> Vec<AccountId> {
  <MockWallet as crate::WalletInspect<AccountId>>::owners(&WALLET)
}

/// Replace `old` with `new` in the wallet's owner list, as a wallet executing a swap would.
pub fn wallet_swap(old: AccountId, new: AccountId) {
  let owners = wallet_owners()
    .into_iter()
    .map(|owner| if owner == old { new } else { owner })
    .collect();
  set_owners(owners);
}

impl pallet_signer_guard::Config for Test {
  type Wallet = MockWallet;
  type SetupOrigin = EnsureRoot<AccountId>;
  type MaxPayloadLen = ConstU32<256>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockWallet;
}

fn ext_with(guard: pallet_signer_guard::GenesisConfig<Test>) -> polkadot_sdk::sp_io::TestExternalities {
  WALLETS.with(|w| w.borrow_mut().clear());
  set_wallet_state(
    WALLET,
    vec![HUMAN_1, HUMAN_2, AGENT_1, AGENT_2, AGENT_3],
    REQUIRED_THRESHOLD,
  );

  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();
  guard.assimilate_storage(&mut t).unwrap();

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  // Events are only recorded from block 1 on.
  ext.execute_with(|| System::set_block_number(1));
  ext
}

// Guard bound to WALLET with humans {1, 2} and agents {11, 12, 13}; the wallet reports the same
// five owners and a threshold of four.
pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  ext_with(pallet_signer_guard::GenesisConfig {
    wallet: Some(WALLET),
    humans: vec![HUMAN_1, HUMAN_2],
    agents: vec![AGENT_1, AGENT_2, AGENT_3],
  })
}

// Same wallet state, but the guard is left for `initialize`.
pub fn new_uninitialized_ext() -> polkadot_sdk::sp_io::TestExternalities {
  ext_with(pallet_signer_guard::GenesisConfig::default())
}
