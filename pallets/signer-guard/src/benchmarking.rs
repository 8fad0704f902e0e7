use crate::*;
use alloc::vec::Vec;
use frame::prelude::*;
use polkadot_sdk::frame_benchmarking::{account, v2::*};
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{
  WalletCall,
  composition::{REQUIRED_THRESHOLD, SignerRole},
};

const SEED: u32 = 0;

struct Signers<T: Config> {
  wallet: T::AccountId,
  humans: Vec<T::AccountId>,
  agents: Vec<T::AccountId>,
}

fn signers<T: Config>() -> Signers<T> {
  Signers {
    wallet: account("wallet", 0, SEED),
    humans: (0..2).map(|i| account("human", i, SEED)).collect(),
    agents: (0..3).map(|i| account("agent", i, SEED)).collect(),
  }
}

// Drop whatever genesis configured and bind the guard to a wallet whose live owners match.
fn bind_guard<T: Config>() -> Signers<T> {
  let _ = SignerRoles::<T>::clear(u32::MAX, None);
  GuardedWallet::<T>::kill();
  let s = signers::<T>();
  let owners = s.humans.iter().chain(s.agents.iter()).cloned().collect();
  T::BenchmarkHelper::set_wallet_state(&s.wallet, owners, REQUIRED_THRESHOLD);
  Pallet::<T>::do_initialize(s.wallet.clone(), &s.humans, &s.agents)
    .expect("benchmark signers are a valid setup");
  s
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn initialize() {
    let _ = SignerRoles::<T>::clear(u32::MAX, None);
    GuardedWallet::<T>::kill();
    let s = signers::<T>();
    let humans = BoundedVec::try_from(s.humans.clone()).unwrap_or_default();
    let agents = BoundedVec::try_from(s.agents.clone()).unwrap_or_default();

    #[extrinsic_call]
    initialize(RawOrigin::Root, s.wallet.clone(), humans, agents);

    assert_eq!(GuardedWallet::<T>::get(), Some(s.wallet));
  }

  // Owner swap is the heaviest pre-check path.
  #[benchmark]
  fn check_transaction() {
    let s = bind_guard::<T>();
    let old = s.humans[0].clone();
    let new: T::AccountId = account("human", 2, SEED);
    let payload = WalletCall::SwapOwner {
      prev: s.humans[1].clone(),
      old: old.clone(),
      new: new.clone(),
    }
    .to_payload();
    let payload = BoundedVec::try_from(payload).expect("MaxPayloadLen fits a swap");

    #[extrinsic_call]
    check_transaction(RawOrigin::Signed(s.wallet.clone()), s.wallet.clone(), 0, payload);

    assert_eq!(SignerRoles::<T>::get(&new), Some(SignerRole::Human));
    assert_eq!(SignerRoles::<T>::get(&old), None);
  }

  // A failed execution after a swap undoes the registry move.
  #[benchmark]
  fn check_after_execution() {
    let s = bind_guard::<T>();
    let old = s.humans[0].clone();
    let new: T::AccountId = account("human", 2, SEED);
    let payload = WalletCall::SwapOwner {
      prev: s.humans[1].clone(),
      old: old.clone(),
      new: new.clone(),
    }
    .to_payload();
    Pallet::<T>::do_pre_check(&s.wallet, &s.wallet, 0, &payload)
      .expect("swap between humans passes the pre-check");

    #[extrinsic_call]
    check_after_execution(RawOrigin::Signed(s.wallet), T::Hash::default(), false);

    assert_eq!(SignerRoles::<T>::get(&old), Some(SignerRole::Human));
    assert!(PendingSwap::<T>::get().is_none());
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
