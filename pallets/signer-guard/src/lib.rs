//! Signer Guard Pallet
//!
//! Policy guard sitting in front of a multisig wallet. The wallet consults the guard before and
//! after every execution, and the guard keeps the signer set locked to two humans and three
//! automated agents with a fixed four-of-five threshold.
//!
//! - Owner additions and removals addressed to the wallet itself are always rejected.
//! - An owner swap is accepted only as a like-for-like replacement: the new owner inherits the
//!   role of the old one and must not already hold a role.
//! - Threshold changes are accepted only when they request the fixed threshold.
//! - Every check ends by re-deriving the composition from the wallet's live owner list.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub(crate) const LOG_TARGET: &str = "runtime::signer-guard";

/// Read-only view of the guarded wallet. The wallet owns this state; the guard never copies it.
pub trait WalletInspect<AccountId> {
  /// Current owners in wallet order.
  fn owners(wallet: &AccountId) -> alloc::vec::Vec<AccountId>;
  /// Current execution threshold.
  fn threshold(wallet: &AccountId) -> u32;
}

/// Entry points a wallet calls around each execution. A rejection must abort the execution.
pub trait TransactionGuard<AccountId, Hash> {
  /// Called right before the wallet executes a transaction to `to`.
  fn pre_check(
    caller: &AccountId,
    to: &AccountId,
    value: u128,
    payload: &[u8],
  ) -> frame::deps::sp_runtime::DispatchResult;

  /// Called after the wallet attempted the execution identified by `tx_hash`.
  fn post_check(
    caller: &AccountId,
    tx_hash: Hash,
    success: bool,
  ) -> frame::deps::sp_runtime::DispatchResult;
}

impl<AccountId, Hash> TransactionGuard<AccountId, Hash> for () {
  fn pre_check(
    _caller: &AccountId,
    _to: &AccountId,
    _value: u128,
    _payload: &[u8],
  ) -> frame::deps::sp_runtime::DispatchResult {
    Ok(())
  }

  fn post_check(
    _caller: &AccountId,
    _tx_hash: Hash,
    _success: bool,
  ) -> frame::deps::sp_runtime::DispatchResult {
    Ok(())
  }
}

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  /// Make the wallet report `owners` and `threshold`.
  fn set_wallet_state(wallet: &AccountId, owners: alloc::vec::Vec<AccountId>, threshold: u32);
}

#[frame::pallet]
pub mod pallet {
  use super::{LOG_TARGET, TransactionGuard, WalletInspect, WeightInfo};
  use alloc::{collections::BTreeSet, vec::Vec};
  use frame::deps::{
    frame_support::{storage::with_storage_layer, traits::EnsureOrigin},
    sp_runtime::{DispatchError, DispatchResult},
  };
  use frame::prelude::*;
  use primitives::{
    calls::{OwnerCallKind, WalletCall},
    composition::{
      REQUIRED_AGENTS, REQUIRED_HUMANS, REQUIRED_THRESHOLD, RoleComposition, SignerRole,
      TOTAL_SIGNERS,
    },
  };

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Source of the wallet's live owner list and threshold
    type Wallet: WalletInspect<Self::AccountId>;

    /// Origin allowed to bind the guard to a wallet when it was not configured at genesis
    type SetupOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Largest transaction payload accepted through `check_transaction`
    #[pallet::constant]
    type MaxPayloadLen: Get<u32>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  /// Role moved from `old` to `new` by an owner swap.
  #[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen)]
  pub struct SwapRecord<AccountId> {
    pub old: AccountId,
    pub new: AccountId,
    pub role: SignerRole,
  }

  /// The only account allowed to call the guard.
  #[pallet::storage]
  pub type GuardedWallet<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  /// Role of every registered signer. Accounts without an entry have no role.
  #[pallet::storage]
  #[pallet::getter(fn role_of)]
  pub type SignerRoles<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, SignerRole, OptionQuery>;

  /// Swap accepted by the last pre-check, kept until the wallet reports how execution went.
  #[pallet::storage]
  pub type PendingSwap<T: Config> = StorageValue<_, SwapRecord<T::AccountId>, OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// The guard was bound to a wallet.
    GuardInitialized { wallet: T::AccountId },
    /// A signer received a role during setup.
    RoleAssigned { who: T::AccountId, role: SignerRole },
    /// A signer was replaced by another of the same role.
    SignerSwapped {
      old: T::AccountId,
      new: T::AccountId,
      role: SignerRole,
    },
    /// A swap was undone because the wallet reported its execution failed.
    SwapReverted {
      old: T::AccountId,
      new: T::AccountId,
      role: SignerRole,
    },
    /// Post-execution check passed for a wallet transaction.
    ExecutionChecked { tx_hash: T::Hash, success: bool },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Caller is not the guarded wallet.
    NotWallet,
    /// Owner additions and removals are forbidden, as are swaps to the zero or wallet account.
    UnauthorizedOwnerChange,
    /// The replaced owner has no role.
    UnknownOwner,
    /// The incoming owner already holds a role.
    DuplicateOwner,
    /// Requested or observed threshold differs from the fixed threshold.
    InvalidThreshold,
    /// The wallet does not have exactly five distinct owners.
    InvalidOwnerCount,
    /// The wallet owners are not two humans and three agents.
    InvalidOwnerComposition,
    /// Setup lists have the wrong size, repeat an account or contain the zero account.
    InvalidRoleSetup,
    /// An owner-management payload has arguments of the wrong width or encoding.
    MalformedCall,
    /// The guard is already bound to a wallet.
    AlreadyInitialized,
    /// The guard is not bound to a wallet yet.
    GuardNotInitialized,
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    #[cfg(feature = "try-runtime")]
    fn try_state(_n: BlockNumberFor<T>) -> Result<(), DispatchError> {
      Self::do_try_state()
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Bind the guard to `wallet` and register its initial signers.
    ///
    /// Only usable once, and only when genesis did not configure the guard already.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::initialize())]
    pub fn initialize(
      origin: OriginFor<T>,
      wallet: T::AccountId,
      humans: BoundedVec<T::AccountId, ConstU32<{ TOTAL_SIGNERS }>>,
      agents: BoundedVec<T::AccountId, ConstU32<{ TOTAL_SIGNERS }>>,
    ) -> DispatchResult {
      T::SetupOrigin::ensure_origin(origin)?;
      Self::do_initialize(wallet, &humans, &agents)
    }

    /// Pre-execution check, submitted by the wallet account itself.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::check_transaction())]
    pub fn check_transaction(
      origin: OriginFor<T>,
      to: T::AccountId,
      #[pallet::compact] value: u128,
      payload: BoundedVec<u8, T::MaxPayloadLen>,
    ) -> DispatchResult {
      let caller = ensure_signed(origin)?;
      Self::do_pre_check(&caller, &to, value, &payload)
    }

    /// Post-execution check, submitted by the wallet account itself.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::check_after_execution())]
    pub fn check_after_execution(
      origin: OriginFor<T>,
      tx_hash: T::Hash,
      success: bool,
    ) -> DispatchResult {
      let caller = ensure_signed(origin)?;
      Self::do_post_check(&caller, tx_hash, success)
    }
  }

  #[pallet::extra_constants]
  impl<T: Config> Pallet<T> {
    pub fn required_threshold() -> u32 {
      REQUIRED_THRESHOLD
    }

    pub fn required_humans() -> u32 {
      REQUIRED_HUMANS
    }

    pub fn required_agents() -> u32 {
      REQUIRED_AGENTS
    }

    pub fn total_signers() -> u32 {
      TOTAL_SIGNERS
    }
  }

  impl<T: Config> Pallet<T> {
    pub(crate) fn do_initialize(
      wallet: T::AccountId,
      humans: &[T::AccountId],
      agents: &[T::AccountId],
    ) -> DispatchResult {
      ensure!(
        !GuardedWallet::<T>::exists(),
        Error::<T>::AlreadyInitialized
      );
      ensure!(
        humans.len() == REQUIRED_HUMANS as usize && agents.len() == REQUIRED_AGENTS as usize,
        Error::<T>::InvalidRoleSetup
      );
      // The wallet may not sign for itself either.
      let mut seen = BTreeSet::new();
      for who in core::iter::once(&wallet).chain(humans).chain(agents) {
        ensure!(
          !Self::is_zero_account(who) && seen.insert(who),
          Error::<T>::InvalidRoleSetup
        );
      }

      GuardedWallet::<T>::put(&wallet);
      let assignments = humans
        .iter()
        .map(|who| (who, SignerRole::Human))
        .chain(agents.iter().map(|who| (who, SignerRole::Agent)));
      for (who, role) in assignments {
        SignerRoles::<T>::insert(who, role);
        Self::deposit_event(Event::RoleAssigned {
          who: who.clone(),
          role,
        });
      }
      log::debug!(target: LOG_TARGET, "guard bound to wallet {:?}", wallet);
      Self::deposit_event(Event::GuardInitialized { wallet });
      Ok(())
    }

    /// Move the role held by `old` to `new` in one step and return it. Nothing is written unless
    /// `old` holds a role and `new` holds none.
    pub(crate) fn reassign(
      old: &T::AccountId,
      new: &T::AccountId,
    ) -> Result<SignerRole, DispatchError> {
      let role = SignerRoles::<T>::get(old).ok_or(Error::<T>::UnknownOwner)?;
      ensure!(
        !SignerRoles::<T>::contains_key(new),
        Error::<T>::DuplicateOwner
      );
      SignerRoles::<T>::remove(old);
      SignerRoles::<T>::insert(new, role);
      Self::deposit_event(Event::SignerSwapped {
        old: old.clone(),
        new: new.clone(),
        role,
      });
      Ok(role)
    }

    /// Undo a swap whose execution failed.
    fn revert_swap(swap: SwapRecord<T::AccountId>) {
      SignerRoles::<T>::remove(&swap.new);
      SignerRoles::<T>::insert(&swap.old, swap.role);
      log::debug!(
        target: LOG_TARGET,
        "swap {:?} -> {:?} reverted after failed execution",
        swap.old,
        swap.new
      );
      Self::deposit_event(Event::SwapReverted {
        old: swap.old,
        new: swap.new,
        role: swap.role,
      });
    }

    pub(crate) fn do_pre_check(
      caller: &T::AccountId,
      to: &T::AccountId,
      value: u128,
      payload: &[u8],
    ) -> DispatchResult {
      let wallet = Self::ensure_wallet(caller)?;
      let swap = if to == &wallet {
        Self::check_self_call(&wallet, payload)?
      } else {
        log::debug!(
          target: LOG_TARGET,
          "ordinary transaction to {:?}, value {}",
          to,
          value
        );
        None
      };
      let projected = swap.as_ref().map(|s| (&s.old, &s.new));
      Self::check_composition(&wallet, projected).inspect_err(|e| {
        log::warn!(target: LOG_TARGET, "pre-check rejected: {:?}", e);
      })?;
      if let Some(swap) = swap {
        PendingSwap::<T>::put(swap);
      }
      Ok(())
    }

    pub(crate) fn do_post_check(
      caller: &T::AccountId,
      tx_hash: T::Hash,
      success: bool,
    ) -> DispatchResult {
      let wallet = Self::ensure_wallet(caller)?;
      let pending = PendingSwap::<T>::take();
      if success {
        Self::check_composition(&wallet, None).inspect_err(|e| {
          log::warn!(
            target: LOG_TARGET,
            "post-check rejected {:?}: {:?}",
            tx_hash,
            e
          );
        })?;
      } else if let Some(swap) = pending {
        // A failed execution changed nothing, so the registry goes back too.
        Self::revert_swap(swap);
      }
      Self::deposit_event(Event::ExecutionChecked { tx_hash, success });
      Ok(())
    }

    fn ensure_wallet(caller: &T::AccountId) -> Result<T::AccountId, DispatchError> {
      let wallet = GuardedWallet::<T>::get().ok_or(Error::<T>::NotWallet)?;
      ensure!(caller == &wallet, Error::<T>::NotWallet);
      Ok(wallet)
    }

    /// Apply the owner-management policy to a payload the wallet sends to itself. Returns the
    /// accepted swap, if any.
    fn check_self_call(
      wallet: &T::AccountId,
      payload: &[u8],
    ) -> Result<Option<SwapRecord<T::AccountId>>, DispatchError> {
      // Membership changes are refused on the selector alone, whatever the arguments.
      if OwnerCallKind::of_payload(payload).is_some_and(OwnerCallKind::changes_membership) {
        log::warn!(target: LOG_TARGET, "owner addition or removal refused");
        return Err(Error::<T>::UnauthorizedOwnerChange.into());
      }
      let call = WalletCall::<T::AccountId>::parse(payload).map_err(|e| {
        log::warn!(target: LOG_TARGET, "malformed wallet call: {:?}", e);
        Error::<T>::MalformedCall
      })?;
      match call {
        WalletCall::SwapOwner { old, new, .. } => {
          // Same eligibility as setup: no zero account, and the wallet never signs for itself.
          ensure!(
            !Self::is_zero_account(&new) && &new != wallet,
            Error::<T>::UnauthorizedOwnerChange
          );
          let role = Self::reassign(&old, &new)?;
          log::debug!(
            target: LOG_TARGET,
            "swap {:?} -> {:?} accepted as {:?}",
            old,
            new,
            role
          );
          Ok(Some(SwapRecord { old, new, role }))
        }
        WalletCall::ChangeThreshold { threshold } => {
          ensure!(
            threshold == REQUIRED_THRESHOLD,
            Error::<T>::InvalidThreshold
          );
          Ok(None)
        }
        WalletCall::AddOwner { .. } | WalletCall::RemoveOwner { .. } => {
          Err(Error::<T>::UnauthorizedOwnerChange.into())
        }
        WalletCall::Other => Ok(None),
      }
    }

    /// Strict composition check used by both the pre- and post-execution paths.
    pub fn validate_composition() -> DispatchResult {
      Self::check_live_composition()?;
      Ok(())
    }

    /// Lenient form of [`Self::validate_composition`].
    pub fn is_valid_composition() -> bool {
      Self::check_live_composition().is_ok()
    }

    /// `(humans, agents)` among the wallet's live owners.
    pub fn role_composition() -> (u32, u32) {
      GuardedWallet::<T>::get()
        .map(|wallet| Self::composition_of(&T::Wallet::owners(&wallet)))
        .unwrap_or_default()
        .into()
    }

    /// Registered signers holding `role`.
    pub fn signers_with_role(role: SignerRole) -> Vec<T::AccountId> {
      SignerRoles::<T>::iter()
        .filter_map(|(who, held)| (held == role).then_some(who))
        .collect()
    }

    fn check_live_composition() -> Result<RoleComposition, Error<T>> {
      let wallet = GuardedWallet::<T>::get().ok_or(Error::<T>::GuardNotInitialized)?;
      Self::check_composition(&wallet, None)
    }

    /// Validate the wallet's owner set. When `swap` is given the set is checked as it will be
    /// once the wallet has replaced `old` with `new`.
    fn check_composition(
      wallet: &T::AccountId,
      swap: Option<(&T::AccountId, &T::AccountId)>,
    ) -> Result<RoleComposition, Error<T>> {
      let mut owners = T::Wallet::owners(wallet);
      if let Some((old, new)) = swap {
        for owner in owners.iter_mut() {
          if &*owner == old {
            *owner = new.clone();
          }
        }
      }
      Self::check_owner_set(&owners, T::Wallet::threshold(wallet))
    }

    fn check_owner_set(
      owners: &[T::AccountId],
      threshold: u32,
    ) -> Result<RoleComposition, Error<T>> {
      let distinct = owners.iter().collect::<BTreeSet<_>>().len();
      ensure!(
        owners.len() == TOTAL_SIGNERS as usize && distinct == owners.len(),
        Error::<T>::InvalidOwnerCount
      );
      let composition = Self::composition_of(owners);
      ensure!(
        composition.is_required(),
        Error::<T>::InvalidOwnerComposition
      );
      ensure!(
        threshold == REQUIRED_THRESHOLD,
        Error::<T>::InvalidThreshold
      );
      Ok(composition)
    }

    fn composition_of(owners: &[T::AccountId]) -> RoleComposition {
      owners
        .iter()
        .fold(RoleComposition::default(), |mut composition, owner| {
          composition.tally(SignerRoles::<T>::get(owner));
          composition
        })
    }

    fn is_zero_account(who: &T::AccountId) -> bool {
      who.using_encoded(|bytes| bytes.iter().all(|b| *b == 0))
    }
  }

  #[cfg(any(feature = "try-runtime", test))]
  impl<T: Config> Pallet<T> {
    /// Registry and live wallet agree on the required composition.
    pub fn do_try_state() -> Result<(), DispatchError> {
      let Some(wallet) = GuardedWallet::<T>::get() else {
        ensure!(
          SignerRoles::<T>::iter().next().is_none() && !PendingSwap::<T>::exists(),
          "guard state present without a guarded wallet"
        );
        return Ok(());
      };
      let mut registered = RoleComposition::default();
      SignerRoles::<T>::iter_values().for_each(|role| registered.tally(Some(role)));
      ensure!(
        registered.is_required(),
        "registry does not hold two humans and three agents"
      );
      // A swap awaiting its post-check may not be reflected by the wallet yet.
      let pending = PendingSwap::<T>::get();
      Self::check_composition(&wallet, pending.as_ref().map(|s| (&s.old, &s.new)))
        .map_err(|_| "live wallet composition is invalid")?;
      Ok(())
    }
  }

  impl<T: Config> TransactionGuard<T::AccountId, T::Hash> for Pallet<T> {
    fn pre_check(
      caller: &T::AccountId,
      to: &T::AccountId,
      value: u128,
      payload: &[u8],
    ) -> DispatchResult {
      with_storage_layer(|| Self::do_pre_check(caller, to, value, payload))
    }

    fn post_check(caller: &T::AccountId, tx_hash: T::Hash, success: bool) -> DispatchResult {
      with_storage_layer(|| Self::do_post_check(caller, tx_hash, success))
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// Wallet to guard. Leave unset to bind later through `initialize`.
    pub wallet: Option<T::AccountId>,
    pub humans: Vec<T::AccountId>,
    pub agents: Vec<T::AccountId>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      if let Some(wallet) = &self.wallet {
        Pallet::<T>::do_initialize(wallet.clone(), &self.humans, &self.agents)
          .expect("signer guard genesis must name two humans and three agents");
      }
    }
  }
}
