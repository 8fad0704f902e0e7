//! Wallet Self-Calls
//!
//! A transaction the wallet sends to its own account is an administrative call on the wallet
//! itself. The payload layout is a 4-byte selector followed by the SCALE encoding of fixed-width
//! arguments. The selectors are the well-known multisig owner-management selectors, so tooling
//! that already speaks them can build payloads unchanged.
//!
//! ```text
//! add-owner         0x0d582f13 ++ (owner, threshold: u32)
//! remove-owner      0xf8dc5dd9 ++ (prev, owner, threshold: u32)
//! swap-owner        0xe318b52b ++ (prev, old, new)
//! change-threshold  0x694e80c3 ++ (threshold: u32)
//! ```

use codec::{Decode, DecodeAll, Encode, MaxEncodedLen};

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

pub const SELECTOR_LEN: usize = 4;

pub mod selectors {
  pub const ADD_OWNER: [u8; 4] = [0x0d, 0x58, 0x2f, 0x13];
  pub const REMOVE_OWNER: [u8; 4] = [0xf8, 0xdc, 0x5d, 0xd9];
  pub const SWAP_OWNER: [u8; 4] = [0xe3, 0x18, 0xb5, 0x2b];
  pub const CHANGE_THRESHOLD: [u8; 4] = [0x69, 0x4e, 0x80, 0xc3];
}

/// Owner-management operation named by a selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OwnerCallKind {
  AddOwner,
  RemoveOwner,
  SwapOwner,
  ChangeThreshold,
}

impl OwnerCallKind {
  pub fn from_selector(selector: [u8; 4]) -> Option<Self> {
    match selector {
      selectors::ADD_OWNER => Some(Self::AddOwner),
      selectors::REMOVE_OWNER => Some(Self::RemoveOwner),
      selectors::SWAP_OWNER => Some(Self::SwapOwner),
      selectors::CHANGE_THRESHOLD => Some(Self::ChangeThreshold),
      _ => None,
    }
  }

  /// Classify a payload by its leading selector. Payloads too short to carry one are not
  /// owner-management calls.
  pub fn of_payload(payload: &[u8]) -> Option<Self> {
    let selector: [u8; 4] = payload.get(..SELECTOR_LEN)?.try_into().ok()?;
    Self::from_selector(selector)
  }

  pub const fn selector(self) -> [u8; 4] {
    match self {
      Self::AddOwner => selectors::ADD_OWNER,
      Self::RemoveOwner => selectors::REMOVE_OWNER,
      Self::SwapOwner => selectors::SWAP_OWNER,
      Self::ChangeThreshold => selectors::CHANGE_THRESHOLD,
    }
  }

  /// Grows or shrinks the owner set.
  pub const fn changes_membership(self) -> bool {
    matches!(self, Self::AddOwner | Self::RemoveOwner)
  }

  /// Exact width of the argument section that follows the selector.
  pub fn args_len<AccountId: MaxEncodedLen>(self) -> usize {
    let account = AccountId::max_encoded_len();
    let threshold = u32::max_encoded_len();
    match self {
      Self::AddOwner => account + threshold,
      Self::RemoveOwner => 2 * account + threshold,
      Self::SwapOwner => 3 * account,
      Self::ChangeThreshold => threshold,
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallDecodeError {
  /// The argument section does not have the width the selector requires.
  InvalidLength {
    kind: OwnerCallKind,
    expected: usize,
    actual: usize,
  },
  /// The argument bytes had the right width but are not a valid encoding.
  Undecodable(OwnerCallKind),
}

/// Decoded view of one payload sent by the wallet to itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WalletCall<AccountId> {
  AddOwner {
    owner: AccountId,
    threshold: u32,
  },
  RemoveOwner {
    prev: AccountId,
    owner: AccountId,
    threshold: u32,
  },
  SwapOwner {
    prev: AccountId,
    old: AccountId,
    new: AccountId,
  },
  ChangeThreshold {
    threshold: u32,
  },
  /// Anything that is not owner management.
  Other,
}

impl<AccountId: Encode + Decode + MaxEncodedLen> WalletCall<AccountId> {
  pub fn parse(payload: &[u8]) -> Result<Self, CallDecodeError> {
    let Some(kind) = OwnerCallKind::of_payload(payload) else {
      return Ok(Self::Other);
    };
    let args = &payload[SELECTOR_LEN..];
    let expected = kind.args_len::<AccountId>();
    if args.len() != expected {
      return Err(CallDecodeError::InvalidLength {
        kind,
        expected,
        actual: args.len(),
      });
    }
    let undecodable = |_| CallDecodeError::Undecodable(kind);
    let mut input = args;
    let call = match kind {
      OwnerCallKind::AddOwner => {
        let (owner, threshold) = <(AccountId, u32)>::decode_all(&mut input).map_err(undecodable)?;
        Self::AddOwner { owner, threshold }
      }
      OwnerCallKind::RemoveOwner => {
        let (prev, owner, threshold) =
          <(AccountId, AccountId, u32)>::decode_all(&mut input).map_err(undecodable)?;
        Self::RemoveOwner {
          prev,
          owner,
          threshold,
        }
      }
      OwnerCallKind::SwapOwner => {
        let (prev, old, new) =
          <(AccountId, AccountId, AccountId)>::decode_all(&mut input).map_err(undecodable)?;
        Self::SwapOwner { prev, old, new }
      }
      OwnerCallKind::ChangeThreshold => {
        let threshold = u32::decode_all(&mut input).map_err(undecodable)?;
        Self::ChangeThreshold { threshold }
      }
    };
    Ok(call)
  }

  pub fn kind(&self) -> Option<OwnerCallKind> {
    match self {
      Self::AddOwner { .. } => Some(OwnerCallKind::AddOwner),
      Self::RemoveOwner { .. } => Some(OwnerCallKind::RemoveOwner),
      Self::SwapOwner { .. } => Some(OwnerCallKind::SwapOwner),
      Self::ChangeThreshold { .. } => Some(OwnerCallKind::ChangeThreshold),
      Self::Other => None,
    }
  }

  /// Build the payload for this call. `Other` has no canonical encoding and yields an empty
  /// payload.
  pub fn to_payload(&self) -> Vec<u8> {
    let Some(kind) = self.kind() else {
      return Vec::new();
    };
    let mut out = Vec::with_capacity(SELECTOR_LEN + kind.args_len::<AccountId>());
    out.extend_from_slice(&kind.selector());
    match self {
      Self::AddOwner { owner, threshold } => (owner, threshold).encode_to(&mut out),
      Self::RemoveOwner {
        prev,
        owner,
        threshold,
      } => (prev, owner, threshold).encode_to(&mut out),
      Self::SwapOwner { prev, old, new } => (prev, old, new).encode_to(&mut out),
      Self::ChangeThreshold { threshold } => threshold.encode_to(&mut out),
      Self::Other => {}
    }
    out
  }
}
