//! Signer Composition
//!
//! The guarded wallet is always owned by two human signers and three automated agents,
//! executing with a four-of-five threshold. These constants are the single source of truth
//! for that shape and are re-used by every pallet that reasons about the signer set.

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Number of human signers the wallet must have.
pub const REQUIRED_HUMANS: u32 = 2;

/// Number of automated agent signers the wallet must have.
pub const REQUIRED_AGENTS: u32 = 3;

/// Total number of wallet owners.
pub const TOTAL_SIGNERS: u32 = REQUIRED_HUMANS + REQUIRED_AGENTS;

/// Execution threshold; it can never be changed.
pub const REQUIRED_THRESHOLD: u32 = 4;

/// Role held by a registered signer. An unregistered account has no role at all.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
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
pub enum SignerRole {
  /// A person holding a signing key
  Human,
  /// An automated agent co-signing on its own analysis
  Agent,
}

impl SignerRole {
  /// How many owners of this role the wallet must have.
  pub const fn required(self) -> u32 {
    match self {
      SignerRole::Human => REQUIRED_HUMANS,
      SignerRole::Agent => REQUIRED_AGENTS,
    }
  }
}

/// Tally of wallet owners by role.
#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct RoleComposition {
  pub humans: u32,
  pub agents: u32,
}

impl RoleComposition {
  /// The only composition the wallet is allowed to have.
  pub const REQUIRED: Self = Self {
    humans: REQUIRED_HUMANS,
    agents: REQUIRED_AGENTS,
  };

  /// Count one more owner of `role`. Owners without a role are not counted.
  pub fn tally(&mut self, role: Option<SignerRole>) {
    match role {
      Some(SignerRole::Human) => self.humans = self.humans.saturating_add(1),
      Some(SignerRole::Agent) => self.agents = self.agents.saturating_add(1),
      None => {}
    }
  }

  pub fn is_required(&self) -> bool {
    *self == Self::REQUIRED
  }
}

impl From<RoleComposition> for (u32, u32) {
  fn from(c: RoleComposition) -> Self {
    (c.humans, c.agents)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn constants_are_consistent() {
    assert_eq!(TOTAL_SIGNERS, 5);
    assert!(REQUIRED_THRESHOLD <= TOTAL_SIGNERS);
    assert_eq!(SignerRole::Human.required() + SignerRole::Agent.required(), TOTAL_SIGNERS);
  }

  #[test]
  fn tally_ignores_unregistered() {
    let mut c = RoleComposition::default();
    for role in [
      Some(SignerRole::Human),
      None,
      Some(SignerRole::Agent),
      Some(SignerRole::Human),
      Some(SignerRole::Agent),
      Some(SignerRole::Agent),
    ] {
      c.tally(role);
    }
    assert!(c.is_required());
    assert_eq!(<(u32, u32)>::from(c), (2, 3));
  }

  #[test]
  fn three_humans_is_not_required_shape() {
    let c = RoleComposition {
      humans: 3,
      agents: 2,
    };
    assert!(!c.is_required());
  }
}
