use frame::prelude::*;
use primitives::{Balance, Custodian, CustodianStep, JobAction};

/// Per (user, token) balance held by the manager.
#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct UserBalance {
  /// Everything the user owns in the manager: idle plus locked in jobs.
  pub total: Balance,
  /// Not allocated to any job, withdrawable.
  pub idle: Balance,
}

/// Per (user, job, token) allocation.
#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct UserJobPosition {
  /// Amount the user wants bonded to the job.
  pub amount: Balance,
  /// Amount taken out of idle balance and not yet released back to it.
  pub locked: Balance,
}

impl UserJobPosition {
  pub fn is_empty(&self) -> bool {
    self.amount == 0 && self.locked == 0
  }

  /// Locked collateral no longer backing the desired amount.
  pub fn surplus(&self) -> Balance {
    self.locked.saturating_sub(self.amount)
  }
}

#[derive(Clone, Copy, Debug, Default, Decode, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen)]
pub struct CustodianSlot {
  pub step: CustodianStep,
  /// Timestamp (seconds) at which `step` was entered.
  pub since: u64,
}

/// Bonding state of both custodians for one job.
///
/// Kept as a two-slot array indexed by [`Custodian::index`] with an explicit
/// active marker, so the staggering invariant can be checked on one value.
#[derive(Clone, Copy, Debug, Default, Decode, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen)]
pub struct CustodianPair {
  pub slots: [CustodianSlot; 2],
  /// Custodian that performed the latest `AddLiquidityToJob`.
  pub active: Custodian,
}

impl CustodianPair {
  pub fn slot(&self, custodian: Custodian) -> &CustodianSlot {
    &self.slots[custodian.index()]
  }

  pub fn step(&self, custodian: Custodian) -> CustodianStep {
    self.slot(custodian).step
  }

  pub fn enter(&mut self, custodian: Custodian, step: CustodianStep, now: u64) {
    self.slots[custodian.index()] = CustodianSlot { step, since: now };
  }

  pub fn both_idle(&self) -> bool {
    self
      .slots
      .iter()
      .all(|slot| slot.step == CustodianStep::Idle)
  }

  /// At most one custodian unwinds at a time.
  pub fn is_staggered(&self) -> bool {
    !self
      .slots
      .iter()
      .all(|slot| slot.step == CustodianStep::Unbonding)
  }
}

/// Result of the next-action query.
#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct NextAction {
  pub custodian: Custodian,
  pub action: JobAction,
}

impl NextAction {
  pub fn none() -> Self {
    Self::default()
  }

  pub fn on(custodian: Custodian, action: JobAction) -> Self {
    Self { custodian, action }
  }

  pub fn is_due(&self) -> bool {
    self.action != JobAction::None
  }
}
