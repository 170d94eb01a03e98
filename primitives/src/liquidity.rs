use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};
use sp_arithmetic::{Rounding, helpers_128bit::multiply_by_rational_with_rounding};

use crate::ecosystem::{Balance, pallet_ids, params};

/// One of the two interchangeable holders of bonded collateral.
///
/// Both custodians bond into the same job in alternation so the job never
/// drops to zero registered collateral while one of them is unwinding.
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
pub enum Custodian {
  #[default]
  A,
  B,
}

impl Custodian {
  /// Both custodians in scan order.
  pub const ALL: [Custodian; 2] = [Custodian::A, Custodian::B];

  pub fn index(self) -> usize {
    match self {
      Custodian::A => 0,
      Custodian::B => 1,
    }
  }

  pub fn other(self) -> Self {
    match self {
      Custodian::A => Custodian::B,
      Custodian::B => Custodian::A,
    }
  }

  /// Seed used to derive the custodian's sub-account.
  pub fn seed(self) -> &'static [u8; 4] {
    match self {
      Custodian::A => pallet_ids::CUSTODIAN_A_ID,
      Custodian::B => pallet_ids::CUSTODIAN_B_ID,
    }
  }
}

/// Bonding progress of a single custodian for a job.
///
/// `Idle -> LiquidityAdded -> CreditApplied -> Unbonding -> Idle`
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
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum CustodianStep {
  #[default]
  Idle,
  LiquidityAdded,
  CreditApplied,
  Unbonding,
}

/// The single next step a job needs from the cycle engine.
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
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum JobAction {
  #[default]
  None,
  AddLiquidityToJob,
  ApplyCreditToJob,
  UnbondLiquidityFromJob,
  RemoveLiquidityFromJob,
}

/// Fee taken from a deposit of `amount` at `rate` basis points, rounded down.
///
/// Returns `None` only when the multiplication cannot be represented.
pub fn liquidity_fee(amount: Balance, rate: u32) -> Option<Balance> {
  multiply_by_rational_with_rounding(
    amount,
    rate as Balance,
    params::FEE_PRECISION,
    Rounding::Down,
  )
}

/// Rounds an amount down to an even number so each custodian can bond exactly half.
pub fn normalize_even(amount: Balance) -> Balance {
  amount / 2 * 2
}
