//! Ecosystem Constants for the Job Liquidity Manager
//!
//! This module centralizes system-level constants: pallet IDs used to derive the
//! custody accounts and the parameters imposed by the external work registry.
//!
//! Runtime configurations and test mocks pull their defaults from here.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// These IDs are used by Polkadot SDK's `PalletId::into_account_truncating()`
/// to deterministically generate accounts for pallet-specific operations.
pub mod pallet_ids {
  /// Liquidity Manager pallet ID (custody of idle deposits)
  pub const LIQUIDITY_MANAGER_PALLET_ID: &[u8; 8] = b"py/lqmgr";

  /// Sub-account seed of custodian A
  pub const CUSTODIAN_A_ID: &[u8; 4] = b"cs/a";

  /// Sub-account seed of custodian B
  pub const CUSTODIAN_B_ID: &[u8; 4] = b"cs/b";
}

/// Ecosystem parameters shared by the manager and its runtime glue.
pub mod params {
  use super::Balance;

  /// Seconds in one day.
  pub const DAY_SECS: u64 = 24 * 60 * 60;

  /// Denominator of the deposit fee rate (basis points).
  pub const FEE_PRECISION: Balance = 10_000;

  /// Hard cap of the deposit fee rate (20%).
  pub const MAX_LIQUIDITY_FEE: u32 = 2_000;

  /// Bonding maturity enforced by the work registry before credit can be applied (3 days).
  pub const BONDING_DELAY_SECS: u64 = 3 * DAY_SECS;

  /// Unbonding maturity enforced by the work registry before liquidity can be removed (14 days).
  pub const UNBONDING_DELAY_SECS: u64 = 14 * DAY_SECS;

  /// Number of completed custodian rounds after which reduced collateral is released.
  pub const UNLOCK_CYCLES: u32 = 2;
}
