//! Adapter traits for the liquidity manager
//!
//! The work registry is the external network jobs bond collateral against. The
//! manager observes its job membership and drives its four liquidity primitives;
//! bonding maturities are enforced on the registry side.

use frame::prelude::*;
use primitives::Balance;

/// External work registry consumed by the cycle engine.
///
/// `provider` is always one of the two custodian accounts. Tokens move from the
/// provider into the registry on `add_liquidity` and back on `remove_liquidity`.
pub trait WorkRegistry<AccountId, JobId> {
  /// Whether `job` is currently registered.
  fn is_job(job: &JobId) -> bool;

  /// Bond `amount` of `token` from `provider` to `job`.
  fn add_liquidity(provider: &AccountId, token: u32, job: &JobId, amount: Balance)
  -> DispatchResult;

  /// Turn matured bonded liquidity into job credit.
  fn apply_credit(provider: &AccountId, token: u32, job: &JobId) -> DispatchResult;

  /// Start unbonding `amount` of `token` previously bonded by `provider`.
  fn unbond_liquidity(
    provider: &AccountId,
    token: u32,
    job: &JobId,
    amount: Balance,
  ) -> DispatchResult;

  /// Return matured unbonded liquidity to `provider`, yielding the amount released.
  fn remove_liquidity(provider: &AccountId, token: u32, job: &JobId)
  -> Result<Balance, DispatchError>;
}

/// Registry stub for configurations without an external work network.
impl<AccountId, JobId> WorkRegistry<AccountId, JobId> for () {
  fn is_job(_: &JobId) -> bool {
    false
  }

  fn add_liquidity(_: &AccountId, _: u32, _: &JobId, _: Balance) -> DispatchResult {
    Err(DispatchError::Other("WorkRegistry not configured"))
  }

  fn apply_credit(_: &AccountId, _: u32, _: &JobId) -> DispatchResult {
    Err(DispatchError::Other("WorkRegistry not configured"))
  }

  fn unbond_liquidity(_: &AccountId, _: u32, _: &JobId, _: Balance) -> DispatchResult {
    Err(DispatchError::Other("WorkRegistry not configured"))
  }

  fn remove_liquidity(_: &AccountId, _: u32, _: &JobId) -> Result<Balance, DispatchError> {
    Err(DispatchError::Other("WorkRegistry not configured"))
  }
}

/// Work entrypoint exposed to a keeper-incentive layer.
///
/// Each successful `work` advances the job's cycle by exactly one action.
pub trait JobWorker<JobId> {
  fn workable(job: &JobId) -> Result<bool, DispatchError>;

  fn work(job: &JobId) -> DispatchResult;
}
