//! Per depositor allocations to jobs.
//!
//! `amount` is what the user wants bonded, `locked` is what was taken out of
//! idle balance for the job. Lowering `amount` never touches `locked`: the
//! difference only returns to idle balance once the job has gone through
//! [`UNLOCK_CYCLES`] custodian removals, or once the job stopped using the token.

use crate::{
  Config, Error, Event, JobCycle, JobLiquidityDesiredAmount, JobLiquidityIndex, LOG_TARGET,
  LiquidityMinAmount, Pallet, UserBalances, UserJobCycle, UserJobPositions, WorkRegistry,
};
use frame::prelude::*;
use primitives::{Balance, normalize_even, params::UNLOCK_CYCLES};

impl<T: Config> Pallet<T> {
  pub(crate) fn do_set_job_liquidity_amount(
    user: &T::AccountId,
    token: u32,
    job: &T::JobId,
    amount: Balance,
  ) -> DispatchResult {
    let amount = normalize_even(amount);
    let current = UserJobPositions::<T>::get((user, job, token)).amount;
    ensure!(amount != current, Error::<T>::AmountUnchanged);
    if amount > current {
      Self::add_liquidity_of_user_to_job(user, token, job, amount - current)?;
    } else if amount < current {
      Self::sub_liquidity_of_user_from_job(user, token, job, current - amount)?;
    }
    Self::deposit_event(Event::JobLiquiditySet {
      user: user.clone(),
      job: *job,
      token,
      amount,
    });
    Ok(())
  }

  pub(crate) fn add_liquidity_of_user_to_job(
    user: &T::AccountId,
    token: u32,
    job: &T::JobId,
    amount: Balance,
  ) -> DispatchResult {
    ensure!(amount > 0, Error::<T>::ZeroAmount);
    ensure!(T::Registry::is_job(job), Error::<T>::JobNotRegistered);

    let mut balance = UserBalances::<T>::get(user, token);
    ensure!(balance.idle >= amount, Error::<T>::NoIdleLiquidityAvailable);
    let min = LiquidityMinAmount::<T>::get(token);
    ensure!(min > 0, Error::<T>::LiquidityMinNotSet);

    let mut position = UserJobPositions::<T>::get((user, job, token));
    position.amount = position.amount.checked_add(amount).ok_or(Error::<T>::Overflow)?;
    position.locked = position.locked.checked_add(amount).ok_or(Error::<T>::Overflow)?;
    ensure!(
      position.amount >= min && position.locked >= min,
      Error::<T>::LockedAmountNotEnough
    );

    Self::add_lp_to_job(job, token)?;
    JobLiquidityDesiredAmount::<T>::try_mutate(job, token, |desired| -> DispatchResult {
      *desired = desired.checked_add(amount).ok_or(Error::<T>::Overflow)?;
      Ok(())
    })?;
    balance.idle -= amount;
    UserBalances::<T>::insert(user, token, balance);
    UserJobPositions::<T>::insert((user, job, token), position);
    UserJobCycle::<T>::insert(user, job, JobCycle::<T>::get(job));

    log::debug!(
      target: LOG_TARGET,
      "{:?} allocated {} of token {} to job {:?}",
      user,
      amount,
      token,
      job
    );
    Ok(())
  }

  pub(crate) fn sub_liquidity_of_user_from_job(
    user: &T::AccountId,
    token: u32,
    job: &T::JobId,
    amount: Balance,
  ) -> DispatchResult {
    let mut position = UserJobPositions::<T>::get((user, job, token));
    ensure!(amount <= position.amount, Error::<T>::NotEnoughLPInJob);
    let remaining = position.amount - amount;
    ensure!(
      remaining == 0 || remaining >= LiquidityMinAmount::<T>::get(token),
      Error::<T>::LockedAmountNotEnough
    );

    position.amount = remaining;
    UserJobPositions::<T>::insert((user, job, token), position);
    JobLiquidityDesiredAmount::<T>::mutate_exists(job, token, |desired| {
      *desired = desired
        .map(|value| value.saturating_sub(amount))
        .filter(|value| *value > 0);
    });
    UserJobCycle::<T>::insert(user, job, JobCycle::<T>::get(job));
    Self::retire_liquidity_if_unused(job, token);

    log::debug!(
      target: LOG_TARGET,
      "{:?} released {} of token {} from job {:?}",
      user,
      amount,
      token,
      job
    );
    Ok(())
  }

  /// Return released collateral to the user's idle balance.
  pub(crate) fn do_remove_idle_liquidity_from_job(
    user: &T::AccountId,
    token: u32,
    job: &T::JobId,
    amount: Balance,
  ) -> DispatchResult {
    let amount = normalize_even(amount);
    ensure!(amount > 0, Error::<T>::ZeroAmount);

    let unlocked_at = UserJobCycle::<T>::get(user, job).saturating_add(UNLOCK_CYCLES);
    ensure!(
      !JobLiquidityIndex::<T>::contains_key(job, token) || JobCycle::<T>::get(job) >= unlocked_at,
      Error::<T>::LiquidityStillLocked
    );

    UserJobPositions::<T>::try_mutate_exists((user, job, token), |maybe_position| {
      let mut position = maybe_position.unwrap_or_default();
      ensure!(
        amount <= position.surplus(),
        Error::<T>::AmountBiggerThanIdleAvailable
      );
      position.locked -= amount;
      *maybe_position = (!position.is_empty()).then_some(position);
      Ok::<_, DispatchError>(())
    })?;
    UserBalances::<T>::try_mutate(user, token, |balance| -> DispatchResult {
      balance.idle = balance.idle.checked_add(amount).ok_or(Error::<T>::Overflow)?;
      Ok(())
    })?;

    Self::deposit_event(Event::IdleLiquidityRemovedFromJob {
      user: user.clone(),
      job: *job,
      token,
      amount,
    });
    Ok(())
  }
}
