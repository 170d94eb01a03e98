//! Custodian cycle engine
//!
//! Each job is bonded by two custodians taking turns:
//! `Idle -> LiquidityAdded -> CreditApplied -> Unbonding -> Idle`. A custodian
//! only starts unbonding once the other one holds credited liquidity, so the
//! job keeps registered collateral for as long as anyone wants it bonded.
//! Every completed removal bumps the job cycle used by the two-cycle release
//! rule of the user ledger.

use crate::{
  Config, CustodianLiquidity, Error, Event, JobCustodians, JobCycle, JobLiquidities,
  JobLiquidityDesiredAmount, LOG_TARGET, Pallet, WorkRegistry,
  types::{CustodianPair, NextAction},
};
use frame::deps::frame_support::{
  storage::with_storage_layer,
  traits::{fungibles::Mutate, tokens::Preservation},
};
use frame::prelude::*;
use primitives::{Balance, Custodian, CustodianStep, JobAction};

/// Clock reading and registry maturities, in seconds.
#[derive(Clone, Copy, Debug)]
pub struct CycleClock {
  pub now: u64,
  pub bonding_delay: u64,
  pub unbonding_delay: u64,
}

impl CycleClock {
  fn elapsed(&self, since: u64, delay: u64) -> bool {
    self.now >= since.saturating_add(delay)
  }
}

/// Next action for a job given both custodians, the job's total desired
/// amount and whether it still uses any token.
///
/// `None` means the job holds no liquidity at all and nothing can ever be due
/// until someone allocates to it again.
pub fn next_action(
  pair: &CustodianPair,
  desired: Balance,
  has_liquidities: bool,
  clock: &CycleClock,
) -> Option<NextAction> {
  if !has_liquidities || (desired == 0 && pair.both_idle()) {
    return None;
  }

  if desired > 0 {
    if pair.both_idle() {
      return Some(NextAction::on(pair.active, JobAction::AddLiquidityToJob));
    }
    for custodian in Custodian::ALL {
      if pair.step(custodian) != CustodianStep::Idle {
        continue;
      }
      let other = pair.slot(custodian.other());
      let ready = match other.step {
        CustodianStep::CreditApplied => clock.elapsed(other.since, clock.unbonding_delay),
        CustodianStep::Unbonding => true,
        _ => false,
      };
      if ready {
        return Some(NextAction::on(custodian, JobAction::AddLiquidityToJob));
      }
    }
  }

  for custodian in Custodian::ALL {
    let slot = pair.slot(custodian);
    let other = pair.slot(custodian.other());
    let action = match slot.step {
      CustodianStep::LiquidityAdded if clock.elapsed(slot.since, clock.bonding_delay) => {
        JobAction::ApplyCreditToJob
      }
      CustodianStep::CreditApplied
        if desired == 0
          && other.step == CustodianStep::Idle
          && clock.elapsed(other.since, clock.bonding_delay) =>
      {
        JobAction::UnbondLiquidityFromJob
      }
      CustodianStep::Unbonding if clock.elapsed(slot.since, clock.unbonding_delay) => {
        JobAction::RemoveLiquidityFromJob
      }
      _ => continue,
    };
    return Some(NextAction::on(custodian, action));
  }

  Some(NextAction::none())
}

impl<T: Config> Pallet<T> {
  pub(crate) fn cycle_clock() -> CycleClock {
    CycleClock {
      now: Self::now(),
      bonding_delay: T::BondingDelay::get(),
      unbonding_delay: T::UnbondingDelay::get(),
    }
  }

  pub(crate) fn job_desired_total(job: &T::JobId) -> Balance {
    JobLiquidities::<T>::get(job)
      .iter()
      .fold(0, |total: Balance, token| {
        total.saturating_add(JobLiquidityDesiredAmount::<T>::get(job, token))
      })
  }

  /// Execute the due action of a job, failing with `NotActionable` if none is.
  ///
  /// Runs in its own storage layer so a failing registry call leaves the job
  /// untouched.
  pub(crate) fn do_work(job: &T::JobId) -> Result<NextAction, DispatchError> {
    with_storage_layer(|| Self::execute_next_action(job))
  }

  fn execute_next_action(job: &T::JobId) -> Result<NextAction, DispatchError> {
    let next = Self::get_next_action(job)?;
    ensure!(next.is_due(), Error::<T>::NotActionable);
    match next.action {
      JobAction::AddLiquidityToJob => Self::add_liquidity_to_job(next.custodian, job)?,
      JobAction::ApplyCreditToJob => Self::apply_credit_to_job(next.custodian, job)?,
      JobAction::UnbondLiquidityFromJob => Self::unbond_liquidity_from_job(next.custodian, job)?,
      JobAction::RemoveLiquidityFromJob => {
        Self::remove_liquidity_from_job(next.custodian, job)?;
        // A freed custodian re-bonds right away when the other one is already credited
        if let Ok(chained) = Self::get_next_action(job) {
          if chained == NextAction::on(next.custodian, JobAction::AddLiquidityToJob) {
            Self::add_liquidity_to_job(next.custodian, job)?;
          }
        }
      }
      JobAction::None => return Err(Error::<T>::NotActionable.into()),
    }
    Ok(next)
  }

  /// Bond half of every token's desired amount through `custodian`.
  fn add_liquidity_to_job(custodian: Custodian, job: &T::JobId) -> DispatchResult {
    let account = Self::custodian_account(custodian);
    let custody = Self::account_id();
    for token in JobLiquidities::<T>::get(job) {
      let amount = JobLiquidityDesiredAmount::<T>::get(job, token) / 2;
      if amount == 0 {
        continue;
      }
      T::Assets::transfer(token, &custody, &account, amount, Preservation::Expendable)?;
      T::Registry::add_liquidity(&account, token, job, amount)?;
      CustodianLiquidity::<T>::try_mutate((custodian, *job, token), |held| -> DispatchResult {
        *held = held.checked_add(amount).ok_or(Error::<T>::Overflow)?;
        Ok(())
      })?;
    }
    let now = Self::now();
    JobCustodians::<T>::mutate(job, |pair| {
      pair.enter(custodian, CustodianStep::LiquidityAdded, now);
      pair.active = custodian;
    });
    log::info!(target: LOG_TARGET, "job {:?}: custodian {:?} added liquidity", job, custodian);
    Ok(())
  }

  /// Credit `custodian`'s bonded liquidity, unbonding the other custodian first
  /// if it is still credited.
  fn apply_credit_to_job(custodian: Custodian, job: &T::JobId) -> DispatchResult {
    if Self::job_custodian_step(job, custodian.other()) == CustodianStep::CreditApplied {
      Self::unbond_liquidity_from_job(custodian.other(), job)?;
    }
    let account = Self::custodian_account(custodian);
    for token in JobLiquidities::<T>::get(job) {
      if CustodianLiquidity::<T>::get((custodian, *job, token)) > 0 {
        T::Registry::apply_credit(&account, token, job)?;
      }
    }
    let now = Self::now();
    JobCustodians::<T>::mutate(job, |pair| {
      pair.enter(custodian, CustodianStep::CreditApplied, now)
    });
    log::info!(target: LOG_TARGET, "job {:?}: custodian {:?} applied credit", job, custodian);
    Ok(())
  }

  fn unbond_liquidity_from_job(custodian: Custodian, job: &T::JobId) -> DispatchResult {
    let account = Self::custodian_account(custodian);
    for token in JobLiquidities::<T>::get(job) {
      let held = CustodianLiquidity::<T>::get((custodian, *job, token));
      if held > 0 {
        T::Registry::unbond_liquidity(&account, token, job, held)?;
      }
    }
    let now = Self::now();
    JobCustodians::<T>::mutate(job, |pair| {
      pair.enter(custodian, CustodianStep::Unbonding, now)
    });
    log::info!(target: LOG_TARGET, "job {:?}: custodian {:?} unbonding", job, custodian);
    Ok(())
  }

  /// Pull `custodian`'s matured liquidity back into custody and close its round.
  fn remove_liquidity_from_job(custodian: Custodian, job: &T::JobId) -> DispatchResult {
    for token in JobLiquidities::<T>::get(job) {
      if CustodianLiquidity::<T>::get((custodian, *job, token)) > 0 {
        Self::release_to_custody(custodian, job, token)?;
      }
      Self::retire_liquidity_if_unused(job, token);
    }
    JobCycle::<T>::try_mutate(job, |cycle| -> DispatchResult {
      *cycle = cycle.checked_add(1).ok_or(Error::<T>::Overflow)?;
      Ok(())
    })?;
    let now = Self::now();
    JobCustodians::<T>::mutate(job, |pair| pair.enter(custodian, CustodianStep::Idle, now));
    log::info!(
      target: LOG_TARGET,
      "job {:?}: custodian {:?} removed liquidity, cycle {}",
      job,
      custodian,
      JobCycle::<T>::get(job)
    );
    Ok(())
  }

  /// Remove a custodian's unbonded `token` from the registry and return it to
  /// the pallet account.
  fn release_to_custody(custodian: Custodian, job: &T::JobId, token: u32) -> DispatchResult {
    let account = Self::custodian_account(custodian);
    let released = T::Registry::remove_liquidity(&account, token, job)?;
    if released > 0 {
      T::Assets::transfer(
        token,
        &account,
        &Self::account_id(),
        released,
        Preservation::Expendable,
      )?;
    }
    CustodianLiquidity::<T>::mutate_exists((custodian, *job, token), |held| {
      *held = held
        .map(|amount| amount.saturating_sub(released))
        .filter(|amount| *amount > 0);
    });
    Ok(())
  }

  /// Drop `token` from the job once nobody wants it and no custodian holds it.
  pub(crate) fn retire_liquidity_if_unused(job: &T::JobId, token: u32) {
    let held = Custodian::ALL
      .iter()
      .any(|custodian| CustodianLiquidity::<T>::get((*custodian, *job, token)) > 0);
    if JobLiquidityDesiredAmount::<T>::get(job, token) == 0 && !held {
      Self::remove_lp_from_job(job, token);
    }
  }

  /// Drive a single custodian directly against the registry.
  pub(crate) fn recover(
    custodian: Custodian,
    job: &T::JobId,
    token: u32,
    action: JobAction,
    amount: Balance,
  ) -> DispatchResult {
    let account = Self::custodian_account(custodian);
    let step = match action {
      JobAction::AddLiquidityToJob => {
        Self::add_lp_to_job(job, token)?;
        T::Registry::add_liquidity(&account, token, job, amount)?;
        CustodianLiquidity::<T>::try_mutate((custodian, *job, token), |held| -> DispatchResult {
          *held = held.checked_add(amount).ok_or(Error::<T>::Overflow)?;
          Ok(())
        })?;
        CustodianStep::LiquidityAdded
      }
      JobAction::ApplyCreditToJob => {
        T::Registry::apply_credit(&account, token, job)?;
        CustodianStep::CreditApplied
      }
      JobAction::UnbondLiquidityFromJob => {
        T::Registry::unbond_liquidity(&account, token, job, amount)?;
        CustodianStep::Unbonding
      }
      JobAction::RemoveLiquidityFromJob => {
        Self::release_to_custody(custodian, job, token)?;
        Self::retire_liquidity_if_unused(job, token);
        CustodianStep::Idle
      }
      JobAction::None => return Err(Error::<T>::NotActionable.into()),
    };
    let now = Self::now();
    JobCustodians::<T>::mutate(job, |pair| pair.enter(custodian, step, now));
    log::warn!(
      target: LOG_TARGET,
      "job {:?}: recovery {:?} on custodian {:?} for token {}",
      job,
      action,
      custodian,
      token
    );
    Self::deposit_event(Event::CustodianRecovered {
      custodian,
      job: *job,
      token,
      action,
    });
    Ok(())
  }
}
