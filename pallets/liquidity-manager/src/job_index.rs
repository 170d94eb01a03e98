//! Swap-remove index of jobs and of the LP tokens each job uses.
//!
//! Positions are stored next to the vectors so both insertion and removal are O(1).

use crate::{
  Config, Error, Event, JobIndex, JobLiquidities, JobLiquidityIndex, Jobs, LOG_TARGET, Pallet,
};
use frame::prelude::*;

impl<T: Config> Pallet<T> {
  /// Record that `job` uses `token`. No-op when already recorded.
  pub(crate) fn add_lp_to_job(job: &T::JobId, token: u32) -> DispatchResult {
    if !JobIndex::<T>::contains_key(job) {
      Jobs::<T>::try_mutate(|jobs| -> DispatchResult {
        let position = jobs.len() as u32;
        jobs.try_push(*job).map_err(|_| Error::<T>::TooManyJobs)?;
        JobIndex::<T>::insert(job, position);
        Ok(())
      })?;
      Self::deposit_event(Event::JobAdded { job: *job });
    }

    if !JobLiquidityIndex::<T>::contains_key(job, token) {
      JobLiquidities::<T>::try_mutate(job, |tokens| -> DispatchResult {
        let position = tokens.len() as u32;
        tokens
          .try_push(token)
          .map_err(|_| Error::<T>::TooManyLiquidities)?;
        JobLiquidityIndex::<T>::insert(job, token, position);
        Ok(())
      })?;
      log::debug!(target: LOG_TARGET, "job {:?} now uses token {}", job, token);
      Self::deposit_event(Event::LiquidityAddedToJob { job: *job, token });
    }
    Ok(())
  }

  /// Forget that `job` uses `token`, dropping the job once it uses nothing.
  /// No-op when not recorded.
  pub(crate) fn remove_lp_from_job(job: &T::JobId, token: u32) {
    let Some(position) = JobLiquidityIndex::<T>::take(job, token) else {
      return;
    };
    let emptied = JobLiquidities::<T>::mutate_exists(job, |maybe_tokens| {
      let Some(tokens) = maybe_tokens else {
        return true;
      };
      let position = position as usize;
      if position < tokens.len() {
        tokens.swap_remove(position);
        if let Some(moved) = tokens.get(position) {
          JobLiquidityIndex::<T>::insert(job, moved, position as u32);
        }
      }
      if tokens.is_empty() {
        *maybe_tokens = None;
        return true;
      }
      false
    });
    log::debug!(target: LOG_TARGET, "job {:?} no longer uses token {}", job, token);
    Self::deposit_event(Event::LiquidityRemovedFromJob { job: *job, token });

    if emptied {
      Self::remove_job(job);
    }
  }

  fn remove_job(job: &T::JobId) {
    let Some(position) = JobIndex::<T>::take(job) else {
      return;
    };
    Jobs::<T>::mutate(|jobs| {
      let position = position as usize;
      if position < jobs.len() {
        jobs.swap_remove(position);
        if let Some(moved) = jobs.get(position) {
          JobIndex::<T>::insert(moved, position as u32);
        }
      }
    });
    Self::deposit_event(Event::JobRemoved { job: *job });
  }
}
