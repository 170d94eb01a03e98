//! Idle balance accounting: deposits, withdrawals and the deposit fee.

use crate::{
  Config, Error, Event, FeeReceiver, LOG_TARGET, LiquidityFee, LiquidityTotalAmount, Pallet,
  UserBalances,
};
use frame::deps::frame_support::traits::{fungibles::Mutate, tokens::Preservation};
use frame::prelude::*;
use primitives::{Balance, liquidity_fee};

impl<T: Config> Pallet<T> {
  /// Pull `amount` of `token` from `payer` and credit it, net of fee, to `beneficiary`.
  pub(crate) fn do_deposit(
    payer: &T::AccountId,
    beneficiary: &T::AccountId,
    token: u32,
    amount: Balance,
  ) -> DispatchResult {
    ensure!(!Self::is_system_account(beneficiary), Error::<T>::ZeroUser);
    ensure!(amount > 0, Error::<T>::ZeroAmount);

    T::Assets::transfer(
      token,
      payer,
      &Self::account_id(),
      amount,
      Preservation::Expendable,
    )?;

    let fee = match FeeReceiver::<T>::get() {
      Some(receiver) => {
        let fee = liquidity_fee(amount, LiquidityFee::<T>::get()).ok_or(Error::<T>::Overflow)?;
        if fee > 0 {
          Self::credit_idle(&receiver, token, fee)?;
        }
        fee
      }
      None => 0,
    };
    let net = amount.saturating_sub(fee);
    Self::credit_idle(beneficiary, token, net)?;
    LiquidityTotalAmount::<T>::try_mutate(token, |total| -> DispatchResult {
      *total = total.checked_add(amount).ok_or(Error::<T>::Overflow)?;
      Ok(())
    })?;

    log::debug!(
      target: LOG_TARGET,
      "deposit of {} token {} for {:?}, fee {}",
      net,
      token,
      beneficiary,
      fee
    );
    Self::deposit_event(Event::LiquidityDeposited {
      depositor: payer.clone(),
      beneficiary: beneficiary.clone(),
      token,
      amount: net,
      fee,
    });
    Ok(())
  }

  /// Pay `amount` of `owner`'s idle `token` out to `recipient`.
  pub(crate) fn do_withdraw(
    owner: &T::AccountId,
    recipient: &T::AccountId,
    token: u32,
    amount: Balance,
  ) -> DispatchResult {
    ensure!(!Self::is_system_account(recipient), Error::<T>::ZeroUser);
    ensure!(amount > 0, Error::<T>::ZeroAmount);

    UserBalances::<T>::try_mutate_exists(owner, token, |maybe_balance| -> DispatchResult {
      let mut balance = maybe_balance.unwrap_or_default();
      ensure!(amount <= balance.total, Error::<T>::AmountExceedsBalance);
      ensure!(amount <= balance.idle, Error::<T>::InsufficientIdleBalance);
      balance.total -= amount;
      balance.idle -= amount;
      *maybe_balance = (balance.total > 0).then_some(balance);
      Ok(())
    })?;
    LiquidityTotalAmount::<T>::mutate_exists(token, |total| {
      *total = total
        .map(|value| value.saturating_sub(amount))
        .filter(|value| *value > 0);
    });

    T::Assets::transfer(
      token,
      &Self::account_id(),
      recipient,
      amount,
      Preservation::Expendable,
    )?;

    log::debug!(target: LOG_TARGET, "withdrawal of {} token {} by {:?}", amount, token, owner);
    Self::deposit_event(Event::LiquidityWithdrawn {
      owner: owner.clone(),
      recipient: recipient.clone(),
      token,
      amount,
    });
    Ok(())
  }

  fn credit_idle(who: &T::AccountId, token: u32, amount: Balance) -> DispatchResult {
    UserBalances::<T>::try_mutate(who, token, |balance| -> DispatchResult {
      balance.total = balance.total.checked_add(amount).ok_or(Error::<T>::Overflow)?;
      balance.idle = balance.idle.checked_add(amount).ok_or(Error::<T>::Overflow)?;
      Ok(())
    })
  }
}
