extern crate alloc;

use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{Balance, Custodian};

const TOKEN: u32 = 1;
const AMOUNT: Balance = 1_000_000_000_000;

fn funded_depositor<T: Config>() -> T::AccountId {
  let caller: T::AccountId = whitelisted_caller();
  T::BenchmarkHelper::create_token(TOKEN).expect("Failed to create token");
  T::BenchmarkHelper::fund_account(&caller, TOKEN, AMOUNT * 4).expect("Failed to fund caller");
  caller
}

/// Registered job with `caller`'s deposit allocated to it.
fn allocated_job<T: Config>(caller: &T::AccountId) -> T::JobId {
  let job = T::BenchmarkHelper::job(0);
  T::BenchmarkHelper::register_job(&job).expect("Failed to register job");
  LiquidityMinAmount::<T>::insert(TOKEN, 2);
  Pallet::<T>::do_deposit(caller, caller, TOKEN, AMOUNT).expect("Failed to deposit");
  Pallet::<T>::do_set_job_liquidity_amount(caller, TOKEN, &job, AMOUNT)
    .expect("Failed to allocate");
  job
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn deposit() {
    let caller = funded_depositor::<T>();

    #[extrinsic_call]
    deposit(RawOrigin::Signed(caller.clone()), TOKEN, AMOUNT);

    assert_eq!(UserBalances::<T>::get(&caller, TOKEN).idle, AMOUNT);
  }

  #[benchmark]
  fn deposit_to() {
    let caller = funded_depositor::<T>();
    let beneficiary: T::AccountId = account("beneficiary", 0, 0);

    #[extrinsic_call]
    deposit_to(
      RawOrigin::Signed(caller),
      beneficiary.clone(),
      TOKEN,
      AMOUNT,
    );

    assert_eq!(UserBalances::<T>::get(&beneficiary, TOKEN).idle, AMOUNT);
  }

  #[benchmark]
  fn withdraw() {
    let caller = funded_depositor::<T>();
    Pallet::<T>::do_deposit(&caller, &caller, TOKEN, AMOUNT).expect("Failed to deposit");

    #[extrinsic_call]
    withdraw(RawOrigin::Signed(caller.clone()), TOKEN, AMOUNT);

    assert_eq!(UserBalances::<T>::get(&caller, TOKEN).total, 0);
  }

  #[benchmark]
  fn withdraw_to() {
    let caller = funded_depositor::<T>();
    let recipient: T::AccountId = account("recipient", 0, 0);
    Pallet::<T>::do_deposit(&caller, &caller, TOKEN, AMOUNT).expect("Failed to deposit");

    #[extrinsic_call]
    withdraw_to(RawOrigin::Signed(caller), recipient, TOKEN, AMOUNT);
  }

  #[benchmark]
  fn set_job_liquidity_amount() {
    let caller = funded_depositor::<T>();
    let job = T::BenchmarkHelper::job(0);
    T::BenchmarkHelper::register_job(&job).expect("Failed to register job");
    LiquidityMinAmount::<T>::insert(TOKEN, 2);
    Pallet::<T>::do_deposit(&caller, &caller, TOKEN, AMOUNT).expect("Failed to deposit");

    #[extrinsic_call]
    set_job_liquidity_amount(RawOrigin::Signed(caller.clone()), TOKEN, job, AMOUNT);

    assert_eq!(
      Pallet::<T>::user_job_liquidity_amount(&caller, &job, TOKEN),
      AMOUNT
    );
  }

  #[benchmark]
  fn remove_idle_liquidity_from_job() {
    let caller = funded_depositor::<T>();
    let job = allocated_job::<T>(&caller);
    Pallet::<T>::do_set_job_liquidity_amount(&caller, TOKEN, &job, 0).expect("Failed to release");

    #[extrinsic_call]
    remove_idle_liquidity_from_job(RawOrigin::Signed(caller.clone()), TOKEN, job, AMOUNT);

    assert_eq!(
      Pallet::<T>::user_job_liquidity_locked_amount(&caller, &job, TOKEN),
      0
    );
  }

  #[benchmark]
  fn work(l: Linear<1, { T::MaxLiquiditiesPerJob::get() }>) {
    let caller = funded_depositor::<T>();
    let job = allocated_job::<T>(&caller);
    for token in 1..l {
      let token = TOKEN + token;
      T::BenchmarkHelper::create_token(token).expect("Failed to create token");
      T::BenchmarkHelper::fund_account(&caller, token, AMOUNT).expect("Failed to fund caller");
      LiquidityMinAmount::<T>::insert(token, 2);
      Pallet::<T>::do_deposit(&caller, &caller, token, AMOUNT).expect("Failed to deposit");
      Pallet::<T>::do_set_job_liquidity_amount(&caller, token, &job, AMOUNT)
        .expect("Failed to allocate");
    }
    let keeper: T::AccountId = account("keeper", 0, 0);
    KeeperGateway::<T>::put(&keeper);

    #[extrinsic_call]
    work(RawOrigin::Signed(keeper), job);

    assert_eq!(
      Pallet::<T>::job_custodian_step(&job, Custodian::A),
      primitives::CustodianStep::LiquidityAdded
    );
  }

  #[benchmark]
  fn force_work(l: Linear<1, { T::MaxLiquiditiesPerJob::get() }>) {
    let caller = funded_depositor::<T>();
    let job = allocated_job::<T>(&caller);
    for token in 1..l {
      let token = TOKEN + token;
      T::BenchmarkHelper::create_token(token).expect("Failed to create token");
      T::BenchmarkHelper::fund_account(&caller, token, AMOUNT).expect("Failed to fund caller");
      LiquidityMinAmount::<T>::insert(token, 2);
      Pallet::<T>::do_deposit(&caller, &caller, token, AMOUNT).expect("Failed to deposit");
      Pallet::<T>::do_set_job_liquidity_amount(&caller, token, &job, AMOUNT)
        .expect("Failed to allocate");
    }

    #[extrinsic_call]
    force_work(RawOrigin::Root, job);
  }

  #[benchmark]
  fn set_min_amount() {
    #[extrinsic_call]
    set_min_amount(RawOrigin::Root, TOKEN, AMOUNT);

    assert_eq!(LiquidityMinAmount::<T>::get(TOKEN), AMOUNT);
  }

  #[benchmark]
  fn set_liquidity_fee() {
    let fee = T::MaxLiquidityFee::get();
    FeeReceiver::<T>::put(account::<T::AccountId>("receiver", 0, 0));

    #[extrinsic_call]
    set_liquidity_fee(RawOrigin::Root, fee);

    assert_eq!(LiquidityFee::<T>::get(), fee);
  }

  #[benchmark]
  fn set_fee_receiver() {
    let receiver: T::AccountId = account("receiver", 0, 0);

    #[extrinsic_call]
    set_fee_receiver(RawOrigin::Root, Some(receiver));
  }

  #[benchmark]
  fn set_keeper_gateway() {
    let gateway: T::AccountId = account("gateway", 0, 0);

    #[extrinsic_call]
    set_keeper_gateway(RawOrigin::Root, Some(gateway));
  }

  #[benchmark]
  fn propose_governor() {
    let governor: T::AccountId = account("governor", 0, 0);

    #[extrinsic_call]
    propose_governor(RawOrigin::Root, governor.clone());

    assert_eq!(PendingGovernor::<T>::get(), Some(governor));
  }

  #[benchmark]
  fn accept_governor() {
    let governor: T::AccountId = account("governor", 0, 0);
    PendingGovernor::<T>::put(&governor);

    #[extrinsic_call]
    accept_governor(RawOrigin::Signed(governor.clone()));

    assert_eq!(Governor::<T>::get(), Some(governor));
  }

  #[benchmark]
  fn recover_add_liquidity() {
    let job = T::BenchmarkHelper::job(0);
    T::BenchmarkHelper::register_job(&job).expect("Failed to register job");
    T::BenchmarkHelper::create_token(TOKEN).expect("Failed to create token");
    let custodian = Pallet::<T>::custodian_account(Custodian::A);
    T::BenchmarkHelper::fund_account(&custodian, TOKEN, AMOUNT).expect("Failed to fund custodian");

    #[extrinsic_call]
    recover_add_liquidity(RawOrigin::Root, Custodian::A, job, TOKEN, AMOUNT);
  }

  #[benchmark]
  fn recover_apply_credit() {
    let caller = funded_depositor::<T>();
    let job = allocated_job::<T>(&caller);
    Pallet::<T>::do_work(&job).expect("Failed to add liquidity");

    #[block]
    {
      // The registry may refuse credit before its bonding delay
      let _ = Pallet::<T>::recover_apply_credit(
        RawOrigin::<T::AccountId>::Root.into(),
        Custodian::A,
        job,
        TOKEN,
      );
    }
  }

  #[benchmark]
  fn recover_unbond_liquidity() {
    let caller = funded_depositor::<T>();
    let job = allocated_job::<T>(&caller);
    Pallet::<T>::do_work(&job).expect("Failed to add liquidity");

    #[block]
    {
      let _ = Pallet::<T>::recover_unbond_liquidity(
        RawOrigin::<T::AccountId>::Root.into(),
        Custodian::A,
        job,
        TOKEN,
        AMOUNT / 2,
      );
    }
  }

  #[benchmark]
  fn recover_remove_liquidity() {
    let caller = funded_depositor::<T>();
    let job = allocated_job::<T>(&caller);
    Pallet::<T>::do_work(&job).expect("Failed to add liquidity");

    #[block]
    {
      let _ = Pallet::<T>::recover_remove_liquidity(
        RawOrigin::<T::AccountId>::Root.into(),
        Custodian::A,
        job,
        TOKEN,
      );
    }
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
