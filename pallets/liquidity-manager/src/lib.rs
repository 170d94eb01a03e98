//! Liquidity Manager Pallet
//!
//! Pools LP collateral from many depositors and keeps it bonded to jobs of an
//! external work registry through two alternating custodians, so a job never
//! loses its registered collateral while depositors resize their share.
//!
//! - [`asset_ledger`]: deposits, withdrawals and the deposit fee.
//! - [`job_index`]: jobs known to the manager and the tokens each one uses.
//! - [`user_jobs`]: per depositor allocations and the two-cycle release rule.
//! - [`cycle`]: next-action policy and its execution against the registry.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub use adapters::{JobWorker, WorkRegistry};

pub mod asset_ledger;
pub mod cycle;
pub mod job_index;
pub mod types;
pub mod user_jobs;

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub(crate) const LOG_TARGET: &str = "runtime::liquidity-manager";

/// Helper for benchmarking: registers jobs and funds accounts outside the pallet's control
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId, JobId> {
  fn job(seed: u32) -> JobId;
  fn register_job(job: &JobId) -> frame::deps::sp_runtime::DispatchResult;
  fn create_token(token: u32) -> frame::deps::sp_runtime::DispatchResult;
  fn fund_account(who: &AccountId, token: u32, amount: primitives::Balance)
  -> frame::deps::sp_runtime::DispatchResult;
}

#[frame::pallet]
pub mod pallet {
  use super::{LOG_TARGET, WeightInfo, WorkRegistry};
  use crate::types::{CustodianPair, NextAction, UserBalance, UserJobPosition};
  use alloc::vec::Vec;
  use frame::prelude::*;
  use polkadot_sdk::{
    frame_support::{
      PalletId,
      traits::{
        EnsureOrigin, UnixTime,
        fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
      },
    },
    sp_runtime::traits::AccountIdConversion,
  };
  use primitives::{Balance, Custodian, CustodianStep, JobAction};

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// The assets pallet holding LP tokens
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// External work registry jobs are bonded against
    type Registry: WorkRegistry<Self::AccountId, Self::JobId>;

    /// Clock used for bonding and unbonding maturities
    type Time: UnixTime;

    /// Identifier of a job in the work registry
    type JobId: Parameter + Member + MaxEncodedLen + Copy + Ord;

    /// The pallet ID; custodians are its sub-accounts
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Seconds the registry needs before bonded liquidity can be credited
    #[pallet::constant]
    type BondingDelay: Get<u64>;

    /// Seconds the registry needs before unbonding liquidity can be removed
    #[pallet::constant]
    type UnbondingDelay: Get<u64>;

    /// Upper bound of the deposit fee, in basis points
    #[pallet::constant]
    type MaxLiquidityFee: Get<u32>;

    /// Maximum number of jobs tracked at once
    #[pallet::constant]
    type MaxJobs: Get<u32>;

    /// Maximum number of LP tokens a single job can use
    #[pallet::constant]
    type MaxLiquiditiesPerJob: Get<u32>;

    /// Origin that can perform governance operations
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId, Self::JobId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  /// Total amount of each LP token held on behalf of users
  #[pallet::storage]
  #[pallet::getter(fn liquidity_total_amount)]
  pub type LiquidityTotalAmount<T: Config> =
    StorageMap<_, Blake2_128Concat, u32, Balance, ValueQuery>;

  /// Balance of each user per LP token
  #[pallet::storage]
  #[pallet::getter(fn user_balance)]
  pub type UserBalances<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    T::AccountId,
    Blake2_128Concat,
    u32,
    UserBalance,
    ValueQuery,
  >;

  /// Minimum allocation of an LP token to a job; zero means not set
  #[pallet::storage]
  #[pallet::getter(fn liquidity_min_amount)]
  pub type LiquidityMinAmount<T: Config> =
    StorageMap<_, Blake2_128Concat, u32, Balance, ValueQuery>;

  /// Deposit fee in basis points
  #[pallet::storage]
  #[pallet::getter(fn liquidity_fee)]
  pub type LiquidityFee<T: Config> = StorageValue<_, u32, ValueQuery>;

  /// Account credited with deposit fees
  #[pallet::storage]
  #[pallet::getter(fn fee_receiver)]
  pub type FeeReceiver<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  /// Jobs with at least one LP token in use
  #[pallet::storage]
  #[pallet::getter(fn jobs)]
  pub type Jobs<T: Config> = StorageValue<_, BoundedVec<T::JobId, T::MaxJobs>, ValueQuery>;

  /// Position of a job inside [`Jobs`]
  #[pallet::storage]
  pub type JobIndex<T: Config> = StorageMap<_, Blake2_128Concat, T::JobId, u32, OptionQuery>;

  /// LP tokens used by a job
  #[pallet::storage]
  #[pallet::getter(fn job_liquidities)]
  pub type JobLiquidities<T: Config> = StorageMap<
    _,
    Blake2_128Concat,
    T::JobId,
    BoundedVec<u32, T::MaxLiquiditiesPerJob>,
    ValueQuery,
  >;

  /// Position of a token inside [`JobLiquidities`]
  #[pallet::storage]
  pub type JobLiquidityIndex<T: Config> =
    StorageDoubleMap<_, Blake2_128Concat, T::JobId, Blake2_128Concat, u32, u32, OptionQuery>;

  /// Sum of all users' desired amounts per (job, token)
  #[pallet::storage]
  #[pallet::getter(fn job_liquidity_desired_amount)]
  pub type JobLiquidityDesiredAmount<T: Config> =
    StorageDoubleMap<_, Blake2_128Concat, T::JobId, Blake2_128Concat, u32, Balance, ValueQuery>;

  /// Allocation of a user to a job per token
  #[pallet::storage]
  #[pallet::getter(fn user_job_position)]
  pub type UserJobPositions<T: Config> = StorageNMap<
    _,
    (
      NMapKey<Blake2_128Concat, T::AccountId>,
      NMapKey<Blake2_128Concat, T::JobId>,
      NMapKey<Blake2_128Concat, u32>,
    ),
    UserJobPosition,
    ValueQuery,
  >;

  /// Job cycle recorded at the user's last allocation change
  #[pallet::storage]
  #[pallet::getter(fn user_job_cycle)]
  pub type UserJobCycle<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    T::AccountId,
    Blake2_128Concat,
    T::JobId,
    u32,
    ValueQuery,
  >;

  /// Completed custodian removals per job
  #[pallet::storage]
  #[pallet::getter(fn job_cycle)]
  pub type JobCycle<T: Config> = StorageMap<_, Blake2_128Concat, T::JobId, u32, ValueQuery>;

  /// Bonding state of both custodians per job
  #[pallet::storage]
  #[pallet::getter(fn job_custodians)]
  pub type JobCustodians<T: Config> =
    StorageMap<_, Blake2_128Concat, T::JobId, CustodianPair, ValueQuery>;

  /// Liquidity bonded or unbonding in the registry per (custodian, job, token)
  #[pallet::storage]
  #[pallet::getter(fn custodian_liquidity)]
  pub type CustodianLiquidity<T: Config> = StorageNMap<
    _,
    (
      NMapKey<Blake2_128Concat, Custodian>,
      NMapKey<Blake2_128Concat, T::JobId>,
      NMapKey<Blake2_128Concat, u32>,
    ),
    Balance,
    ValueQuery,
  >;

  /// Only signed account allowed to call `work`
  #[pallet::storage]
  #[pallet::getter(fn keeper_gateway)]
  pub type KeeperGateway<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  /// Signed account sharing governance rights with `AdminOrigin`
  #[pallet::storage]
  #[pallet::getter(fn governor)]
  pub type Governor<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  /// Governor awaiting acceptance
  #[pallet::storage]
  #[pallet::getter(fn pending_governor)]
  pub type PendingGovernor<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// LP tokens deposited; `amount` is net of `fee`
    LiquidityDeposited {
      depositor: T::AccountId,
      beneficiary: T::AccountId,
      token: u32,
      amount: Balance,
      fee: Balance,
    },
    /// Idle LP tokens withdrawn
    LiquidityWithdrawn {
      owner: T::AccountId,
      recipient: T::AccountId,
      token: u32,
      amount: Balance,
    },
    /// A user's desired allocation to a job changed
    JobLiquiditySet {
      user: T::AccountId,
      job: T::JobId,
      token: u32,
      amount: Balance,
    },
    /// Released collateral moved back to idle balance
    IdleLiquidityRemovedFromJob {
      user: T::AccountId,
      job: T::JobId,
      token: u32,
      amount: Balance,
    },
    /// A job entered the job set
    JobAdded { job: T::JobId },
    /// A job left the job set
    JobRemoved { job: T::JobId },
    /// A job started using an LP token
    LiquidityAddedToJob { job: T::JobId, token: u32 },
    /// A job stopped using an LP token
    LiquidityRemovedFromJob { job: T::JobId, token: u32 },
    /// One cycle action executed through the keeper gateway
    Worked {
      job: T::JobId,
      custodian: Custodian,
      action: JobAction,
    },
    /// One cycle action executed by governance
    ForceWorked {
      job: T::JobId,
      custodian: Custodian,
      action: JobAction,
    },
    /// Minimum allocation updated
    MinAmountSet { token: u32, amount: Balance },
    /// Deposit fee updated
    LiquidityFeeSet { fee: u32 },
    /// Fee receiver updated
    FeeReceiverSet { receiver: Option<T::AccountId> },
    /// Keeper gateway updated
    KeeperGatewaySet { gateway: Option<T::AccountId> },
    /// A new governor was proposed
    GovernorProposed { governor: T::AccountId },
    /// The pending governor took over
    GovernorAccepted { governor: T::AccountId },
    /// Governance drove a custodian directly
    CustodianRecovered {
      custodian: Custodian,
      job: T::JobId,
      token: u32,
      action: JobAction,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Beneficiary or recipient is one of the manager's own accounts
    ZeroUser,
    /// Amount must be greater than zero
    ZeroAmount,
    /// Amount is larger than the user's total balance
    AmountExceedsBalance,
    /// Amount is larger than the user's idle balance
    InsufficientIdleBalance,
    /// No minimum allocation configured for the token
    LiquidityMinNotSet,
    /// Fee is above `MaxLiquidityFee`
    FeeExceedsMax,
    /// Allocation would end up between zero and the token minimum
    LockedAmountNotEnough,
    /// User has less allocated to the job than requested
    NotEnoughLPInJob,
    /// Not enough idle balance to allocate
    NoIdleLiquidityAvailable,
    /// Amount is larger than the released part of the locked collateral
    AmountBiggerThanIdleAvailable,
    /// Job has not completed two cycles since the user's last change
    LiquidityStillLocked,
    /// Job is not registered in the work registry
    JobNotRegistered,
    /// Job has no desired or bonded liquidity
    JobHasNoLiquidity,
    /// No cycle action is due for the job
    NotActionable,
    /// Caller is not allowed to perform the operation
    Unauthorized,
    /// Caller is not the pending governor
    NotPendingGovernor,
    /// Job set is full
    TooManyJobs,
    /// Job uses too many LP tokens
    TooManyLiquidities,
    /// Arithmetic overflow
    Overflow,
    /// Requested allocation equals the current one after rounding
    AmountUnchanged,
    /// A nonzero deposit fee needs a fee receiver
    FeeWithoutReceiver,
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    pub governor: Option<T::AccountId>,
    pub keeper_gateway: Option<T::AccountId>,
    pub fee_receiver: Option<T::AccountId>,
    pub liquidity_fee: u32,
    pub min_amounts: Vec<(u32, Balance)>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      // Custody accounts survive holding only non-sufficient assets
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
      for custodian in Custodian::ALL {
        frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::custodian_account(custodian));
      }
      if let Some(governor) = &self.governor {
        Governor::<T>::put(governor);
      }
      if let Some(gateway) = &self.keeper_gateway {
        KeeperGateway::<T>::put(gateway);
      }
      if let Some(receiver) = &self.fee_receiver {
        FeeReceiver::<T>::put(receiver);
      }
      assert!(
        self.liquidity_fee <= T::MaxLiquidityFee::get(),
        "liquidity fee above MaxLiquidityFee"
      );
      assert!(
        self.liquidity_fee == 0 || self.fee_receiver.is_some(),
        "liquidity fee set without a fee receiver"
      );
      LiquidityFee::<T>::put(self.liquidity_fee);
      for (token, amount) in &self.min_amounts {
        LiquidityMinAmount::<T>::insert(token, amount);
      }
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Deposit LP tokens into the caller's idle balance.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::deposit())]
    pub fn deposit(origin: OriginFor<T>, token: u32, amount: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_deposit(&who, &who, token, amount)
    }

    /// Deposit LP tokens into another account's idle balance.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::deposit_to())]
    pub fn deposit_to(
      origin: OriginFor<T>,
      beneficiary: T::AccountId,
      token: u32,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_deposit(&who, &beneficiary, token, amount)
    }

    /// Withdraw idle LP tokens to the caller.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::withdraw())]
    pub fn withdraw(origin: OriginFor<T>, token: u32, amount: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_withdraw(&who, &who, token, amount)
    }

    /// Withdraw idle LP tokens to another account.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::withdraw_to())]
    pub fn withdraw_to(
      origin: OriginFor<T>,
      recipient: T::AccountId,
      token: u32,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_withdraw(&who, &recipient, token, amount)
    }

    /// Set how much of `token` the caller wants bonded to `job`.
    ///
    /// The amount is rounded down to an even number. Increases draw from idle
    /// balance; decreases only lower the desired amount, the collateral stays
    /// locked until released with `remove_idle_liquidity_from_job`.
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::set_job_liquidity_amount())]
    pub fn set_job_liquidity_amount(
      origin: OriginFor<T>,
      token: u32,
      job: T::JobId,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_set_job_liquidity_amount(&who, token, &job, amount)
    }

    /// Move released collateral of a job back to the caller's idle balance.
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::remove_idle_liquidity_from_job())]
    pub fn remove_idle_liquidity_from_job(
      origin: OriginFor<T>,
      token: u32,
      job: T::JobId,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_remove_idle_liquidity_from_job(&who, token, &job, amount)
    }

    /// Execute the next cycle action of a job (keeper gateway only).
    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::work(T::MaxLiquiditiesPerJob::get()))]
    pub fn work(origin: OriginFor<T>, job: T::JobId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(
        KeeperGateway::<T>::get().as_ref() == Some(&who),
        Error::<T>::Unauthorized
      );
      let next = Self::do_work(&job)?;
      Self::deposit_event(Event::Worked {
        job,
        custodian: next.custodian,
        action: next.action,
      });
      Ok(())
    }

    /// Execute the next cycle action of a job bypassing the keeper gateway.
    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::force_work(T::MaxLiquiditiesPerJob::get()))]
    pub fn force_work(origin: OriginFor<T>, job: T::JobId) -> DispatchResult {
      Self::ensure_governance(origin)?;
      let next = Self::do_work(&job)?;
      Self::deposit_event(Event::ForceWorked {
        job,
        custodian: next.custodian,
        action: next.action,
      });
      Ok(())
    }

    /// Set the minimum allocation of `token` to a job (governance only)
    #[pallet::call_index(8)]
    #[pallet::weight(T::WeightInfo::set_min_amount())]
    pub fn set_min_amount(origin: OriginFor<T>, token: u32, amount: Balance) -> DispatchResult {
      Self::ensure_governance(origin)?;
      LiquidityMinAmount::<T>::insert(token, amount);
      Self::deposit_event(Event::MinAmountSet { token, amount });
      Ok(())
    }

    /// Set the deposit fee in basis points (governance only)
    #[pallet::call_index(9)]
    #[pallet::weight(T::WeightInfo::set_liquidity_fee())]
    pub fn set_liquidity_fee(origin: OriginFor<T>, fee: u32) -> DispatchResult {
      Self::ensure_governance(origin)?;
      ensure!(fee <= T::MaxLiquidityFee::get(), Error::<T>::FeeExceedsMax);
      ensure!(
        fee == 0 || FeeReceiver::<T>::get().is_some(),
        Error::<T>::FeeWithoutReceiver
      );
      LiquidityFee::<T>::put(fee);
      Self::deposit_event(Event::LiquidityFeeSet { fee });
      Ok(())
    }

    /// Set or clear the fee receiver (governance only)
    #[pallet::call_index(10)]
    #[pallet::weight(T::WeightInfo::set_fee_receiver())]
    pub fn set_fee_receiver(
      origin: OriginFor<T>,
      receiver: Option<T::AccountId>,
    ) -> DispatchResult {
      Self::ensure_governance(origin)?;
      match &receiver {
        Some(account) => ensure!(!Self::is_system_account(account), Error::<T>::ZeroUser),
        None => ensure!(LiquidityFee::<T>::get() == 0, Error::<T>::FeeWithoutReceiver),
      }
      FeeReceiver::<T>::set(receiver.clone());
      Self::deposit_event(Event::FeeReceiverSet { receiver });
      Ok(())
    }

    /// Set or clear the keeper gateway (governance only)
    #[pallet::call_index(11)]
    #[pallet::weight(T::WeightInfo::set_keeper_gateway())]
    pub fn set_keeper_gateway(
      origin: OriginFor<T>,
      gateway: Option<T::AccountId>,
    ) -> DispatchResult {
      Self::ensure_governance(origin)?;
      KeeperGateway::<T>::set(gateway.clone());
      log::info!(target: LOG_TARGET, "keeper gateway set: {:?}", gateway);
      Self::deposit_event(Event::KeeperGatewaySet { gateway });
      Ok(())
    }

    /// Propose a new governor; it takes over once it calls `accept_governor`.
    #[pallet::call_index(12)]
    #[pallet::weight(T::WeightInfo::propose_governor())]
    pub fn propose_governor(origin: OriginFor<T>, governor: T::AccountId) -> DispatchResult {
      Self::ensure_governance(origin)?;
      PendingGovernor::<T>::put(&governor);
      log::info!(target: LOG_TARGET, "governor proposed: {:?}", governor);
      Self::deposit_event(Event::GovernorProposed { governor });
      Ok(())
    }

    /// Accept a pending governor proposal.
    #[pallet::call_index(13)]
    #[pallet::weight(T::WeightInfo::accept_governor())]
    pub fn accept_governor(origin: OriginFor<T>) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(
        PendingGovernor::<T>::get().as_ref() == Some(&who),
        Error::<T>::NotPendingGovernor
      );
      PendingGovernor::<T>::kill();
      Governor::<T>::put(&who);
      log::info!(target: LOG_TARGET, "governor accepted: {:?}", who);
      Self::deposit_event(Event::GovernorAccepted { governor: who });
      Ok(())
    }

    /// Bond tokens already held by a custodian account (governance only).
    ///
    /// Recovery path for jobs the cycle engine can no longer advance.
    #[pallet::call_index(14)]
    #[pallet::weight(T::WeightInfo::recover_add_liquidity())]
    pub fn recover_add_liquidity(
      origin: OriginFor<T>,
      custodian: Custodian,
      job: T::JobId,
      token: u32,
      amount: Balance,
    ) -> DispatchResult {
      Self::ensure_governance(origin)?;
      ensure!(amount > 0, Error::<T>::ZeroAmount);
      Self::recover(custodian, &job, token, JobAction::AddLiquidityToJob, amount)
    }

    /// Apply credit for a custodian's matured liquidity (governance only)
    #[pallet::call_index(15)]
    #[pallet::weight(T::WeightInfo::recover_apply_credit())]
    pub fn recover_apply_credit(
      origin: OriginFor<T>,
      custodian: Custodian,
      job: T::JobId,
      token: u32,
    ) -> DispatchResult {
      Self::ensure_governance(origin)?;
      Self::recover(custodian, &job, token, JobAction::ApplyCreditToJob, 0)
    }

    /// Start unbonding part of a custodian's liquidity (governance only)
    #[pallet::call_index(16)]
    #[pallet::weight(T::WeightInfo::recover_unbond_liquidity())]
    pub fn recover_unbond_liquidity(
      origin: OriginFor<T>,
      custodian: Custodian,
      job: T::JobId,
      token: u32,
      amount: Balance,
    ) -> DispatchResult {
      Self::ensure_governance(origin)?;
      ensure!(amount > 0, Error::<T>::ZeroAmount);
      Self::recover(
        custodian,
        &job,
        token,
        JobAction::UnbondLiquidityFromJob,
        amount,
      )
    }

    /// Remove a custodian's unbonded liquidity back into custody (governance only)
    #[pallet::call_index(17)]
    #[pallet::weight(T::WeightInfo::recover_remove_liquidity())]
    pub fn recover_remove_liquidity(
      origin: OriginFor<T>,
      custodian: Custodian,
      job: T::JobId,
      token: u32,
    ) -> DispatchResult {
      Self::ensure_governance(origin)?;
      Self::recover(
        custodian,
        &job,
        token,
        JobAction::RemoveLiquidityFromJob,
        0,
      )
    }
  }

  impl<T: Config> Pallet<T> {
    /// Account holding idle deposits
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn custodian_account(custodian: Custodian) -> T::AccountId {
      T::PalletId::get().into_sub_account_truncating(*custodian.seed())
    }

    pub(crate) fn now() -> u64 {
      T::Time::now().as_secs()
    }

    /// Accounts owned by the manager can't be beneficiaries of user balances.
    pub(crate) fn is_system_account(who: &T::AccountId) -> bool {
      *who == Self::account_id()
        || Custodian::ALL
          .iter()
          .any(|custodian| *who == Self::custodian_account(*custodian))
    }

    /// `AdminOrigin`, or a signed call from the current governor.
    pub(crate) fn ensure_governance(origin: OriginFor<T>) -> DispatchResult {
      match T::AdminOrigin::try_origin(origin) {
        Ok(_) => Ok(()),
        Err(origin) => {
          let who = ensure_signed(origin)?;
          ensure!(
            Governor::<T>::get().as_ref() == Some(&who),
            Error::<T>::Unauthorized
          );
          Ok(())
        }
      }
    }

    pub fn user_job_liquidity_amount(who: &T::AccountId, job: &T::JobId, token: u32) -> Balance {
      UserJobPositions::<T>::get((who, job, token)).amount
    }

    pub fn user_job_liquidity_locked_amount(
      who: &T::AccountId,
      job: &T::JobId,
      token: u32,
    ) -> Balance {
      UserJobPositions::<T>::get((who, job, token)).locked
    }

    pub fn job_custodian_step(job: &T::JobId, custodian: Custodian) -> CustodianStep {
      JobCustodians::<T>::get(job).step(custodian)
    }

    /// Compute the next cycle action of a job without touching state.
    pub fn get_next_action(job: &T::JobId) -> Result<NextAction, DispatchError> {
      let next = crate::cycle::next_action(
        &JobCustodians::<T>::get(job),
        Self::job_desired_total(job),
        !JobLiquidities::<T>::get(job).is_empty(),
        &Self::cycle_clock(),
      )
      .ok_or(Error::<T>::JobHasNoLiquidity)?;
      log::debug!(target: LOG_TARGET, "next action for {:?}: {:?}", job, next);
      Ok(next)
    }

    /// Whether a cycle action is due for the job.
    pub fn workable(job: &T::JobId) -> Result<bool, DispatchError> {
      Ok(Self::get_next_action(job)?.is_due())
    }
  }

  impl<T: Config> crate::JobWorker<T::JobId> for Pallet<T> {
    fn workable(job: &T::JobId) -> Result<bool, DispatchError> {
      Pallet::<T>::workable(job)
    }

    fn work(job: &T::JobId) -> DispatchResult {
      let next = Self::do_work(job)?;
      Self::deposit_event(Event::Worked {
        job: *job,
        custodian: next.custodian,
        action: next.action,
      });
      Ok(())
    }
  }
}
