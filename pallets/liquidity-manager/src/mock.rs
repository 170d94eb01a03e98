extern crate alloc;

use crate as pallet_liquidity_manager;
use alloc::vec::Vec;
use codec::{Decode, Encode};
use core::time::Duration;
use polkadot_sdk::frame_support::traits::fungibles::{Inspect, Mutate};
use polkadot_sdk::frame_support::traits::tokens::Preservation;
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  storage::unhashed,
  traits::{ConstU32, ConstU64, ConstU128, Get, UnixTime},
};
use polkadot_sdk::frame_system::{self, EnsureRoot};
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, DispatchResult,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::ecosystem::params::{
  BONDING_DELAY_SECS, DAY_SECS, MAX_LIQUIDITY_FEE, UNBONDING_DELAY_SECS,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

pub type AccountId = u128;
pub type JobId = u32;

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CHARLIE: AccountId = 3;
pub const KEEPER: AccountId = 10;
pub const GOVERNOR: AccountId = 11;
pub const FEE_RECEIVER: AccountId = 12;
pub const REGISTRY_ACCOUNT: AccountId = 777;

pub const LP: u32 = 1;
pub const OTHER_LP: u32 = 2;
pub const JOB: JobId = 100;
pub const OTHER_JOB: JobId = 200;

pub const UNIT: u128 = 1_000_000_000_000_000_000;
pub const START: u64 = 1_700_000_000;

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    LiquidityManager: pallet_liquidity_manager,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

// State containers for the clock and the jobs known to the fake work registry
thread_local! {
  static NOW: Cell<u64> = const { Cell::new(START) };

  static REGISTERED_JOBS: RefCell<BTreeSet<JobId>> = const { RefCell::new(BTreeSet::new()) };
}

const BOND_PREFIX: &[u8] = b"mock/registry/bond";

/// Registry bookkeeping per (provider, token, job), kept in runtime storage so
/// it rolls back together with a failed call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Bond {
  pub pending: u128,
  pub bonded_at: u64,
  pub credited: u128,
  pub unbonding: u128,
  pub unbond_at: u64,
}

pub fn now() -> u64 {
  NOW.with(|n| n.get())
}

pub fn advance_secs(secs: u64) {
  NOW.with(|n| n.set(n.get() + secs));
}

/// Move the clock by whole days plus one second.
pub fn advance_days(days: u64) {
  advance_secs(days * DAY_SECS + 1);
}

pub fn register_job(job: JobId) {
  REGISTERED_JOBS.with(|jobs| jobs.borrow_mut().insert(job));
}

pub fn deregister_job(job: JobId) {
  REGISTERED_JOBS.with(|jobs| jobs.borrow_mut().remove(&job));
}

fn bond_key(provider: &AccountId, token: u32, job: &JobId) -> Vec<u8> {
  (BOND_PREFIX, provider, token, job).encode()
}

pub fn bond_of(provider: AccountId, token: u32, job: JobId) -> Bond {
  unhashed::get(&bond_key(&provider, token, &job)).unwrap_or_default()
}

pub struct MockTime;
impl UnixTime for MockTime {
  fn now() -> Duration {
    Duration::from_secs(now())
  }
}

/// Work registry holding bonded tokens on `REGISTRY_ACCOUNT` and enforcing
/// job membership plus both maturities.
pub struct MockRegistry;
impl MockRegistry {
  fn update<R>(
    provider: &AccountId,
    token: u32,
    job: &JobId,
    f: impl FnOnce(&mut Bond) -> Result<R, DispatchError>,
  ) -> Result<R, DispatchError> {
    let key = bond_key(provider, token, job);
    let mut bond: Bond = unhashed::get(&key).unwrap_or_default();
    let result = f(&mut bond)?;
    unhashed::put(&key, &bond);
    Ok(result)
  }
}

impl pallet_liquidity_manager::WorkRegistry<AccountId, JobId> for MockRegistry {
  fn is_job(job: &JobId) -> bool {
    REGISTERED_JOBS.with(|jobs| jobs.borrow().contains(job))
  }

  fn add_liquidity(provider: &AccountId, token: u32, job: &JobId, amount: u128) -> DispatchResult {
    if !Self::is_job(job) {
      return Err(DispatchError::Other("registry: job not registered"));
    }
    <Assets as Mutate<AccountId>>::transfer(
      token,
      provider,
      &REGISTRY_ACCOUNT,
      amount,
      Preservation::Expendable,
    )?;
    Self::update(provider, token, job, |bond| {
      bond.pending += amount;
      bond.bonded_at = now();
      Ok(())
    })
  }

  fn apply_credit(provider: &AccountId, token: u32, job: &JobId) -> DispatchResult {
    Self::update(provider, token, job, |bond| {
      if bond.pending == 0 || now() < bond.bonded_at + BONDING_DELAY_SECS {
        return Err(DispatchError::Other("registry: bond not matured"));
      }
      bond.credited += bond.pending;
      bond.pending = 0;
      Ok(())
    })
  }

  fn unbond_liquidity(
    provider: &AccountId,
    token: u32,
    job: &JobId,
    amount: u128,
  ) -> DispatchResult {
    Self::update(provider, token, job, |bond| {
      if bond.credited < amount {
        return Err(DispatchError::Other("registry: not enough credited"));
      }
      bond.credited -= amount;
      bond.unbonding += amount;
      bond.unbond_at = now();
      Ok(())
    })
  }

  fn remove_liquidity(
    provider: &AccountId,
    token: u32,
    job: &JobId,
  ) -> Result<u128, DispatchError> {
    let amount = Self::update(provider, token, job, |bond| {
      if bond.unbonding == 0 || now() < bond.unbond_at + UNBONDING_DELAY_SECS {
        return Err(DispatchError::Other("registry: unbonding not matured"));
      }
      Ok(core::mem::take(&mut bond.unbonding))
    })?;
    <Assets as Mutate<AccountId>>::transfer(
      token,
      &REGISTRY_ACCOUNT,
      provider,
      amount,
      Preservation::Expendable,
    )?;
    Ok(amount)
  }
}

pub struct LiquidityManagerPalletId;
impl Get<PalletId> for LiquidityManagerPalletId {
  fn get() -> PalletId {
    PalletId(*primitives::ecosystem::pallet_ids::LIQUIDITY_MANAGER_PALLET_ID)
  }
}

impl pallet_liquidity_manager::Config for Test {
  type Assets = Assets;
  type Registry = MockRegistry;
  type Time = MockTime;
  type JobId = JobId;
  type PalletId = LiquidityManagerPalletId;
  type BondingDelay = ConstU64<BONDING_DELAY_SECS>;
  type UnbondingDelay = ConstU64<UNBONDING_DELAY_SECS>;
  type MaxLiquidityFee = ConstU32<MAX_LIQUIDITY_FEE>;
  type MaxJobs = ConstU32<4>;
  type MaxLiquiditiesPerJob = ConstU32<2>;
  type AdminOrigin = EnsureRoot<AccountId>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = LiquidityManagerBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct LiquidityManagerBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<AccountId, JobId> for LiquidityManagerBenchmarkHelper {
  fn job(seed: u32) -> JobId {
    1_000 + seed
  }

  fn register_job(job: &JobId) -> DispatchResult {
    register_job(*job);
    Ok(())
  }

  fn create_token(token: u32) -> DispatchResult {
    if !<Assets as Inspect<AccountId>>::asset_exists(token) {
      Assets::force_create(RuntimeOrigin::root(), token, ALICE, true, 1)?;
    }
    Ok(())
  }

  fn fund_account(who: &AccountId, token: u32, amount: u128) -> DispatchResult {
    <Assets as Mutate<AccountId>>::mint_into(token, who, amount)?;
    Ok(())
  }
}

pub fn custodian_account(custodian: primitives::Custodian) -> AccountId {
  LiquidityManager::custodian_account(custodian)
}

pub fn lp_balance(who: AccountId) -> u128 {
  <Assets as Inspect<AccountId>>::balance(LP, &who)
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    assets: alloc::vec![(LP, ALICE, true, 1), (OTHER_LP, ALICE, true, 1)],
    metadata: alloc::vec![],
    accounts: alloc::vec![
      (LP, ALICE, 1_000 * UNIT),
      (LP, BOB, 1_000 * UNIT),
      (LP, CHARLIE, 1_000 * UNIT),
      (LP, GOVERNOR, 10 * UNIT),
      (OTHER_LP, ALICE, 1_000 * UNIT),
    ],
    reserves: alloc::vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_liquidity_manager::GenesisConfig::<Test> {
    keeper_gateway: Some(KEEPER),
    ..Default::default()
  }
  .assimilate_storage(&mut t)
  .unwrap();

  // Reset State
  NOW.with(|n| n.set(START));
  REGISTERED_JOBS.with(|jobs| jobs.borrow_mut().clear());

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| System::set_block_number(1));
  ext
}
