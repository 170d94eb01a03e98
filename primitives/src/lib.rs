#![cfg_attr(not(feature = "std"), no_std)]

pub mod ecosystem;
pub mod liquidity;

pub use ecosystem::*;
pub use liquidity::*;
