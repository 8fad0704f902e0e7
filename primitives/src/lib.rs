#![cfg_attr(not(feature = "std"), no_std)]

pub mod calls;
pub mod composition;

pub use calls::*;
pub use composition::*;
