#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![allow(async_fn_in_trait)]

mod bus;
mod common;
pub mod dev;
mod error;
mod pin;

pub use bus::AsyncI2c;
pub use bus::BlockingI2c;
pub use bus::BlockingI2cBus;
pub use bus::I2cBus;
pub use bus::Mcp23017Bus;
pub use common::mode;
pub use common::Bank;
pub use common::BankSelector;
pub use common::Direction;
pub use common::Drive;
pub use common::InterruptType;
pub use common::Polarity;
pub use error::Error;
pub use pin::Pin;

pub use dev::mcp23017::Driver;
pub use dev::mcp23017::Mcp23017;
pub use dev::mcp23017::Register;
