//! Polled eMMC driver for the TI OMAP/AM335x MMCHS host controller.
//!
//! [`OmapSdhc`] drives the controller registers, [`MmcHost`] runs the card
//! protocol on top of any [`MmcHostOps`] implementation and [`MmcDevice`]
//! serializes access to both.

#![cfg_attr(not(test), no_std)]

pub mod card;
pub mod common;
pub mod config;
pub mod constants;
pub mod core;
pub mod device;
pub mod host;
pub mod regs;
pub mod tools;

pub use crate::core::MmcHost;
pub use card::{AddressMode, CardConfig, CardState, MmcVersion};
pub use config::{HostConfig, PollBudget, ProtocolConfig};
pub use device::MmcDevice;
pub use host::{BusWidth, MmcHostError, MmcHostOps, MmcHostResult, omap::OmapSdhc};
pub use regs::{Mmio, RegisterAccess};
