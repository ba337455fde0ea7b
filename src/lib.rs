//! Boot-mode decision and handoff for USB field-upgradable STM32F1 microcontrollers.
//!
//! On every reset the [`Bootloader`] brings up the clock, installs a temporary vector table,
//! consults the magic word in the backup domain and the stay-in-boot key in emulated EEPROM, and
//! either waits for an upload over the external transport or hands off to the resident
//! application. Both outcomes are terminal: an upload ends in a system reset, a handoff in a jump.
#![no_std]

pub mod board;
pub mod boot;
pub mod bootloader;
pub mod clock;
pub mod decision;
pub mod indicator;
pub mod intent;
pub mod layout;
pub mod store;
pub mod upload;
pub mod validity;
pub mod vectors;

#[cfg(feature = "stm32f1")]
pub mod stm32f1;

mod fmt;

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod mock;

pub use bootloader::{Bootloader, Config};

use clock::ClockControl;
use intent::BackupDomain;
use vectors::VectorTableBase;

/// Word addressed view of the memory map.
pub trait Memory {
    fn read_word(&self, addr: u32) -> u32;
    fn write_word(&mut self, addr: u32, value: u32);
}

/// Calibrated busy-wait of roughly `count` no-op cycles at the bring-up clock speed.
pub trait Delay {
    fn delay(&mut self, count: u32);
}

/// The upload transport, which also programs the application region.
///
/// Progress is reported through [`upload::UploadSignal`] from the transport interrupt.
pub trait Transport {
    fn init(&mut self);
    fn shutdown(&mut self);
}

/// Representation of a concrete chip: its clock tree, backup domain, memory and vector table base.
pub trait Platform: ClockControl + BackupDomain + Memory + VectorTableBase {}

impl<T: ClockControl + BackupDomain + Memory + VectorTableBase> Platform for T {}
