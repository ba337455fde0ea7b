//! Keyed non-volatile storage of 16-bit values.

#[cfg(feature = "emulated_eeprom")]
pub mod eeprom;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    NotFound,
    Io,
}

/// Keyed lookup in an emulated EEPROM or similar store.
pub trait KeyValueStore {
    fn read(&mut self, key: u16) -> Result<u16, StoreError>;
}
