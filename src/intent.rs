//! Boot intent carried across resets: the magic word in the backup domain and the stay-in-boot
//! key in emulated EEPROM.

use crate::{
    fmt::log,
    store::{KeyValueStore, StoreError},
};

/// Key of the stay-in-boot flag in the emulated EEPROM.
pub const STAY_IN_BOOT_KEY: u16 = 0x0001;

/// Value of the stay-in-boot key under which the bootloader resumes the application on an
/// ordinary reset. Any other value, or no value, keeps the bootloader resident.
pub const STAY_IN_BOOT: u16 = 0x4242;

/// Sentinel left in the backup register to pass a boot intent across a reset.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagicWord(pub u16);

impl MagicWord {
    pub const NONE: MagicWord = MagicWord(0);

    /// An upload just completed: resume the application.
    pub const UPLOAD_COMPLETE: MagicWord = MagicWord(0x1988);

    /// Requested by a host tool: leave the serial transport and enter upload mode.
    pub const EXIT_SERIAL: MagicWord = MagicWord(0x424C);

    pub fn is_upload_complete(self) -> bool {
        self == Self::UPLOAD_COMPLETE
    }

    pub fn is_exit_serial(self) -> bool {
        self == Self::EXIT_SERIAL
    }
}

/// The battery backed register holding the magic word, together with its write protection.
pub trait BackupDomain {
    /// Enable the power and backup interface clocks.
    fn enable_clocks(&mut self);
    fn disable_clocks(&mut self);

    /// Enable write access to the backup registers.
    fn unlock(&mut self);
    fn lock(&mut self);

    fn read(&self) -> u16;
    fn write(&mut self, value: u16);
}

/// Open window of write access to the backup domain.
///
/// Locking and disabling the clocks happens on drop, so the window closes on every path.
pub struct BackupAccess<'a, B: BackupDomain> {
    domain: &'a mut B,
}

impl<'a, B: BackupDomain> BackupAccess<'a, B> {
    pub fn open(domain: &'a mut B) -> Self {
        domain.enable_clocks();
        domain.unlock();
        Self { domain }
    }

    pub fn read(&self) -> u16 {
        self.domain.read()
    }

    pub fn write(&mut self, value: u16) {
        self.domain.write(value)
    }
}

impl<B: BackupDomain> Drop for BackupAccess<'_, B> {
    fn drop(&mut self) {
        self.domain.lock();
        self.domain.disable_clocks();
    }
}

/// Read the magic word and zero it, so it cannot influence a later unrelated reset.
///
/// The register is cleared even when it already reads zero.
pub fn read_and_clear_magic_word(domain: &mut impl BackupDomain) -> MagicWord {
    let mut access = BackupAccess::open(domain);
    let value = access.read();
    access.write(0);
    MagicWord(value)
}

pub fn write_magic_word(domain: &mut impl BackupDomain, word: MagicWord) {
    BackupAccess::open(domain).write(word.0);
}

/// Read the stay-in-boot key. Any failure counts as absent.
pub fn read_stay_key(store: &mut impl KeyValueStore) -> Option<u16> {
    match store.read(STAY_IN_BOOT_KEY) {
        Ok(value) => Some(value),
        Err(StoreError::NotFound) => None,
        Err(StoreError::Io) => {
            log::warn!("stay-in-boot key unreadable");
            None
        }
    }
}
