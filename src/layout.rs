//! Memory region map of the device.

use crate::board::BoardConfig;

/// Default size reserved for the bootloader image at the start of flash.
pub const DEFAULT_BOOTLOADER_SIZE: u32 = 2 * 1024;

/// Default SRAM size, valid for the smallest members of the STM32F103 family.
pub const DEFAULT_SRAM_SIZE: u32 = 20 * 1024;

/// Fixed placement of the bootloader, the resident application and RAM.
///
/// The bootloader occupies `flash_base .. flash_base + bootloader_size`, and the application
/// starts directly behind it. The stack of the bootloader grows down from [`MemoryMap::sram_end`].
///
/// `sram_size` must match the installed RAM exactly; an oversized value puts the initial stack
/// pointer outside of physical memory.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryMap {
    pub flash_base: u32,
    pub bootloader_size: u32,
    pub sram_base: u32,
    pub sram_size: u32,
}

impl MemoryMap {
    pub const STM32F103: MemoryMap = MemoryMap {
        flash_base: 0x0800_0000,
        bootloader_size: DEFAULT_BOOTLOADER_SIZE,
        sram_base: 0x2000_0000,
        sram_size: DEFAULT_SRAM_SIZE,
    };

    /// Apply the overrides of a board variant.
    pub const fn for_board(self, board: &BoardConfig) -> Self {
        match board.sram_size {
            Some(sram_size) => MemoryMap { sram_size, ..self },
            None => self,
        }
    }

    /// Start of the resident application, which is also the location of its vector table.
    pub const fn app_start(&self) -> u32 {
        self.flash_base + self.bootloader_size
    }

    /// Top of RAM, used as the initial stack pointer of the bootloader.
    pub const fn sram_end(&self) -> u32 {
        self.sram_base + self.sram_size
    }

    /// The application region must lie behind the bootloader region, and RAM must not alias flash.
    pub const fn is_consistent(&self) -> bool {
        let bootloader_end = match self.flash_base.checked_add(self.bootloader_size) {
            Some(end) => end,
            None => return false,
        };
        let sram_end = match self.sram_base.checked_add(self.sram_size) {
            Some(end) => end,
            None => return false,
        };

        self.bootloader_size > 0
            && self.sram_size > 0
            && self.app_start() >= bootloader_end
            && (sram_end <= self.flash_base || self.sram_base >= bootloader_end)
    }
}

const _: () = assert!(MemoryMap::STM32F103.is_consistent());

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::boards;

    #[test]
    fn default_map() {
        let map = MemoryMap::STM32F103;
        assert_eq!(map.app_start(), 0x0800_0800);
        assert_eq!(map.sram_end(), 0x2000_5000);
    }

    #[test]
    fn board_override() {
        let map = MemoryMap::STM32F103.for_board(&boards::XLINEUSB);
        assert_eq!(map.sram_end(), 0x2000_0000 + 6 * 1024);
        assert!(map.is_consistent());

        let map = MemoryMap::STM32F103.for_board(&boards::GENERIC_F103_PC13);
        assert_eq!(map, MemoryMap::STM32F103);
    }

    #[test]
    fn inconsistent() {
        let map = MemoryMap {
            sram_base: 0x0800_0000,
            ..MemoryMap::STM32F103
        };
        assert!(!map.is_consistent());

        let map = MemoryMap {
            sram_size: 0,
            ..MemoryMap::STM32F103
        };
        assert!(!map.is_consistent());
    }
}
