//! Sanity check of the resident application image.

use crate::Memory;

/// Bits of the initial stack pointer that must match the SRAM base.
///
/// Covers the first 128K of RAM, which spans all STM32F103 variants.
pub const STACK_POINTER_MASK: u32 = 0x2FFE_0000;

/// Check whether the vector table at `address` starts with a stack pointer into RAM.
///
/// Erased flash (all ones) and blank flash (all zeros) fail this check. This is not an integrity
/// check: any image whose first word points into RAM passes.
pub fn is_valid_application(memory: &impl Memory, address: u32, sram_base: u32) -> bool {
    let sp = memory.read_word(address);
    sp & STACK_POINTER_MASK == sram_base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPlatform;

    const APP: u32 = 0x0800_0800;
    const SRAM: u32 = 0x2000_0000;

    fn check(sp: u32) -> bool {
        let mut platform = MockPlatform::new();
        platform.memory.insert(APP, sp);
        is_valid_application(&platform, APP, SRAM)
    }

    #[test]
    fn valid() {
        assert!(check(0x2000_0000));
        assert!(check(0x2000_5000));
        assert!(check(0x2001_FFFC));
    }

    #[test]
    fn invalid() {
        assert!(!check(0xFFFF_FFFF));
        assert!(!check(0x0000_0000));
        assert!(!check(0x0800_1000));
        assert!(!check(0x2002_0000));
    }

    #[test]
    fn erased() {
        // Unwritten mock memory reads as erased flash.
        let platform = MockPlatform::new();
        assert!(!is_valid_application(&platform, APP, SRAM));
    }
}
