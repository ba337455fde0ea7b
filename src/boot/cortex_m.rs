use crate::boot::Boot;

/// Simple bootload mechanism for Cortex-M without support for TrustZone.
pub struct SimpleCortexM;

impl Boot for SimpleCortexM {
    unsafe fn boot(addr: *const u32) -> ! {
        // Make sure the vector table write has landed before leaving.
        cortex_m::asm::dsb();
        cortex_m::asm::isb();

        unsafe { cortex_m::asm::bootload(addr) }
    }

    fn reset() -> ! {
        cortex_m::peripheral::SCB::sys_reset()
    }
}
