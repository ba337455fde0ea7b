#[cfg(feature = "cortex_m")]
pub mod cortex_m;

/// Transfer of control out of the bootloader, either into the application or through a reset.
///
/// Both paths are terminal: nothing of the bootloader runs afterwards.
pub trait Boot {
    /// Load the stack pointer from the vector table at `addr` and jump to its reset vector.
    ///
    /// # Safety
    /// `addr` must point at a vector table whose first two entries are a stack pointer into RAM
    /// and the entry point of a valid program.
    unsafe fn boot(addr: *const u32) -> !;

    /// Request a full system reset.
    fn reset() -> !;
}
