//! Relocation of the interrupt vector table.

use crate::{Memory, layout::MemoryMap};

/// Vector table slot holding the initial main stack pointer.
pub const INITIAL_MSP: u32 = 0;

/// Vector table slot holding the reset handler.
pub const RESET_HANDLER: u32 = 1;

/// Vector table slot of the USB low priority / CAN1 RX0 interrupt on STM32F103.
pub const USB_LP_CAN1_RX0: u32 = 36;

/// Access to the vector table offset register.
pub trait VectorTableBase {
    /// Point the hardware at the vector table at `addr`. Takes effect immediately.
    fn set_vector_table(&mut self, addr: u32);
}

/// Entries of the temporary table servicing the upload transport.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemporaryVectors {
    /// Entry point of the bootloader itself.
    pub reset_handler: u32,
    /// Slot of the interrupt line the transport needs.
    pub transport_slot: u32,
    pub transport_handler: u32,
}

impl TemporaryVectors {
    pub const fn usb(reset_handler: u32, usb_handler: u32) -> Self {
        Self {
            reset_handler,
            transport_slot: USB_LP_CAN1_RX0,
            transport_handler: usb_handler,
        }
    }
}

/// Build a minimal vector table at the start of RAM and activate it.
///
/// Must run before any interrupt source is enabled.
pub fn install_temporary_vectors<P>(
    platform: &mut P,
    layout: &MemoryMap,
    vectors: &TemporaryVectors,
) where
    P: Memory + VectorTableBase,
{
    let table = layout.sram_base;
    let slot = |index: u32| table + index * 4;

    platform.write_word(slot(INITIAL_MSP), layout.sram_end());
    platform.write_word(slot(RESET_HANDLER), vectors.reset_handler);
    platform.write_word(slot(vectors.transport_slot), vectors.transport_handler);
    platform.set_vector_table(table);
}

/// Activate the vector table of the resident application.
///
/// From here on interrupts are served by application handlers; only the jump may follow.
pub fn install_final_vectors(platform: &mut impl VectorTableBase, layout: &MemoryMap) {
    platform.set_vector_table(layout.app_start());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, MockPlatform};

    #[test]
    fn temporary() {
        let mut platform = MockPlatform::new();
        let layout = MemoryMap::STM32F103;

        install_temporary_vectors(
            &mut platform,
            &layout,
            &TemporaryVectors::usb(0x0800_0101, 0x0800_0201),
        );

        assert_eq!(platform.read_word(0x2000_0000), 0x2000_5000);
        assert_eq!(platform.read_word(0x2000_0004), 0x0800_0101);
        assert_eq!(platform.read_word(0x2000_0000 + 36 * 4), 0x0800_0201);
        assert_eq!(platform.vtor, Some(0x2000_0000));

        // The table is fully written before the base register moves.
        let last = platform.events.len() - 1;
        assert_eq!(platform.events[last], Event::Vtor(0x2000_0000));
        assert!(
            platform.events[..last]
                .iter()
                .all(|e| matches!(e, Event::Write { .. }))
        );
    }

    #[test]
    fn final_table() {
        let mut platform = MockPlatform::new();
        install_final_vectors(&mut platform, &MemoryMap::STM32F103);
        assert_eq!(platform.vtor, Some(0x0800_0800));
    }
}
