//! The boot decision.

use crate::intent::{MagicWord, STAY_IN_BOOT};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootDecision {
    /// Stay in the bootloader and wait for an upload.
    Upload {
        /// A host tool asked to leave the serial transport first.
        exit_serial: bool,
    },
    /// Hand off to the resident application.
    Resume,
}

/// Decide between upload mode and resuming the application.
///
/// Without a fresh post-upload magic word, the application is resumed only when the stay-in-boot
/// key holds [`STAY_IN_BOOT`]; an absent or unreadable key enters upload mode. An invalid
/// application or an exit-serial request always enters upload mode.
pub fn decide(magic: MagicWord, stay_key: Option<u16>, app_valid: bool) -> BootDecision {
    let key_mismatch = stay_key != Some(STAY_IN_BOOT);
    let upload = (key_mismatch && !magic.is_upload_complete())
        || magic.is_exit_serial()
        || !app_valid;

    if upload {
        BootDecision::Upload {
            exit_serial: magic.is_exit_serial(),
        }
    } else {
        BootDecision::Resume
    }
}
