//! Upload session flags shared with the transport interrupt, and the loop waiting on them.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::{
    Delay,
    fmt::log,
    indicator::{Indicator, Indicators},
};

/// On and off time of the activity LED while waiting for the host.
pub const BLINK_PERIOD: u32 = 2_000_000;

/// Delay between polls of the upload flags.
pub const POLL_INTERVAL: u32 = 512;

/// Flags raised by the upload transport, observed by the bootloader.
///
/// Only the transport interrupt handler raises the flags; only the bootloader clears them, before
/// the transport is started. Release/acquire ordering makes the flag writes visible to the next
/// poll.
pub struct UploadSignal {
    started: AtomicBool,
    finished: AtomicBool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UploadStatus {
    pub started: bool,
    pub finished: bool,
}

impl UploadSignal {
    pub const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    /// The first valid protocol activity was seen.
    pub fn mark_started(&self) {
        self.started.store(true, Ordering::Release);
    }

    /// A complete image was transferred and verified.
    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.started.store(false, Ordering::Release);
        self.finished.store(false, Ordering::Release);
    }

    pub fn status(&self) -> UploadStatus {
        UploadStatus {
            started: self.started.load(Ordering::Acquire),
            finished: self.finished.load(Ordering::Acquire),
        }
    }
}

impl Default for UploadSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UploadPhase {
    NotStarted,
    InProgress,
    Done,
}

impl UploadPhase {
    pub fn next(self, status: UploadStatus) -> Self {
        match self {
            UploadPhase::Done => UploadPhase::Done,
            _ if status.finished => UploadPhase::Done,
            UploadPhase::NotStarted if status.started => UploadPhase::InProgress,
            phase => phase,
        }
    }
}

/// Spin until the transport reports a finished upload.
///
/// Blinks the activity LED until the host starts talking, then polls tightly.
pub fn wait_for_completion(
    signal: &UploadSignal,
    indicators: &mut impl Indicators,
    delay: &mut impl Delay,
) {
    let mut phase = UploadPhase::NotStarted;

    loop {
        let next = phase.next(signal.status());
        if next != phase {
            log::info!("upload phase {}", next);
            phase = next;
        }

        match phase {
            UploadPhase::Done => return,
            UploadPhase::NotStarted => {
                indicators.set(Indicator::Activity, true);
                delay.delay(BLINK_PERIOD);
                indicators.set(Indicator::Activity, false);
                delay.delay(BLINK_PERIOD);
            }
            UploadPhase::InProgress => {}
        }

        delay.delay(POLL_INTERVAL);
    }
}
