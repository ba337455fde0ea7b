//! The reset and handoff sequencer.

use crate::{
    Delay, Platform, Transport,
    boot::Boot,
    clock::{self, ClockConfig},
    decision::{BootDecision, decide},
    fmt::log,
    indicator::{Indicator, Indicators},
    intent::{MagicWord, read_and_clear_magic_word, read_stay_key, write_magic_word},
    layout::MemoryMap,
    store::KeyValueStore,
    upload::{UploadSignal, wait_for_completion},
    validity::is_valid_application,
    vectors::{self, TemporaryVectors},
};

/// Time for the USB pull-up to settle after the pins are configured, about 1us.
pub const PULLUP_SETTLE: u32 = 72;

/// Time for the host to notice the serial transport going away.
pub const SERIAL_EXIT_SETTLE: u32 = 4_000_000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub layout: MemoryMap,
    pub clock: ClockConfig,
    pub vectors: TemporaryVectors,
}

/// One pass of the boot sequence, from reset to either a jump into the application or a reset.
pub struct Bootloader<'a, P, S, T, I, D> {
    pub config: Config,
    pub signal: &'a UploadSignal,
    pub platform: P,
    pub store: S,
    pub transport: T,
    pub indicators: I,
    pub delay: D,
}

impl<P, S, T, I, D> Bootloader<'_, P, S, T, I, D>
where
    P: Platform,
    S: KeyValueStore,
    T: Transport,
    I: Indicators,
    D: Delay,
{
    /// Run the boot sequence. Never returns.
    pub fn run<B: Boot>(&mut self) -> ! {
        match self.start() {
            BootDecision::Upload { exit_serial } => self.upload::<B>(exit_serial),
            BootDecision::Resume => self.resume::<B>(),
        }
    }

    /// Bring up the device and take the boot decision.
    ///
    /// Apart from clearing the magic word, nothing persistent is touched before the decision.
    fn start(&mut self) -> BootDecision {
        let Config {
            layout,
            clock: clock_config,
            vectors: temporary,
        } = self.config;

        clock::bring_up(&mut self.platform, &clock_config);
        vectors::install_temporary_vectors(&mut self.platform, &layout, &temporary);

        let magic = read_and_clear_magic_word(&mut self.platform);

        self.indicators.pins_init();
        self.delay.delay(PULLUP_SETTLE);
        self.indicators.set(Indicator::Status, false);

        self.signal.reset();

        let stay_key = read_stay_key(&mut self.store);
        let app_valid = is_valid_application(&self.platform, layout.app_start(), layout.sram_base);

        let decision = decide(magic, stay_key, app_valid);
        log::info!(
            "magic {=u16:#x}, stay key {}, application valid {}: {}",
            magic.0,
            stay_key,
            app_valid,
            decision
        );
        decision
    }

    /// Serve uploads until one completes, then reset into the new application.
    ///
    /// Resuming through a reset starts the application from the same clock and peripheral state
    /// as a power-on.
    fn upload<B: Boot>(&mut self, exit_serial: bool) -> ! {
        if exit_serial {
            log::info!("leaving serial mode");
            self.indicators.set(Indicator::Status, true);
            self.transport.shutdown();
            self.delay.delay(SERIAL_EXIT_SETTLE);
        }

        self.transport.init();
        wait_for_completion(self.signal, &mut self.indicators, &mut self.delay);

        write_magic_word(&mut self.platform, MagicWord::UPLOAD_COMPLETE);
        self.transport.shutdown();

        log::info!("upload complete, resetting");
        B::reset()
    }

    fn resume<B: Boot>(&mut self) -> ! {
        let app = self.config.layout.app_start();
        log::info!("resuming application at {=u32:#x}", app);

        self.indicators.set(Indicator::Status, true);
        self.indicators.release();

        vectors::install_final_vectors(&mut self.platform, &self.config.layout);

        // SAFETY: the application was checked to start with a stack pointer into RAM.
        unsafe { B::boot(app as *const u32) }
    }
}
