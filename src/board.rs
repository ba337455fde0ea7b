//! Board variants: which GPIO lines drive the indicators and the USB discovery line.
//!
//! Each variant is a plain `const` [`BoardConfig`]. Pick one when wiring up the bootloader; lines
//! that a board leaves unset are simply not driven.

/// GPIO port of the STM32F1 family.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
}

impl Port {
    pub const ALL: [Port; 5] = [Port::A, Port::B, Port::C, Port::D, Port::E];

    /// Index of the port, `A` being 0.
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Output driver configuration of a pin.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    PushPull,
    OpenDrain,
}

impl OutputMode {
    /// `CNF:MODE` nibble of the port configuration register, as a 50 MHz output.
    pub const fn config_bits(self) -> u8 {
        match self {
            OutputMode::PushPull => 0b0011,
            OutputMode::OpenDrain => 0b0111,
        }
    }
}

/// `CNF:MODE` nibble of an input with pull-up or pull-down. The output data bit picks which.
pub const INPUT_PULL: u8 = 0b1000;

/// BOOT1 is PB2.
pub const BOOT1: u8 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub port: Port,
    pub pin: u8,
    pub mode: OutputMode,
    /// Whether the line is driven high to be active (LED lit, host attached).
    pub active_high: bool,
}

impl PinConfig {
    pub const fn active_low(port: Port, pin: u8) -> Self {
        PinConfig {
            port,
            pin,
            mode: OutputMode::OpenDrain,
            active_high: false,
        }
    }

    pub const fn active_high(port: Port, pin: u8, mode: OutputMode) -> Self {
        PinConfig {
            port,
            pin,
            mode,
            active_high: true,
        }
    }

    /// Level to drive for the requested logical state.
    pub const fn level(&self, active: bool) -> bool {
        active == self.active_high
    }
}

/// Configuration applied to one line when the pins are initialized.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinSetup {
    pub port: Port,
    pub pin: u8,
    /// `CNF:MODE` nibble.
    pub config: u8,
    /// Output data level, set before the configuration.
    pub level: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    pub name: &'static str,
    /// Activity LED, blinks while waiting for the host.
    pub led1: Option<PinConfig>,
    /// Status LED, lit when leaving the bootloader.
    pub led2: Option<PinConfig>,
    /// Line switching the USB pull-up, if the board has one.
    pub disc: Option<PinConfig>,
    /// Overrides the default SRAM size of the memory map.
    pub sram_size: Option<u32>,
    /// Pull BOOT1 (PB2) down, which floats on some boards.
    pub boot1_pulldown: bool,
}

impl BoardConfig {
    const fn generic(name: &'static str, led1: PinConfig) -> Self {
        BoardConfig {
            name,
            led1: Some(led1),
            led2: None,
            disc: None,
            sram_size: None,
            boot1_pulldown: false,
        }
    }

    /// Iterate over all lines this board drives.
    pub fn lines(&self) -> impl Iterator<Item = PinConfig> {
        [self.led1, self.led2, self.disc].into_iter().flatten()
    }

    /// Ports with at least one of the board's lines, each listed once.
    pub fn ports(&self) -> impl Iterator<Item = Port> {
        Port::ALL
            .into_iter()
            .filter(move |port| self.lines().any(|line| line.port == *port))
    }

    /// Pin configuration at start-up: every line inactive, then the BOOT1 pull-down if needed.
    pub fn pin_setup(&self) -> impl Iterator<Item = PinSetup> {
        let outputs = self.lines().map(|line| PinSetup {
            port: line.port,
            pin: line.pin,
            config: line.mode.config_bits(),
            level: line.level(false),
        });
        let boot1 = self.boot1_pulldown.then_some(PinSetup {
            port: Port::B,
            pin: BOOT1,
            config: INPUT_PULL,
            level: false,
        });
        outputs.chain(boot1)
    }
}

pub mod boards {
    use super::{BoardConfig, OutputMode, PinConfig, Port};

    pub const MAPLE_MINI: BoardConfig = BoardConfig {
        name: "maple-mini",
        led1: Some(PinConfig::active_high(Port::B, 1, OutputMode::OpenDrain)),
        led2: None,
        disc: Some(PinConfig::active_low(Port::B, 9)),
        sram_size: None,
        boot1_pulldown: true,
    };

    pub const GENERIC_F103_PC13: BoardConfig =
        BoardConfig::generic("generic-f103-pc13", PinConfig::active_low(Port::C, 13));
    pub const GENERIC_F103_PD2: BoardConfig =
        BoardConfig::generic("generic-f103-pd2", PinConfig::active_low(Port::D, 2));
    pub const GENERIC_F103_PD1: BoardConfig =
        BoardConfig::generic("generic-f103-pd1", PinConfig::active_low(Port::D, 1));
    pub const GENERIC_F103_PA1: BoardConfig =
        BoardConfig::generic("generic-f103-pa1", PinConfig::active_low(Port::A, 1));
    pub const GENERIC_F103_PB9: BoardConfig =
        BoardConfig::generic("generic-f103-pb9", PinConfig::active_low(Port::B, 9));
    pub const GENERIC_F103_PE2: BoardConfig =
        BoardConfig::generic("generic-f103-pe2", PinConfig::active_low(Port::E, 2));
    pub const GENERIC_F103_PA9: BoardConfig =
        BoardConfig::generic("generic-f103-pa9", PinConfig::active_low(Port::A, 9));
    pub const GENERIC_F103_PE5: BoardConfig =
        BoardConfig::generic("generic-f103-pe5", PinConfig::active_low(Port::E, 5));
    pub const GENERIC_F103_PB7: BoardConfig =
        BoardConfig::generic("generic-f103-pb7", PinConfig::active_low(Port::B, 7));
    pub const GENERIC_F103_PB0: BoardConfig =
        BoardConfig::generic("generic-f103-pb0", PinConfig::active_low(Port::B, 0));
    pub const GENERIC_F103_PB12: BoardConfig =
        BoardConfig::generic("generic-f103-pb12", PinConfig::active_low(Port::B, 12));

    pub const MINI_STM32V3: BoardConfig = BoardConfig {
        name: "mini-stm32v3",
        led1: Some(PinConfig::active_high(Port::A, 2, OutputMode::PushPull)),
        led2: None,
        disc: Some(PinConfig::active_low(Port::D, 2)),
        sram_size: None,
        boot1_pulldown: false,
    };

    pub const XLINEUSB: BoardConfig = BoardConfig {
        name: "xlineusb",
        led1: Some(PinConfig::active_low(Port::B, 5)),
        led2: None,
        disc: None,
        sram_size: Some(6 * 1024),
        boot1_pulldown: false,
    };

    pub const ALL: &[BoardConfig] = &[
        MAPLE_MINI,
        GENERIC_F103_PC13,
        GENERIC_F103_PD2,
        GENERIC_F103_PD1,
        GENERIC_F103_PA1,
        GENERIC_F103_PB9,
        GENERIC_F103_PE2,
        GENERIC_F103_PA9,
        GENERIC_F103_PE5,
        GENERIC_F103_PB7,
        GENERIC_F103_PB0,
        GENERIC_F103_PB12,
        MINI_STM32V3,
        XLINEUSB,
    ];
}
