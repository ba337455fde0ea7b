//! Indicator and discovery lines of a [`BoardConfig`] on the STM32F1 GPIO ports.

use ::stm32f1::stm32f103::{GPIOA, GPIOB, GPIOC, GPIOD, GPIOE, RCC, gpioa};

use crate::{
    board::{BoardConfig, PinConfig, Port},
    indicator::{Indicator, Indicators},
};

fn block(port: Port) -> &'static gpioa::RegisterBlock {
    let ptr = match port {
        Port::A => GPIOA::ptr(),
        Port::B => GPIOB::ptr(),
        Port::C => GPIOC::ptr(),
        Port::D => GPIOD::ptr(),
        Port::E => GPIOE::ptr(),
    };
    // SAFETY: a register block of this chip, only used by `BoardPins`.
    unsafe { &*ptr }
}

/// `reg` with the configuration nibble of `pin` replaced by `bits`.
fn with_config(reg: u32, pin: u8, bits: u8) -> u32 {
    let shift = (pin as u32 % 8) * 4;
    (reg & !(0b1111 << shift)) | ((bits as u32) << shift)
}

fn configure(port: Port, pin: u8, bits: u8) {
    let gpio = block(port);
    // SAFETY: only the nibble of `pin` changes.
    if pin < 8 {
        gpio.crl
            .modify(|r, w| unsafe { w.bits(with_config(r.bits(), pin, bits)) });
    } else {
        gpio.crh
            .modify(|r, w| unsafe { w.bits(with_config(r.bits(), pin, bits)) });
    }
}

fn drive(port: Port, pin: u8, high: bool) {
    let gpio = block(port);
    // SAFETY: set and reset registers only act on the bits written as 1.
    if high {
        gpio.bsrr.write(|w| unsafe { w.bits(1 << pin) });
    } else {
        gpio.brr.write(|w| unsafe { w.bits(1 << pin) });
    }
}

fn set_line(line: Option<PinConfig>, active: bool) {
    if let Some(line) = line {
        drive(line.port, line.pin, line.level(active));
    }
}

fn set_port_clock(port: Port, enabled: bool) {
    // SAFETY: only the clock enable bit of `port` changes, see `BoardPins::new`.
    let rcc = unsafe { &*RCC::ptr() };
    rcc.apb2enr.modify(|_, w| match port {
        Port::A => w.iopaen().bit(enabled),
        Port::B => w.iopben().bit(enabled),
        Port::C => w.iopcen().bit(enabled),
        Port::D => w.iopden().bit(enabled),
        Port::E => w.iopeen().bit(enabled),
    });
}

/// Pin driver for one of the board variants.
pub struct BoardPins {
    board: BoardConfig,
}

impl BoardPins {
    /// # Safety
    /// Takes over the GPIO ports used by `board` and their clock enable bits in `RCC_APB2ENR`.
    /// Nothing may modify `RCC_APB2ENR` concurrently.
    pub unsafe fn new(board: BoardConfig) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &BoardConfig {
        &self.board
    }
}

impl Indicators for BoardPins {
    fn pins_init(&mut self) {
        for setup in self.board.pin_setup() {
            set_port_clock(setup.port, true);
            // With a pull configuration, the output data bit selects up or down.
            drive(setup.port, setup.pin, setup.level);
            configure(setup.port, setup.pin, setup.config);
        }

        self.set_discovery(true);
    }

    fn set(&mut self, indicator: Indicator, on: bool) {
        let line = match indicator {
            Indicator::Activity => self.board.led1,
            Indicator::Status => self.board.led2,
        };
        set_line(line, on);
    }

    fn set_discovery(&mut self, attached: bool) {
        set_line(self.board.disc, attached);
    }

    fn release(&mut self) {
        for port in self.board.ports() {
            set_port_clock(port, false);
        }
    }
}
