//! STM32F103 implementation of the platform: RCC, flash interface, backup domain and VTOR.

mod gpio;

pub use gpio::BoardPins;

use ::stm32f1::stm32f103::{BKP, FLASH, PWR, RCC, rcc::cfgr};
use cortex_m::peripheral::SCB;

use crate::{
    Delay, Memory,
    clock::{ClockConfig, ClockControl},
    intent::BackupDomain,
    vectors::VectorTableBase,
};

/// Backup data register 10, holding the magic word, among `DR1` to `DR10`.
const DR10: usize = 9;

/// The STM32F103 itself.
pub struct Stm32f1 {
    rcc: RCC,
    flash: FLASH,
    pwr: PWR,
    bkp: BKP,
}

impl Stm32f1 {
    /// Also takes over the SCB vector table offset, which must have no other users.
    pub fn new(rcc: RCC, flash: FLASH, pwr: PWR, bkp: BKP) -> Self {
        Self {
            rcc,
            flash,
            pwr,
            bkp,
        }
    }

    pub fn free(self) -> (RCC, FLASH, PWR, BKP) {
        (self.rcc, self.flash, self.pwr, self.bkp)
    }
}

fn pll_multiplier(w: &mut cfgr::W, field: u8) -> &mut cfgr::W {
    let pllmul = w.pllmul();
    match field {
        0 => pllmul.mul2(),
        1 => pllmul.mul3(),
        2 => pllmul.mul4(),
        3 => pllmul.mul5(),
        4 => pllmul.mul6(),
        5 => pllmul.mul7(),
        6 => pllmul.mul8(),
        7 => pllmul.mul9(),
        8 => pllmul.mul10(),
        9 => pllmul.mul11(),
        10 => pllmul.mul12(),
        11 => pllmul.mul13(),
        12 => pllmul.mul14(),
        13 => pllmul.mul15(),
        _ => pllmul.mul16(),
    }
}

impl ClockControl for Stm32f1 {
    fn enable_hse(&mut self) {
        self.rcc.cr.modify(|_, w| w.hseon().set_bit());
    }

    fn hse_ready(&self) -> bool {
        self.rcc.cr.read().hserdy().bit_is_set()
    }

    fn configure_flash(&mut self, latency: u8, prefetch: bool) {
        self.flash.acr.modify(|_, w| {
            match latency {
                0 => w.latency().ws0(),
                1 => w.latency().ws1(),
                _ => w.latency().ws2(),
            };
            w.prftbe().bit(prefetch)
        });
    }

    fn configure_pll(&mut self, config: &ClockConfig) {
        // SYSCLK = HCLK = PCLK2, PCLK1 = HCLK / 2 when requested.
        self.rcc.cfgr.modify(|_, w| {
            w.pllsrc().hse_div_prediv();
            w.pllxtpre().bit(config.hse_prediv2);
            pll_multiplier(w, config.pllmul_field());
            if config.apb1_div2 {
                w.ppre1().div2()
            } else {
                w.ppre1().div1()
            }
        });
    }

    fn enable_pll(&mut self) {
        self.rcc.cr.modify(|_, w| w.pllon().set_bit());
    }

    fn pll_ready(&self) -> bool {
        self.rcc.cr.read().pllrdy().bit_is_set()
    }

    fn select_pll(&mut self) {
        self.rcc.cfgr.modify(|_, w| w.sw().pll());
    }

    fn pll_selected(&self) -> bool {
        self.rcc.cfgr.read().sws().is_pll()
    }
}

impl BackupDomain for Stm32f1 {
    fn enable_clocks(&mut self) {
        self.rcc
            .apb1enr
            .modify(|_, w| w.bkpen().enabled().pwren().enabled());
    }

    fn disable_clocks(&mut self) {
        self.rcc
            .apb1enr
            .modify(|_, w| w.bkpen().disabled().pwren().disabled());
    }

    fn unlock(&mut self) {
        self.pwr.cr.modify(|_, w| w.dbp().set_bit());
    }

    fn lock(&mut self) {
        self.pwr.cr.modify(|_, w| w.dbp().clear_bit());
    }

    fn read(&self) -> u16 {
        self.bkp.dr[DR10].read().d().bits()
    }

    fn write(&mut self, value: u16) {
        self.bkp.dr[DR10].write(|w| w.d().bits(value));
    }
}

impl Memory for Stm32f1 {
    fn read_word(&self, addr: u32) -> u32 {
        // SAFETY: the boot sequence only reads the application vector table in flash.
        unsafe { (addr as *const u32).read_volatile() }
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        // SAFETY: the boot sequence only writes the temporary vector table in RAM.
        unsafe { (addr as *mut u32).write_volatile(value) }
    }
}

impl VectorTableBase for Stm32f1 {
    fn set_vector_table(&mut self, addr: u32) {
        cortex_m::interrupt::free(|_| {
            // SAFETY: the caller has filled the table at `addr`.
            unsafe { (*SCB::PTR).vtor.write(addr) };
            cortex_m::asm::dsb();
            cortex_m::asm::isb();
        });
    }
}

/// Busy-wait of `count` `nop` instructions.
pub struct NopDelay;

impl Delay for NopDelay {
    fn delay(&mut self, count: u32) {
        for _ in 0..count {
            cortex_m::asm::nop();
        }
    }
}
