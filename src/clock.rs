//! System clock bring-up: HSE, flash wait states, PLL, switch.

/// HSE crystal frequency.
pub const HSE_FREQ: u32 = 8_000_000;

/// PLL multiplication factor.
pub const PLL_MULT: u8 = 9;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    pub hse_freq: u32,
    /// Divide HSE by two before feeding the PLL.
    pub hse_prediv2: bool,
    /// PLL multiplication factor, 2 to 16.
    pub pll_mul: u8,
    /// Flash wait states.
    pub flash_latency: u8,
    pub prefetch: bool,
    /// APB1 is limited to 36 MHz.
    pub apb1_div2: bool,
}

impl ClockConfig {
    /// 8 MHz crystal, 72 MHz system clock.
    pub const MHZ72: ClockConfig = ClockConfig {
        hse_freq: HSE_FREQ,
        hse_prediv2: false,
        pll_mul: PLL_MULT,
        // Two wait states, if 48 MHz < SYS_CLK <= 72 Mhz.
        flash_latency: 2,
        prefetch: true,
        apb1_div2: true,
    };

    pub const fn sys_clk(&self) -> u32 {
        let input = if self.hse_prediv2 {
            self.hse_freq / 2
        } else {
            self.hse_freq
        };
        input.saturating_mul(self.pll_mul as u32)
    }

    /// Whether the chip can run this configuration: a multiplier the PLL offers, at most two
    /// flash wait states and at most 72 MHz.
    pub const fn is_valid(&self) -> bool {
        self.pll_mul >= 2
            && self.pll_mul <= 16
            && self.flash_latency <= 2
            && self.sys_clk() <= 72_000_000
    }

    /// Value of the `RCC_CFGR.PLLMUL` field for [`pll_mul`](Self::pll_mul), clamped to 2 to 16.
    pub const fn pllmul_field(&self) -> u8 {
        let mul = if self.pll_mul < 2 {
            2
        } else if self.pll_mul > 16 {
            16
        } else {
            self.pll_mul
        };
        mul - 2
    }
}

const _: () = assert!(ClockConfig::MHZ72.is_valid());

impl Default for ClockConfig {
    fn default() -> Self {
        Self::MHZ72
    }
}

/// Primitive operations on the reset and clock controller.
pub trait ClockControl {
    fn enable_hse(&mut self);
    fn hse_ready(&self) -> bool;

    fn configure_flash(&mut self, latency: u8, prefetch: bool);

    fn configure_pll(&mut self, config: &ClockConfig);
    fn enable_pll(&mut self);
    fn pll_ready(&self) -> bool;

    fn select_pll(&mut self);
    fn pll_selected(&self) -> bool;
}

/// Raise the system clock from HSI to the PLL output.
///
/// Each step spins until the hardware reports ready, without a timeout.
pub fn bring_up(rcc: &mut impl ClockControl, config: &ClockConfig) {
    rcc.enable_hse();
    while !rcc.hse_ready() {}

    // Wait states must be in place before the clock is raised.
    rcc.configure_flash(config.flash_latency, config.prefetch);

    rcc.configure_pll(config);
    rcc.enable_pll();
    while !rcc.pll_ready() {}

    rcc.select_pll();
    while !rcc.pll_selected() {}
}
