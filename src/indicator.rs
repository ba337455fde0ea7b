//! Indicator LEDs and the board pin driver interface.

use embedded_hal::digital::OutputPin;

/// Named indicator lines.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    /// Blinks while waiting for the host to start an upload.
    Activity,
    /// Lit when leaving serial mode and when handing off to the application.
    Status,
}

/// Board pin driver.
///
/// Implementations for boards lacking a line should silently ignore requests for that line.
pub trait Indicators {
    /// Configure all pins of the board. Called once per boot, before any other method.
    fn pins_init(&mut self);

    fn set(&mut self, indicator: Indicator, on: bool);

    /// Drive the USB discovery line, if the board has one.
    fn set_discovery(&mut self, _attached: bool) {}

    /// Turn off the GPIO clocks enabled by [`Indicators::pins_init`], leaving a clean state for
    /// the application.
    fn release(&mut self);
}

/// Indicators on top of a pair of `embedded-hal` output pins.
///
/// Both pins are treated as active-high; wrap an inverting pin for active-low LEDs. Pin errors
/// are ignored.
pub struct PinIndicators<A, S> {
    activity: A,
    status: S,
}

impl<A: OutputPin, S: OutputPin> PinIndicators<A, S> {
    pub fn new(activity: A, status: S) -> Self {
        Self { activity, status }
    }

    pub fn into_inner(self) -> (A, S) {
        (self.activity, self.status)
    }
}

fn drive(pin: &mut impl OutputPin, on: bool) {
    let _ = if on { pin.set_high() } else { pin.set_low() };
}

impl<A: OutputPin, S: OutputPin> Indicators for PinIndicators<A, S> {
    fn pins_init(&mut self) {
        drive(&mut self.activity, false);
        drive(&mut self.status, false);
    }

    fn set(&mut self, indicator: Indicator, on: bool) {
        match indicator {
            Indicator::Activity => drive(&mut self.activity, on),
            Indicator::Status => drive(&mut self.status, on),
        }
    }

    fn release(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct Pin {
        high: bool,
        writes: usize,
    }

    impl ErrorType for Pin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn pins() {
        let mut indicators = PinIndicators::new(Pin::default(), Pin::default());
        indicators.pins_init();
        indicators.set(Indicator::Status, true);
        indicators.set_discovery(true);
        indicators.release();

        let (activity, status) = indicators.into_inner();
        assert!(!activity.high);
        assert_eq!(activity.writes, 1);
        assert!(status.high);
        assert_eq!(status.writes, 2);
    }
}
