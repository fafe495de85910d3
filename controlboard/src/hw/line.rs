// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Push-pull output line with the pin number erased, so lines on different pins can share one
//! array type.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use stm32f7xx_hal::gpio::{ErasedPin, Output, PushPull};

pub struct OutputLine {
    pin: ErasedPin<Output<PushPull>>,
}

impl OutputLine {
    pub fn new(pin: ErasedPin<Output<PushPull>>) -> Self {
        Self { pin }
    }
}

impl ErrorType for OutputLine {
    type Error = Infallible;
}

impl OutputPin for OutputLine {
    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low();
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high();
        Ok(())
    }
}
