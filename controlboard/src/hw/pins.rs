// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 control board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, Alternate},
    pac,
    prelude::*,
};

use super::OutputLine;

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOG);
/// ```
pub struct BoardPins {
    pub usart1: Usart1Pins,
    pub can1: Can1Pins,
    pub servo: ServoPins,
    pub module: ModulePins,
}

/// Companion board serial link
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// CAN1 bus pins
pub struct Can1Pins {
    pub tx: gpioa::PA12<Alternate<9>>,
    pub rx: gpioa::PA11<Alternate<9>>,
}

/// Servo PWM outputs
pub struct ServoPins {
    pub s1: gpioa::PA6<Alternate<2>>, // TIM3_CH1
    pub s2: gpioa::PA7<Alternate<2>>, // TIM3_CH2
    pub s3: gpiob::PB0<Alternate<2>>, // TIM3_CH3
    pub s4: gpiod::PD12<Alternate<2>>, // TIM4_CH1 (8-bit)
}

/// Mosfet/relay driver lines. A relay module only wires `lines[0]`.
pub struct ModulePins {
    pub lines: [OutputLine; 3],
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD, gpiog: pac::GPIOG) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();
        let gpiog = gpiog.split();

        Self {
            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            can1: Can1Pins {
                tx: gpioa.pa12.into_alternate::<9>(),
                rx: gpioa.pa11.into_alternate::<9>().internal_pull_up(true),
            },

            servo: ServoPins {
                s1: gpioa.pa6.into_alternate::<2>(),
                s2: gpioa.pa7.into_alternate::<2>(),
                s3: gpiob.pb0.into_alternate::<2>(),
                s4: gpiod.pd12.into_alternate::<2>(),
            },

            // Start low so no load switches on at reset
            module: ModulePins {
                lines: [
                    OutputLine::new(gpiog.pg0.into_push_pull_output().erase()),
                    OutputLine::new(gpiog.pg1.into_push_pull_output().erase()),
                    OutputLine::new(gpiog.pg2.into_push_pull_output().erase()),
                ],
            },
        }
    }
}
