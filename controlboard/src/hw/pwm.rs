// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Servo PWM outputs via STM32F7 general-purpose timers in PWM mode 1.
//!
//! - TIM3 CH1..CH3 share one auto-reload (`timer_top`) and drive servos 1 to 3.
//! - TIM4 CH1 runs with an auto-reload of 255 and drives the 8-bit servo 4.
//!
//! Channels implement `embedded_hal::pwm::SetDutyCycle` with `max_duty_cycle()` equal to the
//! timer's auto-reload value.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use ep_actuator::servo::NARROW_TOP;
use stm32f7xx_hal::pac;

// CCMRx: OCxM = 0b110 (PWM mode 1), OCxPE = 1 (preload), for the low and high channel of the pair.
const CCMR_PWM1_LO: u32 = 0x0068;
const CCMR_PWM1_HI: u32 = 0x6800;

/// Stop `$tim`, program prescaler and auto-reload, then restart it.
macro_rules! start_timer {
    ($tim:expr, $prescaler:expr, $top:expr) => {{
        let tim = $tim;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // PSC divides by (PSC + 1)
        tim.psc
            .write(|w| unsafe { w.bits(u32::from($prescaler.saturating_sub(1))) });
        tim.arr.write(|w| unsafe { w.bits(u32::from($top)) });
        tim.cnt.write(|w| unsafe { w.bits(0) });

        // Latch PSC/ARR
        tim.egr.write(|w| unsafe { w.bits(1) });

        // Auto-reload preload + enable
        tim.cr1.modify(|_, w| w.arpe().set_bit().cen().set_bit());
    }};
}

/// TIM3 configured for three servo outputs.
pub struct ServoTimer {
    tim: pac::TIM3,
    top: u16,
}

impl ServoTimer {
    /// Configure TIM3 with `prescaler` and `timer_top`, outputs CH1..CH3 at 0 % duty.
    pub fn tim3(tim3: pac::TIM3, prescaler: u16, timer_top: u16) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());

        let tim = tim3;

        tim.ccmr1_output()
            .write(|w| unsafe { w.bits(CCMR_PWM1_LO | CCMR_PWM1_HI) });
        tim.ccmr2_output().write(|w| unsafe { w.bits(CCMR_PWM1_LO) });

        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });
        tim.ccr3.write(|w| unsafe { w.bits(0) });

        // CC1E | CC2E | CC3E, active high
        tim.ccer.modify(|r, w| unsafe { w.bits(r.bits() | 0x0111) });

        start_timer!(&tim, prescaler, timer_top);

        Self {
            tim,
            top: timer_top,
        }
    }

    /// Split into the three channel handles. TIM3 stays running.
    pub fn split(self) -> [ServoPwm; 3] {
        let ServoTimer { tim: _, top } = self;
        [
            ServoPwm { channel: 1, top },
            ServoPwm { channel: 2, top },
            ServoPwm { channel: 3, top },
        ]
    }
}

/// One TIM3 compare channel.
pub struct ServoPwm {
    channel: u8,
    top: u16,
}

impl ErrorType for ServoPwm {
    type Error = Infallible;
}

impl SetDutyCycle for ServoPwm {
    #[inline]
    fn max_duty_cycle(&self) -> u16 {
        self.top
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        // Each handle only touches its own CCR register.
        let tim = unsafe { &*pac::TIM3::ptr() };
        let duty = u32::from(duty.min(self.top));

        match self.channel {
            1 => tim.ccr1.write(|w| unsafe { w.bits(duty) }),
            2 => tim.ccr2.write(|w| unsafe { w.bits(duty) }),
            _ => tim.ccr3.write(|w| unsafe { w.bits(duty) }),
        }
        Ok(())
    }
}

/// TIM4 CH1 with an 8-bit range.
pub struct NarrowPwm {
    tim: pac::TIM4,
}

impl NarrowPwm {
    /// Configure TIM4 CH1 with auto-reload 255 and 0 % duty.
    pub fn tim4(tim4: pac::TIM4, prescaler: u16) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

        let tim = tim4;

        tim.ccmr1_output().write(|w| unsafe { w.bits(CCMR_PWM1_LO) });
        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccer.modify(|r, w| unsafe { w.bits(r.bits() | 0x0001) });

        start_timer!(&tim, prescaler, NARROW_TOP);

        Self { tim }
    }
}

impl ErrorType for NarrowPwm {
    type Error = Infallible;
}

impl SetDutyCycle for NarrowPwm {
    #[inline]
    fn max_duty_cycle(&self) -> u16 {
        NARROW_TOP
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = u32::from(duty.min(NARROW_TOP));
        self.tim.ccr1.write(|w| unsafe { w.bits(duty) });
        Ok(())
    }
}
