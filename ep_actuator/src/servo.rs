// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hobby servo outputs driven straight from PWM compare registers.
//!
//! Three channels share one 16-bit timer whose top value is derived from the PWM frequency; a
//! fourth channel sits on an 8-bit range and has coarser resolution.
//!
//! Angles are accepted in `[0.0, 180.0]` degrees. Anything else (NaN included) is ignored and the
//! channel keeps its previous duty.

use embedded_hal::pwm::SetDutyCycle;
#[allow(unused_imports)]
use micromath::F32Ext;

/// Largest commandable angle in degrees.
pub const MAX_ANGLE_DEG: f32 = 180.0;

/// Top value of the 8-bit channel.
pub const NARROW_TOP: u16 = 255;

/// Timer setup the servo frequency is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    /// Timer input clock.
    pub clock_hz: u32,
    pub prescaler: u16,
    /// Servo frame rate, typically 50 Hz.
    pub pwm_freq_hz: u32,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            clock_hz: 16_000_000,
            prescaler: 8,
            pwm_freq_hz: 50,
        }
    }
}

impl PwmConfig {
    pub fn with_clock_hz(mut self, clock_hz: u32) -> Self {
        self.clock_hz = clock_hz;
        self
    }

    pub fn with_prescaler(mut self, prescaler: u16) -> Self {
        self.prescaler = prescaler;
        self
    }

    pub fn with_pwm_freq_hz(mut self, pwm_freq_hz: u32) -> Self {
        self.pwm_freq_hz = pwm_freq_hz;
        self
    }

    /// `round(clock_hz / (prescaler * pwm_freq_hz))`, saturated to 16 bits.
    pub fn timer_top(&self) -> u16 {
        let div = u64::from(self.prescaler) * u64::from(self.pwm_freq_hz);
        if div == 0 {
            return u16::MAX;
        }

        let top = (u64::from(self.clock_hz) + div / 2) / div;
        top.min(u64::from(u16::MAX)) as u16
    }
}

/// Servo output selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoChannel {
    One,
    Two,
    Three,
    /// The 8-bit channel.
    Four,
}

#[inline]
pub fn angle_in_range(angle: f32) -> bool {
    (0.0..=MAX_ANGLE_DEG).contains(&angle)
}

/// Map 0..=180 degrees onto the full signed 16-bit range.
#[inline]
fn range_conv(angle: f32) -> i16 {
    (65535.0 * angle / MAX_ANGLE_DEG - 32768.0) as i16
}

/// Duty for one of the shared-timer channels: 0 at 0°, `timer_top` at 180°.
pub fn wide_duty(angle: f32, timer_top: u16) -> u16 {
    let raw = range_conv(angle);
    let fraction = (f32::from(raw) + 32768.0) / 65535.0;
    let top = f32::from(timer_top);

    (top * fraction).round().min(top) as u16
}

/// Duty for the 8-bit channel, truncated rather than rounded.
#[inline]
pub fn narrow_duty(angle: f32) -> u8 {
    (255.0 * angle / MAX_ANGLE_DEG).floor() as u8
}

/// The four servo outputs of the control board.
///
/// `W` drives the three shared-timer channels, and its `max_duty_cycle()` is taken as the timer
/// top. `N` drives the 8-bit channel.
pub struct ServoBank<W, N> {
    wide: [W; 3],
    narrow: N,
}

impl<W, N> ServoBank<W, N>
where
    W: SetDutyCycle,
    N: SetDutyCycle<Error = W::Error>,
{
    pub fn new(wide: [W; 3], narrow: N) -> Self {
        Self { wide, narrow }
    }

    /// Tear down the bank and return its channels.
    pub fn free(self) -> ([W; 3], N) {
        (self.wide, self.narrow)
    }

    /// Move the servo on `channel` to `angle` degrees.
    ///
    /// Out-of-range angles are dropped without touching the output.
    pub fn set_angle(&mut self, channel: ServoChannel, angle: f32) -> Result<(), W::Error> {
        if !angle_in_range(angle) {
            debug!("servo {} angle {} out of range, ignored", channel, angle);
            return Ok(());
        }

        let wide = match channel {
            ServoChannel::One => &mut self.wide[0],
            ServoChannel::Two => &mut self.wide[1],
            ServoChannel::Three => &mut self.wide[2],
            ServoChannel::Four => {
                let duty = narrow_duty(angle);
                trace!("servo 4 duty {=u8}", duty);
                return self.narrow.set_duty_cycle(u16::from(duty));
            }
        };

        let duty = wide_duty(angle, wide.max_duty_cycle());
        trace!("servo {} duty {=u16}", channel, duty);
        wide.set_duty_cycle(duty)
    }

    /// Put every servo at mid travel.
    pub fn center_all(&mut self) -> Result<(), W::Error> {
        for channel in [
            ServoChannel::One,
            ServoChannel::Two,
            ServoChannel::Three,
            ServoChannel::Four,
        ] {
            self.set_angle(channel, MAX_ANGLE_DEG / 2.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;

    struct StubChannel {
        top: u16,
        duty: Option<u16>,
        writes: usize,
    }

    impl StubChannel {
        fn new(top: u16) -> Self {
            Self {
                top,
                duty: None,
                writes: 0,
            }
        }
    }

    impl ErrorType for StubChannel {
        type Error = Infallible;
    }

    impl SetDutyCycle for StubChannel {
        fn max_duty_cycle(&self) -> u16 {
            self.top
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = Some(duty);
            self.writes += 1;
            Ok(())
        }
    }

    fn bank(top: u16) -> ServoBank<StubChannel, StubChannel> {
        ServoBank::new(
            [
                StubChannel::new(top),
                StubChannel::new(top),
                StubChannel::new(top),
            ],
            StubChannel::new(NARROW_TOP),
        )
    }

    #[test]
    fn timer_top_from_clock() {
        assert_eq!(PwmConfig::default().timer_top(), 40_000);
        let cfg = PwmConfig::default()
            .with_clock_hz(1_000_000)
            .with_prescaler(3)
            .with_pwm_freq_hz(50);
        // 6666.67 rounds up
        assert_eq!(cfg.timer_top(), 6667);
        assert_eq!(cfg.with_clock_hz(u32::MAX).with_prescaler(1).timer_top(), u16::MAX);
        assert_eq!(cfg.with_pwm_freq_hz(0).timer_top(), u16::MAX);
    }

    #[test]
    fn wide_duty_end_points() {
        assert_eq!(wide_duty(0.0, 20_000), 0);
        assert_eq!(wide_duty(180.0, 20_000), 20_000);
        assert_eq!(wide_duty(180.0, 40_000), 40_000);
    }

    #[test]
    fn wide_duty_midpoint() {
        let duty = wide_duty(90.0, 20_000);
        assert!((9_999..=10_001).contains(&duty), "duty = {duty}");
    }

    #[test]
    fn narrow_duty_truncates() {
        assert_eq!(narrow_duty(0.0), 0);
        assert_eq!(narrow_duty(90.0), 127);
        assert_eq!(narrow_duty(180.0), 255);
    }

    #[test]
    fn set_angle_addresses_single_channel() {
        let mut bank = bank(20_000);
        bank.set_angle(ServoChannel::Two, 180.0).unwrap();

        let ([one, two, three], four) = bank.free();
        assert_eq!(one.duty, None);
        assert_eq!(two.duty, Some(20_000));
        assert_eq!(three.duty, None);
        assert_eq!(four.duty, None);
    }

    #[test]
    fn fourth_channel_uses_eight_bit_range() {
        let mut bank = bank(20_000);
        bank.set_angle(ServoChannel::Four, 90.0).unwrap();

        let (_, four) = bank.free();
        assert_eq!(four.duty, Some(127));
    }

    #[test]
    fn out_of_range_angles_leave_duty_unchanged() {
        let mut bank = bank(20_000);
        bank.set_angle(ServoChannel::One, 45.0).unwrap();
        bank.set_angle(ServoChannel::Four, 45.0).unwrap();

        for angle in [-0.1, 180.1, -90.0, 1000.0, f32::NAN] {
            bank.set_angle(ServoChannel::One, angle).unwrap();
            bank.set_angle(ServoChannel::Four, angle).unwrap();
        }

        let ([one, _, _], four) = bank.free();
        assert_eq!(one.writes, 1);
        assert_eq!(one.duty, Some(wide_duty(45.0, 20_000)));
        assert_eq!(four.writes, 1);
        assert_eq!(four.duty, Some(u16::from(narrow_duty(45.0))));
    }

    #[test]
    fn same_angle_is_idempotent() {
        let mut bank = bank(40_000);
        bank.set_angle(ServoChannel::Three, 33.3).unwrap();
        bank.set_angle(ServoChannel::Three, 33.3).unwrap();

        let ([_, _, three], _) = bank.free();
        assert_eq!(three.writes, 2);
        assert_eq!(three.duty, Some(wide_duty(33.3, 40_000)));
    }

    #[test]
    fn center_all_drives_every_channel() {
        let mut bank = bank(40_000);
        bank.center_all().unwrap();

        let (wide, four) = bank.free();
        for ch in wide {
            let duty = ch.duty.unwrap();
            assert!((19_999..=20_001).contains(&duty));
        }
        assert_eq!(four.duty, Some(127));
    }
}
