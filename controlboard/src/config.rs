// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board-level constants.

/// Standard CAN ID commands go out on.
pub const ACTUATOR_TX_ID: u16 = 0x100;
/// Standard CAN ID the actuator board answers on.
pub const ACTUATOR_RX_ID: u16 = 0x101;

/// CAN_BTR for 500 kbit/s from a 16 MHz APB1 (prescaler 2, BS1 13 tq, BS2 2 tq, SJW 1 tq).
pub const CAN_BTR: u32 = 0x001C_0001;

pub const COMPANION_BAUD: u32 = 9_600;

pub const SERVO_PWM_HZ: u32 = 50;
pub const SERVO_PRESCALER: u16 = 8;
/// 16 MHz / 1024 / 256 ≈ 61 Hz on the 8-bit channel.
pub const NARROW_PRESCALER: u16 = 1024;

/// Give the companion and actuator boards time to boot.
pub const STARTUP_DELAY_MS: u32 = 3_000;
pub const ON_HOLD_MS: u32 = 1_000;
pub const OFF_HOLD_MS: u32 = 2_000;
/// Poll period while waiting for the companion to report a state.
pub const POLL_PERIOD_MS: u32 = 50;

/// Companion line mirrored onto the local mosfet module.
pub const COMPANION_KIND: u8 = b'M';
pub const COMPANION_ID: u8 = 1;
