// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Command/response protocol spoken with the actuator board.

pub mod frame;
pub mod messages;

pub use frame::{join_value, split_value, CommandFrame, ResponseFrame, FRAME_CAPACITY};
pub use messages::{Function, ProtocolError, ServoField, Tool};
