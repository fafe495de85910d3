// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed-layout frames exchanged with the actuator board.
//!
//! Outbound layout (8-byte buffer, 5 bytes used):
//!
//! | Byte | Field |
//! | ---- | ----- |
//! | 0 | tool tag |
//! | 1 | tool instance id |
//! | 2 | function tag |
//! | 3 | value, high byte |
//! | 4 | value, low byte |

use crate::protocol::messages::*;

/// Bus buffer capacity in bytes. Matches one CAN data frame.
pub const FRAME_CAPACITY: usize = 8;

/// Split a signed 16-bit value into its big-endian `[hi, lo]` bytes.
#[inline]
pub fn split_value(value: i16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Inverse of [`split_value`].
#[inline]
pub fn join_value(hi: u8, lo: u8) -> i16 {
    i16::from_be_bytes([hi, lo])
}

/// One outbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame {
    tool: Tool,
    tool_id: u8,
    function: Function,
    value: i16,
}

impl CommandFrame {
    /// Build a command, rejecting function tags the tool does not support.
    ///
    /// `tool_id` and `value` are passed through untouched.
    pub fn new(
        tool: Tool,
        tool_id: u8,
        function: Function,
        value: i16,
    ) -> Result<Self, ProtocolError> {
        if !tool.supports(function) {
            return Err(ProtocolError::InvalidCombination { tool, function });
        }

        Ok(Self {
            tool,
            tool_id,
            function,
            value,
        })
    }

    /// The liveness probe: `['P', 0, 0, 0, 0]`.
    #[inline]
    pub fn ping() -> Self {
        Self {
            tool: Tool::Ping,
            tool_id: 0,
            function: Function::Ping,
            value: 0,
        }
    }

    #[inline]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[inline]
    pub fn tool_id(&self) -> u8 {
        self.tool_id
    }

    #[inline]
    pub fn function(&self) -> Function {
        self.function
    }

    #[inline]
    pub fn value(&self) -> i16 {
        self.value
    }

    /// Encode into a fresh bus buffer. Unused trailing bytes are zero.
    pub fn to_bytes(&self) -> [u8; FRAME_CAPACITY] {
        let [hi, lo] = split_value(self.value);

        let mut buf = [0u8; FRAME_CAPACITY];
        buf[0] = self.tool.tag();
        buf[1] = self.tool_id;
        buf[2] = self.function.tag();
        buf[3] = hi;
        buf[4] = lo;
        buf
    }
}

/// One inbound response. Byte meaning depends on the request's function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseFrame {
    bytes: [u8; FRAME_CAPACITY],
}

impl ResponseFrame {
    #[inline]
    pub fn from_bytes(bytes: [u8; FRAME_CAPACITY]) -> Self {
        Self { bytes }
    }

    /// Success/echo slot (byte 0).
    #[inline]
    pub fn status(&self) -> u8 {
        self.bytes[0]
    }

    /// Byte at `index`, or `None` past the end of the buffer.
    #[inline]
    pub fn byte(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Servo status field selected by `field`.
    #[inline]
    pub fn field(&self, field: ServoField) -> u8 {
        self.bytes[field.offset()]
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; FRAME_CAPACITY] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_servo_angle_layout() {
        let frame = CommandFrame::new(Tool::Servo, 3, Function::Angle, 0x0102).unwrap();
        assert_eq!(frame.to_bytes(), [b'A', 3, b'A', 0x01, 0x02, 0, 0, 0]);
    }

    #[test]
    fn encodes_negative_value_big_endian() {
        let frame = CommandFrame::new(Tool::Servo, 1, Function::Speed, -2).unwrap();
        let bytes = frame.to_bytes();
        assert_eq!(&bytes[3..5], &[0xFF, 0xFE]);
    }

    #[test]
    fn ping_frame_is_all_zero_after_tag() {
        assert_eq!(CommandFrame::ping().to_bytes(), [b'P', 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn value_bytes_join_back() {
        for value in i16::MIN..=i16::MAX {
            let frame = CommandFrame::new(Tool::Relay, 1, Function::Condition, value).unwrap();
            let bytes = frame.to_bytes();
            assert_eq!(join_value(bytes[3], bytes[4]), value);
        }
    }

    #[test]
    fn rejects_unsupported_function() {
        let err = CommandFrame::new(Tool::Mosfet, 1, Function::Angle, 0).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidCombination {
                tool: Tool::Mosfet,
                function: Function::Angle,
            }
        );
    }

    #[test]
    fn response_accessors() {
        let resp = ResponseFrame::from_bytes([1, 40, 12, 90, 0, 0, 0, 7]);
        assert_eq!(resp.status(), 1);
        assert_eq!(resp.field(ServoField::Temperature), 1);
        assert_eq!(resp.field(ServoField::Voltage), 40);
        assert_eq!(resp.field(ServoField::Position), 12);
        assert_eq!(resp.field(ServoField::Moving), 90);
        assert_eq!(resp.byte(7), Some(7));
        assert_eq!(resp.byte(8), None);
    }
}
