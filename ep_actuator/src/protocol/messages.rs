// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tool and function vocabulary of the actuator board protocol.

// Tool tags (frame byte 0)
pub const TOOL_PING: u8 = b'P';
pub const TOOL_SERVO: u8 = b'A';
pub const TOOL_MOSFET: u8 = b'M';
pub const TOOL_RELAY: u8 = b'R';

// Function tags (frame byte 2)
pub const FUNC_PING: u8 = 0;
pub const FUNC_ANGLE: u8 = b'A';
pub const FUNC_SPEED: u8 = b'S';
pub const FUNC_STATUS: u8 = b'S';
pub const FUNC_CONDITION: u8 = b'C';

/// Device class targeted by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tool {
    Ping,
    Servo,
    Mosfet,
    Relay,
}

impl Tool {
    #[inline]
    pub fn tag(self) -> u8 {
        match self {
            Tool::Ping => TOOL_PING,
            Tool::Servo => TOOL_SERVO,
            Tool::Mosfet => TOOL_MOSFET,
            Tool::Relay => TOOL_RELAY,
        }
    }

    /// Look up a tool from its wire tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            TOOL_PING => Some(Tool::Ping),
            TOOL_SERVO => Some(Tool::Servo),
            TOOL_MOSFET => Some(Tool::Mosfet),
            TOOL_RELAY => Some(Tool::Relay),
            _ => None,
        }
    }

    /// Whether the actuator board accepts `function` for this tool.
    pub fn supports(self, function: Function) -> bool {
        matches!(
            (self, function),
            (Tool::Ping, Function::Ping)
                | (Tool::Servo, Function::Angle)
                | (Tool::Servo, Function::Speed)
                | (Tool::Servo, Function::Status)
                | (Tool::Mosfet, Function::Condition)
                | (Tool::Mosfet, Function::Status)
                | (Tool::Relay, Function::Condition)
                | (Tool::Relay, Function::Status)
        )
    }
}

/// Sub-operation requested for a tool.
///
/// `Speed` and `Status` share the `'S'` tag on the wire; the actuator board tells them apart by
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Function {
    Ping,
    Angle,
    Speed,
    Status,
    Condition,
}

impl Function {
    #[inline]
    pub fn tag(self) -> u8 {
        match self {
            Function::Ping => FUNC_PING,
            Function::Angle => FUNC_ANGLE,
            Function::Speed => FUNC_SPEED,
            Function::Status => FUNC_STATUS,
            Function::Condition => FUNC_CONDITION,
        }
    }
}

/// Field returned by a servo status query, named by its offset in the response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoField {
    Temperature = 0,
    Voltage = 1,
    Position = 2,
    Moving = 3,
}

impl ServoField {
    #[inline]
    pub fn offset(self) -> usize {
        self as usize
    }
}

/// Rejected before anything reaches the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// The tool has no such function.
    InvalidCombination { tool: Tool, function: Function },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_tags_round_trip() {
        for tool in [Tool::Ping, Tool::Servo, Tool::Mosfet, Tool::Relay] {
            assert_eq!(Tool::from_tag(tool.tag()), Some(tool));
        }
        assert_eq!(Tool::from_tag(b'Z'), None);
    }

    #[test]
    fn servo_accepts_motion_and_status_only() {
        assert!(Tool::Servo.supports(Function::Angle));
        assert!(Tool::Servo.supports(Function::Speed));
        assert!(Tool::Servo.supports(Function::Status));
        assert!(!Tool::Servo.supports(Function::Condition));
        assert!(!Tool::Servo.supports(Function::Ping));
    }

    #[test]
    fn switches_accept_condition_and_status_only() {
        for tool in [Tool::Mosfet, Tool::Relay] {
            assert!(tool.supports(Function::Condition));
            assert!(tool.supports(Function::Status));
            assert!(!tool.supports(Function::Angle));
            assert!(!tool.supports(Function::Speed));
        }
    }

    #[test]
    fn ping_only_pairs_with_ping() {
        assert!(Tool::Ping.supports(Function::Ping));
        assert!(!Tool::Ping.supports(Function::Status));
        assert!(!Tool::Mosfet.supports(Function::Ping));
    }

    #[test]
    fn speed_and_status_share_a_tag() {
        assert_eq!(Function::Speed.tag(), Function::Status.tag());
        assert_eq!(ServoField::Moving.offset(), 3);
    }
}
