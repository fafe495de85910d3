// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! High-level commands for the actuator board.
//!
//! Every operation is one blocking round trip: build a [`CommandFrame`], hand it to the
//! [`Transport`], and interpret the [`ResponseFrame`].

use embedded_hal::delay::DelayNs;

use crate::error::Error;
use crate::protocol::messages::TOOL_PING;
use crate::protocol::{CommandFrame, Function, ResponseFrame, ServoField, Tool};
use crate::transport::{Bus, Transport};

/// Client settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClientConfig {
    /// Byte 0 value the board answers with when it accepted an actuation command.
    pub success_code: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { success_code: 1 }
    }
}

impl ClientConfig {
    pub fn with_success_code(mut self, code: u8) -> Self {
        self.success_code = code;
        self
    }
}

/// Command set of the actuator board: servos, mosfets, relays.
pub struct ActuatorClient<B, D> {
    transport: Transport<B, D>,
    config: ClientConfig,
}

impl<B, D> ActuatorClient<B, D>
where
    B: Bus,
    D: DelayNs,
{
    pub fn new(transport: Transport<B, D>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Access the underlying transport.
    #[inline]
    pub fn transport_mut(&mut self) -> &mut Transport<B, D> {
        &mut self.transport
    }

    pub fn free(self) -> Transport<B, D> {
        self.transport
    }

    /// Check that the actuator board is alive. It echoes `'P'` in byte 0.
    pub fn ping(&mut self) -> Result<bool, Error<B::Error>> {
        let resp = self.transport.roundtrip(CommandFrame::ping())?;
        Ok(resp.status() == TOOL_PING)
    }

    /// Send a goal position to servo `id`.
    pub fn set_servo_angle(&mut self, id: u8, angle: u16) -> Result<(), Error<B::Error>> {
        self.actuate(Tool::Servo, id, Function::Angle, angle as i16)
    }

    /// Send a goal speed to servo `id`.
    pub fn set_servo_speed(&mut self, id: u8, speed: u16) -> Result<(), Error<B::Error>> {
        self.actuate(Tool::Servo, id, Function::Speed, speed as i16)
    }

    /// Read one status field of servo `id`.
    pub fn get_servo_status(&mut self, id: u8, field: ServoField) -> Result<u8, Error<B::Error>> {
        let resp = self.request(Tool::Servo, id, Function::Status, 0)?;
        Ok(resp.field(field))
    }

    /// Switch mosfet `id` (1-based) on the actuator board.
    pub fn set_mosfet(&mut self, id: u8, on: bool) -> Result<(), Error<B::Error>> {
        self.actuate(Tool::Mosfet, id, Function::Condition, i16::from(on))
    }

    /// Condition of mosfet `id` as reported by the board.
    pub fn get_mosfet_status(&mut self, id: u8) -> Result<u8, Error<B::Error>> {
        let resp = self.request(Tool::Mosfet, id, Function::Status, 0)?;
        Ok(resp.status())
    }

    /// Switch relay `id` (1-based) on the actuator board.
    pub fn set_relay(&mut self, id: u8, on: bool) -> Result<(), Error<B::Error>> {
        self.actuate(Tool::Relay, id, Function::Condition, i16::from(on))
    }

    /// Condition of relay `id` as reported by the board.
    pub fn get_relay_status(&mut self, id: u8) -> Result<u8, Error<B::Error>> {
        let resp = self.request(Tool::Relay, id, Function::Status, 0)?;
        Ok(resp.status())
    }

    fn request(
        &mut self,
        tool: Tool,
        id: u8,
        function: Function,
        value: i16,
    ) -> Result<ResponseFrame, Error<B::Error>> {
        let frame = CommandFrame::new(tool, id, function, value)?;
        self.transport.roundtrip(frame)
    }

    fn actuate(
        &mut self,
        tool: Tool,
        id: u8,
        function: Function,
        value: i16,
    ) -> Result<(), Error<B::Error>> {
        let status = self.request(tool, id, function, value)?.status();

        if status != self.config.success_code {
            warn!("{} {=u8} {} rejected: {=u8:#x}", tool, id, function, status);
            return Err(Error::RemoteRejected(status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FRAME_CAPACITY;
    use crate::transport::tests::{StubBus, StubBusError, StubDelay};
    use crate::transport::TransportConfig;

    fn client(reply: [u8; FRAME_CAPACITY]) -> ActuatorClient<StubBus, StubDelay> {
        let transport = Transport::new(
            StubBus::replying(reply),
            StubDelay::default(),
            TransportConfig::default(),
        );
        ActuatorClient::new(transport, ClientConfig::default())
    }

    fn sent(client: ActuatorClient<StubBus, StubDelay>) -> [u8; FRAME_CAPACITY] {
        let (bus, _) = client.free().free();
        assert_eq!(bus.sent.len(), 1);
        bus.sent[0].1
    }

    #[test]
    fn ping_true_on_echo() {
        let mut c = client([b'P', 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(c.ping(), Ok(true));
        assert_eq!(sent(c), [b'P', 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn ping_false_on_anything_else() {
        for byte in [0, 1, b'A', b'p', 0xFF] {
            let mut c = client([byte, 0, 0, 0, 0, 0, 0, 0]);
            assert_eq!(c.ping(), Ok(false));
        }
    }

    #[test]
    fn servo_angle_frame() {
        let mut c = client([1; FRAME_CAPACITY]);
        c.set_servo_angle(4, 300).unwrap();
        assert_eq!(sent(c), [b'A', 4, b'A', 0x01, 0x2C, 0, 0, 0]);
    }

    #[test]
    fn servo_speed_keeps_full_16_bits() {
        let mut c = client([1; FRAME_CAPACITY]);
        c.set_servo_speed(2, 0xFFFE).unwrap();
        assert_eq!(sent(c), [b'A', 2, b'S', 0xFF, 0xFE, 0, 0, 0]);
    }

    #[test]
    fn rejected_actuation_carries_raw_byte() {
        let mut c = client([0x7E, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(c.set_servo_angle(1, 90), Err(Error::RemoteRejected(0x7E)));
    }

    #[test]
    fn custom_success_code() {
        let transport = Transport::new(
            StubBus::replying([b'K', 0, 0, 0, 0, 0, 0, 0]),
            StubDelay::default(),
            TransportConfig::default(),
        );
        let mut c = ActuatorClient::new(transport, ClientConfig::default().with_success_code(b'K'));
        assert_eq!(c.set_relay(1, true), Ok(()));
    }

    #[test]
    fn servo_status_selects_field() {
        let reply = [35, 120, 77, 1, 0, 0, 0, 0];
        let fields = [
            (ServoField::Temperature, 35),
            (ServoField::Voltage, 120),
            (ServoField::Position, 77),
            (ServoField::Moving, 1),
        ];
        for (field, expected) in fields {
            let mut c = client(reply);
            assert_eq!(c.get_servo_status(9, field), Ok(expected));
            assert_eq!(sent(c), [b'A', 9, b'S', 0, 0, 0, 0, 0]);
        }
    }

    #[test]
    fn mosfet_frames() {
        let mut c = client([1; FRAME_CAPACITY]);
        c.set_mosfet(2, true).unwrap();
        assert_eq!(sent(c), [b'M', 2, b'C', 0, 1, 0, 0, 0]);

        let mut c = client([0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(c.get_mosfet_status(3), Ok(0));
        assert_eq!(sent(c), [b'M', 3, b'S', 0, 0, 0, 0, 0]);
    }

    #[test]
    fn relay_frames() {
        let mut c = client([1; FRAME_CAPACITY]);
        c.set_relay(1, false).unwrap();
        assert_eq!(sent(c), [b'R', 1, b'C', 0, 0, 0, 0, 0]);

        let mut c = client([1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(c.get_relay_status(1), Ok(1));
        assert_eq!(sent(c), [b'R', 1, b'S', 0, 0, 0, 0, 0]);
    }

    #[test]
    fn transport_errors_pass_through() {
        let transport = Transport::new(
            StubBus {
                fail_send: true,
                ..StubBus::default()
            },
            StubDelay::default(),
            TransportConfig::default(),
        );
        let mut c = ActuatorClient::new(transport, ClientConfig::default());
        assert_eq!(c.get_relay_status(1), Err(Error::Bus(StubBusError)));
    }
}
