// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Controller Area Network (CAN) abstraction layer.
//!
//! - `CanBus` wraps a HAL `can::Can` instance in `bxcan::Can`.
//! - Implements [`ep_actuator::Bus`] so the actuator transport can run on it. Frames with a
//!   different standard ID than the one asked for are dropped.

use bxcan::{self, Data, Frame, Id, StandardId};
use ep_actuator::protocol::FRAME_CAPACITY;
use ep_actuator::Bus;
use stm32f7xx_hal::can as hal_can;

/// Error type for `CanBus` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum CanError {
    /// Receive FIFO overrun; at least one frame was lost.
    Overrun,
    /// Identifier does not fit in 11 bits.
    InvalidId(u16),
}

/// Wrapper around a bxcan CAN instance built from a HAL CAN peripheral.
pub struct CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance,
{
    can: bxcan::Can<hal_can::Can<I>>,
}

impl<I> CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance,
{
    /// Create and enable a bxcan instance from a HAL CAN peripheral.
    ///
    /// * `hal_can` – the HAL CAN wrapper
    /// * `btr` – value for the CAN_BTR register (bit timing).
    /// * `loopback` – enable internal loopback
    /// * `silent` – enable silent mode
    pub fn new(hal_can: hal_can::Can<I>, btr: u32, loopback: bool, silent: bool) -> Self {
        let can = bxcan::Can::builder(hal_can)
            .set_bit_timing(btr)
            .set_loopback(loopback)
            .set_silent(silent)
            .enable();

        Self { can }
    }

    /// Consume the wrapper and get back the underlying HAL CAN instance.
    pub fn free(self) -> hal_can::Can<I> {
        self.can.free()
    }
}

impl<I> Bus for CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance,
{
    type Error = CanError;

    fn try_send(&mut self, id: u16, frame: &[u8; FRAME_CAPACITY]) -> nb::Result<(), CanError> {
        let id = StandardId::new(id).ok_or(nb::Error::Other(CanError::InvalidId(id)))?;
        let data = Data::from(*frame);

        // WouldBlock: every TX mailbox holds a frame of equal or higher priority.
        let status = match self.can.transmit(&Frame::new_data(id, data)) {
            Ok(status) => status,
            Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(never)) => match never {},
        };

        if status.dequeued_frame().is_some() {
            defmt::debug!("lower-priority frame dropped from TX mailbox");
        }
        Ok(())
    }

    fn try_receive(&mut self, id: u16) -> nb::Result<[u8; FRAME_CAPACITY], CanError> {
        // Standard frames on our receive ID only; skip the rest so they cannot hide ours.
        let frame = loop {
            let frame = self
                .can
                .receive()
                .map_err(|e| e.map(|_| CanError::Overrun))?;

            match frame.id() {
                Id::Standard(sid) if sid.as_raw() == id => break frame,
                _ => defmt::trace!("skipping frame for another id"),
            }
        };

        let mut out = [0u8; FRAME_CAPACITY];
        if let Some(data) = frame.data() {
            let len = data.len().min(FRAME_CAPACITY);
            out[..len].copy_from_slice(&data[..len]);
        }
        Ok(out)
    }
}

/// Extra helpers for CAN instances that own filters (e.g., CAN1 on STM32F7).
impl<I> CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance + bxcan::FilterOwner,
{
    /// Configure CAN1 filter bank 0 to accept all frames on FIFO0.
    ///
    /// ID matching happens in software in `try_receive`.
    pub fn configure_accept_all_filters(&mut self) {
        let regs = unsafe { &*stm32f7xx_hal::pac::CAN1::ptr() };

        // Enter filter init mode
        regs.fmr.modify(|_, w| w.finit().set_bit());

        // Bank 0: 32-bit mask mode, FIFO0
        regs.fa1r.modify(|r, w| unsafe { w.bits(r.bits() & !1) });
        regs.fs1r.modify(|r, w| unsafe { w.bits(r.bits() | 1) });
        regs.fm1r.modify(|r, w| unsafe { w.bits(r.bits() & !1) });
        regs.ffa1r.modify(|r, w| unsafe { w.bits(r.bits() & !1) });

        // FR1/FR2 = 0 accepts everything
        regs.fb[0].fr1.write(|w| unsafe { w.bits(0) });
        regs.fb[0].fr2.write(|w| unsafe { w.bits(0) });

        // Activate bank 0
        regs.fa1r.modify(|r, w| unsafe { w.bits(r.bits() | 1) });

        // Leave filter init mode
        regs.fmr.modify(|_, w| w.finit().clear_bit());
    }
}
