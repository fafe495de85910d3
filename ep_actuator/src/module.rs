// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Local power module (EP_Module) outputs and their last-commanded state.
//!
//! The module is fitted in one of two versions: three mosfet channels or a single relay. Lines
//! are driven directly from GPIO; nothing here talks to the actuator board, and the records are
//! never reconciled with what the actuator board reports.

use embedded_hal::digital::{OutputPin, PinState};

/// Number of mosfet channels on the mosfet module.
pub const MOSFET_COUNT: usize = 3;

/// Id of the single relay.
pub const RELAY_ID: u8 = 1;

/// Fitted module version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleVariant {
    Mosfet,
    Relay,
}

/// Error type for `ModuleStore` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleError<E> {
    /// Mosfet ids run from 1 to 3.
    InvalidId(u8),
    /// The line belongs to the module version that is not fitted.
    NotFitted,
    /// GPIO write failed. The record is left unchanged.
    Pin(E),
}

/// One output line and the flag last written to it.
struct ModuleLine<P> {
    id: u8,
    on: bool,
    pin: Option<P>,
}

impl<P: OutputPin> ModuleLine<P> {
    fn fitted(id: u8, mut pin: P) -> Result<Self, ModuleError<P::Error>> {
        pin.set_low().map_err(ModuleError::Pin)?;
        Ok(Self {
            id,
            on: false,
            pin: Some(pin),
        })
    }

    fn empty(id: u8) -> Self {
        Self {
            id,
            on: false,
            pin: None,
        }
    }

    fn set(&mut self, on: bool) -> Result<(), ModuleError<P::Error>> {
        let pin = self.pin.as_mut().ok_or(ModuleError::NotFitted)?;
        pin.set_state(PinState::from(on))
            .map_err(ModuleError::Pin)?;
        self.on = on;
        Ok(())
    }
}

/// Relay and mosfet records with the lines they drive.
pub struct ModuleStore<P> {
    variant: ModuleVariant,
    relay: ModuleLine<P>,
    mosfets: [ModuleLine<P>; MOSFET_COUNT],
}

impl<P: OutputPin> ModuleStore<P> {
    /// Mosfet module on three lines, all switched off.
    pub fn mosfet_module(pins: [P; MOSFET_COUNT]) -> Result<Self, ModuleError<P::Error>> {
        let [p1, p2, p3] = pins;

        Ok(Self {
            variant: ModuleVariant::Mosfet,
            relay: ModuleLine::empty(RELAY_ID),
            mosfets: [
                ModuleLine::fitted(1, p1)?,
                ModuleLine::fitted(2, p2)?,
                ModuleLine::fitted(3, p3)?,
            ],
        })
    }

    /// Relay module on a single line, switched off.
    pub fn relay_module(pin: P) -> Result<Self, ModuleError<P::Error>> {
        Ok(Self {
            variant: ModuleVariant::Relay,
            relay: ModuleLine::fitted(RELAY_ID, pin)?,
            mosfets: [
                ModuleLine::empty(1),
                ModuleLine::empty(2),
                ModuleLine::empty(3),
            ],
        })
    }

    #[inline]
    pub fn variant(&self) -> ModuleVariant {
        self.variant
    }

    /// Drive the relay line and record the new state.
    pub fn set_relay(&mut self, on: bool) -> Result<(), ModuleError<P::Error>> {
        self.relay.set(on)?;
        debug!("relay {=u8} -> {=bool}", self.relay.id, on);
        Ok(())
    }

    /// Last state written to the relay.
    #[inline]
    pub fn read_relay(&self) -> bool {
        self.relay.on
    }

    /// Drive mosfet `id` (1-based) and record the new state.
    pub fn set_mosfet(&mut self, id: u8, on: bool) -> Result<(), ModuleError<P::Error>> {
        let line = self.mosfet_mut(id)?;
        line.set(on)?;
        debug!("mosfet {=u8} -> {=bool}", line.id, on);
        Ok(())
    }

    /// Last state written to mosfet `id` (1-based).
    pub fn read_mosfet(&self, id: u8) -> Result<bool, ModuleError<P::Error>> {
        let index = Self::index(id)?;
        Ok(self.mosfets[index].on)
    }

    fn mosfet_mut(&mut self, id: u8) -> Result<&mut ModuleLine<P>, ModuleError<P::Error>> {
        let index = Self::index(id)?;
        Ok(&mut self.mosfets[index])
    }

    fn index(id: u8) -> Result<usize, ModuleError<P::Error>> {
        match id {
            1..=3 => Ok(usize::from(id - 1)),
            _ => Err(ModuleError::InvalidId(id)),
        }
    }
}
