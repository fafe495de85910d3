// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # EP Actuator
//!
//! Board-independent half of the control board firmware: everything needed to command the
//! actuator board over the shared bus and to drive the local servo and power-module outputs.
//! Hardware is reached only through `embedded-hal`/`embedded-io` traits and the [`Bus`] trait, so
//! the crate builds and tests on the host.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`protocol`] | Tool/function vocabulary and fixed-layout frames |
//! | [`transport`] | Send-with-retry and response read over the bus |
//! | [`client`] | Ping, servo, mosfet and relay commands |
//! | [`servo`] | Angle to PWM duty mapping for the local servo outputs |
//! | [`module`] | Local relay/mosfet module state |
//! | [`link`] | 4-byte serial protocol to the companion controller |
//!
//! ## Features
//!
//! - `defmt` – log through `defmt` and derive `defmt::Format` on public types.
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod client;
pub mod error;
pub mod link;
pub mod module;
pub mod protocol;
pub mod servo;
pub mod transport;

pub use client::{ActuatorClient, ClientConfig};
pub use error::Error;
pub use link::{CompanionLink, LinkError};
pub use module::{ModuleError, ModuleStore, ModuleVariant};
pub use protocol::{CommandFrame, Function, ResponseFrame, ServoField, Tool};
pub use servo::{PwmConfig, ServoBank, ServoChannel};
pub use transport::{Bus, RetryPolicy, Transport, TransportConfig};
