// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Control board firmware.
//!
//! Brings up the CAN link to the actuator board, the servo outputs, the local mosfet module and
//! the serial link to the companion board, then follows the companion's mosfet line: whenever it
//! reports off the line is switched on, and whenever it reports on it is switched off again.

#![no_main]
#![no_std]

use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_halt as _;

use embedded_hal::delay::DelayNs;
use embedded_io::{Read, Write};
use hal::{
    can::Can,
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use ep_actuator::{
    ActuatorClient, ClientConfig, CompanionLink, ModuleStore, PwmConfig, ServoBank, Transport,
    TransportConfig,
};

mod config;
mod hw;
use hw::{BoardPins, CanBus, CycleDelay, NarrowPwm, ServoTimer, Usart};

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // Clocks (HSI, APB1 undivided)
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let mut apb1 = rcc.apb1;

    let mut delay = CycleDelay::new(clocks.sysclk().raw());

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOG);
    let _servo_pins = pins.servo;

    // CAN1 to the actuator board
    let can1 = Can::new(dp.CAN1, &mut apb1, (pins.can1.tx, pins.can1.rx));
    let mut can_bus = CanBus::new(can1, config::CAN_BTR, false, false);
    can_bus.configure_accept_all_filters();

    let transport_cfg =
        TransportConfig::default().with_ids(config::ACTUATOR_TX_ID, config::ACTUATOR_RX_ID);
    let transport = Transport::new(can_bus, delay, transport_cfg);
    let mut actuator = ActuatorClient::new(transport, ClientConfig::default());

    // USART1 to the companion board
    let usart_cfg = Config {
        baud_rate: config::COMPANION_BAUD.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART1, (pins.usart1.tx, pins.usart1.rx), &clocks, usart_cfg);
    let mut companion = CompanionLink::new(Usart::new(serial));

    // Servos
    let pwm_cfg = PwmConfig::default()
        .with_clock_hz(clocks.pclk1().raw())
        .with_prescaler(config::SERVO_PRESCALER)
        .with_pwm_freq_hz(config::SERVO_PWM_HZ);
    let wide = ServoTimer::tim3(dp.TIM3, pwm_cfg.prescaler, pwm_cfg.timer_top()).split();
    let narrow = NarrowPwm::tim4(dp.TIM4, config::NARROW_PRESCALER);
    let mut servos = ServoBank::new(wide, narrow);

    // Mosfet module, all lines off
    let mut module = ModuleStore::mosfet_module(pins.module.lines).unwrap();

    defmt::info!("control board up, waiting {=u32} ms", config::STARTUP_DELAY_MS);
    delay.delay_ms(config::STARTUP_DELAY_MS);

    match actuator.ping() {
        Ok(true) => defmt::info!("actuator board answered ping"),
        Ok(false) => defmt::warn!("actuator board rejected ping"),
        Err(e) => defmt::warn!("actuator ping failed: {}", e),
    }

    match servos.center_all() {
        Ok(()) => defmt::info!("servos centred"),
        Err(never) => match never {},
    }

    loop {
        wait_for(&mut companion, &mut delay, 0);
        switch(&mut companion, &mut module, true);
        delay.delay_ms(config::ON_HOLD_MS);

        wait_for(&mut companion, &mut delay, 1);
        switch(&mut companion, &mut module, false);
        delay.delay_ms(config::OFF_HOLD_MS);
    }
}

/// Poll the companion until its mosfet line reports `state`.
fn wait_for<S: Read + Write>(companion: &mut CompanionLink<S>, delay: &mut CycleDelay, state: u8)
where
    S::Error: defmt::Format,
{
    loop {
        match companion.get(config::COMPANION_KIND, config::COMPANION_ID) {
            Ok(value) if value == state => return,
            Ok(_) => {}
            Err(e) => defmt::warn!("companion read failed: {}", e),
        }
        delay.delay_ms(config::POLL_PERIOD_MS);
    }
}

/// Tell the companion to switch its line and mirror the state on the local module.
fn switch<S, P>(companion: &mut CompanionLink<S>, module: &mut ModuleStore<P>, on: bool)
where
    S: Read + Write,
    S::Error: defmt::Format,
    P: embedded_hal::digital::OutputPin,
    P::Error: defmt::Format,
{
    if let Err(e) = companion.send(config::COMPANION_KIND, config::COMPANION_ID, on as u8) {
        defmt::warn!("companion write failed: {}", e);
    }
    if let Err(e) = module.set_mosfet(config::COMPANION_ID, on) {
        defmt::warn!("mosfet {=u8} write failed: {}", config::COMPANION_ID, e);
    }
    defmt::info!("mosfet {=u8} -> {}", config::COMPANION_ID, on);
}
