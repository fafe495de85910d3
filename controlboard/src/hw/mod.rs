pub mod can;
pub mod delay;
pub mod line;
pub mod pins;
pub mod pwm;
pub mod usart;

pub use can::CanBus;
pub use delay::CycleDelay;
pub use line::OutputLine;
pub use pins::BoardPins;
pub use pwm::{NarrowPwm, ServoPwm, ServoTimer};
pub use usart::Usart;
