#![cfg_attr(not(test), no_std)]

/// Resolution of the strap ADC conversion.
pub const ADC_BITS: u32 = 12;
/// Largest value a strap conversion can produce.
pub const ADC_MAX_READING: u16 = (1 << ADC_BITS) - 1;
/// Raw reading reported before any strap conversion has completed.
pub const NO_READING: u16 = 0xffff;

/// Conversion polls allowed before a strap acquisition is abandoned.
pub const DEFAULT_MAX_POLLS: u32 = 100_000;

/// Major revision reported by boards without a strap divider.
pub const BOARD_REVISION_MAJOR: u8 = 1;
/// Minor revision reported by boards without a strap divider.
pub const BOARD_REVISION_MINOR: u8 = 4;

/// Rate of the timer that drives `button_task`.
pub const BUTTON_TASK_HZ: u32 = 100;

#[cfg(target_arch = "arm")]
pub use stm32h7xx_hal as hal;

pub mod adc;
#[cfg(target_arch = "arm")]
pub mod board;
pub mod error;
pub mod hid;
pub mod identity;
pub mod logger;
pub mod revision;

pub use error::{Error, Result};
pub use identity::{BoardIdentity, DetectConfig, FixedIdentity, Identity, StrapDetector};
pub use revision::{Detection, RevisionCode};
