//! Errors raised while acquiring the strap reading.
use thiserror_no_std::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The ADC never reported a finished conversion.
    #[error("strap conversion did not complete after {polls} polls")]
    Timeout { polls: u32 },
    /// The ADC reported a conversion failure.
    #[error("strap conversion failed")]
    Adc,
    /// The conversion produced more than 12 bits.
    #[error("strap reading {reading} exceeds the 12-bit range")]
    OutOfRange { reading: u32 },
}
