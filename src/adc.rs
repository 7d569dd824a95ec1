//! One-shot acquisition of the strap voltage.
//!
//! The strap is read once at boot. A conversion is started once and its
//! end-of-conversion flag polled, either until the ADC answers or until a
//! poll budget is spent.
//!
//! HAL `OneShot` implementations usually block internally until the result
//! is ready, which defeats the poll budget. Those ADCs go through
//! [`StrapConversion`] and [`ConversionSampler`]; [`OneShotSampler`] is only
//! bounded for `OneShot` adapters that really return `WouldBlock`.
use core::fmt::Debug;
use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};
use log::error;

use crate::{Error, Result, ADC_MAX_READING, DEFAULT_MAX_POLLS};

/// How long to wait for a conversion to finish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Spin until the ADC reports a result. A dead ADC hangs the caller.
    Forever,
    /// Give up after this many `WouldBlock` polls.
    Bounded(u32),
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy::Bounded(DEFAULT_MAX_POLLS)
    }
}

/// Source of a single raw strap reading.
pub trait StrapSampler {
    /// Acquire one 12-bit reading.
    fn sample(&mut self) -> Result<u16>;
}

/// Checks a converted word against the 12-bit range.
pub fn check_reading(word: u32) -> Result<u16> {
    if word > ADC_MAX_READING as u32 {
        return Err(Error::OutOfRange { reading: word });
    }
    Ok(word as u16)
}

/// Strap sampler over any `embedded-hal` one-shot ADC channel.
pub struct OneShotSampler<A, P, ADC, W = u32> {
    adc: A,
    pin: P,
    policy: WaitPolicy,
    _adc: PhantomData<(ADC, W)>,
}

impl<A, P, ADC, W> OneShotSampler<A, P, ADC, W>
where
    A: OneShot<ADC, W, P>,
    P: Channel<ADC>,
{
    pub fn new(adc: A, pin: P, policy: WaitPolicy) -> Self {
        Self {
            adc,
            pin,
            policy,
            _adc: PhantomData,
        }
    }

    pub fn policy(&self) -> WaitPolicy {
        self.policy
    }

    /// Hand the ADC and pin back.
    pub fn free(self) -> (A, P) {
        (self.adc, self.pin)
    }
}

impl<A, P, ADC, W> StrapSampler for OneShotSampler<A, P, ADC, W>
where
    A: OneShot<ADC, W, P>,
    <A as OneShot<ADC, W, P>>::Error: Debug,
    P: Channel<ADC>,
    W: Into<u32>,
{
    fn sample(&mut self) -> Result<u16> {
        let Self { adc, pin, policy, .. } = self;
        wait_for(*policy, || adc.read(pin).map(Into::into))
    }
}

/// Polls `poll` under `policy` and range-checks the converted word.
fn wait_for<E, F>(policy: WaitPolicy, mut poll: F) -> Result<u16>
where
    E: Debug,
    F: FnMut() -> nb::Result<u32, E>,
{
    let mut polls: u32 = 0;
    loop {
        match poll() {
            Ok(word) => return check_reading(word),
            Err(nb::Error::Other(e)) => {
                error!("Strap conversion failed: {:?}", e);
                return Err(Error::Adc);
            }
            Err(nb::Error::WouldBlock) => {
                polls = polls.saturating_add(1);
                if let WaitPolicy::Bounded(limit) = policy {
                    if polls >= limit {
                        error!("Strap conversion timed out after {} polls", polls);
                        return Err(Error::Timeout { polls });
                    }
                }
            }
        }
    }
}

/// An ADC channel split into starting a conversion and polling for its
/// result.
pub trait StrapConversion {
    type Error: Debug;

    /// Trigger a single conversion.
    fn start(&mut self);

    /// `WouldBlock` until the conversion started by `start` is done.
    fn poll(&mut self) -> nb::Result<u32, Self::Error>;
}

/// Strap sampler that starts one conversion and polls it under a
/// [`WaitPolicy`].
pub struct ConversionSampler<C> {
    conversion: C,
    policy: WaitPolicy,
}

impl<C> ConversionSampler<C>
where
    C: StrapConversion,
{
    pub fn new(conversion: C, policy: WaitPolicy) -> Self {
        Self { conversion, policy }
    }

    pub fn policy(&self) -> WaitPolicy {
        self.policy
    }

    pub fn free(self) -> C {
        self.conversion
    }
}

impl<C> StrapSampler for ConversionSampler<C>
where
    C: StrapConversion,
{
    fn sample(&mut self) -> Result<u16> {
        let conversion = &mut self.conversion;
        conversion.start();
        wait_for(self.policy, || conversion.poll())
    }
}
