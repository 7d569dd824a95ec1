//! Program button and USB port switch.
//!
//! The button is sampled on every scheduler tick with no debouncing or edge
//! detection: while it is held, every tick hands the USB port back to the
//! controller again.
use core::fmt::Debug;

use embedded_hal::digital::v2::{InputPin, OutputPin};
use log::{debug, warn};

/// A button that can be sampled synchronously.
pub trait ProgramButton {
    fn is_pressed(&self) -> bool;
}

/// The switch that decides who owns the shared USB port.
pub trait UsbSwitch {
    /// Whether this board can move the port at all.
    const PRESENT: bool = true;

    /// Route the USB port to the debug controller.
    fn take_over_usb(&mut self);
}

/// Button pulled up externally, reading low while held.
pub struct ActiveLowButton<T> {
    pin: T,
}

impl<T> ActiveLowButton<T>
where
    T: InputPin,
    <T as InputPin>::Error: Debug,
{
    pub fn new(pin: T) -> Self {
        Self { pin }
    }

    pub fn free(self) -> T {
        self.pin
    }
}

impl<T> ProgramButton for ActiveLowButton<T>
where
    T: InputPin,
    <T as InputPin>::Error: Debug,
{
    fn is_pressed(&self) -> bool {
        match self.pin.is_low() {
            Ok(low) => low,
            Err(e) => {
                warn!("Program button read failed: {:?}", e);
                false
            }
        }
    }
}

/// Board without a program button.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoButton;

impl ProgramButton for NoButton {
    fn is_pressed(&self) -> bool {
        false
    }
}

/// Port switch driven by a single select line, high selecting the
/// controller.
pub struct UsbSelect<T> {
    pin: T,
}

impl<T> UsbSelect<T>
where
    T: OutputPin,
    <T as OutputPin>::Error: Debug,
{
    pub fn new(pin: T) -> Self {
        Self { pin }
    }

    pub fn free(self) -> T {
        self.pin
    }
}

impl<T> UsbSwitch for UsbSelect<T>
where
    T: OutputPin,
    <T as OutputPin>::Error: Debug,
{
    fn take_over_usb(&mut self) {
        if let Err(e) = self.pin.set_high() {
            warn!("USB select line write failed: {:?}", e);
        }
    }
}

/// Board without a controllable USB switch.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoUsbSwitch;

impl UsbSwitch for NoUsbSwitch {
    const PRESENT: bool = false;

    fn take_over_usb(&mut self) {}
}

pub struct ButtonMonitor<B, S> {
    button: B,
    switch: S,
}

impl<B, S> ButtonMonitor<B, S>
where
    B: ProgramButton,
    S: UsbSwitch,
{
    pub fn new(button: B, switch: S) -> Self {
        Self { button, switch }
    }

    pub fn button_pressed(&self) -> bool {
        self.button.is_pressed()
    }

    /// Run once per scheduler tick. Returns whether the port was taken over.
    pub fn poll(&mut self) -> bool {
        if !S::PRESENT {
            return false;
        }
        if !self.button.is_pressed() {
            return false;
        }
        debug!("Program button held, taking over USB");
        self.switch.take_over_usb();
        true
    }

    pub fn free(self) -> (B, S) {
        (self.button, self.switch)
    }
}
