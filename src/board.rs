//! Apollo controller board: pin assignments, capability selection and init.
//!
//! PA7 carries the revision strap divider, PA2 the program button (pulled
//! up, low while held) and PB1 the USB port select line. Which of these a
//! build uses is chosen by the `revision-detect`, `program-button` and
//! `usb-switch` features.
use cortex_m::peripheral::SYST;
use log::info;

use stm32h7xx_hal::{
    adc,
    gpio::{gpioa, gpiob, Analog, Input, Output, PushPull},
    pac,
    prelude::*,
    rcc::{self, rec::AdcClkSel},
    time::MegaHertz,
    timer::{Event, Timer},
};

use crate::hid::ButtonMonitor;
use crate::identity::DetectConfig;
use crate::BUTTON_TASK_HZ;

const SYS_CK_MHZ: MegaHertz = MegaHertz::from_raw(200);
// Kernel clock for the ADC, routed from per_ck
const PER_CK_MHZ: MegaHertz = MegaHertz::from_raw(4);

pub type StrapPin = gpioa::PA7<Analog>;
pub type ButtonPin = gpioa::PA2<Input>;
pub type UsbSelectPin = gpiob::PB1<Output<PushPull>>;
pub type StrapAdc = adc::Adc<pac::ADC1, adc::Enabled>;

cfg_if::cfg_if! {
    if #[cfg(feature = "revision-detect")] {
        use crate::adc::{ConversionSampler, StrapConversion};
        use crate::identity::StrapDetector;

        pub type Detector = StrapDetector<ConversionSampler<StrapChannel>>;

        /// ADC1 bound to the strap pin.
        ///
        /// The HAL's `OneShot::read` spins on end-of-conversion itself, so the
        /// conversion is started and polled separately here.
        pub struct StrapChannel {
            adc: StrapAdc,
            pin: StrapPin,
        }

        impl StrapChannel {
            pub fn new(adc: StrapAdc, pin: StrapPin) -> Self {
                Self { adc, pin }
            }

            pub fn free(self) -> (StrapAdc, StrapPin) {
                (self.adc, self.pin)
            }
        }

        impl StrapConversion for StrapChannel {
            type Error = ();

            fn start(&mut self) {
                self.adc.start_conversion(&mut self.pin);
            }

            fn poll(&mut self) -> nb::Result<u32, ()> {
                self.adc.read_sample().map_err(|e| match e {
                    nb::Error::WouldBlock => nb::Error::WouldBlock,
                    nb::Error::Other(_) => nb::Error::Other(()),
                })
            }
        }
    } else {
        pub type Detector = crate::identity::FixedIdentity;
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "program-button")] {
        pub type Button = crate::hid::ActiveLowButton<ButtonPin>;
    } else {
        pub type Button = crate::hid::NoButton;
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "usb-switch")] {
        pub type Switch = crate::hid::UsbSelect<UsbSelectPin>;
    } else {
        pub type Switch = crate::hid::NoUsbSwitch;
    }
}

pub type Monitor = ButtonMonitor<Button, Switch>;

pub struct Board {
    pub identity: Detector,
    pub monitor: Monitor,
    /// Ticks at `BUTTON_TASK_HZ`, drives `Monitor::poll`.
    pub timer2: Timer<pac::TIM2>,
}

impl Board {
    /// Initialize clocks
    pub fn init_clocks(pwr: pac::PWR, rcc: pac::RCC, syscfg: &pac::SYSCFG) -> rcc::Ccdr {
        let pwrcfg = pwr.constrain().freeze();

        let mut ccdr = rcc
            .constrain()
            .sys_ck(SYS_CK_MHZ.convert())
            .per_ck(PER_CK_MHZ.convert())
            .freeze(pwrcfg, syscfg);
        ccdr.peripheral.kernel_adc_clk_mux(AdcClkSel::Per);
        ccdr
    }

    /// Bring up everything the identity and button code needs. Detection is
    /// left to the caller.
    pub fn init(syst: SYST, device: pac::Peripherals, config: DetectConfig) -> Board {
        info!("Starting board init");
        let ccdr = Self::init_clocks(device.PWR, device.RCC, &device.SYSCFG);
        let mut delay = syst.delay(ccdr.clocks);

        let gpioa = device.GPIOA.split(ccdr.peripheral.GPIOA);
        let gpiob = device.GPIOB.split(ccdr.peripheral.GPIOB);

        let adc1 = adc::Adc::adc1(
            device.ADC1,
            PER_CK_MHZ,
            &mut delay,
            ccdr.peripheral.ADC12,
            &ccdr.clocks,
        );
        let identity = init_identity(adc1, gpioa.pa7, config);
        let monitor = ButtonMonitor::new(init_button(gpioa.pa2), init_switch(gpiob.pb1));

        let mut timer2 = device.TIM2.timer(
            BUTTON_TASK_HZ.Hz(),
            ccdr.peripheral.TIM2,
            &ccdr.clocks,
        );
        timer2.listen(Event::TimeOut);

        info!("Board init done!");
        Board {
            identity,
            monitor,
            timer2,
        }
    }
}

#[cfg(feature = "revision-detect")]
fn init_identity(
    adc1: adc::Adc<pac::ADC1, adc::Disabled>,
    strap: gpioa::PA7<Analog>,
    config: DetectConfig,
) -> Detector {
    let mut adc1 = adc1.enable();
    adc1.set_resolution(adc::Resolution::TwelveBit);
    let channel = StrapChannel::new(adc1, strap);
    StrapDetector::new(ConversionSampler::new(channel, config.wait), config)
}

#[cfg(not(feature = "revision-detect"))]
fn init_identity(
    _adc1: adc::Adc<pac::ADC1, adc::Disabled>,
    _strap: gpioa::PA7<Analog>,
    _config: DetectConfig,
) -> Detector {
    Detector::default()
}

#[cfg(feature = "program-button")]
fn init_button(pin: gpioa::PA2<Analog>) -> Button {
    Button::new(pin.into_pull_up_input())
}

#[cfg(not(feature = "program-button"))]
fn init_button(_pin: gpioa::PA2<Analog>) -> Button {
    Button::default()
}

#[cfg(feature = "usb-switch")]
fn init_switch(pin: gpiob::PB1<Analog>) -> Switch {
    // Start with the port routed to the target.
    Switch::new(pin.into_push_pull_output())
}

#[cfg(not(feature = "usb-switch"))]
fn init_switch(_pin: gpiob::PB1<Analog>) -> Switch {
    Switch::default()
}
