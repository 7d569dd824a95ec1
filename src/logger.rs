//! Optional log backends, selected with the `log-rtt` and `log-semihosting`
//! features. Each backend brings its own panic handler.
use log::LevelFilter;

/// Maximum level forwarded by the installed backend.
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

cfg_if::cfg_if! {
    if #[cfg(feature = "log-rtt")] {
        use panic_rtt_target as _;

        use log::{Metadata, Record};
        use rtt_target::{rprintln, rtt_init_print};

        pub struct Logger {
            level: LevelFilter,
        }

        static LOGGER: Logger = Logger { level: LOG_LEVEL };

        /// Initialize logging via RTT
        pub fn init() {
            rtt_init_print!();
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(LOGGER.level);
            }
        }

        impl log::Log for Logger {
            fn enabled(&self, metadata: &Metadata) -> bool {
                metadata.level() <= self.level
            }

            fn log(&self, record: &Record) {
                if self.enabled(record.metadata()) {
                    rprintln!("{} {} - {}", record.level(), record.target(), record.args());
                }
            }

            fn flush(&self) {}
        }
    }
    else if #[cfg(feature = "log-semihosting")] {
        use panic_semihosting as _;

        use lazy_static::lazy_static;

        pub use cortex_m_log::log::Logger;
        use cortex_m_log::modes::InterruptOk;
        use cortex_m_log::printer::semihosting;
        use cortex_m_log::printer::semihosting::Semihosting;
        use cortex_m_semihosting::hio::HostStream;

        lazy_static! {
            static ref LOGGER: Logger<Semihosting<InterruptOk, HostStream>> = Logger {
                level: LOG_LEVEL,
                inner: semihosting::InterruptOk::<_>::stdout().expect("Get Semihosting stdout"),
            };
        }

        /// Initialize logging via semihosting
        pub fn init() {
            if cortex_m_log::log::init(&LOGGER).is_ok() {
                log::set_max_level(LOG_LEVEL);
            }
        }
    }
    else {
        #[cfg(all(target_arch = "arm", not(test)))]
        use panic_halt as _;

        /// No backend enabled; log macros compile to nothing useful.
        pub fn init() {
            log::set_max_level(LOG_LEVEL);
        }
    }
}
