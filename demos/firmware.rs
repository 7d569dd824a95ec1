//! demos/firmware.rs
//!
//! Detects the board revision at boot, then polls the program button from the
//! TIM2 interrupt and hands the USB port to the controller while it is held.
#![no_main]
#![no_std]

#[rtic::app(device = stm32h7xx_hal::pac, peripherals = true)]
mod app {
    use libapollo_rust::board::{Board, Monitor};
    use libapollo_rust::{logger, BoardIdentity, DetectConfig};
    use log::{info, warn};
    use stm32h7xx_hal::{pac::TIM2, timer::Timer};

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        timer2: Timer<TIM2>,
        monitor: Monitor,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        logger::init();
        let mut board = Board::init(ctx.core.SYST, ctx.device, DetectConfig::default());

        if let Err(e) = board.identity.detect() {
            warn!("Reporting default identity: {}", e);
        }
        info!(
            "{} {}, bcdDevice {:#06x}, strap reading {}",
            board.identity.manufacturer(),
            board.identity.product(),
            board.identity.board_revision(),
            board.identity.adc_reading()
        );

        (
            Shared {},
            Local {
                timer2: board.timer2,
                monitor: board.monitor,
            },
            init::Monotonics(),
        )
    }

    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        loop {
            cortex_m::asm::nop();
        }
    }

    #[task(binds = TIM2, local = [timer2, monitor])]
    fn button_task(ctx: button_task::Context) {
        ctx.local.timer2.clear_irq();
        ctx.local.monitor.poll();
    }
}
