#![no_std]
#![no_main]

use esp_hal::{
    clock::ClockControl,
    gpio::{Input, Io, Pull},
    peripherals::{Peripherals, SYSTEM},
    prelude::*,
    rng::Rng as HwRng,
    spi::{master::Spi, SpiMode},
    system::SystemControl,
};
use esp_backtrace as _;
use esp_println::Printer;

use ir_badge::board::{self, rmt::{RmtCapture, RmtPulseOut}};
use ir_badge::dotstar::DotStar;
use ir_badge::machines::session::{Session, SessionConfig};
use ir_badge::rng::Rng;



const STRIP_PIXELS: usize = 10;


#[entry]
fn main() -> ! {
    // # init - common peripherals
    let peripherals = Peripherals::take();

    let system = SystemControl::new(peripherals.SYSTEM);
    let clocks = ClockControl::max(system.clock_control).freeze();

    let io = Io::new(peripherals.GPIO, peripherals.IO_MUX);

    // # before loop
    // SAFETY: system is used only temporarily inside `RmtCapture::new`, it is not
    // stored (cannot use `peripherals.SYSTEM` because it's already moved)
    let capture = RmtCapture::new(peripherals.RMT, io.pins.gpio10, unsafe { SYSTEM::steal() });
    let pulse_out = RmtPulseOut::new(io.pins.gpio3);

    let spi = Spi::new(peripherals.SPI2, 4u32.MHz(), SpiMode::Mode0, &clocks)
        .with_sck(io.pins.gpio6)
        .with_mosi(io.pins.gpio7);
    let strip: DotStar<_, STRIP_PIXELS> = DotStar::new(spi);

    let button_a = Input::new(io.pins.gpio1, Pull::Down);
    let button_b = Input::new(io.pins.gpio2, Pull::Down);

    let seed = HwRng::new(peripherals.RNG).random();

    let mut printer = Printer;
    let mut session = Session::new(
        capture,
        pulse_out,
        strip,
        Rng::new(seed),
        button_a,
        button_b,
        SessionConfig::new(),
    );

    // # start
    session.start(board::now(), &mut printer);

    // # loop
    loop {
        let _ = session.update(board::now(), &mut printer);
    }
}
