/* RMT peripheral glue: channel 0 emits pulse trains on the 38 kHz IR carrier,
   channel 2 captures incoming trains framed by an idle gap */

use core::iter;

use bitflags::bitflags;
use esp_hal::{
    gpio::{Input, InputPin, Level, Output, OutputPin, Pull},
    peripheral::{Peripheral, PeripheralRef},
    peripherals::{self, RMT, SYSTEM},
    rmt::PulseCode,
};
use heapless::Vec;

use crate::machines::ir_rx::PulseCapture;
use crate::machines::ir_tx::PulseTransmitter;
use crate::pulse::FRAME_PULSES;



// RMT source clock is PLL_F80M divided down to 1 MHz, so one channel tick is one
// microsecond on both channels
const SCLK_SELECTION: u8 = 1;
const SCLK_DIV_NUM: u8 = 80 - 1;

// 38 kHz carrier at 50% duty, in source clock ticks
const CARRIER_HIGH: u16 = 13;
const CARRIER_LOW: u16 = 13;

// a 20 ms quiet gap ends a capture; longer in-frame gaps are reported saturated
const RX_IDLE_THRESH: u16 = 20_000;
const GAP_SAMPLE: u16 = u16::MAX;

const RMT_RAM: *mut u32 = 0x6000_6400 as *mut u32;
const RMT_RAM_CODES: usize = 48;


bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RxStatus: u32 {
        const CH2_END = 1 << 2;
        const CH2_ERROR = 1 << 6;
    }
}

impl RxStatus {
    pub fn is_error(&self) -> bool {
        self.intersects(RxStatus::CH2_ERROR)
    }
}


pub fn config_clock(system: PeripheralRef<SYSTEM>) {
    // TODO: safety
    system.rmt_sclk_conf().modify(|_, w| unsafe {
        w
            .sclk_sel().bits(SCLK_SELECTION)
            .sclk_div_num().bits(SCLK_DIV_NUM)
            .sclk_div_a().bits(0)
            .sclk_div_b().bits(0)
    });

    system.rmt_conf().modify(|_, w| w.rmt_clk_en().set_bit());
}


/// IR capture over RMT channel 2, exposed through the `PulseCapture` seam. The
/// hardware delivers one finished burst per idle gap; bursts are appended to the
/// frame buffer with a saturated gap sample between them, which is how the reference
/// codes encode over-long quiet periods.
pub struct RmtCapture<'a, 'b, PIN> {
    rmt: PeripheralRef<'a, RMT>,
    _pin: Input<'b, PIN>,
    buffer: Vec<u16, FRAME_PULSES>,
    running: bool,
}

impl<'a, 'b, PIN> RmtCapture<'a, 'b, PIN>
where
    PIN: InputPin,
{
    pub fn new<'c>(
        rmt: impl Peripheral<P = RMT> + 'a,
        pin: impl Peripheral<P = PIN> + 'b,
        system: impl Peripheral<P = SYSTEM> + 'c,
    ) -> Self {
        let mut rmt = rmt.into_ref();

        config_clock(system.into_ref());

        rmt.sys_conf().modify(|_, w| w.apb_fifo_mask().bit(false)); // fifo access

        rmt.ch2_rx_conf0().modify(|_, w| unsafe {
            w
                .div_cnt().bits(1)
                .idle_thres().bits(RX_IDLE_THRESH)
                .carrier_en().bit(false) // the receiver module already demodulates
        });
        rmt.ch2_rx_conf1().modify(|_, w| w.conf_update().set_bit());

        let pin = setup_rx_pin(pin);

        Self {
            rmt,
            _pin: pin,
            buffer: Vec::new(),
            running: false,
        }
    }

    fn rx_enable(&mut self, enable: bool) {
        self.rmt.ch2_rx_conf1().modify(|_, w| w.rx_en().bit(enable));
        self.rmt.ch2_rx_conf1().modify(|_, w| w.conf_update().set_bit());
    }

    fn status_get_and_clear(&mut self) -> RxStatus {
        let status = RxStatus::from_bits_truncate(self.rmt.int_raw().read().bits());

        self.rmt.int_clr().write(|w| {
            w
                .ch2_rx_end().bit(true)
                .ch2_rx_err().bit(true)
        });

        status
    }

    fn reset_channel_ram(&mut self) {
        self.rmt.ch2_rx_conf1().modify(|_, w| {
            w
                .mem_wr_rst().bit(true)
                .apb_mem_rst().bit(true)
                .mem_owner().bit(true)
        });
    }

    /// Move any finished burst out of the channel RAM into the frame buffer.
    fn drain(&mut self) {
        if !self.running {
            return;
        }

        let status = self.status_get_and_clear();

        if status.is_error() {
            self.reset_channel_ram();
            return;
        }

        if !status.contains(RxStatus::CH2_END) {
            return;
        }

        if !self.buffer.is_empty() {
            let _ = self.buffer.push(GAP_SAMPLE);
        }

        for length in fifo_lengths(self.rmt.reborrow()) {
            let _ = self.buffer.push(length);
        }

        self.reset_channel_ram();
    }
}

impl<'a, 'b, PIN> PulseCapture for RmtCapture<'a, 'b, PIN>
where
    PIN: InputPin,
{
    fn pause(&mut self) {
        self.running = false;
        self.rx_enable(false);
    }

    fn resume(&mut self) {
        self.running = true;
        self.rx_enable(true);
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.reset_channel_ram();
        self.status_get_and_clear();
    }

    fn len(&mut self) -> usize {
        self.drain();
        self.buffer.len()
    }

    fn read(&mut self, index: usize) -> u16 {
        self.buffer.get(index).copied().unwrap_or(0)
    }
}


fn setup_rx_pin<'b, PIN>(pin: impl Peripheral<P = PIN> + 'b) -> Input<'b, PIN>
where
    PIN: InputPin,
{
    let pin = Input::new(pin, Pull::None);

    let pin_num = 10; // IR receiver output

    // SAFETY: only the matrix routing of the pin owned by this function is touched
    let pac_gpio = unsafe { peripherals::GPIO::steal() };
    let pac_io_mux = unsafe { peripherals::IO_MUX::steal() };

    pac_io_mux.gpio(pin_num).modify(|_, w| unsafe {
        w.mcu_sel().bits(1) // route through the gpio matrix
    });
    pac_gpio.func_in_sel_cfg(71).modify(|_, w| unsafe {
        w
            .sel().set_bit()
            .in_sel().bits(pin_num as u8) // RMT_SIG_IN2
    });

    pin
}

fn fifo_lengths<'a>(rmt: PeripheralRef<'a, RMT>) -> impl Iterator<Item = u16> + 'a {
    let mut end_marker = false;

    iter::repeat_with(move || {
        if end_marker {
            return [None, None];
        }

        let code = PulseCode::from(rmt.ch2data().read().bits());

        if code.length1 == 0 || code.length2 == 0 {
            end_marker = true;
        }

        [
            (code.length1 != 0).then_some(code.length1),
            (code.length2 != 0).then_some(code.length2),
        ]
    })
        .flatten()
        .take_while(Option::is_some)
        .flatten()
}


/// IR emission over RMT channel 0, exposed through `PulseTransmitter`. Sending
/// blocks until the train left the peripheral.
pub struct RmtPulseOut<'b, PIN> {
    rmt: RMT,
    _pin: Output<'b, PIN>,
}

impl<'b, PIN> RmtPulseOut<'b, PIN>
where
    PIN: OutputPin,
{
    pub fn new(pin: impl Peripheral<P = PIN> + 'b) -> Self {
        // SAFETY: only ch0 tx registers are used here, the capture side owns ch2
        let rmt = unsafe { RMT::steal() };

        rmt.ch0_tx_conf0().modify(|_, w| unsafe {
            w
                .div_cnt().bits(1)
                .carrier_en().bit(true)
                .carrier_out_lv().bit(true) // modulate the mark level
                .carrier_eff_en().bit(true)
                .idle_out_en().bit(true)
                .idle_out_lv().bit(false)
        });
        rmt.ch0carrier_duty().write(|w| unsafe {
            w
                .carrier_high().bits(CARRIER_HIGH)
                .carrier_low().bits(CARRIER_LOW)
        });
        rmt.ch0_tx_conf0().modify(|_, w| w.conf_update().set_bit());

        let pin = setup_tx_pin(pin);

        Self { rmt, _pin: pin }
    }

    fn fill_ram(&mut self, pulses: &[u16]) {
        let mut codes = 0usize;

        for (index, pair) in pulses.chunks(2).enumerate() {
            if index == RMT_RAM_CODES {
                break;
            }

            let code = PulseCode {
                level1: true,
                length1: pair[0],
                level2: false,
                length2: pair.get(1).copied().unwrap_or(0), // zero length ends the train
            };

            // SAFETY: index is bounded by the channel RAM block size
            unsafe { RMT_RAM.add(index).write_volatile(code.into()) };
            codes = index + 1;
        }

        if pulses.len() % 2 == 0 {
            let end = PulseCode { level1: false, length1: 0, level2: false, length2: 0 };
            if codes < RMT_RAM_CODES {
                // SAFETY: bounded as above
                unsafe { RMT_RAM.add(codes).write_volatile(end.into()) };
            }
        }
    }

    fn start(&mut self) {
        self.rmt.ref_cnt_rst().write(|w| w.tx_ref_cnt_rst().set_bit());
        self.rmt.ch0_tx_conf0().modify(|_, w| {
            w
                .tx_start().set_bit()
                .mem_rd_rst().set_bit()
        });
    }

    fn wait_done(&mut self) {
        loop {
            if self.rmt.int_raw().read().ch0_tx_err().bit() {
                self.rmt.int_clr().write(|w| w.ch0_tx_err().set_bit());
                return;
            }

            if self.rmt.int_raw().read().ch0_tx_end().bit() {
                self.rmt.int_clr().write(|w| w.ch0_tx_end().set_bit());
                return;
            }
        }
    }
}

impl<'b, PIN> PulseTransmitter for RmtPulseOut<'b, PIN>
where
    PIN: OutputPin,
{
    fn send(&mut self, pulses: &[u16]) {
        if pulses.is_empty() {
            return;
        }

        self.fill_ram(pulses);
        self.start();
        self.wait_done();
    }
}


fn setup_tx_pin<'b, PIN>(pin: impl Peripheral<P = PIN> + 'b) -> Output<'b, PIN>
where
    PIN: OutputPin,
{
    let pin = Output::new(pin, Level::Low);

    let pin_num = 3; // IR emitter

    // SAFETY: only the matrix routing of the pin owned by this function is touched
    let pac_gpio = unsafe { peripherals::GPIO::steal() };
    let pac_io_mux = unsafe { peripherals::IO_MUX::steal() };

    pac_io_mux.gpio(pin_num).modify(|_, w| unsafe {
        w.mcu_sel().bits(1)
    });
    pac_gpio.func_out_sel_cfg(pin_num).modify(|_, w| unsafe {
        w.out_sel().bits(69) // RMT_SIG_OUT0
    });

    pin
}
