//! Shared-state peripheral doubles for the unit tests. Each constructor returns the
//! fake plus a handle onto its recorded state.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin};

use crate::machines::ir_rx::PulseCapture;
use crate::machines::ir_tx::PulseTransmitter;
use crate::machines::pixel_fx::{PixelStrip, Rgb, OFF};



#[derive(Default)]
pub struct CaptureState {
    pub samples: Vec<u16>,
    pub running: bool,
    pub pauses: usize,
    pub clears: usize,
}

pub struct FakeCapture {
    state: Rc<RefCell<CaptureState>>,
}

impl FakeCapture {
    pub fn new() -> (FakeCapture, Rc<RefCell<CaptureState>>) {
        let state = Rc::new(RefCell::new(CaptureState::default()));
        (FakeCapture { state: state.clone() }, state)
    }
}

impl PulseCapture for FakeCapture {
    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        state.running = false;
        state.pauses += 1;
    }

    fn resume(&mut self) {
        self.state.borrow_mut().running = true;
    }

    fn clear(&mut self) {
        let mut state = self.state.borrow_mut();
        state.samples.clear();
        state.clears += 1;
    }

    fn len(&mut self) -> usize {
        self.state.borrow().samples.len()
    }

    fn read(&mut self, index: usize) -> u16 {
        self.state.borrow().samples[index]
    }
}


#[derive(Default)]
pub struct TransmitterState {
    pub sent: Vec<Vec<u16>>,
}

pub struct FakeTransmitter {
    state: Rc<RefCell<TransmitterState>>,
}

impl FakeTransmitter {
    pub fn new() -> (FakeTransmitter, Rc<RefCell<TransmitterState>>) {
        let state = Rc::new(RefCell::new(TransmitterState::default()));
        (FakeTransmitter { state: state.clone() }, state)
    }
}

impl PulseTransmitter for FakeTransmitter {
    fn send(&mut self, pulses: &[u16]) {
        self.state.borrow_mut().sent.push(pulses.to_vec());
    }
}


pub struct StripState {
    pub staged: Vec<Rgb>,
    pub flushes: Vec<Vec<Rgb>>,
    pub brightness: f32,
}

pub struct FakeStrip {
    state: Rc<RefCell<StripState>>,
}

impl FakeStrip {
    pub fn new(count: usize) -> (FakeStrip, Rc<RefCell<StripState>>) {
        let state = Rc::new(RefCell::new(StripState {
            staged: vec![OFF; count],
            flushes: Vec::new(),
            brightness: 1.0,
        }));
        (FakeStrip { state: state.clone() }, state)
    }
}

impl PixelStrip for FakeStrip {
    fn len(&self) -> usize {
        self.state.borrow().staged.len()
    }

    fn set(&mut self, index: usize, color: Rgb) {
        self.state.borrow_mut().staged[index] = color;
    }

    fn fill(&mut self, color: Rgb) {
        self.state.borrow_mut().staged.fill(color);
    }

    fn show(&mut self) {
        let mut state = self.state.borrow_mut();
        let frame = state.staged.clone();
        state.flushes.push(frame);
    }

    fn set_brightness(&mut self, brightness: f32) {
        self.state.borrow_mut().brightness = brightness;
    }
}


pub struct FakePin {
    held: Rc<Cell<bool>>,
}

impl FakePin {
    pub fn new() -> (FakePin, Rc<Cell<bool>>) {
        let held = Rc::new(Cell::new(false));
        (FakePin { held: held.clone() }, held)
    }
}

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.held.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.held.get())
    }
}
