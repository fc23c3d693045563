use crate::pulse::{PulseTrain, FRAME_PULSES};



/// IR capture peripheral seam. Buffers up to `FRAME_PULSES` mark/space durations in
/// microseconds while running; `pause` freezes the buffer for a consistent read.
pub trait PulseCapture {
    fn pause(&mut self);
    fn resume(&mut self);
    fn clear(&mut self);
    fn len(&mut self) -> usize;
    fn read(&mut self, index: usize) -> u16;
}


/// Receiver controller. Owns the capture peripheral and hands out one immutable frame
/// snapshot at a time; it has no opinion on what the frame means.
pub struct IrRx<C> {
    cap: C,
}

impl<C> IrRx<C>
where
    C: PulseCapture,
{
    pub fn new(cap: C) -> IrRx<C> {
        IrRx { cap }
    }

    /// Drop boot artifacts and begin capturing.
    pub fn start(&mut self) {
        self.cap.clear();
        self.cap.resume();
    }

    /// `None` until a full frame accumulated; a shorter buffer is not a partial train
    /// and is left accumulating. On a full frame the peripheral is paused (samples
    /// keep arriving mid-read otherwise) and stays paused until `restart`.
    pub fn poll(&mut self) -> Option<PulseTrain> {
        if self.cap.len() < FRAME_PULSES {
            return None;
        }

        self.cap.pause();

        let mut train = PulseTrain::new();
        for index in 0..FRAME_PULSES {
            train.push(self.cap.read(index));
        }

        Some(train)
    }

    /// Pause capture without touching the buffer, used around transmissions so the
    /// sender does not detect its own signal.
    pub fn suppress(&mut self) {
        self.cap.pause();
    }

    /// Drop whatever accumulated and capture again.
    pub fn restart(&mut self) {
        self.cap.clear();
        self.cap.resume();
    }
}
