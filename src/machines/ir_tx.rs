use crate::codes::ReferenceCode;
use crate::machines::ir_rx::{IrRx, PulseCapture};



/// IR emission peripheral seam. Emits a raw mark/space train on the 38 kHz carrier;
/// blocks for the duration of the train.
pub trait PulseTransmitter {
    fn send(&mut self, pulses: &[u16]);
}


/// Transmitter controller. Always suppresses the receiver before emitting, otherwise
/// the badge detects its own reflected signal. The caller finishes the cycle by
/// restarting the receiver once the guard interval elapsed (the peripheral may still
/// be settling right after the send).
pub struct IrTx<T> {
    tx: T,
}

impl<T> IrTx<T>
where
    T: PulseTransmitter,
{
    pub fn new(tx: T) -> IrTx<T> {
        IrTx { tx }
    }

    pub fn send<C: PulseCapture>(&mut self, rx: &mut IrRx<C>, code: &ReferenceCode) {
        rx.suppress();
        self.tx.send(code.pulses());
    }
}
