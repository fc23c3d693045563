use core::cmp;

use crate::rng::Rng;



/// Colour as (R, G, B) tuple, each 0-255.
pub type Rgb = (u8, u8, u8);

pub const OFF: Rgb = (0, 0, 0);
pub const WHITE: Rgb = (255, 255, 255);

/// Severity ramp for hit flashes, indexed by the hit counter.
pub const HIT_PALETTE: [Rgb; 4] = [(0, 255, 0), (255, 255, 0), (255, 70, 0), (255, 0, 0)];

/// Last palette index; the hit counter saturates here.
pub const MAX_HIT: u8 = (HIT_PALETTE.len() - 1) as u8;

/// Frames in one full rainbow sweep.
pub const RAINBOW_FRAMES: u8 = 30;


/// Addressable-LED strip seam. `show` flushes the staged buffer to the hardware;
/// `set`/`fill` only stage.
pub trait PixelStrip {
    fn len(&self) -> usize;
    fn set(&mut self, index: usize, color: Rgb);
    fn fill(&mut self, color: Rgb);
    fn show(&mut self);
    fn set_brightness(&mut self, brightness: f32);
}


/// Byte position on a three-segment r-g-b hue wheel. Segment boundaries are hard,
/// not interpolated.
pub fn wheel(pos: u8) -> Rgb {
    if pos < 85 {
        let ramp = pos * 3;
        (ramp, 255 - ramp, 0)
    } else if pos < 170 {
        let ramp = (pos - 85) * 3;
        (255 - ramp, 0, ramp)
    } else {
        let ramp = (pos - 170) * 3;
        (0, ramp, 255 - ramp)
    }
}


/// Per-frame animation steps over a pixel strip. Holds no deadlines; the session
/// decides how long and how often each step runs.
pub struct PixelFx<P> {
    pixels: P,
    rng: Rng,
}

impl<P> PixelFx<P>
where
    P: PixelStrip,
{
    pub fn new(pixels: P, rng: Rng) -> PixelFx<P> {
        PixelFx { pixels, rng }
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.pixels.set_brightness(brightness);
    }

    /// One random pixel to full white, flushed, then staged back off. The off write
    /// only becomes visible on the next flush, which produces the flicker.
    pub fn sparkle(&mut self) {
        let index = self.rng.range(self.pixels.len() as u32) as usize;

        self.pixels.set(index, WHITE);
        self.pixels.show();
        self.pixels.set(index, OFF);
    }

    /// Frame `frame` of the rotating rainbow sweep.
    pub fn rainbow_step(&mut self, frame: u8) {
        let count = self.pixels.len();

        for index in 0..count {
            let pos = (index * 256 / count + frame as usize * 20) & 255;
            self.pixels.set(index, wheel(pos as u8));
        }

        self.pixels.show();
    }

    /// Flush the palette colour for `hit`; below the last palette entry the buffer is
    /// staged back to off, at the last entry the colour is left lit.
    pub fn hit_flash(&mut self, hit: u8) {
        let hit = cmp::min(hit, MAX_HIT) as usize;

        self.pixels.fill(HIT_PALETTE[hit]);
        self.pixels.show();

        if hit < MAX_HIT as usize {
            self.pixels.fill(OFF);
        }
    }

    /// Stage all pixels off without flushing.
    pub fn blank(&mut self) {
        self.pixels.fill(OFF);
    }

    /// All pixels off, flushed.
    pub fn clear(&mut self) {
        self.pixels.fill(OFF);
        self.pixels.show();
    }
}
