use embedded_hal::spi::SpiBus;

use crate::machines::pixel_fx::{PixelStrip, Rgb, OFF};



/// APA102 (DotStar) strip over a plain SPI bus, the badge's pixel ring. Colors are
/// staged locally and pushed out as one start-frame / LED-frames / end-frame burst on
/// `show`. The fractional brightness maps onto the chip's 5 bit global current scale.
pub struct DotStar<S, const N: usize> {
    spi: S,
    pixels: [Rgb; N],
    brightness: u8,
}

impl<S, const N: usize> DotStar<S, N>
where
    S: SpiBus,
{
    pub fn new(spi: S) -> DotStar<S, N> {
        DotStar {
            spi,
            pixels: [OFF; N],
            brightness: 31,
        }
    }
}

impl<S, const N: usize> PixelStrip for DotStar<S, N>
where
    S: SpiBus,
{
    fn len(&self) -> usize {
        N
    }

    fn set(&mut self, index: usize, color: Rgb) {
        if index < N {
            self.pixels[index] = color;
        }
    }

    fn fill(&mut self, color: Rgb) {
        self.pixels = [color; N];
    }

    fn show(&mut self) {
        self.spi.write(&[0x00; 4]).unwrap();

        for (r, g, b) in self.pixels {
            // LED frame is brightness marker, blue, green, red
            self.spi.write(&[0b1110_0000 | self.brightness, b, g, r]).unwrap();
        }

        self.spi.write(&[0xff; 4]).unwrap();
        self.spi.flush().unwrap();
    }

    fn set_brightness(&mut self, brightness: f32) {
        self.brightness = (brightness.clamp(0.0, 1.0) * 31.0) as u8;
    }
}
