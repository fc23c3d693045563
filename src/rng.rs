/// Xorshift32, plenty for picking sparkle pixels. Seeded from the hardware RNG on the
/// badge, from a fixed value in tests.
pub struct Rng(u32);

impl Rng {
    pub const fn new(seed: u32) -> Rng {
        // xorshift gets stuck at zero
        Rng(if seed == 0 { 0x6b8b_4567 } else { seed })
    }

    pub fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }

    /// Uniform-ish value in `0..max`. `max` must be non zero.
    pub fn range(&mut self, max: u32) -> u32 {
        self.next() % max
    }
}
