pub mod rmt;

use esp_hal::timer::systimer::SystemTimer;

use crate::Instant;



/// Monotonic microsecond timestamp from the system timer (16 MHz ticks).
pub fn now() -> Instant {
    Instant::from_ticks(SystemTimer::now() / (SystemTimer::TICKS_PER_SECOND / 1_000_000))
}
