#![cfg_attr(not(test), no_std)]

//! Two-badge infrared tag: pulse-train codec, receive/transmit controllers and the
//! pixel animation state machines, hardware-independent behind trait seams. The
//! `esp32c6` feature adds the board bindings and the firmware entry point.

pub mod codes;
pub mod dotstar;
pub mod machines;
pub mod pulse;
pub mod rng;

#[cfg(feature = "esp32c6")]
pub mod board;

#[cfg(test)]
pub(crate) mod testkit;

/// Monotonic microsecond timestamp shared by every deadline in the crate.
pub type Instant = fugit::TimerInstantU64<1_000_000>;
pub type Duration = fugit::TimerDurationU64<1_000_000>;
