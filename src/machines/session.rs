use core::cmp;
use core::fmt::Write;

use embedded_hal::digital::InputPin;

use crate::codes::{self, ReferenceCode};
use crate::machines::ir_rx::{IrRx, PulseCapture};
use crate::machines::ir_tx::{IrTx, PulseTransmitter};
use crate::machines::pixel_fx::{PixelFx, PixelStrip, MAX_HIT, RAINBOW_FRAMES};
use crate::pulse::{fuzzy_compare, Tolerance};
use crate::rng::Rng;
use crate::{Duration, Instant};



#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub tolerance: Tolerance,
    /// How long a confirmed match animates.
    pub animation_window: Duration,
    /// Settling time after a send before capture resumes, keeps consecutive
    /// transmissions from running together.
    pub guard_interval: Duration,
    /// Settling time after a processed frame before capture resumes.
    pub settle_interval: Duration,
    pub sparkle_frame: Duration,
    pub flash_frame: Duration,
    pub boot_frame: Duration,
    pub brightness: f32,
}

impl SessionConfig {
    pub const fn new() -> SessionConfig {
        SessionConfig {
            tolerance: Tolerance::FULL,
            animation_window: Duration::secs(2),
            guard_interval: Duration::millis(200),
            settle_interval: Duration::millis(100),
            sparkle_frame: Duration::millis(8),
            flash_frame: Duration::millis(1),
            boot_frame: Duration::millis(20),
            brightness: 0.05,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig::new()
    }
}


#[derive(Debug, Clone, Copy)]
enum SessionState {
    Boot { frame: u8, next: Instant },
    Idle,
    Guard { until: Instant },
    Sparkle { until: Instant, next: Instant, hit_pending: bool },
    HitFlash { until: Instant, next: Instant },
    Settle { until: Instant },
}


/// Top-level controller. The loop body is the state machine: every `update` either
/// starts a send, advances an animation frame, processes a captured frame, or expires
/// one of the deadlines. Waiting is an explicit deadline comparison against `now`,
/// never a blocking sleep, so the whole session can be stepped with a fake clock.
pub struct Session<C, T, P, A, B> {
    rx: IrRx<C>,
    tx: IrTx<T>,
    fx: PixelFx<P>,
    button_a: A,
    button_b: B,
    config: SessionConfig,
    hits: u8,
    state: SessionState,
}

impl<C, T, P, A, B> Session<C, T, P, A, B>
where
    C: PulseCapture,
    T: PulseTransmitter,
    P: PixelStrip,
    A: InputPin,
    B: InputPin,
{
    pub fn new(cap: C, tx: T, pixels: P, rng: Rng, button_a: A, button_b: B, config: SessionConfig) -> Self {
        Session {
            rx: IrRx::new(cap),
            tx: IrTx::new(tx),
            fx: PixelFx::new(pixels, rng),
            button_a,
            button_b,
            config,
            hits: 0,
            state: SessionState::Idle,
        }
    }

    /// Times this badge was tagged, saturating at the last palette index.
    pub fn hits(&self) -> u8 {
        self.hits
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SessionState::Idle)
    }

    pub fn start(&mut self, now: Instant, diag: &mut impl Write) {
        self.fx.set_brightness(self.config.brightness);
        self.fx.clear();
        self.rx.start();

        let _ = writeln!(diag, "ir badge active");

        self.state = SessionState::Boot { frame: 0, next: now };
    }

    pub fn update(&mut self, now: Instant, diag: &mut impl Write) -> bool {
        match self.state {
            SessionState::Boot { frame, next } => {
                if now < next {
                    return false;
                }

                if frame == RAINBOW_FRAMES {
                    self.fx.clear();
                    self.state = SessionState::Idle;
                } else {
                    self.fx.rainbow_step(frame);
                    self.state = SessionState::Boot { frame: frame + 1, next: now + self.config.boot_frame };
                }

                true
            },
            SessionState::Idle => self.idle_step(now, diag),
            SessionState::Guard { until } => {
                if now < until {
                    return false;
                }

                // whatever accumulated during the send is our own reflection
                self.rx.restart();
                self.state = SessionState::Idle;

                true
            },
            SessionState::Sparkle { until, next, hit_pending } => {
                if now >= until {
                    self.hits = 0;
                    self.fx.blank();

                    // a frame matching both references runs both animations, the
                    // friendly one first
                    self.state = if hit_pending {
                        SessionState::HitFlash { until: now + self.config.animation_window, next: now }
                    } else {
                        SessionState::Settle { until: now + self.config.settle_interval }
                    };

                    true
                } else if now >= next {
                    self.fx.sparkle();
                    self.state = SessionState::Sparkle {
                        until,
                        next: now + self.config.sparkle_frame,
                        hit_pending,
                    };

                    true
                } else {
                    false
                }
            },
            SessionState::HitFlash { until, next } => {
                if now >= until {
                    self.hits = cmp::min(self.hits + 1, MAX_HIT);
                    self.state = SessionState::Settle { until: now + self.config.settle_interval };

                    true
                } else if now >= next {
                    self.fx.hit_flash(self.hits);
                    self.state = SessionState::HitFlash { until, next: now + self.config.flash_frame };

                    true
                } else {
                    false
                }
            },
            SessionState::Settle { until } => {
                if now < until {
                    return false;
                }

                self.rx.restart();
                self.state = SessionState::Idle;

                true
            },
        }
    }

    fn idle_step(&mut self, now: Instant, diag: &mut impl Write) -> bool {
        // buttons take priority over whatever is sitting in the capture buffer
        if self.button_a.is_high().unwrap() {
            self.send(now, &codes::BUTTON_A);
            return true;
        }

        if self.button_b.is_high().unwrap() {
            self.send(now, &codes::BUTTON_B);
            return true;
        }

        let Some(train) = self.rx.poll() else {
            return false;
        };

        let _ = writeln!(diag, "captured frame : {} pulses", train.len());

        let matched_a = fuzzy_compare(codes::BUTTON_A.pulses(), train.as_slice(), self.config.tolerance);
        let matched_b = fuzzy_compare(codes::BUTTON_B.pulses(), train.as_slice(), self.config.tolerance);

        if matched_a {
            let _ = writeln!(diag, "received correct {} press", codes::BUTTON_A.label);
        }
        if matched_b {
            let _ = writeln!(diag, "received correct {} press", codes::BUTTON_B.label);
        }

        self.state = if matched_a {
            SessionState::Sparkle {
                until: now + self.config.animation_window,
                next: now,
                hit_pending: matched_b,
            }
        } else if matched_b {
            SessionState::HitFlash { until: now + self.config.animation_window, next: now }
        } else {
            SessionState::Settle { until: now + self.config.settle_interval }
        };

        true
    }

    fn send(&mut self, now: Instant, code: &ReferenceCode) {
        self.tx.send(&mut self.rx, code);
        self.state = SessionState::Guard { until: now + self.config.guard_interval };
    }
}
