use std::f32::consts::{PI, TAU};

use super::state::{SQUISH_MAX, SQUISH_MIN};

/// Spring stiffness for the post-drag bounce.
pub const SPRING_STIFFNESS: f32 = 150.0;
/// Spring damping for the post-drag bounce.
pub const SPRING_DAMPING: f32 = 5.0;
/// Offset and velocity must both fall below this to settle.
pub const BOUNCE_THRESHOLD: f32 = 0.3;
/// Downward impulse applied when the pet is dropped (positive y is down).
pub const INITIAL_DROP_VELOCITY: f32 = 250.0;
/// Velocity to squish conversion.
const SQUISH_PER_VELOCITY: f32 = 0.002;

/// Vertical spring bounce around a base line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LandingSpring {
    pub base_y: f32,
    pub offset: f32,
    pub velocity: f32,
}

impl LandingSpring {
    /// Start a bounce with the drop impulse.
    pub fn drop_at(base_y: f32) -> Self {
        Self {
            base_y,
            offset: 0.0,
            velocity: INITIAL_DROP_VELOCITY,
        }
    }

    /// Semi-implicit Euler step. Returns true once the bounce has settled,
    /// in which case the offset is snapped to zero.
    pub fn step(&mut self, dt_ms: f32) -> bool {
        let dt = dt_ms / 1000.0;
        let accel = -SPRING_STIFFNESS * self.offset - SPRING_DAMPING * self.velocity;
        self.velocity += accel * dt;
        self.offset += self.velocity * dt;

        if self.offset.abs() < BOUNCE_THRESHOLD && self.velocity.abs() < BOUNCE_THRESHOLD {
            self.offset = 0.0;
            self.velocity = 0.0;
            return true;
        }
        false
    }

    pub fn y(&self) -> f32 {
        self.base_y + self.offset
    }

    /// Falling compresses, rising stretches.
    pub fn squish(&self) -> f32 {
        (1.0 - self.velocity * SQUISH_PER_VELOCITY).clamp(SQUISH_MIN, SQUISH_MAX)
    }
}

/// `amplitude * sin(2π · hz · t)`, with `t` in milliseconds.
pub fn wave(time_ms: f32, hz: f32, amplitude: f32) -> f32 {
    (time_ms * hz / 1000.0 * TAU).sin() * amplitude
}

/// Hop height and squish for the play bounce. `hops_per_sec` counts
/// half-periods, so the pet lands that many times per second.
pub fn hop(time_ms: f32, hops_per_sec: f32, height: f32, squish_amount: f32) -> (f32, f32) {
    let phase = time_ms * hops_per_sec / 1000.0 * PI;
    (phase.sin().abs() * height, 1.0 + phase.sin() * squish_amount)
}
