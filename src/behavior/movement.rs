use glam::Vec2;

use super::state::ScreenBounds;

/// Walk speed in pixels/second.
pub const WANDER_SPEED: f32 = 30.0;
/// Run speed in pixels/second.
pub const RUN_SPEED: f32 = 180.0;
/// Speed multiplier while tired.
pub const TIRED_SPEED_MULTIPLIER: f32 = 0.6;

/// Base wander distance band in pixels.
pub const WANDER_DISTANCE_MIN: f32 = 80.0;
pub const WANDER_DISTANCE_MAX: f32 = 150.0;
/// Distance band multiplier for a run.
pub const RUN_DISTANCE_MULTIPLIER: f32 = 3.0;
/// Distance band multiplier while tired.
pub const TIRED_DISTANCE_MULTIPLIER: f32 = 0.6;
/// Targets closer than this are rerolled.
pub const MIN_TARGET_DISTANCE: f32 = 20.0;
const MAX_TARGET_ATTEMPTS: usize = 5;

/// Within this distance the target counts as reached.
pub const ARRIVE_DISTANCE: f32 = 5.0;
/// A running pet starts braking this close to its target.
pub const RUN_BRAKE_DISTANCE: f32 = 30.0;

/// How far the next wander will go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stride {
    Tired,
    Walk,
    Run,
}

impl Stride {
    fn multiplier(self) -> f32 {
        match self {
            Stride::Tired => TIRED_DISTANCE_MULTIPLIER,
            Stride::Walk => 1.0,
            Stride::Run => RUN_DISTANCE_MULTIPLIER,
        }
    }
}

/// Pick a wander target at a random angle. A run may aim past the screen
/// edge; a walk needs at least [`MIN_TARGET_DISTANCE`] of travel left after
/// clamping. Returns `None` when every attempt is degenerate.
pub fn pick_target(
    rng: &mut fastrand::Rng,
    from: Vec2,
    stride: Stride,
    bounds: &ScreenBounds,
) -> Option<Vec2> {
    let mult = stride.multiplier();
    let (min, max) = (WANDER_DISTANCE_MIN * mult, WANDER_DISTANCE_MAX * mult);

    for _ in 0..MAX_TARGET_ATTEMPTS {
        let angle = rng.f32() * std::f32::consts::TAU;
        let distance = min + rng.f32() * (max - min);
        let target = from + Vec2::new(angle.cos(), angle.sin()) * distance;

        let reach = match stride {
            Stride::Run => target,
            Stride::Walk | Stride::Tired => bounds.clamp(target),
        };
        if reach.distance(from) >= MIN_TARGET_DISTANCE {
            return Some(target);
        }
    }
    None
}

/// One step of at most `speed * dt` toward `target`. Never overshoots.
pub fn step_toward(from: Vec2, target: Vec2, speed: f32, dt_ms: f32) -> Vec2 {
    let delta = target - from;
    let distance = delta.length();
    if distance <= f32::EPSILON {
        return target;
    }
    let ratio = (speed * dt_ms / 1000.0 / distance).min(1.0);
    from + delta * ratio
}

/// True when an unclamped step lands on or past an edge it was heading for.
pub fn runs_into_edge(next: Vec2, delta: Vec2, bounds: &ScreenBounds) -> bool {
    (next.x <= 0.0 && delta.x < 0.0)
        || (next.x >= bounds.width && delta.x > 0.0)
        || (next.y <= 0.0 && delta.y < 0.0)
        || (next.y >= bounds.height && delta.y > 0.0)
}

/// True when a clamped position sits on an edge in the direction of travel.
pub fn at_edge(pos: Vec2, delta: Vec2, bounds: &ScreenBounds) -> bool {
    (pos.x <= 0.0 && delta.x < 0.0)
        || (pos.x >= bounds.width && delta.x > 0.0)
        || (pos.y <= 0.0 && delta.y < 0.0)
        || (pos.y >= bounds.height && delta.y > 0.0)
}
