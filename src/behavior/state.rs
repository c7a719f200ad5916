use glam::Vec2;

/// Squish is clamped to this range so the sprite never inverts.
pub const SQUISH_MIN: f32 = 0.7;
pub const SQUISH_MAX: f32 = 1.3;

/// Current behavior state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorState {
    Idle,
    Wandering,
    BeingDragged,
    Reacting,
    Landing,
    Listening,
    Rejecting,
    Talking,
    Eating,
    Dancing,
    Yawning,
    Waking,
    GrumpyWaking,
    Playing,
    Shaking,
    Accelerating,
    SlowingDown,
    Stumbling,
    Crying,
    /// Not reachable from any trigger; kept so older callers can still force it.
    Hurt,
    Sleeping,
}

impl BehaviorState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Wandering => "wandering",
            Self::BeingDragged => "being_dragged",
            Self::Reacting => "reacting",
            Self::Landing => "landing",
            Self::Listening => "listening",
            Self::Rejecting => "rejecting",
            Self::Talking => "talking",
            Self::Eating => "eating",
            Self::Dancing => "dancing",
            Self::Yawning => "yawning",
            Self::Waking => "waking",
            Self::GrumpyWaking => "grumpy_waking",
            Self::Playing => "playing",
            Self::Shaking => "shaking",
            Self::Accelerating => "accelerating",
            Self::SlowingDown => "slowing_down",
            Self::Stumbling => "stumbling",
            Self::Crying => "crying",
            Self::Hurt => "hurt",
            Self::Sleeping => "sleeping",
        }
    }

    /// States from which a fun reaction (eat, dance, play, shake) may start.
    pub fn accepts_activity(self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Wandering | Self::Landing | Self::Reacting
        )
    }
}

/// Sprite animation to play. Several states pick a variant from the
/// current mood, so this is not a 1:1 mapping of [`BehaviorState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationType {
    Idle,
    IdleHappy,
    IdleEcstatic,
    IdleTired,
    Sad,
    Walk,
    WalkTired,
    Run,
    RunStart,
    RunStop,
    Stumble,
    Cry,
    Hurt,
    Sleep,
    Happy,
    Talk,
    Curious,
    Drag,
    Reject,
    Angry,
    Eat,
    Dance,
    Yawn,
    Wake,
}

impl AnimationType {
    /// Sprite sheet key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::IdleHappy => "idle_happy",
            Self::IdleEcstatic => "idle_ecstatic",
            Self::IdleTired => "idle_tired",
            Self::Sad => "sad",
            Self::Walk => "walk",
            Self::WalkTired => "walk_tired",
            Self::Run => "run",
            Self::RunStart => "run_start",
            Self::RunStop => "run_stop",
            Self::Stumble => "stumble",
            Self::Cry => "cry",
            Self::Hurt => "hurt",
            Self::Sleep => "sleep",
            Self::Happy => "happy",
            Self::Talk => "talk",
            Self::Curious => "curious",
            Self::Drag => "drag",
            Self::Reject => "reject",
            Self::Angry => "angry",
            Self::Eat => "eat",
            Self::Dance => "dance",
            Self::Yawn => "yawn",
            Self::Wake => "wake",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    /// Facing for a horizontal movement delta.
    pub fn from_dx(dx: f32) -> Self {
        if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}

/// Usable screen area: screen size minus the pet window footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub width: f32,
    pub height: f32,
}

impl ScreenBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Bounds for a window of `pet_size` on a `screen_w` × `screen_h` display.
    pub fn for_screen(screen_w: f32, screen_h: f32, pet_size: f32) -> Self {
        Self::new(screen_w - pet_size, screen_h - pet_size)
    }

    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(pos.x.clamp(0.0, self.width), pos.y.clamp(0.0, self.height))
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorResult {
    pub position: Vec2,
    pub animation: AnimationType,
    pub direction: Direction,
    /// Vertical scale; horizontal is `1 / squish_factor`.
    pub squish_factor: f32,
    pub is_rejecting: bool,
}

impl BehaviorResult {
    pub fn new(position: Vec2, animation: AnimationType, direction: Direction) -> Self {
        Self {
            position,
            animation,
            direction,
            squish_factor: 1.0,
            is_rejecting: false,
        }
    }

    pub fn with_squish(mut self, squish: f32) -> Self {
        self.squish_factor = squish.clamp(SQUISH_MIN, SQUISH_MAX);
        self
    }

    pub fn rejecting(mut self) -> Self {
        self.is_rejecting = true;
        self
    }

    /// `(scale_x, scale_y)`, volume preserving.
    pub fn scale(&self) -> (f32, f32) {
        (1.0 / self.squish_factor, self.squish_factor)
    }

    /// Window position in whole pixels.
    pub fn window_position(&self) -> (i32, i32) {
        (self.position.x.round() as i32, self.position.y.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squish_is_clamped_and_volume_preserving() {
        let r = BehaviorResult::new(Vec2::ZERO, AnimationType::Idle, Direction::Right)
            .with_squish(2.0);
        assert_eq!(r.squish_factor, SQUISH_MAX);
        let (sx, sy) = r.scale();
        assert!((sx * sy - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bounds_clamp() {
        let b = ScreenBounds::for_screen(1920.0, 1080.0, 100.0);
        assert_eq!(b.clamp(Vec2::new(-5.0, 2000.0)), Vec2::new(0.0, 980.0));
    }

    #[test]
    fn window_position_rounds() {
        let r = BehaviorResult::new(Vec2::new(10.6, 3.4), AnimationType::Walk, Direction::Left);
        assert_eq!(r.window_position(), (11, 3));
    }
}
