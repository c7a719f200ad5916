/// Largest delta still shown as a change. Bigger jumps are loads, not events.
const DEFAULT_THRESHOLD: f32 = 50.0;
/// How long a change stays visible (ms).
const DEFAULT_DISPLAY_MS: f32 = 1500.0;

/// Tracks one stat and surfaces small recent changes for a floating
/// "+5" / "-10" indicator.
#[derive(Debug, Clone)]
pub struct StatChangeDetector {
    prev: f32,
    threshold: f32,
    display_ms: f32,
    change: Option<f32>,
    shown_for: f32,
}

impl StatChangeDetector {
    pub fn new(initial: f32) -> Self {
        Self::with_limits(initial, DEFAULT_THRESHOLD, DEFAULT_DISPLAY_MS)
    }

    pub fn with_limits(initial: f32, threshold: f32, display_ms: f32) -> Self {
        Self {
            prev: initial,
            threshold,
            display_ms,
            change: None,
            shown_for: 0.0,
        }
    }

    /// Feed the latest value. `dt` is ms since the previous call.
    pub fn observe(&mut self, value: f32, dt: f32) -> Option<f32> {
        let diff = value - self.prev;
        self.prev = value;

        if diff != 0.0 && diff.abs() < self.threshold {
            self.change = Some(diff);
            self.shown_for = 0.0;
        } else if self.change.is_some() {
            self.shown_for += dt;
            if self.shown_for >= self.display_ms {
                self.change = None;
            }
        }
        self.change
    }

    pub fn current(&self) -> Option<f32> {
        self.change
    }
}
