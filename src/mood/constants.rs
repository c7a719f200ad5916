pub const MINUTE_MS: i64 = 60 * 1000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

pub const MIN_STAT: f32 = 0.0;
pub const MAX_STAT: f32 = 100.0;

/// Fresh pet defaults.
pub const DEFAULT_HAPPINESS: f32 = 70.0;
pub const DEFAULT_ENERGY: f32 = 80.0;

/// Persisted record layout version.
pub const MOOD_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Decay
// ---------------------------------------------------------------------------

/// Default period of the mood tick.
pub const DECAY_CHECK_INTERVAL_MS: i64 = MINUTE_MS;
/// Random quiet window after an interaction before passive decay starts.
pub const DECAY_START_DELAY_MIN_MS: i64 = 10 * MINUTE_MS;
pub const DECAY_START_DELAY_MAX_MS: i64 = 60 * MINUTE_MS;

pub const HAPPINESS_DECAY_RATE: f32 = 0.5;
pub const ENERGY_DECAY_RATE: f32 = 0.3;

/// Offline decay runs at half rate, capped at a day's worth.
pub const OFFLINE_DECAY_MULTIPLIER: f32 = 0.5;
pub const MAX_OFFLINE_DECAY_MS: i64 = 24 * HOUR_MS;
/// Gaps shorter than this are not treated as offline time.
pub const MIN_OFFLINE_GAP_MS: i64 = MINUTE_MS;

// ---------------------------------------------------------------------------
// Sleep
// ---------------------------------------------------------------------------

pub const AWAKE_DURATION_MIN_MS: i64 = HOUR_MS;
pub const AWAKE_DURATION_MAX_MS: i64 = 3 * HOUR_MS;

pub const SLEEP_DURATION_MIN_MS: i64 = 10 * MINUTE_MS;
pub const SLEEP_DURATION_MAX_MS: i64 = 30 * MINUTE_MS;

pub const ENERGY_RESTORE_PER_MINUTE: f32 = 2.0;
pub const HAPPINESS_BOOST_ON_WAKE: f32 = 5.0;

/// Below this energy the pet falls asleep regardless of schedule.
pub const FORCED_SLEEP_ENERGY_THRESHOLD: f32 = 10.0;
/// Disturbing a sleeping pet below this energy makes it grumpy.
pub const GRUMPY_WAKE_ENERGY_THRESHOLD: f32 = 30.0;

// ---------------------------------------------------------------------------
// Level thresholds
// ---------------------------------------------------------------------------

pub const MOOD_DEPRESSED: f32 = 20.0;
pub const MOOD_SAD: f32 = 40.0;
pub const MOOD_NEUTRAL: f32 = 60.0;
pub const MOOD_HAPPY: f32 = 80.0;

pub const ENERGY_EXHAUSTED: f32 = 10.0;
pub const ENERGY_TIRED: f32 = 30.0;
pub const ENERGY_NORMAL: f32 = 55.0;
pub const ENERGY_ENERGETIC: f32 = 75.0;

/// Uniform sample in `[min, max)` milliseconds.
pub fn random_ms(rng: &mut fastrand::Rng, min: i64, max: i64) -> i64 {
    if max <= min {
        return min;
    }
    rng.i64(min..max)
}
