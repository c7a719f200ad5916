use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::constants::*;

/// Happiness and energy, each kept inside `[MIN_STAT, MAX_STAT]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodStats {
    pub happiness: f32,
    pub energy: f32,
}

impl MoodStats {
    /// Add signed deltas, clamping both stats into range.
    pub fn apply(&mut self, happiness_change: f32, energy_change: f32) {
        self.happiness = clamp_stat(self.happiness + happiness_change);
        self.energy = clamp_stat(self.energy + energy_change);
    }
}

impl Default for MoodStats {
    fn default() -> Self {
        Self {
            happiness: DEFAULT_HAPPINESS,
            energy: DEFAULT_ENERGY,
        }
    }
}

pub fn clamp_stat(v: f32) -> f32 {
    if v.is_nan() {
        return MIN_STAT;
    }
    v.clamp(MIN_STAT, MAX_STAT)
}

/// Unix-ms timestamps used for decay bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodTimestamps {
    pub last_interaction: i64,
    pub last_sleep_end: i64,
    /// Refreshed right before every save.
    pub app_last_closed: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepState {
    pub is_sleeping: bool,
    pub sleep_start_time: Option<i64>,
    /// Always set while sleeping.
    pub scheduled_wake_time: Option<i64>,
    /// When the pet next gets sleepy. Zero while asleep.
    pub next_sleep_time: i64,
}

/// Per-calendar-day counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionCounts {
    /// `YYYY-MM-DD`
    pub today_date: String,
    pub treats: u32,
    pub morning_greeting: bool,
    /// Uses of every other interaction, keyed by id.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub other: HashMap<String, u32>,
}

impl InteractionCounts {
    pub fn fresh(today: String) -> Self {
        Self {
            today_date: today,
            treats: 0,
            morning_greeting: false,
            other: HashMap::new(),
        }
    }

    /// Successful uses of `id` on the recorded day.
    pub fn count(&self, id: &str) -> u32 {
        match id {
            "treat" => self.treats,
            "morningGreeting" => u32::from(self.morning_greeting),
            _ => self.other.get(id).copied().unwrap_or(0),
        }
    }

    /// Uses of `id` on `today`. A stale record counts as zero.
    pub fn count_on(&self, today: &str, id: &str) -> u32 {
        if self.today_date == today {
            self.count(id)
        } else {
            0
        }
    }

    pub fn record(&mut self, id: &str) {
        match id {
            "treat" => self.treats += 1,
            "morningGreeting" => self.morning_greeting = true,
            _ => *self.other.entry(id.to_string()).or_default() += 1,
        }
    }
}

/// The unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetMoodState {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub stats: MoodStats,
    #[serde(default)]
    pub timestamps: MoodTimestamps,
    #[serde(default)]
    pub sleep: SleepState,
    #[serde(default)]
    pub interaction_counts: InteractionCounts,
}

fn default_version() -> u32 {
    MOOD_SCHEMA_VERSION
}

impl PetMoodState {
    /// A brand new pet, awake, with its first nap scheduled 1-3 hours out.
    pub fn new_default(now: i64, today: String, rng: &mut fastrand::Rng) -> Self {
        Self {
            version: MOOD_SCHEMA_VERSION,
            stats: MoodStats::default(),
            timestamps: MoodTimestamps {
                last_interaction: now,
                last_sleep_end: now,
                app_last_closed: now,
            },
            sleep: SleepState {
                is_sleeping: false,
                sleep_start_time: None,
                scheduled_wake_time: None,
                next_sleep_time: now
                    + random_ms(rng, AWAKE_DURATION_MIN_MS, AWAKE_DURATION_MAX_MS),
            },
            interaction_counts: InteractionCounts::fresh(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_clamp_on_apply() {
        let mut stats = MoodStats {
            happiness: 95.0,
            energy: 3.0,
        };
        stats.apply(20.0, -10.0);
        assert_eq!(stats.happiness, MAX_STAT);
        assert_eq!(stats.energy, MIN_STAT);
    }

    #[test]
    fn default_state_is_awake_with_future_nap() {
        let mut rng = fastrand::Rng::with_seed(7);
        let s = PetMoodState::new_default(1_000, "2024-03-01".into(), &mut rng);
        assert!(!s.sleep.is_sleeping);
        assert!(s.sleep.next_sleep_time >= 1_000 + AWAKE_DURATION_MIN_MS);
        assert!(s.sleep.next_sleep_time < 1_000 + AWAKE_DURATION_MAX_MS);
        assert_eq!(s.stats.happiness, 70.0);
        assert_eq!(s.stats.energy, 80.0);
    }

    #[test]
    fn serializes_camel_case_record() {
        let mut rng = fastrand::Rng::with_seed(1);
        let s = PetMoodState::new_default(0, "2024-03-01".into(), &mut rng);
        let json = serde_json::to_value(&s).unwrap();
        assert!(json["timestamps"]["appLastClosed"].is_number());
        assert!(json["sleep"]["isSleeping"].is_boolean());
        assert_eq!(json["interactionCounts"]["todayDate"], "2024-03-01");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s: PetMoodState =
            serde_json::from_str(r#"{"stats":{"happiness":12.0,"energy":40.0}}"#).unwrap();
        assert_eq!(s.version, MOOD_SCHEMA_VERSION);
        assert_eq!(s.stats.happiness, 12.0);
        assert!(!s.sleep.is_sleeping);
    }
}
