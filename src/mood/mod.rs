pub mod change;
pub mod constants;
pub mod interactions;
pub mod levels;
pub mod store;
pub mod types;

use std::collections::HashMap;

use crate::clock::Clock;
use constants::*;
use interactions::{Interaction, InteractionTable};
use levels::{EnergyLevel, MoodLevel};
use store::MoodStore;
use types::{InteractionCounts, MoodStats, PetMoodState};

/// Why an interaction was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    UnknownInteraction,
    Sleeping,
    Cooldown { remaining_ms: i64 },
    DailyLimit,
    LowEnergy,
}

/// Handle returned by [`MoodService::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&PetMoodState)>;

/// Happiness/energy drop for an offline gap, or `None` if the gap is too
/// short to count.
pub fn offline_decay(gap_ms: i64) -> Option<(f32, f32)> {
    let capped = gap_ms.min(MAX_OFFLINE_DECAY_MS);
    if capped < MIN_OFFLINE_GAP_MS {
        return None;
    }
    let minutes = capped as f32 / MINUTE_MS as f32;
    Some((
        minutes * HAPPINESS_DECAY_RATE * OFFLINE_DECAY_MULTIPLIER,
        minutes * ENERGY_DECAY_RATE * OFFLINE_DECAY_MULTIPLIER,
    ))
}

/// Sole writer of the mood record. Readers poll snapshots or subscribe.
pub struct MoodService {
    state: PetMoodState,
    table: InteractionTable,
    clock: Box<dyn Clock>,
    store: Box<dyn MoodStore>,
    rng: fastrand::Rng,

    listeners: HashMap<ListenerId, Listener>,
    next_listener: u64,

    /// Last successful trigger per interaction id. Session-only.
    cooldowns: HashMap<String, i64>,
    /// Quiet window after an interaction before decay kicks in.
    decay_delay_ms: i64,
    quiet_time_start: Option<i64>,

    tick_interval_ms: i64,
    /// `Some` while the periodic tick is running.
    last_tick: Option<i64>,
    initialized: bool,
}

impl MoodService {
    pub fn new(clock: Box<dyn Clock>, store: Box<dyn MoodStore>) -> Self {
        let mut rng = fastrand::Rng::new();
        let now = clock.now_ms();
        let state = PetMoodState::new_default(now, clock.today(), &mut rng);
        let decay_delay_ms = random_ms(&mut rng, DECAY_START_DELAY_MIN_MS, DECAY_START_DELAY_MAX_MS);
        Self {
            state,
            table: InteractionTable::default(),
            clock,
            store,
            rng,
            listeners: HashMap::new(),
            next_listener: 0,
            cooldowns: HashMap::new(),
            decay_delay_ms,
            quiet_time_start: None,
            tick_interval_ms: DECAY_CHECK_INTERVAL_MS,
            last_tick: None,
            initialized: false,
        }
    }

    pub fn with_table(mut self, table: InteractionTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_tick_interval(mut self, interval_ms: i64) -> Self {
        self.tick_interval_ms = interval_ms.max(1);
        self
    }

    /// Reseed for reproducible runs. Re-rolls the session decay delay.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self.decay_delay_ms =
            random_ms(&mut self.rng, DECAY_START_DELAY_MIN_MS, DECAY_START_DELAY_MAX_MS);
        self
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Load (or create) the record, catch up on time spent closed, start the
    /// periodic tick, then notify and save. Runs once; later calls are no-ops.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        match self.store.load() {
            Ok(Some(loaded)) => {
                log::info!(
                    "Loaded mood: happiness {:.1}, energy {:.1}, sleeping {}",
                    loaded.stats.happiness,
                    loaded.stats.energy,
                    loaded.sleep.is_sleeping
                );
                self.state = loaded;
                self.state.stats.apply(0.0, 0.0);
                self.check_new_day();
                self.apply_offline_decay();
            }
            Ok(None) => {
                log::info!("No saved mood, starting fresh");
                self.check_new_day();
            }
            Err(e) => {
                log::warn!("Failed to load mood, starting fresh: {e}");
                self.check_new_day();
            }
        }

        self.process_overdue_sleep();

        let now = self.clock.now_ms();
        self.cooldowns.clear();
        self.quiet_time_start = Some(now);
        self.last_tick = Some(now);
        self.initialized = true;

        self.notify();
        self.save_mood();
    }

    /// Stop the periodic tick and write a final snapshot.
    pub fn destroy(&mut self) {
        self.last_tick = None;
        self.save_mood();
    }

    pub fn is_running(&self) -> bool {
        self.last_tick.is_some()
    }

    /// Stamp `appLastClosed` and hand the record to the store. Failures are
    /// logged; the in-memory state stays authoritative.
    pub fn save_mood(&mut self) {
        self.state.timestamps.app_last_closed = self.clock.now_ms();
        if let Err(e) = self.store.save(&self.state) {
            log::warn!("Failed to save mood: {e}");
        }
    }

    fn apply_offline_decay(&mut self) {
        let now = self.clock.now_ms();
        let gap = now - self.state.timestamps.app_last_closed;
        let Some((happiness_drop, energy_drop)) = offline_decay(gap) else {
            return;
        };
        self.state.stats.apply(-happiness_drop, -energy_drop);
        self.state.timestamps.last_interaction = now;
        log::info!(
            "Offline for {} min: happiness -{:.1}, energy -{:.1}",
            gap / MINUTE_MS,
            happiness_drop,
            energy_drop
        );
    }

    /// Reset per-day counters when the calendar date changed.
    fn check_new_day(&mut self) {
        let today = self.clock.today();
        if self.state.interaction_counts.today_date != today {
            log::debug!("New day {today}, resetting daily counters");
            self.state.interaction_counts = InteractionCounts::fresh(today);
        }
    }

    /// Wake a pet whose nap ended while the app was closed.
    fn process_overdue_sleep(&mut self) {
        let now = self.clock.now_ms();
        let sleep = self.state.sleep;
        if !sleep.is_sleeping {
            return;
        }
        match sleep.scheduled_wake_time {
            Some(wake_at) if now >= wake_at => {
                let slept = wake_at - sleep.sleep_start_time.unwrap_or(wake_at);
                self.wake_up(slept);
            }
            Some(_) => {}
            None => {
                log::warn!("Sleeping record without a wake time, waking now");
                self.wake_up(0);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Periodic tick
    // -----------------------------------------------------------------------

    pub fn tick_interval_ms(&self) -> i64 {
        self.tick_interval_ms
    }

    pub fn is_tick_due(&self) -> bool {
        match self.last_tick {
            Some(last) => self.clock.now_ms() - last >= self.tick_interval_ms,
            None => false,
        }
    }

    /// Run the tick if the interval has elapsed. Returns whether it ran.
    pub fn poll(&mut self) -> bool {
        if self.is_tick_due() {
            self.tick();
            true
        } else {
            false
        }
    }

    /// One scheduler step: decay, sleep cycle, quiet-time bonus.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        let elapsed = self.last_tick.map_or(self.tick_interval_ms, |last| now - last).max(0);
        if self.last_tick.is_some() {
            self.last_tick = Some(now);
        }

        self.check_new_day();
        self.process_decay(elapsed);
        self.process_sleep_cycle();
        self.process_quiet_time();
    }

    fn process_decay(&mut self, elapsed_ms: i64) {
        if self.state.sleep.is_sleeping || elapsed_ms == 0 {
            return;
        }
        let now = self.clock.now_ms();
        if now - self.state.timestamps.last_interaction < self.decay_delay_ms {
            return;
        }

        let minutes = elapsed_ms as f32 / MINUTE_MS as f32;
        self.state.stats.apply(
            -minutes * HAPPINESS_DECAY_RATE,
            -minutes * ENERGY_DECAY_RATE,
        );
        self.notify();
        self.save_mood();
    }

    fn process_sleep_cycle(&mut self) {
        let now = self.clock.now_ms();
        let sleep = self.state.sleep;

        if sleep.is_sleeping {
            if let Some(wake_at) = sleep.scheduled_wake_time {
                if now >= wake_at {
                    let slept = now - sleep.sleep_start_time.unwrap_or(now);
                    self.wake_up(slept);
                }
            }
        } else if now >= sleep.next_sleep_time
            || self.state.stats.energy < FORCED_SLEEP_ENERGY_THRESHOLD
        {
            self.start_sleep();
        }
    }

    fn process_quiet_time(&mut self) {
        if self.state.sleep.is_sleeping {
            return;
        }
        let Some(start) = self.quiet_time_start else {
            return;
        };
        let Some(quiet) = self.table.get("quietTime").cloned() else {
            return;
        };

        let now = self.clock.now_ms();
        if now - start >= quiet.cooldown_ms {
            self.state.stats.apply(quiet.happiness_change, quiet.energy_change);
            self.quiet_time_start = Some(now);
            log::debug!("Quiet time bonus applied");
            self.notify();
            self.save_mood();
        }
    }

    fn start_sleep(&mut self) {
        let now = self.clock.now_ms();
        let duration = random_ms(&mut self.rng, SLEEP_DURATION_MIN_MS, SLEEP_DURATION_MAX_MS);
        self.state.sleep.is_sleeping = true;
        self.state.sleep.sleep_start_time = Some(now);
        self.state.sleep.scheduled_wake_time = Some(now + duration);
        self.state.sleep.next_sleep_time = 0;
        log::info!(
            "Pet fell asleep (energy {:.1}) for {} min",
            self.state.stats.energy,
            duration / MINUTE_MS
        );
        self.notify();
        self.save_mood();
    }

    /// Restore energy for `slept_ms` of sleep, add the wake-up boost, and
    /// schedule the next nap.
    fn wake_up(&mut self, slept_ms: i64) {
        let now = self.clock.now_ms();
        let slept_minutes = slept_ms.max(0) as f32 / MINUTE_MS as f32;
        self.state.stats.apply(
            HAPPINESS_BOOST_ON_WAKE,
            slept_minutes * ENERGY_RESTORE_PER_MINUTE,
        );

        self.state.sleep.is_sleeping = false;
        self.state.sleep.sleep_start_time = None;
        self.state.sleep.scheduled_wake_time = None;
        self.state.sleep.next_sleep_time =
            now + random_ms(&mut self.rng, AWAKE_DURATION_MIN_MS, AWAKE_DURATION_MAX_MS);
        self.state.timestamps.last_sleep_end = now;

        log::info!(
            "Pet woke up after {:.0} min (energy {:.1})",
            slept_minutes,
            self.state.stats.energy
        );
        self.notify();
        self.save_mood();
    }

    /// Wake a sleeping pet right away, e.g. when it is picked up.
    /// Returns whether it was asleep.
    pub fn force_wake_up(&mut self) -> bool {
        if !self.state.sleep.is_sleeping {
            return false;
        }
        let now = self.clock.now_ms();
        let slept = now - self.state.sleep.sleep_start_time.unwrap_or(now);
        self.wake_up(slept);
        true
    }

    // -----------------------------------------------------------------------
    // Interactions
    // -----------------------------------------------------------------------

    /// Apply interaction `id` if every gate passes.
    pub fn trigger_interaction(&mut self, id: &str) -> bool {
        self.try_interaction(id).is_ok()
    }

    /// Like [`trigger_interaction`](Self::trigger_interaction) but reports
    /// which gate refused. A denial changes nothing.
    pub fn try_interaction(&mut self, id: &str) -> Result<(), Denial> {
        let Some(interaction) = self.table.get(id).cloned() else {
            log::warn!("Unknown interaction: {id}");
            return Err(Denial::UnknownInteraction);
        };

        let result = self.check_gates(&interaction);
        if let Err(denial) = result {
            log::debug!("Interaction {id} denied: {denial:?}");
            return result;
        }

        let now = self.clock.now_ms();
        self.state
            .stats
            .apply(interaction.happiness_change, interaction.energy_change);
        self.cooldowns.insert(interaction.id.clone(), now);
        self.check_new_day();
        self.state.interaction_counts.record(&interaction.id);
        self.state.timestamps.last_interaction = now;
        self.quiet_time_start = Some(now);
        self.decay_delay_ms =
            random_ms(&mut self.rng, DECAY_START_DELAY_MIN_MS, DECAY_START_DELAY_MAX_MS);

        log::debug!(
            "Interaction {id} applied: happiness {:.1}, energy {:.1}",
            self.state.stats.happiness,
            self.state.stats.energy
        );

        if interaction.triggers_sleep && !self.state.sleep.is_sleeping {
            self.start_sleep();
        }

        self.notify();
        self.save_mood();
        Ok(())
    }

    fn check_gates(&self, interaction: &Interaction) -> Result<(), Denial> {
        if self.state.sleep.is_sleeping && interaction.id != "lullaby" {
            return Err(Denial::Sleeping);
        }

        let now = self.clock.now_ms();
        if let Some(&last) = self.cooldowns.get(&interaction.id) {
            let since = now - last;
            if since < interaction.cooldown_ms {
                return Err(Denial::Cooldown {
                    remaining_ms: interaction.cooldown_ms - since,
                });
            }
        }

        if let Some(limit) = interaction.daily_limit {
            let used = self
                .state
                .interaction_counts
                .count_on(&self.clock.today(), &interaction.id);
            if used >= limit {
                return Err(Denial::DailyLimit);
            }
        }

        if let Some(required) = interaction.energy_required {
            if self.state.stats.energy < required {
                return Err(Denial::LowEnergy);
            }
        }

        Ok(())
    }

    /// True until today's morning greeting has been used.
    pub fn can_trigger_morning_greeting(&self) -> bool {
        self.state
            .interaction_counts
            .count_on(&self.clock.today(), "morningGreeting")
            == 0
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    pub fn subscribe(&mut self, listener: impl FnMut(&PetMoodState) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn notify(&mut self) {
        for listener in self.listeners.values_mut() {
            listener(&self.state);
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> &PetMoodState {
        &self.state
    }

    pub fn stats(&self) -> MoodStats {
        self.state.stats
    }

    pub fn is_sleeping(&self) -> bool {
        self.state.sleep.is_sleeping
    }

    pub fn mood_level(&self) -> MoodLevel {
        MoodLevel::from_happiness(self.state.stats.happiness)
    }

    pub fn energy_level(&self) -> EnergyLevel {
        EnergyLevel::from_energy(self.state.stats.energy)
    }

    pub fn table(&self) -> &InteractionTable {
        &self.table
    }

    pub fn decay_delay_ms(&self) -> i64 {
        self.decay_delay_ms
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}
