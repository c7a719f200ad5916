pub mod input;

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::behavior::{BehaviorResult, PetBehavior, ScreenBounds};
use crate::mood::change::StatChangeDetector;
use crate::mood::constants::GRUMPY_WAKE_ENERGY_THRESHOLD;
use crate::mood::MoodService;

pub use input::{contains_compliment, InputEvent, Modifiers, Shortcut};

/// Frame gap assumed before the first gap can be measured (ms).
pub const FIRST_FRAME_DT_MS: f32 = 16.0;

/// Receives the pet window position every frame.
pub trait WindowSink {
    fn move_window(&mut self, x: i32, y: i32);
}

/// One pet: behavior, mood and the wiring between them.
pub struct Companion {
    behavior: PetBehavior,
    mood: MoodService,
    /// Crashes reported by the behavior engine, drained each frame.
    hurts: Rc<Cell<u32>>,
    /// Pointer offset from the pet origin while a drag is active.
    drag_offset: Option<Vec2>,
    mic_enabled: bool,
    listening: bool,
    happiness_change: StatChangeDetector,
    energy_change: StatChangeDetector,
}

impl Companion {
    pub fn new(mut behavior: PetBehavior, mood: MoodService) -> Self {
        let hurts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hurts);
        behavior.set_on_hurt_callback(move || counter.set(counter.get() + 1));

        let stats = mood.stats();
        Self {
            behavior,
            mood,
            hurts,
            drag_offset: None,
            mic_enabled: true,
            listening: false,
            happiness_change: StatChangeDetector::new(stats.happiness),
            energy_change: StatChangeDetector::new(stats.energy),
        }
    }

    pub fn with_mic(mut self, enabled: bool) -> Self {
        self.mic_enabled = enabled;
        self
    }

    /// Load the mood record and push it into the behavior engine.
    pub fn initialize(&mut self) {
        self.mood.initialize();
        let stats = self.mood.stats();
        self.happiness_change = StatChangeDetector::new(stats.happiness);
        self.energy_change = StatChangeDetector::new(stats.energy);
        self.sync_mood();
    }

    /// Stop the mood timer and save.
    pub fn shutdown(&mut self) {
        self.mood.destroy();
    }

    // -----------------------------------------------------------------------
    // Frame
    // -----------------------------------------------------------------------

    /// Run one frame. `dt_ms` is the gap since the previous frame, `None`
    /// on the first one.
    pub fn frame(&mut self, dt_ms: Option<f32>, sink: &mut dyn WindowSink) -> BehaviorResult {
        let dt = dt_ms.unwrap_or(FIRST_FRAME_DT_MS);

        self.mood.poll();
        self.sync_mood();
        let result = self.behavior.update(dt);

        for _ in 0..self.hurts.replace(0) {
            self.mood.trigger_interaction("hurt");
        }

        let stats = self.mood.stats();
        self.happiness_change.observe(stats.happiness, dt);
        self.energy_change.observe(stats.energy, dt);

        let (x, y) = result.window_position();
        sink.move_window(x, y);
        result
    }

    fn sync_mood(&mut self) {
        let stats = self.mood.stats();
        self.behavior.set_mood_sleeping(self.mood.is_sleeping());
        self.behavior.set_happiness(stats.happiness);
        self.behavior.set_energy(stats.energy);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown(at) => self.pointer_down(at),
            InputEvent::PointerMove(at) => {
                if let Some(offset) = self.drag_offset {
                    self.behavior.set_position(at - offset);
                }
            }
            InputEvent::PointerUp(at) => {
                if let Some(offset) = self.drag_offset.take() {
                    self.behavior.on_drag_end(at - offset);
                    self.mood.trigger_interaction("drag");
                }
            }
            InputEvent::Click => self.click(),
            InputEvent::Key { key, modifiers } => self.key(key, modifiers),
            InputEvent::ListeningEnd => {
                self.listening = false;
                self.behavior.on_listening_end();
            }
            InputEvent::Response { text, transcript } => {
                self.mood.trigger_interaction("voiceChat");
                self.behavior.on_talk_start();
                let said = transcript.as_deref().unwrap_or(&text);
                if contains_compliment(said) {
                    self.mood.trigger_interaction("compliment");
                }
            }
            InputEvent::ResponseCleared => self.behavior.on_talk_end(),
        }
    }

    fn pointer_down(&mut self, at: Vec2) {
        let woke = self.mood.force_wake_up();
        if woke && self.mood.stats().energy < GRUMPY_WAKE_ENERGY_THRESHOLD {
            log::debug!("Woken while exhausted, refusing to be picked up");
            self.behavior.on_grumpy_wake();
            return;
        }
        self.drag_offset = Some(at - self.behavior.position());
        self.behavior.on_drag_start();
    }

    fn click(&mut self) {
        if self.drag_offset.is_some() {
            return;
        }
        if self.mood.can_trigger_morning_greeting() {
            self.mood.trigger_interaction("morningGreeting");
        }
        self.mood.trigger_interaction("pet");
        self.behavior.on_click();
    }

    fn key(&mut self, key: char, modifiers: Modifiers) {
        if modifiers.any() {
            return;
        }
        let Some(shortcut) = Shortcut::from_key(key) else {
            return;
        };
        if self.mood.is_sleeping() {
            return;
        }

        let Some(id) = shortcut.interaction_id() else {
            if self.mic_enabled && !self.listening {
                self.listening = true;
                self.behavior.on_listening_start();
            }
            return;
        };

        if !self.mood.trigger_interaction(id) {
            self.behavior.on_reject();
            return;
        }
        match shortcut {
            Shortcut::Treat => self.behavior.on_eat(),
            Shortcut::Dance => self.behavior.on_dance(),
            Shortcut::Catch => self.behavior.on_play(),
            Shortcut::Shake => self.behavior.on_shake(),
            // Lullaby shows up through the mood sync on the next frame.
            Shortcut::Lullaby | Shortcut::Listen => {}
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn set_screen_bounds(&mut self, bounds: ScreenBounds) {
        self.behavior.set_screen_bounds(bounds);
    }

    pub fn behavior(&self) -> &PetBehavior {
        &self.behavior
    }

    pub fn mood(&self) -> &MoodService {
        &self.mood
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Recent small happiness change, for a floating indicator.
    pub fn happiness_change(&self) -> Option<f32> {
        self.happiness_change.current()
    }

    pub fn energy_change(&self) -> Option<f32> {
        self.energy_change.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehaviorState;
    use crate::clock::ManualClock;
    use crate::mood::constants::MINUTE_MS;
    use crate::mood::store::MemoryStore;
    use crate::mood::types::PetMoodState;

    /// 2024-06-01T08:00:00Z
    const T0: i64 = 1_717_228_800_000;

    #[derive(Default)]
    struct RecordingSink(Vec<(i32, i32)>);

    impl WindowSink for RecordingSink {
        fn move_window(&mut self, x: i32, y: i32) {
            self.0.push((x, y));
        }
    }

    fn build(store: MemoryStore, clock: &ManualClock) -> Companion {
        let mood = MoodService::new(Box::new(clock.clone()), Box::new(store)).with_seed(1);
        let behavior =
            PetBehavior::with_seed(Vec2::new(400.0, 300.0), ScreenBounds::new(800.0, 600.0), 2);
        let mut companion = Companion::new(behavior, mood);
        companion.initialize();
        companion
    }

    fn fresh() -> (Companion, ManualClock, MemoryStore) {
        let clock = ManualClock::new(T0);
        let store = MemoryStore::new();
        (build(store.clone(), &clock), clock, store)
    }

    fn asleep_with_energy(energy: f32) -> (Companion, ManualClock) {
        let clock = ManualClock::new(T0);
        let mut rng = fastrand::Rng::with_seed(4);
        let mut state = PetMoodState::new_default(T0, "2024-06-01".into(), &mut rng);
        state.stats.energy = energy;
        state.sleep.is_sleeping = true;
        state.sleep.sleep_start_time = Some(T0);
        state.sleep.scheduled_wake_time = Some(T0 + 20 * MINUTE_MS);
        state.sleep.next_sleep_time = 0;
        let companion = build(MemoryStore::with_state(state), &clock);
        clock.advance(MINUTE_MS);
        (companion, clock)
    }

    fn frames(c: &mut Companion, ms: f32) {
        let mut sink = RecordingSink::default();
        let mut elapsed = 0.0;
        while elapsed < ms {
            c.frame(Some(16.0), &mut sink);
            elapsed += 16.0;
        }
    }

    #[test]
    fn first_frame_moves_window_to_rounded_position() {
        let (mut c, _, _) = fresh();
        let mut sink = RecordingSink::default();
        c.frame(None, &mut sink);
        assert_eq!(sink.0, vec![(400, 300)]);
    }

    #[test]
    fn treat_key_feeds_and_shows_change() {
        let (mut c, _, _) = fresh();
        c.handle(InputEvent::key('t'));
        assert_eq!(c.mood().stats().happiness, 80.0);
        assert_eq!(c.mood().stats().energy, 88.0);
        assert_eq!(c.behavior().state(), BehaviorState::Eating);

        frames(&mut c, 16.0);
        assert_eq!(c.happiness_change(), Some(10.0));
        assert_eq!(c.energy_change(), Some(8.0));
    }

    #[test]
    fn denied_key_plays_reject() {
        let (mut c, _, _) = fresh();
        c.handle(InputEvent::key('t'));
        frames(&mut c, 3_200.0);
        assert_eq!(c.behavior().state(), BehaviorState::Idle);

        c.handle(InputEvent::key('T'));
        assert_eq!(c.behavior().state(), BehaviorState::Rejecting);
        assert_eq!(c.mood().stats().happiness, 80.0);
    }

    #[test]
    fn keys_ignored_with_modifiers_or_while_asleep() {
        let (mut c, _, _) = fresh();
        c.handle(InputEvent::Key {
            key: 't',
            modifiers: Modifiers {
                ctrl: true,
                ..Default::default()
            },
        });
        assert_eq!(c.mood().state().interaction_counts.treats, 0);

        c.handle(InputEvent::key('l'));
        assert!(c.mood().is_sleeping());
        c.handle(InputEvent::key('t'));
        assert_eq!(c.mood().state().interaction_counts.treats, 0);

        frames(&mut c, 16.0);
        assert_eq!(c.behavior().state(), BehaviorState::Yawning);
    }

    #[test]
    fn click_greets_then_pets() {
        let (mut c, _, _) = fresh();
        c.handle(InputEvent::Click);
        assert_eq!(c.mood().stats().happiness, 95.0);
        assert_eq!(c.mood().stats().energy, 91.0);
        assert!(!c.mood().can_trigger_morning_greeting());
        assert_eq!(c.behavior().state(), BehaviorState::Reacting);

        c.handle(InputEvent::Click);
        assert_eq!(c.mood().stats().happiness, 95.0);
    }

    #[test]
    fn drag_follows_pointer_and_lands() {
        let (mut c, _, _) = fresh();
        c.handle(InputEvent::PointerDown(Vec2::new(450.0, 320.0)));
        assert!(c.is_dragging());
        assert_eq!(c.behavior().state(), BehaviorState::BeingDragged);

        c.handle(InputEvent::Click);
        assert_eq!(c.mood().stats().happiness, 70.0);

        c.handle(InputEvent::PointerMove(Vec2::new(650.0, 420.0)));
        let mut sink = RecordingSink::default();
        c.frame(Some(16.0), &mut sink);
        assert_eq!(sink.0, vec![(600, 400)]);

        c.handle(InputEvent::PointerUp(Vec2::new(650.0, 420.0)));
        assert!(!c.is_dragging());
        assert_eq!(c.behavior().state(), BehaviorState::Landing);
        assert_eq!(c.mood().stats().happiness, 65.0);
        assert_eq!(c.mood().stats().energy, 75.0);
    }

    #[test]
    fn exhausted_pet_refuses_drag() {
        let (mut c, _) = asleep_with_energy(5.0);
        assert_eq!(c.behavior().state(), BehaviorState::Yawning);

        c.handle(InputEvent::PointerDown(Vec2::new(410.0, 310.0)));
        assert!(!c.mood().is_sleeping());
        assert!(!c.is_dragging());
        assert_eq!(c.behavior().state(), BehaviorState::GrumpyWaking);

        frames(&mut c, 16.0);
        assert_eq!(c.behavior().state(), BehaviorState::GrumpyWaking);
    }

    #[test]
    fn rested_pet_wakes_into_drag() {
        let (mut c, _) = asleep_with_energy(50.0);
        c.handle(InputEvent::PointerDown(Vec2::new(410.0, 310.0)));
        assert!(!c.mood().is_sleeping());
        assert!(c.is_dragging());
        assert_eq!(c.behavior().state(), BehaviorState::BeingDragged);
    }

    #[test]
    fn crash_costs_mood_once_per_report() {
        let (mut c, _, _) = fresh();
        c.hurts.set(1);
        frames(&mut c, 16.0);
        assert_eq!(c.mood().stats().happiness, 60.0);
        assert_eq!(c.mood().stats().energy, 75.0);
        frames(&mut c, 16.0);
        assert_eq!(c.mood().stats().happiness, 60.0);
    }

    #[test]
    fn voice_chat_round_trip() {
        let (mut c, _, _) = fresh();
        c.handle(InputEvent::key('v'));
        assert!(c.is_listening());
        assert_eq!(c.behavior().state(), BehaviorState::Listening);

        c.handle(InputEvent::Response {
            text: "Thanks!".into(),
            transcript: Some("you are so cute".into()),
        });
        assert_eq!(c.behavior().state(), BehaviorState::Talking);
        assert_eq!(c.mood().stats().happiness, 95.0);
        assert_eq!(c.mood().stats().energy, 75.0);

        c.handle(InputEvent::ResponseCleared);
        c.handle(InputEvent::ListeningEnd);
        assert_eq!(c.behavior().state(), BehaviorState::Idle);
        assert!(!c.is_listening());
    }

    #[test]
    fn compliment_falls_back_to_response_text() {
        let (mut c, _, _) = fresh();
        c.handle(InputEvent::Response {
            text: "I love you too".into(),
            transcript: None,
        });
        assert_eq!(c.mood().stats().happiness, 95.0);
    }

    #[test]
    fn mic_can_be_disabled() {
        let (c, _, _) = fresh();
        let mut c = c.with_mic(false);
        c.handle(InputEvent::key('v'));
        assert!(!c.is_listening());
        assert_eq!(c.behavior().state(), BehaviorState::Idle);
    }

    #[test]
    fn shutdown_saves_and_stops() {
        let (mut c, _, store) = fresh();
        let saves = store.save_count();
        c.shutdown();
        assert_eq!(store.save_count(), saves + 1);
        assert!(!c.mood().is_running());
    }

    #[test]
    fn mood_tick_runs_from_frames() {
        let (mut c, clock, _) = fresh();
        let before = c.mood().stats();
        clock.advance(11 * MINUTE_MS);
        assert!(c.mood().is_tick_due());
        frames(&mut c, 16.0);
        assert!(!c.mood().is_tick_due());
        assert_ne!(c.mood().stats(), before);
    }
}
