pub mod effects;
pub mod movement;
pub mod queue;
pub mod state;

use glam::Vec2;

use effects::{hop, wave, LandingSpring};
use movement::{Stride, ARRIVE_DISTANCE, RUN_BRAKE_DISTANCE, RUN_SPEED, WANDER_SPEED};
use queue::AnimationQueue;

pub use state::{AnimationType, BehaviorResult, BehaviorState, Direction, ScreenBounds};

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Idle dwell range before rolling for a wander (ms).
const IDLE_DWELL_MIN_MS: f32 = 10_000.0;
const IDLE_DWELL_MAX_MS: f32 = 20_000.0;
/// Chance that an expired idle dwell turns into a wander.
const WANDER_CHANCE: f32 = 0.6;

/// Above this happiness (and not tired) the pet runs.
pub const HAPPINESS_RUN_THRESHOLD: f32 = 60.0;
/// Below this energy the pet is tired.
pub const TIRED_ENERGY_THRESHOLD: f32 = 30.0;
/// Below this happiness the idle animation is sad.
const LOW_HAPPINESS_THRESHOLD: f32 = 40.0;
const ECSTATIC_THRESHOLD: f32 = 80.0;
const HAPPY_THRESHOLD: f32 = 60.0;

const REACT_MS: f32 = 1_000.0;
const REJECT_MS: f32 = 600.0;
const TALK_MS: f32 = 2_000.0;
const EAT_MS: f32 = 2_000.0;
const DANCE_MS: f32 = 6_000.0;
const YAWN_MS: f32 = 1_000.0;
const WAKE_MS: f32 = 800.0;
const GRUMPY_WAKE_MS: f32 = 2_000.0;
const PLAY_MS: f32 = 3_000.0;
const SHAKE_MS: f32 = 800.0;
const HURT_MS: f32 = 1_500.0;
const ACCELERATE_MS: f32 = 400.0;
const SLOW_DOWN_MS: f32 = 500.0;
const STUMBLE_MS: f32 = 600.0;
const CRY_MS: f32 = 2_000.0;

/// Mood values assumed until the first sync.
const INITIAL_MOOD: f32 = 50.0;

/// Drives one pet: position, state, animation and transient effects.
pub struct PetBehavior {
    state: BehaviorState,
    /// Milliseconds spent in the current state.
    state_timer: f32,
    idle_dwell: f32,
    position: Vec2,
    target: Option<Vec2>,
    bounds: ScreenBounds,
    direction: Direction,
    was_running: bool,
    happiness: f32,
    energy: f32,
    mood_sleeping: bool,
    landing: LandingSpring,
    queue: AnimationQueue,
    on_hurt: Option<Box<dyn FnMut()>>,
    rng: fastrand::Rng,
}

impl PetBehavior {
    pub fn new(position: Vec2, bounds: ScreenBounds) -> Self {
        Self::with_rng(position, bounds, fastrand::Rng::new())
    }

    /// Deterministic wander rolls.
    pub fn with_seed(position: Vec2, bounds: ScreenBounds, seed: u64) -> Self {
        Self::with_rng(position, bounds, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(position: Vec2, bounds: ScreenBounds, mut rng: fastrand::Rng) -> Self {
        let idle_dwell = roll_idle_dwell(&mut rng);
        Self {
            state: BehaviorState::Idle,
            state_timer: 0.0,
            idle_dwell,
            position: bounds.clamp(position),
            target: None,
            bounds,
            direction: Direction::default(),
            was_running: false,
            happiness: INITIAL_MOOD,
            energy: INITIAL_MOOD,
            mood_sleeping: false,
            landing: LandingSpring::default(),
            queue: AnimationQueue::new(),
            on_hurt: None,
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Frame update
    // -----------------------------------------------------------------------

    /// Advance by `dt_ms` of wall-clock time. Negative or non-finite gaps
    /// count as zero.
    pub fn update(&mut self, dt_ms: f32) -> BehaviorResult {
        let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        self.state_timer += dt;
        self.run_state(dt)
    }

    fn run_state(&mut self, dt: f32) -> BehaviorResult {
        match self.state {
            BehaviorState::Idle => self.idle(),
            BehaviorState::Wandering => self.wander(dt),
            BehaviorState::BeingDragged => self.hold(AnimationType::Drag),
            BehaviorState::Reacting => self.timed(REACT_MS, BehaviorState::Idle, AnimationType::Happy),
            BehaviorState::Landing => self.land(dt),
            BehaviorState::Listening => self.hold(AnimationType::Curious),
            BehaviorState::Rejecting => self.reject(),
            BehaviorState::Talking => self.timed(TALK_MS, BehaviorState::Idle, AnimationType::Talk),
            BehaviorState::Eating => self.timed(EAT_MS, BehaviorState::Reacting, AnimationType::Eat),
            BehaviorState::Dancing => self.timed(DANCE_MS, BehaviorState::Reacting, AnimationType::Dance),
            BehaviorState::Yawning => self.timed(YAWN_MS, BehaviorState::Sleeping, AnimationType::Yawn),
            BehaviorState::Waking => self.timed(WAKE_MS, BehaviorState::Idle, AnimationType::Wake),
            BehaviorState::GrumpyWaking => self.grumpy(),
            BehaviorState::Playing => self.play(),
            BehaviorState::Shaking => self.shake(),
            BehaviorState::Accelerating => self.accelerate(dt),
            BehaviorState::SlowingDown => self.slow_down(dt),
            BehaviorState::Stumbling => self.stumble(),
            BehaviorState::Crying => self.cry(),
            BehaviorState::Hurt => self.hurt(),
            BehaviorState::Sleeping => self.sleep(),
        }
    }

    // -----------------------------------------------------------------------
    // State handlers
    // -----------------------------------------------------------------------

    fn idle(&mut self) -> BehaviorResult {
        if self.mood_sleeping {
            return self.advance_to(BehaviorState::Yawning, 0.0);
        }

        if self.state_timer > self.idle_dwell {
            if self.rng.f32() < WANDER_CHANCE {
                let stride = self.stride();
                self.target = movement::pick_target(&mut self.rng, self.position, stride, &self.bounds);
                self.transition_to(BehaviorState::Wandering);
            } else {
                self.state_timer = 0.0;
                self.idle_dwell = roll_idle_dwell(&mut self.rng);
            }
        }

        self.hold(self.idle_animation())
    }

    fn wander(&mut self, dt: f32) -> BehaviorResult {
        let Some(target) = self.target else {
            return self.stop_moving(dt);
        };

        if self.can_run() && !self.was_running {
            return self.advance_to(BehaviorState::Accelerating, dt);
        }
        if self.was_running && self.is_tired() {
            return self.advance_to(BehaviorState::SlowingDown, dt);
        }

        let delta = target - self.position;
        let distance = delta.length();
        if distance < ARRIVE_DISTANCE {
            self.target = None;
            return self.stop_moving(dt);
        }

        let mut speed = if self.was_running { RUN_SPEED } else { WANDER_SPEED };
        if self.is_tired() {
            speed *= movement::TIRED_SPEED_MULTIPLIER;
        }
        let next = movement::step_toward(self.position, target, speed, dt);

        // Edge check comes before braking so a run can still crash.
        if self.was_running && movement::runs_into_edge(next, delta, &self.bounds) {
            self.target = None;
            self.position = self.bounds.clamp(next);
            self.transition_to(BehaviorState::Stumbling);
            if let Some(on_hurt) = self.on_hurt.as_mut() {
                on_hurt();
            }
            return self.stumble();
        }

        if self.was_running && distance < RUN_BRAKE_DISTANCE {
            return self.advance_to(BehaviorState::SlowingDown, dt);
        }

        let clamped = self.bounds.clamp(next);
        if movement::at_edge(clamped, delta, &self.bounds) {
            self.target = None;
            self.position = clamped;
            self.transition_to(BehaviorState::Idle);
            return self.hold(AnimationType::Idle);
        }

        self.position = clamped;
        self.direction = Direction::from_dx(delta.x);

        let animation = if self.was_running {
            AnimationType::Run
        } else if self.is_tired() {
            AnimationType::WalkTired
        } else {
            AnimationType::Walk
        };
        self.hold(animation)
    }

    /// Out of target: brake if running, otherwise settle.
    fn stop_moving(&mut self, dt: f32) -> BehaviorResult {
        if self.was_running {
            self.advance_to(BehaviorState::SlowingDown, dt)
        } else {
            self.transition_to(BehaviorState::Idle);
            self.hold(AnimationType::Idle)
        }
    }

    fn accelerate(&mut self, dt: f32) -> BehaviorResult {
        if self.state_timer > ACCELERATE_MS {
            self.was_running = true;
            return self.advance_to(BehaviorState::Wandering, dt);
        }

        let progress = self.state_timer / ACCELERATE_MS;
        let speed = WANDER_SPEED + (RUN_SPEED - WANDER_SPEED) * progress;
        if let Some(target) = self.target {
            let delta = target - self.position;
            if delta.length() > ARRIVE_DISTANCE {
                let next = movement::step_toward(self.position, target, speed, dt);
                self.position = self.bounds.clamp(next);
                self.direction = Direction::from_dx(delta.x);
            }
        }
        self.hold(AnimationType::RunStart)
    }

    fn slow_down(&mut self, dt: f32) -> BehaviorResult {
        if self.state_timer > SLOW_DOWN_MS {
            self.was_running = false;
            self.target = None;
            return self.advance_to(BehaviorState::Idle, 0.0);
        }

        let progress = self.state_timer / SLOW_DOWN_MS;
        let speed = RUN_SPEED * (1.0 - progress);
        if let Some(target) = self.target {
            if target.distance(self.position) > 2.0 && speed > 5.0 {
                let next = movement::step_toward(self.position, target, speed, dt);
                self.position = self.bounds.clamp(next);
            }
        }

        let wobble = wave(self.state_timer, 10.0, 2.0 * (1.0 - progress));
        self.shifted(wobble, 0.0, AnimationType::RunStop)
    }

    fn stumble(&mut self) -> BehaviorResult {
        if self.state_timer > STUMBLE_MS {
            return self.advance_to(BehaviorState::Crying, 0.0);
        }
        let progress = self.state_timer / STUMBLE_MS;
        let jolt = wave(self.state_timer, 15.0, 6.0 * (1.0 - progress));
        self.shifted(jolt, 0.0, AnimationType::Stumble)
    }

    fn cry(&mut self) -> BehaviorResult {
        if self.state_timer > CRY_MS {
            self.was_running = false;
            return self.advance_to(BehaviorState::Idle, 0.0);
        }
        let sob = wave(self.state_timer, 6.0, 3.0);
        self.shifted(sob, 0.0, AnimationType::Cry)
    }

    fn land(&mut self, dt: f32) -> BehaviorResult {
        if self.landing.step(dt) {
            self.position.y = self.landing.base_y;
            self.transition_to(BehaviorState::Idle);
            return self.hold(AnimationType::Idle);
        }
        let pos = Vec2::new(self.position.x, self.landing.y());
        BehaviorResult::new(pos, AnimationType::Idle, self.direction).with_squish(self.landing.squish())
    }

    fn reject(&mut self) -> BehaviorResult {
        if self.state_timer >= REJECT_MS {
            self.transition_to(BehaviorState::Idle);
            return self.hold(AnimationType::Idle);
        }
        let shake = wave(self.state_timer, 12.0, 1.5);
        self.shifted(shake, 0.0, AnimationType::Reject).rejecting()
    }

    fn grumpy(&mut self) -> BehaviorResult {
        if self.state_timer > GRUMPY_WAKE_MS {
            return self.finish(BehaviorState::Idle);
        }
        let shake = wave(self.state_timer, 15.0, 6.0);
        self.shifted(shake, 0.0, AnimationType::Angry)
    }

    fn play(&mut self) -> BehaviorResult {
        if self.state_timer > PLAY_MS {
            return self.advance_to(BehaviorState::Reacting, 0.0);
        }
        let (lift, squish) = hop(self.state_timer, 6.0, 25.0, 0.15);
        self.shifted(0.0, -lift, AnimationType::Happy).with_squish(squish)
    }

    fn shake(&mut self) -> BehaviorResult {
        if self.state_timer > SHAKE_MS {
            return self.advance_to(BehaviorState::Idle, 0.0);
        }
        let wiggle = wave(self.state_timer, 12.0, 8.0);
        self.shifted(wiggle, 0.0, AnimationType::Happy)
    }

    fn hurt(&mut self) -> BehaviorResult {
        if self.state_timer > HURT_MS {
            return self.advance_to(BehaviorState::Idle, 0.0);
        }
        let wobble = wave(self.state_timer, 8.0, 2.0);
        self.shifted(wobble, 0.0, AnimationType::Hurt)
    }

    fn sleep(&mut self) -> BehaviorResult {
        if !self.mood_sleeping {
            return self.advance_to(BehaviorState::Waking, 0.0);
        }
        self.hold(AnimationType::Sleep)
    }

    /// Play `animation` for `duration_ms`, then move on to the next queued
    /// state or `next`.
    fn timed(
        &mut self,
        duration_ms: f32,
        next: BehaviorState,
        animation: AnimationType,
    ) -> BehaviorResult {
        if self.state_timer > duration_ms {
            return self.finish(next);
        }
        self.hold(animation)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn transition_to(&mut self, next: BehaviorState) {
        log::trace!("behavior {} -> {}", self.state.label(), next.label());
        self.state = next;
        self.state_timer = 0.0;
        if next == BehaviorState::Idle {
            self.idle_dwell = roll_idle_dwell(&mut self.rng);
        }
    }

    fn advance_to(&mut self, next: BehaviorState, dt: f32) -> BehaviorResult {
        self.transition_to(next);
        self.run_state(dt)
    }

    /// End the current state, preferring whatever is queued.
    fn finish(&mut self, fallback: BehaviorState) -> BehaviorResult {
        let next = self.queue.pop_next().unwrap_or(fallback);
        self.advance_to(next, 0.0)
    }

    fn force_transition(&mut self, next: BehaviorState) {
        self.queue.clear();
        self.transition_to(next);
    }

    // -----------------------------------------------------------------------
    // External triggers
    // -----------------------------------------------------------------------

    pub fn on_drag_start(&mut self) {
        self.target = None;
        self.was_running = false;
        self.transition_to(BehaviorState::BeingDragged);
    }

    /// Drop at `pos` (clamped) and bounce.
    pub fn on_drag_end(&mut self, pos: Vec2) {
        self.position = self.bounds.clamp(pos);
        self.landing = LandingSpring::drop_at(self.position.y);
        self.transition_to(BehaviorState::Landing);
    }

    pub fn on_click(&mut self) {
        if !matches!(
            self.state,
            BehaviorState::BeingDragged | BehaviorState::Landing | BehaviorState::Listening
        ) {
            self.transition_to(BehaviorState::Reacting);
        }
    }

    pub fn on_listening_start(&mut self) {
        if self.state != BehaviorState::BeingDragged {
            self.transition_to(BehaviorState::Listening);
        }
    }

    pub fn on_listening_end(&mut self) {
        if self.state == BehaviorState::Listening {
            self.transition_to(BehaviorState::Idle);
        }
    }

    /// Visual cue for a denied interaction.
    pub fn on_reject(&mut self) {
        if matches!(self.state, BehaviorState::Idle | BehaviorState::Wandering) {
            self.transition_to(BehaviorState::Rejecting);
        }
    }

    pub fn on_eat(&mut self) {
        self.start_activity(BehaviorState::Eating);
    }

    pub fn on_dance(&mut self) {
        self.start_activity(BehaviorState::Dancing);
    }

    pub fn on_play(&mut self) {
        self.start_activity(BehaviorState::Playing);
    }

    pub fn on_shake(&mut self) {
        self.start_activity(BehaviorState::Shaking);
    }

    fn start_activity(&mut self, activity: BehaviorState) {
        if self.state.accepts_activity() {
            self.transition_to(activity);
        }
    }

    pub fn on_talk_start(&mut self) {
        if self.state == BehaviorState::Listening {
            self.transition_to(BehaviorState::Talking);
        }
    }

    pub fn on_talk_end(&mut self) {
        if self.state == BehaviorState::Talking {
            self.transition_to(BehaviorState::Idle);
        }
    }

    /// Woken while exhausted. Drops anything queued.
    pub fn on_grumpy_wake(&mut self) {
        self.force_transition(BehaviorState::GrumpyWaking);
    }

    /// Sync the mood engine's sleep flag. Safe to call every frame.
    pub fn set_mood_sleeping(&mut self, sleeping: bool) {
        self.mood_sleeping = sleeping;
        if sleeping {
            match self.state {
                BehaviorState::BeingDragged | BehaviorState::Yawning | BehaviorState::Sleeping => {}
                BehaviorState::GrumpyWaking => {
                    if self.queue.is_empty() {
                        self.queue
                            .enqueue_all(&[BehaviorState::Yawning, BehaviorState::Sleeping]);
                    }
                }
                _ => {
                    self.queue.clear();
                    self.transition_to(BehaviorState::Yawning);
                }
            }
        } else {
            // A queued nap is stale once the mood is awake.
            self.queue.clear();
            if self.state == BehaviorState::Sleeping {
                self.transition_to(BehaviorState::Waking);
            }
        }
    }

    pub fn set_happiness(&mut self, value: f32) {
        self.happiness = value;
    }

    pub fn set_energy(&mut self, value: f32) {
        self.energy = value;
    }

    /// Called once each time a run ends in a crash.
    pub fn set_on_hurt_callback(&mut self, callback: impl FnMut() + 'static) {
        self.on_hurt = Some(Box::new(callback));
    }

    pub fn set_screen_bounds(&mut self, bounds: ScreenBounds) {
        self.bounds = bounds;
        self.position = bounds.clamp(self.position);
    }

    /// Move the pet directly, e.g. to follow the pointer during a drag.
    pub fn set_position(&mut self, pos: Vec2) {
        self.position = self.bounds.clamp(pos);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn is_sleeping(&self) -> bool {
        self.state == BehaviorState::Sleeping
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    fn is_tired(&self) -> bool {
        self.energy < TIRED_ENERGY_THRESHOLD
    }

    fn can_run(&self) -> bool {
        self.happiness > HAPPINESS_RUN_THRESHOLD && !self.is_tired()
    }

    fn stride(&self) -> Stride {
        if self.is_tired() {
            Stride::Tired
        } else if self.happiness > HAPPINESS_RUN_THRESHOLD {
            Stride::Run
        } else {
            Stride::Walk
        }
    }

    /// Tired beats sad beats the happy variants.
    fn idle_animation(&self) -> AnimationType {
        if self.is_tired() {
            AnimationType::IdleTired
        } else if self.happiness < LOW_HAPPINESS_THRESHOLD {
            AnimationType::Sad
        } else if self.happiness >= ECSTATIC_THRESHOLD {
            AnimationType::IdleEcstatic
        } else if self.happiness >= HAPPY_THRESHOLD {
            AnimationType::IdleHappy
        } else {
            AnimationType::Idle
        }
    }

    fn hold(&self, animation: AnimationType) -> BehaviorResult {
        BehaviorResult::new(self.position, animation, self.direction)
    }

    fn shifted(&self, dx: f32, dy: f32, animation: AnimationType) -> BehaviorResult {
        BehaviorResult::new(self.position + Vec2::new(dx, dy), animation, self.direction)
    }
}

fn roll_idle_dwell(rng: &mut fastrand::Rng) -> f32 {
    IDLE_DWELL_MIN_MS + rng.f32() * (IDLE_DWELL_MAX_MS - IDLE_DWELL_MIN_MS)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    const FRAME: f32 = 16.0;

    fn pet() -> PetBehavior {
        PetBehavior::with_seed(Vec2::new(400.0, 300.0), ScreenBounds::new(800.0, 600.0), 7)
    }

    fn run_for(pet: &mut PetBehavior, ms: f32) -> BehaviorResult {
        let mut last = pet.update(FRAME);
        let mut elapsed = FRAME;
        while elapsed < ms {
            last = pet.update(FRAME);
            elapsed += FRAME;
        }
        last
    }

    #[test]
    fn reject_shakes_then_returns_to_idle() {
        let mut pet = pet();
        pet.on_reject();
        assert_eq!(pet.state(), BehaviorState::Rejecting);

        let first = pet.update(FRAME);
        assert!(first.is_rejecting);
        assert_eq!(first.animation, AnimationType::Reject);

        let last = run_for(&mut pet, 620.0);
        assert_eq!(pet.state(), BehaviorState::Idle);
        assert!(!last.is_rejecting);
        assert_eq!(last.squish_factor, 1.0);
    }

    #[test]
    fn landing_settles_on_the_drop_line() {
        let mut pet = pet();
        pet.on_drag_start();
        assert_eq!(pet.update(FRAME).animation, AnimationType::Drag);

        pet.on_drag_end(Vec2::new(250.0, 5_000.0));
        assert_eq!(pet.state(), BehaviorState::Landing);
        let base_y = 600.0;

        let mut elapsed = 0.0;
        let mut saw_squish = false;
        let settled = loop {
            let r = pet.update(FRAME);
            elapsed += FRAME;
            assert!((0.7..=1.3).contains(&r.squish_factor));
            saw_squish |= r.squish_factor != 1.0;
            if pet.state() == BehaviorState::Idle {
                break r;
            }
            assert!(elapsed < 5_000.0, "landing never settled");
        };
        assert!(saw_squish);
        assert_eq!(settled.position, Vec2::new(250.0, base_y));
        assert_eq!(settled.squish_factor, 1.0);
    }

    #[test]
    fn activities_are_refused_outside_calm_states() {
        let blocked = [
            BehaviorState::BeingDragged,
            BehaviorState::Sleeping,
            BehaviorState::Talking,
            BehaviorState::Listening,
        ];
        for state in blocked {
            let mut pet = pet();
            pet.state = state;
            pet.on_eat();
            pet.on_dance();
            pet.on_play();
            pet.on_shake();
            pet.on_reject();
            assert_eq!(pet.state(), state);
        }

        let mut pet = pet();
        pet.on_eat();
        assert_eq!(pet.state(), BehaviorState::Eating);
    }

    #[test]
    fn click_and_listen_guards() {
        let mut pet = pet();
        pet.on_drag_start();
        pet.on_click();
        pet.on_listening_start();
        assert_eq!(pet.state(), BehaviorState::BeingDragged);

        let mut pet = self::pet();
        pet.on_talk_start();
        assert_eq!(pet.state(), BehaviorState::Idle);
        pet.on_listening_start();
        pet.on_click();
        assert_eq!(pet.state(), BehaviorState::Listening);
        pet.on_talk_start();
        assert_eq!(pet.state(), BehaviorState::Talking);
        pet.on_talk_end();
        assert_eq!(pet.state(), BehaviorState::Idle);
    }

    #[test]
    fn eating_ends_happy_then_idle() {
        let mut pet = pet();
        pet.on_eat();
        assert_eq!(pet.update(FRAME).animation, AnimationType::Eat);
        let r = run_for(&mut pet, 2_050.0);
        assert_eq!(pet.state(), BehaviorState::Reacting);
        assert_eq!(r.animation, AnimationType::Happy);
        run_for(&mut pet, 1_050.0);
        assert_eq!(pet.state(), BehaviorState::Idle);
    }

    #[test]
    fn idle_animation_follows_mood() {
        let cases = [
            (10.0, 20.0, AnimationType::IdleTired),
            (10.0, 80.0, AnimationType::Sad),
            (85.0, 80.0, AnimationType::IdleEcstatic),
            (65.0, 80.0, AnimationType::IdleHappy),
            (50.0, 80.0, AnimationType::Idle),
        ];
        for (happiness, energy, expected) in cases {
            let mut pet = pet();
            pet.set_happiness(happiness);
            pet.set_energy(energy);
            assert_eq!(pet.update(FRAME).animation, expected);
        }
    }

    #[test]
    fn sleep_and_wake_sequence() {
        let mut pet = pet();
        pet.set_mood_sleeping(true);
        assert_eq!(pet.state(), BehaviorState::Yawning);
        assert_eq!(pet.update(FRAME).animation, AnimationType::Yawn);

        let r = run_for(&mut pet, 1_050.0);
        assert!(pet.is_sleeping());
        assert_eq!(r.animation, AnimationType::Sleep);

        pet.set_mood_sleeping(true);
        assert!(pet.is_sleeping());

        pet.set_mood_sleeping(false);
        assert_eq!(pet.state(), BehaviorState::Waking);
        run_for(&mut pet, 850.0);
        assert_eq!(pet.state(), BehaviorState::Idle);
    }

    #[test]
    fn grumpy_wake_queues_the_nap_once() {
        let mut pet = pet();
        pet.set_mood_sleeping(true);
        run_for(&mut pet, 1_100.0);
        assert!(pet.is_sleeping());

        pet.set_mood_sleeping(false);
        pet.on_grumpy_wake();
        assert_eq!(pet.state(), BehaviorState::GrumpyWaking);
        assert_eq!(pet.update(FRAME).animation, AnimationType::Angry);

        pet.set_mood_sleeping(true);
        pet.set_mood_sleeping(true);
        assert_eq!(pet.queued(), 2);
        assert_eq!(pet.state(), BehaviorState::GrumpyWaking);

        run_for(&mut pet, 2_050.0);
        assert_eq!(pet.state(), BehaviorState::Yawning);
        run_for(&mut pet, 1_050.0);
        assert!(pet.is_sleeping());
        assert_eq!(pet.queued(), 0);
    }

    #[test]
    fn click_during_grumpy_wake_yawns_once() {
        let mut pet = pet();
        pet.on_grumpy_wake();
        pet.set_mood_sleeping(true);
        assert_eq!(pet.queued(), 2);

        pet.on_click();
        assert_eq!(pet.state(), BehaviorState::Reacting);
        pet.set_mood_sleeping(true);
        assert_eq!(pet.state(), BehaviorState::Yawning);
        assert_eq!(pet.queued(), 0);

        run_for(&mut pet, 1_050.0);
        assert!(pet.is_sleeping());
    }

    #[test]
    fn grumpy_wake_without_nap_goes_idle() {
        let mut pet = pet();
        pet.on_grumpy_wake();
        pet.set_mood_sleeping(true);
        pet.set_mood_sleeping(false);
        assert_eq!(pet.queued(), 0);
        run_for(&mut pet, 2_050.0);
        assert_eq!(pet.state(), BehaviorState::Idle);
    }

    #[test]
    fn drag_is_not_interrupted_by_sleep() {
        let mut pet = pet();
        pet.on_drag_start();
        pet.set_mood_sleeping(true);
        assert_eq!(pet.state(), BehaviorState::BeingDragged);
    }

    #[test]
    fn positions_stay_in_bounds() {
        let mut pet = pet();
        pet.set_position(Vec2::new(-50.0, 900.0));
        assert_eq!(pet.position(), Vec2::new(0.0, 600.0));

        pet.set_screen_bounds(ScreenBounds::new(300.0, 200.0));
        assert_eq!(pet.position(), Vec2::new(0.0, 200.0));

        pet.set_happiness(90.0);
        pet.set_energy(90.0);
        for _ in 0..5_000 {
            pet.update(50.0);
            let p = pet.position();
            assert!((0.0..=300.0).contains(&p.x) && (0.0..=200.0).contains(&p.y));
        }
    }

    #[test]
    fn running_into_a_wall_hurts_once() {
        let hurts = Rc::new(Cell::new(0));
        let counter = hurts.clone();

        let mut pet = PetBehavior::with_seed(Vec2::new(780.0, 300.0), ScreenBounds::new(800.0, 600.0), 1);
        pet.set_on_hurt_callback(move || counter.set(counter.get() + 1));
        pet.set_happiness(90.0);
        pet.set_energy(90.0);
        pet.target = Some(Vec2::new(1_400.0, 300.0));
        pet.transition_to(BehaviorState::Wandering);

        assert_eq!(pet.update(FRAME).animation, AnimationType::RunStart);

        let mut saw_stumble = false;
        for _ in 0..100 {
            let r = pet.update(FRAME);
            if r.animation == AnimationType::Stumble {
                saw_stumble = true;
                break;
            }
        }
        assert!(saw_stumble);
        assert_eq!(hurts.get(), 1);
        assert_eq!(pet.position().x, 800.0);

        run_for(&mut pet, 700.0);
        assert_eq!(pet.state(), BehaviorState::Crying);
        run_for(&mut pet, 2_100.0);
        assert_eq!(pet.state(), BehaviorState::Idle);
        assert_eq!(hurts.get(), 1);
    }

    #[test]
    fn acceleration_ramps_into_a_run() {
        let mut pet = PetBehavior::with_seed(Vec2::new(100.0, 300.0), ScreenBounds::new(800.0, 600.0), 3);
        pet.set_happiness(90.0);
        pet.set_energy(90.0);
        pet.target = Some(Vec2::new(700.0, 300.0));
        pet.transition_to(BehaviorState::Wandering);

        let x0 = pet.position().x;
        let r = pet.update(FRAME);
        assert_eq!(pet.state(), BehaviorState::Accelerating);
        assert_eq!(r.animation, AnimationType::RunStart);
        let first_step = pet.position().x - x0;
        assert!((first_step - WANDER_SPEED * FRAME / 1000.0).abs() < 1e-3);

        run_for(&mut pet, 200.0);
        let x1 = pet.position().x;
        pet.update(FRAME);
        assert_eq!(pet.state(), BehaviorState::Accelerating);
        assert!(pet.position().x - x1 > first_step * 2.0);

        let r = run_for(&mut pet, 250.0);
        assert_eq!(pet.state(), BehaviorState::Wandering);
        assert!(pet.was_running);
        assert_eq!(r.animation, AnimationType::Run);
    }

    #[test]
    fn running_pet_brakes_near_its_target() {
        let mut pet = pet();
        pet.set_happiness(90.0);
        pet.set_energy(90.0);
        pet.was_running = true;
        pet.target = Some(Vec2::new(420.0, 300.0));
        pet.transition_to(BehaviorState::Wandering);

        let r = pet.update(FRAME);
        assert_eq!(pet.state(), BehaviorState::SlowingDown);
        assert_eq!(r.animation, AnimationType::RunStop);

        run_for(&mut pet, 450.0);
        assert_eq!(pet.state(), BehaviorState::SlowingDown);
        run_for(&mut pet, 100.0);
        assert_eq!(pet.state(), BehaviorState::Idle);
        assert!(!pet.was_running);
        assert!(pet.target.is_none());
    }

    #[test]
    fn tiring_mid_run_slows_down() {
        let mut pet = pet();
        pet.set_happiness(90.0);
        pet.set_energy(90.0);
        pet.was_running = true;
        pet.target = Some(Vec2::new(700.0, 300.0));
        pet.transition_to(BehaviorState::Wandering);
        assert_eq!(pet.update(FRAME).animation, AnimationType::Run);

        pet.set_energy(10.0);
        let r = pet.update(FRAME);
        assert_eq!(pet.state(), BehaviorState::SlowingDown);
        assert_eq!(r.animation, AnimationType::RunStop);
    }

    #[test]
    fn timed_activities_hand_off() {
        let mut pet = pet();
        pet.on_dance();
        assert_eq!(run_for(&mut pet, 5_900.0).animation, AnimationType::Dance);
        assert_eq!(pet.state(), BehaviorState::Dancing);
        run_for(&mut pet, 150.0);
        assert_eq!(pet.state(), BehaviorState::Reacting);

        let mut pet = self::pet();
        pet.on_shake();
        run_for(&mut pet, 780.0);
        assert_eq!(pet.state(), BehaviorState::Shaking);
        run_for(&mut pet, 30.0);
        assert_eq!(pet.state(), BehaviorState::Idle);

        let mut pet = self::pet();
        pet.transition_to(BehaviorState::Hurt);
        assert_eq!(run_for(&mut pet, 1_480.0).animation, AnimationType::Hurt);
        assert_eq!(pet.state(), BehaviorState::Hurt);
        run_for(&mut pet, 30.0);
        assert_eq!(pet.state(), BehaviorState::Idle);
    }

    #[test]
    fn tired_walk_never_runs() {
        let mut pet = pet();
        pet.set_happiness(90.0);
        pet.set_energy(10.0);
        pet.target = Some(Vec2::new(450.0, 300.0));
        pet.transition_to(BehaviorState::Wandering);
        let r = pet.update(FRAME);
        assert_eq!(pet.state(), BehaviorState::Wandering);
        assert_eq!(r.animation, AnimationType::WalkTired);
        assert_eq!(r.direction, Direction::Right);
        let expected = 400.0 + WANDER_SPEED * movement::TIRED_SPEED_MULTIPLIER * FRAME / 1000.0;
        assert!((r.position.x - expected).abs() < 1e-3);
    }

    #[test]
    fn walk_arrives_and_idles() {
        let mut pet = pet();
        pet.target = Some(Vec2::new(390.0, 300.0));
        pet.transition_to(BehaviorState::Wandering);
        let r = run_for(&mut pet, 1_000.0);
        assert_eq!(pet.state(), BehaviorState::Idle);
        assert_eq!(r.direction, Direction::Left);
        assert!(pet.position().distance(Vec2::new(390.0, 300.0)) < ARRIVE_DISTANCE);
    }

    #[test]
    fn play_bounces_upward() {
        let mut pet = pet();
        pet.on_play();
        let r = run_for(&mut pet, 80.0);
        assert!(r.position.y < 300.0);
        assert!(r.squish_factor > 1.0);
    }

    #[test]
    fn junk_dt_is_ignored() {
        let mut pet = pet();
        pet.on_reject();
        pet.update(f32::NAN);
        pet.update(-100.0);
        assert_eq!(pet.state(), BehaviorState::Rejecting);
        assert_eq!(pet.state_timer, 0.0);
    }
}
