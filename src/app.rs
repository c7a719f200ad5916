use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use glam::Vec2;
use instant::Instant;

use petpal::companion::Modifiers;
use petpal::config::CONFIG_PATH;
use petpal::mood::store::{BackgroundStore, JsonFileStore, MoodStore};
use petpal::{AppConfig, Companion, InputEvent, MoodService, PetBehavior, ScreenBounds, SystemClock, WindowSink};

/// Target frame interval (seconds).
const FRAME_INTERVAL: f64 = 1.0 / 60.0;
/// Longest frame gap fed to the simulation (seconds).
const MAX_FRAME_DT: f64 = 0.25;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

/// Frame pacing over one logging window.
struct FrameStats {
    window_start: Instant,
    frames: u32,
    busy: Duration,
    worst_gap: f64,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            busy: Duration::ZERO,
            worst_gap: 0.0,
        }
    }

    /// `gap` is seconds since the previous frame, `busy` the time spent
    /// simulating this one.
    fn record(&mut self, gap: f64, busy: Duration) {
        self.frames += 1;
        self.busy += busy;
        self.worst_gap = self.worst_gap.max(gap);

        let window = self.window_start.elapsed().as_secs_f64();
        if window < FPS_LOG_INTERVAL {
            return;
        }
        log::debug!(
            "{:.0} fps | sim {:.3}ms/frame | worst gap {:.1}ms",
            self.frames as f64 / window,
            self.busy.as_secs_f64() * 1000.0 / self.frames as f64,
            self.worst_gap * 1000.0,
        );
        *self = Self::new();
    }
}

// ---------------------------------------------------------------------------
// Console commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Input(InputEvent),
    /// Pick the pet up where it is and drop it at a point.
    Drag(Vec2),
    /// Voice input finished and the reply bubble closed.
    Hush,
    Bounds(f32, f32),
    Status,
    Quit,
}

fn parse_point(args: &[&str]) -> Option<Vec2> {
    match args {
        [x, y] => Some(Vec2::new(x.parse().ok()?, y.parse().ok()?)),
        _ => None,
    }
}

/// One console line. Unknown or malformed lines give `None`.
fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    let cmd = match word.to_ascii_lowercase().as_str() {
        "click" => Command::Input(InputEvent::Click),
        "down" => Command::Input(InputEvent::PointerDown(parse_point(&args)?)),
        "move" => Command::Input(InputEvent::PointerMove(parse_point(&args)?)),
        "up" => Command::Input(InputEvent::PointerUp(parse_point(&args)?)),
        "drag" => Command::Drag(parse_point(&args)?),
        "key" => {
            let chord = args.first()?.to_ascii_lowercase();
            let mut modifiers = Modifiers::default();
            let mut parts: Vec<&str> = chord.split('+').collect();
            let key = parts.pop()?;
            for m in parts {
                match m {
                    "ctrl" => modifiers.ctrl = true,
                    "alt" => modifiers.alt = true,
                    "meta" | "cmd" => modifiers.meta = true,
                    _ => return None,
                }
            }
            let mut chars = key.chars();
            let key = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            Command::Input(InputEvent::Key { key, modifiers })
        }
        "listen" => Command::Input(InputEvent::key('v')),
        "say" if !rest.trim().is_empty() => Command::Input(InputEvent::Response {
            text: rest.trim().to_string(),
            transcript: None,
        }),
        "hush" => Command::Hush,
        "bounds" => {
            let size = parse_point(&args)?;
            Command::Bounds(size.x, size.y)
        }
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

/// Read stdin on its own thread so the frame loop never blocks.
fn spawn_console() -> io::Result<mpsc::Receiver<Command>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("petpal-console".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(cmd) => {
                        if tx.send(cmd).is_err() {
                            return;
                        }
                    }
                    None => log::warn!("Unknown command: {line}"),
                }
            }
            let _ = tx.send(Command::Quit);
        })?;
    Ok(rx)
}

// ---------------------------------------------------------------------------
// Window stand-in
// ---------------------------------------------------------------------------

/// Logs window moves instead of touching a real window.
#[derive(Default)]
struct LogSink {
    last: Option<(i32, i32)>,
}

impl WindowSink for LogSink {
    fn move_window(&mut self, x: i32, y: i32) {
        if self.last != Some((x, y)) {
            log::trace!("window -> ({x}, {y})");
            self.last = Some((x, y));
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct App {
    companion: Companion,
    sink: LogSink,
    last_frame_time: Option<Instant>,
    frame_stats: FrameStats,
    last_state: petpal::BehaviorState,
}

impl App {
    fn new(config: &AppConfig) -> Self {
        let json = JsonFileStore::new(&config.store_path);
        let store: Box<dyn MoodStore> = if config.background_save {
            Box::new(BackgroundStore::spawn(json))
        } else {
            Box::new(json)
        };

        let mood = MoodService::new(Box::new(SystemClock), store)
            .with_table(config.interactions.clone())
            .with_tick_interval(config.tick_interval_ms);
        log::info!(
            "{} interactions, mood tick every {}s",
            mood.table().len(),
            mood.tick_interval_ms() / 1000
        );
        let behavior = PetBehavior::new(config.start_position, config.screen_bounds());
        let mut companion = Companion::new(behavior, mood).with_mic(config.mic_enabled);
        companion.initialize();

        let last_state = companion.behavior().state();
        Self {
            companion,
            sink: LogSink::default(),
            last_frame_time: None,
            frame_stats: FrameStats::new(),
            last_state,
        }
    }

    /// Returns false once a quit was requested.
    fn apply(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Input(event) => self.companion.handle(event),
            Command::Drag(to) => {
                let from = self.companion.behavior().position();
                self.companion.handle(InputEvent::PointerDown(from));
                self.companion.handle(InputEvent::PointerMove(to));
                self.companion.handle(InputEvent::PointerUp(to));
            }
            Command::Hush => {
                self.companion.handle(InputEvent::ResponseCleared);
                self.companion.handle(InputEvent::ListeningEnd);
            }
            Command::Bounds(w, h) => self.companion.set_screen_bounds(ScreenBounds::new(w, h)),
            Command::Status => self.log_status(),
            Command::Quit => return false,
        }
        true
    }

    fn log_status(&self) {
        let mood = self.companion.mood();
        let stats = mood.stats();
        log::info!(
            "happiness {:.1} ({}) | energy {:.1} ({}) | sleeping {} | behavior {} at {:?}",
            stats.happiness,
            mood.mood_level().label(),
            stats.energy,
            mood.energy_level().label(),
            mood.is_sleeping(),
            self.companion.behavior().state().label(),
            self.companion.behavior().position(),
        );
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let gap = self.last_frame_time.map(|last| now.duration_since(last).as_secs_f64());
        self.last_frame_time = Some(now);

        let dt_ms = gap.map(|g| (g.min(MAX_FRAME_DT) * 1000.0) as f32);
        let result = self.companion.frame(dt_ms, &mut self.sink);
        if let Some(gap) = gap {
            self.frame_stats.record(gap, now.elapsed());
        }

        let state = self.companion.behavior().state();
        if state != self.last_state {
            log::info!("{} -> {} ({})", self.last_state.label(), state.label(), result.animation.name());
            self.last_state = state;
        }
        if let Some(change) = self.companion.happiness_change() {
            log::trace!("happiness {change:+.0}");
        }
    }
}

/// Entry point: load config, run the frame loop until `quit` or EOF.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));
    let config = AppConfig::load_or_default(&config_path);

    let console = spawn_console()?;
    let mut app = App::new(&config);
    app.log_status();

    let frame_budget = Duration::from_secs_f64(FRAME_INTERVAL);
    'frames: loop {
        let started = Instant::now();

        loop {
            match console.try_recv() {
                Ok(cmd) => {
                    if !app.apply(cmd) {
                        break 'frames;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break 'frames,
            }
        }

        app.frame();

        let spent = started.elapsed();
        if spent < frame_budget {
            thread::sleep(frame_budget - spent);
        }
    }

    log::info!("Shutting down");
    app.companion.shutdown();
    Ok(())
}
