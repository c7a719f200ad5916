pub mod behavior;
pub mod clock;
pub mod companion;
pub mod config;
pub mod error;
pub mod mood;

pub use behavior::{AnimationType, BehaviorResult, BehaviorState, Direction, PetBehavior, ScreenBounds};
pub use clock::{Clock, ManualClock, SystemClock};
pub use companion::{Companion, InputEvent, WindowSink};
pub use config::AppConfig;
pub use error::{PetError, PetResult};
pub use mood::{Denial, MoodService};
