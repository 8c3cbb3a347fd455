pub mod clock;
pub mod controller;
pub mod duration;
pub mod format;
pub mod state;

pub use clock::{SessionClock, SystemClock};
pub use controller::{SessionSnapshot, TimerController, DEFAULT_POLL_INTERVAL};
pub use duration::SessionDuration;
pub use format::format_remaining;
pub use state::{SessionPhase, SessionState};
