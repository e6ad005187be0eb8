//! Shared core of the world clock
//!
//! Timezone readings, tick scheduling, face geometry, the reference table,
//! the pinned selection with drag reordering, and persisted preferences.
//! The binary in `clocks/world_clock` only draws and forwards input.

pub mod clock_state;
pub mod config;
pub mod drag;
pub mod face;
pub mod pinned;
pub mod preferences;
pub mod time_engine;
pub mod timezones;

pub use clock_state::{
    is_day_hour, ClockBoard, ClockKey, ClockTimeInfo, ClockTimeState, SubscriptionId, Surface,
    SurfaceSubscriptions, TickCallback, TickPhase, DAY_LABEL, DEFAULT_TICK_PERIOD_MS,
    MAX_TICK_PERIOD_MS, NIGHT_LABEL,
};
pub use config::{config_dir, ConfigError, FileStore, KeyValueStore, MemoryStore};
pub use drag::{
    insertion_side, move_item, nudge, DragOutcome, DragReorderController, DragState,
    DropIndicator, InsertionSide, MoveDirection, DROP_INDICATOR_DWELL,
};
pub use face::{
    hand_angles, numerals, polar_point, render_face, tick_marks, AnalogFace, ClockFace, ClockMode,
    DigitalFace, HandAngles, HybridFace, Numeral, ParseClockModeError, SizeClass, TickMark,
};
pub use pinned::{PinnedError, PinnedTimezoneList, ToggleOutcome, MAX_PINNED};
pub use preferences::{PreferenceStore, CLOCK_MODE_KEY, PINNED_KEY};
pub use time_engine::{
    compute_snapshot_at, current_offset, current_time, format_offset, parse_timezone,
    ChronoTimeSource, Clock, ManualClock, Meridiem, SystemClock, TimeError, TimeSnapshot,
    TimeSource,
};
pub use timezones::{
    all_timezones, find_timezone, search_timezones, timezone_groups, Timezone, TimezoneGroup,
};
