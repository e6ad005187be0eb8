//! Clock Time State - per-display tick scheduling
//!
//! Every visible clock owns a `ClockTimeState` that recomputes its reading on
//! a fixed cadence while at least one display is subscribed to it.
//! `ClockBoard` is the single tick source: the host polls it once per frame
//! and it fans that poll out to every subscribed state.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};

use crate::time_engine::{ChronoTimeSource, Clock, SystemClock, TimeSnapshot, TimeSource};

/// Default tick period in milliseconds
pub const DEFAULT_TICK_PERIOD_MS: i64 = 50;
/// Longest accepted tick period in milliseconds
pub const MAX_TICK_PERIOD_MS: i64 = 100;

pub const DAY_LABEL: &str = "[DAY]";
pub const NIGHT_LABEL: &str = "[NIGHT]";

/// Whether an hour (0-23) counts as daytime
pub fn is_day_hour(hours: u32) -> bool {
    (6..18).contains(&hours)
}

/// Clamp a tick period into [1ms, MAX_TICK_PERIOD_MS], warning when it was
/// out of range
fn clamp_period(period: Duration, owner: &str) -> Duration {
    let min = Duration::milliseconds(1);
    let max = Duration::milliseconds(MAX_TICK_PERIOD_MS);
    if period < min || period > max {
        let clamped = period.clamp(min, max);
        warn!(
            "Tick period {}ms for {} out of range, using {}ms",
            period.num_milliseconds(),
            owner,
            clamped.num_milliseconds()
        );
        clamped
    } else {
        period
    }
}

/// A snapshot plus the fields derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct ClockTimeInfo {
    pub snapshot: TimeSnapshot,
    /// True iff hours in [6, 18)
    pub is_day_time: bool,
    /// "[DAY]" or "[NIGHT]"
    pub day_night_label: &'static str,
    /// Seconds plus sub-second fraction, in [0, 60)
    pub smooth_seconds: f64,
}

impl ClockTimeInfo {
    pub fn from_snapshot(snapshot: TimeSnapshot) -> Self {
        let is_day_time = is_day_hour(snapshot.hours);
        let smooth_seconds = snapshot.seconds as f64 + snapshot.second_fraction;
        Self {
            is_day_time,
            day_night_label: if is_day_time { DAY_LABEL } else { NIGHT_LABEL },
            smooth_seconds,
            snapshot,
        }
    }
}

/// Handle returned by `subscribe`, needed to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Called with the fresh reading on every successful tick
pub type TickCallback = Box<dyn FnMut(&ClockTimeInfo)>;

/// Scheduling state of a `ClockTimeState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    /// No subscribers, nothing scheduled
    Idle,
    /// Scheduled; `None` means due on the next poll
    Ticking { next_due: Option<DateTime<Utc>> },
}

/// Periodic poller for one displayed clock
pub struct ClockTimeState {
    timezone_id: String,
    period: Duration,
    phase: TickPhase,
    subscribers: BTreeMap<SubscriptionId, TickCallback>,
    next_subscription: u64,
    latest: Option<ClockTimeInfo>,
}

impl ClockTimeState {
    pub fn new(timezone_id: impl Into<String>) -> Self {
        Self::with_period(timezone_id, Duration::milliseconds(DEFAULT_TICK_PERIOD_MS))
    }

    /// Create a state with a custom tick period, clamped to (0, 100ms]
    pub fn with_period(timezone_id: impl Into<String>, period: Duration) -> Self {
        let timezone_id = timezone_id.into();
        let period = clamp_period(period, &timezone_id);
        Self {
            timezone_id,
            period,
            phase: TickPhase::Idle,
            subscribers: BTreeMap::new(),
            next_subscription: 0,
            latest: None,
        }
    }

    pub fn timezone_id(&self) -> &str {
        &self.timezone_id
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn phase(&self) -> TickPhase {
        self.phase
    }

    pub fn is_ticking(&self) -> bool {
        matches!(self.phase, TickPhase::Ticking { .. })
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// The most recent successful reading, if any
    pub fn latest(&self) -> Option<&ClockTimeInfo> {
        self.latest.as_ref()
    }

    /// Register a display. The first subscription starts ticking.
    pub fn subscribe(&mut self, callback: TickCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.insert(id, callback);

        if self.phase == TickPhase::Idle {
            self.phase = TickPhase::Ticking { next_due: None };
        }
        id
    }

    /// Drop a display. Removing the last one cancels the schedule.
    ///
    /// Returns `false` if the id was not (or no longer) subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if self.subscribers.is_empty() {
            self.phase = TickPhase::Idle;
        }
        removed
    }

    /// Recompute if a tick is due at `now`. Returns whether subscribers were
    /// notified.
    ///
    /// The reading always comes from `now`, never from a tick count, so a late
    /// timer still shows the true time. A stalled host gets one tick, not a
    /// burst of catch-up ticks.
    pub fn poll<S: TimeSource + ?Sized>(&mut self, source: &S, now: DateTime<Utc>) -> bool {
        let TickPhase::Ticking { next_due } = self.phase else {
            return false;
        };
        if next_due.is_some_and(|due| now < due) {
            return false;
        }
        self.phase = TickPhase::Ticking {
            next_due: Some(now + self.period),
        };

        match source.snapshot_at(&self.timezone_id, now) {
            Ok(snapshot) => {
                let info = ClockTimeInfo::from_snapshot(snapshot);
                for callback in self.subscribers.values_mut() {
                    callback(&info);
                }
                self.latest = Some(info);
                true
            }
            Err(e) => {
                // Keep showing the previous reading
                debug!("Skipping tick for {}: {}", self.timezone_id, e);
                false
            }
        }
    }
}

impl std::fmt::Debug for ClockTimeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockTimeState")
            .field("timezone_id", &self.timezone_id)
            .field("period", &self.period)
            .field("phase", &self.phase)
            .field("subscribers", &self.subscribers.len())
            .field("latest", &self.latest)
            .finish()
    }
}

/// Where a clock is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Grid,
    Pinned,
}

/// Identifies one displayed clock. A zone shown in both the grid and the
/// pinned row has two independent states.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClockKey {
    pub surface: Surface,
    pub zone_id: String,
}

impl ClockKey {
    pub fn grid(zone_id: impl Into<String>) -> Self {
        Self {
            surface: Surface::Grid,
            zone_id: zone_id.into(),
        }
    }

    pub fn pinned(zone_id: impl Into<String>) -> Self {
        Self {
            surface: Surface::Pinned,
            zone_id: zone_id.into(),
        }
    }
}

/// Single tick source driving every displayed clock
pub struct ClockBoard<S = ChronoTimeSource, C = SystemClock> {
    source: S,
    clock: C,
    period: Duration,
    states: HashMap<ClockKey, ClockTimeState>,
}

impl ClockBoard {
    /// Board backed by the system clock and the bundled timezone database
    pub fn system() -> Self {
        Self::new(ChronoTimeSource, SystemClock)
    }
}

impl<S: TimeSource, C: Clock> ClockBoard<S, C> {
    pub fn new(source: S, clock: C) -> Self {
        Self::with_period(source, clock, Duration::milliseconds(DEFAULT_TICK_PERIOD_MS))
    }

    /// Board whose clocks all share `period`, clamped once here
    pub fn with_period(source: S, clock: C, period: Duration) -> Self {
        Self {
            source,
            clock,
            period: clamp_period(period, "clock board"),
            states: HashMap::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Subscribe a display to the clock identified by `key`
    pub fn subscribe(&mut self, key: ClockKey, callback: TickCallback) -> SubscriptionId {
        let period = self.period;
        self.states
            .entry(key)
            .or_insert_with_key(|key| ClockTimeState::with_period(key.zone_id.clone(), period))
            .subscribe(callback)
    }

    /// Subscribe a display that reads `latest` each frame instead of taking
    /// callbacks
    pub fn watch(&mut self, key: ClockKey) -> SubscriptionId {
        self.subscribe(key, Box::new(|_| {}))
    }

    /// Unsubscribe a display; a state left without subscribers is dropped
    pub fn unsubscribe(&mut self, key: &ClockKey, id: SubscriptionId) -> bool {
        let Some(state) = self.states.get_mut(key) else {
            return false;
        };
        let removed = state.unsubscribe(id);
        if !state.is_ticking() {
            self.states.remove(key);
        }
        removed
    }

    /// Tick every due clock from one wall-clock read. Returns how many ticked.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut ticked = 0;
        for state in self.states.values_mut() {
            if state.poll(&self.source, now) {
                ticked += 1;
            }
        }
        ticked
    }

    pub fn latest(&self, key: &ClockKey) -> Option<&ClockTimeInfo> {
        self.states.get(key).and_then(|state| state.latest())
    }

    pub fn contains(&self, key: &ClockKey) -> bool {
        self.states.contains_key(key)
    }

    /// Number of clocks currently ticking
    pub fn active_count(&self) -> usize {
        self.states.len()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// The board subscriptions one display surface holds, by zone id
///
/// `sync` makes the watched set equal to what is on screen: zones that left
/// the display are unsubscribed, so their states stop ticking.
#[derive(Debug)]
pub struct SurfaceSubscriptions {
    surface: Surface,
    subscriptions: HashMap<String, SubscriptionId>,
}

impl SurfaceSubscriptions {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            subscriptions: HashMap::new(),
        }
    }

    fn key(&self, zone_id: &str) -> ClockKey {
        ClockKey {
            surface: self.surface,
            zone_id: zone_id.to_string(),
        }
    }

    pub fn sync<'a, S, C>(
        &mut self,
        board: &mut ClockBoard<S, C>,
        visible: impl IntoIterator<Item = &'a str>,
    ) where
        S: TimeSource,
        C: Clock,
    {
        let visible: HashSet<&str> = visible.into_iter().collect();

        let stale: Vec<String> = self
            .subscriptions
            .keys()
            .filter(|id| !visible.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            if let Some(sub) = self.subscriptions.remove(&id) {
                board.unsubscribe(&self.key(&id), sub);
            }
        }

        for id in visible {
            if !self.subscriptions.contains_key(id) {
                let sub = board.watch(self.key(id));
                self.subscriptions.insert(id.to_string(), sub);
            }
        }
    }

    pub fn contains(&self, zone_id: &str) -> bool {
        self.subscriptions.contains_key(zone_id)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_engine::{ManualClock, TimeError};
    use chrono::TimeZone;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 5, 59, 58).unwrap()
    }

    fn counter() -> (Rc<Cell<usize>>, TickCallback) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, Box::new(move |_| inner.set(inner.get() + 1)))
    }

    /// Source that can be switched into failure mode mid-test
    struct FlakySource {
        failing: Cell<bool>,
    }

    impl TimeSource for FlakySource {
        fn snapshot_at(
            &self,
            timezone_id: &str,
            instant: DateTime<Utc>,
        ) -> Result<TimeSnapshot, TimeError> {
            if self.failing.get() {
                Err(TimeError::UnknownTimezone(timezone_id.to_string()))
            } else {
                ChronoTimeSource.snapshot_at(timezone_id, instant)
            }
        }
    }

    #[test]
    fn test_day_night_boundaries() {
        assert!(is_day_hour(6));
        assert!(is_day_hour(17));
        assert!(!is_day_hour(18));
        assert!(!is_day_hour(5));
        assert!(!is_day_hour(0));
    }

    #[test]
    fn test_info_derivation() {
        let instant = start() + Duration::milliseconds(2_750);
        let snap = ChronoTimeSource.snapshot_at("UTC", instant).unwrap();
        let info = ClockTimeInfo::from_snapshot(snap);
        assert_eq!(info.snapshot.hours, 6);
        assert!(info.is_day_time);
        assert_eq!(info.day_night_label, DAY_LABEL);
        assert!((info.smooth_seconds - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_idle_until_subscribed() {
        let mut state = ClockTimeState::new("UTC");
        assert_eq!(state.phase(), TickPhase::Idle);
        assert!(!state.poll(&ChronoTimeSource, start()));
        assert!(state.latest().is_none());

        let (count, cb) = counter();
        state.subscribe(cb);
        assert!(state.is_ticking());
        assert!(state.poll(&ChronoTimeSource, start()));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_tick_cadence_uses_wall_clock() {
        let mut state = ClockTimeState::new("UTC");
        let (count, cb) = counter();
        state.subscribe(cb);

        assert!(state.poll(&ChronoTimeSource, start()));
        assert!(!state.poll(&ChronoTimeSource, start() + Duration::milliseconds(30)));

        // Late timer: reading comes from the actual instant
        let late = start() + Duration::milliseconds(1_230);
        assert!(state.poll(&ChronoTimeSource, late));
        assert_eq!(count.get(), 2);
        let info = state.latest().unwrap();
        assert_eq!(info.snapshot.seconds, 59);
        assert!((info.smooth_seconds - 59.23).abs() < 1e-9);

        // No catch-up burst after the stall
        assert!(!state.poll(&ChronoTimeSource, late + Duration::milliseconds(10)));
    }

    #[test]
    fn test_unsubscribe_cancels_ticks() {
        let clock = ManualClock::new(start());
        let mut board = ClockBoard::new(ChronoTimeSource, clock.clone());
        let key = ClockKey::pinned("Asia/Tokyo");
        let (count, cb) = counter();
        let id = board.subscribe(key.clone(), cb);

        assert_eq!(board.poll(), 1);
        assert!(board.unsubscribe(&key, id));
        assert!(!board.contains(&key));

        for _ in 0..10 {
            clock.advance(Duration::milliseconds(50));
            assert_eq!(board.poll(), 0);
        }
        assert_eq!(count.get(), 1);

        // Second unsubscribe is a no-op
        assert!(!board.unsubscribe(&key, id));
    }

    #[test]
    fn test_last_subscriber_stops_timer() {
        let mut state = ClockTimeState::new("UTC");
        let (count_a, cb_a) = counter();
        let (count_b, cb_b) = counter();
        let a = state.subscribe(cb_a);
        let b = state.subscribe(cb_b);

        assert!(state.poll(&ChronoTimeSource, start()));
        assert!(state.unsubscribe(a));
        assert!(state.is_ticking());

        let next = start() + Duration::milliseconds(50);
        assert!(state.poll(&ChronoTimeSource, next));
        assert_eq!(count_a.get(), 1);
        assert_eq!(count_b.get(), 2);

        assert!(state.unsubscribe(b));
        assert_eq!(state.phase(), TickPhase::Idle);
        assert!(!state.poll(&ChronoTimeSource, next + Duration::milliseconds(50)));
        assert_eq!(count_b.get(), 2);
    }

    #[test]
    fn test_failure_keeps_previous_reading() {
        let source = FlakySource {
            failing: Cell::new(false),
        };
        let mut state = ClockTimeState::new("Europe/Paris");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        state.subscribe(Box::new(move |info| {
            sink.borrow_mut().push(info.snapshot.formatted_time.clone())
        }));

        assert!(state.poll(&source, start()));
        let before = state.latest().cloned();

        source.failing.set(true);
        assert!(!state.poll(&source, start() + Duration::milliseconds(60)));
        assert_eq!(state.latest().cloned(), before);
        assert!(state.is_ticking());
        assert_eq!(seen.borrow().len(), 1);

        source.failing.set(false);
        assert!(state.poll(&source, start() + Duration::milliseconds(120)));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_unknown_zone_never_ticks() {
        let mut board = ClockBoard::new(ChronoTimeSource, ManualClock::new(start()));
        let key = ClockKey::grid("Nowhere/Special");
        board.watch(key.clone());
        assert_eq!(board.poll(), 0);
        assert!(board.latest(&key).is_none());
        assert!(board.contains(&key));
    }

    #[test]
    fn test_grid_and_pinned_are_independent() {
        let clock = ManualClock::new(start());
        let mut board = ClockBoard::new(ChronoTimeSource, clock.clone());
        let grid = ClockKey::grid("Asia/Tokyo");
        let pinned = ClockKey::pinned("Asia/Tokyo");
        board.watch(grid.clone());
        let pinned_id = board.watch(pinned.clone());

        assert_eq!(board.active_count(), 2);
        assert_eq!(board.poll(), 2);

        board.unsubscribe(&pinned, pinned_id);
        clock.advance(Duration::milliseconds(50));
        assert_eq!(board.poll(), 1);
        assert!(board.latest(&grid).is_some());
        assert!(board.latest(&pinned).is_none());
    }

    #[test]
    fn test_period_is_clamped() {
        let state = ClockTimeState::with_period("UTC", Duration::milliseconds(500));
        assert_eq!(state.period(), Duration::milliseconds(MAX_TICK_PERIOD_MS));

        let state = ClockTimeState::with_period("UTC", Duration::zero());
        assert_eq!(state.period(), Duration::milliseconds(1));
    }

    #[test]
    fn test_board_clamps_period_once() {
        let mut board = ClockBoard::with_period(
            ChronoTimeSource,
            ManualClock::new(start()),
            Duration::milliseconds(500),
        );
        assert_eq!(board.period(), Duration::milliseconds(MAX_TICK_PERIOD_MS));

        board.watch(ClockKey::grid("UTC"));
        assert_eq!(board.poll(), 1);
        board.clock().advance(Duration::milliseconds(MAX_TICK_PERIOD_MS));
        assert_eq!(board.poll(), 1);
    }

    #[test]
    fn test_hidden_surface_clocks_stop_ticking() {
        let clock = ManualClock::new(start());
        let mut board = ClockBoard::new(ChronoTimeSource, clock.clone());
        let mut grid = SurfaceSubscriptions::new(Surface::Grid);
        let everything = ["Asia/Tokyo", "Europe/Paris", "America/Chicago"];

        grid.sync(&mut board, everything);
        assert_eq!(board.active_count(), 3);
        assert_eq!(board.poll(), 3);

        // Filtered down to one zone
        grid.sync(&mut board, ["Asia/Tokyo"]);
        assert_eq!(board.active_count(), 1);
        assert!(!board.contains(&ClockKey::grid("Europe/Paris")));
        assert!(grid.contains("Asia/Tokyo"));
        assert_eq!(grid.len(), 1);
        clock.advance(Duration::milliseconds(50));
        assert_eq!(board.poll(), 1);

        // Pinned clocks of the same zone are untouched
        let pinned = board.watch(ClockKey::pinned("Europe/Paris"));
        grid.sync(&mut board, std::iter::empty());
        assert!(grid.is_empty());
        assert_eq!(board.active_count(), 1);
        assert!(board.contains(&ClockKey::pinned("Europe/Paris")));
        board.unsubscribe(&ClockKey::pinned("Europe/Paris"), pinned);

        // Clearing the filter brings them back
        grid.sync(&mut board, everything);
        assert_eq!(board.active_count(), 3);
        clock.advance(Duration::milliseconds(50));
        assert_eq!(board.poll(), 3);
    }
}
