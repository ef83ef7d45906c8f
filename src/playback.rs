//! Animation scheduler for sprite previews.
//!
//! [`Playback`] is the timing state machine: feed it tick timestamps and it
//! reports when the displayed frame advances. [`Preview`] couples a playback
//! with a [`Ticker`] (the host's display-refresh callback source) and keeps at
//! most one tick outstanding, cancelling it when playback stops or the preview
//! is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::DEFAULT_FRAME_DURATION_MS;

/// Slowest playback speed multiplier.
pub const MIN_SPEED: f64 = 0.1;

/// Fastest playback speed multiplier offered by the editor.
pub const MAX_SPEED: f64 = 3.0;

/// Speed used where a multiplier is zero, negative or not a number.
fn usable_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        MIN_SPEED
    }
}

/// How long a frame stays on screen at `speed`, in milliseconds.
///
/// A zero duration counts as the default frame duration.
pub fn effective_duration(duration: u32, speed: f64) -> f64 {
    let duration = if duration == 0 { DEFAULT_FRAME_DURATION_MS } else { duration };
    f64::from(duration) / usable_speed(speed)
}

/// Frame shown `elapsed_ms` after playback started at frame 0, when the
/// playback is ticked every millisecond.
///
/// A tick restarts the frame window at its own whole-millisecond timestamp,
/// so each window lasts its effective duration rounded up to the next
/// millisecond. The sequence loops forever.
pub fn frame_at(elapsed_ms: u64, durations: &[u32], speed: f64) -> usize {
    let windows: Vec<u64> =
        durations.iter().map(|&d| effective_duration(d, speed).ceil() as u64).collect();
    let total: u64 = windows.iter().sum();
    if total == 0 {
        return 0;
    }

    let mut t = elapsed_ms % total;
    for (index, &window) in windows.iter().enumerate() {
        if t < window {
            return index;
        }
        t -= window;
    }
    0
}

/// Whether a playback is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Stopped,
    Playing,
}

/// Frame-advance state machine.
///
/// The first tick after playback starts only records the reference timestamp.
/// Each later tick compares the time since the last advance against the
/// current frame's effective duration, and advances by at most one frame.
#[derive(Debug, Clone, Default)]
pub struct Playback {
    state: State,
    current: usize,
    last_advance: Option<u64>,
}

impl Playback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == State::Playing
    }

    /// Index of the displayed frame.
    pub fn current_frame(&self) -> usize {
        self.current
    }

    /// Show a specific frame, e.g. when the user selects one while stopped.
    pub fn set_frame(&mut self, index: usize) {
        self.current = index;
        self.last_advance = None;
    }

    /// Start playing from the displayed frame.
    pub fn play(&mut self) {
        if self.state == State::Stopped {
            self.state = State::Playing;
            self.last_advance = None;
        }
    }

    /// Stop and clear the elapsed-time accumulator.
    pub fn stop(&mut self) {
        self.state = State::Stopped;
        self.last_advance = None;
    }

    /// Switch between stopped and playing. Returns the new state.
    pub fn toggle(&mut self) -> State {
        match self.state {
            State::Stopped => self.play(),
            State::Playing => self.stop(),
        }
        self.state
    }

    /// Jump back to frame 0 and play.
    pub fn restart(&mut self) {
        self.current = 0;
        self.last_advance = None;
        self.state = State::Playing;
    }

    /// Evaluate one display-refresh tick at time `now` (milliseconds).
    ///
    /// `speed` is read on every tick, so speed changes apply without
    /// restarting the current frame. Returns the new frame index when the
    /// frame advanced.
    pub fn tick(&mut self, now: u64, durations: &[u32], speed: f64) -> Option<usize> {
        if self.state == State::Stopped || durations.is_empty() {
            return None;
        }
        if self.current >= durations.len() {
            // Frames were deleted under us
            self.current = 0;
        }

        let Some(last) = self.last_advance else {
            self.last_advance = Some(now);
            return None;
        };

        let elapsed = now.saturating_sub(last) as f64;
        if elapsed >= effective_duration(durations[self.current], speed) {
            self.current = (self.current + 1) % durations.len();
            // Restart the window at this tick so overshoot is not carried over twice
            self.last_advance = Some(now);
            tracing::trace!(frame = self.current, now, "playback advanced");
            Some(self.current)
        } else {
            None
        }
    }
}

/// Handle of a scheduled tick.
pub type TickId = u64;

/// Source of display-refresh callbacks.
///
/// `schedule` requests one callback on the next refresh; the host later
/// delivers it by calling [`Preview::on_tick`].
pub trait Ticker {
    fn schedule(&mut self) -> TickId;
    fn cancel(&mut self, id: TickId);
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: TickId,
    pending: Vec<TickId>,
    scheduled: usize,
    cancelled: usize,
}

/// A ticker driven by hand. Clones share state, so a test can keep one
/// clone to inspect what a [`Preview`] scheduled.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    inner: Rc<RefCell<ManualState>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks scheduled and neither fired nor cancelled.
    pub fn pending(&self) -> Vec<TickId> {
        self.inner.borrow().pending.clone()
    }

    /// Total ticks ever scheduled.
    pub fn scheduled(&self) -> usize {
        self.inner.borrow().scheduled
    }

    /// Total ticks cancelled before firing.
    pub fn cancelled(&self) -> usize {
        self.inner.borrow().cancelled
    }

    /// Take the oldest pending tick, as the host would when it fires.
    pub fn fire(&self) -> Option<TickId> {
        let mut inner = self.inner.borrow_mut();
        if inner.pending.is_empty() {
            None
        } else {
            Some(inner.pending.remove(0))
        }
    }
}

impl Ticker for ManualTicker {
    fn schedule(&mut self) -> TickId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.pending.push(id);
        inner.scheduled += 1;
        id
    }

    fn cancel(&mut self, id: TickId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(pos) = inner.pending.iter().position(|&p| p == id) {
            inner.pending.remove(pos);
            inner.cancelled += 1;
        }
    }
}

/// A playback bound to a ticker for the lifetime of one preview.
#[derive(Debug)]
pub struct Preview<T: Ticker> {
    playback: Playback,
    ticker: T,
    pending: Option<TickId>,
}

impl<T: Ticker> Preview<T> {
    pub fn new(ticker: T) -> Self {
        Preview { playback: Playback::new(), ticker, pending: None }
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn current_frame(&self) -> usize {
        self.playback.current_frame()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// The tick this preview is waiting for, if any.
    pub fn pending_tick(&self) -> Option<TickId> {
        self.pending
    }

    pub fn set_frame(&mut self, index: usize) {
        self.playback.set_frame(index);
    }

    pub fn play(&mut self) {
        self.playback.play();
        self.ensure_scheduled();
    }

    pub fn stop(&mut self) {
        self.playback.stop();
        self.cancel_pending();
    }

    pub fn toggle(&mut self) -> State {
        match self.playback.state() {
            State::Stopped => self.play(),
            State::Playing => self.stop(),
        }
        self.playback.state()
    }

    pub fn restart(&mut self) {
        self.playback.restart();
        self.ensure_scheduled();
    }

    /// Deliver the scheduled tick at time `now`, then schedule the next one
    /// while still playing. Returns the new frame index if it advanced.
    pub fn on_tick(&mut self, now: u64, durations: &[u32], speed: f64) -> Option<usize> {
        self.pending = None;
        let advanced = self.playback.tick(now, durations, speed);
        if self.playback.is_playing() {
            self.ensure_scheduled();
        }
        advanced
    }

    fn ensure_scheduled(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.ticker.schedule());
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            self.ticker.cancel(id);
        }
    }
}

impl<T: Ticker> Drop for Preview<T> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
