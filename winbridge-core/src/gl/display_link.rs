//! Display-refresh pacing on a dedicated timer thread.
//!
//! The timer thread publishes the latest frame into a single slot (a newer frame overwrites
//! an unconsumed one) and signals the consumer. It never touches the window registry or the
//! dispatcher. The consumer waits with a bounded timeout and acknowledges a frame by
//! presenting it. A frame is discarded if it was already presented or if the timer has
//! published a newer one since it was taken.

use crate::config::PacingConfig;
use crate::error::ContextError;
use crate::geometry::{DirtyRegion, Rect};
use crate::platform::PlatformBackend;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Used when neither the display nor the config give a usable refresh rate.
const DEFAULT_REFRESH_RATE: f64 = 60.0;

fn usable_rate(rate: f64) -> Option<f64> {
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Timing of one display-link frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    /// Monotonically increasing frame number.
    pub serial: u64,
    /// When the timer fired.
    pub now: Instant,
    /// When the frame is expected on screen.
    pub target: Instant,
}

/// Outcome of [DisplayLink::wait_for_frame].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameWait {
    Frame(FrameTiming),
    /// No frame arrived in time; treat as a missed frame.
    TimedOut,
    /// The link was stopped.
    Stopped,
}

#[derive(Debug)]
struct LinkState {
    stopping: bool,
    enabled: bool,
    paused: bool,
    serial: u64,
    acknowledged: u64,
    pending: Option<FrameTiming>,
    dirty: DirtyRegion,
    update_requested: bool,
    idle_frames: u32,
}

struct Shared {
    state: Mutex<LinkState>,
    frame_ready: Condvar,
    control: Condvar,
}

/// A timer thread firing at the display refresh rate.
pub struct DisplayLink {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
    interval: Duration,
}

impl DisplayLink {
    /// Start a display link paced by the backend's refresh rate.
    pub fn for_backend(backend: &dyn PlatformBackend, config: &PacingConfig) -> Result<Self, ContextError> {
        let rate = backend
            .refresh_rate()
            .and_then(usable_rate)
            .unwrap_or(config.fallback_refresh_rate);
        Self::new(rate, config)
    }

    /// Start a display link firing `refresh_rate` times per second.
    pub fn new(refresh_rate: f64, config: &PacingConfig) -> Result<Self, ContextError> {
        let rate = usable_rate(refresh_rate)
            .or_else(|| usable_rate(config.fallback_refresh_rate))
            .unwrap_or_else(|| {
                log::warn!(
                    "No usable refresh rate ({} Hz, fallback {} Hz), using {} Hz",
                    refresh_rate,
                    config.fallback_refresh_rate,
                    DEFAULT_REFRESH_RATE
                );
                DEFAULT_REFRESH_RATE
            });
        let interval = Duration::from_secs_f64(1.0 / rate);
        let shared = Arc::new(Shared {
            state: Mutex::new(LinkState {
                stopping: false,
                enabled: true,
                paused: false,
                serial: 0,
                acknowledged: 0,
                pending: None,
                dirty: DirtyRegion::new(),
                update_requested: true,
                idle_frames: 0,
            }),
            frame_ready: Condvar::new(),
            control: Condvar::new(),
        });

        let idle_limit = config.idle_frames_before_pause;
        let thread = std::thread::Builder::new()
            .name("winbridge-display-link".to_string())
            .spawn({
                let shared = shared.clone();
                move || run_timer(&shared, interval, idle_limit)
            })
            .map_err(|err| ContextError::DisplayLink(err.to_string()))?;

        log::debug!("Display link started at {:.1} Hz", rate);
        Ok(Self {
            shared,
            thread: Some(thread),
            interval,
        })
    }

    /// Time between two frames.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Enable or disable frame signals.
    ///
    /// A disabled link is observed by the timer at the start of its next tick; no signal
    /// fires after that.
    pub fn set_enabled(&self, enabled: bool) {
        let mut state = self.shared.state.lock();
        state.enabled = enabled;
        if enabled {
            state.paused = false;
            state.idle_frames = 0;
        }
        self.shared.control.notify_all();
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.state.lock().enabled
    }

    /// Whether the timer paused after too many idle frames.
    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().paused
    }

    /// Serial of the most recent frame.
    pub fn serial(&self) -> u64 {
        self.shared.state.lock().serial
    }

    /// Serial of the last presented frame.
    pub fn acknowledged_serial(&self) -> u64 {
        self.shared.state.lock().acknowledged
    }

    /// Add `rect` to the area to repaint and wake a paused link.
    pub fn request_update(&self, rect: Rect) {
        let mut state = self.shared.state.lock();
        state.dirty.add(rect);
        state.update_requested = true;
        if state.paused {
            state.paused = false;
            state.idle_frames = 0;
            log::trace!("Display link resumed");
            self.shared.control.notify_all();
        }
    }

    /// A copy of the accumulated dirty region.
    pub fn dirty_region(&self) -> DirtyRegion {
        self.shared.state.lock().dirty.clone()
    }

    /// Wait up to `timeout` for the next frame.
    pub fn wait_for_frame(&self, timeout: Duration) -> FrameWait {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        loop {
            if state.stopping {
                return FrameWait::Stopped;
            }
            if let Some(timing) = state.pending.take() {
                return FrameWait::Frame(timing);
            }
            if self
                .shared
                .frame_ready
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return match state.pending.take() {
                    Some(timing) if !state.stopping => FrameWait::Frame(timing),
                    _ if state.stopping => FrameWait::Stopped,
                    _ => FrameWait::TimedOut,
                };
            }
        }
    }

    /// Acknowledge `timing` and take the region to repaint for it.
    ///
    /// Returns `None` without touching the dirty region if a frame with the same or a
    /// newer serial was already presented, or if the timer has since published a newer
    /// frame. The newer frame is then the one to present.
    pub fn present(&self, timing: &FrameTiming) -> Option<DirtyRegion> {
        let mut state = self.shared.state.lock();
        if timing.serial <= state.acknowledged || timing.serial < state.serial {
            log::trace!(
                "Discarding stale frame {} (acknowledged {}, latest {})",
                timing.serial,
                state.acknowledged,
                state.serial
            );
            return None;
        }
        state.acknowledged = timing.serial;
        Some(state.dirty.take())
    }

    /// Stop the timer thread and drain any pending frame.
    pub fn stop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.stopping = true;
            state.enabled = false;
            state.pending = None;
        }
        self.shared.control.notify_all();
        self.shared.frame_ready.notify_all();

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Display link thread panicked");
            }
            log::debug!("Display link stopped");
        }
    }
}

impl Drop for DisplayLink {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_timer(shared: &Shared, interval: Duration, idle_limit: u32) {
    let mut state = shared.state.lock();
    let mut next = Instant::now() + interval;

    loop {
        while !state.stopping && (!state.enabled || state.paused) {
            shared.control.wait(&mut state);
            next = Instant::now() + interval;
        }
        if state.stopping {
            break;
        }

        // Woken early by a control change; re-evaluate before firing.
        if !shared.control.wait_until(&mut state, next).timed_out() {
            continue;
        }
        if state.stopping {
            break;
        }
        if !state.enabled || state.paused {
            continue;
        }

        let now = Instant::now();
        state.serial += 1;
        state.pending = Some(FrameTiming {
            serial: state.serial,
            now,
            target: now + interval,
        });

        if state.update_requested || !state.dirty.is_empty() {
            state.update_requested = false;
            state.idle_frames = 0;
        } else {
            state.idle_frames += 1;
            if idle_limit > 0 && state.idle_frames >= idle_limit {
                state.paused = true;
                log::trace!("Display link paused after {} idle frames", state.idle_frames);
            }
        }
        shared.frame_ready.notify_all();

        next += interval;
        if next <= now {
            next = now + interval;
        }
    }
}
