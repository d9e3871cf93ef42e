use std::time::Duration;
use winbridge_services::settings::Config;

/// winbridge Bridge Configuration Structure.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Input Configuration.
    pub input: InputConfig,
    /// Window lifecycle policy.
    pub window: WindowPolicy,
    /// Frame pacing Configuration.
    pub pacing: PacingConfig,
}

impl BridgeConfig {
    /// Build a configuration from loaded settings, keeping defaults for missing keys.
    pub fn from_settings(settings: &Config) -> Self {
        let mut config = Self::default();
        let mouse = &settings.mouse;

        if let Some(interval) = mouse.double_click_interval_ms {
            config.input.double_click_interval = Duration::from_millis(interval);
        }
        if let Some(distance) = mouse.double_click_distance {
            config.input.double_click_distance = distance;
        }
        if let Some(lines) = mouse.wheel_scroll_lines {
            config.input.wheel_scroll_lines = lines;
        }
        if let Some(natural) = mouse.natural_scrolling {
            config.input.natural_scrolling = natural;
        }
        if let Some(quit) = settings.application.quit_on_last_window_closed {
            config.window.quit_on_last_window_closed = quit;
        }

        let display = &settings.display;
        if let Some(timeout) = display.frame_timeout_ms {
            config.pacing.frame_timeout = Duration::from_millis(timeout);
        }
        if let Some(rate) = display.fallback_refresh_rate.filter(|rate| rate.is_finite() && *rate > 0.0) {
            config.pacing.fallback_refresh_rate = rate;
        }
        if let Some(frames) = display.idle_frames_before_pause {
            config.pacing.idle_frames_before_pause = frames;
        }
        config
    }
}

/// Input configuration.
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Maximum time between two presses of the same button that still counts as a double click.
    ///
    /// Can be configured via the `WINBRIDGE_DOUBLE_CLICK_INTERVAL` environment variable (milliseconds).
    pub double_click_interval: Duration,
    /// Maximum travel on either axis between two presses that still counts as a double click.
    ///
    /// Can be configured via the `WINBRIDGE_DOUBLE_CLICK_DISTANCE` environment variable.
    pub double_click_distance: f64,
    /// Lines scrolled per wheel notch.
    pub wheel_scroll_lines: u32,
    /// If wheel deltas should be inverted.
    pub natural_scrolling: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        let double_click_interval = match std::env::var("WINBRIDGE_DOUBLE_CLICK_INTERVAL") {
            Ok(val) => match val.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    log::warn!("Invalid WINBRIDGE_DOUBLE_CLICK_INTERVAL value '{}', using 400", val);
                    Duration::from_millis(400)
                },
            },
            Err(_) => Duration::from_millis(400),
        };

        let double_click_distance = match std::env::var("WINBRIDGE_DOUBLE_CLICK_DISTANCE") {
            Ok(val) => match val.trim().parse::<f64>() {
                Ok(distance) if distance >= 0.0 => distance,
                _ => {
                    log::warn!("Invalid WINBRIDGE_DOUBLE_CLICK_DISTANCE value '{}', using 5", val);
                    5.0
                },
            },
            Err(_) => 5.0,
        };

        Self {
            double_click_interval,
            double_click_distance,
            wheel_scroll_lines: 3,
            natural_scrolling: false,
        }
    }
}

/// Window lifecycle policy.
#[derive(Debug, Clone)]
pub struct WindowPolicy {
    /// If closing the last registered window should signal the application to quit.
    pub quit_on_last_window_closed: bool,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            quit_on_last_window_closed: true,
        }
    }
}

/// Frame pacing configuration.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// How long a consumer waits for a display-link frame before treating it as missed.
    pub frame_timeout: Duration,
    /// Refresh rate in Hz used when the backend cannot report one.
    pub fallback_refresh_rate: f64,
    /// Consecutive frames without an update request after which the display link pauses.
    pub idle_frames_before_pause: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            frame_timeout: Duration::from_millis(100),
            fallback_refresh_rate: 60.0,
            idle_frames_before_pause: 120,
        }
    }
}
