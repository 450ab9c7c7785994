//! Keystroke debouncing for API key fields.
//!
//! One [`DetectionDebouncer`] per key field. The caller owns the clock and the
//! timer: it reports changes with the current time, arms a timer for the
//! returned delay, and calls [`DetectionDebouncer::handle_timer`] with the
//! ticket it was armed with when it fires. A timer armed for an earlier
//! keystroke holds a stale ticket and does nothing, so only the last keystroke
//! before a pause is detected. When the timer fires is left to the caller: a
//! current ticket always runs detection.

use std::rc::Rc;
use std::time::Duration;

use crate::detection::{detect_provider, detection_message};
use crate::models::DetectionResult;
use crate::ui::Field;

pub const MIN_KEY_LEN: usize = 10;
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectionConfig {
    /// Shorter trimmed input hides the hint without scheduling detection.
    pub min_key_len: usize,
    pub quiet_period: Duration,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_key_len: MIN_KEY_LEN,
            quiet_period: QUIET_PERIOD,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    PendingDetection { deadline: Duration, ticket: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Input too short; the hint was hidden and nothing is pending.
    Hidden,
    /// Detection runs once `delay` passes without another change. The timer
    /// hands `ticket` back to [`DetectionDebouncer::handle_timer`].
    Scheduled { delay: Duration, ticket: u64 },
}

/// Cross-component step run after a successful detection.
pub type DetectionHook = Rc<dyn Fn(&DetectionResult)>;

pub struct DetectionDebouncer {
    input: Field,
    display: Field,
    config: DetectionConfig,
    state: DebounceState,
    next_ticket: u64,
    on_detected: Option<DetectionHook>,
}

impl DetectionDebouncer {
    pub fn new(input: Field, display: Field, config: DetectionConfig) -> Self {
        Self {
            input,
            display,
            config,
            state: DebounceState::Idle,
            next_ticket: 0,
            on_detected: None,
        }
    }

    pub fn with_hook(mut self, hook: DetectionHook) -> Self {
        self.on_detected = Some(hook);
        self
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn config(&self) -> DetectionConfig {
        self.config
    }

    pub fn input(&self) -> &Field {
        &self.input
    }

    /// Input changed at `now`. Any pending detection is dropped first.
    pub fn handle_change(&mut self, now: Duration) -> ChangeOutcome {
        self.state = DebounceState::Idle;
        let value = self.input.value();
        if value.trim().chars().count() < self.config.min_key_len {
            self.display.hide();
            return ChangeOutcome::Hidden;
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.state = DebounceState::PendingDetection {
            deadline: now + self.config.quiet_period,
            ticket,
        };
        ChangeOutcome::Scheduled {
            delay: self.config.quiet_period,
            ticket,
        }
    }

    /// Focus left the field: detect right away instead of waiting out the
    /// quiet period.
    pub fn handle_blur(&mut self) -> Option<DetectionResult> {
        self.state = DebounceState::Idle;
        let value = self.input.value();
        if value.trim().is_empty() {
            return None;
        }
        self.run_detection(&value)
    }

    /// A timer armed by [`handle_change`](Self::handle_change) with `ticket`
    /// fired.
    pub fn handle_timer(&mut self, ticket: u64) -> Option<DetectionResult> {
        match self.state {
            DebounceState::PendingDetection { ticket: current, .. } if current == ticket => {
                self.state = DebounceState::Idle;
                let value = self.input.value();
                self.run_detection(&value)
            }
            _ => None,
        }
    }

    fn run_detection(&self, value: &str) -> Option<DetectionResult> {
        let Some(detection) = detect_provider(value) else {
            self.display.hide();
            return None;
        };
        self.display.set_value(&detection_message(&detection));
        self.display.show();
        tracing::debug!(provider = %detection.provider_name, "API key provider detected");
        if let Some(hook) = &self.on_detected {
            hook(&detection);
        }
        Some(detection)
    }
}
